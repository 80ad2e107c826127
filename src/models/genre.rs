//! Genre model (e.g. Science Fiction, Non Fiction)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Create or rename a genre
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GenreInput {
    #[validate(length(min = 1, max = 200))]
    #[validate(custom(function = "crate::models::not_blank"))]
    pub name: String,
}
