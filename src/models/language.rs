//! Written language of a book (e.g. English, French, Japanese)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_LANGUAGE: &str = "English";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i32,
    pub name: String,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Create or rename a language. A missing name falls back to English.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct LanguageInput {
    #[validate(length(min = 1, max = 200))]
    #[validate(custom(function = "crate::models::not_blank"))]
    pub name: Option<String>,
}

impl LanguageInput {
    pub fn name_or_default(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }
}
