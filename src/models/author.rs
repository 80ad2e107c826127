//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::{Book, BookSummary};

/// Full author model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Date of death ("died")
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "first last", rebuilt on every call
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn url(&self) -> String {
        format!("/catalog/author/{}", self.id)
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100))]
    #[validate(custom(function = "crate::models::not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    #[validate(custom(function = "crate::models::not_blank"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Update author request. Absent fields are left untouched; dates can only be
/// replaced, not cleared, through this payload.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100))]
    #[validate(custom(function = "crate::models::not_blank"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    #[validate(custom(function = "crate::models::not_blank"))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl UpdateAuthor {
    pub fn apply(&self, author: &mut Author) {
        if let Some(ref first_name) = self.first_name {
            author.first_name = first_name.clone();
        }
        if let Some(ref last_name) = self.last_name {
            author.last_name = last_name.clone();
        }
        if self.date_of_birth.is_some() {
            author.date_of_birth = self.date_of_birth;
        }
        if self.date_of_death.is_some() {
            author.date_of_death = self.date_of_death;
        }
    }
}

/// Author as shown in listings and detail pages
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorSummary {
    pub id: i32,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub url: String,
}

impl From<&Author> for AuthorSummary {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id,
            name: author.name(),
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
            url: author.url(),
        }
    }
}

/// Author detail page content with the books linked to them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    pub id: i32,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub url: String,
    pub books: Vec<BookSummary>,
}

impl AuthorDetail {
    pub fn new(author: &Author, books: &[Book]) -> Self {
        Self {
            id: author.id,
            name: author.name(),
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
            url: author.url(),
            books: books.iter().map(BookSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author {
            id: 3,
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1929, 10, 21),
            date_of_death: None,
        }
    }

    #[test]
    fn name_joins_first_and_last() {
        assert_eq!(author().name(), "Ursula Le Guin");
        assert_eq!(author().to_string(), "Ursula Le Guin");
    }

    #[test]
    fn name_follows_field_changes() {
        let mut a = author();
        UpdateAuthor {
            first_name: Some("U. K.".to_string()),
            ..Default::default()
        }
        .apply(&mut a);
        assert_eq!(a.name(), "U. K. Le Guin");
        assert_eq!(a.date_of_birth, NaiveDate::from_ymd_opt(1929, 10, 21));
    }

    #[test]
    fn url_points_at_detail_view() {
        assert_eq!(author().url(), "/catalog/author/3");
    }
}
