//! Data models for the LocalLibrary catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod language;
pub mod pagination;
pub mod user;

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use book_instance::{BookInstance, LoanStatus};
pub use genre::Genre;
pub use language::Language;
pub use pagination::{Page, PageInfo, PageRequest};
pub use user::User;

/// Keeps `null` apart from a missing field: missing gives `None` (through
/// `#[serde(default)]`), `null` gives `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Rejects names and titles made of whitespace only
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
