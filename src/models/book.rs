//! Book model: a title in the catalog, not a specific copy

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::author::{Author, AuthorSummary};
use super::book_instance::BookInstanceView;
use super::genre::Genre;
use super::language::Language;

/// Number of genres shown by [`Book::display_genre`]
pub const DISPLAY_GENRE_LIMIT: usize = 3;

/// Book with its language, authors and genres loaded.
///
/// `authors` and `genres` keep the order in which they were linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub language: Option<Language>,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

impl Book {
    /// Names of all linked authors, comma separated
    pub fn display_author(&self) -> String {
        self.authors
            .iter()
            .map(Author::name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Names of the first three linked genres, comma separated.
    ///
    /// Unlike [`Book::display_author`] this is truncated.
    pub fn display_genre(&self) -> String {
        self.genres
            .iter()
            .take(DISPLAY_GENRE_LIMIT)
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn url(&self) -> String {
        format!("/catalog/book/{}", self.id)
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Book row without its many-to-many links
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub language_id: Option<i32>,
    pub language_name: Option<String>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        let language = match (row.language_id, row.language_name) {
            (Some(id), Some(name)) => Some(Language { id, name }),
            _ => None,
        };
        Book {
            id: row.id,
            title: row.title,
            summary: row.summary,
            isbn: row.isbn,
            language,
            authors: Vec::new(),
            genres: Vec::new(),
        }
    }
}

/// Create book request. Author and genre ids are linked in the given order.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 1000))]
    #[validate(custom(function = "crate::models::not_blank"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub summary: String,
    /// 13 character ISBN
    #[validate(length(equal = 13))]
    pub isbn: String,
    #[serde(default)]
    pub author_ids: Vec<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    pub language_id: Option<i32>,
}

/// Update book request. Link lists, when present, replace the current ones.
/// `language_id: null` clears the language.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 1000))]
    #[validate(custom(function = "crate::models::not_blank"))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub summary: Option<String>,
    #[validate(length(equal = 13))]
    pub isbn: Option<String>,
    pub author_ids: Option<Vec<i32>>,
    pub genre_ids: Option<Vec<i32>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i32>)]
    pub language_id: Option<Option<i32>>,
}

/// Book as shown in the catalog listing and the admin changelist
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub display_author: String,
    pub display_genre: String,
    pub language: Option<String>,
    pub url: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            display_author: book.display_author(),
            display_genre: book.display_genre(),
            language: book.language.as_ref().map(|l| l.name.clone()),
            url: book.url(),
        }
    }
}

/// Book detail page content, including its physical copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub language: Option<Language>,
    pub authors: Vec<AuthorSummary>,
    pub genres: Vec<Genre>,
    pub display_author: String,
    pub display_genre: String,
    pub url: String,
    pub instances: Vec<BookInstanceView>,
}

impl BookDetail {
    pub fn new(book: &Book, instances: Vec<BookInstanceView>) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            language: book.language.clone(),
            authors: book.authors.iter().map(AuthorSummary::from).collect(),
            genres: book.genres.clone(),
            display_author: book.display_author(),
            display_genre: book.display_genre(),
            url: book.url(),
            instances,
        }
    }
}
