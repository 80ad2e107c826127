//! Repository layer: catalog storage behind the `CatalogStore` traits
//!
//! `Repository` persists to PostgreSQL; `memory::MemoryRepository` keeps the
//! same semantics in process. References to a deleted language, book or user
//! are cleared, never cascaded.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod languages;
pub mod memory;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{CreateAuthor, UpdateAuthor},
        book::{CreateBook, UpdateBook},
        book_instance::{BookInstanceFilter, CreateBookInstance, UpdateBookInstance},
        user::CreateUser,
        Author, Book, BookInstance, Genre, Language, LoanStatus, Page, PageRequest, User,
    },
};

pub use memory::MemoryRepository;

#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn genre_create(&self, name: &str) -> AppResult<Genre>;
    async fn genre_get(&self, id: i32) -> AppResult<Genre>;
    /// All genres ordered by name
    async fn genre_list(&self) -> AppResult<Vec<Genre>>;
    async fn genre_update(&self, id: i32, name: &str) -> AppResult<Genre>;
    /// Removes the genre and its book links
    async fn genre_delete(&self, id: i32) -> AppResult<()>;
    async fn count_genres(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait LanguageStore: Send + Sync {
    async fn language_create(&self, name: &str) -> AppResult<Language>;
    async fn language_get(&self, id: i32) -> AppResult<Language>;
    async fn language_list(&self) -> AppResult<Vec<Language>>;
    async fn language_update(&self, id: i32, name: &str) -> AppResult<Language>;
    /// Removes the language; books written in it keep existing without one
    async fn language_delete(&self, id: i32) -> AppResult<()>;
}

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn author_create(&self, data: &CreateAuthor) -> AppResult<Author>;
    async fn get_author_by_id(&self, id: i32) -> AppResult<Author>;
    /// Authors by descending last name
    async fn list_authors(&self, page: PageRequest) -> AppResult<Page<Author>>;
    async fn author_update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author>;
    /// Removes the author and its book links
    async fn author_delete(&self, id: i32) -> AppResult<()>;
    async fn count_authors(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn book_create(&self, data: &CreateBook) -> AppResult<Book>;
    async fn get_book_by_id(&self, id: i32) -> AppResult<Book>;
    /// Books by descending title
    async fn list_books(&self, page: PageRequest) -> AppResult<Page<Book>>;
    /// Books linked to an author, by descending title
    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;
    async fn book_update(&self, id: i32, data: &UpdateBook) -> AppResult<Book>;
    /// Removes the book; its copies keep existing without one
    async fn book_delete(&self, id: i32) -> AppResult<()>;
    async fn count_books(&self) -> AppResult<i64>;
    /// Case-sensitive substring match on the title
    async fn count_books_matching_title_substring(&self, substr: &str) -> AppResult<i64>;
}

#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    async fn instance_create(&self, data: &CreateBookInstance) -> AppResult<BookInstance>;
    async fn instance_get(&self, id: Uuid) -> AppResult<BookInstance>;
    /// Copies by ascending due date, copies without one last
    async fn instance_list(&self, filter: &BookInstanceFilter) -> AppResult<Vec<BookInstance>>;
    async fn instance_update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance>;
    async fn instance_delete(&self, id: Uuid) -> AppResult<()>;
    async fn count_book_instances(&self) -> AppResult<i64>;
    async fn count_instances_with_status(&self, status: LoanStatus) -> AppResult<i64>;

    async fn count_available_instances(&self) -> AppResult<i64> {
        self.count_instances_with_status(LoanStatus::Available).await
    }

    async fn instances_of_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        self.instance_list(&BookInstanceFilter {
            book_id: Some(book_id),
            ..Default::default()
        })
        .await
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_create(&self, data: &CreateUser) -> AppResult<User>;
    async fn user_get(&self, id: i32) -> AppResult<User>;
    async fn user_list(&self) -> AppResult<Vec<User>>;
    /// Removes the user; copies they borrowed lose their borrower
    async fn user_delete(&self, id: i32) -> AppResult<()>;
}

/// Full catalog storage
pub trait CatalogStore:
    GenreStore + LanguageStore + AuthorStore + BookStore + BookInstanceStore + UserStore
{
}

impl<T> CatalogStore for T where
    T: GenreStore + LanguageStore + AuthorStore + BookStore + BookInstanceStore + UserStore
{
}

/// PostgreSQL catalog repository
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Fail with `Validation` when `id` is absent from `table`
    pub(crate) async fn ensure_exists(&self, table: &'static str, id: i32) -> AppResult<()> {
        let query = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
        let exists: bool = sqlx::query_scalar(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(AppError::Validation(format!(
                "Unknown {} reference: {}",
                table.trim_end_matches('s'),
                id
            )));
        }
        Ok(())
    }
}

/// Drop repeated ids, keeping the first occurrence and the order
pub(crate) fn dedup_ids(ids: &[i32]) -> Vec<i32> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
