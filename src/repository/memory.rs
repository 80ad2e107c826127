//! In-process catalog storage with the same semantics as the PostgreSQL
//! repository: per-table id sequences, ordered many-to-many links and
//! clear-on-delete references.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    dedup_ids, AuthorStore, BookInstanceStore, BookStore, GenreStore, LanguageStore, UserStore,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{CreateAuthor, UpdateAuthor},
        book::{CreateBook, UpdateBook},
        book_instance::{
            listing_order, BookInstanceFilter, BookRef, BorrowerRef, CreateBookInstance,
            UpdateBookInstance,
        },
        user::CreateUser,
        Author, Book, BookInstance, Genre, Language, LoanStatus, Page, PageRequest, User,
    },
};

#[derive(Debug, Clone)]
struct BookRecord {
    id: i32,
    title: String,
    summary: String,
    isbn: String,
    language_id: Option<i32>,
    author_ids: Vec<i32>,
    genre_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
struct InstanceRecord {
    id: Uuid,
    book_id: Option<i32>,
    imprint: String,
    due_back: Option<chrono::NaiveDate>,
    borrower_id: Option<i32>,
    status: LoanStatus,
}

#[derive(Debug, Default)]
struct MemoryState {
    sequences: HashMap<&'static str, i32>,
    genres: BTreeMap<i32, Genre>,
    languages: BTreeMap<i32, Language>,
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, BookRecord>,
    instances: HashMap<Uuid, InstanceRecord>,
    users: BTreeMap<i32, User>,
}

impl MemoryState {
    fn next_id(&mut self, table: &'static str) -> i32 {
        let current = self.sequences.entry(table).or_insert(0);
        *current += 1;
        *current
    }

    fn book(&self, record: &BookRecord) -> Book {
        Book {
            id: record.id,
            title: record.title.clone(),
            summary: record.summary.clone(),
            isbn: record.isbn.clone(),
            language: record
                .language_id
                .and_then(|id| self.languages.get(&id).cloned()),
            authors: record
                .author_ids
                .iter()
                .filter_map(|id| self.authors.get(id).cloned())
                .collect(),
            genres: record
                .genre_ids
                .iter()
                .filter_map(|id| self.genres.get(id).cloned())
                .collect(),
        }
    }

    fn instance(&self, record: &InstanceRecord) -> BookInstance {
        BookInstance {
            id: record.id,
            book: record.book_id.and_then(|id| {
                self.books.get(&id).map(|b| BookRef {
                    id,
                    title: b.title.clone(),
                })
            }),
            imprint: record.imprint.clone(),
            due_back: record.due_back,
            borrower: record.borrower_id.and_then(|id| {
                self.users.get(&id).map(|u| BorrowerRef {
                    id,
                    username: u.username.clone(),
                })
            }),
            status: record.status,
        }
    }

    /// Books sorted by descending title, then id
    fn sorted_books<'a>(&'a self, records: impl Iterator<Item = &'a BookRecord>) -> Vec<Book> {
        let mut books: Vec<Book> = records.map(|r| self.book(r)).collect();
        books.sort_by(|a, b| b.title.cmp(&a.title).then(a.id.cmp(&b.id)));
        books
    }

    fn check_book_references(
        &self,
        author_ids: Option<&[i32]>,
        genre_ids: Option<&[i32]>,
        language_id: Option<i32>,
    ) -> AppResult<()> {
        if let Some(id) = author_ids
            .unwrap_or_default()
            .iter()
            .find(|id| !self.authors.contains_key(id))
        {
            return Err(AppError::Validation(format!("Unknown author reference: {}", id)));
        }
        if let Some(id) = genre_ids
            .unwrap_or_default()
            .iter()
            .find(|id| !self.genres.contains_key(id))
        {
            return Err(AppError::Validation(format!("Unknown genre reference: {}", id)));
        }
        if let Some(id) = language_id {
            if !self.languages.contains_key(&id) {
                return Err(AppError::Validation(format!("Unknown language reference: {}", id)));
            }
        }
        Ok(())
    }

    fn check_instance_references(&self, book_id: Option<i32>, borrower_id: Option<i32>) -> AppResult<()> {
        if let Some(id) = book_id {
            if !self.books.contains_key(&id) {
                return Err(AppError::Validation(format!("Unknown book reference: {}", id)));
            }
        }
        if let Some(id) = borrower_id {
            if !self.users.contains_key(&id) {
                return Err(AppError::Validation(format!("Unknown user reference: {}", id)));
            }
        }
        Ok(())
    }
}

/// Catalog kept in process memory, lost on restart
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GenreStore for MemoryRepository {
    async fn genre_create(&self, name: &str) -> AppResult<Genre> {
        let mut state = self.state.write().await;
        let id = state.next_id("genres");
        let genre = Genre {
            id,
            name: name.to_string(),
        };
        state.genres.insert(id, genre.clone());
        Ok(genre)
    }

    async fn genre_get(&self, id: i32) -> AppResult<Genre> {
        let state = self.state.read().await;
        state
            .genres
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    async fn genre_list(&self) -> AppResult<Vec<Genre>> {
        let state = self.state.read().await;
        let mut genres: Vec<Genre> = state.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(genres)
    }

    async fn genre_update(&self, id: i32, name: &str) -> AppResult<Genre> {
        let mut state = self.state.write().await;
        let genre = state
            .genres
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))?;
        genre.name = name.to_string();
        Ok(genre.clone())
    }

    async fn genre_delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.genres.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Genre {} not found", id)));
        }
        for book in state.books.values_mut() {
            book.genre_ids.retain(|g| *g != id);
        }
        Ok(())
    }

    async fn count_genres(&self) -> AppResult<i64> {
        Ok(self.state.read().await.genres.len() as i64)
    }
}

#[async_trait]
impl LanguageStore for MemoryRepository {
    async fn language_create(&self, name: &str) -> AppResult<Language> {
        let mut state = self.state.write().await;
        let id = state.next_id("languages");
        let language = Language {
            id,
            name: name.to_string(),
        };
        state.languages.insert(id, language.clone());
        Ok(language)
    }

    async fn language_get(&self, id: i32) -> AppResult<Language> {
        let state = self.state.read().await;
        state
            .languages
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Language {} not found", id)))
    }

    async fn language_list(&self) -> AppResult<Vec<Language>> {
        let state = self.state.read().await;
        let mut languages: Vec<Language> = state.languages.values().cloned().collect();
        languages.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(languages)
    }

    async fn language_update(&self, id: i32, name: &str) -> AppResult<Language> {
        let mut state = self.state.write().await;
        let language = state
            .languages
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Language {} not found", id)))?;
        language.name = name.to_string();
        Ok(language.clone())
    }

    async fn language_delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.languages.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Language {} not found", id)));
        }
        for book in state.books.values_mut() {
            if book.language_id == Some(id) {
                book.language_id = None;
            }
        }
        tracing::info!(language_id = id, "language deleted, books keep existing without it");
        Ok(())
    }
}

#[async_trait]
impl AuthorStore for MemoryRepository {
    async fn author_create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let mut state = self.state.write().await;
        let id = state.next_id("authors");
        let author = Author {
            id,
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            date_of_birth: data.date_of_birth,
            date_of_death: data.date_of_death,
        };
        state.authors.insert(id, author.clone());
        Ok(author)
    }

    async fn get_author_by_id(&self, id: i32) -> AppResult<Author> {
        let state = self.state.read().await;
        state
            .authors
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn list_authors(&self, page: PageRequest) -> AppResult<Page<Author>> {
        let state = self.state.read().await;
        let mut authors: Vec<Author> = state.authors.values().cloned().collect();
        authors.sort_by(|a, b| b.last_name.cmp(&a.last_name).then(a.id.cmp(&b.id)));
        Ok(Page::from_sorted(authors, page))
    }

    async fn author_update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        let mut state = self.state.write().await;
        let author = state
            .authors
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;
        data.apply(author);
        Ok(author.clone())
    }

    async fn author_delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.authors.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        for book in state.books.values_mut() {
            book.author_ids.retain(|a| *a != id);
        }
        Ok(())
    }

    async fn count_authors(&self) -> AppResult<i64> {
        Ok(self.state.read().await.authors.len() as i64)
    }
}

#[async_trait]
impl BookStore for MemoryRepository {
    async fn book_create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut state = self.state.write().await;
        state.check_book_references(Some(&data.author_ids), Some(&data.genre_ids), data.language_id)?;

        let id = state.next_id("books");
        let record = BookRecord {
            id,
            title: data.title.clone(),
            summary: data.summary.clone(),
            isbn: data.isbn.clone(),
            language_id: data.language_id,
            author_ids: dedup_ids(&data.author_ids),
            genre_ids: dedup_ids(&data.genre_ids),
        };
        let book = state.book(&record);
        state.books.insert(id, record);
        Ok(book)
    }

    async fn get_book_by_id(&self, id: i32) -> AppResult<Book> {
        let state = self.state.read().await;
        state
            .books
            .get(&id)
            .map(|record| state.book(record))
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn list_books(&self, page: PageRequest) -> AppResult<Page<Book>> {
        let state = self.state.read().await;
        let books = state.sorted_books(state.books.values());
        Ok(Page::from_sorted(books, page))
    }

    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let state = self.state.read().await;
        Ok(state.sorted_books(
            state
                .books
                .values()
                .filter(|b| b.author_ids.contains(&author_id)),
        ))
    }

    async fn book_update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut state = self.state.write().await;
        if !state.books.contains_key(&id) {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        state.check_book_references(
            data.author_ids.as_deref(),
            data.genre_ids.as_deref(),
            data.language_id.flatten(),
        )?;

        let record = state
            .books
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        if let Some(ref title) = data.title {
            record.title = title.clone();
        }
        if let Some(ref summary) = data.summary {
            record.summary = summary.clone();
        }
        if let Some(ref isbn) = data.isbn {
            record.isbn = isbn.clone();
        }
        if let Some(language_id) = data.language_id {
            record.language_id = language_id;
        }
        if let Some(ref author_ids) = data.author_ids {
            record.author_ids = dedup_ids(author_ids);
        }
        if let Some(ref genre_ids) = data.genre_ids {
            record.genre_ids = dedup_ids(genre_ids);
        }

        let record = record.clone();
        Ok(state.book(&record))
    }

    async fn book_delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.books.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        for instance in state.instances.values_mut() {
            if instance.book_id == Some(id) {
                instance.book_id = None;
            }
        }
        tracing::info!(book_id = id, "book deleted, its copies are kept");
        Ok(())
    }

    async fn count_books(&self) -> AppResult<i64> {
        Ok(self.state.read().await.books.len() as i64)
    }

    async fn count_books_matching_title_substring(&self, substr: &str) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .books
            .values()
            .filter(|b| b.title.contains(substr))
            .count() as i64)
    }
}

#[async_trait]
impl BookInstanceStore for MemoryRepository {
    async fn instance_create(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let mut state = self.state.write().await;
        state.check_instance_references(data.book_id, data.borrower_id)?;

        let record = InstanceRecord {
            id: Uuid::new_v4(),
            book_id: data.book_id,
            imprint: data.imprint.clone(),
            due_back: data.due_back,
            borrower_id: data.borrower_id,
            status: data.status.unwrap_or_default(),
        };
        let instance = state.instance(&record);
        state.instances.insert(record.id, record);
        Ok(instance)
    }

    async fn instance_get(&self, id: Uuid) -> AppResult<BookInstance> {
        let state = self.state.read().await;
        state
            .instances
            .get(&id)
            .map(|record| state.instance(record))
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    async fn instance_list(&self, filter: &BookInstanceFilter) -> AppResult<Vec<BookInstance>> {
        let state = self.state.read().await;
        let mut instances: Vec<BookInstance> = state
            .instances
            .values()
            .map(|record| state.instance(record))
            .filter(|instance| filter.matches(instance))
            .collect();
        instances.sort_by(listing_order);
        Ok(instances)
    }

    async fn instance_update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
        let mut state = self.state.write().await;
        if !state.instances.contains_key(&id) {
            return Err(AppError::NotFound(format!("Book copy {} not found", id)));
        }
        state.check_instance_references(data.book_id.flatten(), data.borrower_id.flatten())?;

        let record = state
            .instances
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))?;
        if let Some(book_id) = data.book_id {
            record.book_id = book_id;
        }
        if let Some(ref imprint) = data.imprint {
            record.imprint = imprint.clone();
        }
        if let Some(due_back) = data.due_back {
            record.due_back = due_back;
        }
        if let Some(borrower_id) = data.borrower_id {
            record.borrower_id = borrower_id;
        }
        if let Some(status) = data.status {
            record.status = status;
        }

        let record = record.clone();
        Ok(state.instance(&record))
    }

    async fn instance_delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .instances
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    async fn count_book_instances(&self) -> AppResult<i64> {
        Ok(self.state.read().await.instances.len() as i64)
    }

    async fn count_instances_with_status(&self, status: LoanStatus) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .instances
            .values()
            .filter(|i| i.status == status)
            .count() as i64)
    }
}

#[async_trait]
impl UserStore for MemoryRepository {
    async fn user_create(&self, data: &CreateUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == data.username) {
            return Err(AppError::Validation(format!(
                "Username {} is already taken",
                data.username
            )));
        }
        let id = state.next_id("users");
        let user = User {
            id,
            username: data.username.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            email: data.email.clone(),
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn user_get(&self, id: i32) -> AppResult<User> {
        let state = self.state.read().await;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn user_list(&self) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn user_delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        for instance in state.instances.values_mut() {
            if instance.borrower_id == Some(id) {
                instance.borrower_id = None;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_book(title: &str) -> CreateBook {
        CreateBook {
            title: title.to_string(),
            summary: String::new(),
            isbn: "9780000000000".to_string(),
            author_ids: vec![],
            genre_ids: vec![],
            language_id: None,
        }
    }

    fn new_copy(book_id: Option<i32>, due_back: Option<NaiveDate>) -> CreateBookInstance {
        CreateBookInstance {
            book_id,
            imprint: "First edition".to_string(),
            due_back,
            borrower_id: None,
            status: None,
        }
    }

    async fn five_books(repo: &MemoryRepository) {
        for title in ["Alpha", "Echo", "Charlie", "Bravo", "Delta"] {
            repo.book_create(&new_book(title)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn deleting_language_clears_book_reference() {
        let repo = MemoryRepository::new();
        let language = repo.language_create("French").await.unwrap();
        let mut data = new_book("Les Misérables");
        data.language_id = Some(language.id);
        let book = repo.book_create(&data).await.unwrap();
        assert_eq!(book.language.as_ref().map(|l| l.id), Some(language.id));

        repo.language_delete(language.id).await.unwrap();

        let book = repo.get_book_by_id(book.id).await.unwrap();
        assert!(book.language.is_none());
        assert_eq!(repo.count_books().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_book_keeps_its_copies() {
        let repo = MemoryRepository::new();
        let book = repo.book_create(&new_book("Dune")).await.unwrap();
        let copy = repo.instance_create(&new_copy(Some(book.id), None)).await.unwrap();
        assert_eq!(copy.book.as_ref().map(|b| b.title.as_str()), Some("Dune"));

        repo.book_delete(book.id).await.unwrap();

        let copy = repo.instance_get(copy.id).await.unwrap();
        assert!(copy.book.is_none());
        assert_eq!(repo.count_book_instances().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_user_clears_borrower() {
        let repo = MemoryRepository::new();
        let user = repo
            .user_create(&CreateUser {
                username: "reader".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
            })
            .await
            .unwrap();
        let mut data = new_copy(None, None);
        data.borrower_id = Some(user.id);
        data.status = Some(LoanStatus::OnLoan);
        let copy = repo.instance_create(&data).await.unwrap();
        assert_eq!(copy.borrower.as_ref().map(|u| u.id), Some(user.id));

        repo.user_delete(user.id).await.unwrap();

        let copy = repo.instance_get(copy.id).await.unwrap();
        assert!(copy.borrower.is_none());
        assert_eq!(copy.status, LoanStatus::OnLoan);
    }

    #[tokio::test]
    async fn books_are_paginated_by_descending_title() {
        let repo = MemoryRepository::new();
        five_books(&repo).await;

        let first = repo.list_books(PageRequest::new(1, 2)).await.unwrap();
        let titles: Vec<&str> = first.items.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Echo", "Delta"]);
        assert_eq!(first.total, 5);
        assert!(first.has_next());

        let third = repo.list_books(PageRequest::new(3, 2)).await.unwrap();
        assert_eq!(third.items.len(), 1);
        assert_eq!(third.items[0].title, "Alpha");

        let fourth = repo.list_books(PageRequest::new(4, 2)).await.unwrap();
        assert!(fourth.items.is_empty());
        assert!(!fourth.has_next());
    }

    #[tokio::test]
    async fn titles_sort_by_byte_order() {
        let repo = MemoryRepository::new();
        for title in ["Project", "the project", "Zoo", "apple"] {
            repo.book_create(&new_book(title)).await.unwrap();
        }
        let page = repo.list_books(PageRequest::new(1, 10)).await.unwrap();
        let titles: Vec<&str> = page.items.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["the project", "apple", "Zoo", "Project"]);
    }

    #[tokio::test]
    async fn authors_are_listed_by_descending_last_name() {
        let repo = MemoryRepository::new();
        for (first, last) in [("Isaac", "Asimov"), ("Frank", "Herbert"), ("Iain", "Banks")] {
            repo.author_create(&CreateAuthor {
                first_name: first.to_string(),
                last_name: last.to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        }
        let page = repo.list_authors(PageRequest::new(1, 10)).await.unwrap();
        let names: Vec<String> = page.items.iter().map(Author::name).collect();
        assert_eq!(names, vec!["Frank Herbert", "Iain Banks", "Isaac Asimov"]);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let repo = MemoryRepository::new();
        assert!(matches!(repo.get_book_by_id(42).await, Err(AppError::NotFound(_))));
        assert!(matches!(repo.get_author_by_id(42).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            repo.instance_get(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn links_keep_insertion_order() {
        let repo = MemoryRepository::new();
        let mut genre_ids = Vec::new();
        for name in ["Zeta", "Alpha", "Mu", "Beta"] {
            genre_ids.push(repo.genre_create(name).await.unwrap().id);
        }
        let mut data = new_book("Ordered");
        data.genre_ids = genre_ids;
        let book = repo.book_create(&data).await.unwrap();
        assert_eq!(book.display_genre(), "Zeta, Alpha, Mu");
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let repo = MemoryRepository::new();
        let mut data = new_book("Orphan");
        data.author_ids = vec![99];
        assert!(matches!(repo.book_create(&data).await, Err(AppError::Validation(_))));
        assert_eq!(repo.count_books().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_author_only_removes_links() {
        let repo = MemoryRepository::new();
        let author = repo
            .author_create(&CreateAuthor {
                first_name: "Neil".to_string(),
                last_name: "Gaiman".to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        let mut data = new_book("Good Omens");
        data.author_ids = vec![author.id];
        let book = repo.book_create(&data).await.unwrap();

        repo.author_delete(author.id).await.unwrap();

        let book = repo.get_book_by_id(book.id).await.unwrap();
        assert!(book.authors.is_empty());
        assert_eq!(book.display_author(), "");
    }

    #[tokio::test]
    async fn counts_follow_current_state() {
        let repo = MemoryRepository::new();
        five_books(&repo).await;
        repo.book_create(&new_book("Project Hail Mary")).await.unwrap();
        repo.book_create(&new_book("The project")).await.unwrap();

        assert_eq!(repo.count_books().await.unwrap(), 7);
        assert_eq!(repo.count_books_matching_title_substring("Project").await.unwrap(), 1);
        assert_eq!(repo.count_books_matching_title_substring("").await.unwrap(), 7);

        let mut data = new_copy(None, None);
        data.status = Some(LoanStatus::Available);
        let copy = repo.instance_create(&data).await.unwrap();
        repo.instance_create(&new_copy(None, None)).await.unwrap();
        assert_eq!(repo.count_available_instances().await.unwrap(), 1);

        repo.instance_update(
            copy.id,
            &UpdateBookInstance {
                status: Some(LoanStatus::OnLoan),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(repo.count_available_instances().await.unwrap(), 0);
        assert_eq!(repo.count_book_instances().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn copies_are_listed_by_due_date() {
        let repo = MemoryRepository::new();
        let book = repo.book_create(&new_book("Dune")).await.unwrap();
        let late = NaiveDate::from_ymd_opt(2024, 9, 1);
        let early = NaiveDate::from_ymd_opt(2024, 3, 1);
        repo.instance_create(&new_copy(Some(book.id), None)).await.unwrap();
        repo.instance_create(&new_copy(Some(book.id), late)).await.unwrap();
        repo.instance_create(&new_copy(None, early)).await.unwrap();

        let all = repo.instance_list(&BookInstanceFilter::default()).await.unwrap();
        let dates: Vec<Option<NaiveDate>> = all.iter().map(|i| i.due_back).collect();
        assert_eq!(dates, vec![early, late, None]);

        let of_book = repo.instances_of_book(book.id).await.unwrap();
        assert_eq!(of_book.len(), 2);
        assert_eq!(of_book[0].due_back, late);
    }

    #[tokio::test]
    async fn update_can_clear_due_date() {
        let repo = MemoryRepository::new();
        let copy = repo
            .instance_create(&new_copy(None, NaiveDate::from_ymd_opt(2024, 1, 1)))
            .await
            .unwrap();
        let updated = repo
            .instance_update(
                copy.id,
                &UpdateBookInstance {
                    due_back: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.due_back.is_none());
        assert_eq!(updated.imprint, "First edition");
    }
}
