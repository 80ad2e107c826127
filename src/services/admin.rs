//! Catalog maintenance: validated create, update and delete of every record type

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{CreateAuthor, UpdateAuthor},
        book::{BookSummary, CreateBook, UpdateBook},
        book_instance::{
            BookInstanceFilter, BookInstanceView, CreateBookInstance, UpdateBookInstance,
        },
        genre::GenreInput,
        language::LanguageInput,
        user::CreateUser,
        Author, Book, BookInstance, Genre, Language, Page, PageRequest, User,
    },
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn CatalogStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    // Genres

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.store.genre_list().await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.store.genre_get(id).await
    }

    pub async fn create_genre(&self, input: &GenreInput) -> AppResult<Genre> {
        input.validate()?;
        let genre = self.store.genre_create(input.name.trim()).await?;
        tracing::info!(genre_id = genre.id, "genre created");
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i32, input: &GenreInput) -> AppResult<Genre> {
        input.validate()?;
        self.store.genre_update(id, input.name.trim()).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.store.genre_delete(id).await?;
        tracing::info!(genre_id = id, "genre deleted");
        Ok(())
    }

    // Languages

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.store.language_list().await
    }

    pub async fn get_language(&self, id: i32) -> AppResult<Language> {
        self.store.language_get(id).await
    }

    pub async fn create_language(&self, input: &LanguageInput) -> AppResult<Language> {
        input.validate()?;
        let language = self.store.language_create(&input.name_or_default()).await?;
        tracing::info!(language_id = language.id, name = %language.name, "language created");
        Ok(language)
    }

    pub async fn update_language(&self, id: i32, input: &LanguageInput) -> AppResult<Language> {
        input.validate()?;
        self.store.language_update(id, &input.name_or_default()).await
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.store.language_delete(id).await
    }

    // Authors

    pub async fn list_authors(&self, page: PageRequest) -> AppResult<Page<Author>> {
        self.store.list_authors(page).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.store.get_author_by_id(id).await
    }

    pub async fn create_author(&self, data: &CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.store.author_create(data).await?;
        tracing::info!(author_id = author.id, "author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.store.author_update(id, data).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.store.author_delete(id).await?;
        tracing::info!(author_id = id, "author deleted");
        Ok(())
    }

    // Books

    /// Changelist rows with their display strings
    pub async fn list_books(&self, page: PageRequest) -> AppResult<Page<BookSummary>> {
        let page = self.store.list_books(page).await?;
        Ok(page.map(|book| BookSummary::from(&book)))
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.store.get_book_by_id(id).await
    }

    pub async fn create_book(&self, data: &CreateBook) -> AppResult<Book> {
        data.validate()?;
        let book = self.store.book_create(data).await?;
        tracing::info!(book_id = book.id, title = %book.title, "book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        data.validate()?;
        self.store.book_update(id, data).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.store.book_delete(id).await
    }

    /// Copies of one book, as listed inline on its admin page
    pub async fn book_instances(&self, book_id: i32) -> AppResult<Vec<BookInstanceView>> {
        self.store.get_book_by_id(book_id).await?;
        let instances = self.store.instances_of_book(book_id).await?;
        Ok(instances.iter().map(BookInstanceView::from).collect())
    }

    // Book copies

    pub async fn list_instances(&self, filter: &BookInstanceFilter) -> AppResult<Vec<BookInstanceView>> {
        let instances = self.store.instance_list(filter).await?;
        Ok(instances.iter().map(BookInstanceView::from).collect())
    }

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.store.instance_get(id).await
    }

    pub async fn create_instance(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        data.validate()?;
        let instance = self.store.instance_create(data).await?;
        tracing::info!(instance_id = %instance.id, status = %instance.status, "book copy created");
        Ok(instance)
    }

    pub async fn update_instance(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
        data.validate()?;
        let instance = self.store.instance_update(id, data).await?;
        tracing::debug!(instance_id = %id, status = %instance.status, "book copy updated");
        Ok(instance)
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.store.instance_delete(id).await
    }

    // Users

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.store.user_list().await
    }

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.store.user_get(id).await
    }

    pub async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        data.validate()?;
        let user = self.store.user_create(data).await?;
        tracing::info!(user_id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.store.user_delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, repository::MemoryRepository};

    fn service() -> AdminService {
        AdminService::new(Arc::new(MemoryRepository::new()))
    }

    fn book(isbn: &str) -> CreateBook {
        CreateBook {
            title: "The Dispossessed".to_string(),
            summary: String::new(),
            isbn: isbn.to_string(),
            author_ids: vec![],
            genre_ids: vec![],
            language_id: None,
        }
    }

    #[tokio::test]
    async fn isbn_must_have_thirteen_characters() {
        let admin = service();
        let err = admin.create_book(&book("12345")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(admin.create_book(&book("9780060512750")).await.is_ok());
    }

    #[tokio::test]
    async fn empty_genre_name_is_rejected() {
        let admin = service();
        let err = admin
            .create_genre(&GenreInput {
                name: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(admin.list_genres().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn whitespace_names_are_rejected() {
        let admin = service();
        let err = admin
            .create_genre(&GenreInput {
                name: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(admin.list_genres().await.unwrap().is_empty());

        let err = admin
            .create_language(&LanguageInput {
                name: Some("\t ".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = admin
            .create_author(&CreateAuthor {
                first_name: "Ursula".to_string(),
                last_name: "  ".to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut data = book("9780060512750");
        data.title = " ".to_string();
        assert!(matches!(
            admin.create_book(&data).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn rename_to_blank_keeps_genre() {
        let admin = service();
        let genre = admin
            .create_genre(&GenreInput {
                name: "Poetry".to_string(),
            })
            .await
            .unwrap();
        let err = admin
            .update_genre(
                genre.id,
                &GenreInput {
                    name: " \n".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(admin.get_genre(genre.id).await.unwrap().name, "Poetry");
    }

    #[tokio::test]
    async fn language_name_defaults_to_english() {
        let admin = service();
        let language = admin
            .create_language(&LanguageInput::default())
            .await
            .unwrap();
        assert_eq!(language.name, "English");
    }

    #[tokio::test]
    async fn book_instances_of_missing_book_is_not_found() {
        let admin = service();
        assert!(matches!(
            admin.book_instances(3).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn book_listing_carries_display_strings() {
        let admin = service();
        let author = admin
            .create_author(&CreateAuthor {
                first_name: "Ursula".to_string(),
                last_name: "Le Guin".to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        let mut data = book("9780060512750");
        data.author_ids = vec![author.id];
        admin.create_book(&data).await.unwrap();

        let page = admin.list_books(PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(page.items[0].display_author, "Ursula Le Guin");
        assert_eq!(page.items[0].display_genre, "");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let admin = service();
        let data = CreateUser {
            username: "marie".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
        };
        admin.create_user(&data).await.unwrap();
        assert!(matches!(
            admin.create_user(&data).await,
            Err(AppError::Validation(_))
        ));
    }
}
