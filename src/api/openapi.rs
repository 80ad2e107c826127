//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, catalog, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocalLibrary API",
        version = "0.3.0",
        description = "Catalog views and administration of a small local library"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::index,
        catalog::book_list,
        catalog::book_detail,
        catalog::author_list,
        catalog::author_detail,
        // Admin: genres
        admin::list_genres,
        admin::get_genre,
        admin::create_genre,
        admin::update_genre,
        admin::delete_genre,
        // Admin: languages
        admin::list_languages,
        admin::get_language,
        admin::create_language,
        admin::update_language,
        admin::delete_language,
        // Admin: authors
        admin::list_authors,
        admin::get_author,
        admin::create_author,
        admin::update_author,
        admin::delete_author,
        // Admin: books
        admin::list_books,
        admin::get_book,
        admin::create_book,
        admin::update_book,
        admin::delete_book,
        admin::list_book_instances,
        // Admin: book copies
        admin::list_instances,
        admin::get_instance,
        admin::create_instance,
        admin::update_instance,
        admin::delete_instance,
        // Admin: users
        admin::list_users,
        admin::get_user,
        admin::create_user,
        admin::delete_user,
    ),
    components(
        schemas(
            // Catalog contexts
            crate::services::catalog::IndexContext,
            crate::services::catalog::BookListContext,
            crate::services::catalog::AuthorListContext,
            crate::services::catalog::BookDetailContext,
            crate::services::catalog::AuthorDetailContext,
            crate::models::PageInfo,
            crate::models::book::BookSummary,
            crate::models::book::BookDetail,
            crate::models::author::AuthorSummary,
            crate::models::author::AuthorDetail,
            // Records
            crate::models::Genre,
            crate::models::genre::GenreInput,
            crate::models::Language,
            crate::models::language::LanguageInput,
            crate::models::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::BookInstance,
            crate::models::LoanStatus,
            crate::models::book_instance::BookRef,
            crate::models::book_instance::BorrowerRef,
            crate::models::book_instance::BookInstanceView,
            crate::models::book_instance::CreateBookInstance,
            crate::models::book_instance::UpdateBookInstance,
            crate::models::User,
            crate::models::user::CreateUser,
            // Admin listings
            crate::api::AuthorPage,
            crate::api::BookSummaryPage,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Public catalog views"),
        (name = "admin", description = "Catalog administration")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
