//! HTTP handlers and router for the LocalLibrary server

pub mod admin;
pub mod catalog;
pub mod health;
pub mod openapi;

use axum::{
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::SessionConfig,
    models::{author::Author, book::BookSummary, Page},
    AppState,
};

/// Paginated response wrapper for admin listings
#[derive(Serialize, ToSchema)]
#[aliases(AuthorPage = PaginatedResponse<Author>, BookSummaryPage = PaginatedResponse<BookSummary>)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub items: Vec<T>,
    /// Total number of entries
    pub total: i64,
    /// Current page number
    pub page: u32,
    /// Entries per page
    pub page_size: u32,
    pub num_pages: i64,
}

impl<T> From<Page<T>> for PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    fn from(page: Page<T>) -> Self {
        let num_pages = page.num_pages();
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            num_pages,
        }
    }
}

/// Session key carried by the request cookie, or a new one added to the jar.
/// Cookie values that are not UUIDs are replaced.
pub(crate) fn session_key(jar: CookieJar, config: &SessionConfig) -> (CookieJar, String) {
    let existing = jar
        .get(&config.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|value| Uuid::parse_str(value).is_ok());

    if let Some(key) = existing {
        return (jar, key);
    }

    let key = Uuid::new_v4().to_string();
    let cookie = Cookie::build((config.cookie_name.clone(), key.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    tracing::debug!(session = %key, "new session started");
    (jar.add(cookie), key)
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog views
        .route("/", get(|| async { Redirect::permanent("/catalog/") }))
        .route("/catalog/", get(catalog::index))
        .route("/catalog/books", get(catalog::book_list))
        .route("/catalog/book/:id", get(catalog::book_detail))
        .route("/catalog/authors", get(catalog::author_list))
        .route("/catalog/author/:id", get(catalog::author_detail))
        .nest("/admin", admin::routes())
        .with_state(state);

    Router::new()
        .merge(app)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
