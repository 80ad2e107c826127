//! Admin endpoints: CRUD over genres, languages, authors, books, copies and users

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

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
        pagination::PageQuery,
        user::CreateUser,
        Author, Book, BookInstance, Genre, Language, User,
    },
    AppState,
};

use super::{AuthorPage, BookSummaryPage, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/genres", get(list_genres).post(create_genre))
        .route(
            "/genres/:id",
            get(get_genre).put(update_genre).delete(delete_genre),
        )
        .route("/languages", get(list_languages).post(create_language))
        .route(
            "/languages/:id",
            get(get_language).put(update_language).delete(delete_language),
        )
        .route("/authors", get(list_authors).post(create_author))
        .route(
            "/authors/:id",
            get(get_author).put(update_author).delete(delete_author),
        )
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/books/:id/instances", get(list_book_instances))
        .route("/bookinstances", get(list_instances).post(create_instance))
        .route(
            "/bookinstances/:id",
            get(get_instance).put(update_instance).delete(delete_instance),
        )
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).delete(delete_user))
}

// Genres

/// List genres by name
#[utoipa::path(
    get,
    path = "/admin/genres",
    tag = "admin",
    responses(
        (status = 200, description = "All genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.services.admin.list_genres().await?))
}

#[utoipa::path(
    get,
    path = "/admin/genres/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre", body = Genre),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_genre(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Genre>> {
    Ok(Json(state.services.admin.get_genre(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/genres",
    tag = "admin",
    request_body = GenreInput,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    Json(input): Json<GenreInput>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    let genre = state.services.admin.create_genre(&input).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

#[utoipa::path(
    put,
    path = "/admin/genres/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Genre ID")),
    request_body = GenreInput,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<GenreInput>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.services.admin.update_genre(id, &input).await?))
}

/// Delete a genre; books lose the link
#[utoipa::path(
    delete,
    path = "/admin/genres/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_genre(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.admin.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Languages

#[utoipa::path(
    get,
    path = "/admin/languages",
    tag = "admin",
    responses(
        (status = 200, description = "All languages", body = Vec<Language>)
    )
)]
pub async fn list_languages(State(state): State<AppState>) -> AppResult<Json<Vec<Language>>> {
    Ok(Json(state.services.admin.list_languages().await?))
}

#[utoipa::path(
    get,
    path = "/admin/languages/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Language ID")),
    responses(
        (status = 200, description = "Language", body = Language),
        (status = 404, description = "Language not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_language(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Language>> {
    Ok(Json(state.services.admin.get_language(id).await?))
}

/// Create a language, English when no name is given
#[utoipa::path(
    post,
    path = "/admin/languages",
    tag = "admin",
    request_body = LanguageInput,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_language(
    State(state): State<AppState>,
    Json(input): Json<LanguageInput>,
) -> AppResult<(StatusCode, Json<Language>)> {
    let language = state.services.admin.create_language(&input).await?;
    Ok((StatusCode::CREATED, Json(language)))
}

#[utoipa::path(
    put,
    path = "/admin/languages/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Language ID")),
    request_body = LanguageInput,
    responses(
        (status = 200, description = "Language updated", body = Language),
        (status = 404, description = "Language not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_language(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<LanguageInput>,
) -> AppResult<Json<Language>> {
    Ok(Json(state.services.admin.update_language(id, &input).await?))
}

/// Delete a language; books written in it keep existing without one
#[utoipa::path(
    delete,
    path = "/admin/languages/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Language ID")),
    responses(
        (status = 204, description = "Language deleted"),
        (status = 404, description = "Language not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_language(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.admin.delete_language(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Authors

#[utoipa::path(
    get,
    path = "/admin/authors",
    tag = "admin",
    params(PageQuery),
    responses(
        (status = 200, description = "Authors by descending last name", body = AuthorPage)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Author>>> {
    let config = &state.config.catalog;
    let page = query.to_request(config.max_page_size, config.max_page_size);
    let authors = state.services.admin.list_authors(page).await?;
    Ok(Json(authors.into()))
}

#[utoipa::path(
    get,
    path = "/admin/authors/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author", body = Author),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_author(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Author>> {
    Ok(Json(state.services.admin.get_author(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/authors",
    tag = "admin",
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    Json(data): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.services.admin.create_author(&data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

#[utoipa::path(
    put,
    path = "/admin/authors/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    Ok(Json(state.services.admin.update_author(id, &data).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/authors/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.admin.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Books

/// Book changelist with display author and genre columns
#[utoipa::path(
    get,
    path = "/admin/books",
    tag = "admin",
    params(PageQuery),
    responses(
        (status = 200, description = "Books by descending title", body = BookSummaryPage)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookSummary>>> {
    let config = &state.config.catalog;
    let page = query.to_request(config.max_page_size, config.max_page_size);
    let books = state.services.admin.list_books(page).await?;
    Ok(Json(books.into()))
}

#[utoipa::path(
    get,
    path = "/admin/books/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Book>> {
    Ok(Json(state.services.admin.get_book(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/books",
    tag = "admin",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input or unknown reference", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(data): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.admin.create_book(&data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

#[utoipa::path(
    put,
    path = "/admin/books/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input or unknown reference", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    Ok(Json(state.services.admin.update_book(id, &data).await?))
}

/// Delete a book; its copies are kept without a book
#[utoipa::path(
    delete,
    path = "/admin/books/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.admin.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Copies of a book, as shown inline on the book admin page
#[utoipa::path(
    get,
    path = "/admin/books/{id}/instances",
    tag = "admin",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Copies of the book", body = Vec<BookInstanceView>),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_book_instances(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BookInstanceView>>> {
    Ok(Json(state.services.admin.book_instances(id).await?))
}

// Book copies

/// Copies by due date, filtered by book, status or due date
#[utoipa::path(
    get,
    path = "/admin/bookinstances",
    tag = "admin",
    params(BookInstanceFilter),
    responses(
        (status = 200, description = "Matching copies", body = Vec<BookInstanceView>)
    )
)]
pub async fn list_instances(
    State(state): State<AppState>,
    Query(filter): Query<BookInstanceFilter>,
) -> AppResult<Json<Vec<BookInstanceView>>> {
    Ok(Json(state.services.admin.list_instances(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/admin/bookinstances/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy", body = BookInstance),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    Ok(Json(state.services.admin.get_instance(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/bookinstances",
    tag = "admin",
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Invalid input or unknown reference", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_instance(
    State(state): State<AppState>,
    Json(data): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    let instance = state.services.admin.create_instance(&data).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

#[utoipa::path(
    put,
    path = "/admin/bookinstances/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Copy ID")),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Copy updated", body = BookInstance),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstance>> {
    Ok(Json(state.services.admin.update_instance(id, &data).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/bookinstances/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_instance(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    state.services.admin.delete_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Users

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "Users by username", body = Vec<User>)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.services.admin.list_users().await?))
}

#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<User>> {
    Ok(Json(state.services.admin.get_user(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "admin",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input or username taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(data): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.admin.create_user(&data).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete a user; copies they borrowed lose their borrower
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.admin.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
