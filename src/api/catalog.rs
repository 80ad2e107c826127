//! Public catalog endpoints. Each returns the context document of its page.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::AppResult,
    models::pagination::PageQuery,
    services::catalog::{
        AuthorDetailContext, AuthorListContext, BookDetailContext, BookListContext, IndexContext,
    },
    AppState,
};

use super::session_key;

/// Home page: catalog counts and the session visit counter
#[utoipa::path(
    get,
    path = "/catalog/",
    tag = "catalog",
    responses(
        (status = 200, description = "Home page context", body = IndexContext)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<IndexContext>)> {
    let (jar, key) = session_key(jar, &state.config.session);

    let mut session = state.services.sessions.load(&key).await?;
    let context = state.services.catalog.index(&mut session).await?;
    state.services.sessions.save(&key, &session).await?;

    Ok((jar, Json(context)))
}

/// Books by descending title, one page at a time
#[utoipa::path(
    get,
    path = "/catalog/books",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "Book list context", body = BookListContext)
    )
)]
pub async fn book_list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<BookListContext>> {
    let config = state.services.catalog.config();
    let page = query.to_request(config.page_size, config.max_page_size);
    let context = state.services.catalog.book_list(page).await?;
    Ok(Json(context))
}

/// Book with its authors, genres, language and copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book detail context", body = BookDetailContext),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetailContext>> {
    let context = state.services.catalog.book_detail(id).await?;
    Ok(Json(context))
}

/// Authors by descending last name, one page at a time
#[utoipa::path(
    get,
    path = "/catalog/authors",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "Author list context", body = AuthorListContext)
    )
)]
pub async fn author_list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<AuthorListContext>> {
    let config = state.services.catalog.config();
    let page = query.to_request(config.page_size, config.max_page_size);
    let context = state.services.catalog.author_list(page).await?;
    Ok(Json(context))
}

/// Author with the books linked to them
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author detail context", body = AuthorDetailContext),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetailContext>> {
    let context = state.services.catalog.author_detail(id).await?;
    Ok(Json(context))
}
