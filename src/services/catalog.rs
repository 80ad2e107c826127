//! Public catalog views: home page counts, paginated listings and detail pages

use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    config::CatalogConfig,
    error::AppResult,
    models::{
        author::{AuthorDetail, AuthorSummary},
        book::{BookDetail, BookSummary},
        book_instance::BookInstanceView,
        PageInfo, PageRequest,
    },
    repository::CatalogStore,
    services::sessions::SessionState,
};

/// Home page context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IndexContext {
    pub num_books: i64,
    pub num_instances: i64,
    /// Copies with status available
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Home page views in this session before the current one
    pub num_visits: u64,
    /// Books whose title contains the highlighted word
    pub num_books_part_word: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookListContext {
    pub book_list: Vec<BookSummary>,
    pub is_paginated: bool,
    pub page_obj: PageInfo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorListContext {
    pub author_list: Vec<AuthorSummary>,
    pub is_paginated: bool,
    pub page_obj: PageInfo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetailContext {
    pub book: BookDetail,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetailContext {
    pub author: AuthorDetail,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Cheapest query that proves the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.count_genres().await.map(|_| ())
    }

    /// Home page counts. Exposes the visit counter of `session` as it was
    /// before this view, then increments it.
    pub async fn index(&self, session: &mut SessionState) -> AppResult<IndexContext> {
        let context = IndexContext {
            num_books: self.store.count_books().await?,
            num_instances: self.store.count_book_instances().await?,
            num_instances_available: self.store.count_available_instances().await?,
            num_authors: self.store.count_authors().await?,
            num_genres: self.store.count_genres().await?,
            num_visits: session.num_visits,
            num_books_part_word: self
                .store
                .count_books_matching_title_substring(&self.config.title_highlight)
                .await?,
        };

        session.num_visits += 1;
        Ok(context)
    }

    pub async fn book_list(&self, page: PageRequest) -> AppResult<BookListContext> {
        let page = self.store.list_books(page).await?;
        let page_obj = page.info();

        Ok(BookListContext {
            book_list: page.items.iter().map(BookSummary::from).collect(),
            is_paginated: page_obj.num_pages > 1,
            page_obj,
        })
    }

    pub async fn author_list(&self, page: PageRequest) -> AppResult<AuthorListContext> {
        let page = self.store.list_authors(page).await?;
        let page_obj = page.info();

        Ok(AuthorListContext {
            author_list: page.items.iter().map(AuthorSummary::from).collect(),
            is_paginated: page_obj.num_pages > 1,
            page_obj,
        })
    }

    pub async fn book_detail(&self, id: i32) -> AppResult<BookDetailContext> {
        let book = self.store.get_book_by_id(id).await?;
        let today = Local::now().date_naive();
        let instances = self
            .store
            .instances_of_book(id)
            .await?
            .iter()
            .map(|i| BookInstanceView::new(i, today))
            .collect();

        Ok(BookDetailContext {
            book: BookDetail::new(&book, instances),
        })
    }

    pub async fn author_detail(&self, id: i32) -> AppResult<AuthorDetailContext> {
        let author = self.store.get_author_by_id(id).await?;
        let books = self.store.books_by_author(id).await?;

        Ok(AuthorDetailContext {
            author: AuthorDetail::new(&author, &books),
        })
    }
}
