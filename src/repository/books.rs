//! Book persistence, including the ordered author and genre links

use async_trait::async_trait;
use sqlx::{Postgres, Row, Transaction};

use super::{dedup_ids, BookStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookRow, CreateBook, UpdateBook},
        Author, Book, Genre, Page, PageRequest,
    },
};

const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.summary, b.isbn, b.language_id, l.name AS language_name
    FROM books b
    LEFT JOIN languages l ON l.id = b.language_id
"#;

impl Repository {
    /// Load authors and genres of `books` in link order, two queries for the whole slice
    async fn books_attach_links(&self, books: &mut [Book]) -> AppResult<()> {
        if books.is_empty() {
            return Ok(());
        }
        let ids: Vec<i32> = books.iter().map(|b| b.id).collect();

        let author_rows = sqlx::query(
            r#"
            SELECT ba.book_id, a.id, a.first_name, a.last_name, a.date_of_birth, a.date_of_death
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = ANY($1)
            ORDER BY ba.book_id, ba.position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        for r in author_rows {
            let book_id: i32 = r.get("book_id");
            if let Some(book) = books.iter_mut().find(|b| b.id == book_id) {
                book.authors.push(Author {
                    id: r.get("id"),
                    first_name: r.get("first_name"),
                    last_name: r.get("last_name"),
                    date_of_birth: r.get("date_of_birth"),
                    date_of_death: r.get("date_of_death"),
                });
            }
        }

        let genre_rows = sqlx::query(
            r#"
            SELECT bg.book_id, g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = ANY($1)
            ORDER BY bg.book_id, bg.position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        for r in genre_rows {
            let book_id: i32 = r.get("book_id");
            if let Some(book) = books.iter_mut().find(|b| b.id == book_id) {
                book.genres.push(Genre {
                    id: r.get("id"),
                    name: r.get("name"),
                });
            }
        }

        Ok(())
    }

    async fn books_check_references(
        &self,
        author_ids: Option<&[i32]>,
        genre_ids: Option<&[i32]>,
        language_id: Option<i32>,
    ) -> AppResult<()> {
        for id in author_ids.unwrap_or_default() {
            self.ensure_exists("authors", *id).await?;
        }
        for id in genre_ids.unwrap_or_default() {
            self.ensure_exists("genres", *id).await?;
        }
        if let Some(id) = language_id {
            self.ensure_exists("languages", id).await?;
        }
        Ok(())
    }

    /// Replace the link rows of `link_table` for `book_id`, keeping the given order
    async fn books_replace_links(
        tx: &mut Transaction<'_, Postgres>,
        link_table: &'static str,
        target_column: &'static str,
        book_id: i32,
        target_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query(&format!("DELETE FROM {} WHERE book_id = $1", link_table))
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

        let insert = format!(
            "INSERT INTO {} (book_id, {}, position) VALUES ($1, $2, $3)",
            link_table, target_column
        );
        for (position, target_id) in dedup_ids(target_ids).into_iter().enumerate() {
            sqlx::query(&insert)
                .bind(book_id)
                .bind(target_id)
                .bind(position as i32)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BookStore for Repository {
    async fn book_create(&self, data: &CreateBook) -> AppResult<Book> {
        self.books_check_references(Some(&data.author_ids), Some(&data.genre_ids), data.language_id)
            .await?;

        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, summary, isbn, language_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&data.title)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(data.language_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::books_replace_links(&mut tx, "book_authors", "author_id", id, &data.author_ids).await?;
        Self::books_replace_links(&mut tx, "book_genres", "genre_id", id, &data.genre_ids).await?;

        tx.commit().await?;
        tracing::debug!(book_id = id, "book created");

        self.get_book_by_id(id).await
    }

    async fn get_book_by_id(&self, id: i32) -> AppResult<Book> {
        let query = format!("{} WHERE b.id = $1", BOOK_SELECT);
        let row = sqlx::query_as::<_, BookRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        let mut books = [Book::from(row)];
        self.books_attach_links(&mut books).await?;
        let [book] = books;
        Ok(book)
    }

    async fn list_books(&self, page: PageRequest) -> AppResult<Page<Book>> {
        let total = self.count_books().await?;

        let query = format!("{} ORDER BY b.title COLLATE \"C\" DESC, b.id LIMIT $1 OFFSET $2", BOOK_SELECT);
        let rows = sqlx::query_as::<_, BookRow>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let mut books: Vec<Book> = rows.into_iter().map(Book::from).collect();
        self.books_attach_links(&mut books).await?;
        Ok(Page::new(books, total, page))
    }

    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let query = format!(
            r#"
            {}
            WHERE EXISTS (
                SELECT 1 FROM book_authors ba WHERE ba.book_id = b.id AND ba.author_id = $1
            )
            ORDER BY b.title COLLATE "C" DESC, b.id
            "#,
            BOOK_SELECT
        );
        let rows = sqlx::query_as::<_, BookRow>(&query)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;

        let mut books: Vec<Book> = rows.into_iter().map(Book::from).collect();
        self.books_attach_links(&mut books).await?;
        Ok(books)
    }

    async fn book_update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        self.get_book_by_id(id).await?;
        self.books_check_references(
            data.author_ids.as_deref(),
            data.genre_ids.as_deref(),
            data.language_id.flatten(),
        )
        .await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                summary = COALESCE($3, summary),
                isbn = COALESCE($4, isbn)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.summary)
        .bind(&data.isbn)
        .execute(&mut *tx)
        .await?;

        if let Some(language_id) = data.language_id {
            sqlx::query("UPDATE books SET language_id = $2 WHERE id = $1")
                .bind(id)
                .bind(language_id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(ref author_ids) = data.author_ids {
            Self::books_replace_links(&mut tx, "book_authors", "author_id", id, author_ids).await?;
        }
        if let Some(ref genre_ids) = data.genre_ids {
            Self::books_replace_links(&mut tx, "book_genres", "genre_id", id, genre_ids).await?;
        }

        tx.commit().await?;

        self.get_book_by_id(id).await
    }

    async fn book_delete(&self, id: i32) -> AppResult<()> {
        // book_instances.book_id is ON DELETE SET NULL, links cascade
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        tracing::info!(book_id = id, "book deleted, its copies are kept");
        Ok(())
    }

    async fn count_books(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_books_matching_title_substring(&self, substr: &str) -> AppResult<i64> {
        // strpos avoids LIKE wildcards in user input; strpos(x, '') = 1
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE strpos(title, $1) > 0")
            .bind(substr)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
