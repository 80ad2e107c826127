//! Book copy persistence

use async_trait::async_trait;
use uuid::Uuid;

use super::{BookInstanceStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{
            BookInstanceFilter, BookInstanceRow, CreateBookInstance, UpdateBookInstance,
        },
        BookInstance, LoanStatus,
    },
};

const INSTANCE_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint, bi.due_back,
           bi.borrower_id, u.username AS borrower_username, bi.status
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

#[async_trait]
impl BookInstanceStore for Repository {
    async fn instance_create(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        if let Some(book_id) = data.book_id {
            self.ensure_exists("books", book_id).await?;
        }
        if let Some(borrower_id) = data.borrower_id {
            self.ensure_exists("users", borrower_id).await?;
        }

        let id = Uuid::new_v4();
        let status = data.status.unwrap_or_default();

        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, borrower_id, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.borrower_id)
        .bind(status.as_code())
        .execute(&self.pool)
        .await?;

        tracing::debug!(instance_id = %id, status = %status, "book copy created");
        self.instance_get(id).await
    }

    async fn instance_get(&self, id: Uuid) -> AppResult<BookInstance> {
        let query = format!("{} WHERE bi.id = $1", INSTANCE_SELECT);
        sqlx::query_as::<_, BookInstanceRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(BookInstance::from)
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    async fn instance_list(&self, filter: &BookInstanceFilter) -> AppResult<Vec<BookInstance>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if filter.book_id.is_some() {
            conditions.push(format!("bi.book_id = ${}", idx));
            idx += 1;
        }
        if filter.status.is_some() {
            conditions.push(format!("bi.status = ${}", idx));
            idx += 1;
        }
        if filter.due_back.is_some() {
            conditions.push(format!("bi.due_back = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "{} {} ORDER BY bi.due_back ASC NULLS LAST, bi.id",
            INSTANCE_SELECT, where_clause
        );

        let mut builder = sqlx::query_as::<_, BookInstanceRow>(&query);
        if let Some(book_id) = filter.book_id {
            builder = builder.bind(book_id);
        }
        if let Some(status) = filter.status {
            builder = builder.bind(status.as_code());
        }
        if let Some(due_back) = filter.due_back {
            builder = builder.bind(due_back);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(BookInstance::from).collect())
    }

    async fn instance_update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
        let current = self.instance_get(id).await?;

        let book_id = match data.book_id {
            Some(book_id) => book_id,
            None => current.book.as_ref().map(|b| b.id),
        };
        let borrower_id = match data.borrower_id {
            Some(borrower_id) => borrower_id,
            None => current.borrower.as_ref().map(|u| u.id),
        };
        if let Some(Some(book_id)) = data.book_id {
            self.ensure_exists("books", book_id).await?;
        }
        if let Some(Some(borrower_id)) = data.borrower_id {
            self.ensure_exists("users", borrower_id).await?;
        }

        let imprint = data.imprint.as_ref().unwrap_or(&current.imprint);
        let due_back = data.due_back.unwrap_or(current.due_back);
        let status = data.status.unwrap_or(current.status);

        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET book_id = $2, imprint = $3, due_back = $4, borrower_id = $5, status = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(book_id)
        .bind(imprint)
        .bind(due_back)
        .bind(borrower_id)
        .bind(status.as_code())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book copy {} not found", id)));
        }

        self.instance_get(id).await
    }

    async fn instance_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book copy {} not found", id)));
        }
        Ok(())
    }

    async fn count_book_instances(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_instances_with_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status.as_code())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
