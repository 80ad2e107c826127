//! Author persistence

use async_trait::async_trait;

use super::{AuthorStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{CreateAuthor, UpdateAuthor},
        Author, Page, PageRequest,
    },
};

const AUTHOR_COLUMNS: &str = "id, first_name, last_name, date_of_birth, date_of_death";

#[async_trait]
impl AuthorStore for Repository {
    async fn author_create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let query = format!(
            r#"
            INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        );
        let row = sqlx::query_as::<_, Author>(&query)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(data.date_of_birth)
            .bind(data.date_of_death)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_author_by_id(&self, id: i32) -> AppResult<Author> {
        let query = format!("SELECT {} FROM authors WHERE id = $1", AUTHOR_COLUMNS);
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn list_authors(&self, page: PageRequest) -> AppResult<Page<Author>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {} FROM authors ORDER BY last_name COLLATE \"C\" DESC, id LIMIT $1 OFFSET $2",
            AUTHOR_COLUMNS
        );
        let rows = sqlx::query_as::<_, Author>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(rows, total, page))
    }

    async fn author_update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        let mut author = self.get_author_by_id(id).await?;
        data.apply(&mut author);

        let query = format!(
            r#"
            UPDATE authors
            SET first_name = $2, last_name = $3, date_of_birth = $4, date_of_death = $5
            WHERE id = $1
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        );
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .bind(&author.first_name)
            .bind(&author.last_name)
            .bind(author.date_of_birth)
            .bind(author.date_of_death)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn author_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }

    async fn count_authors(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
