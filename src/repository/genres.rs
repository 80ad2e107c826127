//! Genre persistence

use async_trait::async_trait;

use super::{GenreStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::Genre,
};

#[async_trait]
impl GenreStore for Repository {
    async fn genre_create(&self, name: &str) -> AppResult<Genre> {
        let row = sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        tracing::debug!(genre_id = row.id, "genre created");
        Ok(row)
    }

    async fn genre_get(&self, id: i32) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    async fn genre_list(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name COLLATE \"C\", id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn genre_update(&self, id: i32, name: &str) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("UPDATE genres SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    async fn genre_delete(&self, id: i32) -> AppResult<()> {
        // book_genres rows go with it (ON DELETE CASCADE on the link table only)
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre {} not found", id)));
        }
        Ok(())
    }

    async fn count_genres(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
