//! Language persistence

use async_trait::async_trait;

use super::{LanguageStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::Language,
};

#[async_trait]
impl LanguageStore for Repository {
    async fn language_create(&self, name: &str) -> AppResult<Language> {
        let row = sqlx::query_as::<_, Language>(
            "INSERT INTO languages (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn language_get(&self, id: i32) -> AppResult<Language> {
        sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Language {} not found", id)))
    }

    async fn language_list(&self) -> AppResult<Vec<Language>> {
        let rows = sqlx::query_as::<_, Language>("SELECT id, name FROM languages ORDER BY name COLLATE \"C\", id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn language_update(&self, id: i32, name: &str) -> AppResult<Language> {
        sqlx::query_as::<_, Language>(
            "UPDATE languages SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Language {} not found", id)))
    }

    async fn language_delete(&self, id: i32) -> AppResult<()> {
        // books.language_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Language {} not found", id)));
        }
        tracing::info!(language_id = id, "language deleted, books keep existing without it");
        Ok(())
    }
}
