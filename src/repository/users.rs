//! User (borrower) persistence

use async_trait::async_trait;

use super::{Repository, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{user::CreateUser, User},
};

/// Maps a unique index hit to the same error as the EXISTS check, which
/// concurrent inserts can slip past
fn insert_error(username: &str, err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Validation(format!("Username {} is already taken", username))
        }
        other => AppError::Database(other),
    }
}

#[async_trait]
impl UserStore for Repository {
    async fn user_create(&self, data: &CreateUser) -> AppResult<User> {
        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(&data.username)
            .fetch_one(&self.pool)
            .await?;
        if taken {
            return Err(AppError::Validation(format!(
                "Username {} is already taken",
                data.username
            )));
        }

        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, first_name, last_name, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, first_name, last_name, email
            "#,
        )
        .bind(&data.username)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(&data.username, e))?;
        Ok(row)
    }

    async fn user_get(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, first_name, last_name, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn user_list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            "SELECT id, username, first_name, last_name, email FROM users ORDER BY username COLLATE \"C\"",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn user_delete(&self, id: i32) -> AppResult<()> {
        // book_instances.borrower_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug, thiserror::Error)]
    #[error("duplicate key value violates unique constraint \"users_username_key\"")]
    struct UniqueViolation;

    impl DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn taken_username_on_insert_is_a_validation_error() {
        let err = insert_error("marie", sqlx::Error::Database(Box::new(UniqueViolation)));
        match err {
            AppError::Validation(msg) => assert!(msg.contains("marie")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn other_insert_failures_stay_database_errors() {
        let err = insert_error("marie", sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));

        let err = insert_error("marie", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Database(_)));
    }
}
