//! User repository for stash.

use sqlx::SqlitePool;

use super::user::{NewUser, User};
use crate::{Result, StashError};

/// Repository for user lookups and seeding.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (email, password) VALUES (?, ?)")
            .bind(&new_user.email)
            .bind(&new_user.password)
            .execute(self.pool)
            .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| StashError::Database(format!("user {id} vanished after insert")))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, created_at FROM users WHERE email = ? COLLATE NOCASE",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("bob@dylan.com", "hash"))
            .await
            .unwrap();
        assert!(user.id > 0);
        assert_eq!(user.email, "bob@dylan.com");

        let fetched = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "bob@dylan.com");
        assert_eq!(fetched.password, "hash");
    }

    #[tokio::test]
    async fn test_get_by_email_case_insensitive() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("Bob@Dylan.com", "hash"))
            .await
            .unwrap();

        assert!(repo.get_by_email("bob@dylan.com").await.unwrap().is_some());
        assert!(repo.get_by_email("other@dylan.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("bob@dylan.com", "hash"))
            .await
            .unwrap();

        let result = repo.create(&NewUser::new("BOB@dylan.com", "hash2")).await;
        assert!(matches!(result, Err(StashError::Database(_))));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        assert!(repo.get_by_id(42).await.unwrap().is_none());
    }
}
