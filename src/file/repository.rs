//! File record repository for stash.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{FileRecord, NewFileRecord, PAGE_SIZE};
use crate::{Result, StashError};

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, name, file_type, is_public, parent_id, local_path, created_at FROM files";

/// Which parent a listing is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    /// No restriction.
    Any,
    /// Only children of this folder; `0` selects top-level records.
    Parent(i64),
}

/// Repository for file record operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a record. No validation happens here.
    pub async fn insert(&self, record: &NewFileRecord) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files (user_id, name, file_type, is_public, parent_id, local_path)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.user_id)
        .bind(&record.name)
        .bind(record.file_type)
        .bind(record.is_public)
        .bind(record.parent_id)
        .bind(&record.local_path)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| StashError::Database(format!("file {id} vanished after insert")))
    }

    /// Get a record by ID regardless of owner.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(record)
    }

    /// Get a record by ID only if `owner_id` owns it.
    pub async fn get_owned(&self, id: i64, owner_id: i64) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "{SELECT_COLUMNS} WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Set the visibility of an owned record in one statement.
    ///
    /// Returns the updated record, or `None` if no record with that ID is
    /// owned by `owner_id`.
    pub async fn update_visibility(
        &self,
        id: i64,
        owner_id: i64,
        is_public: bool,
    ) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(
            "UPDATE files SET is_public = ? WHERE id = ? AND user_id = ?
             RETURNING id, user_id, name, file_type, is_public, parent_id, local_path, created_at",
        )
        .bind(is_public)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// One page of records in insertion order.
    ///
    /// Pages are zero-based and hold [`PAGE_SIZE`] records; a page past the
    /// end is empty.
    pub async fn list_page(
        &self,
        owner_id: Option<i64>,
        parent: ParentFilter,
        page: u32,
    ) -> Result<Vec<FileRecord>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_COLUMNS);
        query.push(" WHERE 1 = 1");

        if let Some(owner_id) = owner_id {
            query.push(" AND user_id = ");
            query.push_bind(owner_id);
        }
        if let ParentFilter::Parent(parent_id) = parent {
            query.push(" AND parent_id = ");
            query.push_bind(parent_id);
        }

        query.push(" ORDER BY id LIMIT ");
        query.push_bind(PAGE_SIZE);
        query.push(" OFFSET ");
        query.push_bind(i64::from(page) * PAGE_SIZE);

        let records = query
            .build_query_as::<FileRecord>()
            .fetch_all(self.pool)
            .await?;

        Ok(records)
    }
}
