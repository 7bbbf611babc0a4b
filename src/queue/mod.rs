//! Post-processing job queue.
//!
//! Uploaded images get a job row `{user_id, file_id}` that an external worker
//! consumes (at least once) to derive thumbnails. Enqueueing never fails an
//! upload: [`ProcessingDispatcher`] logs and moves on.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::Database;
use crate::{Result, StashError};

/// Status of a freshly enqueued job.
pub const STATUS_PENDING: &str = "pending";

/// A queued post-processing request.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Job {
    /// Job ID.
    pub id: i64,
    /// Owner of the file.
    pub user_id: i64,
    /// File to process.
    pub file_id: i64,
    /// Consumer-managed status.
    pub status: String,
    /// When the job was enqueued.
    pub created_at: String,
}

/// Durable job queue stored in the `jobs` table.
#[derive(Clone)]
pub struct JobQueue {
    pool: SqlitePool,
}

impl JobQueue {
    /// Create a queue on the given database.
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Append a job. Returns its ID.
    pub async fn enqueue(&self, user_id: i64, file_id: i64) -> Result<i64> {
        let result = sqlx::query("INSERT INTO jobs (user_id, file_id, status) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(file_id)
            .bind(STATUS_PENDING)
            .execute(&self.pool)
            .await
            .map_err(|e| StashError::Queue(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// Jobs not yet picked up, oldest first.
    pub async fn pending(&self) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            "SELECT id, user_id, file_id, status, created_at
             FROM jobs WHERE status = ? ORDER BY id",
        )
        .bind(STATUS_PENDING)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StashError::Queue(e.to_string()))?;

        Ok(jobs)
    }
}

/// Fire-and-forget enqueue of image post-processing.
#[derive(Clone)]
pub struct ProcessingDispatcher {
    queue: JobQueue,
}

impl ProcessingDispatcher {
    /// Create a dispatcher feeding `queue`.
    pub fn new(queue: JobQueue) -> Self {
        Self { queue }
    }

    /// The underlying queue.
    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Enqueue a processing job, logging instead of failing.
    ///
    /// Returns whether the job was accepted.
    pub async fn dispatch(&self, user_id: i64, file_id: i64) -> bool {
        match self.queue.enqueue(user_id, file_id).await {
            Ok(job_id) => {
                info!(job_id, user_id, file_id, "Processing job enqueued");
                true
            }
            Err(e) => {
                warn!(user_id, file_id, error = %e, "Failed to enqueue processing job");
                false
            }
        }
    }
}
