//! stash - token-authenticated file storage service
//!
//! Users exchange Basic credentials for a session token, then upload files,
//! images and folders into a per-user tree, list them page by page, toggle
//! their visibility and read back the content.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod queue;
pub mod web;

pub use auth::{create_user, verify_credentials, SessionStore};
pub use cache::{CacheStore, MemoryCache};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{Result, StashError};
pub use file::{FileRecord, FileService, FileStorage, FileType, Projection};
pub use queue::{JobQueue, ProcessingDispatcher};
pub use web::{AppState, WebServer};
