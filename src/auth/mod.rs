//! Authentication module for stash.
//!
//! - Argon2id password hashing
//! - Basic-auth credential verification
//! - Cache-backed session tokens

mod credentials;
mod password;
mod session;

pub use credentials::{create_user, verify_credentials, Credentials};
pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use session::{SessionStore, DEFAULT_SESSION_TTL_SECS, SESSION_KEY_PREFIX};
