//! Session tokens backed by the TTL cache.
//!
//! A session is a cache entry `auth_<token> -> user id` with a fixed lifetime
//! counted from login. Using a token never extends it.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::{Result, StashError};

/// Default session duration (24 hours).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Prefix of session keys in the cache.
pub const SESSION_KEY_PREFIX: &str = "auth_";

/// Random bytes per token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Attempts at minting a token that is not already in use.
const MAX_TOKEN_ATTEMPTS: usize = 5;

/// Mints, resolves and revokes session tokens.
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store with the default 24 hour lifetime.
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self::with_ttl(cache, Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }

    /// Create a store with a custom session lifetime.
    pub fn with_ttl(cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// The session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `user_id` and return its token.
    pub fn create(&self, user_id: i64) -> Result<String> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = generate_token();
            if self
                .cache
                .set_if_absent(&session_key(&token), &user_id.to_string(), self.ttl)?
            {
                info!(user_id, "Session created");
                return Ok(token);
            }
            warn!("Session token collision, regenerating");
        }

        Err(StashError::Cache(
            "could not mint a unique session token".to_string(),
        ))
    }

    /// Look up the user behind `token`.
    pub fn resolve(&self, token: &str) -> Result<Option<i64>> {
        if token.is_empty() {
            return Ok(None);
        }

        let Some(value) = self.cache.get(&session_key(token))? else {
            return Ok(None);
        };

        match value.parse() {
            Ok(user_id) => Ok(Some(user_id)),
            Err(_) => {
                warn!("Discarding session entry with a non-numeric user id");
                Ok(None)
            }
        }
    }

    /// End the session. Returns `false` if there was no live session.
    pub fn revoke(&self, token: &str) -> Result<bool> {
        if token.is_empty() {
            return Ok(false);
        }

        let removed = self.cache.delete(&session_key(token))?;
        if removed {
            info!("Session revoked");
        } else {
            debug!("Revoke: session not found");
        }
        Ok(removed)
    }
}

fn session_key(token: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{token}")
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
