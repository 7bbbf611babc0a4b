//! Response DTOs for the HTTP interface.
//!
//! File records are answered with [`crate::file::Projection`] directly.

use serde::Serialize;

/// Response to a successful `/connect`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Session token for the `X-Token` header.
    pub token: String,
}
