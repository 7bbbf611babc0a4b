//! Basic-auth credential verification.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use super::password::{hash_password, verify_password};
use crate::db::{Database, NewUser, User, UserRepository};
use crate::{Result, StashError};

/// An email/password pair decoded from an `Authorization: Basic` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl Credentials {
    /// Decode `Basic base64(email:password)`.
    ///
    /// The password may itself contain `:`; only the first one separates.
    /// Returns `None` for anything malformed or with an empty part.
    pub fn from_basic_header(header: &str) -> Option<Self> {
        let encoded = header.trim().strip_prefix("Basic ")?.trim();
        let decoded = STANDARD.decode(encoded).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (email, password) = decoded.split_once(':')?;

        if email.is_empty() || password.is_empty() {
            return None;
        }

        Some(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Hash checked when the email is unknown, so that both failure paths pay
/// for one Argon2id verification with the same parameters.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("stash-dummy-password").ok())
        .as_deref()
}

/// Run an Argon2id verification off the async runtime.
async fn verify_blocking(password: String, hash: Option<String>) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let hash = hash.or_else(|| dummy_hash().map(str::to_string));
        hash.is_some_and(|hash| verify_password(&password, &hash).is_ok())
    })
    .await
    .map_err(|e| StashError::Io(std::io::Error::other(e)))
}

/// Verify a Basic-auth header against the user table.
///
/// Every credential failure is `Unauthorized`; store failures propagate.
/// An unknown email still costs a password verification.
pub async fn verify_credentials(db: &Database, header: &str) -> Result<i64> {
    let credentials = Credentials::from_basic_header(header).ok_or_else(|| {
        debug!("Rejected malformed basic credentials");
        StashError::Unauthorized
    })?;

    let user = UserRepository::new(db.pool())
        .get_by_email(&credentials.email)
        .await?;

    let Some(user) = user else {
        verify_blocking(credentials.password, None).await?;
        warn!(email = %credentials.email, "Login failed: unknown user");
        return Err(StashError::Unauthorized);
    };

    if !verify_blocking(credentials.password, Some(user.password.clone())).await? {
        warn!(email = %credentials.email, "Login failed: wrong password");
        return Err(StashError::Unauthorized);
    }

    Ok(user.id)
}

/// Hash `password` and store a new user.
///
/// Registration is not exposed over HTTP; this is for seeding and tests.
pub async fn create_user(db: &Database, email: &str, password: &str) -> Result<User> {
    let hash = hash_password(password).map_err(|e| StashError::bad_request(e.to_string()))?;
    UserRepository::new(db.pool())
        .create(&NewUser::new(email, hash))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_parse_basic_header() {
        let creds = Credentials::from_basic_header(&basic("bob@dylan.com:toto1234!")).unwrap();
        assert_eq!(creds.email, "bob@dylan.com");
        assert_eq!(creds.password, "toto1234!");
    }

    #[test]
    fn test_parse_password_with_colon() {
        let creds = Credentials::from_basic_header(&basic("bob@dylan.com:a:b:c")).unwrap();
        assert_eq!(creds.password, "a:b:c");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Credentials::from_basic_header("").is_none());
        assert!(Credentials::from_basic_header("Bearer abc").is_none());
        assert!(Credentials::from_basic_header("Basic !!!not-base64!!!").is_none());
        assert!(Credentials::from_basic_header(&basic("no-colon")).is_none());
        assert!(Credentials::from_basic_header(&basic(":password")).is_none());
        assert!(Credentials::from_basic_header(&basic("bob@dylan.com:")).is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::from_basic_header(&basic("bob@dylan.com:secret99")).unwrap();
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("secret99"));
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let db = Database::open_in_memory().await.unwrap();
        let user = create_user(&db, "bob@dylan.com", "toto1234!").await.unwrap();

        let id = verify_credentials(&db, &basic("bob@dylan.com:toto1234!"))
            .await
            .unwrap();
        assert_eq!(id, user.id);
    }

    #[tokio::test]
    async fn test_verify_credentials_failures_are_uniform() {
        let db = Database::open_in_memory().await.unwrap();
        create_user(&db, "bob@dylan.com", "toto1234!").await.unwrap();

        let wrong_password = verify_credentials(&db, &basic("bob@dylan.com:nope1234")).await;
        let unknown_user = verify_credentials(&db, &basic("eve@dylan.com:toto1234!")).await;
        let malformed = verify_credentials(&db, "Basic").await;

        assert!(matches!(wrong_password, Err(StashError::Unauthorized)));
        assert!(matches!(unknown_user, Err(StashError::Unauthorized)));
        assert!(matches!(malformed, Err(StashError::Unauthorized)));
    }

    #[test]
    fn test_dummy_hash_matches_stored_parameters() {
        let dummy = dummy_hash().unwrap();
        let stored = hash_password("toto1234!").unwrap();

        // Same algorithm and cost: everything before the salt is identical
        let params = |hash: &str| hash.rsplitn(3, '$').nth(2).unwrap().to_string();
        assert_eq!(params(dummy), params(&stored));
        assert!(verify_password("toto1234!", dummy).is_err());
    }

    #[tokio::test]
    async fn test_unknown_user_still_verifies_a_password() {
        let db = Database::open_in_memory().await.unwrap();

        // Even the dummy password itself never logs anyone in
        let result = verify_credentials(&db, &basic("eve@dylan.com:stash-dummy-password")).await;
        assert!(matches!(result, Err(StashError::Unauthorized)));
        assert!(!verify_blocking("toto1234!".to_string(), None).await.unwrap());
        assert!(verify_blocking("stash-dummy-password".to_string(), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_create_user_rejects_short_password() {
        let db = Database::open_in_memory().await.unwrap();
        let result = create_user(&db, "bob@dylan.com", "short").await;
        assert!(matches!(result, Err(StashError::BadRequest(_))));
    }
}
