//! Access gate - Reads the role out of a customer's bearer credential.
//!
//! Credentials are JWT-shaped: three dot-separated base64url parts, the middle one a
//! JSON claims object. The payload is decoded without checking the signature, which
//! belongs to the issuer. The resulting admin flag only decides which commands are
//! offered; admin operations are authorized separately against the configured
//! allowlist before they run.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Role value that marks an admin.
pub const ADMIN_ROLE: &str = "admin";

/// Claims carried in a credential's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity
    #[serde(default)]
    pub id: String,
    /// Role, `"admin"` for shop admins
    #[serde(default)]
    pub role: String,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
    /// Expiration (Unix timestamp); 0 means no expiry
    #[serde(default)]
    pub exp: i64,
}

impl Claims {
    /// Whether the role claim names an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Credential decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No credential provided")]
    Missing,

    #[error("Invalid credential format: expected 3 dot-separated parts")]
    InvalidFormat,

    #[error("Base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Claims parse failed: {0}")]
    Claims(#[from] serde_json::Error),

    #[error("Credential expired at {expired_at}, current time {now}")]
    Expired { expired_at: i64, now: i64 },
}

/// Decodes a credential's claims, rejecting malformed or expired tokens.
pub fn decode_claims(token: &str) -> Result<Claims, AuthError> {
    decode_claims_at(token, chrono::Utc::now().timestamp())
}

fn decode_claims_at(token: &str, now: i64) -> Result<Claims, AuthError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Missing);
    }

    let parts: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = parts.as_slice() else {
        return Err(AuthError::InvalidFormat);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Claims = serde_json::from_slice(&bytes)?;

    if claims.exp > 0 && claims.exp < now {
        return Err(AuthError::Expired {
            expired_at: claims.exp,
            now,
        });
    }
    Ok(claims)
}

/// The user behind an optional credential.
///
/// A missing, malformed or expired credential means "no user", never an error.
#[must_use]
pub fn current_user(token: Option<&str>) -> Option<Claims> {
    match decode_claims(token?) {
        Ok(claims) => Some(claims),
        Err(e) => {
            debug!("Ignoring unusable credential: {}", e);
            None
        }
    }
}

/// Admin hint for UI gating.
#[must_use]
pub fn is_admin(user: Option<&Claims>) -> bool {
    user.is_some_and(Claims::is_admin)
}

/// In-memory credentials, keyed by chat user ID.
#[derive(Debug, Default)]
pub struct SessionStore {
    credentials: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `token` for `user_id` after checking that it decodes.
    ///
    /// # Errors
    /// Returns the decoding error for a malformed or expired token; nothing is stored.
    pub async fn login(&self, user_id: &str, token: &str) -> Result<Claims, AuthError> {
        let claims = decode_claims(token)?;
        self.credentials
            .write()
            .await
            .insert(user_id.to_string(), token.trim().to_string());
        Ok(claims)
    }

    /// Forgets the credential for `user_id`. Returns whether one was stored.
    pub async fn logout(&self, user_id: &str) -> bool {
        self.credentials.write().await.remove(user_id).is_some()
    }

    /// The user currently logged in as `user_id`, if their credential is still usable.
    pub async fn current_user(&self, user_id: &str) -> Option<Claims> {
        let credentials = self.credentials.read().await;
        current_user(credentials.get(user_id).map(String::as_str))
    }
}
