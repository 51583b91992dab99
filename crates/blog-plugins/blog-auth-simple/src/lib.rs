//! # blog-auth-simple
//!
//! Argon2-based implementation of `AuthProvider`.
//! Session tokens are `<user uuid>.<issued at, unix seconds>.<hex HMAC-SHA256>`,
//! the MAC covering both the uuid and the timestamp. The server trusts the
//! cookie without storing sessions; a token older than `max_age` is refused.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use blog_core::traits::AuthProvider;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Two weeks, the usual lifetime of a Django session cookie.
pub const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(14 * 24 * 60 * 60);

pub struct SimpleAuthProvider {
    /// Keyed with the session secret; cloned per signature.
    mac: HmacSha256,
    max_age: Duration,
}

impl SimpleAuthProvider {
    /// Accepts the session secret (e.g., from configuration).
    pub fn new(secret: &str) -> anyhow::Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("session secret must not be empty");
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid session secret: {e}"))?;
        Ok(Self {
            mac,
            max_age: DEFAULT_SESSION_MAX_AGE,
        })
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    fn sign(&self, user_id: Uuid, issued_at: i64) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(user_id.as_bytes());
        mac.update(&issued_at.to_be_bytes());
        mac
    }

    fn issue_at(&self, user_id: Uuid, issued_at: i64) -> String {
        let signature = self.sign(user_id, issued_at).finalize().into_bytes();
        format!("{}.{}.{}", user_id, issued_at, hex::encode(signature))
    }

    fn is_fresh(&self, issued_at: i64) -> bool {
        let age = Utc::now().timestamp().saturating_sub(issued_at);
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        // Up to a minute of clock skew between workers.
        (-60..=max_age).contains(&age)
    }
}

#[async_trait]
impl AuthProvider for SimpleAuthProvider {
    async fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))
        })
        .await?
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || {
            let parsed_hash = match PasswordHash::new(&hash) {
                Ok(p) => p,
                Err(_) => return false,
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        })
        .await;
        verified.unwrap_or_else(|e| {
            log::error!("password verification task failed: {e}");
            false
        })
    }

    fn issue_session(&self, user_id: Uuid) -> String {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    fn verify_session(&self, token: &str) -> Option<Uuid> {
        let mut parts = token.splitn(3, '.');
        let user_id = Uuid::parse_str(parts.next()?).ok()?;
        let issued_at: i64 = parts.next()?.parse().ok()?;
        let signature = hex::decode(parts.next()?).ok()?;
        self.sign(user_id, issued_at).verify_slice(&signature).ok()?;
        if !self.is_fresh(issued_at) {
            log::debug!("session for {user_id} has expired");
            return None;
        }
        Some(user_id)
    }
}
