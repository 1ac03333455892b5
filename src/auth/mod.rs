use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::SecurityConfig;

pub mod spotify;

/// Decides whether a request may reach an administrative route.
///
/// The admin gate only asks this question; swapping in signed tokens or
/// per-parent credentials means another implementation, not a gate change.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, headers: &HeaderMap) -> bool;
}

/// Shared secret carried in a single request header.
///
/// With no secret configured every request is refused.
pub struct SharedSecretAuthorizer {
    header: String,
    secret_digest: Option<[u8; 32]>,
}

impl SharedSecretAuthorizer {
    pub fn new(header: impl Into<String>, secret: Option<&str>) -> Self {
        let secret_digest = secret.filter(|s| !s.is_empty()).map(digest);
        if secret_digest.is_none() {
            tracing::warn!("Admin secret is not configured; all admin requests will be rejected");
        }
        Self {
            header: header.into(),
            secret_digest,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.admin_header.clone(), config.admin_secret.as_deref())
    }
}

impl Authorizer for SharedSecretAuthorizer {
    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.secret_digest else {
            return false;
        };
        let Some(presented) = headers.get(self.header.as_str()).and_then(|v| v.to_str().ok()) else {
            return false;
        };
        // Compare fixed-size digests so timing reveals neither content nor length
        digest(presented)[..].ct_eq(&expected[..]).into()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
