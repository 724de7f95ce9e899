//! Access token freshness inspection
//!
//! Tokens are inspected, never verified: the signature belongs to the backend.
//! Only the `exp` claim of the JWT payload is read.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Freshness of an access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStatus {
    /// Token decodes and has not expired
    pub is_valid: bool,
    /// Expired, undecodable, or expiring within the leeway
    pub needs_refresh: bool,
    /// Expiry claim, when present
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenStatus {
    fn unreadable() -> Self {
        Self {
            is_valid: false,
            needs_refresh: true,
            expires_at: None,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenInspector {
    fn inspect(&self, token: &str) -> TokenStatus;
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Reads the `exp` claim of a JWT
#[derive(Debug, Clone, Copy)]
pub struct JwtInspector {
    leeway: chrono::Duration,
}

impl JwtInspector {
    pub fn new(leeway_secs: i64) -> Self {
        Self {
            leeway: chrono::Duration::seconds(leeway_secs),
        }
    }

    pub fn inspect_at(&self, token: &str, now: DateTime<Utc>) -> TokenStatus {
        let Some(exp) = decode_expiry(token) else {
            return TokenStatus::unreadable();
        };
        let Some(exp) = exp else {
            // Tokens without an expiry never need refreshing
            return TokenStatus {
                is_valid: true,
                needs_refresh: false,
                expires_at: None,
            };
        };
        let Some(expires_at) = DateTime::from_timestamp(exp, 0) else {
            return TokenStatus::unreadable();
        };

        TokenStatus {
            is_valid: now < expires_at,
            needs_refresh: expires_at - now <= self.leeway,
            expires_at: Some(expires_at),
        }
    }
}

impl Default for JwtInspector {
    fn default() -> Self {
        Self::new(60)
    }
}

impl TokenInspector for JwtInspector {
    fn inspect(&self, token: &str) -> TokenStatus {
        self.inspect_at(token, Utc::now())
    }
}

/// `None` if the token is not a readable JWT, `Some(None)` if it has no `exp`
fn decode_expiry(token: &str) -> Option<Option<i64>> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature)) =
        (segments.next(), segments.next(), segments.next())
    else {
        return None;
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp)
}
