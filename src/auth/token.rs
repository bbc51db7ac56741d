//! Signed, time-limited bearer tokens.
//!
//! A token has three dot-separated parts:
//!
//! ```text
//! <hex(member_id)>.<expiry unix seconds>.<blake3 keyed hash, hex>
//! ```
//!
//! The member id is hex encoded so any identifier fits in an HTTP header.
//! The MAC covers the first two parts and uses a key derived from the
//! configured secret with `blake3::derive_key`.

use crate::constants::{MAX_TOKEN_TTL_SECS, TOKEN_KEY_CONTEXT};
use crate::errors::{AppError, AppResult, AuthError};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use zeroize::Zeroizing;

/// A freshly issued token and its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// The verified contents of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens.
pub struct TokenSigner {
    key: Zeroizing<[u8; 32]>,
    ttl: Duration,
}

impl TokenSigner {
    /// Creates a signer from a secret and a lifetime in seconds.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` unless `1 <= ttl_secs <= MAX_TOKEN_TTL_SECS`.
    pub fn new(secret: &str, ttl_secs: i64) -> AppResult<Self> {
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&ttl_secs) {
            return Err(AppError::Config(format!(
                "Token lifetime must be between 1 and {} seconds, got {}",
                MAX_TOKEN_TTL_SECS, ttl_secs
            )));
        }

        Ok(Self {
            key: Zeroizing::new(blake3::derive_key(TOKEN_KEY_CONTEXT, secret.as_bytes())),
            ttl: Duration::seconds(ttl_secs),
        })
    }

    fn mac(&self, payload: &str) -> blake3::Hash {
        blake3::keyed_hash(&self.key, payload.as_bytes())
    }

    /// Issues a token for `subject` valid until `now + ttl`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the expiry falls outside chrono's range.
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> AppResult<IssuedToken> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("token expiry out of range".to_string()))?;
        let payload = format!("{}.{}", hex::encode(subject), expires_at.timestamp());
        let mac = self.mac(&payload);

        Ok(IssuedToken {
            token: format!("{}.{}", payload, mac.to_hex()),
            expires_at,
        })
    }

    /// Verifies a token's signature and expiry and returns its claims.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidToken` if the token is malformed or the MAC does not match
    /// - `AuthError::TokenExpired` if `now` is at or past the expiry
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> AppResult<Claims> {
        let mut parts = token.trim().splitn(3, '.');
        let (subject_hex, expiry_raw, mac_hex) = match (parts.next(), parts.next(), parts.next())
        {
            (Some(s), Some(e), Some(m)) if !s.is_empty() => (s, e, m),
            _ => return Err(AuthError::InvalidToken("malformed token".to_string()).into()),
        };

        let provided = blake3::Hash::from_hex(mac_hex)
            .map_err(|_| AuthError::InvalidToken("malformed signature".to_string()))?;

        // blake3::Hash equality is constant time.
        let expected = self.mac(&format!("{}.{}", subject_hex, expiry_raw));
        if expected != provided {
            return Err(AuthError::InvalidToken("signature mismatch".to_string()).into());
        }

        let expiry_secs: i64 = expiry_raw
            .parse()
            .map_err(|_| AuthError::InvalidToken("malformed expiry".to_string()))?;
        let expires_at = Utc
            .timestamp_opt(expiry_secs, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidToken("expiry out of range".to_string()))?;

        if now >= expires_at {
            return Err(AuthError::TokenExpired.into());
        }

        let subject_bytes = hex::decode(subject_hex)
            .map_err(|_| AuthError::InvalidToken("malformed subject".to_string()))?;
        let subject = String::from_utf8(subject_bytes)
            .map_err(|_| AuthError::InvalidToken("subject is not UTF-8".to_string()))?;

        Ok(Claims {
            subject,
            expires_at,
        })
    }
}
