//! Preview link codec.
//!
//! A preview token is either a plain identifier (UUID, `P0001`,
//! `PREV-0001`) used directly in the URL, or an opaque token: the JSON
//! payload `{"id": ..., "ts": ..., "exp": ...}` in URL-safe base64 without
//! padding. Timestamps are milliseconds since the Unix epoch.
//!
//! Decoding never fails loudly: malformed, foreign and expired tokens all
//! resolve to `None`, and callers show a generic "invalid link" page.

use crate::types::time::{from_unix_millis, unix_millis};
use crate::types::{IdentifierShape, ProjectId};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use error::TokenError;
use serde::Deserialize;
use std::time::{Duration, SystemTime};
use tracing::debug;

mod links;
pub use links::PreviewLinks;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TokenError {
        #[error("token is empty")]
        Empty,

        #[error("token is a plain identifier")]
        PlainIdentifier,

        #[error("base64 error: {0}")]
        Base64(#[from] base64::DecodeError),

        #[error("payload is not UTF-8: {0}")]
        Utf8(#[from] std::string::FromUtf8Error),

        #[error("payload is not a token object: {0}")]
        Json(#[from] serde_json::Error),

        #[error("payload has no usable id")]
        MissingId,

        #[error("token expired")]
        Expired,
    }
}

/// URL-safe alphabet, unpadded on encode, padding optional on decode.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Pre-assigned short code. When set it is the token.
    pub short_code: Option<String>,
    /// Lifetime of the token. `None` never expires.
    pub expires_in: Option<Duration>,
}

impl EncodeOptions {
    pub fn expiring_in(expires_in: Duration) -> Self {
        Self {
            short_code: None,
            expires_in: Some(expires_in),
        }
    }
}

/// What an opaque token carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub project_id: ProjectId,
    pub issued_at: Option<SystemTime>,
    pub expires_at: Option<SystemTime>,
}

impl TokenClaims {
    pub fn is_expired(&self, now: SystemTime) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    fn into_live(self, now: SystemTime) -> Result<ProjectId, TokenError> {
        if self.is_expired(now) {
            return Err(TokenError::Expired);
        }
        Ok(self.project_id)
    }
}

#[derive(Deserialize)]
struct TokenPayload {
    id: String,
    #[serde(default)]
    ts: Option<u64>,
    #[serde(default)]
    exp: Option<u64>,
}

/// Builds the token placed in `/preview/{token}`.
///
/// Short codes, whether passed in `options` or as the project id itself,
/// are canonical and returned unchanged.
pub fn encode(project_id: &ProjectId, options: &EncodeOptions, now: SystemTime) -> String {
    if let Some(short_code) = options
        .short_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
    {
        return short_code.to_string();
    }

    if project_id.shape().is_some_and(IdentifierShape::is_code) {
        return project_id.to_string();
    }

    let issued_at = unix_millis(now);
    let mut payload = serde_json::json!({
        "id": project_id.as_str(),
        "ts": issued_at,
    });
    // A lifetime past the representable range never expires.
    if let Some(expires_at) = options.expires_in.and_then(|ttl| now.checked_add(ttl)) {
        payload["exp"] = serde_json::json!(unix_millis(expires_at));
    }

    TOKEN_ENGINE.encode(payload.to_string())
}

/// True when `value` is an opaque token rather than a plain identifier.
///
/// Only the shape is checked; an expired token is still a token.
pub fn is_encoded_token(value: &str) -> bool {
    if IdentifierShape::classify(value).is_some() {
        return false;
    }
    claims(value).is_ok()
}

/// Recovers the project id behind a preview token.
///
/// Returns `None` for anything that is not a live token or plain identifier.
pub fn decode(token: &str, now: SystemTime) -> Option<ProjectId> {
    if IdentifierShape::classify(token).is_some() {
        return ProjectId::try_new(token.to_string()).ok();
    }

    match claims(token).and_then(|claims| claims.into_live(now)) {
        Ok(project_id) => Some(project_id),
        Err(err) => {
            debug!(%err, "rejected preview token");
            None
        }
    }
}

/// Parses an opaque token without checking expiry.
pub fn claims(token: &str) -> Result<TokenClaims, TokenError> {
    if token.is_empty() {
        return Err(TokenError::Empty);
    }
    if IdentifierShape::classify(token).is_some() {
        return Err(TokenError::PlainIdentifier);
    }

    // Standard-alphabet input is accepted too.
    let normalized: String = token
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();

    let bytes = TOKEN_ENGINE.decode(normalized)?;
    let json = String::from_utf8(bytes)?;
    // Objects only: serde would also fill the struct from a JSON array.
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&json)?;
    let payload: TokenPayload = serde_json::from_value(serde_json::Value::Object(object))?;
    let project_id = ProjectId::try_new(payload.id).map_err(|_| TokenError::MissingId)?;

    Ok(TokenClaims {
        project_id,
        issued_at: payload.ts.map(from_unix_millis),
        expires_at: payload.exp.map(from_unix_millis),
    })
}
