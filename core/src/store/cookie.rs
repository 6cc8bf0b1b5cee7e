//! Cookie-jar backend, the last resort when web storage is blocked.
//!
//! Each entry becomes one cookie whose value is the percent-encoded JSON of
//! the entry, the way `encodeURIComponent` would write it. The jar renders
//! to `Cookie` and `Set-Cookie` header values and can be reloaded from a
//! `Cookie` header.

use super::error::BackendError;
use super::{BackendKind, StorageBackend};
use crate::types::{CacheKey, StoredEntry};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::collections::BTreeMap;
use std::time::SystemTime;
use tracing::debug;

/// Browsers cap a single cookie (name, `=`, value) at 4096 bytes.
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Characters `encodeURIComponent` leaves alone.
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cookie {
    value: String,
    expires_at: Option<SystemTime>,
}

pub struct CookieBackend {
    jar: BTreeMap<String, Cookie>,
    enabled: bool,
}

fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

fn cookie_name(key: &CacheKey) -> Result<&str, BackendError> {
    if is_cookie_name(key.as_str()) {
        Ok(key.as_str())
    } else {
        Err(BackendError::UnsupportedKey(key.to_string()))
    }
}

fn decode_value(value: &str) -> Result<StoredEntry, BackendError> {
    let json = percent_decode_str(value)
        .decode_utf8()
        .map_err(|e| BackendError::Corrupt(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| BackendError::Corrupt(e.to_string()))
}

impl CookieBackend {
    pub fn new() -> Self {
        Self {
            jar: BTreeMap::new(),
            enabled: true,
        }
    }

    /// A jar that rejects every operation, as with cookies turned off.
    pub fn disabled() -> Self {
        Self {
            jar: BTreeMap::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn check_enabled(&self) -> Result<(), BackendError> {
        if self.enabled {
            Ok(())
        } else {
            Err(BackendError::Disabled)
        }
    }

    /// `Cookie` request header value: `name=value; name2=value2`.
    pub fn cookie_header(&self) -> String {
        self.jar
            .iter()
            .map(|(name, cookie)| format!("{name}={}", cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// One `Set-Cookie` header value per cookie.
    pub fn set_cookie_headers(&self, now: SystemTime) -> Vec<String> {
        self.jar
            .iter()
            .map(|(name, cookie)| {
                let mut header = format!("{name}={}; Path=/; SameSite=Lax", cookie.value);
                if let Some(expires_at) = cookie.expires_at {
                    let max_age = expires_at
                        .duration_since(now)
                        .map(|d| d.as_secs())
                        .unwrap_or(0);
                    header.push_str(&format!("; Max-Age={max_age}"));
                }
                header
            })
            .collect()
    }

    /// Loads cookies from a `Cookie` header, returning how many were kept.
    ///
    /// Pairs with invalid names or undecodable values are skipped.
    pub fn load_header(&mut self, header: &str) -> Result<usize, BackendError> {
        self.check_enabled()?;

        let mut loaded = 0;
        for pair in header.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            if !is_cookie_name(name) {
                continue;
            }
            match decode_value(value) {
                Ok(entry) => {
                    self.jar.insert(
                        name.to_string(),
                        Cookie {
                            value: value.to_string(),
                            expires_at: entry.expires_at,
                        },
                    );
                    loaded += 1;
                }
                Err(err) => debug!(cookie = name, %err, "skipping foreign cookie"),
            }
        }
        Ok(loaded)
    }
}

impl Default for CookieBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for CookieBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cookie
    }

    fn get(&self, key: &CacheKey) -> Result<Option<StoredEntry>, BackendError> {
        self.check_enabled()?;
        let name = cookie_name(key)?;

        self.jar
            .get(name)
            .map(|cookie| decode_value(&cookie.value))
            .transpose()
    }

    fn set(&mut self, key: &CacheKey, entry: &StoredEntry) -> Result<(), BackendError> {
        self.check_enabled()?;
        let name = cookie_name(key)?;

        let json =
            serde_json::to_string(entry).map_err(|e| BackendError::Corrupt(e.to_string()))?;
        let value = utf8_percent_encode(&json, COOKIE_VALUE).to_string();

        let size = name.len() + 1 + value.len();
        if size > MAX_COOKIE_BYTES {
            return Err(BackendError::QuotaExceeded {
                size,
                max: MAX_COOKIE_BYTES,
            });
        }

        self.jar.insert(
            name.to_string(),
            Cookie {
                value,
                expires_at: entry.expires_at,
            },
        );
        Ok(())
    }

    fn remove(&mut self, key: &CacheKey) -> Result<(), BackendError> {
        self.check_enabled()?;
        self.jar.remove(key.as_str());
        Ok(())
    }

    fn sweep_expired(&mut self, now: SystemTime) -> Result<usize, BackendError> {
        self.check_enabled()?;
        let before = self.jar.len();
        self.jar.retain(
            |_, cookie| !matches!(cookie.expires_at, Some(expires_at) if expires_at <= now),
        );
        Ok(before - self.jar.len())
    }
}

#[cfg(test)]
mod tests;
