use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const SECS_PER_HOUR: u64 = 60 * 60;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Smallest session quota accepted by `validate`.
pub const MIN_SESSION_QUOTA_BYTES: usize = 1024;

/// User-facing configuration, persisted as config.toml.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, AppConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves config to a TOML file, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), AppConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, AppConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates config values and returns list of validation errors.
    /// Returns empty vec if config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(reason) = check_base_url(&self.preview.base_url) {
            errors.push(format!("base_url {reason}"));
        }

        if self.storage.session_quota_bytes < MIN_SESSION_QUOTA_BYTES {
            errors.push(format!(
                "session_quota_bytes must be at least {MIN_SESSION_QUOTA_BYTES}"
            ));
        }

        for (name, days) in [
            ("feedback_draft_ttl_days", self.storage.feedback_draft_ttl_days),
            ("briefing_draft_ttl_days", self.storage.briefing_draft_ttl_days),
            ("utm_ttl_days", self.storage.utm_ttl_days),
        ] {
            if days == 0 {
                errors.push(format!("{name} must be at least 1"));
            }
        }

        errors
    }

    /// Returns a validated config, replacing invalid values with defaults.
    pub fn with_defaults_for_invalid(&self) -> Self {
        let defaults = Self::default();
        let nonzero = |value: u32, default: u32| if value == 0 { default } else { value };

        Self {
            preview: PreviewConfig {
                base_url: if check_base_url(&self.preview.base_url).is_ok() {
                    self.preview.base_url.clone()
                } else {
                    defaults.preview.base_url
                },
                link_ttl_hours: self.preview.link_ttl_hours,
            },
            storage: StorageConfig {
                session_quota_bytes: if self.storage.session_quota_bytes
                    < MIN_SESSION_QUOTA_BYTES
                {
                    defaults.storage.session_quota_bytes
                } else {
                    self.storage.session_quota_bytes
                },
                cookies_enabled: self.storage.cookies_enabled,
                feedback_draft_ttl_days: nonzero(
                    self.storage.feedback_draft_ttl_days,
                    defaults.storage.feedback_draft_ttl_days,
                ),
                briefing_draft_ttl_days: nonzero(
                    self.storage.briefing_draft_ttl_days,
                    defaults.storage.briefing_draft_ttl_days,
                ),
                utm_ttl_days: nonzero(self.storage.utm_ttl_days, defaults.storage.utm_ttl_days),
            },
        }
    }
}

fn check_base_url(base_url: &str) -> Result<(), String> {
    let url = Url::parse(base_url).map_err(|e| format!("is not a valid URL: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("must use http or https, got {}", url.scheme()));
    }
    Ok(())
}

/// Preview link settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Lifetime of newly issued links. 0 means links never expire.
    #[serde(default)]
    pub link_ttl_hours: u32,
}

impl PreviewConfig {
    pub fn link_ttl(&self) -> Option<Duration> {
        (self.link_ttl_hours > 0)
            .then(|| Duration::from_secs(u64::from(self.link_ttl_hours) * SECS_PER_HOUR))
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            link_ttl_hours: 0,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

/// Client cache settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_session_quota_bytes")]
    pub session_quota_bytes: usize,
    #[serde(default = "default_true")]
    pub cookies_enabled: bool,
    #[serde(default = "default_feedback_draft_ttl_days")]
    pub feedback_draft_ttl_days: u32,
    #[serde(default = "default_briefing_draft_ttl_days")]
    pub briefing_draft_ttl_days: u32,
    #[serde(default = "default_utm_ttl_days")]
    pub utm_ttl_days: u32,
}

impl StorageConfig {
    pub fn feedback_draft_ttl(&self) -> Duration {
        days(self.feedback_draft_ttl_days)
    }

    pub fn briefing_draft_ttl(&self) -> Duration {
        days(self.briefing_draft_ttl_days)
    }

    pub fn utm_ttl(&self) -> Duration {
        days(self.utm_ttl_days)
    }
}

fn days(days: u32) -> Duration {
    Duration::from_secs(u64::from(days) * SECS_PER_DAY)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_quota_bytes: default_session_quota_bytes(),
            cookies_enabled: true,
            feedback_draft_ttl_days: default_feedback_draft_ttl_days(),
            briefing_draft_ttl_days: default_briefing_draft_ttl_days(),
            utm_ttl_days: default_utm_ttl_days(),
        }
    }
}

fn default_session_quota_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_feedback_draft_ttl_days() -> u32 {
    30
}

fn default_briefing_draft_ttl_days() -> u32 {
    7
}

fn default_utm_ttl_days() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

/// Errors that can occur when loading or saving config.
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests;
