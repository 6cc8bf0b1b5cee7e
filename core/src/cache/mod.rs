//! Typed client caches on top of [`HybridStore`].
//!
//! [`ClientCache`] is constructed once with the data directory and storage
//! settings, passed by reference to whatever needs it, and dropped at
//! shutdown. Each group of operations owns one key namespace:
//!
//! - `feedback_{projectId}`: unsent review feedback, redundant, expiring
//! - `briefing_{briefingId}`: partially filled briefing forms, redundant, expiring
//! - `utm_params`: first-touch campaign attribution, expiring
//! - `auth_hint`: last signed-in email
//! - `{serviceType}_webhookUrl`: configured webhook endpoints

use crate::store::{
    CookieBackend, DurableBackend, HybridStore, SessionBackend, StorageBackend, SweepReport,
    WriteOptions, WriteReport,
};
use crate::types::time::unix_millis;
use crate::types::{CacheKey, Config, ProjectId, ServiceType, StorageConfig};
use error::CacheError;
use std::time::SystemTime;
use tracing::{debug, warn};
use url::Url;

mod model;

pub use model::{
    AuthHint, BriefingDraft, FeedbackDraft, TimestampedNote, UtmParams, WebhookEndpoint,
};

pub mod error {
    use crate::types::CacheKeyError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CacheError {
        #[error("Invalid webhook URL {url:?}: {reason}")]
        InvalidWebhookUrl { url: String, reason: String },

        #[error("Invalid cache key: {0}")]
        InvalidKey(#[from] CacheKeyError),
    }
}

pub struct ClientCache {
    store: HybridStore,
    storage: StorageConfig,
}

impl ClientCache {
    /// Opens the standard durable → session → cookie chain.
    ///
    /// A durable database that cannot be opened is left out of the chain
    /// rather than failing the whole cache.
    pub fn open(config: Config, storage: &StorageConfig) -> Self {
        let mut backends: Vec<Box<dyn StorageBackend>> = Vec::with_capacity(3);

        match DurableBackend::open(&config) {
            Ok(durable) => backends.push(Box::new(durable)),
            Err(err) => warn!(
                path = %config.db_path().display(),
                %err,
                "durable cache unavailable; continuing without it"
            ),
        }
        backends.push(Box::new(SessionBackend::new(storage.session_quota_bytes)));
        backends.push(Box::new(if storage.cookies_enabled {
            CookieBackend::new()
        } else {
            CookieBackend::disabled()
        }));

        Self::with_store(HybridStore::new(backends), storage)
    }

    pub fn with_store(store: HybridStore, storage: &StorageConfig) -> Self {
        Self {
            store,
            storage: storage.clone(),
        }
    }

    pub fn store(&self) -> &HybridStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HybridStore {
        &mut self.store
    }

    pub fn sweep_expired(&mut self, now: SystemTime) -> SweepReport {
        self.store.sweep_expired(now)
    }
}

/// Feedback drafts.
impl ClientCache {
    pub fn save_feedback_draft(
        &mut self,
        project_id: &ProjectId,
        draft: &FeedbackDraft,
        now: SystemTime,
    ) -> WriteReport {
        let options = WriteOptions::expiring(self.storage.feedback_draft_ttl()).redundant();
        self.store
            .write(&CacheKey::feedback(project_id), draft, &options, now)
    }

    pub fn feedback_draft(
        &mut self,
        project_id: &ProjectId,
        now: SystemTime,
    ) -> Option<FeedbackDraft> {
        self.store.read(&CacheKey::feedback(project_id), now)
    }

    pub fn clear_feedback_draft(&mut self, project_id: &ProjectId) {
        self.store.remove(&CacheKey::feedback(project_id));
    }
}

/// Briefing drafts.
impl ClientCache {
    pub fn save_briefing_draft(
        &mut self,
        briefing_id: &str,
        draft: &BriefingDraft,
        now: SystemTime,
    ) -> Result<WriteReport, CacheError> {
        let key = CacheKey::briefing(briefing_id)?;
        let options = WriteOptions::expiring(self.storage.briefing_draft_ttl()).redundant();
        Ok(self.store.write(&key, draft, &options, now))
    }

    pub fn briefing_draft(
        &mut self,
        briefing_id: &str,
        now: SystemTime,
    ) -> Result<Option<BriefingDraft>, CacheError> {
        let key = CacheKey::briefing(briefing_id)?;
        Ok(self.store.read(&key, now))
    }

    pub fn clear_briefing_draft(&mut self, briefing_id: &str) -> Result<(), CacheError> {
        let key = CacheKey::briefing(briefing_id)?;
        self.store.remove(&key);
        Ok(())
    }
}

/// UTM attribution.
impl ClientCache {
    /// Stores `params` unless an unexpired attribution is already cached.
    ///
    /// Returns whether `params` were stored.
    pub fn capture_utm(&mut self, params: &UtmParams, now: SystemTime) -> bool {
        if self.utm_params(now).is_some() {
            debug!("keeping first-touch utm attribution");
            return false;
        }
        let options = WriteOptions::expiring(self.storage.utm_ttl());
        self.store
            .write(&CacheKey::utm_params(), params, &options, now)
            .is_stored()
    }

    pub fn utm_params(&mut self, now: SystemTime) -> Option<UtmParams> {
        self.store.read(&CacheKey::utm_params(), now)
    }

    pub fn clear_utm(&mut self) {
        self.store.remove(&CacheKey::utm_params());
    }
}

/// Auth hint.
impl ClientCache {
    pub fn remember_auth_hint(&mut self, email: &str, now: SystemTime) -> WriteReport {
        let hint = AuthHint {
            email: email.trim().to_string(),
            last_sign_in_at: unix_millis(now),
        };
        self.store
            .write(&CacheKey::auth_hint(), &hint, &WriteOptions::default(), now)
    }

    pub fn auth_hint(&mut self, now: SystemTime) -> Option<AuthHint> {
        self.store.read(&CacheKey::auth_hint(), now)
    }

    pub fn forget_auth_hint(&mut self) {
        self.store.remove(&CacheKey::auth_hint());
    }
}

fn validate_webhook_url(raw: &str) -> Result<(), CacheError> {
    let invalid = |reason: String| CacheError::InvalidWebhookUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}

/// Webhook endpoints.
impl ClientCache {
    /// Validates and stores the webhook endpoint for `service`.
    ///
    /// The URL is stored as given (trimmed), not in normalized form.
    pub fn set_webhook_url(
        &mut self,
        service: &ServiceType,
        url: &str,
        now: SystemTime,
    ) -> Result<WriteReport, CacheError> {
        let url = url.trim();
        validate_webhook_url(url)?;

        let endpoint = WebhookEndpoint {
            url: url.to_string(),
            updated_at: unix_millis(now),
        };
        Ok(self.store.write(
            &CacheKey::webhook_url(service),
            &endpoint,
            &WriteOptions::default(),
            now,
        ))
    }

    pub fn webhook_url(&mut self, service: &ServiceType, now: SystemTime) -> Option<String> {
        self.store
            .read::<WebhookEndpoint>(&CacheKey::webhook_url(service), now)
            .map(|endpoint| endpoint.url)
    }

    pub fn clear_webhook_url(&mut self, service: &ServiceType) {
        self.store.remove(&CacheKey::webhook_url(service));
    }
}
