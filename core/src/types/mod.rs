pub(crate) mod config;
pub use config::{AppConfig, AppConfigError, Config, PreviewConfig, StorageConfig};

pub(crate) mod key;
pub use key::{CacheKey, CacheKeyError, MAX_KEY_LENGTH};

pub(crate) mod project;
pub use project::{
    IdentifierShape, MAX_PROJECT_ID_LENGTH, ProjectId, ProjectIdError, ServiceType,
    ServiceTypeError,
};

pub(crate) mod entry;
pub use entry::StoredEntry;

pub(crate) mod ttl_key;
pub use ttl_key::TtlKey;

pub mod time;
