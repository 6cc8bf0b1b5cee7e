mod app;
mod core;

pub use app::{AppConfig, AppConfigError, PreviewConfig, StorageConfig};
pub use core::Config;
