use crate::error::CliError;
use harmonia_core::preview::{self, EncodeOptions};
use harmonia_core::store::{BackendKind, WriteOptions};
use harmonia_core::types::{AppConfig, CacheKey, Config, ProjectId};
use harmonia_core::{ClientCache, PreviewLinks};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

/// Text a command prints on success.
pub type Output = String;

const SECS_PER_HOUR: u64 = 60 * 60;

/// Paths and settings shared by every command.
pub struct Context {
    config: Config,
    app: AppConfig,
}

impl Context {
    pub fn load(data_dir: PathBuf) -> Result<Self, CliError> {
        let config = Config {
            base_path: data_dir,
        };
        let app = AppConfig::load(&config.app_config_path())?;

        let problems = app.validate();
        for problem in &problems {
            warn!(%problem, "invalid config value, using default");
        }
        let app = if problems.is_empty() {
            app
        } else {
            app.with_defaults_for_invalid()
        };

        Ok(Self { config, app })
    }

    fn links(&self) -> PreviewLinks {
        PreviewLinks::from_config(&self.app.preview)
    }

    fn open_cache(&self) -> ClientCache {
        ClientCache::open(self.config.clone(), &self.app.storage)
    }
}

pub fn encode(
    project_id: &str,
    short_code: Option<String>,
    expires_in_hours: Option<u32>,
) -> Result<Output, CliError> {
    let project_id = ProjectId::try_new(project_id)?;
    let options = EncodeOptions {
        short_code,
        expires_in: expires_in_hours
            .map(|hours| Duration::from_secs(u64::from(hours) * SECS_PER_HOUR)),
    };
    Ok(preview::encode(&project_id, &options, SystemTime::now()))
}

pub fn decode(token: &str) -> Result<Output, CliError> {
    let project_id =
        preview::decode(token.trim(), SystemTime::now()).ok_or(CliError::InvalidLink)?;
    Ok(project_id.to_string())
}

pub fn link(ctx: &Context, project_id: &str) -> Result<Output, CliError> {
    let project_id = ProjectId::try_new(project_id)?;
    let links = ctx.links();
    Ok(links.url_for(&project_id, &links.default_options(), SystemTime::now()))
}

pub fn resolve(ctx: &Context, url: &str) -> Result<Output, CliError> {
    let project_id = ctx
        .links()
        .resolve(url.trim(), SystemTime::now())
        .ok_or(CliError::InvalidLink)?;
    Ok(project_id.to_string())
}

pub fn cache_get(ctx: &Context, key: &str) -> Result<Output, CliError> {
    let key = CacheKey::try_new(key)?;
    let value: serde_json::Value = ctx
        .open_cache()
        .store_mut()
        .read(&key, SystemTime::now())
        .ok_or_else(|| CliError::NotCached(key.to_string()))?;
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn cache_set(
    ctx: &Context,
    key: &str,
    json: &str,
    ttl_secs: Option<u64>,
    redundant: bool,
) -> Result<Output, CliError> {
    let key = CacheKey::try_new(key)?;
    let value: serde_json::Value = serde_json::from_str(json)?;
    let options = WriteOptions {
        ttl: ttl_secs.map(Duration::from_secs),
        redundant,
    };

    let mut cache = ctx.open_cache();
    let report = cache
        .store_mut()
        .write(&key, &value, &options, SystemTime::now());
    // Session and cookie copies die with this process.
    if !report.stored.contains(&BackendKind::Durable) {
        return Err(CliError::NotPersisted(key.to_string()));
    }
    info!(%key, backends = ?report.stored, "cached value");
    Ok(Output::new())
}

pub fn cache_rm(ctx: &Context, key: &str) -> Result<Output, CliError> {
    let key = CacheKey::try_new(key)?;
    ctx.open_cache().store_mut().remove(&key);
    Ok(Output::new())
}

pub fn cache_sweep(ctx: &Context) -> Result<Output, CliError> {
    let report = ctx.open_cache().sweep_expired(SystemTime::now());
    let mut lines: Vec<String> = report
        .removed
        .iter()
        .map(|(backend, removed)| format!("{backend}: {removed}"))
        .collect();
    lines.push(format!("total: {}", report.total()));
    Ok(lines.join("\n"))
}

pub fn config_show(ctx: &Context) -> Result<Output, CliError> {
    Ok(format!(
        "# {}\n{}",
        ctx.config.app_config_path().display(),
        ctx.app.to_toml()?.trim_end()
    ))
}

pub fn config_init(ctx: &Context) -> Result<Output, CliError> {
    let path = ctx.config.app_config_path();
    if path.exists() {
        return Ok(format!("{} already exists", path.display()));
    }
    AppConfig::default().save(&path)?;
    Ok(format!("wrote {}", path.display()))
}

#[cfg(test)]
mod tests;
