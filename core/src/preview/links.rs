use super::{EncodeOptions, decode, encode};
use crate::types::{PreviewConfig, ProjectId};
use std::time::{Duration, SystemTime};

/// Builds and resolves `{base_url}/preview/{token}` links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLinks {
    base_url: String,
    link_ttl: Option<Duration>,
}

impl PreviewLinks {
    pub const ROUTE: &'static str = "preview";

    pub fn new(base_url: impl Into<String>, link_ttl: Option<Duration>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, link_ttl }
    }

    pub fn from_config(config: &PreviewConfig) -> Self {
        Self::new(config.base_url.clone(), config.link_ttl())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Encode options carrying the configured link lifetime.
    pub fn default_options(&self) -> EncodeOptions {
        EncodeOptions {
            short_code: None,
            expires_in: self.link_ttl,
        }
    }

    pub fn url_for(
        &self,
        project_id: &ProjectId,
        options: &EncodeOptions,
        now: SystemTime,
    ) -> String {
        let token = encode(project_id, options, now);
        format!("{}/{}/{}", self.base_url, Self::ROUTE, token)
    }

    /// Extracts `{token}` from a `/preview/{token}` path or a full URL.
    ///
    /// Query string, fragment and a trailing slash are ignored.
    pub fn token_from_path(path_or_url: &str) -> Option<&str> {
        let end = path_or_url.find(['?', '#']).unwrap_or(path_or_url.len());
        let path = &path_or_url[..end];

        let path = match path.find("://") {
            Some(scheme_end) => {
                let after_scheme = &path[scheme_end + 3..];
                &after_scheme[after_scheme.find('/')?..]
            }
            None => path,
        };

        let mut segments = path.trim_end_matches('/').rsplit('/');
        let token = segments.next()?;
        let route = segments.next()?;

        (route == Self::ROUTE && !token.is_empty()).then_some(token)
    }

    /// Resolves a link to its project, or `None` for invalid or expired links.
    pub fn resolve(&self, path_or_url: &str, now: SystemTime) -> Option<ProjectId> {
        Self::token_from_path(path_or_url).and_then(|token| decode(token, now))
    }
}
