//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! core services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use crate::{HmsError, HmsResult};

/// Default SQLite database location, created on first run.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://hms.db?mode=rwc";

/// Base URL prepended to stored image paths when building display URLs.
pub const DEFAULT_ASSET_BASE_URL: &str = "/storage";

/// Display URL substituted when an entity has no stored image.
pub const PLACEHOLDER_IMAGE_URL: &str = "/storage/images/placeholder-profile.png";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_url: String,
    asset_base_url: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(database_url: String, asset_base_url: String) -> HmsResult<Self> {
        if database_url.trim().is_empty() {
            return Err(HmsError::validation(
                "database_url",
                "database_url cannot be empty",
            ));
        }
        Ok(Self {
            database_url,
            asset_base_url: asset_base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Resolve configuration from `HMS_DATABASE_URL` and `HMS_ASSET_BASE_URL`,
    /// falling back to the defaults.
    pub fn from_env() -> HmsResult<Self> {
        let database_url =
            std::env::var("HMS_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        let asset_base_url =
            std::env::var("HMS_ASSET_BASE_URL").unwrap_or_else(|_| DEFAULT_ASSET_BASE_URL.into());
        Self::new(database_url, asset_base_url)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn asset_base_url(&self) -> &str {
        &self.asset_base_url
    }

    /// Builds the display URL for a stored image path, substituting the
    /// placeholder when no image is stored.
    pub fn image_url(&self, stored_path: Option<&str>) -> String {
        match stored_path {
            Some(path) if !path.trim().is_empty() => {
                format!("{}/{}", self.asset_base_url, path.trim_start_matches('/'))
            }
            _ => PLACEHOLDER_IMAGE_URL.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_joins_base_and_path() {
        let cfg = CoreConfig::new("sqlite::memory:".into(), "/storage/".into()).unwrap();
        assert_eq!(cfg.image_url(Some("doctors/7.png")), "/storage/doctors/7.png");
        assert_eq!(cfg.image_url(Some("/doctors/7.png")), "/storage/doctors/7.png");
    }

    #[test]
    fn image_url_falls_back_to_placeholder() {
        let cfg = CoreConfig::new("sqlite::memory:".into(), "/storage".into()).unwrap();
        assert_eq!(cfg.image_url(None), PLACEHOLDER_IMAGE_URL);
        assert_eq!(cfg.image_url(Some("  ")), PLACEHOLDER_IMAGE_URL);
    }
}
