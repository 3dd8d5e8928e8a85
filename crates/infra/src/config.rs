//! Process configuration from environment variables (and `.env`).

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::lifecycle::CleanupPolicy;
use crate::media::cloudinary::{CloudinaryConfig, DEFAULT_API_BASE};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not valid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("incomplete Cloudinary configuration: {missing} not set")]
    PartialCloudinary { missing: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` selects the in-memory store.
    pub database: Option<DatabaseConfig>,
    /// `None` selects the in-memory media host.
    pub cloudinary: Option<CloudinaryConfig>,
    pub store_timeout: Duration,
    pub cleanup: CleanupPolicy,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parsed(&var, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;

        let database = match var("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parsed(&var, "DATABASE_MAX_CONNECTIONS", 5)?,
            }),
            None => None,
        };

        let store_timeout = Duration::from_millis(parsed(&var, "STORE_TIMEOUT_MS", 5_000)?);
        let media_timeout = Duration::from_millis(parsed(&var, "MEDIA_TIMEOUT_MS", 10_000)?);
        let cleanup = CleanupPolicy {
            timeout: media_timeout,
            max_retries: parsed(&var, "MEDIA_MAX_RETRIES", 2)?,
            ..CleanupPolicy::default()
        };

        let cloudinary = match (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            var("CLOUDINARY_API_SECRET"),
        ) {
            (None, None, None) => None,
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
                api_base: var("CLOUDINARY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                timeout: media_timeout,
            }),
            (cloud, key, _) => {
                let missing = if cloud.is_none() {
                    "CLOUDINARY_CLOUD_NAME"
                } else if key.is_none() {
                    "CLOUDINARY_API_KEY"
                } else {
                    "CLOUDINARY_API_SECRET"
                };
                return Err(ConfigError::PartialCloudinary { missing });
            }
        };

        Ok(Self {
            bind_addr,
            database,
            cloudinary,
            store_timeout,
            cleanup,
        })
    }
}

fn parsed<T>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults_and_in_memory_collaborators() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert!(cfg.database.is_none());
        assert!(cfg.cloudinary.is_none());
        assert_eq!(cfg.store_timeout, Duration::from_secs(5));
        assert_eq!(cfg.cleanup.timeout, Duration::from_secs(10));
        assert_eq!(cfg.cleanup.max_retries, 2);
    }

    #[test]
    fn full_environment_is_read() {
        let cfg = load(&[
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("DATABASE_URL", "postgres://shop@localhost/shop"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("STORE_TIMEOUT_MS", "250"),
            ("MEDIA_TIMEOUT_MS", "1500"),
            ("MEDIA_MAX_RETRIES", "0"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr.port(), 3000);
        assert_eq!(
            cfg.database,
            Some(DatabaseConfig {
                url: "postgres://shop@localhost/shop".to_string(),
                max_connections: 12,
            })
        );
        assert_eq!(cfg.store_timeout, Duration::from_millis(250));
        assert_eq!(cfg.cleanup.max_retries, 0);

        let cloudinary = cfg.cloudinary.unwrap();
        assert_eq!(cloudinary.cloud_name, "demo");
        assert_eq!(cloudinary.api_base, DEFAULT_API_BASE);
        assert_eq!(cloudinary.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = load(&[("DATABASE_URL", "  "), ("CLOUDINARY_API_KEY", "")]).unwrap();
        assert!(cfg.database.is_none());
        assert!(cfg.cloudinary.is_none());
    }

    #[test]
    fn partial_cloudinary_credentials_are_rejected() {
        let err = load(&[("CLOUDINARY_CLOUD_NAME", "demo"), ("CLOUDINARY_API_KEY", "key")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::PartialCloudinary {
                missing: "CLOUDINARY_API_SECRET"
            }
        );
    }

    #[test]
    fn unparsable_numbers_name_the_variable() {
        let err = load(&[("MEDIA_MAX_RETRIES", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "MEDIA_MAX_RETRIES", .. }));
    }
}
