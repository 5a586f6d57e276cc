use std::{fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::info;

use crate::domain::models::file::MAX_IMAGE_BYTES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings of this server instance, read from the environment.
#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub port: u16,
    /// Served under `/public`; uploads land in a subdirectory of it.
    pub public_dir: PathBuf,
    pub upload_subdir: String,
    pub max_upload_bytes: u64,
    pub session_cookie: String,
    pub session_ttl_secs: u64,
    pub redis_url: Option<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            public_dir: PathBuf::from("public"),
            upload_subdir: "uploads".to_string(),
            max_upload_bytes: MAX_IMAGE_BYTES,
            session_cookie: "HelpingHands".to_string(),
            session_ttl_secs: 86_400,
            redis_url: None,
        }
    }
}

impl LocalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            public_dir: lookup("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            upload_subdir: lookup("UPLOAD_SUBDIR")
                .map(|dir| dir.trim_matches('/').to_string())
                .filter(|dir| !dir.is_empty())
                .unwrap_or(defaults.upload_subdir),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            session_cookie: lookup("SESSION_COOKIE").unwrap_or(defaults.session_cookie),
            session_ttl_secs: parse_or(&lookup, "SESSION_TTL_SECS", defaults.session_ttl_secs)?,
            redis_url: lookup("REDIS_URL").filter(|url| !url.trim().is_empty()),
        })
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.public_dir.join(&self.upload_subdir)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.public_dir.join("images")
    }

    /// URL prefix uploaded files are served under.
    pub fn upload_url_prefix(&self) -> String {
        format!("/public/{}", self.upload_subdir)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
