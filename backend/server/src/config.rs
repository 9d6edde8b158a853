use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

use crate::submission::SubmissionGuard;

#[derive(Error, Debug)]
#[error("Invalid {key} value: {reason}")]
pub struct ConfigError {
    key: String,
    reason: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub submission_guard: SubmissionGuard,
    pub verify_identity: bool,
    pub results_refresh: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 1111,
            redis_url: "redis://redis:6379".to_string(),
            submission_guard: SubmissionGuard::Atomic,
            verify_identity: true,
            results_refresh: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RUST_PORT", "1111")?,
            redis_url: with_password(
                try_load("REDIS_URL", "redis://redis:6379")?,
                read_secret("REDIS_PASSWORD"),
            ),
            submission_guard: try_load("SUBMISSION_GUARD", "atomic")?,
            verify_identity: try_load("VERIFY_IDENTITY", "true")?,
            results_refresh: Duration::from_secs(try_load("RESULTS_REFRESH_SECS", "30")?),
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    parse(key, var(key), default)
}

fn parse<T: FromStr>(key: &str, value: Option<String>, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    value
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");

            ConfigError {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })
}

/// Splices the password in unless the URL already carries credentials.
fn with_password(url: String, password: Option<String>) -> String {
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return url;
    };

    match url.split_once("://") {
        Some((scheme, rest)) if !rest.contains('@') => format!("{scheme}://:{password}@{rest}"),
        _ => {
            warn!("REDIS_URL already has credentials, ignoring REDIS_PASSWORD secret");
            url
        }
    }
}

/// Docker secrets, mounted under `/run/secrets`.
fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|_| {
            info!("No {secret_name} secret mounted");
        })
        .ok()
}
