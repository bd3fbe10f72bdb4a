use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cart::{CartOptions, CorruptCartPolicy, DEFAULT_STORAGE_KEY};
use crate::error::ConfigError;

/// Runtime settings, read from `CART_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct CartConfig {
    /// Base URL of the REST catalog. `None` means no remote catalog is configured.
    pub api_url: Option<String>,
    pub storage_dir: PathBuf,
    pub storage_key: String,
    pub channel_capacity: usize,
    pub lookup_timeout: Duration,
    pub corrupt_policy: CorruptCartPolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            storage_dir: PathBuf::from(".cart"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            channel_capacity: 32,
            lookup_timeout: Duration::from_millis(10_000),
            corrupt_policy: CorruptCartPolicy::Fail,
        }
    }
}

impl CartConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.api_url = var("CART_API_URL");
        if let Some(dir) = var("CART_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(key) = var("CART_STORAGE_KEY") {
            config.storage_key = key;
        }
        if let Some(value) = var("CART_CHANNEL_CAPACITY") {
            config.channel_capacity = parse_positive("CART_CHANNEL_CAPACITY", &value)?;
        }
        if let Some(value) = var("CART_LOOKUP_TIMEOUT_MS") {
            config.lookup_timeout = Duration::from_millis(parse_positive("CART_LOOKUP_TIMEOUT_MS", &value)?);
        }
        if let Some(value) = var("CART_RESET_CORRUPT") {
            config.corrupt_policy = if parse_bool("CART_RESET_CORRUPT", &value)? {
                CorruptCartPolicy::Reset
            } else {
                CorruptCartPolicy::Fail
            };
        }

        Ok(config)
    }

    pub fn cart_options(&self) -> CartOptions {
        CartOptions {
            buffer_size: self.channel_capacity,
            storage_key: self.storage_key.clone(),
            corrupt_policy: self.corrupt_policy,
        }
    }
}

fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { var, value: value.to_string(), reason: reason.into() }
}

fn parse_positive<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + From<u8>,
    T::Err: std::fmt::Display,
{
    let parsed: T = value.parse().map_err(|e: T::Err| invalid(var, value, e.to_string()))?;
    if parsed < T::from(1) {
        return Err(invalid(var, value, "must be at least 1"));
    }
    Ok(parsed)
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, value, "expected true or false")),
    }
}
