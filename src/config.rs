use crate::errors::ConfigError;
use std::{env, net::SocketAddr, path::PathBuf};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/storage.json";
/// Browsers typically allow 5 MiB per origin.
pub const DEFAULT_STORAGE_QUOTA: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub storage_quota: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            storage_quota: DEFAULT_STORAGE_QUOTA,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("PORT") {
            match value.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(err) => warn!("invalid PORT value '{value}' ({err}), using {DEFAULT_PORT}"),
            }
        }

        if let Some(path) = lookup("APP_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }

        if let Some(value) = lookup("APP_STORAGE_QUOTA") {
            config.storage_quota = value.trim().parse::<usize>().map_err(|err| ConfigError::Invalid {
                key: "APP_STORAGE_QUOTA",
                value: value.clone(),
                reason: err.to_string(),
            })?;
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.listen_addr().port(), 8080);
    }

    #[test]
    fn reads_all_variables() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "9191"),
            ("APP_DATA_PATH", "/tmp/votes.json"),
            ("APP_STORAGE_QUOTA", "1024"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9191);
        assert_eq!(config.data_path, PathBuf::from("/tmp/votes.json"));
        assert_eq!(config.storage_quota, 1024);
    }

    #[test]
    fn bad_port_falls_back_to_default() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn bad_quota_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("APP_STORAGE_QUOTA", "lots")])).unwrap_err();
        assert!(err.to_string().contains("APP_STORAGE_QUOTA"));
    }
}
