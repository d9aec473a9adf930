//! Generator configuration
//!
//! Built once by the caller and handed to [`WorkbookService`](crate::WorkbookService).
//! Nothing below the service reads the process environment.

use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;

use crate::error::{GenerateError, Result};

/// Where generated files are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Local,
    /// S3-compatible object storage
    ObjectStore,
}

impl FromStr for StorageKind {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StorageKind::Local),
            "s3" => Ok(StorageKind::ObjectStore),
            other => Err(GenerateError::Config(format!(
                "unknown storage type '{}' (expected local or s3)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub storage: StorageKind,
    /// Directory used by local storage
    pub local_storage_path: PathBuf,
    /// Lifetime of object-storage download links
    pub url_expiry_secs: u64,
    pub log_level: LevelFilter,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::Local,
            local_storage_path: PathBuf::from("./temp-files"),
            url_expiry_secs: 3600,
            log_level: LevelFilter::Info,
        }
    }
}

impl GeneratorConfig {
    /// Read `STORAGE_TYPE`, `DEV_STORAGE_PATH`, `PRESIGNED_URL_EXPIRY` and `LOG_LEVEL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(kind) = lookup("STORAGE_TYPE").filter(|v| !v.trim().is_empty()) {
            config.storage = kind.parse()?;
        }
        if let Some(path) = lookup("DEV_STORAGE_PATH").filter(|v| !v.trim().is_empty()) {
            config.local_storage_path = PathBuf::from(path);
        }
        if let Some(expiry) = lookup("PRESIGNED_URL_EXPIRY") {
            config.url_expiry_secs = expiry.trim().parse().map_err(|_| {
                GenerateError::Config(format!("PRESIGNED_URL_EXPIRY must be seconds, got '{}'", expiry))
            })?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = parse_log_level(&level)?;
        }
        Ok(config)
    }
}

/// `error`, `warn`, `info` or `debug`
pub fn parse_log_level(level: &str) -> Result<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(GenerateError::Config(format!("unknown log level '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.local_storage_path, PathBuf::from("./temp-files"));
        assert_eq!(config.url_expiry_secs, 3600);
    }

    #[test]
    fn test_overrides() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            ("STORAGE_TYPE", "s3"),
            ("DEV_STORAGE_PATH", "/tmp/out"),
            ("PRESIGNED_URL_EXPIRY", "600"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.storage, StorageKind::ObjectStore);
        assert_eq!(config.local_storage_path, PathBuf::from("/tmp/out"));
        assert_eq!(config.url_expiry_secs, 600);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_values() {
        assert!(GeneratorConfig::from_lookup(lookup(&[("STORAGE_TYPE", "ftp")])).is_err());
        assert!(GeneratorConfig::from_lookup(lookup(&[("PRESIGNED_URL_EXPIRY", "soon")])).is_err());
        assert!(GeneratorConfig::from_lookup(lookup(&[("LOG_LEVEL", "loud")])).is_err());
    }
}
