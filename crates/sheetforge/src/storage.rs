//! Storage collaborator
//!
//! Generated bytes are handed to a [`Storage`] which returns a [`Locator`];
//! the locator is later turned into a download URL. Only local storage
//! ships here. Object storage is registered by the embedding application.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};

use crate::error::{GenerateError, Result};

/// Backend-specific handle to a stored file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Locator(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait Storage {
    /// Persist `bytes`; `suggested_name` is a hint, backends may decorate it
    fn upload(&self, bytes: &[u8], suggested_name: &str) -> Result<Locator>;

    fn resolve_url(&self, locator: &Locator) -> Result<String>;

    fn delete(&self, locator: &Locator) -> Result<()>;

    /// Lifetime of resolved URLs in seconds, `None` when they do not expire
    fn expires_in(&self) -> Option<u64> {
        None
    }
}

/// Files under a local directory, for development and the CLI
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Storage for LocalStorage {
    fn upload(&self, bytes: &[u8], suggested_name: &str) -> Result<Locator> {
        fs::create_dir_all(&self.dir)?;

        // keep only the final path component of the suggested name
        let name = Path::new(suggested_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| GenerateError::generation(format!("Invalid file name '{}'", suggested_name)))?;
        let path = self.dir.join(format!("{}_{}", Utc::now().timestamp_millis(), name));

        fs::write(&path, bytes)?;
        info!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(Locator(path.to_string_lossy().into_owned()))
    }

    fn resolve_url(&self, locator: &Locator) -> Result<String> {
        let absolute = fs::canonicalize(locator.as_str())?;
        Ok(format!("file://{}", absolute.display()))
    }

    fn delete(&self, locator: &Locator) -> Result<()> {
        debug!("Deleting {}", locator);
        fs::remove_file(locator.as_str())?;
        Ok(())
    }
}
