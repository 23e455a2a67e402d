use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{IdentityStore, EMAIL_KEY};
use crate::config::IdentityConfig;
use crate::errors::StoreError;

/// Key-value file holding plain string entries, one JSON object per file.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(config.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads entries for a rewrite. A corrupt file is discarded so the next
    /// write replaces it; the flag reports whether that happened.
    async fn read_entries_for_write(
        &self,
    ) -> Result<(BTreeMap<String, String>, bool), StoreError> {
        match self.read_entries().await {
            Ok(entries) => Ok((entries, false)),
            Err(StoreError::Serialization(e)) => {
                warn!(
                    "Identity store {} is corrupt, overwriting it: {}",
                    self.path.display(),
                    e
                );
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    /// Writes to a sibling temp file, then renames it over the store.
    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(entries)?;

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    async fn get_email(&self) -> Result<Option<String>, StoreError> {
        let entries = self.read_entries().await?;
        Ok(entries.get(EMAIL_KEY).cloned())
    }

    async fn save_email(&self, email: &str) -> Result<(), StoreError> {
        let (mut entries, _) = self.read_entries_for_write().await?;
        entries.insert(EMAIL_KEY.to_string(), email.to_string());
        self.write_entries(&entries).await?;
        info!("Stored visitor email in {}", self.path.display());
        Ok(())
    }

    async fn clear_email(&self) -> Result<(), StoreError> {
        let (mut entries, corrupt) = self.read_entries_for_write().await?;
        if entries.remove(EMAIL_KEY).is_none() && !corrupt {
            debug!("No visitor email stored, nothing to clear");
            return Ok(());
        }
        self.write_entries(&entries).await?;
        info!("Cleared visitor email from {}", self.path.display());
        Ok(())
    }
}
