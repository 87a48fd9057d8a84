//! JSON-file record storage.
//!
//! Layout: `{root}/{kind}/{name}.json`, one record per file. A missing file
//! is a missing record. Any other read failure, or a file that does not
//! parse, is an error.

use super::watch::watch_dir;
use super::{ChangeCallback, ChangeWatcher, DataSource, RecordKind};
use crate::error::{Mkpp3Error, Result};
use crate::model::{CharacterRecord, ContactRecord, Event, MakerRecord, Species};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Records stored as JSON files under a data root.
#[derive(Debug, Clone)]
pub struct FileSystemDataSource {
    root: PathBuf,
}

impl FileSystemDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the record `name` of `kind`.
    pub fn record_path(&self, kind: RecordKind, name: &str) -> PathBuf {
        self.root.join(kind.dir_name()).join(format!("{name}.json"))
    }

    async fn load<T: DeserializeOwned + Send>(&self, kind: RecordKind, name: &str) -> Result<Option<T>> {
        let path = self.record_path(kind, name);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no {kind} record at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| Mkpp3Error::Parse { path, source })
    }

    async fn save<T: Serialize + Sync>(&self, kind: RecordKind, name: &str, record: &T) -> Result<()> {
        let path = self.record_path(kind, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).await?;
        tracing::info!("Saved {kind} record {}", path.display());
        Ok(())
    }
}

/// Maker files are named in lower case with underscores for spaces, so a
/// maker mentioned as free text still finds its record once one is added.
fn maker_file_stem(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

#[async_trait]
impl DataSource for FileSystemDataSource {
    async fn load_character(&self, name: &str) -> Result<Option<CharacterRecord>> {
        self.load(RecordKind::Character, name).await
    }

    async fn load_performer(&self, name: &str) -> Result<Option<ContactRecord>> {
        self.load(RecordKind::Performer, name).await
    }

    async fn load_maker(&self, name: &str) -> Result<Option<MakerRecord>> {
        self.load(RecordKind::Maker, &maker_file_stem(name)).await
    }

    async fn load_species(&self, name: &str) -> Result<Option<Species>> {
        self.load(RecordKind::Species, name).await
    }

    async fn load_event(&self, name: &str) -> Result<Event> {
        Ok(self
            .load(RecordKind::Event, name)
            .await?
            .map_or_else(|| Event::named(name), |event: Event| event.or_named(name)))
    }

    async fn list_all(&self, kind: RecordKind) -> Result<Vec<String>> {
        let dir = self.root.join(kind.dir_name());
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn watch_changes(&self, callback: ChangeCallback) -> Result<ChangeWatcher> {
        watch_dir(&self.root, callback)
    }

    async fn save_character(&self, name: &str, record: &CharacterRecord) -> Result<()> {
        self.save(RecordKind::Character, name, record).await
    }

    async fn save_performer(&self, name: &str, record: &ContactRecord) -> Result<()> {
        self.save(RecordKind::Performer, name, record).await
    }
}
