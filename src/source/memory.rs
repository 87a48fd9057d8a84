//! In-memory record storage.

use super::{ChangeCallback, ChangeWatcher, DataSource, RecordKind};
use crate::error::Result;
use crate::model::{CharacterRecord, ContactRecord, Event, MakerRecord, Species};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    characters: BTreeMap<String, CharacterRecord>,
    performers: BTreeMap<String, ContactRecord>,
    makers: BTreeMap<String, MakerRecord>,
    species: BTreeMap<String, Species>,
    events: BTreeMap<String, Event>,
}

/// Records held in memory. Maker names are matched exactly.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    tables: RwLock<Tables>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_character(self, name: &str, record: CharacterRecord) -> Self {
        self.write().characters.insert(name.to_owned(), record);
        self
    }

    pub fn with_performer(self, name: &str, record: ContactRecord) -> Self {
        self.write().performers.insert(name.to_owned(), record);
        self
    }

    pub fn with_maker(self, name: &str, record: MakerRecord) -> Self {
        self.write().makers.insert(name.to_owned(), record);
        self
    }

    pub fn with_species(self, name: &str, species: Species) -> Self {
        self.write().species.insert(name.to_owned(), species);
        self
    }

    pub fn with_event(self, name: &str, event: Event) -> Self {
        self.write().events.insert(name.to_owned(), event);
        self
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl DataSource for MemoryDataSource {
    async fn load_character(&self, name: &str) -> Result<Option<CharacterRecord>> {
        Ok(self.read().characters.get(name).cloned())
    }

    async fn load_performer(&self, name: &str) -> Result<Option<ContactRecord>> {
        Ok(self.read().performers.get(name).cloned())
    }

    async fn load_maker(&self, name: &str) -> Result<Option<MakerRecord>> {
        Ok(self.read().makers.get(name).cloned())
    }

    async fn load_species(&self, name: &str) -> Result<Option<Species>> {
        Ok(self.read().species.get(name).cloned())
    }

    async fn load_event(&self, name: &str) -> Result<Event> {
        Ok(self
            .read()
            .events
            .get(name)
            .cloned()
            .map_or_else(|| Event::named(name), |event| event.or_named(name)))
    }

    async fn list_all(&self, kind: RecordKind) -> Result<Vec<String>> {
        let tables = self.read();
        let names = match kind {
            RecordKind::Character => tables.characters.keys().cloned().collect(),
            RecordKind::Performer => tables.performers.keys().cloned().collect(),
            RecordKind::Maker => tables.makers.keys().cloned().collect(),
            RecordKind::Species => tables.species.keys().cloned().collect(),
            RecordKind::Event => tables.events.keys().cloned().collect(),
        };
        Ok(names)
    }

    fn watch_changes(&self, _callback: ChangeCallback) -> Result<ChangeWatcher> {
        Ok(ChangeWatcher::inactive())
    }

    async fn save_character(&self, name: &str, record: &CharacterRecord) -> Result<()> {
        self.write()
            .characters
            .insert(name.to_owned(), record.clone());
        Ok(())
    }

    async fn save_performer(&self, name: &str, record: &ContactRecord) -> Result<()> {
        self.write()
            .performers
            .insert(name.to_owned(), record.clone());
        Ok(())
    }
}
