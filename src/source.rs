//! Record storage.
//!
//! The resolver never touches storage directly; it goes through the
//! [`DataSource`] trait. A missing record is `Ok(None)` (or, for events, a
//! synthesized default), never an error. Errors are reserved for storage
//! that exists but cannot be read or parsed.
//!
//! ## Implementations
//!
//! - [`FileSystemDataSource`]: one JSON file per record under
//!   `{root}/{kind}/{name}.json`.
//! - [`MemoryDataSource`]: records held in memory, for embedding and tests.

pub mod fs;
pub mod memory;
pub mod watch;

pub use fs::FileSystemDataSource;
pub use memory::MemoryDataSource;
pub use watch::{ChangeEvent, ChangeKind, ChangeWatcher};

use crate::error::Result;
use crate::model::{CharacterRecord, ContactRecord, Event, MakerRecord, Species};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// Callback invoked for every change notification.
pub type ChangeCallback = Box<dyn Fn(ChangeEvent) + Send + 'static>;

/// Kinds of stored record. The string form is the directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Character,
    Performer,
    Maker,
    Species,
    Event,
}

impl RecordKind {
    pub const ALL: [Self; 5] = [
        Self::Character,
        Self::Performer,
        Self::Maker,
        Self::Species,
        Self::Event,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Performer => "performer",
            Self::Maker => "maker",
            Self::Species => "species",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.dir_name() == s)
            .ok_or_else(|| format!("unknown record kind '{s}'"))
    }
}

/// An addressable store of records by kind and name.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn load_character(&self, name: &str) -> Result<Option<CharacterRecord>>;

    async fn load_performer(&self, name: &str) -> Result<Option<ContactRecord>>;

    /// `None` means "no record; use the name as free text".
    async fn load_maker(&self, name: &str) -> Result<Option<MakerRecord>>;

    /// `None` means "no record; use the name as free text".
    async fn load_species(&self, name: &str) -> Result<Option<Species>>;

    /// Never absent: a missing event is synthesized by [`Event::named`].
    async fn load_event(&self, name: &str) -> Result<Event>;

    /// Sorted record names of one kind.
    async fn list_all(&self, kind: RecordKind) -> Result<Vec<String>>;

    async fn list_all_characters(&self) -> Result<Vec<String>> {
        self.list_all(RecordKind::Character).await
    }

    /// Deliver create/rename/change notifications to `callback` until the
    /// returned handle is dropped.
    fn watch_changes(&self, callback: ChangeCallback) -> Result<ChangeWatcher>;

    async fn save_character(&self, name: &str, record: &CharacterRecord) -> Result<()>;

    async fn save_performer(&self, name: &str, record: &ContactRecord) -> Result<()>;
}
