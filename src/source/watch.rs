//! Change notifications for record storage.
//!
//! Wraps a `notify` watcher over the data root. Events are forwarded to the
//! callback on notify's own thread, filtered down to the kinds callers care
//! about (new records, renamed records, edited records).

use crate::error::Result;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::ChangeCallback;

/// What happened to a record file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Renamed,
    Changed,
    Removed,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Renamed => write!(f, "renamed"),
            Self::Changed => write!(f, "changed"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// A single change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl ChangeKind {
    fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Renamed),
            EventKind::Modify(_) => Some(Self::Changed),
            EventKind::Remove(_) => Some(Self::Removed),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
        }
    }
}

/// Keeps a watch alive. Dropping it stops notifications.
pub struct ChangeWatcher {
    watcher: Option<RecommendedWatcher>,
}

impl ChangeWatcher {
    /// A handle for sources that never change behind the caller's back.
    pub fn inactive() -> Self {
        Self { watcher: None }
    }

    pub fn is_active(&self) -> bool {
        self.watcher.is_some()
    }
}

impl std::fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeWatcher")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Watch `root` recursively, forwarding each relevant event path.
///
/// # Errors
///
/// Returns an error if the platform watcher cannot be created or `root`
/// cannot be watched.
pub fn watch_dir(root: &Path, callback: ChangeCallback) -> Result<ChangeWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            let Some(kind) = ChangeKind::from_notify(&event.kind) else {
                return;
            };
            for path in event.paths {
                callback(ChangeEvent { kind, path });
            }
        }
        Err(e) => tracing::warn!("data source watch error: {e}"),
    })?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    tracing::info!("Watching data source: {}", root.display());
    Ok(ChangeWatcher {
        watcher: Some(watcher),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RenameMode};

    #[test]
    fn test_notify_kinds_are_mapped() {
        assert_eq!(
            ChangeKind::from_notify(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            ChangeKind::from_notify(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
            Some(ChangeKind::Renamed)
        );
        assert_eq!(
            ChangeKind::from_notify(&EventKind::Modify(ModifyKind::Any)),
            Some(ChangeKind::Changed)
        );
        assert_eq!(ChangeKind::from_notify(&EventKind::Any), None);
    }

    #[test]
    fn test_inactive_watcher() {
        assert!(!ChangeWatcher::inactive().is_active());
    }
}
