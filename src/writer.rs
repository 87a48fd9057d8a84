//! Safe sidecar writer.
//!
//! Profiles land at `{profile_root}/characters/{filename}.pp3`, or
//! `{profile_root}/events/{event}/{filename}.pp3` when tied to an event.
//!
//! The target is opened with an exclusive create, so the filesystem decides
//! who wins when two writes race for the same name. Two failures are
//! expected and handled once each:
//!
//! - a missing directory: the missing segments are created one at a time,
//!   then the open is retried;
//! - an existing file: it is renamed to `{filename}.pp3~` (one generation
//!   of backup) and the open is retried, unless overwriting is disabled.
//!
//! Anything else propagates.

use crate::error::{Mkpp3Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt as _;

/// Directory a profile is written into.
pub fn profile_dir(profile_root: &Path, event_name: Option<&str>) -> PathBuf {
    match event_name {
        Some(event) => profile_root.join("events").join(event),
        None => profile_root.join("characters"),
    }
}

/// Full path of the sidecar for `filename`.
pub fn profile_path(profile_root: &Path, filename: &str, event_name: Option<&str>) -> PathBuf {
    profile_dir(profile_root, event_name).join(format!("{filename}.pp3"))
}

/// Path the previous version of `path` is moved to.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_owned();
    backup.push("~");
    PathBuf::from(backup)
}

/// Write `text` as a sidecar and return the path written.
///
/// # Errors
///
/// Returns [`Mkpp3Error::Io`] if the file already exists and `overwrite` is
/// false, or on any I/O failure other than a missing directory or an
/// existing file.
pub async fn write_profile(
    profile_root: &Path,
    filename: &str,
    event_name: Option<&str>,
    text: &str,
    overwrite: bool,
) -> Result<PathBuf> {
    let dir = profile_dir(profile_root, event_name);
    let path = profile_path(profile_root, filename, event_name);

    let mut created_dirs = false;
    let mut backed_up = false;
    let mut file = loop {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => break file,
            Err(e) if e.kind() == ErrorKind::NotFound && !created_dirs => {
                created_dirs = true;
                create_subfolders(&dir).await?;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && overwrite && !backed_up => {
                backed_up = true;
                let backup = backup_path(&path);
                fs::rename(&path, &backup).await?;
                tracing::info!("Moved existing profile to {}", backup.display());
            }
            Err(e) => {
                if e.kind() == ErrorKind::AlreadyExists {
                    tracing::warn!("Refusing to overwrite {}", path.display());
                }
                return Err(Mkpp3Error::Io(e));
            }
        }
    };

    file.write_all(text.as_bytes()).await?;
    file.flush().await?;
    tracing::info!("Wrote profile {}", path.display());
    Ok(path)
}

/// Create `dir` and whichever of its ancestors are missing.
///
/// Walks up until a directory can be created (or already exists), then back
/// down creating the remaining segments in order. A segment that appears in
/// the meantime counts as created.
///
/// # Errors
///
/// Returns an error if a segment cannot be created for any reason other
/// than its parent being missing or it already existing.
pub async fn create_subfolders(dir: &Path) -> Result<()> {
    let mut missing = Vec::new();
    let mut current = dir;
    loop {
        match fs::create_dir(current).await {
            Ok(()) => break,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => break,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let Some(parent) = current.parent() else {
                    return Err(e.into());
                };
                missing.push(current);
                current = parent;
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Deepest first, so create in reverse.
    for segment in missing.into_iter().rev() {
        match fs::create_dir(segment).await {
            Ok(()) => tracing::debug!("Created {}", segment.display()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_and_read_back() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("characters")).unwrap();

        let path = write_profile(temp.path(), "fizz", None, "[Exif]\n", true)
            .await
            .unwrap();

        assert_eq!(path, temp.path().join("characters").join("fizz.pp3"));
        assert_eq!(path, profile_path(temp.path(), "fizz", None));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[Exif]\n");
    }

    #[tokio::test]
    async fn test_existing_file_is_backed_up() {
        let temp = tempdir().unwrap();
        let first = write_profile(temp.path(), "fizz", None, "old", true)
            .await
            .unwrap();
        let second = write_profile(temp.path(), "fizz", None, "new", true)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "new");
        assert_eq!(
            std::fs::read_to_string(temp.path().join("characters").join("fizz.pp3~")).unwrap(),
            "old"
        );
    }

    #[tokio::test]
    async fn test_only_one_backup_generation() {
        let temp = tempdir().unwrap();
        for text in ["one", "two", "three"] {
            write_profile(temp.path(), "fizz", None, text, true)
                .await
                .unwrap();
        }
        let dir = temp.path().join("characters");
        assert_eq!(std::fs::read_to_string(dir.join("fizz.pp3")).unwrap(), "three");
        assert_eq!(std::fs::read_to_string(dir.join("fizz.pp3~")).unwrap(), "two");
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_no_overwrite_is_an_error() {
        let temp = tempdir().unwrap();
        write_profile(temp.path(), "fizz", None, "old", false)
            .await
            .unwrap();

        let err = write_profile(temp.path(), "fizz", None, "new", false)
            .await
            .unwrap_err();

        assert_eq!(err.io_kind(), Some(ErrorKind::AlreadyExists));
        let path = profile_path(temp.path(), "fizz", None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
        assert!(!backup_path(&path).exists());
    }

    #[tokio::test]
    async fn test_deep_directories_are_created() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("a").join("b").join("profiles");

        let path = write_profile(&root, "fizz", Some("ExpoCon 2024"), "text", true)
            .await
            .unwrap();

        assert_eq!(
            path,
            root.join("events").join("ExpoCon 2024").join("fizz.pp3")
        );
        assert_eq!(path, profile_path(&root, "fizz", Some("ExpoCon 2024")));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "text");
    }

    #[tokio::test]
    async fn test_create_subfolders_tolerates_existing() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("x").join("y");
        create_subfolders(&dir).await.unwrap();
        create_subfolders(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_concurrent_writes_share_directories() {
        let temp = tempdir().unwrap();
        let root = temp.path().to_path_buf();
        let writes = (0..8).map(|i| {
            let root = root.clone();
            async move {
                write_profile(&root, &format!("p{i}"), Some("Con"), &i.to_string(), true).await
            }
        });

        let paths = futures::future::try_join_all(writes).await.unwrap();

        for (i, path) in paths.iter().enumerate() {
            assert_eq!(std::fs::read_to_string(path).unwrap(), i.to_string());
        }
    }

    #[test]
    fn test_backup_path_appends_tilde() {
        assert_eq!(
            backup_path(Path::new("/p/characters/fizz.pp3")),
            PathBuf::from("/p/characters/fizz.pp3~")
        );
    }
}
