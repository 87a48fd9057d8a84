//! Centralized error handling for mkpp3.
//!
//! Lookups that miss are not errors: the resolver turns them into
//! placeholders or pass-through strings and logs them. What remains here is
//! everything a caller has to act on.
//!
//! ## Error Categories
//!
//! - [`Mkpp3Error::MalformedInput`]: stored data that cannot be interpreted,
//!   such as a mastodon handle that is not `user@domain`.
//! - [`Mkpp3Error::Parse`]: a record file that is not valid JSON for its kind.
//! - [`Mkpp3Error::Json`]: a record that could not be written out as JSON.
//! - [`Mkpp3Error::Io`]: any filesystem failure the safe writer does not
//!   anticipate. These propagate unchanged.
//!
//! ## Context Extension Trait
//!
//! The `ResultExt` trait adds `.context()` to any `Result` whose error
//! converts into [`Mkpp3Error`]:
//!
//! ```no_run
//! use mkpp3::error::ResultExt as _;
//!
//! fn load_script() -> mkpp3::error::Result<String> {
//!     std::fs::read_to_string("profiles.txt").context("Failed to read profile script")
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

/// Main error type for mkpp3 operations.
#[derive(Debug)]
pub enum Mkpp3Error {
    /// I/O errors the caller has to deal with
    Io(std::io::Error),

    /// A record file exists but does not parse
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Stored data that cannot be interpreted (bad handle, bad script line)
    MalformedInput(String),

    /// A value that could not be serialized to JSON
    Json(serde_json::Error),

    /// Filesystem watch errors
    Watch(notify::Error),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for Mkpp3Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse { path, source } => {
                write!(f, "Failed to parse {}: {source}", path.display())
            }
            Self::MalformedInput(msg) => write!(f, "Malformed input: {msg}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Watch(e) => write!(f, "Watch error: {e}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Mkpp3Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse { source, .. } => Some(source),
            Self::Json(e) => Some(e),
            Self::Watch(e) => Some(e),
            Self::MalformedInput(_) | Self::Other(_) => None,
        }
    }
}

impl From<std::io::Error> for Mkpp3Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for Mkpp3Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Mkpp3Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<notify::Error> for Mkpp3Error {
    fn from(err: notify::Error) -> Self {
        Self::Watch(err)
    }
}

impl Mkpp3Error {
    /// The underlying I/O error kind, if this is an I/O error.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Result type alias for mkpp3 operations.
pub type Result<T> = std::result::Result<T, Mkpp3Error>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Mkpp3Error>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: Mkpp3Error = e.into();
            Mkpp3Error::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: Mkpp3Error = e.into();
            Mkpp3Error::Other(format!("{}: {}", f(), err))
        })
    }
}
