//! Resolve → render → write, for one profile or a batch of them.
//!
//! # Overview
//!
//! A [`ProfileRequest`] names the characters in a photo plus optional event,
//! label, title and extra tags. A [`Profiler`] owns the data source and the
//! output settings and turns requests into sidecar files:
//!
//! 1. **Resolve** each character reference against the data source.
//! 2. **Render** the sidecar text and filename.
//! 3. **Write** it under the profile root without clobbering anything.
//!
//! Batches run every request concurrently and report one result per request,
//! in request order. One failed request never stops the others.
//!
//! # Example
//!
//! ```no_run
//! use mkpp3::pipeline::{ProfileRequest, Profiler, read_profile_script};
//! use mkpp3::source::FileSystemDataSource;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> mkpp3::error::Result<()> {
//! let source = Arc::new(FileSystemDataSource::new("./data"));
//! let profiler = Profiler::new(source, "./profiles");
//!
//! let script = read_profile_script(Path::new("expo.txt")).await?;
//! let report = profiler
//!     .write_script(&script, &ProfileRequest::at_event("ExpoCon"))
//!     .await;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Profile Scripts
//!
//! One profile per line, `label:character1,character2/performer`:
//!
//! ```text
//! # Saturday
//! group-1:fizz,buzz
//! fizz/sam
//! ```

pub mod request;
pub mod runner;
pub mod script;

pub use request::ProfileRequest;
pub use runner::{BatchReport, Profiler};
pub use script::{ScriptEntry, parse_character, parse_profile_script, read_profile_script};
