//! # mkpp3 - RawTherapee sidecars for convention photos
//!
//! mkpp3 writes `.pp3` sidecar profiles that fill in a photo's IPTC caption,
//! headline and keywords from a small database of characters, performers,
//! makers, species and events.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mkpp3::pipeline::{ProfileRequest, Profiler};
//! use mkpp3::source::FileSystemDataSource;
//! use std::sync::Arc;
//!
//! # async fn example() -> mkpp3::error::Result<()> {
//! let profiler = Profiler::new(Arc::new(FileSystemDataSource::new("./data")), "./profiles");
//!
//! let request = ProfileRequest {
//!     label: Some("group".to_owned()),
//!     ..ProfileRequest::for_characters(["fizz", "buzz"])
//! };
//! let path = profiler.write(&request).await?;
//! println!("Wrote {}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`model`]: stored records, references, and resolved entities
//! - [`source`]: the [`source::DataSource`] trait and its implementations
//! - [`resolver`]: turns references into fully resolved characters
//! - [`sites`]: site handles to profile URLs, in credit priority order
//! - [`render`]: sidecar text, headline, keywords and filename
//! - [`writer`]: exclusive-create file writing with one-generation backups
//! - [`pipeline`]: resolve → render → write for single profiles and batches
//! - [`config`]: the JSON config file
//! - [`logging`]: `tracing` subscriber setup for the binary
//! - [`error`]: error types and handling utilities
//!
//! ## Data Layout
//!
//! ```text
//! {data}/character/fizz.json        {profiles}/characters/fizz.pp3
//! {data}/performer/alex.json        {profiles}/characters/fizz.pp3~
//! {data}/maker/some_studio.json     {profiles}/events/ExpoCon/group.pp3
//! {data}/species/fox.json
//! {data}/event/ExpoCon.json
//! ```

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod sites;
pub mod source;
pub mod writer;
