//! Profile production against a shared data source.

use super::request::ProfileRequest;
use super::script::ScriptEntry;
use crate::error::Result;
use crate::render::{Profile, ProfileOptions, render_profile};
use crate::resolver::Resolver;
use crate::source::DataSource;
use crate::writer::write_profile;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a batch write, one result per request in request order.
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<Result<PathBuf>>,

    /// Time taken for the whole batch
    pub duration: Duration,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.written()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Create a summary message
    pub fn summary(&self) -> String {
        format!(
            "Batch completed: {} written, {} failed, {:.2}s",
            self.written(),
            self.failed(),
            self.duration.as_secs_f64()
        )
    }
}

/// Turns profile requests into sidecar files.
#[derive(Clone)]
pub struct Profiler {
    source: Arc<dyn DataSource>,
    profile_root: PathBuf,
    overwrite: bool,
    artist: Option<String>,
    copyright: Option<String>,
}

impl std::fmt::Debug for Profiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profiler")
            .field("profile_root", &self.profile_root)
            .field("overwrite", &self.overwrite)
            .field("artist", &self.artist)
            .field("copyright", &self.copyright)
            .finish_non_exhaustive()
    }
}

impl Profiler {
    /// A profiler writing under `profile_root`, backing up existing files.
    pub fn new(source: Arc<dyn DataSource>, profile_root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            profile_root: profile_root.into(),
            overwrite: true,
            artist: None,
            copyright: None,
        }
    }

    /// When false, an existing sidecar makes the write fail instead.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_artist(mut self, artist: Option<String>) -> Self {
        self.artist = artist;
        self
    }

    pub fn with_copyright(mut self, copyright: Option<String>) -> Self {
        self.copyright = copyright;
        self
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.source.as_ref())
    }

    /// Resolve everything `request` refers to.
    ///
    /// # Errors
    ///
    /// Returns an error if the data source fails.
    pub async fn options(&self, request: &ProfileRequest) -> Result<ProfileOptions> {
        let resolver = self.resolver();
        let event = async {
            match &request.event {
                Some(event) => resolver.resolve_event(event).await.map(Some),
                None => Ok(None),
            }
        };
        let (characters, event) =
            futures::try_join!(resolver.resolve_characters(&request.characters), event)?;

        Ok(ProfileOptions {
            artist: self.artist.clone(),
            copyright: self.copyright.clone(),
            characters,
            event,
            label: request.label.clone(),
            tags: request.tags.clone(),
            title: request.title.clone(),
        })
    }

    /// Resolve and render without writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the data source fails or a handle is malformed.
    pub async fn render(&self, request: &ProfileRequest) -> Result<Profile> {
        render_profile(&self.options(request).await?)
    }

    /// Resolve, render and write one profile.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the file cannot be written.
    pub async fn write(&self, request: &ProfileRequest) -> Result<PathBuf> {
        let profile = self.render(request).await?;
        write_profile(
            &self.profile_root,
            &profile.filename,
            request.event_name(),
            &profile.text,
            self.overwrite,
        )
        .await
    }

    /// Write every request concurrently.
    pub async fn write_many(&self, requests: &[ProfileRequest]) -> BatchReport {
        let start = Instant::now();
        let results = join_all(requests.iter().map(|request| self.write(request))).await;

        for (index, result) in results.iter().enumerate() {
            if let Err(e) = result {
                tracing::error!("Profile {} failed: {e}", index + 1);
            }
        }
        let report = BatchReport {
            results,
            duration: start.elapsed(),
        };
        tracing::info!("{}", report.summary());
        report
    }

    /// Write every entry of a profile script, each based on `base`.
    pub async fn write_script(&self, script: &[ScriptEntry], base: &ProfileRequest) -> BatchReport {
        let requests: Vec<ProfileRequest> = script
            .iter()
            .map(|entry| ProfileRequest {
                characters: entry.characters.clone(),
                label: Some(entry.label.clone()),
                ..base.clone()
            })
            .collect();
        self.write_many(&requests).await
    }
}
