//! Pipeline orchestrator - series and chapter processing
//!
//! This module drives every input through the same flow:
//! - Resolving the input to a series or a chapter
//! - Filtering out chapters the cache already lists
//! - Running the per-chapter state machine (download, archive, record, clean up)
//! - Optional series and volume covers, which never fail a run

use crate::archive::{
    archive_path, build_archive, chapter_directory, volume_cover_path, ComicInfo, StagingDir,
};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::covers::{download_series_cover, extract_volume_cover, VolumeCoverPlan};
use crate::download::PageDownloader;
use crate::metadata::{Catalog, ChapterInfo, SeriesInfo};
use crate::pipeline::report::{ChapterOutcome, RunReport};
use crate::resolver::{resolve, Resource, ResourceKind};
use crate::state::ChapterState;
use crate::ArchiverError;
use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Sequential chapter acquisition pipeline
pub struct Pipeline {
    config: Arc<Config>,
    catalog: Catalog,
    cache: CacheStore,
    downloader: PageDownloader,
}

impl Pipeline {
    /// Creates a pipeline instance
    ///
    /// Builds the HTTP client and, unless override mode is on, makes sure the cache document
    /// exists.
    ///
    /// # Returns
    ///
    /// * `Ok(Pipeline)` - Ready to process inputs
    /// * `Err(ArchiverError)` - The HTTP client or the cache file could not be initialized
    pub fn new(config: Config) -> Result<Self, ArchiverError> {
        let catalog = Catalog::from_config(&config.gateway)?;
        let downloader = PageDownloader::new(
            catalog.gateway().clone(),
            Duration::from_millis(config.download.retry_delay_ms),
        );
        let cache = CacheStore::new(&config.output.cache_path);

        if !config.features.override_cache {
            cache.ensure_exists()?;
        }

        Ok(Self {
            config: Arc::new(config),
            catalog,
            cache,
            downloader,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Processes every input in order, stopping at the first failure
    pub async fn run(&self, inputs: &[String]) -> Result<RunReport, ArchiverError> {
        let mut report = RunReport::new();

        for input in inputs {
            self.handle_input(input, &mut report).await?;
        }

        Ok(report)
    }

    /// Resolves one input and processes the series or chapter it names
    pub async fn handle_input(
        &self,
        input: &str,
        report: &mut RunReport,
    ) -> Result<(), ArchiverError> {
        let resource = resolve(input)?;
        tracing::info!("Resolved {} to {} {}", input, resource.kind, resource.id);

        match resource.kind {
            ResourceKind::Series => self.handle_series(&resource.id, report).await,
            ResourceKind::Chapter => self.handle_chapter(&resource.id, report).await,
        }
    }

    /// Downloads every chapter of a series that is not cached yet
    ///
    /// Aborts on the first chapter that fails; chapters archived before it stay archived and
    /// cached.
    pub async fn handle_series(
        &self,
        series_id: &str,
        report: &mut RunReport,
    ) -> Result<(), ArchiverError> {
        let series = self.catalog.fetch_series(series_id).await?;
        tracing::info!("Processing series \"{}\" ({})", series.title, series.id);

        if self.config.features.download_cover {
            self.fetch_series_cover(&series, report).await;
        }

        let excluded = self.excluded_chapters()?;
        let listing = self.catalog.list_chapters(&series.id, &excluded).await?;
        report.record_skipped(listing.excluded);

        tracing::info!(
            "{} chapter(s) to download, {} already archived",
            listing.chapters.len(),
            listing.excluded
        );

        let chapters = listing.chapters;
        let plan = self.cover_plan(&chapters);
        for chapter in &chapters {
            let outcome = self
                .process_chapter(&series, chapter, plan.as_ref())
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Chapter {} of \"{}\" failed: {}",
                        chapter.number_label(),
                        series.title,
                        e
                    );
                    e
                })?;
            report.record(outcome);
        }

        Ok(())
    }

    /// Downloads a single chapter unless the cache already lists it
    pub async fn handle_chapter(
        &self,
        chapter_id: &str,
        report: &mut RunReport,
    ) -> Result<(), ArchiverError> {
        if self.excluded_chapters()?.contains(chapter_id) {
            tracing::info!("Chapter {} is already archived, skipping", chapter_id);
            report.record_skipped(1);
            return Ok(());
        }

        let chapter = self.catalog.fetch_chapter(chapter_id).await?;
        let series = self.catalog.fetch_series(&chapter.series_id).await?;
        let plan = self.cover_plan(std::slice::from_ref(&chapter));

        let outcome = self
            .process_chapter(&series, &chapter, plan.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Chapter {} failed: {}", chapter.id, e);
                e
            })?;
        report.record(outcome);

        Ok(())
    }

    /// Lists the chapters a run over `resource` would download, without downloading anything
    pub async fn pending_chapters(
        &self,
        resource: &Resource,
    ) -> Result<Vec<ChapterInfo>, ArchiverError> {
        let excluded = self.excluded_chapters()?;

        match resource.kind {
            ResourceKind::Series => {
                let ids = self
                    .catalog
                    .list_chapter_ids(&resource.id, &excluded)
                    .await?;
                self.catalog.resolve_chapters(&ids).await
            }
            ResourceKind::Chapter if excluded.contains(&resource.id) => Ok(Vec::new()),
            ResourceKind::Chapter => Ok(vec![self.catalog.fetch_chapter(&resource.id).await?]),
        }
    }

    /// Runs the state machine for one chapter
    ///
    /// `Pending -> Downloading -> Staged -> Archived -> [Cached] -> Cleaned`, or `Failed` from
    /// `Downloading`/`Staged`. The staging directory never outlives this call.
    pub async fn process_chapter(
        &self,
        series: &SeriesInfo,
        chapter: &ChapterInfo,
        plan: Option<&VolumeCoverPlan>,
    ) -> Result<ChapterOutcome, ArchiverError> {
        let label = format!("{} - Chapter {}", series.title, chapter.number_label());
        let mut state = ChapterState::Pending;

        let pages = self.catalog.fetch_page_urls(&chapter.id).await?;
        if pages.is_empty() {
            tracing::warn!("\"{}\" has no pages, skipping", label);
            return Ok(ChapterOutcome::Empty);
        }

        let chapter_dir = chapter_directory(&self.config.output.directory, &series.title, chapter);
        let archive = archive_path(&chapter_dir, &self.config.output.archive_extension);

        state = advance(chapter, state, ChapterState::Downloading)?;
        let staging = StagingDir::create(&chapter_dir)?;

        if let Err(e) = self
            .downloader
            .download_chapter(&pages, staging.path(), &label)
            .await
        {
            advance(chapter, state, ChapterState::Failed)?;
            purge(staging);
            return Err(e);
        }
        state = advance(chapter, state, ChapterState::Staged)?;

        let descriptor = ComicInfo::new(series, chapter, pages.len());
        let staging_path = staging.path().to_path_buf();
        let target = archive.clone();
        let built = tokio::task::spawn_blocking(move || {
            build_archive(&staging_path, &target, &descriptor)
        })
        .await
        .map_err(|e| ArchiverError::Io(io::Error::other(e)))
        .and_then(|result| result);

        if let Err(e) = built {
            advance(chapter, state, ChapterState::Failed)?;
            purge(staging);
            return Err(e);
        }
        state = advance(chapter, state, ChapterState::Archived)?;

        if !self.config.features.override_cache {
            self.cache.record(&series.id, &chapter.id)?;
            state = advance(chapter, state, ChapterState::Cached)?;
        }

        let volume_cover = plan
            .and_then(|plan| plan.designated(chapter))
            .and_then(|volume| {
                let cover = volume_cover_path(&chapter_dir);
                match extract_volume_cover(staging.path(), &cover) {
                    Ok(true) => {
                        tracing::info!("Saved volume {} cover to {}", volume, cover.display());
                        Some(cover)
                    }
                    Ok(false) => {
                        tracing::warn!("No first page found for volume {} cover", volume);
                        None
                    }
                    Err(e) => {
                        tracing::warn!("Failed to save volume {} cover: {}", volume, e);
                        None
                    }
                }
            });

        if let Err(e) = staging.remove() {
            tracing::warn!(
                "Failed to remove staging directory {}: {}",
                chapter_dir.display(),
                e
            );
        }
        advance(chapter, state, ChapterState::Cleaned)?;

        tracing::info!("Archived \"{}\" to {}", label, archive.display());
        Ok(ChapterOutcome::Archived {
            archive,
            volume_cover,
        })
    }

    /// Chapter ids to leave alone; always empty in override mode
    fn excluded_chapters(&self) -> Result<HashSet<String>, ArchiverError> {
        if self.config.features.override_cache {
            return Ok(HashSet::new());
        }
        Ok(self.cache.load()?.all_chapter_ids())
    }

    fn cover_plan(&self, chapters: &[ChapterInfo]) -> Option<VolumeCoverPlan> {
        if !self.config.features.chapter_cover {
            return None;
        }

        let plan = VolumeCoverPlan::from_chapters(chapters);
        tracing::debug!("Planned covers for {} volume(s)", plan.volumes());
        Some(plan)
    }

    async fn fetch_series_cover(&self, series: &SeriesInfo, report: &mut RunReport) {
        match download_series_cover(
            self.catalog.gateway(),
            series,
            &self.config.output.directory,
        )
        .await
        {
            Ok(Some(path)) => report.record_series_cover(path),
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not download cover of \"{}\": {}", series.title, e),
        }
    }
}

/// Validates and logs a chapter state transition
fn advance(
    chapter: &ChapterInfo,
    from: ChapterState,
    to: ChapterState,
) -> Result<ChapterState, ArchiverError> {
    let next = from.transition(to)?;
    if next.is_terminal() {
        tracing::debug!("Chapter {}: {} -> {} (done)", chapter.id, from, next);
    } else {
        tracing::debug!("Chapter {}: {} -> {}", chapter.id, from, next);
    }
    Ok(next)
}

fn purge(staging: StagingDir) {
    let path = staging.path().to_path_buf();
    if let Err(e) = staging.remove() {
        tracing::warn!(
            "Failed to purge staging directory {}: {}",
            path.display(),
            e
        );
    }
}
