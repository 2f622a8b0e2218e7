//! End-to-end playlist generation
//!
//! One sequential pass: sweep the logo cache, read the raw lists, classify
//! and resolve logos line by line, then write the playlist. The cache and
//! category tables are explicit store objects owned here and passed through
//! the call chain; there is exactly one writer and no ambient global state.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::classifier::CategoryTable;
use crate::config::Config;
use crate::ingestor::RawListIngestor;
use crate::logo::{encode_tiers, LogoCache, LogoFetcher};
use crate::models::{CacheStatus, ChannelEntry, LogoReferences, RunSummary, SizeTier};
use crate::playlist::PlaylistGenerator;
use crate::utils;

pub struct PlaylistService {
    config: Config,
    fetcher: LogoFetcher,
    cache: LogoCache,
    categories: CategoryTable,
}

impl PlaylistService {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = LogoFetcher::new(Duration::from_secs(config.logos.fetch_timeout_seconds))?;
        let cache = LogoCache::load(
            config.storage.cache_file.clone(),
            config.storage.logo_path.clone(),
            config.cache_ttl(),
        );
        let categories = CategoryTable::load(config.storage.categories_file.clone());

        Ok(Self {
            config,
            fetcher,
            cache,
            categories,
        })
    }

    /// Run one full generation pass and return the collected counters.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let now = Utc::now();
        let tiers = self.config.logos.tiers.clone();
        let mut summary = RunSummary::default();

        self.cache.ensure_tier_dirs(&tiers)?;

        // Expired entries and their files go before any fetch activity.
        summary.entries_swept = self.cache.sweep(now, self.config.retention(), &tiers);

        let ingestor = RawListIngestor::new(self.config.storage.raw_lists_path.clone());
        let raw_entries = ingestor.ingest()?;

        let mut seen_urls = HashSet::new();
        let mut entries = Vec::new();
        for raw in raw_entries {
            // Duplicate streams are dropped before the classifier or cache
            // is consulted.
            if !seen_urls.insert(raw.stream_url.clone()) {
                debug!("Dropping duplicate stream {}", raw.stream_url);
                summary.duplicates_skipped += 1;
                continue;
            }

            let category = self.categories.classify(&raw.file_name, &raw.line);
            let identifier = utils::channel_identifier(raw.name.as_deref(), &raw.stream_url);
            let logos = self
                .resolve_logos(&identifier, now, &tiers, &mut summary)
                .await;

            entries.push(ChannelEntry {
                name: raw.name.unwrap_or_else(|| identifier.clone()),
                stream_url: raw.stream_url,
                category,
                logos,
            });
        }

        let generator = PlaylistGenerator::new(self.config.playlist_tier().name.clone());
        let content = generator.generate_m3u_content(&entries);
        generator.save_playlist_file(&self.config.storage.playlist_path, &content)?;
        summary.entries_written = entries.len();

        // Final checkpoint: covers timestamps refreshed by cache hits and
        // classifier reinforcement. Write failures cost durability of this
        // checkpoint only, never the run.
        if let Err(e) = self.cache.persist() {
            warn!("Cache table checkpoint failed: {}", e);
        }
        if let Err(e) = self.categories.persist() {
            warn!("Category table checkpoint failed: {}", e);
        }

        info!(
            "Playlist written to {}: {} entries, {} duplicates dropped, \
             {} cache hits, {} negative hits, {} fetched, {} without logo, {} swept",
            self.config.storage.playlist_path.display(),
            summary.entries_written,
            summary.duplicates_skipped,
            summary.cache_hits,
            summary.negative_hits,
            summary.logos_fetched,
            summary.logos_missing,
            summary.entries_swept,
        );

        Ok(summary)
    }

    /// Cache-first logo resolution for one identifier.
    async fn resolve_logos(
        &mut self,
        identifier: &str,
        now: DateTime<Utc>,
        tiers: &[SizeTier],
        summary: &mut RunSummary,
    ) -> Option<LogoReferences> {
        match self.cache.lookup(identifier, now, tiers) {
            CacheStatus::Fresh(Some(references)) => {
                summary.cache_hits += 1;
                Some(references)
            }
            CacheStatus::Fresh(None) => {
                summary.negative_hits += 1;
                None
            }
            CacheStatus::Stale | CacheStatus::Unknown => {
                self.fetch_and_store(identifier, now, tiers, summary).await
            }
        }
    }

    /// Fetch, resize, write to disk, and record the outcome. Any failure
    /// along the way downgrades the identifier to no-logo semantics with a
    /// cached negative entry.
    async fn fetch_and_store(
        &mut self,
        identifier: &str,
        now: DateTime<Utc>,
        tiers: &[SizeTier],
        summary: &mut RunSummary,
    ) -> Option<LogoReferences> {
        let bitmap = match self.fetcher.fetch(identifier).await {
            Ok(bitmap) => bitmap,
            Err(e) => {
                debug!("No logo for '{}': {}", identifier, e);
                return self.store_failure(identifier, now, summary);
            }
        };

        let encoded = match encode_tiers(&bitmap, tiers) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode logo for '{}': {}", identifier, e);
                return self.store_failure(identifier, now, summary);
            }
        };

        let mut references = LogoReferences::new();
        for (tier_name, bytes) in &encoded {
            let path = self.cache.logo_path(tier_name, identifier);
            if let Err(e) = std::fs::write(&path, bytes) {
                warn!("Failed to write {}: {}", path.display(), e);
                return self.store_failure(identifier, now, summary);
            }
            references.insert(tier_name.clone(), self.public_logo_url(tier_name, identifier));
        }

        summary.logos_fetched += 1;
        if let Err(e) = self
            .cache
            .record_success(identifier, references.clone(), now)
        {
            warn!("Cache table checkpoint failed: {}", e);
        }
        Some(references)
    }

    fn store_failure(
        &mut self,
        identifier: &str,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) -> Option<LogoReferences> {
        summary.logos_missing += 1;
        if let Err(e) = self.cache.record_failure(identifier, now) {
            warn!("Cache table checkpoint failed: {}", e);
        }
        None
    }

    fn public_logo_url(&self, tier: &str, identifier: &str) -> String {
        format!(
            "{}/{}/{}.jpg",
            self.config.logos.public_base_url.trim_end_matches('/'),
            tier,
            LogoCache::file_stem(identifier)
        )
    }
}
