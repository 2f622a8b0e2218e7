use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Public logo URL per size tier, keyed by tier name.
pub type LogoReferences = BTreeMap<String, String>;

/// One configured output logo resolution with its encode quality.
///
/// Tiers are fixed at process start and shared read-only between the
/// fetch/resize/cache path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SizeTier {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

/// A fully resolved playlist entry.
#[derive(Debug, Clone)]
pub struct ChannelEntry {
    pub name: String,
    pub stream_url: String,
    pub category: String,
    /// `None` when no logo could be resolved; the entry is still written,
    /// just without a logo attribute.
    pub logos: Option<LogoReferences>,
}

/// Persisted cache record for one channel identifier.
///
/// `references` is `None` for negative entries: every candidate source was
/// exhausted and no fetch should be retried until the entry goes stale.
/// When `references` is present, the backing image files exist on disk for
/// every configured tier at paths derivable from the identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub last_success: DateTime<Utc>,
    pub references: Option<LogoReferences>,
}

/// Result of a logo cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// Entry exists and is younger than the TTL. `None` means "no logo
    /// available" was cached, so the fetcher must not be invoked.
    Fresh(Option<LogoReferences>),
    /// Entry exists but aged past the TTL; eligible for re-fetch.
    Stale,
    /// Identifier has never been resolved.
    Unknown,
}

/// Persisted scoring record for one category.
///
/// `score` is the cumulative reinforcement counter; it only ever increases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub keywords: BTreeMap<String, i64>,
    pub score: i64,
}

/// Counters collected over one generation run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub entries_written: usize,
    pub duplicates_skipped: usize,
    pub cache_hits: usize,
    pub negative_hits: usize,
    pub logos_fetched: usize,
    pub logos_missing: usize,
    pub entries_swept: usize,
}
