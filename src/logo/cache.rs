use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::errors::PersistenceError;
use crate::models::{CacheEntry, CacheStatus, LogoReferences, SizeTier};

/// Persisted mapping from channel identifier to its logo state.
///
/// Entries are either positive (per-tier references, files on disk) or
/// negative (no logo available); both suppress re-fetching until the TTL
/// elapses. The table is checkpointed to disk after every record and after
/// the sweep, so a crash mid-run loses at most the in-flight entry.
pub struct LogoCache {
    cache_file: PathBuf,
    logo_dir: PathBuf,
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl LogoCache {
    /// Load the cache table from disk. An absent, unreadable, or malformed
    /// file is downgraded to an empty table; that is never fatal to the run.
    pub fn load(cache_file: PathBuf, logo_dir: PathBuf, ttl: Duration) -> Self {
        let entries = match Self::read_table(&cache_file) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Starting with an empty cache table: {}", e);
                HashMap::new()
            }
        };

        Self {
            cache_file,
            logo_dir,
            ttl,
            entries,
        }
    }

    fn read_table(path: &PathBuf) -> Result<HashMap<String, CacheEntry>, PersistenceError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(PersistenceError::Read {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|e| PersistenceError::Malformed {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Hashed, collision-resistant file name stem for an identifier.
    pub fn file_stem(identifier: &str) -> String {
        format!("{:x}", md5::compute(identifier.as_bytes()))
    }

    /// On-disk path of one tier's logo file for an identifier.
    pub fn logo_path(&self, tier: &str, identifier: &str) -> PathBuf {
        self.logo_dir
            .join(tier)
            .join(format!("{}.jpg", Self::file_stem(identifier)))
    }

    /// Create the per-tier logo directories.
    pub fn ensure_tier_dirs(&self, tiers: &[SizeTier]) -> std::io::Result<()> {
        for tier in tiers {
            std::fs::create_dir_all(self.logo_dir.join(&tier.name))?;
        }
        Ok(())
    }

    /// Look up an identifier against the TTL.
    ///
    /// A positive entry is reported `Fresh` only while every backing file
    /// still exists; an entry whose files were deleted out-of-band is demoted
    /// to `Stale` so the playlist never references dead paths. Positive hits
    /// refresh the entry timestamp (reuse counts as success); negative hits
    /// do not, so a missing logo is retried once the TTL elapses.
    pub fn lookup(
        &mut self,
        identifier: &str,
        now: DateTime<Utc>,
        tiers: &[SizeTier],
    ) -> CacheStatus {
        let status = {
            let Some(entry) = self.entries.get(identifier) else {
                return CacheStatus::Unknown;
            };

            if now - entry.last_success >= self.ttl {
                CacheStatus::Stale
            } else if let Some(references) = &entry.references {
                let missing = tiers
                    .iter()
                    .any(|tier| !self.logo_path(&tier.name, identifier).exists());
                if missing {
                    debug!(
                        "Cache entry for '{}' references missing files, treating as stale",
                        identifier
                    );
                    CacheStatus::Stale
                } else {
                    CacheStatus::Fresh(Some(references.clone()))
                }
            } else {
                CacheStatus::Fresh(None)
            }
        };

        if matches!(status, CacheStatus::Fresh(Some(_))) {
            if let Some(entry) = self.entries.get_mut(identifier) {
                entry.last_success = now;
            }
        }

        status
    }

    /// Insert or overwrite a positive entry and checkpoint the table.
    ///
    /// Callers must have written the backing files for every tier first.
    pub fn record_success(
        &mut self,
        identifier: &str,
        references: LogoReferences,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        self.entries.insert(
            identifier.to_string(),
            CacheEntry {
                last_success: now,
                references: Some(references),
            },
        );
        self.persist()
    }

    /// Insert or overwrite a negative entry and checkpoint the table, which
    /// suppresses repeat fetch attempts for the TTL window.
    pub fn record_failure(
        &mut self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        self.entries.insert(
            identifier.to_string(),
            CacheEntry {
                last_success: now,
                references: None,
            },
        );
        self.persist()
    }

    /// Delete every entry older than `retention` along with its backing
    /// files for all tiers. Missing files are not an error. Runs once per
    /// invocation, before any fetch activity. Returns the number of entries
    /// removed.
    pub fn sweep(&mut self, now: DateTime<Utc>, retention: Duration, tiers: &[SizeTier]) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| now - entry.last_success > retention)
            .map(|(identifier, _)| identifier.clone())
            .collect();

        for identifier in &expired {
            for tier in tiers {
                let path = self.logo_path(&tier.name, identifier);
                if let Err(e) = std::fs::remove_file(&path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to delete {}: {}", path.display(), e);
                    }
                }
            }
            self.entries.remove(identifier);
            debug!("Swept expired cache entry '{}'", identifier);
        }

        if !expired.is_empty() {
            info!("Swept {} expired logo cache entries", expired.len());
            if let Err(e) = self.persist() {
                warn!("Cache checkpoint after sweep failed: {}", e);
            }
        }

        expired.len()
    }

    /// Durably write the cache table.
    pub fn persist(&self) -> Result<(), PersistenceError> {
        let path = self.cache_file.display().to_string();
        if let Some(parent) = self.cache_file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PersistenceError::Write {
                path: path.clone(),
                source: e,
            })?;
        }
        let contents = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            PersistenceError::Malformed {
                path: path.clone(),
                source: e,
            }
        })?;
        std::fs::write(&self.cache_file, contents)
            .map_err(|e| PersistenceError::Write { path, source: e })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
