//! Self-reinforcing keyword classifier for channel categories
//!
//! Each category carries a keyword-to-weight table and a cumulative score
//! that grows every time the category is chosen, so frequently used
//! categories win future close calls. The table is stored as an ordered
//! vector: ties between equal-scoring categories resolve to the first-seen
//! (insertion order) category, which keeps classification deterministic for
//! an unchanged table.

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::errors::PersistenceError;
use crate::models::Category;
use crate::utils;

/// Weight granted to the seed keyword of a fallback-created category.
const SEED_KEYWORD_WEIGHT: i64 = 2;
/// Multiplier for keywords matching the source file name.
const FILE_NAME_WEIGHT: i64 = 2;

/// Persisted, ordered category score table.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    table_file: PathBuf,
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Load the category table from disk. An absent, unreadable, or
    /// malformed file is downgraded to an empty table.
    pub fn load(table_file: PathBuf) -> Self {
        let categories = match Self::read_table(&table_file) {
            Ok(categories) => categories,
            Err(e) => {
                warn!("Starting with an empty category table: {}", e);
                Vec::new()
            }
        };

        Self {
            table_file,
            categories,
        }
    }

    fn read_table(path: &PathBuf) -> Result<Vec<Category>, PersistenceError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
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

    /// Classify one raw line against the table, reinforcing the winner.
    ///
    /// Per category the score is the sum of keyword weights contained in the
    /// lowercased line, twice the weights contained in the lowercased source
    /// file name, and the category's cumulative score. Non-positive totals
    /// are excluded. When nothing scores positively, a fallback category
    /// named after the line URL's first host label is created (or reused)
    /// with a single seed keyword. The returned category's cumulative score
    /// is incremented by one.
    pub fn classify(&mut self, file_name: &str, line: &str) -> String {
        let line_lc = line.to_lowercase();
        let file_lc = file_name.to_lowercase();

        let mut best: Option<(usize, i64)> = None;
        for (idx, category) in self.categories.iter().enumerate() {
            let mut total = category.score;
            for (keyword, weight) in &category.keywords {
                if line_lc.contains(keyword.as_str()) {
                    total += weight;
                }
                if file_lc.contains(keyword.as_str()) {
                    total += FILE_NAME_WEIGHT * weight;
                }
            }

            // Strict comparison keeps the first-seen category on ties.
            if total > 0 && best.map_or(true, |(_, score)| total > score) {
                best = Some((idx, total));
            }
        }

        let idx = match best {
            Some((idx, total)) => {
                debug!(
                    "Line matched category '{}' with score {}",
                    self.categories[idx].name, total
                );
                idx
            }
            None => self.fallback_category(line),
        };

        self.categories[idx].score += 1;
        self.categories[idx].name.clone()
    }

    /// Resolve the no-match path: a category named after the line URL's
    /// first host label, created on demand with one seed keyword.
    fn fallback_category(&mut self, line: &str) -> usize {
        let (_, stream_url) = utils::split_line(line);
        let label = utils::host_label(stream_url).unwrap_or_else(|| "unknown".to_string());

        if let Some(idx) = self.categories.iter().position(|c| c.name == label) {
            return idx;
        }

        debug!("Creating fallback category '{}'", label);
        let mut keywords = BTreeMap::new();
        keywords.insert(label.clone(), SEED_KEYWORD_WEIGHT);
        self.categories.push(Category {
            name: label,
            keywords,
            score: 0,
        });
        self.categories.len() - 1
    }

    /// Append a category if no category with that name exists yet.
    pub fn insert(&mut self, category: Category) {
        if !self.categories.iter().any(|c| c.name == category.name) {
            self.categories.push(category);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Durably write the category table.
    pub fn persist(&self) -> Result<(), PersistenceError> {
        let path = self.table_file.display().to_string();
        if let Some(parent) = self.table_file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PersistenceError::Write {
                path: path.clone(),
                source: e,
            })?;
        }
        let contents = serde_json::to_string_pretty(&self.categories).map_err(|e| {
            PersistenceError::Malformed {
                path: path.clone(),
                source: e,
            }
        })?;
        std::fs::write(&self.table_file, contents)
            .map_err(|e| PersistenceError::Write { path, source: e })
    }
}
