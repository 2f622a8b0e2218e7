//! Raw link list ingestion
//!
//! Reads every `*.txt` file under the raw lists directory. Each non-empty,
//! non-comment line is one candidate channel: either a bare stream URL or a
//! `name,url` pair. The file name doubles as the category hint consumed by
//! the classifier.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::utils;

/// One candidate line from a raw list file.
#[derive(Debug, Clone)]
pub struct RawEntry {
    /// Source file name, e.g. `news.txt` (classifier hint).
    pub file_name: String,
    /// The trimmed raw line as read from the file.
    pub line: String,
    /// Explicit channel label, when the line is a `name,url` pair.
    pub name: Option<String>,
    pub stream_url: String,
}

pub struct RawListIngestor {
    raw_lists_dir: PathBuf,
}

impl RawListIngestor {
    pub fn new(raw_lists_dir: PathBuf) -> Self {
        Self { raw_lists_dir }
    }

    /// Read all list files and return their entries in file name, then line,
    /// order. Files are sorted so repeated runs over the same input produce
    /// the same sequence regardless of directory iteration order.
    pub fn ingest(&self) -> Result<Vec<RawEntry>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.raw_lists_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "txt"))
            .collect();
        files.sort();

        let mut entries = Vec::new();
        for path in files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let contents = match std::fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    warn!("Skipping unreadable list file {}: {}", path.display(), e);
                    continue;
                }
            };

            let mut count = 0;
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let (name, stream_url) = utils::split_line(line);
                entries.push(RawEntry {
                    file_name: file_name.clone(),
                    line: line.to_string(),
                    name: name.map(|n| n.to_string()),
                    stream_url: stream_url.to_string(),
                });
                count += 1;
            }
            debug!("Read {} entries from {}", count, path.display());
        }

        info!(
            "Ingested {} candidate lines from {}",
            entries.len(),
            self.raw_lists_dir.display()
        );
        Ok(entries)
    }
}
