//! Utility functions for the playlist generator
//!
//! This module provides the shared string-normalization helpers:
//! - Channel identifier derivation (cache key and logo file name stem)
//! - URL host extraction for fallback category naming
//! - Raw list line splitting (`name,url` pairs vs bare URLs)

use url::Url;

/// Split a raw list line into an optional explicit label and the stream URL.
///
/// Lines are either a bare URL or a `name,url` pair; the split happens on the
/// first comma.
pub fn split_line(line: &str) -> (Option<&str>, &str) {
    match line.split_once(',') {
        Some((name, url)) if !url.trim().is_empty() => (Some(name.trim()), url.trim()),
        _ => (None, line.trim()),
    }
}

/// Derive the stable per-channel identifier used as the cache key and,
/// hashed, as the logo file name stem.
///
/// An explicit label wins; otherwise the URL host with its final extension
/// stripped (`examplenews.tv` -> `examplenews`). Unparseable URLs fall back
/// to the path basename without query string or extension. Identical input
/// always yields the identical identifier.
pub fn channel_identifier(name: Option<&str>, stream_url: &str) -> String {
    if let Some(label) = name.map(str::trim).filter(|s| !s.is_empty()) {
        return label.to_lowercase();
    }

    if let Some(host) = host_of(stream_url) {
        return strip_extension(&host).to_lowercase();
    }

    let no_query = stream_url.split('?').next().unwrap_or(stream_url);
    let basename = no_query.rsplit('/').next().unwrap_or(no_query);
    strip_extension(basename).to_lowercase()
}

/// Host name of a URL, if it parses.
pub fn host_of(stream_url: &str) -> Option<String> {
    Url::parse(stream_url.trim())
        .ok()?
        .host_str()
        .map(|h| h.to_string())
}

/// First host label of a URL (`examplenews.tv` -> `examplenews`), used for
/// fallback category naming.
pub fn host_label(stream_url: &str) -> Option<String> {
    let host = host_of(stream_url)?;
    host.split('.')
        .next()
        .filter(|label| !label.is_empty())
        .map(|label| label.to_lowercase())
}

fn strip_extension(s: &str) -> &str {
    match s.rfind('.') {
        Some(idx) if idx > 0 => &s[..idx],
        _ => s,
    }
}
