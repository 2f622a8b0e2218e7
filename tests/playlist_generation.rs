//! Integration tests for the full generation pass.
//!
//! The logo cache is pre-populated before each run so the fetcher is never
//! invoked and no network activity happens.

use chrono::Utc;
use std::collections::BTreeMap;
use tempfile::TempDir;

use m3u_gen::classifier::CategoryTable;
use m3u_gen::config::{Config, LogoConfig, StorageConfig};
use m3u_gen::logo::LogoCache;
use m3u_gen::models::{Category, LogoReferences, SizeTier};
use m3u_gen::services::PlaylistService;

const STREAM_URL: &str = "http://examplenews.tv/live/ch1.m3u8";
const IDENTIFIER: &str = "examplenews";

fn size_tiers() -> Vec<SizeTier> {
    ["small", "medium", "large"]
        .iter()
        .zip([64u32, 128, 256])
        .map(|(name, dim)| SizeTier {
            name: name.to_string(),
            width: dim,
            height: dim,
            quality: 80,
        })
        .collect()
}

fn test_config(dir: &TempDir) -> Config {
    Config {
        storage: StorageConfig {
            raw_lists_path: dir.path().join("raw_lists"),
            logo_path: dir.path().join("logos"),
            playlist_path: dir.path().join("playlist.m3u"),
            cache_file: dir.path().join("logo-cache.json"),
            categories_file: dir.path().join("categories.json"),
        },
        logos: LogoConfig {
            public_base_url: "http://localhost:8080/logos".to_string(),
            fetch_timeout_seconds: 1,
            cache_ttl_days: 7,
            retention_days: 30,
            tiers: size_tiers(),
        },
    }
}

/// Seed a positive cache entry with backing files for every tier and return
/// the references it carries.
fn seed_cached_logo(config: &Config) -> LogoReferences {
    let mut cache = LogoCache::load(
        config.storage.cache_file.clone(),
        config.storage.logo_path.clone(),
        config.cache_ttl(),
    );

    let mut references = LogoReferences::new();
    for tier in size_tiers() {
        let path = cache.logo_path(&tier.name, IDENTIFIER);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"jpeg bytes").unwrap();
        references.insert(
            tier.name.clone(),
            format!(
                "http://localhost:8080/logos/{}/{}.jpg",
                tier.name,
                LogoCache::file_stem(IDENTIFIER)
            ),
        );
    }
    cache
        .record_success(IDENTIFIER, references.clone(), Utc::now())
        .unwrap();
    references
}

#[tokio::test]
async fn test_duplicate_streams_are_dropped_before_cache_and_classifier() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let references = seed_cached_logo(&config);

    let mut keywords = BTreeMap::new();
    keywords.insert("news".to_string(), 5);
    let mut table = CategoryTable::load(config.storage.categories_file.clone());
    table.insert(Category {
        name: "news".to_string(),
        keywords,
        score: 0,
    });
    table.persist().unwrap();

    // The same stream appears in two different category files.
    std::fs::create_dir_all(&config.storage.raw_lists_path).unwrap();
    std::fs::write(
        config.storage.raw_lists_path.join("news.txt"),
        format!("{STREAM_URL}\n"),
    )
    .unwrap();
    std::fs::write(
        config.storage.raw_lists_path.join("sports.txt"),
        format!("{STREAM_URL}\n"),
    )
    .unwrap();

    let mut service = PlaylistService::new(config.clone()).unwrap();
    let summary = service.run().await.unwrap();

    assert_eq!(summary.entries_written, 1);
    assert_eq!(summary.duplicates_skipped, 1);
    // One cache hit, not two: the duplicate never reached the cache.
    assert_eq!(summary.cache_hits, 1);
    assert_eq!(summary.logos_fetched, 0);
    assert_eq!(summary.logos_missing, 0);

    let content = std::fs::read_to_string(&config.storage.playlist_path).unwrap();
    assert!(content.starts_with("#EXTM3U\n"));
    assert!(content.contains("group-title=\"news\""));
    assert!(content.contains(&format!("tvg-logo=\"{}\"", references["medium"])));
    assert!(content.contains(STREAM_URL));

    // The classifier ran exactly once for the deduplicated stream.
    let reloaded = CategoryTable::load(config.storage.categories_file.clone());
    assert_eq!(reloaded.get("news").unwrap().score, 1);
}

#[tokio::test]
async fn test_fallback_category_with_cached_negative_entry() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    // A cached "no logo available" entry suppresses any fetch attempt.
    let mut cache = LogoCache::load(
        config.storage.cache_file.clone(),
        config.storage.logo_path.clone(),
        config.cache_ttl(),
    );
    cache.record_failure(IDENTIFIER, Utc::now()).unwrap();

    std::fs::create_dir_all(&config.storage.raw_lists_path).unwrap();
    std::fs::write(
        config.storage.raw_lists_path.join("news.txt"),
        format!("{STREAM_URL}\n"),
    )
    .unwrap();

    let mut service = PlaylistService::new(config.clone()).unwrap();
    let summary = service.run().await.unwrap();

    assert_eq!(summary.entries_written, 1);
    assert_eq!(summary.negative_hits, 1);
    assert_eq!(summary.logos_fetched, 0);

    // No category table was seeded, so the host-derived fallback wins.
    let content = std::fs::read_to_string(&config.storage.playlist_path).unwrap();
    assert!(content.contains("group-title=\"examplenews\""));
    assert!(!content.contains("tvg-logo"));
    assert!(!content.contains("#EXTGRP"));

    let table = CategoryTable::load(config.storage.categories_file.clone());
    let created = table.get("examplenews").unwrap();
    assert_eq!(created.keywords.get("examplenews"), Some(&2));
    assert_eq!(created.score, 1);
}
