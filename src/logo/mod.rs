//! Logo acquisition, resizing, and on-disk caching
//!
//! The fetch path is strictly sequential: one identifier resolves at a time,
//! and a resolution either ends in `record_success` with files on disk for
//! every tier, or `record_failure` as a cached negative.

pub mod cache;
pub mod encoder;
pub mod fetcher;

pub use cache::LogoCache;
pub use encoder::encode_tiers;
pub use fetcher::LogoFetcher;
