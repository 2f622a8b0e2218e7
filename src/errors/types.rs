//! Error type definitions for the playlist generator
//!
//! This module defines the error types used throughout the application,
//! split by recovery strategy so call sites can tell local failures apart
//! from ones worth surfacing.

use thiserror::Error;

/// Failures while resolving a channel logo from its candidate sources
///
/// `Transport` and `Decode` are per-candidate failures consumed by the
/// candidate loop; only `NotFound` escapes it, and that result is cacheable
/// as a negative entry.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network failure, non-200 status, or timeout for one candidate
    #[error("Transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    /// Candidate responded but the body is not a decodable image
    #[error("Undecodable payload from {url}: {message}")]
    Decode { url: String, message: String },

    /// Every candidate source failed
    #[error("No candidate source produced a logo for '{identifier}'")]
    NotFound { identifier: String },
}

/// Failures while producing the per-tier encoded logo set
///
/// Fatal for that single identifier's logo production; the identifier
/// proceeds with no-logo semantics and playlist generation continues.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Source bitmap has a zero dimension
    #[error("Bitmap is degenerate ({width}x{height})")]
    EmptyBitmap { width: u32, height: u32 },

    /// A configured size tier has a zero dimension
    #[error("Size tier '{tier}' has non-positive dimensions {width}x{height}")]
    InvalidTier {
        tier: String,
        width: u32,
        height: u32,
    },

    /// Encoder-level failure from the image library
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Failures while reading or writing the persisted cache/category tables
///
/// Read failures downgrade to an empty table; write failures are surfaced as
/// warnings and cost that checkpoint's durability, never the run.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Table file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Table file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Table file content did not parse or serialize
    #[error("Malformed table in {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
