//! Centralized error handling for the playlist generator
//!
//! Errors are split by recovery strategy: fetch and decode failures are
//! absorbed by the candidate loop, encode failures downgrade a single channel
//! to no-logo semantics, and persistence failures on write are reported as
//! warnings without aborting the run.

pub mod types;

pub use types::*;
