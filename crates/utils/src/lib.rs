//! Shared utilities for fscache
//!
//! Small, mostly pure helpers used by the cache engine and its tooling:
//! storage root resolution, modification time handling and log setup.

pub mod file_times;
pub mod logging;
pub mod paths;

pub use file_times::*;
pub use paths::*;
