//! Error handling for the cache engine
//!
//! Every failure carries a [`RecoveryHint`] so callers can decide between
//! retrying, treating the entry as missing, or surfacing the problem.

mod conversions;
mod display;
mod recovery;
mod types;

pub use types::*;
