//! File-backed cache engine
//!
//! [`FileCache`] maps every key to its own file under a two-level shard tree
//! and guards each file with an advisory lock for the duration of a single
//! operation. Expired entries are removed by the read that discovers them.

mod builder;
mod operations;
mod trait_impl;
mod types;

pub use builder::FileCacheBuilder;
pub use operations::GetMultiple;
pub use types::FileCache;
