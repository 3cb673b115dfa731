//! Cache operations

mod clear;
mod delete;
mod get;
mod set;

pub use get::GetMultiple;
