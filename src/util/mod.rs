//! Utility types and functions for material syncing.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`normalize`] - Material name normalization for library lookups

mod error;
mod name;

pub use error::*;
pub use name::*;
