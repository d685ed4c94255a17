//! Account system boundary.
//!
//! A [`DirectorySource`] answers the two list calls a sync run needs. The
//! results are frozen into a [`DirectorySnapshot`] that every compiler reads
//! from; nothing is fetched after the snapshot exists.

pub mod client;
pub mod errors;
pub mod types;

pub use client::{DirectorySource, HttpDirectoryClient, fetch_snapshot};
pub use errors::DirectoryError;
pub use types::*;
