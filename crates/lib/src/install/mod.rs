//! Getting compiled artifacts onto the system.
//!
//! Artifacts are written into a per-run [`ScratchDir`], encoded by a
//! [`DbEncoder`], and finally moved into place by [`install_file`], which
//! replaces the live file with a rename so readers never see a partial
//! database.

pub mod encoder;
pub mod errors;
pub mod installer;
pub mod scratch;

pub use encoder::{DbEncoder, Makedb};
pub use errors::InstallError;
pub use installer::{Artifact, InstallReport, install_all, install_bytes, install_file};
pub use scratch::ScratchDir;

/// Mode of world-readable artifacts.
pub const PUBLIC_MODE: u32 = 0o644;

/// Mode of credential artifacts.
pub const PRIVATE_MODE: u32 = 0o400;
