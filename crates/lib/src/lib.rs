//!
//! fas-client: sync a remote account directory onto a local machine.
//!
//! The library fetches people, groups and group memberships from an account
//! system, compiles them into the keyed text records consumed by `makedb`,
//! and installs the resulting lookup databases atomically.
//!
//! ## Core Concepts
//!
//! * **Snapshot (`directory::DirectorySnapshot`)**: The immutable set of people, groups and
//!   memberships fetched once per run by a `directory::DirectorySource`.
//! * **Membership index (`index::MembershipIndex`)**: Answers which people are authorized on
//!   this host and who the members, sponsors and administrators of each group are.
//! * **Record compiler (`record::RecordCompiler`)**: Emits the passwd, shadow and group record
//!   sets, every entity keyed by id, sequential index and name.
//! * **Alias compiler (`alias::AliasCompiler`)**: Derives the mail alias file and relay
//!   recipient map from the same snapshot.
//! * **Installation (`install`)**: Scratch directory, `makedb` encoding and atomic replacement
//!   of the live files.

pub mod alias;
pub mod authconfig;
pub mod config;
pub mod directory;
pub mod index;
pub mod install;
pub mod record;
pub mod sync;

pub use config::Config;
pub use directory::{DirectorySnapshot, DirectorySource, HttpDirectoryClient};
pub use index::MembershipIndex;
pub use record::{RecordCompiler, RecordSet};
pub use sync::{SyncOptions, SyncReport, SyncRun};

/// Result type used throughout the fas-client library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the fas-client library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fetching from the account system failed
    #[error(transparent)]
    Directory(directory::DirectoryError),

    /// A fetched entity could not be compiled into a record
    #[error(transparent)]
    Record(record::RecordError),

    /// The alias artifacts could not be produced
    #[error(transparent)]
    Alias(alias::AliasError),

    /// Writing, encoding or installing an artifact failed
    #[error(transparent)]
    Install(install::InstallError),

    /// The configuration file is missing or invalid
    #[error(transparent)]
    Config(config::ConfigError),

    /// Toggling the authconfig database flag failed
    #[error(transparent)]
    Authconfig(authconfig::AuthconfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Directory(_) => "directory",
            Error::Record(_) => "record",
            Error::Alias(_) => "alias",
            Error::Install(_) => "install",
            Error::Config(_) => "config",
            Error::Authconfig(_) => "authconfig",
        }
    }

    /// Check if this error came from the account system transport.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Directory(_))
    }

    /// Check if the account system rejected our credentials.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Directory(err) => err.is_authentication_error(),
            _ => false,
        }
    }

    /// Check if this error aborted compilation of the artifacts.
    pub fn is_compile_error(&self) -> bool {
        matches!(self, Error::Record(_) | Error::Alias(_))
    }

    /// Check if this error is about a malformed fetched entity.
    pub fn is_malformed_record(&self) -> bool {
        match self {
            Error::Record(err) => err.is_malformed(),
            _ => false,
        }
    }

    /// Check if this error is configuration-related.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Install(err) => err.is_io_error(),
            _ => false,
        }
    }
}
