//! Error types for artifact writing and installation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstallError {
    #[error("Failed to create scratch directory under {root}: {source}")]
    ScratchDir {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run {program}: {source}")]
    EncoderUnavailable {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encoding {path} failed ({status}): {stderr}")]
    EncodeFailed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Destination {destination} has no parent directory")]
    NoParentDirectory { destination: PathBuf },

    #[error("Could not write {destination}: {source}")]
    ReplaceFailed {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    /// Check if this error came from the filesystem.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            InstallError::ScratchDir { .. }
                | InstallError::ReadFailed { .. }
                | InstallError::WriteFailed { .. }
                | InstallError::ReplaceFailed { .. }
        )
    }

    /// Check if the external encoder failed.
    pub fn is_encode_error(&self) -> bool {
        matches!(
            self,
            InstallError::EncoderUnavailable { .. } | InstallError::EncodeFailed { .. }
        )
    }
}

impl From<InstallError> for crate::Error {
    fn from(err: InstallError) -> Self {
        crate::Error::Install(err)
    }
}
