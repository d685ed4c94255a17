//! Switching NSS database lookups on and off through authconfig.

use std::{
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;

use crate::install::{self, InstallError};

const USEDB_KEY: &str = "USEDB";

#[derive(Debug, Error)]
pub enum AuthconfigError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error("Failed to run {program}: {source}")]
    ApplyUnavailable {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} --updateall failed ({status})")]
    ApplyFailed { program: PathBuf, status: String },
}

impl AuthconfigError {
    /// Check if the file was updated but applying it failed.
    pub fn is_apply_error(&self) -> bool {
        matches!(
            self,
            AuthconfigError::ApplyUnavailable { .. } | AuthconfigError::ApplyFailed { .. }
        )
    }

    /// Check if the authconfig file itself could not be read or replaced.
    pub fn is_io_error(&self) -> bool {
        match self {
            AuthconfigError::Read { .. } => true,
            AuthconfigError::Install(err) => err.is_io_error(),
            _ => false,
        }
    }
}

impl From<AuthconfigError> for crate::Error {
    fn from(err: AuthconfigError) -> Self {
        crate::Error::Authconfig(err)
    }
}

/// Rewrite every `USEDB` line to the requested value, leaving all other
/// lines exactly as they were. Appends the setting if no line carries it.
pub fn set_usedb(contents: &str, enabled: bool) -> String {
    let value = if enabled { "yes" } else { "no" };
    let mut out = String::with_capacity(contents.len() + 12);
    let mut found = false;
    for line in contents.split_inclusive('\n') {
        if line.starts_with(USEDB_KEY) {
            found = true;
            out.push_str(USEDB_KEY);
            out.push('=');
            out.push_str(value);
            if line.ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(line);
        }
    }
    if !found {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!("{USEDB_KEY}={value}\n"));
    }
    out
}

/// Update the authconfig file in place and apply it.
pub async fn toggle_usedb(
    path: &Path,
    enabled: bool,
    program: &Path,
) -> Result<(), AuthconfigError> {
    let read_err = |source| AuthconfigError::Read {
        path: path.to_path_buf(),
        source,
    };
    let contents = tokio::fs::read_to_string(path).await.map_err(read_err)?;
    let mode = tokio::fs::metadata(path)
        .await
        .map_err(read_err)?
        .permissions()
        .mode()
        & 0o7777;

    let updated = set_usedb(&contents, enabled);
    install::install_bytes(updated.as_bytes(), path, mode)?;
    info!(path = %path.display(), enabled, "Updated USEDB");

    let status = tokio::process::Command::new(program)
        .arg("--updateall")
        .status()
        .await
        .map_err(|source| AuthconfigError::ApplyUnavailable {
            program: program.to_path_buf(),
            source,
        })?;
    if !status.success() {
        return Err(AuthconfigError::ApplyFailed {
            program: program.to_path_buf(),
            status: status.to_string(),
        });
    }
    Ok(())
}
