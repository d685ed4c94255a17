//! Atomic replacement of live files.

use std::{
    fs::{File, Permissions},
    io::Write,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{error, info};

use super::errors::InstallError;

/// A finished artifact and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Short name used in logs and reports, e.g. `passwd`.
    pub label: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub mode: u32,
}

/// Outcome of installing a batch of artifacts.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Label and destination of every installed artifact.
    pub installed: Vec<(String, PathBuf)>,
    pub failures: Vec<(String, InstallError)>,
}

impl InstallReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record_failure(&mut self, label: impl Into<String>, err: InstallError) {
        let label = label.into();
        error!(artifact = %label, error = %err, "Install failed");
        self.failures.push((label, err));
    }
}

/// Install every artifact, continuing past failures.
///
/// A failed artifact leaves its previous live file untouched; the others are
/// still attempted.
pub fn install_all(artifacts: &[Artifact], report: &mut InstallReport) {
    for artifact in artifacts {
        match install_file(&artifact.source, &artifact.destination, artifact.mode) {
            Ok(()) => {
                info!(
                    artifact = %artifact.label,
                    destination = %artifact.destination.display(),
                    "Installed"
                );
                report
                    .installed
                    .push((artifact.label.clone(), artifact.destination.clone()));
            }
            Err(err) => report.record_failure(artifact.label.clone(), err),
        }
    }
}

/// Copy `source` over `destination` atomically with the given mode.
pub fn install_file(source: &Path, destination: &Path, mode: u32) -> Result<(), InstallError> {
    let mut input = File::open(source).map_err(|source_err| InstallError::ReadFailed {
        path: source.to_path_buf(),
        source: source_err,
    })?;
    replace_with(destination, mode, |tmp| std::io::copy(&mut input, tmp).map(|_| ()))
}

/// Write `contents` over `destination` atomically with the given mode.
pub fn install_bytes(contents: &[u8], destination: &Path, mode: u32) -> Result<(), InstallError> {
    replace_with(destination, mode, |tmp| tmp.write_all(contents))
}

/// Fill a temp file beside `destination`, then rename it into place.
///
/// The temp file lives in the destination directory so the final rename
/// never crosses filesystems.
fn replace_with<F>(destination: &Path, mode: u32, fill: F) -> Result<(), InstallError>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| InstallError::NoParentDirectory {
            destination: destination.to_path_buf(),
        })?;
    let replace_err = |source| InstallError::ReplaceFailed {
        destination: destination.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(replace_err)?;
    fill(tmp.as_file_mut()).map_err(replace_err)?;
    tmp.as_file()
        .set_permissions(Permissions::from_mode(mode))
        .map_err(replace_err)?;
    tmp.as_file().sync_all().map_err(replace_err)?;
    tmp.persist(destination)
        .map_err(|e| replace_err(e.error))?;
    Ok(())
}
