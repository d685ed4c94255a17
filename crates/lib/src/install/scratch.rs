//! Per-run scratch directory.

use std::{
    fs::Permissions,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::errors::InstallError;

/// Exclusively owned working directory, removed when dropped.
///
/// Created fresh for every run so concurrent runs never share files.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create `fas-XXXXXX-tmp` under `root` with mode 0700.
    pub fn create(root: impl AsRef<Path>) -> Result<Self, InstallError> {
        let root = root.as_ref();
        let scratch_err = |source| InstallError::ScratchDir {
            root: root.to_path_buf(),
            source,
        };
        let dir = tempfile::Builder::new()
            .prefix("fas-")
            .suffix("-tmp")
            .tempdir_in(root)
            .map_err(scratch_err)?;
        std::fs::set_permissions(dir.path(), Permissions::from_mode(0o700)).map_err(scratch_err)?;
        debug!(path = %dir.path().display(), "Created scratch directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a new file in the scratch directory, created with `mode` so that
    /// private content is never readable by others, even briefly.
    pub async fn write(&self, name: &str, contents: &str, mode: u32) -> Result<PathBuf, InstallError> {
        let path = self.join(name);
        let write_err = |source| InstallError::WriteFailed {
            path: path.clone(),
            source,
        };
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(mode)
            .open(&path)
            .await
            .map_err(write_err)?;
        file.write_all(contents.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        debug!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
        Ok(path)
    }
}
