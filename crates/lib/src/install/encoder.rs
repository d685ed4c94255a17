//! The text to database encoding step.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::errors::InstallError;

/// Turns a compiled text artifact into a lookup database.
#[async_trait]
pub trait DbEncoder: Send + Sync {
    async fn encode(&self, text: &Path, db: &Path) -> Result<(), InstallError>;
}

/// Runs glibc's `makedb -o <db> <text>`.
#[derive(Debug, Clone)]
pub struct Makedb {
    program: PathBuf,
}

impl Makedb {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Makedb {
    fn default() -> Self {
        Self::new("makedb")
    }
}

#[async_trait]
impl DbEncoder for Makedb {
    async fn encode(&self, text: &Path, db: &Path) -> Result<(), InstallError> {
        debug!(program = %self.program.display(), text = %text.display(), db = %db.display(), "Encoding database");
        let output = tokio::process::Command::new(&self.program)
            .arg("-o")
            .arg(db)
            .arg(text)
            .output()
            .await
            .map_err(|source| InstallError::EncoderUnavailable {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(InstallError::EncodeFailed {
                path: db.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
