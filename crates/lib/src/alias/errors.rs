//! Error types for alias compilation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AliasError {
    /// The alias template could not be read. Nothing is written when this happens.
    #[error("Could not open aliases template {path}: {source}")]
    TemplateMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Alias domain must not be empty")]
    EmptyDomain,
}

impl AliasError {
    pub fn is_template_missing(&self) -> bool {
        matches!(self, AliasError::TemplateMissing { .. })
    }
}

impl From<AliasError> for crate::Error {
    fn from(err: AliasError) -> Self {
        crate::Error::Alias(err)
    }
}
