use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the line-store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The default-templates directory needed to bootstrap a missing
    /// localization directory does not exist.
    #[error("default templates directory not found: {0}")]
    TemplatesDirMissing(PathBuf),

    /// A write was attempted against a read-only line source.
    #[error("line source is read-only, cannot write '{0}'")]
    ReadOnlySource(String),

    /// A packed resource lookup missed.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
