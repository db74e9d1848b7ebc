//! Library loading errors.

use thiserror::Error;

/// Failure to bring the tracer library into the process.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("tracer library not found: {0}")]
    LibraryNotFound(String),

    #[error("failed to load tracer library: {0}")]
    Load(#[from] libloading::Error),

    #[error("failed to find symbol '{0}': {1}")]
    SymbolNotFound(String, libloading::Error),
}
