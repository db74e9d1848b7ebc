use thiserror::Error;

use crate::InitializationState;

/// Errors from the typed tracer API.
///
/// Every variant except `Load` and `Config` is detected locally, before the
/// tracer is called. The tracer has no error channel of its own; whatever it
/// reports goes to its own diagnostics output untouched.
#[derive(Error, Debug)]
pub enum Error {
    #[error("tracer is not initialized (state: {state})")]
    NotInitialized { state: InitializationState },
    #[error("tracer was already finalized")]
    AlreadyFinalized,
    #[error("invalid task range: start {start} > stop {stop}")]
    InvalidRange { start: u32, stop: u32 },
    #[error("task id {0} does not fit the tracer's C int")]
    InvalidTask(u32),
    #[error("invalid option mask {mask:#x}: unknown bits {unknown:#x}")]
    InvalidOptionMask { mask: u32, unknown: u32 },
    #[error("unknown option name '{0}'")]
    UnknownOption(String),
    #[error("invalid event descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("event batch is empty")]
    EmptyBatch,
    #[error("{0} entries exceed the tracer's 32-bit count")]
    BatchTooLarge(usize),
    #[error("a global tracer is already installed")]
    AlreadyInstalled,
    #[error(transparent)]
    Load(#[from] extrae_sys::LoadError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// True if the call was rejected before reaching the tracer.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::Load(_) | Self::Config(_))
    }

    /// Short label used as the `reason` on rejection metrics.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NotInitialized { .. } => "not_initialized",
            Self::AlreadyFinalized => "already_finalized",
            Self::InvalidRange { .. } => "invalid_range",
            Self::InvalidTask(_) => "invalid_task",
            Self::InvalidOptionMask { .. } | Self::UnknownOption(_) => "invalid_option_mask",
            Self::InvalidDescriptor(_) => "invalid_descriptor",
            Self::EmptyBatch => "empty_batch",
            Self::BatchTooLarge(_) => "batch_too_large",
            Self::AlreadyInstalled => "already_installed",
            Self::Load(_) => "load",
            Self::Config(_) => "config",
        }
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("EXTRAE_HOME is not set and no library path was given")]
    MissingHome,
    #[error("unknown tracer flavor '{0}'")]
    UnknownFlavor(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_vs_runtime_errors() {
        assert!(Error::EmptyBatch.is_validation());
        assert!(Error::AlreadyFinalized.is_validation());
        assert!(Error::InvalidTask(u32::MAX).is_validation());
        assert!(!Error::Config(ConfigError::MissingHome).is_validation());
        assert!(
            !Error::Load(extrae_sys::LoadError::LibraryNotFound("x".into())).is_validation()
        );
    }

    #[test]
    fn test_messages() {
        let err = Error::InvalidOptionMask {
            mask: 0x8000_0002,
            unknown: 0x8000_0000,
        };
        assert_eq!(
            err.to_string(),
            "invalid option mask 0x80000002: unknown bits 0x80000000"
        );
        let err = Error::NotInitialized {
            state: InitializationState::Finalized,
        };
        assert_eq!(err.to_string(), "tracer is not initialized (state: finalized)");
    }
}
