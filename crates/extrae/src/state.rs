//! Lifecycle state of the tracer.
//!
//! ```text
//! Uninitialized --init--> Initialized --finish--> Finalized
//!                          |      ^
//!          instrumentation(false) | instrumentation(true)
//!                          v      |
//!                          Suspended --finish--> Finalized
//! ```
//!
//! The cell is a single atomic, not a lock. Concurrent `init`/`finish` from
//! several threads is passed through to the tracer as-is.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use extrae_sys::{
    EXTRAE_INITIALIZED_EXTRAE_INIT, EXTRAE_INITIALIZED_MPI_INIT, EXTRAE_INITIALIZED_SHMEM_INIT,
    EXTRAE_NOT_INITIALIZED,
};

/// Coarse lifecycle state tracked on the Rust side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InitializationState {
    Uninitialized = 0,
    Initialized = 1,
    /// Initialized, with collection paused via `instrumentation(false)`.
    Suspended = 2,
    Finalized = 3,
}

impl InitializationState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Initialized,
            2 => Self::Suspended,
            3 => Self::Finalized,
            _ => Self::Uninitialized,
        }
    }

    /// True while event, counter and flush calls are allowed.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Initialized | Self::Suspended)
    }
}

impl fmt::Display for InitializationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Suspended => "suspended",
            Self::Finalized => "finalized",
        })
    }
}

#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(InitializationState::Uninitialized as u8))
    }

    pub(crate) fn load(&self) -> InitializationState {
        InitializationState::from_raw(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: InitializationState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move `from -> to` if the cell currently holds `from`.
    pub(crate) fn transition(
        &self,
        from: InitializationState,
        to: InitializationState,
    ) -> Result<(), InitializationState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(InitializationState::from_raw)
    }
}

/// Which mechanism initialized the tracer, as reported by the tracer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InitMechanism {
    NotInitialized,
    /// An explicit `Extrae_init` call.
    ExtraeInit,
    /// The tracer's `MPI_Init` wrapper.
    MpiInit,
    /// The tracer's `shmem_init` wrapper.
    ShmemInit,
    /// A code this binding does not know about.
    Unknown(u32),
}

impl InitMechanism {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            EXTRAE_NOT_INITIALIZED => Self::NotInitialized,
            EXTRAE_INITIALIZED_EXTRAE_INIT => Self::ExtraeInit,
            EXTRAE_INITIALIZED_MPI_INIT => Self::MpiInit,
            EXTRAE_INITIALIZED_SHMEM_INIT => Self::ShmemInit,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn is_initialized(self) -> bool {
        !matches!(self, Self::NotInitialized)
    }
}

impl fmt::Display for InitMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => f.write_str("not initialized"),
            Self::ExtraeInit => f.write_str("Extrae_init"),
            Self::MpiInit => f.write_str("MPI_Init"),
            Self::ShmemInit => f.write_str("shmem_init"),
            Self::Unknown(code) => write!(f, "unknown mechanism {code}"),
        }
    }
}
