//! Process-wide tracer handle.

use std::sync::OnceLock;

use tracing::debug;

use crate::{Backend, Error, Result, Tracer};

/// A tracer with its backend type erased.
pub type SharedTracer = Tracer<Box<dyn Backend>>;

static TRACER: OnceLock<SharedTracer> = OnceLock::new();

/// Make `tracer` the process-wide handle returned by `global`.
///
/// Only one tracer can ever be installed.
///
/// # Errors
///
/// `AlreadyInstalled` if a tracer was installed before.
pub fn install<B: Backend + 'static>(tracer: Tracer<B>) -> Result<&'static SharedTracer> {
    TRACER
        .set(tracer.boxed())
        .map_err(|_| Error::AlreadyInstalled)?;
    debug!("global tracer installed");
    TRACER.get().ok_or(Error::AlreadyInstalled)
}

/// The installed tracer, if any.
#[must_use]
pub fn global() -> Option<&'static SharedTracer> {
    TRACER.get()
}
