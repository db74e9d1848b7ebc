//! Raw bindings to the Extrae tracing runtime.
//!
//! This crate only declares the C ABI of the tracer and resolves its entry
//! points from a shared library at runtime. There is no validation here: every
//! call is forwarded as-is, and calling into the tracer in the wrong state is
//! undefined on the tracer side. Use the `extrae` crate for the checked API.
//!
//! ```ignore
//! use extrae_sys::Runtime;
//!
//! let rt = Runtime::open("/opt/extrae/lib/libseqtrace.so")?;
//! unsafe {
//!     (rt.api().init)();
//!     (rt.api().event)(1000, 1);
//!     (rt.api().fini)();
//! }
//! ```

mod api;
mod error;
mod runtime;

use std::ffi::{c_char, c_int, c_uint, c_ulonglong};

pub use api::ExtraeApi;
pub use error::LoadError;
pub use runtime::Runtime;

/// `extrae_type_t`: event type identifier.
#[allow(non_camel_case_types)]
pub type extrae_type_t = c_uint;

/// `extrae_value_t`: event value payload.
#[allow(non_camel_case_types)]
pub type extrae_value_t = c_ulonglong;

// ============================================================================
// Option bits accepted by `Extrae_set_options`
// ============================================================================

pub const EXTRAE_DISABLE_ALL_OPTIONS: c_int = 0;
pub const EXTRAE_CALLER_OPTION: c_int = 1;
pub const EXTRAE_HWC_OPTION: c_int = 2;
pub const EXTRAE_MPI_HWC_OPTION: c_int = 4;
pub const EXTRAE_MPI_OPTION: c_int = 8;
pub const EXTRAE_OMP_OPTION: c_int = 16;
pub const EXTRAE_OMP_HWC_OPTION: c_int = 32;
pub const EXTRAE_UF_HWC_OPTION: c_int = 64;

// ============================================================================
// Return codes of `Extrae_is_initialized`
// ============================================================================

pub const EXTRAE_NOT_INITIALIZED: c_uint = 0;
pub const EXTRAE_INITIALIZED_EXTRAE_INIT: c_uint = 1;
pub const EXTRAE_INITIALIZED_MPI_INIT: c_uint = 2;
pub const EXTRAE_INITIALIZED_SHMEM_INIT: c_uint = 3;

// ============================================================================
// Entry point signatures
// ============================================================================

pub type ExtraeGetVersion = unsafe extern "C" fn(*mut c_uint, *mut c_uint, *mut c_uint);
pub type ExtraeVoid = unsafe extern "C" fn();
pub type ExtraeIsInitialized = unsafe extern "C" fn() -> c_uint;
pub type ExtraeEvent = unsafe extern "C" fn(extrae_type_t, extrae_value_t);
pub type ExtraeNEvent =
    unsafe extern "C" fn(c_uint, *const extrae_type_t, *const extrae_value_t);
pub type ExtraeDefineEventType = unsafe extern "C" fn(
    *const extrae_type_t,
    *const c_char,
    *const c_uint,
    *const extrae_value_t,
    *const *const c_char,
);
pub type ExtraeSetTracingTasks = unsafe extern "C" fn(c_uint, c_uint);
pub type ExtraeSetOptions = unsafe extern "C" fn(c_int);
pub type ExtraeNetworkRoutes = unsafe extern "C" fn(c_int);
/// Returns the address of the routine being entered or left.
pub type ExtraeUserFunction = unsafe extern "C" fn(c_uint) -> extrae_value_t;
