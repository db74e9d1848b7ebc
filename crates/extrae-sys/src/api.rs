//! Entry point table resolved from the tracer library.

use libloading::os::unix::{Library, Symbol};
use tracing::{debug, error};

use crate::{
    ExtraeDefineEventType, ExtraeEvent, ExtraeGetVersion, ExtraeIsInitialized, ExtraeNEvent,
    ExtraeNetworkRoutes, ExtraeSetOptions, ExtraeSetTracingTasks, ExtraeUserFunction, ExtraeVoid,
    LoadError,
};

/// Every tracer entry point, resolved once at load time.
///
/// The pointers are only valid while the `Library` they came from stays
/// loaded; `Runtime` keeps both together.
#[derive(Clone, Copy)]
pub struct ExtraeApi {
    /// Absent on builds that predate versioned releases.
    pub get_version: Option<ExtraeGetVersion>,
    pub init: ExtraeVoid,
    pub fini: ExtraeVoid,
    pub flush: ExtraeVoid,
    pub is_initialized: ExtraeIsInitialized,
    pub shutdown: ExtraeVoid,
    pub restart: ExtraeVoid,
    pub event: ExtraeEvent,
    pub event_and_counters: ExtraeEvent,
    pub n_event: ExtraeNEvent,
    pub n_event_and_counters: ExtraeNEvent,
    pub define_event_type: ExtraeDefineEventType,
    pub counters: ExtraeVoid,
    pub previous_hwc_set: ExtraeVoid,
    pub next_hwc_set: ExtraeVoid,
    pub set_tracing_tasks: ExtraeSetTracingTasks,
    pub set_options: ExtraeSetOptions,
    pub network_counters: ExtraeVoid,
    pub network_routes: ExtraeNetworkRoutes,
    pub user_function: ExtraeUserFunction,
}

impl ExtraeApi {
    /// Resolve all entry points from `lib`.
    ///
    /// # Safety
    ///
    /// `lib` must be an Extrae tracing library; the symbols are cast to the
    /// signatures declared in this crate without any check.
    ///
    /// # Errors
    ///
    /// `SymbolNotFound` for the first required entry point `lib` lacks.
    pub unsafe fn load(lib: &Library) -> Result<Self, LoadError> {
        unsafe {
            let get_version = load_optional_symbol(lib, b"Extrae_get_version\0");
            if get_version.is_none() {
                debug!("Extrae_get_version not exported, version will read as 0.0.0");
            }

            Ok(Self {
                get_version,
                init: load_symbol(lib, b"Extrae_init\0", "Extrae_init")?,
                fini: load_symbol(lib, b"Extrae_fini\0", "Extrae_fini")?,
                flush: load_symbol(lib, b"Extrae_flush\0", "Extrae_flush")?,
                is_initialized: load_symbol(
                    lib,
                    b"Extrae_is_initialized\0",
                    "Extrae_is_initialized",
                )?,
                shutdown: load_symbol(lib, b"Extrae_shutdown\0", "Extrae_shutdown")?,
                restart: load_symbol(lib, b"Extrae_restart\0", "Extrae_restart")?,
                event: load_symbol(lib, b"Extrae_event\0", "Extrae_event")?,
                event_and_counters: load_symbol(
                    lib,
                    b"Extrae_eventandcounters\0",
                    "Extrae_eventandcounters",
                )?,
                n_event: load_symbol(lib, b"Extrae_nevent\0", "Extrae_nevent")?,
                n_event_and_counters: load_symbol(
                    lib,
                    b"Extrae_neventandcounters\0",
                    "Extrae_neventandcounters",
                )?,
                define_event_type: load_symbol(
                    lib,
                    b"Extrae_define_event_type\0",
                    "Extrae_define_event_type",
                )?,
                counters: load_symbol(lib, b"Extrae_counters\0", "Extrae_counters")?,
                previous_hwc_set: load_symbol(
                    lib,
                    b"Extrae_previous_hwc_set\0",
                    "Extrae_previous_hwc_set",
                )?,
                next_hwc_set: load_symbol(lib, b"Extrae_next_hwc_set\0", "Extrae_next_hwc_set")?,
                set_tracing_tasks: load_symbol(
                    lib,
                    b"Extrae_set_tracing_tasks\0",
                    "Extrae_set_tracing_tasks",
                )?,
                set_options: load_symbol(lib, b"Extrae_set_options\0", "Extrae_set_options")?,
                network_counters: load_symbol(
                    lib,
                    b"Extrae_network_counters\0",
                    "Extrae_network_counters",
                )?,
                network_routes: load_symbol(
                    lib,
                    b"Extrae_network_routes\0",
                    "Extrae_network_routes",
                )?,
                user_function: load_symbol(
                    lib,
                    b"Extrae_user_function\0",
                    "Extrae_user_function",
                )?,
            })
        }
    }
}

unsafe fn load_symbol<T: Copy>(
    lib: &Library,
    symbol: &'static [u8],
    label: &'static str,
) -> Result<T, LoadError> {
    unsafe {
        let sym: Symbol<T> = lib.get(symbol).map_err(|e| {
            error!(symbol = label, "symbol not found in tracer library");
            LoadError::SymbolNotFound(label.to_string(), e)
        })?;
        Ok(*sym)
    }
}

unsafe fn load_optional_symbol<T: Copy>(lib: &Library, symbol: &'static [u8]) -> Option<T> {
    unsafe {
        let sym: Symbol<T> = lib.get(symbol).ok()?;
        Some(*sym)
    }
}
