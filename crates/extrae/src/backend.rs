//! The seam between the checked API and the tracer entry points.
//!
//! `Backend` mirrors the tracer's C API one method per entry point, but with
//! slices and C strings instead of raw pointers. `Tracer` only talks to the
//! tracer through this trait, so the real runtime and the in-memory
//! `Recording` are interchangeable.

use std::ffi::{CStr, c_char, c_int, c_uint};
use std::sync::Arc;

use extrae_sys::Runtime;

use crate::{EventType, EventValue};

/// Raw tracer entry points, without any state checks.
///
/// Implementations forward calls as-is. Lengths of paired slices are equal
/// and fit in 32 bits whenever `Tracer` is the caller.
pub trait Backend: Send + Sync {
    /// `(major, minor, revision)`.
    fn version(&self) -> (u32, u32, u32);

    fn init(&self);

    fn fini(&self);

    fn flush(&self);

    /// Raw mechanism code, `0` when not initialized.
    fn is_initialized(&self) -> u32;

    /// Pause collection.
    fn shutdown(&self);

    /// Resume collection.
    fn restart(&self);

    fn event(&self, event_type: EventType, value: EventValue);

    fn event_and_counters(&self, event_type: EventType, value: EventValue);

    fn n_event(&self, types: &[EventType], values: &[EventValue]);

    fn n_event_and_counters(&self, types: &[EventType], values: &[EventValue]);

    fn define_event_type(
        &self,
        event_type: EventType,
        description: &CStr,
        values: &[EventValue],
        descriptions: &[&CStr],
    );

    fn counters(&self);

    fn previous_hwc_set(&self);

    fn next_hwc_set(&self);

    fn set_tracing_tasks(&self, from: u32, to: u32);

    fn set_options(&self, options: c_int);

    fn network_counters(&self);

    /// Task ids are C ints on the tracer side.
    fn network_routes(&self, task: c_int);

    fn user_function(&self, enter: bool);
}

/// Clamp a pair of slices to a count the tracer can read from both.
fn paired_count(a: usize, b: usize) -> c_uint {
    c_uint::try_from(a.min(b)).unwrap_or(c_uint::MAX)
}

impl Backend for Runtime {
    fn version(&self) -> (u32, u32, u32) {
        Self::version(self)
    }

    fn init(&self) {
        // SAFETY: no arguments; the tracer tolerates repeated init.
        unsafe { (self.api().init)() }
    }

    fn fini(&self) {
        // SAFETY: no arguments.
        unsafe { (self.api().fini)() }
    }

    fn flush(&self) {
        // SAFETY: no arguments.
        unsafe { (self.api().flush)() }
    }

    fn is_initialized(&self) -> u32 {
        // SAFETY: read-only query, valid in any state.
        unsafe { (self.api().is_initialized)() }
    }

    fn shutdown(&self) {
        // SAFETY: no arguments.
        unsafe { (self.api().shutdown)() }
    }

    fn restart(&self) {
        // SAFETY: no arguments.
        unsafe { (self.api().restart)() }
    }

    fn event(&self, event_type: EventType, value: EventValue) {
        // SAFETY: plain integer arguments.
        unsafe { (self.api().event)(event_type, value) }
    }

    fn event_and_counters(&self, event_type: EventType, value: EventValue) {
        // SAFETY: plain integer arguments.
        unsafe { (self.api().event_and_counters)(event_type, value) }
    }

    fn n_event(&self, types: &[EventType], values: &[EventValue]) {
        let count = paired_count(types.len(), values.len());
        // SAFETY: both arrays hold at least `count` elements for the call.
        unsafe { (self.api().n_event)(count, types.as_ptr(), values.as_ptr()) }
    }

    fn n_event_and_counters(&self, types: &[EventType], values: &[EventValue]) {
        let count = paired_count(types.len(), values.len());
        // SAFETY: both arrays hold at least `count` elements for the call.
        unsafe { (self.api().n_event_and_counters)(count, types.as_ptr(), values.as_ptr()) }
    }

    fn define_event_type(
        &self,
        event_type: EventType,
        description: &CStr,
        values: &[EventValue],
        descriptions: &[&CStr],
    ) {
        let count = paired_count(values.len(), descriptions.len());
        let pointers: Vec<*const c_char> = descriptions.iter().map(|d| d.as_ptr()).collect();
        let values_ptr = if count == 0 {
            std::ptr::null()
        } else {
            values.as_ptr()
        };
        let descriptions_ptr = if count == 0 {
            std::ptr::null()
        } else {
            pointers.as_ptr()
        };
        // SAFETY: the tracer copies every string before returning; all
        // pointers outlive the call and the arrays hold `count` elements.
        unsafe {
            (self.api().define_event_type)(
                &raw const event_type,
                description.as_ptr(),
                &raw const count,
                values_ptr,
                descriptions_ptr,
            );
        }
    }

    fn counters(&self) {
        // SAFETY: no arguments.
        unsafe { (self.api().counters)() }
    }

    fn previous_hwc_set(&self) {
        // SAFETY: no arguments.
        unsafe { (self.api().previous_hwc_set)() }
    }

    fn next_hwc_set(&self) {
        // SAFETY: no arguments.
        unsafe { (self.api().next_hwc_set)() }
    }

    fn set_tracing_tasks(&self, from: u32, to: u32) {
        // SAFETY: plain integer arguments.
        unsafe { (self.api().set_tracing_tasks)(from, to) }
    }

    fn set_options(&self, options: c_int) {
        // SAFETY: plain integer argument.
        unsafe { (self.api().set_options)(options) }
    }

    fn network_counters(&self) {
        // SAFETY: no arguments.
        unsafe { (self.api().network_counters)() }
    }

    fn network_routes(&self, task: c_int) {
        // SAFETY: plain integer argument.
        unsafe { (self.api().network_routes)(task) }
    }

    fn user_function(&self, enter: bool) {
        // The returned routine address is not used.
        // SAFETY: plain integer argument.
        unsafe { (self.api().user_function)(c_uint::from(enter)) };
    }
}

macro_rules! forward_backend {
    ($($wrapper:ident),*) => {$(
        impl<B: Backend + ?Sized> Backend for $wrapper<B> {
            fn version(&self) -> (u32, u32, u32) { (**self).version() }
            fn init(&self) { (**self).init() }
            fn fini(&self) { (**self).fini() }
            fn flush(&self) { (**self).flush() }
            fn is_initialized(&self) -> u32 { (**self).is_initialized() }
            fn shutdown(&self) { (**self).shutdown() }
            fn restart(&self) { (**self).restart() }
            fn event(&self, event_type: EventType, value: EventValue) {
                (**self).event(event_type, value);
            }
            fn event_and_counters(&self, event_type: EventType, value: EventValue) {
                (**self).event_and_counters(event_type, value);
            }
            fn n_event(&self, types: &[EventType], values: &[EventValue]) {
                (**self).n_event(types, values);
            }
            fn n_event_and_counters(&self, types: &[EventType], values: &[EventValue]) {
                (**self).n_event_and_counters(types, values);
            }
            fn define_event_type(
                &self,
                event_type: EventType,
                description: &CStr,
                values: &[EventValue],
                descriptions: &[&CStr],
            ) {
                (**self).define_event_type(event_type, description, values, descriptions);
            }
            fn counters(&self) { (**self).counters() }
            fn previous_hwc_set(&self) { (**self).previous_hwc_set() }
            fn next_hwc_set(&self) { (**self).next_hwc_set() }
            fn set_tracing_tasks(&self, from: u32, to: u32) {
                (**self).set_tracing_tasks(from, to);
            }
            fn set_options(&self, options: c_int) { (**self).set_options(options) }
            fn network_counters(&self) { (**self).network_counters() }
            fn network_routes(&self, task: c_int) { (**self).network_routes(task) }
            fn user_function(&self, enter: bool) { (**self).user_function(enter) }
        }
    )*};
}

forward_backend!(Box, Arc);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paired_count_uses_shorter_slice() {
        assert_eq!(paired_count(3, 3), 3);
        assert_eq!(paired_count(3, 2), 2);
        assert_eq!(paired_count(0, 9), 0);
    }

    #[test]
    fn test_runtime_is_shareable() {
        fn assert_backend<B: Backend>() {}
        assert_backend::<Runtime>();
        assert_backend::<Box<dyn Backend>>();
        assert_backend::<Arc<dyn Backend>>();
    }
}
