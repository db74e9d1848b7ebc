//! In-memory backend that records every forwarded call.
//!
//! Useful for testing instrumented code on machines without the tracer. The
//! recorder also answers `is_initialized` the way the tracer does: set by
//! `init`, cleared by `fini`.

use std::ffi::{CStr, c_int};
use std::sync::atomic::{AtomicU32, Ordering};

use extrae_sys::{EXTRAE_INITIALIZED_EXTRAE_INIT, EXTRAE_NOT_INITIALIZED};
use parking_lot::Mutex;

use crate::{Backend, EventType, EventValue, Version};

/// One call as it reached the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Init,
    Fini,
    Flush,
    Shutdown,
    Restart,
    Event {
        event_type: EventType,
        value: EventValue,
        counters: bool,
    },
    NEvent {
        types: Vec<EventType>,
        values: Vec<EventValue>,
        counters: bool,
    },
    DefineEventType {
        event_type: EventType,
        description: String,
        values: Vec<EventValue>,
        descriptions: Vec<String>,
    },
    Counters,
    PreviousHwcSet,
    NextHwcSet,
    SetTracingTasks {
        from: u32,
        to: u32,
    },
    SetOptions(c_int),
    NetworkCounters,
    NetworkRoutes(c_int),
    UserFunction {
        enter: bool,
    },
}

/// Backend that stores calls instead of tracing.
#[derive(Debug)]
pub struct Recording {
    calls: Mutex<Vec<Call>>,
    mechanism: AtomicU32,
    version: Version,
}

impl Default for Recording {
    fn default() -> Self {
        Self::new()
    }
}

impl Recording {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            mechanism: AtomicU32::new(EXTRAE_NOT_INITIALIZED),
            version: Version::new(0, 0, 0),
        }
    }

    /// Report `version` from `Backend::version`.
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Pretend something other than `init` (e.g. `MPI_Init`) started the tracer.
    pub fn initialized_by(&self, mechanism: u32) {
        self.mechanism.store(mechanism, Ordering::Release);
    }

    /// Copy of all calls so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Drain all calls so far.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Only the single and batched event calls, flattened to `(type, value)`.
    #[must_use]
    pub fn events(&self) -> Vec<(EventType, EventValue)> {
        let calls = self.calls.lock();
        let mut events = Vec::new();
        for call in calls.iter() {
            match call {
                Call::Event {
                    event_type, value, ..
                } => events.push((*event_type, *value)),
                Call::NEvent { types, values, .. } => {
                    events.extend(types.iter().copied().zip(values.iter().copied()));
                }
                _ => {}
            }
        }
        events
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl Backend for Recording {
    fn version(&self) -> (u32, u32, u32) {
        (self.version.major, self.version.minor, self.version.revision)
    }

    fn init(&self) {
        // First initializer wins, as in the tracer.
        let _ = self.mechanism.compare_exchange(
            EXTRAE_NOT_INITIALIZED,
            EXTRAE_INITIALIZED_EXTRAE_INIT,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.record(Call::Init);
    }

    fn fini(&self) {
        self.mechanism
            .store(EXTRAE_NOT_INITIALIZED, Ordering::Release);
        self.record(Call::Fini);
    }

    fn flush(&self) {
        self.record(Call::Flush);
    }

    fn is_initialized(&self) -> u32 {
        self.mechanism.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        self.record(Call::Shutdown);
    }

    fn restart(&self) {
        self.record(Call::Restart);
    }

    fn event(&self, event_type: EventType, value: EventValue) {
        self.record(Call::Event {
            event_type,
            value,
            counters: false,
        });
    }

    fn event_and_counters(&self, event_type: EventType, value: EventValue) {
        self.record(Call::Event {
            event_type,
            value,
            counters: true,
        });
    }

    fn n_event(&self, types: &[EventType], values: &[EventValue]) {
        self.record(Call::NEvent {
            types: types.to_vec(),
            values: values.to_vec(),
            counters: false,
        });
    }

    fn n_event_and_counters(&self, types: &[EventType], values: &[EventValue]) {
        self.record(Call::NEvent {
            types: types.to_vec(),
            values: values.to_vec(),
            counters: true,
        });
    }

    fn define_event_type(
        &self,
        event_type: EventType,
        description: &CStr,
        values: &[EventValue],
        descriptions: &[&CStr],
    ) {
        self.record(Call::DefineEventType {
            event_type,
            description: description.to_string_lossy().into_owned(),
            values: values.to_vec(),
            descriptions: descriptions
                .iter()
                .map(|d| d.to_string_lossy().into_owned())
                .collect(),
        });
    }

    fn counters(&self) {
        self.record(Call::Counters);
    }

    fn previous_hwc_set(&self) {
        self.record(Call::PreviousHwcSet);
    }

    fn next_hwc_set(&self) {
        self.record(Call::NextHwcSet);
    }

    fn set_tracing_tasks(&self, from: u32, to: u32) {
        self.record(Call::SetTracingTasks { from, to });
    }

    fn set_options(&self, options: c_int) {
        self.record(Call::SetOptions(options));
    }

    fn network_counters(&self) {
        self.record(Call::NetworkCounters);
    }

    fn network_routes(&self, task: c_int) {
        self.record(Call::NetworkRoutes(task));
    }

    fn user_function(&self, enter: bool) {
        self.record(Call::UserFunction { enter });
    }
}
