//! Checked tracer operations.
//!
//! Every method checks the lifecycle state and validates its arguments before
//! anything reaches the backend. A rejected call never touches the tracer.
//!
//! | operation                              | allowed in                     |
//! |----------------------------------------|--------------------------------|
//! | `version`, `is_initialized`, `state`   | any state                      |
//! | `init`                                 | anything but `Finalized`       |
//! | `finish`                               | `Initialized`, `Suspended`     |
//! | events, counters, flush, markers       | `Initialized`, `Suspended`     |
//! | options, task range, descriptors, routes | anything but `Finalized`     |

use std::ffi::{CStr, CString, c_int};
use std::ops::RangeInclusive;

use extrae_sys::Runtime;
use tracing::{debug, trace, warn};

use crate::state::StateCell;
use crate::{
    Backend, Counters, Error, EventBatch, EventType, EventTypeDescriptor, EventValue,
    InitMechanism, InitializationState, Options, Result, Strictness, TaskRange, TracerConfig,
    Version, metrics,
};

/// Checked handle to the tracer.
///
/// The tracer is process-wide. Holding two `Tracer`s over the same library
/// gives two independent views of one lifecycle; use `install`/`global` to
/// share a single handle instead.
#[derive(Debug)]
pub struct Tracer<B: Backend = Runtime> {
    backend: B,
    state: StateCell,
    strictness: Strictness,
}

impl Tracer<Runtime> {
    /// Load the tracer library described by `config`.
    ///
    /// This does not initialize tracing; call `init` (or `adopt` when the
    /// tracer starts itself from `MPI_Init`).
    ///
    /// # Errors
    ///
    /// `Load` if the library is missing, unloadable or lacks a required entry
    /// point.
    pub fn open(config: &TracerConfig) -> Result<Self> {
        let path = config.library_path();
        let runtime = Runtime::open(&path)?;
        debug!(path = %path.display(), strictness = ?config.strictness, "tracer library loaded");
        Ok(Self::with_backend(runtime).strictness(config.strictness))
    }
}

impl<B: Backend> Tracer<B> {
    /// Wrap a backend. The lifecycle starts `Uninitialized`.
    #[must_use]
    pub const fn with_backend(backend: B) -> Self {
        Self {
            backend,
            state: StateCell::new(),
            strictness: Strictness::Lenient,
        }
    }

    #[must_use]
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Lifecycle state as tracked on this side.
    #[must_use]
    pub fn state(&self) -> InitializationState {
        self.state.load()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    #[must_use]
    pub fn version(&self) -> Version {
        self.backend.version().into()
    }

    /// Start tracing.
    ///
    /// Calling again while initialized still reaches the tracer, which
    /// prints its own double-initialization warning.
    ///
    /// # Errors
    ///
    /// `AlreadyFinalized` after `finish`.
    pub fn init(&self) -> Result<()> {
        let state = self.state.load();
        match state {
            InitializationState::Finalized => return Err(self.reject(Error::AlreadyFinalized)),
            InitializationState::Initialized | InitializationState::Suspended => {
                warn!(%state, "tracer already initialized, forwarding init again");
            }
            InitializationState::Uninitialized => {}
        }

        self.backend.init();
        if self
            .state
            .transition(
                InitializationState::Uninitialized,
                InitializationState::Initialized,
            )
            .is_ok()
        {
            debug!("tracer initialized");
        }
        Ok(())
    }

    /// Ask the tracer whether it is running and what started it.
    #[must_use]
    pub fn is_initialized(&self) -> (bool, InitMechanism) {
        let mechanism = InitMechanism::from_raw(self.backend.is_initialized());
        (mechanism.is_initialized(), mechanism)
    }

    /// Take over a tracer started by another mechanism, such as the tracer's
    /// own `MPI_Init` wrapper, without calling `init`.
    ///
    /// Returns what the tracer reports. The local state only moves when it was
    /// `Uninitialized` and the tracer says it is running.
    ///
    /// # Errors
    ///
    /// `AlreadyFinalized` after `finish`.
    pub fn adopt(&self) -> Result<InitMechanism> {
        if self.state.load() == InitializationState::Finalized {
            return Err(self.reject(Error::AlreadyFinalized));
        }
        let (running, mechanism) = self.is_initialized();
        if running
            && self
                .state
                .transition(
                    InitializationState::Uninitialized,
                    InitializationState::Initialized,
                )
                .is_ok()
        {
            debug!(%mechanism, "adopted running tracer");
        }
        Ok(mechanism)
    }

    /// Stop tracing and write the remaining buffers. Terminal.
    ///
    /// # Errors
    ///
    /// `NotInitialized` before `init`; `AlreadyFinalized` on a repeated call
    /// under `Strictness::Strict`.
    pub fn finish(&self) -> Result<()> {
        let state = self.state.load();
        match state {
            InitializationState::Uninitialized => {
                Err(self.reject(Error::NotInitialized { state }))
            }
            InitializationState::Finalized => match self.strictness {
                Strictness::Lenient => {
                    warn!("tracer already finalized, ignoring finish");
                    Ok(())
                }
                Strictness::Strict => Err(self.reject(Error::AlreadyFinalized)),
            },
            InitializationState::Initialized | InitializationState::Suspended => {
                self.backend.fini();
                self.state.store(InitializationState::Finalized);
                debug!("tracer finalized");
                Ok(())
            }
        }
    }

    /// Write this thread's buffered events to disk.
    ///
    /// # Errors
    ///
    /// `NotInitialized` unless the tracer is initialized or suspended.
    pub fn flush(&self) -> Result<()> {
        self.require_active()?;
        self.backend.flush();
        Ok(())
    }

    /// Resume (`true`) or pause (`false`) event collection.
    ///
    /// Pausing keeps the tracer initialized; calls stay valid but the tracer
    /// drops what it receives until collection resumes.
    ///
    /// # Errors
    ///
    /// `NotInitialized` unless the tracer is initialized or suspended.
    pub fn instrumentation(&self, enabled: bool) -> Result<()> {
        self.require_active()?;
        let (from, to) = if enabled {
            self.backend.restart();
            (InitializationState::Suspended, InitializationState::Initialized)
        } else {
            self.backend.shutdown();
            (InitializationState::Initialized, InitializationState::Suspended)
        };
        match self.state.transition(from, to) {
            Ok(()) => debug!(state = %to, "instrumentation toggled"),
            Err(current) => trace!(state = %current, enabled, "instrumentation already in place"),
        }
        Ok(())
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Emit one event, timestamped by the tracer.
    ///
    /// # Errors
    ///
    /// `NotInitialized` unless the tracer is initialized or suspended.
    pub fn emit_event(
        &self,
        event_type: EventType,
        value: EventValue,
        counters: Counters,
    ) -> Result<()> {
        self.require_active()?;
        trace!(event_type, value, ?counters, "event");
        match counters {
            Counters::Skip => self.backend.event(event_type, value),
            Counters::Sample => self.backend.event_and_counters(event_type, value),
        }
        metrics::record_events(1);
        Ok(())
    }

    /// Emit every record of `batch` under a single timestamp.
    ///
    /// # Errors
    ///
    /// `NotInitialized` unless the tracer is initialized or suspended.
    /// `EmptyBatch` or `BatchTooLarge` for a batch the tracer cannot take.
    pub fn emit_event_batch(&self, batch: &EventBatch, counters: Counters) -> Result<()> {
        self.require_active()?;
        let marshalled = batch.marshal().map_err(|e| self.reject(e))?;
        trace!(len = marshalled.len(), ?counters, "event batch");
        match counters {
            Counters::Skip => self
                .backend
                .n_event(marshalled.types(), marshalled.values()),
            Counters::Sample => self
                .backend
                .n_event_and_counters(marshalled.types(), marshalled.values()),
        }
        metrics::record_batch();
        metrics::record_events(marshalled.len());
        Ok(())
    }

    /// Emit a routine entry (`true`) or exit (`false`) marker.
    ///
    /// Balance between entries and exits is not checked.
    ///
    /// # Errors
    ///
    /// `NotInitialized` unless the tracer is initialized or suspended.
    pub fn user_function(&self, entering: bool) -> Result<()> {
        self.require_active()?;
        trace!(entering, "user function");
        self.backend.user_function(entering);
        Ok(())
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Name an event type and, optionally, some of its values.
    ///
    /// # Errors
    ///
    /// `InvalidDescriptor` for empty or NUL-containing text, `NotInitialized` after `finish`.
    pub fn define_event(
        &self,
        event_type: EventType,
        description: &str,
        values: &[(EventValue, &str)],
    ) -> Result<()> {
        let descriptor =
            EventTypeDescriptor::new(event_type, description).values(values.iter().copied());
        self.register(&descriptor)
    }

    /// Register a prepared descriptor.
    ///
    /// # Errors
    ///
    /// `InvalidDescriptor` for empty or NUL-containing text, `NotInitialized` after `finish`.
    pub fn register(&self, descriptor: &EventTypeDescriptor) -> Result<()> {
        self.require_not_finalized()?;
        let m = descriptor.marshal().map_err(|e| self.reject(e))?;
        let descriptions: Vec<&CStr> = m.descriptions.iter().map(CString::as_c_str).collect();
        debug!(
            event_type = m.event_type,
            values = m.values.len(),
            "defining event type"
        );
        self.backend
            .define_event_type(m.event_type, &m.description, &m.values, &descriptions);
        Ok(())
    }

    // ========================================================================
    // Counters
    // ========================================================================

    /// Sample the active hardware counter set now.
    ///
    /// # Errors
    ///
    /// `NotInitialized` unless the tracer is initialized or suspended.
    pub fn counters(&self) -> Result<()> {
        self.require_active()?;
        self.backend.counters();
        Ok(())
    }

    /// Move to the previous counter set. Wraparound is up to the tracer.
    ///
    /// # Errors
    ///
    /// `NotInitialized` unless the tracer is initialized or suspended.
    pub fn previous_hwc_set(&self) -> Result<()> {
        self.require_active()?;
        self.backend.previous_hwc_set();
        Ok(())
    }

    /// Move to the next counter set. Wraparound is up to the tracer.
    ///
    /// # Errors
    ///
    /// `NotInitialized` unless the tracer is initialized or suspended.
    pub fn next_hwc_set(&self) -> Result<()> {
        self.require_active()?;
        self.backend.next_hwc_set();
        Ok(())
    }

    /// Sample network interface counters.
    ///
    /// Only meaningful on machines with the supported network hardware;
    /// elsewhere the tracer decides what happens.
    ///
    /// # Errors
    ///
    /// `NotInitialized` unless the tracer is initialized or suspended.
    pub fn network_counters(&self) -> Result<()> {
        self.require_active()?;
        self.backend.network_counters();
        Ok(())
    }

    /// Record routing information for `task`. Unknown ids are the tracer's
    /// to reject.
    ///
    /// # Errors
    ///
    /// `InvalidTask` if `task` does not fit a C int, `NotInitialized` after
    /// `finish`.
    pub fn network_routes(&self, task: u32) -> Result<()> {
        self.require_not_finalized()?;
        let raw = c_int::try_from(task).map_err(|_| self.reject(Error::InvalidTask(task)))?;
        self.backend.network_routes(raw);
        Ok(())
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Restrict tracing to tasks `start..=stop`.
    ///
    /// Only affects tasks that have not emitted events yet.
    ///
    /// # Errors
    ///
    /// `InvalidRange` if the range is inverted, `NotInitialized` after `finish`.
    pub fn set_tracing_tasks(&self, tasks: RangeInclusive<u32>) -> Result<()> {
        let range = TaskRange::try_from(tasks).map_err(|e| self.reject(e))?;
        self.set_tracing_range(range)
    }

    /// Same as `set_tracing_tasks` with an already validated range.
    ///
    /// # Errors
    ///
    /// `NotInitialized` after `finish`.
    pub fn set_tracing_range(&self, range: TaskRange) -> Result<()> {
        self.require_not_finalized()?;
        debug!(start = range.start(), stop = range.stop(), "setting tracing tasks");
        self.backend.set_tracing_tasks(range.start(), range.stop());
        Ok(())
    }

    /// Replace the active runtime options.
    ///
    /// # Errors
    ///
    /// `NotInitialized` after `finish`.
    pub fn set_options(&self, options: Options) -> Result<()> {
        self.require_not_finalized()?;
        debug!(%options, "setting tracer options");
        self.backend.set_options(options.to_raw());
        Ok(())
    }

    /// Replace the active runtime options from a raw mask.
    ///
    /// Masks with bits outside the named flags are rejected, not truncated.
    ///
    /// # Errors
    ///
    /// `InvalidOptionMask` for unknown bits, `NotInitialized` after `finish`.
    pub fn set_option_mask(&self, mask: u32) -> Result<()> {
        let options = Options::from_mask(mask).map_err(|e| self.reject(e))?;
        self.set_options(options)
    }

    // ========================================================================
    // Checks
    // ========================================================================

    fn require_active(&self) -> Result<()> {
        let state = self.state.load();
        if state.is_active() {
            Ok(())
        } else {
            Err(self.reject(Error::NotInitialized { state }))
        }
    }

    fn require_not_finalized(&self) -> Result<()> {
        let state = self.state.load();
        if state == InitializationState::Finalized {
            Err(self.reject(Error::NotInitialized { state }))
        } else {
            Ok(())
        }
    }

    fn reject(&self, err: Error) -> Error {
        debug!(error = %err, state = %self.state.load(), "call rejected");
        metrics::record_rejection(err.reason());
        err
    }
}

impl<B: Backend + 'static> Tracer<B> {
    /// Erase the backend type, e.g. to `install` a recording tracer.
    #[must_use]
    pub fn boxed(self) -> Tracer<Box<dyn Backend>> {
        Tracer {
            backend: Box::new(self.backend),
            state: self.state,
            strictness: self.strictness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Call, Recording};

    fn tracer() -> Tracer<Recording> {
        Tracer::with_backend(Recording::new())
    }

    #[test]
    fn test_rejected_calls_do_not_reach_backend() {
        let t = tracer();
        assert!(t.flush().is_err());
        assert!(t.counters().is_err());
        assert!(t.emit_event(1, 1, Counters::Skip).is_err());
        assert!(t.user_function(true).is_err());
        assert!(t.instrumentation(false).is_err());
        assert!(t.backend().calls().is_empty());
    }

    #[test]
    fn test_reinit_forwards_and_keeps_state() {
        let t = tracer();
        t.init().unwrap();
        t.init().unwrap();
        assert_eq!(t.state(), InitializationState::Initialized);
        assert_eq!(t.backend().calls(), vec![Call::Init, Call::Init]);
    }

    #[test]
    fn test_instrumentation_toggles_suspended() {
        let t = tracer();
        t.init().unwrap();
        t.instrumentation(false).unwrap();
        assert_eq!(t.state(), InitializationState::Suspended);
        t.emit_event(5, 1, Counters::Skip).unwrap();
        t.instrumentation(true).unwrap();
        assert_eq!(t.state(), InitializationState::Initialized);
        assert_eq!(
            t.backend().take_calls(),
            vec![
                Call::Init,
                Call::Shutdown,
                Call::Event {
                    event_type: 5,
                    value: 1,
                    counters: false
                },
                Call::Restart,
            ]
        );
    }

    #[test]
    fn test_repeated_toggle_keeps_state() {
        let t = tracer();
        t.init().unwrap();
        t.instrumentation(true).unwrap();
        assert_eq!(t.state(), InitializationState::Initialized);
        t.instrumentation(false).unwrap();
        t.instrumentation(false).unwrap();
        assert_eq!(t.state(), InitializationState::Suspended);
        assert_eq!(
            t.backend().take_calls(),
            vec![Call::Init, Call::Restart, Call::Shutdown, Call::Shutdown]
        );
    }

    #[test]
    fn test_finish_from_suspended() {
        let t = tracer();
        t.init().unwrap();
        t.instrumentation(false).unwrap();
        t.finish().unwrap();
        assert_eq!(t.state(), InitializationState::Finalized);
    }

    #[test]
    fn test_counter_sampling_targets() {
        let t = tracer();
        t.init().unwrap();
        t.backend().take_calls();

        t.emit_event(1, 2, Counters::Sample).unwrap();
        let batch: EventBatch = [(3, 4)].into_iter().collect();
        t.emit_event_batch(&batch, Counters::Sample).unwrap();
        t.emit_event_batch(&batch, Counters::Skip).unwrap();

        assert_eq!(
            t.backend().calls(),
            vec![
                Call::Event {
                    event_type: 1,
                    value: 2,
                    counters: true
                },
                Call::NEvent {
                    types: vec![3],
                    values: vec![4],
                    counters: true
                },
                Call::NEvent {
                    types: vec![3],
                    values: vec![4],
                    counters: false
                },
            ]
        );
    }

    #[test]
    fn test_adopt_mpi_initialized_tracer() {
        let t = tracer();
        t.backend()
            .initialized_by(extrae_sys::EXTRAE_INITIALIZED_MPI_INIT);
        assert_eq!(t.adopt().unwrap(), InitMechanism::MpiInit);
        assert_eq!(t.state(), InitializationState::Initialized);
        assert!(t.backend().calls().is_empty());
        t.emit_event(1, 1, Counters::Skip).unwrap();
    }

    #[test]
    fn test_adopt_without_running_tracer() {
        let t = tracer();
        assert_eq!(t.adopt().unwrap(), InitMechanism::NotInitialized);
        assert_eq!(t.state(), InitializationState::Uninitialized);
    }

    #[test]
    fn test_config_calls_before_init() {
        let t = tracer();
        t.set_options(Options::HWC).unwrap();
        t.set_tracing_tasks(0..=3).unwrap();
        t.define_event(1000, "loop", &[]).unwrap();
        t.network_routes(2).unwrap();
        assert_eq!(t.backend().calls().len(), 4);
    }

    #[test]
    fn test_config_calls_after_finish() {
        let t = tracer();
        t.init().unwrap();
        t.finish().unwrap();
        t.backend().take_calls();

        assert!(matches!(
            t.set_options(Options::HWC),
            Err(Error::NotInitialized { .. })
        ));
        assert!(t.set_tracing_tasks(0..=1).is_err());
        assert!(t.define_event(1, "x", &[]).is_err());
        assert!(t.network_routes(0).is_err());
        assert!(t.backend().calls().is_empty());
    }

    #[test]
    fn test_boxed_keeps_state() {
        let t = tracer();
        t.init().unwrap();
        let boxed = t.boxed();
        assert_eq!(boxed.state(), InitializationState::Initialized);
        boxed.flush().unwrap();
    }
}
