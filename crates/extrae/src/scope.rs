//! RAII guards for paired enter/leave events.

use tracing::debug;

use crate::{Backend, Counters, EventType, EventValue, Result, Tracer};

/// Emits `(type, value)` on creation and `(type, 0)` on drop.
#[must_use = "the leave event is emitted when the scope is dropped"]
pub struct EventScope<'a, B: Backend> {
    tracer: &'a Tracer<B>,
    event_type: EventType,
}

impl<B: Backend> Drop for EventScope<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.tracer.emit_event(self.event_type, 0, Counters::Skip) {
            debug!(error = %e, event_type = self.event_type, "leave event dropped");
        }
    }
}

/// Emits a routine entry marker on creation and the exit marker on drop.
#[must_use = "the exit marker is emitted when the scope is dropped"]
pub struct RoutineScope<'a, B: Backend> {
    tracer: &'a Tracer<B>,
}

impl<B: Backend> Drop for RoutineScope<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.tracer.user_function(false) {
            debug!(error = %e, "routine exit marker dropped");
        }
    }
}

impl<B: Backend> Tracer<B> {
    /// Enter `value` of `event_type` until the returned guard is dropped.
    ///
    /// `value` should be non-zero; zero is the leave marker.
    ///
    /// # Errors
    ///
    /// Same as `emit_event`.
    pub fn event_scope(
        &self,
        event_type: EventType,
        value: EventValue,
    ) -> Result<EventScope<'_, B>> {
        self.emit_event(event_type, value, Counters::Skip)?;
        Ok(EventScope {
            tracer: self,
            event_type,
        })
    }

    /// Mark a routine entry until the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Same as `user_function`.
    pub fn routine_scope(&self) -> Result<RoutineScope<'_, B>> {
        self.user_function(true)?;
        Ok(RoutineScope { tracer: self })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Call, Recording, Tracer};

    #[test]
    fn test_event_scope_emits_leave() {
        let t = Tracer::with_backend(Recording::new());
        t.init().unwrap();
        {
            let _outer = t.event_scope(1000, 1).unwrap();
            let _inner = t.event_scope(2000, 5).unwrap();
        }
        assert_eq!(
            t.backend().events(),
            vec![(1000, 1), (2000, 5), (2000, 0), (1000, 0)]
        );
    }

    #[test]
    fn test_routine_scope_markers() {
        let t = Tracer::with_backend(Recording::new());
        t.init().unwrap();
        t.backend().take_calls();
        drop(t.routine_scope().unwrap());
        assert_eq!(
            t.backend().calls(),
            vec![
                Call::UserFunction { enter: true },
                Call::UserFunction { enter: false }
            ]
        );
    }

    #[test]
    fn test_scope_refused_before_init() {
        let t = Tracer::with_backend(Recording::new());
        assert!(t.event_scope(1, 1).is_err());
        assert!(t.routine_scope().is_err());
        assert!(t.backend().calls().is_empty());
    }
}
