//! Event records and batch marshalling.

use std::ffi::c_uint;

use crate::{Error, Result};

/// Category of an instrumentation point.
///
/// Uniqueness is up to the caller; two subsystems using the same type id
/// produce a confusing trace, not a failure.
pub type EventType = u32;

/// Payload attached to an event. `0` conventionally marks "leave".
pub type EventValue = u64;

/// Whether the active hardware counter set is sampled with the event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Counters {
    #[default]
    Skip,
    Sample,
}

/// One `(type, value)` pair. The timestamp is assigned by the tracer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventRecord {
    pub event_type: EventType,
    pub value: EventValue,
}

impl EventRecord {
    #[must_use]
    pub const fn new(event_type: EventType, value: EventValue) -> Self {
        Self { event_type, value }
    }
}

impl From<(EventType, EventValue)> for EventRecord {
    fn from((event_type, value): (EventType, EventValue)) -> Self {
        Self::new(event_type, value)
    }
}

/// Events emitted together under one timestamp, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventBatch {
    records: Vec<EventRecord>,
}

impl EventBatch {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a record; chainable.
    pub fn push(&mut self, event_type: EventType, value: EventValue) -> &mut Self {
        self.records.push(EventRecord::new(event_type, value));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Split into the parallel `types` / `values` arrays the tracer expects.
    ///
    /// Fails on an empty batch, since the tracer's multi-event call is not
    /// safe with a zero count, and on a batch too long for its 32-bit count.
    ///
    /// # Errors
    ///
    /// `EmptyBatch` for an empty batch, `BatchTooLarge` past `u32::MAX` records.
    pub fn marshal(&self) -> Result<MarshalledBatch> {
        if self.records.is_empty() {
            return Err(Error::EmptyBatch);
        }
        check_count(self.records.len())?;

        let (types, values) = self
            .records
            .iter()
            .map(|r| (r.event_type, r.value))
            .unzip();
        Ok(MarshalledBatch { types, values })
    }
}

impl<R: Into<EventRecord>> FromIterator<R> for EventBatch {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<R: Into<EventRecord>> Extend<R> for EventBatch {
    fn extend<I: IntoIterator<Item = R>>(&mut self, iter: I) {
        self.records.extend(iter.into_iter().map(Into::into));
    }
}

/// A batch laid out as two index-aligned arrays of equal length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarshalledBatch {
    types: Vec<EventType>,
    values: Vec<EventValue>,
}

impl MarshalledBatch {
    #[must_use]
    pub fn types(&self) -> &[EventType] {
        &self.types
    }

    #[must_use]
    pub fn values(&self) -> &[EventValue] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Never true for a batch built by `EventBatch::marshal`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Reject lengths that do not fit the tracer's `unsigned` count argument.
pub(crate) fn check_count(len: usize) -> Result<c_uint> {
    c_uint::try_from(len).map_err(|_| Error::BatchTooLarge(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_preserves_order() {
        let mut batch = EventBatch::new();
        batch.push(1000, 1).push(2000, 7).push(1000, 0);

        let m = batch.marshal().unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(m.types(), &[1000, 2000, 1000]);
        assert_eq!(m.values(), &[1, 7, 0]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(
            EventBatch::new().marshal(),
            Err(Error::EmptyBatch)
        ));
    }

    #[test]
    fn test_collect_from_pairs() {
        let batch: EventBatch = [(10u32, 1u64), (11, 2)].into_iter().collect();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records()[1], EventRecord::new(11, 2));

        let mut batch = batch;
        batch.extend([EventRecord::new(12, 3)]);
        assert_eq!(batch.marshal().unwrap().types(), &[10, 11, 12]);
    }

    #[test]
    fn test_check_count_limit() {
        assert_eq!(check_count(5).unwrap(), 5);
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            check_count(usize::MAX),
            Err(Error::BatchTooLarge(n)) if n == usize::MAX
        ));
    }
}
