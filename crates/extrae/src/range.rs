//! Task selection for `Extrae_set_tracing_tasks`.

use std::ops::RangeInclusive;

use crate::{Error, Result};

/// Inclusive interval of task ids selected for tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskRange {
    start: u32,
    stop: u32,
}

impl TaskRange {
    /// `start == stop` selects a single task.
    ///
    /// # Errors
    ///
    /// `InvalidRange` if `start > stop`.
    pub const fn new(start: u32, stop: u32) -> Result<Self> {
        if start > stop {
            return Err(Error::InvalidRange { start, stop });
        }
        Ok(Self { start, stop })
    }

    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    #[must_use]
    pub const fn stop(self) -> u32 {
        self.stop
    }

    #[must_use]
    pub const fn contains(self, task: u32) -> bool {
        self.start <= task && task <= self.stop
    }
}

impl TryFrom<RangeInclusive<u32>> for TaskRange {
    type Error = Error;

    fn try_from(range: RangeInclusive<u32>) -> Result<Self> {
        Self::new(*range.start(), *range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bounds() {
        let bounds = [
            (0, 0),
            (0, 1),
            (3, 3),
            (5, 100),
            (0, u32::MAX),
            (u32::MAX, u32::MAX),
        ];
        for (start, stop) in bounds {
            let r = TaskRange::new(start, stop).unwrap();
            assert_eq!((r.start(), r.stop()), (start, stop));
            assert!(r.contains(start) && r.contains(stop));
        }
    }

    #[test]
    fn test_inverted_bounds() {
        for (start, stop) in [(1, 0), (100, 5), (u32::MAX, 0), (u32::MAX, u32::MAX - 1)] {
            assert!(matches!(
                TaskRange::new(start, stop),
                Err(Error::InvalidRange { start: s, stop: e }) if s == start && e == stop
            ));
        }
    }

    #[test]
    fn test_from_range_inclusive() {
        assert_eq!(TaskRange::try_from(2..=4).unwrap(), TaskRange::new(2, 4).unwrap());
        #[allow(clippy::reversed_empty_ranges)]
        let inverted = 4..=2;
        assert!(TaskRange::try_from(inverted).is_err());
    }
}
