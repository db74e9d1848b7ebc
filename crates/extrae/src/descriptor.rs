//! Human-readable names for event types and values.
//!
//! Descriptors end up in the `.pcf` file the visualizer reads next to the
//! trace. They do not change the recorded events.

use std::ffi::CString;

use crate::event::check_count;
use crate::{Error, EventType, EventValue, Result};

/// Name for an event type, plus optional names for its values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventTypeDescriptor {
    event_type: EventType,
    description: String,
    values: Vec<(EventValue, String)>,
}

impl EventTypeDescriptor {
    #[must_use]
    pub fn new(event_type: EventType, description: impl Into<String>) -> Self {
        Self {
            event_type,
            description: description.into(),
            values: Vec::new(),
        }
    }

    /// Name one value of this type.
    #[must_use]
    pub fn value(mut self, value: EventValue, description: impl Into<String>) -> Self {
        self.values.push((value, description.into()));
        self
    }

    #[must_use]
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (EventValue, S)>,
        S: Into<String>,
    {
        self.values
            .extend(values.into_iter().map(|(v, d)| (v, d.into())));
        self
    }

    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Validate and convert to C strings.
    ///
    /// The visualizer reads an empty description as "unset", so empty
    /// strings are rejected along with interior NUL bytes.
    ///
    /// # Errors
    ///
    /// `InvalidDescriptor` for empty or NUL-containing text, `BatchTooLarge`
    /// if the value list does not fit a 32-bit count.
    pub fn marshal(&self) -> Result<MarshalledDescriptor> {
        let description = to_c_string(&self.description, || {
            format!("event type {}", self.event_type)
        })?;
        check_count(self.values.len())?;

        let mut values = Vec::with_capacity(self.values.len());
        let mut descriptions = Vec::with_capacity(self.values.len());
        for (value, text) in &self.values {
            descriptions.push(to_c_string(text, || {
                format!("value {value} of event type {}", self.event_type)
            })?);
            values.push(*value);
        }

        Ok(MarshalledDescriptor {
            event_type: self.event_type,
            description,
            values,
            descriptions,
        })
    }
}

fn to_c_string(text: &str, what: impl Fn() -> String) -> Result<CString> {
    if text.is_empty() {
        return Err(Error::InvalidDescriptor(format!(
            "empty description for {}",
            what()
        )));
    }
    CString::new(text).map_err(|_| {
        Error::InvalidDescriptor(format!("description for {} contains a NUL byte", what()))
    })
}

/// A descriptor ready to cross the boundary: values and their descriptions
/// as two index-aligned arrays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarshalledDescriptor {
    pub(crate) event_type: EventType,
    pub(crate) description: CString,
    pub(crate) values: Vec<EventValue>,
    pub(crate) descriptions: Vec<CString>,
}

impl MarshalledDescriptor {
    #[must_use]
    pub fn values(&self) -> &[EventValue] {
        &self.values
    }

    #[must_use]
    pub fn descriptions(&self) -> &[CString] {
        &self.descriptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_aligned_values() {
        let d = EventTypeDescriptor::new(1000, "loop")
            .value(0, "end")
            .value(1, "iteration");
        let m = d.marshal().unwrap();
        assert_eq!(m.description.to_str().unwrap(), "loop");
        assert_eq!(m.values(), &[0, 1]);
        assert_eq!(m.descriptions()[1].to_str().unwrap(), "iteration");
    }

    #[test]
    fn test_type_without_values() {
        let m = EventTypeDescriptor::new(7, "phase").marshal().unwrap();
        assert!(m.values().is_empty());
        assert!(m.descriptions().is_empty());
    }

    #[test]
    fn test_empty_type_description() {
        let err = EventTypeDescriptor::new(1000, "").marshal().unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(_)));
        assert!(err.to_string().contains("event type 1000"));
    }

    #[test]
    fn test_empty_value_description() {
        let err = EventTypeDescriptor::new(1000, "loop")
            .values([(0, ""), (1, "body")])
            .marshal()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(msg) if msg.contains("value 0")));
    }

    #[test]
    fn test_nul_byte_rejected() {
        let err = EventTypeDescriptor::new(3, "a\0b").marshal().unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(msg) if msg.contains("NUL")));
    }
}
