use alloc::string::String;
use alloc::vec::Vec;

use crate::error::Error;
use crate::matcher::EventMatcher;
use crate::types::event::Event;

/// Matches events of a given kind whose attributes have the expected values.
///
/// Values are compared byte for byte. An expected attribute that is absent
/// from the event is a mismatch, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeMatcher {
    kind: String,
    expected: Vec<(String, Vec<u8>)>,
}

impl AttributeMatcher {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            expected: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.expected.push((key.into(), value.into()));
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl EventMatcher for AttributeMatcher {
    fn try_match(&self, event: &Event) -> Result<bool, Error> {
        if !event.is_kind(&self.kind) {
            return Ok(false);
        }

        let all_equal = self
            .expected
            .iter()
            .all(|(key, value)| event.attribute(key) == Some(value.as_slice()));

        Ok(all_equal)
    }

    fn describe(&self) -> String {
        let conditions = self
            .expected
            .iter()
            .map(|(key, value)| format!("{}.{}={}", self.kind, key, String::from_utf8_lossy(value)))
            .collect::<Vec<_>>();

        if conditions.is_empty() {
            format!("event `{}`", self.kind)
        } else {
            conditions.join(" AND ")
        }
    }
}
