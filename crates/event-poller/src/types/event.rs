use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Display, Error as FmtError, Formatter};
use core::str::FromStr;

use crate::error::Error;

/// A single `key = value` pair attached to an [`Event`].
///
/// Values are kept as raw bytes, as emitted by the chain. Decoding them into
/// strings or numbers is left to the matchers, since a malformed value must
/// only affect the event that carries it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventAttribute {
    pub key: String,
    pub value: Vec<u8>,
}

impl EventAttribute {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An ABCI event emitted while executing a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.attributes.push(EventAttribute::new(key, value));
        self
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// The raw value of the first attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&[u8]> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_slice())
    }

    /// The value of the first attribute named `key`, decoded as UTF-8.
    pub fn attribute_str(&self, key: &str) -> Result<Option<&str>, Error> {
        self.attribute(key)
            .map(|value| {
                core::str::from_utf8(value).map_err(|e| {
                    Error::invalid_utf8_attribute(self.kind.clone(), key.to_owned(), e)
                })
            })
            .transpose()
    }

    pub fn require_str(&self, key: &str) -> Result<&str, Error> {
        self.attribute_str(key)?
            .ok_or_else(|| Error::missing_attribute(self.kind.clone(), key.to_owned()))
    }

    pub fn require_parsed<T: FromStr>(&self, key: &str) -> Result<T, Error> {
        let value = self.require_str(key)?;

        value.parse().map_err(|_| {
            Error::invalid_attribute(self.kind.clone(), key.to_owned(), value.to_owned())
        })
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.kind)?;

        for attr in &self.attributes {
            write!(f, " {}={}", attr.key, String::from_utf8_lossy(&attr.value))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorDetail;

    fn event() -> Event {
        Event::new("acknowledge_packet")
            .with_attribute("packet_sequence", "3")
            .with_attribute("packet_src_port", "transfer")
            .with_attribute("packet_src_port", "ignored")
            .with_attribute("packet_data_hex", vec![0xff, 0xfe])
    }

    #[test]
    fn first_attribute_wins() {
        assert_eq!(
            event().attribute_str("packet_src_port").unwrap(),
            Some("transfer")
        );
    }

    #[test]
    fn missing_attribute() {
        let event = event();

        assert_eq!(event.attribute_str("packet_dst_port").unwrap(), None);

        let err = event.require_str("packet_dst_port").unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::MissingAttribute(_)));
        assert!(err.is_decode());
    }

    #[test]
    fn invalid_utf8_attribute() {
        let err = event().attribute_str("packet_data_hex").unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::InvalidUtf8Attribute(_)));
    }

    #[test]
    fn parse_attribute() {
        let event = event();

        assert_eq!(event.require_parsed::<u64>("packet_sequence").unwrap(), 3);

        let err = event.require_parsed::<u64>("packet_src_port").unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::InvalidAttribute(_)));
    }
}
