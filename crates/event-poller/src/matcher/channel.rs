//! Matching the last step of a channel handshake.

use alloc::string::String;

use crate::error::Error;
use crate::matcher::EventMatcher;
use crate::types::event::Event;
use crate::types::id::{ChainId, ChannelId, ConnectionId, PortId};

pub const CHANNEL_OPEN_CONFIRM_EVENT: &str = "channel_open_confirm";

pub const PORT_ID_ATTRIBUTE_KEY: &str = "port_id";
pub const CHANNEL_ID_ATTRIBUTE_KEY: &str = "channel_id";
pub const CONNECTION_ID_ATTRIBUTE_KEY: &str = "connection_id";
pub const COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY: &str = "counterparty_port_id";
pub const COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY: &str = "counterparty_channel_id";
pub const COUNTERPARTY_CHAIN_ID_ATTRIBUTE_KEY: &str = "counterparty_chain_id";

/// Matches a `channel_open_confirm` event for a channel whose counterparty
/// lives on the given chain.
///
/// This is how the creation of an interchain account channel is observed on
/// the host chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelOpenConfirmMatcher {
    counterparty_chain_id: ChainId,
}

impl ChannelOpenConfirmMatcher {
    pub fn new(counterparty_chain_id: ChainId) -> Self {
        Self {
            counterparty_chain_id,
        }
    }
}

impl EventMatcher for ChannelOpenConfirmMatcher {
    fn try_match(&self, event: &Event) -> Result<bool, Error> {
        if !event.is_kind(CHANNEL_OPEN_CONFIRM_EVENT) {
            return Ok(false);
        }

        let chain_id = event.require_str(COUNTERPARTY_CHAIN_ID_ATTRIBUTE_KEY)?;

        Ok(chain_id == self.counterparty_chain_id.as_str())
    }

    fn describe(&self) -> String {
        format!(
            "channel open confirmation with counterparty chain {}",
            self.counterparty_chain_id
        )
    }
}

/// The channel ends carried by a `channel_open_confirm` event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelOpenConfirmed {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub connection_id: ConnectionId,
    pub counterparty_port_id: PortId,
    pub counterparty_channel_id: ChannelId,
    pub counterparty_chain_id: ChainId,
}

impl TryFrom<&Event> for ChannelOpenConfirmed {
    type Error = Error;

    fn try_from(event: &Event) -> Result<Self, Error> {
        Ok(Self {
            port_id: event.require_str(PORT_ID_ATTRIBUTE_KEY)?.into(),
            channel_id: event.require_str(CHANNEL_ID_ATTRIBUTE_KEY)?.into(),
            connection_id: event.require_str(CONNECTION_ID_ATTRIBUTE_KEY)?.into(),
            counterparty_port_id: event.require_str(COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY)?.into(),
            counterparty_channel_id: event
                .require_str(COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY)?
                .into(),
            counterparty_chain_id: event.require_str(COUNTERPARTY_CHAIN_ID_ATTRIBUTE_KEY)?.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_confirm(counterparty_chain_id: &str) -> Event {
        Event::new(CHANNEL_OPEN_CONFIRM_EVENT)
            .with_attribute(PORT_ID_ATTRIBUTE_KEY, "icahost")
            .with_attribute(CHANNEL_ID_ATTRIBUTE_KEY, "channel-1")
            .with_attribute(CONNECTION_ID_ATTRIBUTE_KEY, "connection-0")
            .with_attribute(
                COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY,
                "icacontroller-GAIA.DELEGATION",
            )
            .with_attribute(COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY, "channel-1")
            .with_attribute(COUNTERPARTY_CHAIN_ID_ATTRIBUTE_KEY, counterparty_chain_id)
    }

    #[test]
    fn matches_counterparty_chain() {
        let matcher = ChannelOpenConfirmMatcher::new("stride-1".into());

        assert!(matcher.matches(&open_confirm("stride-1")));
        assert!(!matcher.matches(&open_confirm("osmosis-1")));
    }

    #[test]
    fn missing_counterparty_is_a_decode_error() {
        let matcher = ChannelOpenConfirmMatcher::new("stride-1".into());
        let event = Event::new(CHANNEL_OPEN_CONFIRM_EVENT).with_attribute("port_id", "icahost");

        assert!(matcher.try_match(&event).unwrap_err().is_decode());
    }

    #[test]
    fn decode_channel_ends() {
        let confirmed = ChannelOpenConfirmed::try_from(&open_confirm("stride-1")).unwrap();

        assert_eq!(confirmed.port_id.as_str(), "icahost");
        assert_eq!(
            confirmed.counterparty_port_id.as_str(),
            "icacontroller-GAIA.DELEGATION"
        );
        assert_eq!(confirmed.counterparty_chain_id.as_str(), "stride-1");
    }
}
