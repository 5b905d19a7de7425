//! Matching packet acknowledgements.

use alloc::string::String;

use crate::error::Error;
use crate::matcher::EventMatcher;
use crate::types::event::Event;
use crate::types::id::{ChannelId, ConnectionId, PortId};
use crate::types::packet::{Packet, Sequence};

pub const ACKNOWLEDGE_PACKET_EVENT: &str = "acknowledge_packet";

pub const PKT_SEQ_ATTRIBUTE_KEY: &str = "packet_sequence";
pub const PKT_SRC_PORT_ATTRIBUTE_KEY: &str = "packet_src_port";
pub const PKT_SRC_CHANNEL_ATTRIBUTE_KEY: &str = "packet_src_channel";
pub const PKT_DST_PORT_ATTRIBUTE_KEY: &str = "packet_dst_port";
pub const PKT_DST_CHANNEL_ATTRIBUTE_KEY: &str = "packet_dst_channel";
pub const PKT_CONNECTION_ATTRIBUTE_KEY: &str = "packet_connection";

/// Matches the `acknowledge_packet` event emitted on the source chain once
/// the acknowledgement of `packet` has been relayed back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AckMatcher {
    source_port: PortId,
    source_channel: ChannelId,
    sequence: Sequence,
}

impl AckMatcher {
    pub fn new(source_port: PortId, source_channel: ChannelId, sequence: Sequence) -> Self {
        Self {
            source_port,
            source_channel,
            sequence,
        }
    }

    pub fn for_packet(packet: &Packet) -> Self {
        Self::new(
            packet.source_port.clone(),
            packet.source_channel.clone(),
            packet.sequence,
        )
    }
}

impl EventMatcher for AckMatcher {
    fn try_match(&self, event: &Event) -> Result<bool, Error> {
        if !event.is_kind(ACKNOWLEDGE_PACKET_EVENT) {
            return Ok(false);
        }

        let sequence: Sequence = event.require_parsed(PKT_SEQ_ATTRIBUTE_KEY)?;
        let port = event.require_str(PKT_SRC_PORT_ATTRIBUTE_KEY)?;
        let channel = event.require_str(PKT_SRC_CHANNEL_ATTRIBUTE_KEY)?;

        Ok(sequence == self.sequence
            && port == self.source_port.as_str()
            && channel == self.source_channel.as_str())
    }

    fn describe(&self) -> String {
        format!(
            "acknowledgement of packet {}/{}#{}",
            self.source_port, self.source_channel, self.sequence
        )
    }
}

/// The packet fields carried by an `acknowledge_packet` event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcknowledgedPacket {
    pub sequence: Sequence,
    pub source_port: PortId,
    pub source_channel: ChannelId,
    pub destination_port: PortId,
    pub destination_channel: ChannelId,
    pub connection_id: Option<ConnectionId>,
}

impl TryFrom<&Event> for AcknowledgedPacket {
    type Error = Error;

    fn try_from(event: &Event) -> Result<Self, Error> {
        Ok(Self {
            sequence: event.require_parsed(PKT_SEQ_ATTRIBUTE_KEY)?,
            source_port: event.require_str(PKT_SRC_PORT_ATTRIBUTE_KEY)?.into(),
            source_channel: event.require_str(PKT_SRC_CHANNEL_ATTRIBUTE_KEY)?.into(),
            destination_port: event.require_str(PKT_DST_PORT_ATTRIBUTE_KEY)?.into(),
            destination_channel: event.require_str(PKT_DST_CHANNEL_ATTRIBUTE_KEY)?.into(),
            connection_id: event
                .attribute_str(PKT_CONNECTION_ATTRIBUTE_KEY)?
                .map(ConnectionId::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ack_event(sequence: &str) -> Event {
        Event::new(ACKNOWLEDGE_PACKET_EVENT)
            .with_attribute(PKT_SEQ_ATTRIBUTE_KEY, sequence)
            .with_attribute(PKT_SRC_PORT_ATTRIBUTE_KEY, "transfer")
            .with_attribute(PKT_SRC_CHANNEL_ATTRIBUTE_KEY, "channel-0")
            .with_attribute(PKT_DST_PORT_ATTRIBUTE_KEY, "transfer")
            .with_attribute(PKT_DST_CHANNEL_ATTRIBUTE_KEY, "channel-1")
            .with_attribute(PKT_CONNECTION_ATTRIBUTE_KEY, "connection-0")
    }

    fn matcher(sequence: u64) -> AckMatcher {
        AckMatcher::new("transfer".into(), "channel-0".into(), Sequence::new(sequence))
    }

    #[test]
    fn matches_same_packet() {
        assert!(matcher(3).matches(&ack_event("3")));
        assert!(!matcher(4).matches(&ack_event("3")));
    }

    #[test]
    fn ignores_other_channels() {
        let matcher = AckMatcher::new("transfer".into(), "channel-7".into(), Sequence::new(3));
        assert!(!matcher.matches(&ack_event("3")));
    }

    #[test]
    fn ignores_other_event_kinds() {
        let mut event = ack_event("3");
        event.kind = "recv_packet".into();

        assert!(!matcher(3).try_match(&event).unwrap());
    }

    #[test]
    fn malformed_sequence_is_a_decode_error() {
        let err = matcher(3).try_match(&ack_event("three")).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn for_packet_uses_source_end() {
        let packet = Packet {
            sequence: Sequence::new(3),
            source_port: "transfer".into(),
            source_channel: "channel-0".into(),
            destination_port: "transfer".into(),
            destination_channel: "channel-1".into(),
        };

        assert_eq!(AckMatcher::for_packet(&packet), matcher(3));
    }

    #[test]
    fn decode_acknowledged_packet() {
        let packet = AcknowledgedPacket::try_from(&ack_event("3")).unwrap();

        assert_eq!(packet.sequence, Sequence::new(3));
        assert_eq!(packet.destination_channel.as_str(), "channel-1");
        assert_eq!(packet.connection_id, Some("connection-0".into()));
    }
}
