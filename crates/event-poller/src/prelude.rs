//! Re-exports of the types most tests need to poll for events.

pub use crate::config::{ChainConfig, Config, PollConfig};
pub use crate::error::{Error, ErrorDetail};
pub use crate::matcher::{
    AckMatcher, AcknowledgedPacket, AttributeMatcher, ChannelOpenConfirmMatcher,
    ChannelOpenConfirmed, EventMatcher, QueryResponseSubmitted, SubmitQueryResponseMatcher,
};
pub use crate::poller::{EventPoller, PollRequest, PolledEvent};
pub use crate::scenario::{
    poll_for_ack, poll_for_channel_open_confirm, poll_for_submit_query_response,
    poll_from_current,
};
pub use crate::source::{BlockSource, MockBlockSource, RpcBlockSource, SourceError};
pub use crate::types::event::{Event, EventAttribute};
pub use crate::types::height::{BlockHeight, HeightRange};
pub use crate::types::id::{ChainId, ChannelId, ConnectionId, PortId};
pub use crate::types::packet::{Packet, Sequence};
pub use crate::types::tx::TxResult;
pub use crate::util::assert::{assert_not_observed, assert_observed};
