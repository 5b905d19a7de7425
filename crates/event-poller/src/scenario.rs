/*!
   Polls for the events relayer end-to-end tests commonly wait on.

   Each helper starts at the current height of the chain and scans
   `lookahead` heights past it, with the deadline of the poller's
   configuration. The matched event is decoded into its typed form.
*/

use tracing::info;

use crate::error::Error;
use crate::matcher::{
    AckMatcher, AcknowledgedPacket, ChannelOpenConfirmMatcher, ChannelOpenConfirmed,
    EventMatcher, QueryResponseSubmitted, SubmitQueryResponseMatcher,
};
use crate::poller::{EventPoller, PolledEvent};
use crate::source::BlockSource;
use crate::types::id::ChainId;
use crate::types::packet::Packet;

/// Poll from the current height of the chain up to `lookahead` heights past it.
pub async fn poll_from_current<Source, Matcher>(
    poller: &EventPoller<'_, Source>,
    lookahead: u64,
    matcher: Matcher,
) -> Result<PolledEvent, Error>
where
    Source: BlockSource,
    Matcher: EventMatcher,
{
    let request = poller.request_from_current(lookahead, matcher).await?;
    poller.poll(request).await
}

/// Wait for the acknowledgement of `packet` on its source chain.
pub async fn poll_for_ack<Source>(
    poller: &EventPoller<'_, Source>,
    packet: &Packet,
    lookahead: u64,
) -> Result<AcknowledgedPacket, Error>
where
    Source: BlockSource,
{
    let polled = poll_from_current(poller, lookahead, AckMatcher::for_packet(packet)).await?;
    let ack = AcknowledgedPacket::try_from(polled.event())?;

    info!(
        chain = %poller.source().chain_id(),
        height = %polled.tx.height,
        "packet {} was acknowledged", packet
    );

    Ok(ack)
}

/// Wait for a channel with `counterparty_chain_id` to complete its opening
/// handshake, such as an interchain account channel.
pub async fn poll_for_channel_open_confirm<Source>(
    poller: &EventPoller<'_, Source>,
    counterparty_chain_id: &ChainId,
    lookahead: u64,
) -> Result<ChannelOpenConfirmed, Error>
where
    Source: BlockSource,
{
    let matcher = ChannelOpenConfirmMatcher::new(counterparty_chain_id.clone());
    let polled = poll_from_current(poller, lookahead, matcher).await?;
    let confirmed = ChannelOpenConfirmed::try_from(polled.event())?;

    info!(
        chain = %poller.source().chain_id(),
        height = %polled.tx.height,
        "channel {}/{} to chain {} is open",
        confirmed.port_id, confirmed.channel_id, counterparty_chain_id
    );

    Ok(confirmed)
}

/// Wait for an interchain query response about `chain_id` to be submitted.
pub async fn poll_for_submit_query_response<Source>(
    poller: &EventPoller<'_, Source>,
    chain_id: &ChainId,
    lookahead: u64,
) -> Result<QueryResponseSubmitted, Error>
where
    Source: BlockSource,
{
    let matcher = SubmitQueryResponseMatcher::new(chain_id.clone());
    let polled = poll_from_current(poller, lookahead, matcher).await?;

    QueryResponseSubmitted::try_from(polled.event())
}
