/*!
   Waiting for IBC events on a chain, one block at a time.

   This crate is used by relayer end-to-end tests to observe the effects of
   a relayer on the chains it connects: a packet getting acknowledged, a
   channel handshake completing, an interchain query response landing.

   An [`EventPoller`](poller::EventPoller) scans a range of block heights
   of a [`BlockSource`](source::BlockSource) for the first event accepted by
   an [`EventMatcher`](matcher::EventMatcher), waiting for heights that
   were not produced yet. The [`scenario`] module wraps the common cases,
   starting from the current height of the chain.

   ```no_run
   use ibc_event_poller::prelude::*;

   # async fn run() -> Result<(), Error> {
   let source = RpcBlockSource::new(
       "gaia-1".into(),
       "http://127.0.0.1:26657".parse().unwrap(),
       core::time::Duration::from_secs(10),
       None,
   )
   .map_err(|e| Error::chain_unavailable("gaia-1".into(), 1, e))?;

   let poller = EventPoller::new(&source, PollConfig::default());

   let packet = Packet {
       sequence: Sequence::new(3),
       source_port: "transfer".into(),
       source_channel: "channel-0".into(),
       destination_port: "transfer".into(),
       destination_channel: "channel-1".into(),
   };

   let ack = poll_for_ack(&poller, &packet, 10).await?;
   println!("packet {} acknowledged", ack.sequence);
   # Ok(())
   # }
   ```
*/

extern crate alloc;

pub mod config;
pub mod error;
pub mod init;
pub mod matcher;
pub mod poller;
pub mod prelude;
pub mod scenario;
pub mod source;
pub mod types;
pub mod util;
