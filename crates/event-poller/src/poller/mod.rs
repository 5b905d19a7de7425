/*!
   The block-range event poller.

   Given a [`BlockSource`], a range of heights and an [`EventMatcher`], the
   poller scans the heights in increasing order, waiting for each of them to
   be produced, and returns the first transaction containing a matching
   event. Heights are fetched at most once per poll.

   A poll ends in exactly one of the following states:

   - a [`PolledEvent`], the earliest match by height, then transaction
     index, then event order;
   - `Timeout`, once every height of the range was scanned without a match;
   - `Cancelled`, when the caller's deadline elapses or its cancellation
     token fires, at any suspension point;
   - `ChainUnavailable`, when the block source keeps failing for longer
     than the retry budget, or can never serve a height of the range.
*/

pub mod request;

use alloc::vec::Vec;
use core::future::Future;
use core::time::Duration;

use futures::future::try_join_all;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use crate::config::PollConfig;
use crate::error::Error;
use crate::matcher::EventMatcher;
use crate::source::{BlockSource, SourceError};
use crate::types::height::{BlockHeight, HeightRange};
use crate::types::tx::TxResult;
use crate::util::block_on::block_on;
use crate::util::retry::{Clamped, ExponentialGrowth};

pub use request::{PollRequest, PolledEvent};

/// Scans the blocks of one chain for matching events.
pub struct EventPoller<'a, Source> {
    source: &'a Source,
    config: PollConfig,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Interrupt {
    Cancelled,
    DeadlineElapsed,
}

/// Races every suspension point of a poll against its deadline and
/// cancellation token.
struct Interruptible<'r> {
    deadline: Instant,
    cancel: &'r CancellationToken,
}

impl Interruptible<'_> {
    fn check(&self) -> Result<(), Interrupt> {
        if self.cancel.is_cancelled() {
            Err(Interrupt::Cancelled)
        } else if Instant::now() >= self.deadline {
            Err(Interrupt::DeadlineElapsed)
        } else {
            Ok(())
        }
    }

    async fn run<F: Future>(&self, task: F) -> Result<F::Output, Interrupt> {
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => Err(Interrupt::Cancelled),
            _ = sleep_until(self.deadline) => Err(Interrupt::DeadlineElapsed),
            output = task => Ok(output),
        }
    }

    async fn sleep(&self, delay: Duration) -> Result<(), Interrupt> {
        self.run(sleep(delay)).await
    }
}

impl<'a, Source> EventPoller<'a, Source>
where
    Source: BlockSource,
{
    pub fn new(source: &'a Source, config: PollConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &'a Source {
        self.source
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// A request for `range`, due after the configured timeout.
    pub fn request<Matcher>(&self, range: HeightRange, matcher: Matcher) -> PollRequest<Matcher> {
        PollRequest::with_timeout(range, matcher, self.config.timeout)
    }

    /// A request starting at the current height of the chain and spanning
    /// `lookahead` more heights.
    pub async fn request_from_current<Matcher>(
        &self,
        lookahead: u64,
        matcher: Matcher,
    ) -> Result<PollRequest<Matcher>, Error> {
        let start = self
            .source
            .current_height()
            .await
            .map_err(|e| Error::chain_unavailable(self.source.chain_id().clone(), 1, e))?;

        Ok(self.request(HeightRange::with_lookahead(start, lookahead), matcher))
    }

    #[instrument(
        name = "event_poller.poll",
        level = "error",
        skip_all,
        fields(chain = %self.source.chain_id(), range = %request.range)
    )]
    pub async fn poll<Matcher>(&self, request: PollRequest<Matcher>) -> Result<PolledEvent, Error>
    where
        Matcher: EventMatcher,
    {
        let PollRequest {
            range,
            matcher,
            deadline,
            cancel,
        } = request;

        let chain_id = self.source.chain_id();
        let interruptible = Interruptible {
            deadline,
            cancel: &cancel,
        };

        let cancelled = |height: BlockHeight, interrupt: Interrupt| {
            debug!(%height, ?interrupt, "poll interrupted");
            Error::cancelled(
                chain_id.clone(),
                height,
                interrupt == Interrupt::DeadlineElapsed,
            )
        };

        debug!(matcher = %matcher.describe(), "polling for event");

        let mut cursor = range.start();
        let mut waiting = self.config.backoff();
        let mut retrying = self.config.backoff();
        let mut failures = 0;

        loop {
            interruptible.check().map_err(|i| cancelled(cursor, i))?;

            let latest = match interruptible
                .run(self.source.current_height())
                .await
                .map_err(|i| cancelled(cursor, i))?
            {
                Ok(latest) => latest,
                Err(e) => {
                    let delay = self.on_source_failure(e, &mut failures, &mut retrying)?;
                    interruptible
                        .sleep(delay)
                        .await
                        .map_err(|i| cancelled(cursor, i))?;

                    continue;
                }
            };

            if cursor > latest {
                // A healthy chain behind the cursor clears the failure budget
                failures = 0;
                retrying = self.config.backoff();

                let delay = self.next_delay(&mut waiting);
                trace!(height = %cursor, %latest, ?delay, "waiting for height to be produced");

                interruptible
                    .sleep(delay)
                    .await
                    .map_err(|i| cancelled(cursor, i))?;

                continue;
            }

            let txs = match interruptible
                .run(self.source.tx_results_at(cursor))
                .await
                .map_err(|i| cancelled(cursor, i))?
            {
                Ok(txs) => txs,
                Err(e) if e.is_not_produced() => {
                    let delay = self.next_delay(&mut waiting);
                    trace!(height = %cursor, ?delay, "height not served yet: {e}");

                    interruptible
                        .sleep(delay)
                        .await
                        .map_err(|i| cancelled(cursor, i))?;

                    continue;
                }
                Err(e) => {
                    let delay = self.on_source_failure(e, &mut failures, &mut retrying)?;
                    interruptible
                        .sleep(delay)
                        .await
                        .map_err(|i| cancelled(cursor, i))?;

                    continue;
                }
            };

            failures = 0;
            retrying = self.config.backoff();

            trace!(height = %cursor, txs = txs.len(), "scanning height");

            if let Some(found) = find_match(txs, &matcher) {
                debug!(
                    height = %found.tx.height,
                    tx = found.tx.index,
                    event = %found.event(),
                    "found matching event"
                );

                return Ok(found);
            }

            if cursor >= range.end() {
                break;
            }

            cursor = cursor.increment();
            waiting = self.config.backoff();
        }

        debug!("scanned every height without finding a matching event");

        Err(Error::timeout(chain_id.clone(), range.start(), range.end()))
    }

    /**
       Run several polls concurrently against the same source.

       Returns the matches in the order of the requests, or the first
       failure, in which case the remaining polls are dropped.
    */
    pub async fn poll_all<Matcher>(
        &self,
        requests: impl IntoIterator<Item = PollRequest<Matcher>>,
    ) -> Result<Vec<PolledEvent>, Error>
    where
        Matcher: EventMatcher,
    {
        try_join_all(requests.into_iter().map(|request| self.poll(request))).await
    }

    /// Run a poll to completion on a dedicated runtime, for synchronous callers.
    pub fn poll_blocking<Matcher>(
        &self,
        request: PollRequest<Matcher>,
    ) -> Result<PolledEvent, Error>
    where
        Matcher: EventMatcher,
    {
        block_on(self.poll(request))?
    }

    fn next_delay(&self, delays: &mut Clamped<ExponentialGrowth>) -> Duration {
        delays.next().unwrap_or(self.config.max_backoff)
    }

    /// Count a failed source query against the retry budget, and return how
    /// long to wait before trying again.
    fn on_source_failure(
        &self,
        error: SourceError,
        failures: &mut u32,
        delays: &mut Clamped<ExponentialGrowth>,
    ) -> Result<Duration, Error> {
        *failures += 1;

        if !error.is_transient() || *failures > self.config.max_retries {
            warn!(attempts = *failures, "giving up on block source: {error}");

            return Err(Error::chain_unavailable(
                self.source.chain_id().clone(),
                *failures,
                error,
            ));
        }

        let delay = self.next_delay(delays);

        warn!(
            attempt = *failures,
            max_retries = self.config.max_retries,
            ?delay,
            "block source query failed, retrying: {error}"
        );

        Ok(delay)
    }
}

/// The first matching event of a block, in transaction order.
///
/// Events that cannot be decoded are skipped.
fn find_match<Matcher>(mut txs: Vec<TxResult>, matcher: &Matcher) -> Option<PolledEvent>
where
    Matcher: EventMatcher,
{
    txs.sort_by_key(|tx| tx.index);

    txs.into_iter().find_map(|tx| {
        let event_index = tx
            .events
            .iter()
            .position(|event| match matcher.try_match(event) {
                Ok(matched) => matched,
                Err(e) => {
                    warn!(
                        height = %tx.height,
                        tx = tx.index,
                        event = %event.kind,
                        "skipping undecodable event: {e}"
                    );

                    false
                }
            })?;

        Some(PolledEvent { tx, event_index })
    })
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::matcher::AttributeMatcher;
    use crate::types::event::Event;

    fn tx(index: u32, events: Vec<Event>) -> TxResult {
        TxResult::new(BlockHeight::new(5), index, events)
    }

    #[test]
    fn earliest_transaction_wins() {
        let matcher = AttributeMatcher::new("recv_packet");

        let txs = vec![
            tx(2, vec![Event::new("recv_packet")]),
            tx(0, vec![Event::new("message")]),
            tx(1, vec![Event::new("message"), Event::new("recv_packet")]),
        ];

        let found = find_match(txs, &matcher).unwrap();

        assert_eq!(found.tx.index, 1);
        assert_eq!(found.event_index, 1);
        assert_eq!(found.event().kind, "recv_packet");
    }

    #[test]
    fn undecodable_events_are_skipped() {
        let matcher = crate::matcher::SubmitQueryResponseMatcher::new("stride-1".into());

        let txs = vec![tx(
            0,
            vec![
                Event::new("submit_query_response").with_attribute("chain_id", vec![0xc3, 0x28]),
                Event::new("submit_query_response").with_attribute("chain_id", "stride-1"),
            ],
        )];

        let found = find_match(txs, &matcher).unwrap();
        assert_eq!(found.event_index, 1);
    }

    #[test]
    fn no_match() {
        let matcher = AttributeMatcher::new("recv_packet");
        assert!(find_match(vec![tx(0, vec![Event::new("message")])], &matcher).is_none());
        assert!(find_match(vec![], &matcher).is_none());
    }
}
