use core::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::types::event::Event;
use crate::types::height::HeightRange;
use crate::types::tx::TxResult;

/**
   What to wait for, and for how long.

   A poll gives up with `Cancelled` as soon as either `deadline` elapses or
   `cancel` is triggered, whichever comes first.
*/
#[derive(Clone, Debug)]
pub struct PollRequest<Matcher> {
    pub range: HeightRange,
    pub matcher: Matcher,
    pub deadline: Instant,
    pub cancel: CancellationToken,
}

impl<Matcher> PollRequest<Matcher> {
    pub fn new(range: HeightRange, matcher: Matcher, deadline: Instant) -> Self {
        Self {
            range,
            matcher,
            deadline,
            cancel: CancellationToken::new(),
        }
    }

    /// A request due after `timeout`. Timeouts too large to be represented
    /// as an instant never elapse.
    pub fn with_timeout(range: HeightRange, matcher: Matcher, timeout: Duration) -> Self {
        Self::new(range, matcher, deadline_after(timeout))
    }

    /// Let the caller abort the poll through `cancel`, or any token it
    /// was derived from.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Roughly 30 years, as tokio does for timers that never fire.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();

    now.checked_add(timeout.min(FAR_FUTURE))
        .unwrap_or(now)
}

/// The transaction containing the first matching event of a poll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolledEvent {
    pub tx: TxResult,
    /// Position of the matching event within `tx.events`
    pub event_index: usize,
}

impl PolledEvent {
    pub fn event(&self) -> &Event {
        &self.tx.events[self.event_index]
    }

    pub fn into_event(mut self) -> Event {
        self.tx.events.swap_remove(self.event_index)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::height::BlockHeight;

    fn range() -> HeightRange {
        HeightRange::with_lookahead(BlockHeight::new(1), 10)
    }

    #[test]
    fn deadline_follows_timeout() {
        let before = Instant::now();
        let request = PollRequest::with_timeout(range(), (), Duration::from_secs(90));

        assert!(request.deadline >= before + Duration::from_secs(90));
        assert!(!request.cancel.is_cancelled());
    }

    #[test]
    fn oversized_timeout_does_not_overflow() {
        let before = Instant::now();

        for timeout in [Duration::from_secs(u64::MAX / 2), Duration::MAX] {
            let request = PollRequest::with_timeout(range(), (), timeout);
            assert!(request.deadline >= before + FAR_FUTURE);
        }
    }

    #[test]
    fn into_event_takes_matching_event() {
        let polled = PolledEvent {
            tx: TxResult::new(
                BlockHeight::new(4),
                0,
                vec![Event::new("message"), Event::new("acknowledge_packet")],
            ),
            event_index: 1,
        };

        assert_eq!(polled.event().kind, "acknowledge_packet");
        assert_eq!(polled.into_event().kind, "acknowledge_packet");
    }
}
