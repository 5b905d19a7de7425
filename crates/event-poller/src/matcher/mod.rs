/*!
   Predicates over single events.

   A matcher answers the question "is this the event I am waiting for?".
   Matchers are pure: they may be evaluated any number of times, from any
   number of concurrent polls.
*/

pub mod ack;
pub mod attribute;
pub mod channel;
pub mod query;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;

use crate::error::Error;
use crate::types::event::Event;

pub use ack::{AckMatcher, AcknowledgedPacket};
pub use attribute::AttributeMatcher;
pub use channel::{ChannelOpenConfirmMatcher, ChannelOpenConfirmed};
pub use query::{QueryResponseSubmitted, SubmitQueryResponseMatcher};

pub trait EventMatcher: Send + Sync {
    /**
       Check whether `event` is the one being waited for.

       Returns an error when the event has the expected kind but its
       attributes cannot be decoded.
    */
    fn try_match(&self, event: &Event) -> Result<bool, Error>;

    /// Human readable description of what is matched, used in logs.
    fn describe(&self) -> String;

    fn matches(&self, event: &Event) -> bool {
        self.try_match(event).unwrap_or(false)
    }

    fn and<Other>(self, other: Other) -> And<Self, Other>
    where
        Self: Sized,
        Other: EventMatcher,
    {
        And(self, other)
    }
}

/// Matches events accepted by both inner matchers.
#[derive(Clone, Debug)]
pub struct And<A, B>(pub A, pub B);

impl<A, B> EventMatcher for And<A, B>
where
    A: EventMatcher,
    B: EventMatcher,
{
    fn try_match(&self, event: &Event) -> Result<bool, Error> {
        if !self.0.try_match(event)? {
            return Ok(false);
        }

        self.1.try_match(event)
    }

    fn describe(&self) -> String {
        format!("({}) and ({})", self.0.describe(), self.1.describe())
    }
}

impl<M> EventMatcher for &M
where
    M: EventMatcher + ?Sized,
{
    fn try_match(&self, event: &Event) -> Result<bool, Error> {
        (**self).try_match(event)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<M> EventMatcher for Box<M>
where
    M: EventMatcher + ?Sized,
{
    fn try_match(&self, event: &Event) -> Result<bool, Error> {
        (**self).try_match(event)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<M> EventMatcher for Arc<M>
where
    M: EventMatcher + ?Sized,
{
    fn try_match(&self, event: &Event) -> Result<bool, Error> {
        (**self).try_match(event)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
