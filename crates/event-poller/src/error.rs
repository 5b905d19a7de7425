//! Errors returned by the event poller.
//!
//! The terminal outcomes of a poll ([`ErrorDetail::Timeout`],
//! [`ErrorDetail::Cancelled`] and [`ErrorDetail::ChainUnavailable`]) are kept
//! as separate variants so that callers can tell "the event never happened"
//! apart from "the node went away" and "the test gave up".

use alloc::string::String;

use flex_error::{define_error, TraceError};

use crate::source::error::Error as SourceError;
use crate::types::height::BlockHeight;
use crate::types::id::ChainId;

define_error! {
    #[derive(Debug, Clone)]
    Error {
        InvalidRange
            { start: BlockHeight, end: BlockHeight }
            |e| {
                format_args!("invalid height range: start height {} is greater than end height {}",
                    e.start, e.end)
            },

        ChainUnavailable
            { chain_id: ChainId, attempts: u32 }
            [ SourceError ]
            |e| {
                format_args!("chain {} is unavailable after {} attempt(s)",
                    e.chain_id, e.attempts)
            },

        Timeout
            { chain_id: ChainId, start: BlockHeight, end: BlockHeight }
            |e| {
                format_args!("no matching event found on chain {} between heights {} and {}",
                    e.chain_id, e.start, e.end)
            },

        Cancelled
            { chain_id: ChainId, height: BlockHeight, deadline_elapsed: bool }
            |e| {
                if e.deadline_elapsed {
                    format!("deadline elapsed while polling chain {} at height {}",
                        e.chain_id, e.height)
                } else {
                    format!("poll on chain {} cancelled at height {}",
                        e.chain_id, e.height)
                }
            },

        MissingAttribute
            { kind: String, key: String }
            |e| {
                format_args!("event `{}` has no attribute `{}`", e.kind, e.key)
            },

        InvalidUtf8Attribute
            { kind: String, key: String }
            [ TraceError<core::str::Utf8Error> ]
            |e| {
                format_args!("attribute `{}` of event `{}` is not valid UTF-8", e.key, e.kind)
            },

        InvalidAttribute
            { kind: String, key: String, value: String }
            |e| {
                format_args!("attribute `{}` of event `{}` has an invalid value: {}",
                    e.key, e.kind, e.value)
            },

        Runtime
            [ TraceError<std::io::Error> ]
            |_| { "failed to build tokio runtime" },

        Assertion
            { message: String }
            |e| { format_args!("assertion failure: {}", e.message) },
    }
}

impl Error {
    /// Whether this error was produced while decoding a single event.
    ///
    /// Such errors never terminate a poll: the offending event is skipped.
    pub fn is_decode(&self) -> bool {
        matches!(
            self.detail(),
            ErrorDetail::MissingAttribute(_)
                | ErrorDetail::InvalidUtf8Attribute(_)
                | ErrorDetail::InvalidAttribute(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.detail(), ErrorDetail::Timeout(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.detail(), ErrorDetail::Cancelled(_))
    }

    pub fn is_chain_unavailable(&self) -> bool {
        matches!(self.detail(), ErrorDetail::ChainUnavailable(_))
    }
}
