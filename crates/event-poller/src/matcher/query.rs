//! Matching interchain query callbacks.

use alloc::string::String;

use crate::error::Error;
use crate::matcher::EventMatcher;
use crate::types::event::Event;
use crate::types::id::ChainId;

pub const SUBMIT_QUERY_RESPONSE_EVENT: &str = "submit_query_response";

pub const CHAIN_ID_ATTRIBUTE_KEY: &str = "chain_id";
pub const QUERY_ID_ATTRIBUTE_KEY: &str = "query_id";

/// Matches the event emitted when the response to an interchain query
/// targeting `chain_id` is submitted back by the relayer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitQueryResponseMatcher {
    chain_id: ChainId,
}

impl SubmitQueryResponseMatcher {
    pub fn new(chain_id: ChainId) -> Self {
        Self { chain_id }
    }
}

impl EventMatcher for SubmitQueryResponseMatcher {
    fn try_match(&self, event: &Event) -> Result<bool, Error> {
        if !event.is_kind(SUBMIT_QUERY_RESPONSE_EVENT) {
            return Ok(false);
        }

        let chain_id = event.require_str(CHAIN_ID_ATTRIBUTE_KEY)?;

        Ok(chain_id == self.chain_id.as_str())
    }

    fn describe(&self) -> String {
        format!("interchain query response for chain {}", self.chain_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryResponseSubmitted {
    pub chain_id: ChainId,
    pub query_id: Option<String>,
}

impl TryFrom<&Event> for QueryResponseSubmitted {
    type Error = Error;

    fn try_from(event: &Event) -> Result<Self, Error> {
        Ok(Self {
            chain_id: event.require_str(CHAIN_ID_ATTRIBUTE_KEY)?.into(),
            query_id: event
                .attribute_str(QUERY_ID_ATTRIBUTE_KEY)?
                .map(ToOwned::to_owned),
        })
    }
}
