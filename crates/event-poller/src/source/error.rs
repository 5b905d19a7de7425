use alloc::string::String;

use flex_error::{define_error, TraceError};
use tendermint_rpc::{Error as RpcError, Url};

use crate::types::height::BlockHeight;

define_error! {
    #[derive(Debug, Clone)]
    Error {
        Rpc
            { url: Url }
            [ TraceError<RpcError> ]
            |e| { format_args!("RPC error to endpoint {}", e.url) },

        RpcTimeout
            { url: Url, timeout: core::time::Duration }
            |e| {
                format_args!("RPC request to endpoint {} timed out after {:?}",
                    e.url, e.timeout)
            },

        InvalidHeight
            { height: BlockHeight }
            [ TraceError<tendermint::Error> ]
            |e| { format_args!("invalid block height {}", e.height) },

        HeightNotProduced
            { height: BlockHeight, latest: BlockHeight }
            |e| {
                format_args!("block at height {} has not been produced yet, latest height is {}",
                    e.height, e.latest)
            },

        HeightUnavailable
            { height: BlockHeight, earliest: BlockHeight }
            |e| {
                format_args!("block at height {} cannot be served, earliest available height is {}",
                    e.height, e.earliest)
            },

        Unreachable
            { reason: String }
            |e| { format_args!("chain node is unreachable: {}", e.reason) },
    }
}

impl Error {
    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self.detail(),
            ErrorDetail::HeightUnavailable(_) | ErrorDetail::InvalidHeight(_)
        )
    }

    pub fn is_not_produced(&self) -> bool {
        matches!(self.detail(), ErrorDetail::HeightNotProduced(_))
    }
}
