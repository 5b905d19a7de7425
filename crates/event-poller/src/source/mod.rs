/*!
   Read-only access to the blocks produced by a chain under test.

   The poller never owns a connection to a chain: it borrows a
   [`BlockSource`] for the duration of a single poll, and only ever asks
   for the latest height and for the transaction results at one height.
*/

pub mod error;
pub mod mock;
pub mod rpc;

use alloc::vec::Vec;

use async_trait::async_trait;

use crate::types::height::BlockHeight;
use crate::types::id::ChainId;
use crate::types::tx::TxResult;

pub use error::Error as SourceError;
pub use mock::MockBlockSource;
pub use rpc::RpcBlockSource;

#[async_trait]
pub trait BlockSource: Send + Sync {
    fn chain_id(&self) -> &ChainId;

    /// The latest finalized height of the chain.
    async fn current_height(&self) -> Result<BlockHeight, SourceError>;

    /**
       All the transaction results finalized at `height`, ordered by their
       position in the block.

       Fails with [`HeightNotProduced`](error::ErrorDetail::HeightNotProduced)
       if the chain has not reached `height` yet, and with
       [`HeightUnavailable`](error::ErrorDetail::HeightUnavailable) if the
       node will never be able to serve it.
    */
    async fn tx_results_at(&self, height: BlockHeight) -> Result<Vec<TxResult>, SourceError>;
}
