//! An in-memory chain whose block production and failures are driven by
//! the test that owns it.

use alloc::collections::{BTreeMap, VecDeque};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::time::Duration;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::source::error::Error as SourceError;
use crate::source::BlockSource;
use crate::types::event::Event;
use crate::types::height::BlockHeight;
use crate::types::id::ChainId;
use crate::types::tx::TxResult;

#[derive(Default)]
struct MockChainState {
    latest: BlockHeight,
    earliest: BlockHeight,
    blocks: BTreeMap<BlockHeight, Vec<TxResult>>,
    failures: VecDeque<SourceError>,
    fetch_failures: VecDeque<SourceError>,
    fetched: Vec<BlockHeight>,
    height_queries: usize,
}

/**
   A [`BlockSource`] backed by an in-memory map of blocks.

   Heights up to the latest height that were never given any transaction
   are empty blocks. Clones share the same chain, so a test can keep one
   handle to produce blocks while a poll runs against another.
*/
#[derive(Clone)]
pub struct MockBlockSource {
    chain_id: ChainId,
    state: Arc<Mutex<MockChainState>>,
}

impl MockBlockSource {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            state: Arc::new(Mutex::new(MockChainState::default())),
        }
    }

    /// A chain that has already produced (empty) blocks up to `latest`.
    pub fn at_height(chain_id: ChainId, latest: BlockHeight) -> Self {
        let source = Self::new(chain_id);
        source.acquire_state().latest = latest;
        source
    }

    fn acquire_state(&self) -> MutexGuard<'_, MockChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Produce the next block, with one transaction per entry of `txs`.
    pub fn produce_block(&self, txs: Vec<Vec<Event>>) -> BlockHeight {
        let mut state = self.acquire_state();
        let height = state.latest.increment();

        state.blocks.insert(height, to_tx_results(height, txs));
        state.latest = height;

        height
    }

    pub fn produce_empty_blocks(&self, count: u64) -> BlockHeight {
        let mut state = self.acquire_state();
        state.latest = state.latest.add(count);
        state.latest
    }

    /**
       Set the transactions of the block at `height`, whether or not it has
       been produced yet. Blocks set ahead of the latest height only become
       visible once the chain reaches them.
    */
    pub fn set_block(&self, height: BlockHeight, txs: Vec<Vec<Event>>) {
        self.acquire_state()
            .blocks
            .insert(height, to_tx_results(height, txs));
    }

    /// Make every height below `earliest` permanently unavailable.
    pub fn prune_below(&self, earliest: BlockHeight) {
        self.acquire_state().earliest = earliest;
    }

    /// Make the next `count` queries, of any kind, fail with a transient error.
    pub fn fail_next(&self, count: usize) {
        let mut state = self.acquire_state();

        for i in 0..count {
            state.failures.push_back(SourceError::unreachable(format!(
                "injected failure {} of {count}",
                i + 1
            )));
        }
    }

    /// Make the next `count` transaction result queries fail with a transient
    /// error, while height queries keep succeeding.
    pub fn fail_next_fetches(&self, count: usize) {
        let mut state = self.acquire_state();

        for i in 0..count {
            state.fetch_failures.push_back(SourceError::unreachable(format!(
                "injected block results failure {} of {count}",
                i + 1
            )));
        }
    }

    /**
       Spawn a task producing `count` empty blocks, one every `interval`.

       Must be called from within a tokio runtime.
    */
    pub fn spawn_block_production(&self, interval: Duration, count: u64) -> JoinHandle<()> {
        let source = self.clone();

        tokio::spawn(async move {
            for _ in 0..count {
                tokio::time::sleep(interval).await;
                source.produce_empty_blocks(1);
            }
        })
    }

    pub fn latest_height(&self) -> BlockHeight {
        self.acquire_state().latest
    }

    /// Heights whose transaction results were successfully returned, in order.
    pub fn fetched_heights(&self) -> Vec<BlockHeight> {
        self.acquire_state().fetched.clone()
    }

    pub fn height_queries(&self) -> usize {
        self.acquire_state().height_queries
    }
}

fn to_tx_results(height: BlockHeight, txs: Vec<Vec<Event>>) -> Vec<TxResult> {
    txs.into_iter()
        .zip(0..)
        .map(|(events, index)| TxResult::new(height, index, events))
        .collect()
}

#[async_trait]
impl BlockSource for MockBlockSource {
    fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    async fn current_height(&self) -> Result<BlockHeight, SourceError> {
        let mut state = self.acquire_state();
        state.height_queries += 1;

        if let Some(e) = state.failures.pop_front() {
            return Err(e);
        }

        Ok(state.latest)
    }

    async fn tx_results_at(&self, height: BlockHeight) -> Result<Vec<TxResult>, SourceError> {
        let mut state = self.acquire_state();

        if let Some(e) = state.failures.pop_front() {
            return Err(e);
        }

        if let Some(e) = state.fetch_failures.pop_front() {
            return Err(e);
        }

        if height > state.latest {
            return Err(SourceError::height_not_produced(height, state.latest));
        }

        if height < state.earliest {
            return Err(SourceError::height_unavailable(height, state.earliest));
        }

        state.fetched.push(height);

        Ok(state.blocks.get(&height).cloned().unwrap_or_default())
    }
}
