use alloc::vec::Vec;

use crate::types::event::Event;
use crate::types::height::BlockHeight;

/// The result of executing one transaction, as finalized in a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxResult {
    pub height: BlockHeight,
    /// Position of the transaction within its block
    pub index: u32,
    pub events: Vec<Event>,
}

impl TxResult {
    pub fn new(height: BlockHeight, index: u32, events: Vec<Event>) -> Self {
        Self {
            height,
            index,
            events,
        }
    }
}
