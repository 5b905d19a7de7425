//! Data model shared by matchers, block sources and the poller.

pub mod event;
pub mod height;
pub mod id;
pub mod packet;
pub mod tx;
