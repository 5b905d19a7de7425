pub mod assert;
pub mod block_on;
pub mod retry;
