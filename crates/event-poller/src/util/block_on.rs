//! Utility function to execute a future synchronously

use core::future::Future;

use crate::error::Error;

/// Spawns a new tokio runtime and use it to block on the given future.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::runtime)?;

    Ok(runtime.block_on(future))
}
