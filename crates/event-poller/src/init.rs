//! Logging setup for test binaries and tools using the poller.

use tracing_subscriber::{
    self as ts, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/**
   Install a global `tracing` subscriber printing to stderr.

   The filter is read from `RUST_LOG`, defaulting to `info`. Set it to
   `ibc_event_poller=trace` to follow every height the poller waits on.

   Does nothing if a global subscriber is already installed, which lets
   every test of a binary call it.
*/
pub fn install_logger() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let fmt_layer = ts::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // Fails only when another subscriber was installed first
    let _ = ts::registry().with(env_filter).with(fmt_layer).try_init();
}
