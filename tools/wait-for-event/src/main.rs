//! Wait until a chain emits an IBC event within a window of block heights.
//!
//! ```text
//! wait-for-event --url http://127.0.0.1:26657 --chain-id gaia-1 --lookahead 20 \
//!     ack --port transfer --channel channel-0 --sequence 3
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::eyre;
use itertools::Itertools;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use tendermint_rpc::Url;

use ibc_event_poller::config::{self, ChainConfig, Config};
use ibc_event_poller::init::install_logger;
use ibc_event_poller::matcher::{
    AckMatcher, ChannelOpenConfirmMatcher, EventMatcher, SubmitQueryResponseMatcher,
};
use ibc_event_poller::poller::{EventPoller, PolledEvent};
use ibc_event_poller::source::{BlockSource, RpcBlockSource};
use ibc_event_poller::types::height::{BlockHeight, HeightRange};
use ibc_event_poller::types::id::{ChainId, ChannelId, PortId};
use ibc_event_poller::types::packet::Sequence;

#[derive(Debug, Parser)]
struct Opts {
    /// The URL of the Tendermint node's RPC endpoint
    #[clap(short, long)]
    url: Url,

    /// Identifier of the chain the node belongs to
    #[clap(long)]
    chain_id: ChainId,

    /// Path to a poller configuration file (optional)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// The first height to scan, defaults to the current height of the chain
    #[clap(long)]
    start: Option<u64>,

    /// How many heights to scan past the start height, defaults to the configured lookahead
    #[clap(long)]
    lookahead: Option<u64>,

    /// How long to wait before giving up, e.g. `90s` or `5m`, defaults to the configured timeout
    #[clap(long)]
    timeout: Option<humantime::Duration>,

    /// The event to wait for
    #[clap(subcommand)]
    matcher: MatcherCmd,
}

#[derive(Debug, Subcommand)]
enum MatcherCmd {
    /// Acknowledgement of a packet, on the chain that sent it
    Ack {
        /// Source port of the packet
        #[clap(long)]
        port: PortId,

        /// Source channel of the packet
        #[clap(long)]
        channel: ChannelId,

        /// Sequence number of the packet
        #[clap(long)]
        sequence: Sequence,
    },

    /// Completion of a channel handshake with the given counterparty chain
    ChannelOpenConfirm {
        #[clap(long)]
        counterparty_chain_id: ChainId,
    },

    /// Submission of an interchain query response about the given chain
    QueryResponse {
        #[clap(long)]
        chain_id: ChainId,
    },
}

impl MatcherCmd {
    fn into_matcher(self) -> Box<dyn EventMatcher> {
        match self {
            Self::Ack {
                port,
                channel,
                sequence,
            } => Box::new(AckMatcher::new(port, channel, sequence)),
            Self::ChannelOpenConfirm {
                counterparty_chain_id,
            } => Box::new(ChannelOpenConfirmMatcher::new(counterparty_chain_id)),
            Self::QueryResponse { chain_id } => Box::new(SubmitQueryResponseMatcher::new(chain_id)),
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    install_logger();

    let opts = Opts::parse();

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupted, cancelling poll");
                ctrl_c.cancel();
            }
            Err(e) => error!("failed to listen for Ctrl-C: {e}"),
        }
    });

    let polled = run(opts, cancel).await?;
    print_polled(&polled);

    Ok(())
}

async fn run(opts: Opts, cancel: CancellationToken) -> eyre::Result<PolledEvent> {
    let mut config = match &opts.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };

    if let Some(timeout) = opts.timeout {
        config.poller.timeout = timeout.into();
        config.poller.validate()?;
    }

    let chain_config = chain_config(&config, &opts);
    let source = RpcBlockSource::from_config(&chain_config)?;

    info!("Connecting to {}", opts.url);

    let start = match opts.start {
        Some(start) => BlockHeight::new(start),
        None => source.current_height().await?,
    };

    let lookahead = opts.lookahead.unwrap_or(config.poller.default_lookahead);
    let range = HeightRange::with_lookahead(start, lookahead);

    let poller = EventPoller::new(&source, config.poller);
    let matcher = opts.matcher.into_matcher();

    info!("Waiting for {} in heights {}", matcher.describe(), range);

    let request = poller.request(range, matcher).with_cancellation(cancel);

    poller
        .poll(request)
        .await
        .map_err(|e| eyre!("failed to observe event: {e}"))
}

/// The settings of the chain from the configuration file, if it lists it,
/// with the RPC address given on the command line.
fn chain_config(config: &Config, opts: &Opts) -> ChainConfig {
    match config.find_chain(&opts.chain_id) {
        Some(chain) => ChainConfig {
            rpc_addr: opts.url.clone(),
            ..chain.clone()
        },
        None => ChainConfig {
            id: opts.chain_id.clone(),
            rpc_addr: opts.url.clone(),
            rpc_timeout: config::default::rpc_timeout(),
            compat_mode: None,
        },
    }
}

fn print_polled(polled: &PolledEvent) {
    let event = polled.event();

    let attributes = event
        .attributes
        .iter()
        .map(|attr| format!("{}={}", attr.key, String::from_utf8_lossy(&attr.value)))
        .join(", ");

    info!(
        "Found `{}` event in block {}, transaction {}",
        event.kind, polled.tx.height, polled.tx.index
    );

    println!(
        "{} {} {} {}",
        polled.tx.height, polled.tx.index, event.kind, attributes
    );
}
