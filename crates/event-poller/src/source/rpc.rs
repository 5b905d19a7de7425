//! A [`BlockSource`] querying a Tendermint/CometBFT full node over RPC.

use alloc::vec::Vec;
use core::future::Future;
use core::time::Duration;

use async_trait::async_trait;
use tracing::{instrument, trace};

use tendermint::abci;
use tendermint::abci::types::ExecTxResult;
use tendermint::block::Height as TmHeight;
use tendermint_rpc::{Client, HttpClient, HttpClientUrl, Url};

use crate::config::{ChainConfig, CompatMode};
use crate::source::error::Error as SourceError;
use crate::source::BlockSource;
use crate::types::event::{Event, EventAttribute};
use crate::types::height::BlockHeight;
use crate::types::id::ChainId;
use crate::types::tx::TxResult;

pub struct RpcBlockSource {
    chain_id: ChainId,
    client: HttpClient,
    rpc_addr: Url,
    rpc_timeout: Duration,
}

impl RpcBlockSource {
    pub fn new(
        chain_id: ChainId,
        rpc_addr: Url,
        rpc_timeout: Duration,
        compat_mode: Option<CompatMode>,
    ) -> Result<Self, SourceError> {
        let url = HttpClientUrl::try_from(rpc_addr.clone())
            .map_err(|e| SourceError::rpc(rpc_addr.clone(), e))?;

        let mut builder = HttpClient::builder(url);

        if let Some(compat_mode) = compat_mode {
            builder = builder.compat_mode(compat_mode.into());
        }

        let client = builder
            .build()
            .map_err(|e| SourceError::rpc(rpc_addr.clone(), e))?;

        Ok(Self {
            chain_id,
            client,
            rpc_addr,
            rpc_timeout,
        })
    }

    pub fn from_config(config: &ChainConfig) -> Result<Self, SourceError> {
        Self::new(
            config.id.clone(),
            config.rpc_addr.clone(),
            config.rpc_timeout,
            config.compat_mode,
        )
    }

    pub fn rpc_addr(&self) -> &Url {
        &self.rpc_addr
    }

    async fn query<T>(
        &self,
        request: impl Future<Output = Result<T, tendermint_rpc::Error>>,
    ) -> Result<T, SourceError> {
        match tokio::time::timeout(self.rpc_timeout, request).await {
            Ok(result) => result.map_err(|e| SourceError::rpc(self.rpc_addr.clone(), e)),
            Err(_) => Err(SourceError::rpc_timeout(
                self.rpc_addr.clone(),
                self.rpc_timeout,
            )),
        }
    }

    /// Find out whether a failed `/block_results` query failed because of
    /// the requested height, or because of the node.
    async fn diagnose_failure(&self, height: BlockHeight, error: SourceError) -> SourceError {
        let Ok(status) = self.query(self.client.status()).await else {
            return error;
        };

        classify_failure(
            height,
            BlockHeight::new(status.sync_info.latest_block_height.value()),
            BlockHeight::new(status.sync_info.earliest_block_height.value()),
            error,
        )
    }
}

/// Classify the failure to fetch `height` from a node serving the heights
/// `earliest..=latest`.
fn classify_failure(
    height: BlockHeight,
    latest: BlockHeight,
    earliest: BlockHeight,
    error: SourceError,
) -> SourceError {
    if height > latest {
        SourceError::height_not_produced(height, latest)
    } else if height < earliest {
        SourceError::height_unavailable(height, earliest)
    } else {
        error
    }
}

#[async_trait]
impl BlockSource for RpcBlockSource {
    fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    async fn current_height(&self) -> Result<BlockHeight, SourceError> {
        let status = self.query(self.client.status()).await?;

        Ok(BlockHeight::new(
            status.sync_info.latest_block_height.value(),
        ))
    }

    #[instrument(
        name = "rpc_block_source.tx_results_at",
        level = "trace",
        skip_all,
        fields(chain = %self.chain_id, %height)
    )]
    async fn tx_results_at(&self, height: BlockHeight) -> Result<Vec<TxResult>, SourceError> {
        let tm_height =
            TmHeight::try_from(height.value()).map_err(|e| SourceError::invalid_height(height, e))?;

        match self.query(self.client.block_results(tm_height)).await {
            Ok(response) => Ok(tx_results_from_block(height, response.txs_results)),
            Err(e) => Err(self.diagnose_failure(height, e).await),
        }
    }
}

fn tx_results_from_block(
    height: BlockHeight,
    txs_results: Option<Vec<ExecTxResult>>,
) -> Vec<TxResult> {
    txs_results
        .unwrap_or_default()
        .into_iter()
        .zip(0..)
        .map(|(tx, index)| {
            // Events of failed transactions were reverted along with their state changes
            let events = if tx.code.is_err() {
                trace!(%height, index, code = ?tx.code, "skipping events of failed transaction");
                Vec::new()
            } else {
                tx.events.into_iter().map(Event::from).collect()
            };

            TxResult::new(height, index, events)
        })
        .collect()
}

impl From<abci::Event> for Event {
    fn from(event: abci::Event) -> Self {
        Self {
            kind: event.kind,
            attributes: event
                .attributes
                .into_iter()
                .map(|attr| EventAttribute::new(attr.key, attr.value.into_bytes()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::source::error::ErrorDetail;

    #[test]
    fn converts_abci_events() {
        let event = abci::Event {
            kind: "acknowledge_packet".to_owned(),
            attributes: vec![
                abci::EventAttribute {
                    key: "packet_sequence".to_owned(),
                    value: "3".to_owned(),
                    index: true,
                },
                abci::EventAttribute {
                    key: "packet_src_port".to_owned(),
                    value: "transfer".to_owned(),
                    index: false,
                },
            ],
        };

        let event = Event::from(event);

        assert_eq!(event.kind, "acknowledge_packet");
        assert_eq!(event.attribute("packet_sequence"), Some(b"3".as_slice()));
        assert_eq!(event.attribute_str("packet_src_port").unwrap(), Some("transfer"));
    }

    fn transfer_event() -> abci::Event {
        abci::Event {
            kind: "transfer".to_owned(),
            attributes: vec![abci::EventAttribute {
                key: "amount".to_owned(),
                value: "100uatom".to_owned(),
                index: true,
            }],
        }
    }

    #[test]
    fn failed_transactions_keep_their_index() {
        let txs_results = vec![
            ExecTxResult {
                events: vec![transfer_event()],
                ..Default::default()
            },
            ExecTxResult {
                code: abci::Code::from(5),
                events: vec![transfer_event()],
                ..Default::default()
            },
            ExecTxResult {
                events: vec![transfer_event(), transfer_event()],
                ..Default::default()
            },
        ];

        let txs = tx_results_from_block(BlockHeight::new(42), Some(txs_results));

        let indexes = txs.iter().map(|tx| tx.index).collect::<Vec<_>>();
        assert_eq!(indexes, vec![0, 1, 2]);

        assert_eq!(txs[0].events.len(), 1);
        assert!(txs[1].events.is_empty());
        assert_eq!(txs[2].events.len(), 2);
        assert!(txs.iter().all(|tx| tx.height == BlockHeight::new(42)));
    }

    #[test]
    fn block_without_transactions() {
        assert!(tx_results_from_block(BlockHeight::new(7), None).is_empty());
        assert!(tx_results_from_block(BlockHeight::new(7), Some(vec![])).is_empty());
    }

    #[test]
    fn failures_are_classified_by_served_heights() {
        let error = || SourceError::unreachable("connection reset".to_owned());
        let (latest, earliest) = (BlockHeight::new(100), BlockHeight::new(20));

        let err = classify_failure(BlockHeight::new(101), latest, earliest, error());
        assert!(err.is_not_produced());
        assert!(err.is_transient());

        let err = classify_failure(BlockHeight::new(19), latest, earliest, error());
        assert!(matches!(err.detail(), ErrorDetail::HeightUnavailable(_)));
        assert!(!err.is_transient());

        for height in [20, 60, 100] {
            let err = classify_failure(BlockHeight::new(height), latest, earliest, error());
            assert!(matches!(err.detail(), ErrorDetail::Unreachable(_)));
            assert!(err.is_transient());
        }
    }

    #[test]
    fn client_from_config() {
        let config = ChainConfig {
            id: "gaia-1".into(),
            rpc_addr: "http://127.0.0.1:26657".parse().unwrap(),
            rpc_timeout: Duration::from_secs(3),
            compat_mode: Some(CompatMode::V0_34),
        };

        let source = RpcBlockSource::from_config(&config).unwrap();

        assert_eq!(source.chain_id().as_str(), "gaia-1");
        assert_eq!(source.rpc_addr(), &config.rpc_addr);
    }
}
