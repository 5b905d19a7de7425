//! Poller configuration

pub mod compat_mode;
pub mod error;

use alloc::vec::Vec;
use core::time::Duration;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tendermint_rpc::Url;

use crate::types::id::ChainId;
use crate::util::retry::{Clamped, ExponentialGrowth};

pub use compat_mode::CompatMode;
pub use error::Error;

pub mod default {
    use super::*;

    pub fn block_time() -> Duration {
        Duration::from_secs(1)
    }

    pub fn max_backoff() -> Duration {
        Duration::from_secs(5)
    }

    pub fn max_retries() -> u32 {
        5
    }

    pub fn timeout() -> Duration {
        Duration::from_secs(5 * 60)
    }

    pub fn default_lookahead() -> u64 {
        10
    }

    pub fn rpc_timeout() -> Duration {
        Duration::from_secs(10)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub poller: PollConfig,

    #[serde(default)]
    pub chains: Vec<ChainConfig>,
}

impl Config {
    pub fn find_chain(&self, id: &ChainId) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| &c.id == id)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.poller.validate()
    }
}

/// Timing and retry budget of a single poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollConfig {
    /// Expected time between two blocks, used as the initial backoff while
    /// waiting for a height to be produced
    #[serde(default = "default::block_time", with = "humantime_serde")]
    pub block_time: Duration,

    /// Upper bound of the exponential backoff
    #[serde(default = "default::max_backoff", with = "humantime_serde")]
    pub max_backoff: Duration,

    /// Number of consecutive transient failures of the block source
    /// tolerated before giving up with `ChainUnavailable`
    #[serde(default = "default::max_retries")]
    pub max_retries: u32,

    /// Deadline of a poll whose caller did not set one
    #[serde(default = "default::timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Number of heights scanned past the current height when polling
    /// from the tip of the chain
    #[serde(default = "default::default_lookahead")]
    pub default_lookahead: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            block_time: default::block_time(),
            max_backoff: default::max_backoff(),
            max_retries: default::max_retries(),
            timeout: default::timeout(),
            default_lookahead: default::default_lookahead(),
        }
    }
}

impl PollConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.block_time.is_zero() {
            return Err(Error::invalid_poll_config(
                "`block_time` must be greater than zero".to_string(),
            ));
        }

        if self.max_backoff < self.block_time {
            return Err(Error::invalid_poll_config(format!(
                "`max_backoff` ({:?}) must not be lower than `block_time` ({:?})",
                self.max_backoff, self.block_time
            )));
        }

        if self.timeout.is_zero() {
            return Err(Error::invalid_poll_config(
                "`timeout` must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// The delays between two attempts: starting at one block time,
    /// doubling at each step, capped at `max_backoff`.
    pub fn backoff(&self) -> Clamped<ExponentialGrowth> {
        ExponentialGrowth::new(self.block_time, 2).clamp(self.max_backoff)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// The chain's network identifier
    pub id: ChainId,

    /// The RPC URL to connect to
    pub rpc_addr: Url,

    /// Timeout used when issuing RPC queries
    #[serde(default = "default::rpc_timeout", with = "humantime_serde")]
    pub rpc_timeout: Duration,

    /// CometBFT RPC compatibility mode, detected by the RPC client when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compat_mode: Option<CompatMode>,
}

/// Attempt to load and parse the TOML config file as a `Config`.
pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
    let config_toml = fs::read_to_string(&path).map_err(Error::io)?;

    let config = toml::from_str::<Config>(&config_toml[..]).map_err(Error::decode)?;

    config.validate()?;

    Ok(config)
}

/// Serialize the given `Config` as TOML to the given config file.
pub fn store(config: &Config, path: impl AsRef<Path>) -> Result<(), Error> {
    let mut file = if path.as_ref().exists() {
        fs::OpenOptions::new().write(true).truncate(true).open(path)
    } else {
        File::create(path)
    }
    .map_err(Error::io)?;

    store_writer(config, &mut file)
}

/// Serialize the given `Config` as TOML to the given writer.
pub(crate) fn store_writer(config: &Config, mut writer: impl Write) -> Result<(), Error> {
    let toml_config = toml::to_string_pretty(&config).map_err(Error::encode)?;

    writeln!(writer, "{toml_config}").map_err(Error::io)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        [poller]
        block_time = "2s"
        max_backoff = "8s"
        timeout = "1m"

        [[chains]]
        id = "stride-1"
        rpc_addr = "http://127.0.0.1:26657"
        compat_mode = "0.37"

        [[chains]]
        id = "gaia-1"
        rpc_addr = "http://127.0.0.1:26757"
        rpc_timeout = "3s"
    "#;

    #[test]
    fn parse_config() {
        let config = toml::from_str::<Config>(CONFIG).unwrap();

        assert_eq!(config.poller.block_time, Duration::from_secs(2));
        assert_eq!(config.poller.max_backoff, Duration::from_secs(8));
        assert_eq!(config.poller.max_retries, default::max_retries());
        assert_eq!(config.poller.timeout, Duration::from_secs(60));
        assert_eq!(config.poller.default_lookahead, 10);

        let stride = config.find_chain(&"stride-1".into()).unwrap();
        assert_eq!(stride.rpc_timeout, default::rpc_timeout());
        assert_eq!(stride.compat_mode, Some(CompatMode::V0_37));

        let gaia = config.find_chain(&"gaia-1".into()).unwrap();
        assert_eq!(gaia.rpc_timeout, Duration::from_secs(3));
        assert_eq!(gaia.compat_mode, None);

        assert!(config.find_chain(&"osmosis-1".into()).is_none());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = toml::from_str::<Config>("").unwrap();

        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serialize_and_parse_again() {
        let config = toml::from_str::<Config>(CONFIG).unwrap();

        let mut buffer = Vec::new();
        store_writer(&config, &mut buffer).unwrap();

        let parsed = toml::from_str::<Config>(core::str::from_utf8(&buffer).unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn reject_invalid_backoff() {
        let config = PollConfig {
            block_time: Duration::from_secs(6),
            max_backoff: Duration::from_secs(5),
            ..PollConfig::default()
        };

        assert!(config.validate().is_err());

        let config = PollConfig {
            block_time: Duration::ZERO,
            ..PollConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn backoff_follows_block_time() {
        let config = PollConfig {
            block_time: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
            ..PollConfig::default()
        };

        let delays = config.backoff().take(5).collect::<Vec<_>>();

        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(5),
                Duration::from_secs(5),
            ]
        );
    }
}
