use alloc::string::String;
use core::fmt::{Display, Error as FmtError, Formatter};
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tendermint_rpc::client::CompatMode as TmCompatMode;

use crate::config::Error;

/// CometBFT RPC compatibility mode of a chain's full node
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompatMode {
    /// Use version 0.34 of the protocol.
    V0_34,
    /// Use version 0.37 of the protocol.
    V0_37,
}

impl Display for CompatMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::V0_34 => write!(f, "v0.34"),
            Self::V0_37 => write!(f, "v0.37"),
        }
    }
}

impl FromStr for CompatMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const VALID_COMPAT_MODES: &str = "0.34, 0.37";

        match s.trim_start_matches('v') {
            "0.34" => Ok(CompatMode::V0_34),
            "0.37" => Ok(CompatMode::V0_37),
            _ => Err(Error::invalid_compat_mode(
                s.to_string(),
                VALID_COMPAT_MODES,
            )),
        }
    }
}

impl<'de> Deserialize<'de> for CompatMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de;

        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

impl Serialize for CompatMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl From<CompatMode> for TmCompatMode {
    fn from(value: CompatMode) -> Self {
        match value {
            CompatMode::V0_34 => Self::V0_34,
            CompatMode::V0_37 => Self::V0_37,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_and_without_prefix() {
        assert_eq!("0.34".parse::<CompatMode>().unwrap(), CompatMode::V0_34);
        assert_eq!("v0.37".parse::<CompatMode>().unwrap(), CompatMode::V0_37);
        assert!("0.38".parse::<CompatMode>().is_err());
    }
}
