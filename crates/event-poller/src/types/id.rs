//! Identifiers compared by the built-in matchers.
//!
//! These are plain string wrappers: the poller only ever compares them with
//! values found in event attributes and never validates their format.

use alloc::string::String;
use core::fmt::{Display, Error as FmtError, Formatter};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = core::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_identifier!(
    /// Network identifier of a chain, e.g. `stride-1`.
    ChainId
);

string_identifier!(
    /// IBC port identifier, e.g. `transfer` or `icacontroller-stride-1.delegation`.
    PortId
);

string_identifier!(
    /// IBC channel identifier, e.g. `channel-0`.
    ChannelId
);

string_identifier!(
    /// IBC connection identifier, e.g. `connection-0`.
    ConnectionId
);
