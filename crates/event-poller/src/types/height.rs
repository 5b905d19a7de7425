use core::fmt::{Display, Error as FmtError, Formatter};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Height of a block produced by one chain.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(u64);

impl BlockHeight {
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub const fn add(self, delta: u64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

impl Display for BlockHeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BlockHeight {
    fn from(height: u64) -> Self {
        Self(height)
    }
}

impl From<BlockHeight> for u64 {
    fn from(height: BlockHeight) -> Self {
        height.0
    }
}

impl FromStr for BlockHeight {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// An inclusive range of heights `start..=end`, with `start <= end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeightRange {
    start: BlockHeight,
    end: BlockHeight,
}

impl HeightRange {
    pub fn new(start: BlockHeight, end: BlockHeight) -> Result<Self, Error> {
        if start > end {
            return Err(Error::invalid_range(start, end));
        }

        Ok(Self { start, end })
    }

    /// The range starting at `start` and spanning `lookahead` more heights,
    /// i.e. `start..=start + lookahead`.
    pub const fn with_lookahead(start: BlockHeight, lookahead: u64) -> Self {
        Self {
            start,
            end: start.add(lookahead),
        }
    }

    pub const fn start(&self) -> BlockHeight {
        self.start
    }

    pub const fn end(&self) -> BlockHeight {
        self.end
    }

    pub fn contains(&self, height: BlockHeight) -> bool {
        self.start <= height && height <= self.end
    }

    /// Number of heights in the range.
    pub fn height_count(&self) -> u64 {
        self.end.0 - self.start.0 + 1
    }
}

impl Display for HeightRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_rejects_start_after_end() {
        let err = HeightRange::new(BlockHeight::new(11), BlockHeight::new(10)).unwrap_err();
        assert!(matches!(
            err.detail(),
            crate::error::ErrorDetail::InvalidRange(_)
        ));
    }

    #[test]
    fn single_height_range() {
        let range = HeightRange::new(BlockHeight::new(7), BlockHeight::new(7)).unwrap();
        assert_eq!(range.height_count(), 1);
        assert!(range.contains(BlockHeight::new(7)));
        assert!(!range.contains(BlockHeight::new(8)));
    }

    #[test]
    fn lookahead_range() {
        let range = HeightRange::with_lookahead(BlockHeight::new(100), 20);
        assert_eq!(range.end(), BlockHeight::new(120));
        assert_eq!(range.height_count(), 21);
        assert_eq!(range.to_string(), "100..=120");
    }
}
