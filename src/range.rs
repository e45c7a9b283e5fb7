//
// Copyright 2025 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! The half-open block interval shared by both range set flavours.

use crate::result::{RangeSetError, RangeSetResult};
use std::fmt;
use std::ops::Range;

/// A non-empty, half-open interval `[start, end)` of block indices.
///
/// # Examples
///
/// ```rust
/// use blockset::BlockRange;
///
/// let range = BlockRange::new(4, 10);
/// assert_eq!(range.len(), 6);
/// assert!(range.contains(9));
/// assert!(!range.contains(10));
/// assert!(BlockRange::try_new(3, 3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "(u64, u64)", into = "(u64, u64)"))]
pub struct BlockRange {
    start: u64,
    end: u64,
}

impl BlockRange {
    /// Creates the interval `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start >= end`. Use [`BlockRange::try_new`] to handle that case.
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        Self::try_new(start, end).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Creates the interval `[start, end)`, rejecting empty or reversed bounds.
    pub fn try_new(start: u64, end: u64) -> RangeSetResult<Self> {
        if start < end {
            Ok(BlockRange { start, end })
        } else {
            Err(RangeSetError::InvalidRange { start, end })
        }
    }

    /// First block of the interval.
    #[inline]
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// One past the last block of the interval.
    #[inline]
    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of blocks covered.
    #[inline]
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Always `false`; a `BlockRange` covers at least one block.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if `block` lies inside the interval.
    #[inline]
    #[must_use]
    pub fn contains(&self, block: u64) -> bool {
        self.start <= block && block < self.end
    }

    /// Returns `true` if the two intervals share at least one block.
    ///
    /// Intervals that merely touch (`[1, 5)` and `[5, 8)`) do not overlap.
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &BlockRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Overlapping or adjacent; the condition under which two intervals coalesce.
    #[inline]
    pub(crate) fn touches(&self, other: &BlockRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Smallest interval covering both.
    #[inline]
    pub(crate) fn hull(&self, other: &BlockRange) -> BlockRange {
        BlockRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl TryFrom<Range<u64>> for BlockRange {
    type Error = RangeSetError;

    fn try_from(range: Range<u64>) -> RangeSetResult<Self> {
        BlockRange::try_new(range.start, range.end)
    }
}

impl TryFrom<(u64, u64)> for BlockRange {
    type Error = RangeSetError;

    fn try_from((start, end): (u64, u64)) -> RangeSetResult<Self> {
        BlockRange::try_new(start, end)
    }
}

impl From<BlockRange> for Range<u64> {
    fn from(range: BlockRange) -> Self {
        range.start..range.end
    }
}

impl From<BlockRange> for (u64, u64) {
    fn from(range: BlockRange) -> Self {
        (range.start, range.end)
    }
}
