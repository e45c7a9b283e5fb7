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

//! Order-preserving lists of block ranges and their text encoding.

use crate::range::BlockRange;
use crate::result::{RangeSetError, RangeSetResult};
use log::debug;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// An ordered list of block ranges.
///
/// Ranges are kept exactly in the order they were given; they may be unsorted
/// and may overlap. Equality is therefore order sensitive. Viewed as a flat
/// sequence, a `RangeSet` lists every block of its first range, then every
/// block of its second, and so on.
///
/// The text form is `n,s0,e0,s1,e1,...` where `n` is the number of tokens
/// that follow it.
///
/// # Examples
///
/// ```rust
/// use blockset::{BlockRange, RangeSet};
///
/// let rs = RangeSet::parse("4,15,20,1,10");
/// assert_eq!(rs.len(), 2);
/// assert_eq!(rs[0], BlockRange::new(15, 20));
/// assert_eq!(rs.blocks(), 14);
/// assert_eq!(rs.block_number(5), 1);
/// assert_eq!(rs.to_string(), "4,15,20,1,10");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RangeSet {
    ranges: Vec<BlockRange>,
    blocks: u64,
}

impl RangeSet {
    /// Creates an empty `RangeSet`.
    #[must_use]
    pub fn new() -> Self {
        RangeSet::default()
    }

    /// Creates a `RangeSet` holding `ranges` in the given order.
    ///
    /// # Panics
    ///
    /// Panics if the total block count overflows a `u64`.
    #[must_use]
    pub fn from_ranges(ranges: Vec<BlockRange>) -> Self {
        Self::try_from_ranges(ranges).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Creates a `RangeSet` holding `ranges` in the given order, failing if the
    /// total block count overflows a `u64`.
    pub fn try_from_ranges(ranges: Vec<BlockRange>) -> RangeSetResult<Self> {
        let blocks = ranges
            .iter()
            .try_fold(0u64, |total, range| total.checked_add(range.len()))
            .ok_or(RangeSetError::BlockCountOverflow)?;
        Ok(RangeSet { ranges, blocks })
    }

    /// Builds a set whose block count the caller has already computed.
    pub(crate) fn from_parts(ranges: Vec<BlockRange>, blocks: u64) -> Self {
        debug_assert_eq!(blocks, ranges.iter().map(BlockRange::len).sum::<u64>());
        RangeSet { ranges, blocks }
    }

    /// Replaces the ranges in `span` with `range`, returning how many were removed.
    ///
    /// Callers guarantee the result cannot overflow the block count, which holds
    /// whenever the stored ranges are disjoint.
    pub(crate) fn splice(&mut self, span: std::ops::Range<usize>, range: BlockRange) -> usize {
        let removed: u64 = self.ranges[span.clone()].iter().map(BlockRange::len).sum();
        let count = span.len();
        self.ranges.splice(span, std::iter::once(range));
        self.blocks = self.blocks - removed + range.len();
        count
    }

    /// Parses the text form, panicking on malformed input.
    ///
    /// Use this where malformed text means the surrounding data is corrupt and
    /// there is nothing sensible left to do. Otherwise use [`RangeSet::try_parse`].
    ///
    /// # Panics
    ///
    /// Panics under the same conditions [`RangeSet::try_parse`] returns an error.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::try_parse(text).unwrap_or_else(|err| panic!("failed to parse {text:?}: {err}"))
    }

    /// Parses the text form `n,s0,e0,s1,e1,...`.
    ///
    /// Each token may carry leading ASCII whitespace and must otherwise be a
    /// plain decimal number; leading zeros are accepted, while signs and
    /// trailing whitespace are not. `n` must be positive, even, and equal to the
    /// number of tokens after it, and every pair must satisfy `start < end`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockset::{RangeSet, RangeSetError};
    ///
    /// assert_eq!(RangeSet::try_parse(" 2, 1,   10"), Ok(RangeSet::parse("2,1,10")));
    /// assert!(matches!(
    ///     RangeSet::try_parse("2,1,10 "),
    ///     Err(RangeSetError::InvalidToken { position: 2, .. })
    /// ));
    /// ```
    pub fn try_parse(text: &str) -> RangeSetResult<Self> {
        let result = Self::parse_tokens(text);
        if let Err(err) = &result {
            debug!("rejecting range set {text:?}: {err}");
        }
        result
    }

    fn parse_tokens(text: &str) -> RangeSetResult<Self> {
        if text.is_empty() {
            return Err(RangeSetError::Empty);
        }

        let values = text
            .split(',')
            .enumerate()
            .map(|(position, token)| parse_token(position, token))
            .collect::<RangeSetResult<Vec<u64>>>()?;
        let (&declared, bounds) = values.split_first().ok_or(RangeSetError::Empty)?;

        if declared == 0 || declared % 2 != 0 {
            return Err(RangeSetError::InvalidCount(declared));
        }
        if usize::try_from(declared) != Ok(bounds.len()) {
            return Err(RangeSetError::CountMismatch {
                declared,
                actual: bounds.len(),
            });
        }

        let ranges = bounds
            .chunks_exact(2)
            .map(|pair| BlockRange::try_new(pair[0], pair[1]))
            .collect::<RangeSetResult<Vec<_>>>()?;
        Self::try_from_ranges(ranges)
    }

    /// Appends a range, panicking if the block count would overflow.
    ///
    /// # Panics
    ///
    /// Panics if the total block count overflows a `u64`.
    pub fn push(&mut self, range: BlockRange) {
        self.try_push(range).unwrap_or_else(|err| panic!("{err}"));
    }

    /// Appends a range after the existing ones.
    pub fn try_push(&mut self, range: BlockRange) -> RangeSetResult<()> {
        self.blocks = self
            .blocks
            .checked_add(range.len())
            .ok_or(RangeSetError::BlockCountOverflow)?;
        self.ranges.push(range);
        Ok(())
    }

    /// Removes every range.
    pub fn clear(&mut self) {
        self.ranges.clear();
        self.blocks = 0;
    }

    /// Number of ranges.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns `true` if the set holds no ranges.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of blocks, counting overlapping blocks once per range.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// The range at `index`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<BlockRange> {
        self.ranges.get(index).copied()
    }

    /// The stored ranges in order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[BlockRange] {
        &self.ranges
    }

    /// Iterates over the ranges in stored order. Call `.rev()` to walk them backwards.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, BlockRange> {
        self.ranges.iter()
    }

    /// Returns the block at position `index` of the flattened block sequence.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.blocks()`.
    #[must_use]
    pub fn block_number(&self, index: u64) -> u64 {
        self.try_block_number(index)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Returns the block at position `index` of the flattened block sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockset::RangeSet;
    ///
    /// let rs = RangeSet::parse("4,1,3,10,12");
    /// assert_eq!(rs.try_block_number(1), Ok(2));
    /// assert_eq!(rs.try_block_number(2), Ok(10));
    /// assert!(rs.try_block_number(4).is_err());
    /// ```
    pub fn try_block_number(&self, index: u64) -> RangeSetResult<u64> {
        let mut remaining = index;
        for range in &self.ranges {
            if remaining < range.len() {
                return Ok(range.start() + remaining);
            }
            remaining -= range.len();
        }
        Err(RangeSetError::BlockIndexOutOfBounds {
            index,
            blocks: self.blocks,
        })
    }

    /// Returns `true` if any range of `self` shares a block with any range of `other`.
    ///
    /// Ranges that only touch do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &RangeSet) -> bool {
        self.ranges
            .iter()
            .any(|range| other.ranges.iter().any(|theirs| range.overlaps(theirs)))
    }

    /// Cuts the flattened block sequence into at most `groups` consecutive pieces.
    ///
    /// Piece sizes differ by at most one block, the larger pieces coming
    /// first. Fewer pieces are returned when the set has fewer blocks than
    /// `groups`, and none when it is empty or `groups` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockset::RangeSet;
    ///
    /// let pieces = RangeSet::parse("4,0,5,10,12").split(3);
    /// let text: Vec<_> = pieces.iter().map(ToString::to_string).collect();
    /// assert_eq!(text, ["2,0,3", "2,3,5", "2,10,12"]);
    /// ```
    #[must_use]
    pub fn split(&self, groups: usize) -> Vec<RangeSet> {
        if groups == 0 || self.blocks == 0 {
            return Vec::new();
        }
        let groups = u64::try_from(groups).map_or(self.blocks, |g| g.min(self.blocks));
        let base = self.blocks / groups;
        let larger = self.blocks % groups;
        let quota_for = |piece: u64| base + u64::from(piece < larger);

        let mut pieces = Vec::new();
        let mut current = Vec::new();
        let mut quota = quota_for(0);
        let mut taken = 0u64;
        for range in &self.ranges {
            let mut start = range.start();
            while start < range.end() {
                let take = (quota - taken).min(range.end() - start);
                current.push(BlockRange::new(start, start + take));
                start += take;
                taken += take;
                if taken == quota {
                    pieces.push(RangeSet::from_parts(std::mem::take(&mut current), quota));
                    taken = 0;
                    quota = quota_for(pieces.len() as u64);
                }
            }
        }
        pieces
    }

    /// The ranges covering flattened positions `[start, start + count)`.
    ///
    /// Returns `None` if `count` is zero or the window extends past
    /// [`RangeSet::blocks`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockset::RangeSet;
    ///
    /// let rs = RangeSet::parse("4,0,5,10,12");
    /// assert_eq!(rs.sub_ranges(3, 3), Some(RangeSet::parse("4,3,5,10,11")));
    /// assert_eq!(rs.sub_ranges(6, 2), None);
    /// ```
    #[must_use]
    pub fn sub_ranges(&self, start: u64, count: u64) -> Option<RangeSet> {
        let end = start.checked_add(count)?;
        if count == 0 || end > self.blocks {
            return None;
        }

        let mut ranges = Vec::new();
        let mut first = 0u64;
        for range in &self.ranges {
            let last = first + range.len();
            if last > start {
                if first >= end {
                    break;
                }
                let lo = start.max(first) - first;
                let hi = end.min(last) - first;
                ranges.push(BlockRange::new(range.start() + lo, range.start() + hi));
            }
            first = last;
        }
        Some(RangeSet::from_parts(ranges, count))
    }
}

fn parse_token(position: usize, token: &str) -> RangeSetResult<u64> {
    // Same set as C `isspace`, which includes vertical tab.
    let digits = token.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0B');
    let invalid = || RangeSetError::InvalidToken {
        position,
        token: token.to_owned(),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    // Still fails on overflow.
    digits.parse::<u64>().map_err(|_| invalid())
}

impl fmt::Display for RangeSet {
    /// Writes the text form. An empty set writes nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ranges.is_empty() {
            return Ok(());
        }
        write!(f, "{}", self.ranges.len() * 2)?;
        for range in &self.ranges {
            write!(f, ",{},{}", range.start(), range.end())?;
        }
        Ok(())
    }
}

impl FromStr for RangeSet {
    type Err = RangeSetError;

    fn from_str(text: &str) -> RangeSetResult<Self> {
        RangeSet::try_parse(text)
    }
}

impl Index<usize> for RangeSet {
    type Output = BlockRange;

    fn index(&self, index: usize) -> &BlockRange {
        self.ranges.get(index).unwrap_or_else(|| {
            panic!(
                "range index {index} out of bounds for {} ranges",
                self.ranges.len()
            )
        })
    }
}

impl FromIterator<BlockRange> for RangeSet {
    /// # Panics
    ///
    /// Panics if the total block count overflows a `u64`.
    fn from_iter<I: IntoIterator<Item = BlockRange>>(iter: I) -> Self {
        RangeSet::from_ranges(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = &'a BlockRange;
    type IntoIter = std::slice::Iter<'a, BlockRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl IntoIterator for RangeSet {
    type Item = BlockRange;
    type IntoIter = std::vec::IntoIter<BlockRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.into_iter()
    }
}
