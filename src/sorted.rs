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

//! Sorted, coalesced range sets with byte-offset queries.

use crate::blocksize::BlockSize;
use crate::range::BlockRange;
use crate::rangeset::RangeSet;
use crate::result::{RangeSetError, RangeSetResult};
use log::{debug, trace};
use std::fmt;
use std::ops::Index;

/// A [`RangeSet`] whose ranges are sorted by start and never overlap or touch.
///
/// Overlapping or adjacent input ranges are merged on construction and on
/// every insertion, so the set holds the minimal run-length description of the
/// blocks it covers. Byte-offset operations take the block size as an argument.
///
/// # Examples
///
/// ```rust
/// use blockset::{BlockRange, BlockSize, SortedRangeSet};
///
/// let mut rs = SortedRangeSet::from_ranges(vec![
///     BlockRange::new(1, 3),
///     BlockRange::new(4, 6),
///     BlockRange::new(8, 14),
/// ]);
/// rs.insert(BlockRange::new(3, 5));
/// assert_eq!(rs.to_string(), "4,1,6,8,14");
/// assert_eq!(rs.blocks(), 11);
///
/// let block_size = BlockSize::new(4096).unwrap();
/// assert_eq!(rs.offset_in_range_set(4096 * 8 + 7, block_size), 4096 * 5 + 7);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SortedRangeSet {
    set: RangeSet,
}

impl SortedRangeSet {
    /// Creates an empty `SortedRangeSet`.
    #[must_use]
    pub fn new() -> Self {
        SortedRangeSet::default()
    }

    /// Sorts and coalesces an arbitrary list of ranges.
    ///
    /// After sorting, a range is folded into the one before it when the two
    /// overlap or touch.
    #[must_use]
    pub fn from_ranges(mut ranges: Vec<BlockRange>) -> Self {
        ranges.sort_unstable();

        let mut merged: Vec<BlockRange> = Vec::with_capacity(ranges.len());
        let mut blocks = 0u64;
        for range in ranges {
            match merged.last_mut() {
                Some(last) if last.touches(&range) => {
                    trace!("coalescing {range} into {last}");
                    blocks -= last.len();
                    *last = last.hull(&range);
                    blocks += last.len();
                }
                _ => {
                    blocks += range.len();
                    merged.push(range);
                }
            }
        }
        SortedRangeSet {
            set: RangeSet::from_parts(merged, blocks),
        }
    }

    /// Inserts one range, merging it with every stored range it overlaps or touches.
    ///
    /// The result equals re-sorting and re-coalescing the whole set with
    /// `range` added.
    pub fn insert(&mut self, range: BlockRange) {
        let stored = self.set.as_slice();
        // Everything in `lo..hi` overlaps or touches `range`.
        let lo = stored.partition_point(|r| r.end() < range.start());
        let hi = stored.partition_point(|r| r.start() <= range.end());
        debug_assert!(stored[lo..hi].iter().all(|r| r.touches(&range)));
        let merged = stored[lo..hi].iter().fold(range, |acc, r| acc.hull(r));
        let absorbed = self.set.splice(lo..hi, merged);
        if absorbed > 0 {
            trace!("inserting {range} absorbed {absorbed} ranges into {merged}");
        }
    }

    /// Inserts every range of `other`.
    pub fn insert_set(&mut self, other: &SortedRangeSet) {
        for range in other {
            self.insert(*range);
        }
    }

    /// Inserts the blocks touched by `length` bytes starting at byte `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `length` is zero or `offset + length` overflows.
    pub fn insert_bytes(&mut self, offset: u64, length: u64, block_size: BlockSize) {
        self.try_insert_bytes(offset, length, block_size)
            .unwrap_or_else(|err| panic!("{err}"));
    }

    /// Inserts the blocks touched by `length` bytes starting at byte `offset`.
    ///
    /// The touched blocks run from `offset / block_size` up to
    /// `ceil((offset + length) / block_size)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockset::{BlockSize, SortedRangeSet};
    ///
    /// let block_size = BlockSize::new(4096).unwrap();
    /// let mut rs = SortedRangeSet::new();
    /// rs.try_insert_bytes(4095, 2, block_size).unwrap();
    /// assert_eq!(rs.to_string(), "2,0,2");
    /// assert!(rs.try_insert_bytes(0, 0, block_size).is_err());
    /// ```
    pub fn try_insert_bytes(
        &mut self,
        offset: u64,
        length: u64,
        block_size: BlockSize,
    ) -> RangeSetResult<()> {
        let range = block_size.blocks_touched(offset, length)?;
        self.insert(range);
        Ok(())
    }

    /// Returns `true` if any block touched by the byte range is in the set.
    ///
    /// # Panics
    ///
    /// Panics if `offset + length` overflows.
    #[must_use]
    pub fn overlaps_bytes(&self, offset: u64, length: u64, block_size: BlockSize) -> bool {
        self.try_overlaps_bytes(offset, length, block_size)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Returns `true` if any block touched by the byte range is in the set.
    ///
    /// A zero-length byte range touches no block and never overlaps.
    pub fn try_overlaps_bytes(
        &self,
        offset: u64,
        length: u64,
        block_size: BlockSize,
    ) -> RangeSetResult<bool> {
        match block_size.blocks_touched(offset, length) {
            Ok(range) => Ok(self.overlaps_range(range)),
            Err(RangeSetError::EmptyByteRange { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Returns `true` if `range` shares a block with the set.
    #[must_use]
    pub fn overlaps_range(&self, range: BlockRange) -> bool {
        let stored = self.set.as_slice();
        let idx = stored.partition_point(|r| r.end() <= range.start());
        stored.get(idx).is_some_and(|r| r.start() < range.end())
    }

    /// Returns `true` if the two sets share a block.
    #[must_use]
    pub fn overlaps(&self, other: &SortedRangeSet) -> bool {
        let (ours, theirs) = (self.set.as_slice(), other.set.as_slice());
        let (mut i, mut j) = (0, 0);
        while i < ours.len() && j < theirs.len() {
            if ours[i].overlaps(&theirs[j]) {
                return true;
            }
            // Whichever ends first cannot reach anything further along the other set.
            if ours[i].end() <= theirs[j].end() {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }

    /// Returns `true` if `block` is in the set.
    #[must_use]
    pub fn contains_block(&self, block: u64) -> bool {
        let stored = self.set.as_slice();
        let idx = stored.partition_point(|r| r.end() <= block);
        stored.get(idx).is_some_and(|r| r.contains(block))
    }

    /// Maps a device byte offset to its position in the dense packing of the set.
    ///
    /// # Panics
    ///
    /// Panics if the block holding `offset` is not in the set.
    #[must_use]
    pub fn offset_in_range_set(&self, offset: u64, block_size: BlockSize) -> u64 {
        self.try_offset_in_range_set(offset, block_size)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Maps a device byte offset to its position in the dense packing of the set.
    ///
    /// The dense packing concatenates every block of the set in ascending
    /// order. The result is the number of bytes in blocks of the set before
    /// the one holding `offset`, plus the offset within that block.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockset::{BlockRange, BlockSize, SortedRangeSet};
    ///
    /// let block_size = BlockSize::new(4096).unwrap();
    /// let rs = SortedRangeSet::from_ranges(vec![BlockRange::new(1, 10), BlockRange::new(15, 20)]);
    /// assert_eq!(rs.try_offset_in_range_set(4106, block_size), Ok(10));
    /// assert_eq!(rs.try_offset_in_range_set(4096 * 16 + 10, block_size), Ok(40970));
    /// assert!(rs.try_offset_in_range_set(40970, block_size).is_err());
    /// ```
    pub fn try_offset_in_range_set(&self, offset: u64, block_size: BlockSize) -> RangeSetResult<u64> {
        let (block, within) = block_size.locate(offset);
        let mut preceding = 0u64;
        for range in self.iter() {
            if range.start() > block {
                break;
            }
            if range.contains(block) {
                let packed = preceding + (block - range.start());
                return Ok(packed * block_size.get() + within);
            }
            preceding += range.len();
        }
        debug!("offset {offset} falls in block {block}, which is not in {self}");
        Err(RangeSetError::OffsetNotInRangeSet { offset, block })
    }

    /// Number of ranges.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Returns `true` if the set holds no ranges.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Total number of blocks in the set.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> u64 {
        self.set.blocks()
    }

    /// The range at `index`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<BlockRange> {
        self.set.get(index)
    }

    /// Iterates over the ranges in ascending order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, BlockRange> {
        self.set.iter()
    }

    /// The `index`-th block of the set in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.blocks()`.
    #[must_use]
    pub fn block_number(&self, index: u64) -> u64 {
        self.set.block_number(index)
    }

    /// The `index`-th block of the set in ascending order.
    pub fn try_block_number(&self, index: u64) -> RangeSetResult<u64> {
        self.set.try_block_number(index)
    }

    /// Borrows the set as a plain [`RangeSet`].
    #[inline]
    #[must_use]
    pub fn as_range_set(&self) -> &RangeSet {
        &self.set
    }

    /// Converts into a plain [`RangeSet`].
    #[must_use]
    pub fn into_range_set(self) -> RangeSet {
        self.set
    }
}

impl fmt::Display for SortedRangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.set, f)
    }
}

impl Index<usize> for SortedRangeSet {
    type Output = BlockRange;

    fn index(&self, index: usize) -> &BlockRange {
        &self.set[index]
    }
}

impl AsRef<RangeSet> for SortedRangeSet {
    fn as_ref(&self) -> &RangeSet {
        &self.set
    }
}

impl From<SortedRangeSet> for RangeSet {
    fn from(sorted: SortedRangeSet) -> Self {
        sorted.set
    }
}

impl From<RangeSet> for SortedRangeSet {
    fn from(set: RangeSet) -> Self {
        SortedRangeSet::from_ranges(set.into_iter().collect())
    }
}

impl FromIterator<BlockRange> for SortedRangeSet {
    fn from_iter<I: IntoIterator<Item = BlockRange>>(iter: I) -> Self {
        SortedRangeSet::from_ranges(iter.into_iter().collect())
    }
}

impl Extend<BlockRange> for SortedRangeSet {
    fn extend<I: IntoIterator<Item = BlockRange>>(&mut self, iter: I) {
        for range in iter {
            self.insert(range);
        }
    }
}

impl<'a> IntoIterator for &'a SortedRangeSet {
    type Item = &'a BlockRange;
    type IntoIter = std::slice::Iter<'a, BlockRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.set.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use test_strategy::proptest;

    fn sorted(ranges: &[(u64, u64)]) -> SortedRangeSet {
        ranges
            .iter()
            .map(|&(start, end)| BlockRange::new(start, end))
            .collect()
    }

    fn pairs(rs: &SortedRangeSet) -> Vec<(u64, u64)> {
        rs.iter().map(|range| (range.start(), range.end())).collect()
    }

    fn bs4k() -> BlockSize {
        BlockSize::new(4096).unwrap()
    }

    fn assert_canonical(rs: &SortedRangeSet) {
        for pair in rs.as_range_set().as_slice().windows(2) {
            assert!(pair[0].end() < pair[1].start(), "{} then {}", pair[0], pair[1]);
        }
        assert_eq!(rs.blocks(), rs.iter().map(BlockRange::len).sum::<u64>());
    }

    #[test]
    fn test_construction_normalizes() {
        let rs = sorted(&[(8, 14), (1, 3), (2, 5), (5, 6), (20, 21)]);
        assert_eq!(pairs(&rs), vec![(1, 6), (8, 14), (20, 21)]);
        assert_eq!(rs.blocks(), 12);
        assert_canonical(&rs);
    }

    #[test]
    fn test_construction_is_idempotent() {
        let input = [(1, 3), (4, 6), (8, 14)];
        let rs = sorted(&input);
        assert_eq!(pairs(&rs), input.to_vec());
        assert_eq!(SortedRangeSet::from(rs.as_range_set().clone()), rs);
    }

    #[test]
    fn test_construction_merges_adjacent_only() {
        let rs = sorted(&[(5, 8), (1, 5), (9, 12), (12, 13)]);
        assert_eq!(pairs(&rs), vec![(1, 8), (9, 13)]);
        assert_eq!(rs.blocks(), 11);
        assert_canonical(&rs);
    }

    #[test]
    fn test_insert_adjacent_on_both_sides() {
        let mut rs = sorted(&[(1, 4), (6, 9), (20, 22)]);
        rs.insert(BlockRange::new(4, 6));
        assert_eq!(pairs(&rs), vec![(1, 9), (20, 22)]);
        rs.insert(BlockRange::new(10, 19));
        assert_eq!(pairs(&rs), vec![(1, 9), (10, 19), (20, 22)]);
        assert_eq!(rs.blocks(), 19);
    }

    #[test]
    fn test_construction_nested_ranges() {
        let rs = sorted(&[(1, 20), (3, 5), (10, 12)]);
        assert_eq!(pairs(&rs), vec![(1, 20)]);
        assert_eq!(rs.blocks(), 19);
    }

    #[test]
    fn test_insertion() {
        let mut rs = sorted(&[(2, 3), (4, 6), (8, 14)]);
        rs.insert(BlockRange::new(1, 2));
        assert_eq!(rs, sorted(&[(1, 3), (4, 6), (8, 14)]));
        assert_eq!(rs.blocks(), 10);

        rs.insert(BlockRange::new(3, 5));
        assert_eq!(rs, sorted(&[(1, 6), (8, 14)]));
        assert_eq!(rs.blocks(), 11);

        let r1 = sorted(&[(20, 22), (15, 18)]);
        rs.insert_set(&r1);
        assert_eq!(rs, sorted(&[(1, 6), (8, 14), (15, 18), (20, 22)]));
        assert_eq!(rs.blocks(), 16);

        let r2 = sorted(&[(2, 7), (15, 21), (20, 25)]);
        rs.insert_set(&r2);
        assert_eq!(rs, sorted(&[(1, 7), (8, 14), (15, 25)]));
        assert_eq!(rs.blocks(), 22);
    }

    #[test]
    fn test_insert_bridges_gap() {
        let mut rs = sorted(&[(1, 3), (6, 8), (12, 14)]);
        rs.insert(BlockRange::new(2, 7));
        assert_eq!(pairs(&rs), vec![(1, 8), (12, 14)]);

        rs.insert(BlockRange::new(0, 40));
        assert_eq!(pairs(&rs), vec![(0, 40)]);
        assert_eq!(rs.blocks(), 40);
    }

    #[test]
    fn test_insert_disjoint_positions() {
        let mut rs = sorted(&[(10, 12)]);
        rs.insert(BlockRange::new(0, 2));
        rs.insert(BlockRange::new(20, 22));
        rs.insert(BlockRange::new(15, 16));
        assert_eq!(pairs(&rs), vec![(0, 2), (10, 12), (15, 16), (20, 22)]);
        assert_canonical(&rs);
    }

    #[test]
    fn test_insert_into_empty_and_extend() {
        let mut rs = SortedRangeSet::new();
        assert!(rs.is_empty());
        rs.extend([BlockRange::new(5, 6), BlockRange::new(4, 5), BlockRange::new(6, 7)]);
        assert_eq!(pairs(&rs), vec![(4, 7)]);
        assert_eq!(rs.len(), 1);
    }

    #[test]
    fn test_file_range() {
        let mut rs = SortedRangeSet::new();
        rs.insert_bytes(4096, 4096, bs4k());
        assert_eq!(rs, sorted(&[(1, 2)]));
        // Blocks 2 through 9.
        rs.insert_bytes(4096 * 3 - 1, 4096 * 7, bs4k());
        assert_eq!(rs, sorted(&[(1, 10)]));
        // Blocks 15 through 19.
        rs.insert_bytes(4096 * 15 + 1, 4096 * 4, bs4k());
        assert_eq!(rs, sorted(&[(1, 10), (15, 20)]));

        // Touches block 1 and 2.
        assert!(rs.overlaps_bytes(4096 * 2 - 1, 10, bs4k()));
        assert!(!rs.overlaps_bytes(4096 * 10, 4096 * 5, bs4k()));

        assert_eq!(rs.offset_in_range_set(4106, bs4k()), 10);
        assert_eq!(rs.offset_in_range_set(4096 * 16 + 10, bs4k()), 40970);
        // Block 10 is not in the set.
        assert_eq!(
            rs.try_offset_in_range_set(40970, bs4k()),
            Err(RangeSetError::OffsetNotInRangeSet {
                offset: 40970,
                block: 10
            })
        );
    }

    #[test]
    #[should_panic(expected = "not in the range set")]
    fn test_offset_in_range_set_panics_outside() {
        let rs = sorted(&[(1, 10), (15, 20)]);
        let _offset = rs.offset_in_range_set(40970, bs4k());
    }

    #[test]
    fn test_byte_operations_edge_cases() {
        let mut rs = sorted(&[(1, 2)]);
        assert_eq!(
            rs.try_insert_bytes(4096, 0, bs4k()),
            Err(RangeSetError::EmptyByteRange { offset: 4096 })
        );
        assert_eq!(rs.try_overlaps_bytes(4096, 0, bs4k()), Ok(false));
        assert!(rs.try_overlaps_bytes(u64::MAX, 1, bs4k()).is_err());
        assert!(rs.try_insert_bytes(u64::MAX, 1, bs4k()).is_err());
        assert_eq!(pairs(&rs), vec![(1, 2)]);
    }

    #[test]
    #[should_panic(expected = "is empty")]
    fn test_insert_bytes_panics_on_empty() {
        SortedRangeSet::new().insert_bytes(0, 0, bs4k());
    }

    #[test]
    fn test_offset_in_range_set_small_blocks() {
        let bs = BlockSize::new(512).unwrap();
        let rs = sorted(&[(2, 4), (10, 11)]);
        assert_eq!(rs.offset_in_range_set(2 * 512, bs), 0);
        assert_eq!(rs.offset_in_range_set(4 * 512 - 1, bs), 2 * 512 - 1);
        assert_eq!(rs.offset_in_range_set(10 * 512 + 3, bs), 2 * 512 + 3);
        assert!(rs.try_offset_in_range_set(0, bs).is_err());
        assert!(rs.try_offset_in_range_set(11 * 512, bs).is_err());
    }

    #[test]
    fn test_overlaps_and_contains() {
        let rs = sorted(&[(1, 6), (10, 12)]);
        assert!(rs.overlaps_range(BlockRange::new(5, 7)));
        assert!(rs.overlaps_range(BlockRange::new(0, 100)));
        assert!(!rs.overlaps_range(BlockRange::new(6, 10)));
        assert!(!rs.overlaps_range(BlockRange::new(12, 13)));

        assert!(rs.overlaps(&sorted(&[(7, 9), (11, 20)])));
        assert!(!rs.overlaps(&sorted(&[(6, 10), (12, 20)])));
        assert!(!rs.overlaps(&SortedRangeSet::new()));

        assert!(rs.contains_block(1));
        assert!(rs.contains_block(5));
        assert!(!rs.contains_block(6));
        assert!(rs.contains_block(11));
        assert!(!rs.contains_block(12));
    }

    #[test]
    #[should_panic(expected = "range index 2 out of bounds for 2 ranges")]
    fn test_index_panics_out_of_bounds() {
        let rs = sorted(&[(1, 3), (5, 7)]);
        let _range: BlockRange = rs[2];
    }

    #[test]
    fn test_accessors_and_conversions() {
        let rs = sorted(&[(15, 20), (1, 10)]);
        assert_eq!(rs[0], BlockRange::new(1, 10));
        assert_eq!(rs.get(1), Some(BlockRange::new(15, 20)));
        assert_eq!(rs.get(2), None);
        assert_eq!(rs.block_number(9), 15);
        assert!(rs.try_block_number(14).is_err());
        assert_eq!(rs.to_string(), "4,1,10,15,20");
        assert_eq!(rs.as_ref(), &RangeSet::parse("4,1,10,15,20"));
        assert_eq!(RangeSet::from(rs.clone()), rs.into_range_set());
    }

    #[proptest]
    fn test_incremental_insert_matches_normalization(
        #[strategy(vec(proptest::prelude::any::<BlockRange>(), 0..24))] ranges: Vec<BlockRange>,
    ) {
        let mut incremental = SortedRangeSet::new();
        for range in &ranges {
            incremental.insert(*range);
            assert_canonical(&incremental);
        }
        assert_eq!(incremental, SortedRangeSet::from_ranges(ranges));
    }

    #[proptest]
    fn test_insert_set_is_order_independent(a: RangeSet, b: RangeSet) {
        let (a, b) = (SortedRangeSet::from(a), SortedRangeSet::from(b));
        let mut ab = a.clone();
        ab.insert_set(&b);
        let mut ba = b.clone();
        ba.insert_set(&a);
        assert_eq!(ab, ba);
        assert_canonical(&ab);
    }

    #[proptest]
    fn test_normalization_covers_same_blocks(rs: RangeSet) {
        let normalized = SortedRangeSet::from(rs.clone());
        let mut expected: Vec<u64> = rs
            .iter()
            .flat_map(|range| range.start()..range.end())
            .collect();
        expected.sort_unstable();
        expected.dedup();
        let actual: Vec<u64> = normalized
            .iter()
            .flat_map(|range| range.start()..range.end())
            .collect();
        assert_eq!(actual, expected);
        assert_eq!(SortedRangeSet::from(normalized.as_range_set().clone()), normalized);
    }

    #[proptest]
    fn test_sorted_overlaps_agrees_with_range_set(a: RangeSet, b: RangeSet) {
        let (sa, sb) = (SortedRangeSet::from(a.clone()), SortedRangeSet::from(b.clone()));
        assert_eq!(sa.overlaps(&sb), a.overlaps(&b));
        assert_eq!(sa.overlaps(&sb), sb.overlaps(&sa));
    }

    #[proptest]
    fn test_offset_in_range_set_is_dense_packing(
        rs: RangeSet,
        #[strategy(1u64..64)] block_size: u64,
    ) {
        let rs = SortedRangeSet::from(rs);
        let bs = BlockSize::new(block_size).unwrap();
        for index in 0..rs.blocks() {
            let block = rs.block_number(index);
            for within in [0, block_size / 2, block_size - 1] {
                let offset = block * block_size + within;
                assert_eq!(rs.offset_in_range_set(offset, bs), index * block_size + within);
                assert!(rs.overlaps_bytes(offset, 1, bs));
            }
        }
    }
}
