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

//! Bytes-per-block configuration for the byte-offset operations.

use crate::range::BlockRange;
use crate::result::{RangeSetError, RangeSetResult};
use std::fmt;
use std::num::NonZeroU64;

/// The number of bytes in one device block.
///
/// There is no default; the embedding system decides (typically the device
/// sector or file system block size).
///
/// # Examples
///
/// ```rust
/// use blockset::BlockSize;
///
/// let block_size = BlockSize::new(4096).unwrap();
/// assert_eq!(block_size.get(), 4096);
/// assert!(BlockSize::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BlockSize(NonZeroU64);

impl BlockSize {
    /// Creates a block size, rejecting zero.
    pub fn new(bytes: u64) -> RangeSetResult<Self> {
        NonZeroU64::new(bytes)
            .map(BlockSize)
            .ok_or(RangeSetError::ZeroBlockSize)
    }

    /// Creates a block size from an already validated value.
    #[must_use]
    pub const fn from_nonzero(bytes: NonZeroU64) -> Self {
        BlockSize(bytes)
    }

    /// The block size in bytes.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Splits a byte offset into its block and the remainder within that block.
    #[inline]
    pub(crate) fn locate(self, offset: u64) -> (u64, u64) {
        (offset / self.get(), offset % self.get())
    }

    /// The smallest run of whole blocks touched by `length` bytes at `offset`.
    pub(crate) fn blocks_touched(self, offset: u64, length: u64) -> RangeSetResult<BlockRange> {
        if length == 0 {
            return Err(RangeSetError::EmptyByteRange { offset });
        }
        let end = offset
            .checked_add(length)
            .ok_or(RangeSetError::ByteRangeOverflow { offset, length })?;
        BlockRange::try_new(offset / self.get(), end.div_ceil(self.get()))
    }
}

impl From<NonZeroU64> for BlockSize {
    fn from(bytes: NonZeroU64) -> Self {
        BlockSize(bytes)
    }
}

impl TryFrom<u64> for BlockSize {
    type Error = RangeSetError;

    fn try_from(bytes: u64) -> RangeSetResult<Self> {
        BlockSize::new(bytes)
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}
