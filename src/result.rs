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

//! Error types and results for the blockset library.

/// A specialized Result type for blockset operations.
pub type RangeSetResult<T> = Result<T, RangeSetError>;

/// Errors that can occur while building or querying range sets.
///
/// Every variant describes a broken precondition. The `try_*` entry points
/// return them; their unchecked counterparts panic with the same message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeSetError {
    /// The text to parse was empty.
    #[error("range set text is empty")]
    Empty,
    /// A token was not a plain non-negative decimal integer.
    #[error("invalid token {token:?} at position {position}")]
    InvalidToken {
        /// Zero-based token position, the count token being position 0.
        position: usize,
        /// The offending token as it appeared in the input.
        token: String,
    },
    /// The declared token count was zero or odd.
    #[error("declared token count {0} is not a positive even number")]
    InvalidCount(u64),
    /// The declared token count disagrees with the number of tokens present.
    #[error("declared {declared} tokens but found {actual}")]
    CountMismatch {
        /// Count given by the leading token.
        declared: u64,
        /// Number of tokens following it.
        actual: usize,
    },
    /// An interval was empty or reversed.
    #[error("invalid range [{start}, {end})")]
    InvalidRange {
        /// First block of the interval.
        start: u64,
        /// One past the last block of the interval.
        end: u64,
    },
    /// The total number of blocks does not fit in a `u64`.
    #[error("total block count overflows")]
    BlockCountOverflow,
    /// A flattened block position was past the end of the set.
    #[error("block index {index} out of bounds for {blocks} blocks")]
    BlockIndexOutOfBounds {
        /// The requested position.
        index: u64,
        /// Number of blocks in the set.
        blocks: u64,
    },
    /// A byte offset fell in a block the set does not claim.
    #[error("offset {offset} (block {block}) is not in the range set")]
    OffsetNotInRangeSet {
        /// The requested byte offset.
        offset: u64,
        /// The block holding that byte.
        block: u64,
    },
    /// A byte range of length zero touches no block.
    #[error("byte range at offset {offset} is empty")]
    EmptyByteRange {
        /// Start of the empty byte range.
        offset: u64,
    },
    /// `offset + length` does not fit in a `u64`.
    #[error("byte range at offset {offset} with length {length} overflows")]
    ByteRangeOverflow {
        /// Start of the byte range.
        offset: u64,
        /// Length of the byte range.
        length: u64,
    },
    /// A block size of zero was requested.
    #[error("block size must be non-zero")]
    ZeroBlockSize,
}
