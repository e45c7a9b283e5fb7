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

//! # Blockset
//!
//! A Rust library describing which blocks of a block-oriented storage device an operation
//! touches. It provides an order-preserving list of block ranges with a compact text encoding,
//! and a sorted, coalesced variant that maps device byte offsets onto a dense packing of its
//! blocks.
//!
//! ## Key Features
//!
//! - **Compact Text Encoding**: `n,s0,e0,s1,e1,...` with a strict parser and an exact inverse
//! - **Order Preservation**: `RangeSet` keeps ranges as given, so equal text means equal sets
//! - **Flattened Indexing**: Address the N-th block of a set, split a set into even pieces,
//!   or slice out a window of blocks
//! - **Online Coalescing**: `SortedRangeSet` merges overlapping and adjacent ranges on every insert
//! - **Byte-Offset Mapping**: Convert byte ranges to blocks and device offsets to packed offsets
//! - **Checked and Unchecked Entry Points**: Every fallible operation has a `try_*` form
//!
//! ## Usage Examples
//!
//! ### Parsing and Formatting
//!
//! ```rust
//! use blockset::{BlockRange, RangeSet};
//!
//! let rs = RangeSet::parse("4,15,20,1,10");
//! assert_eq!(rs.blocks(), 14);
//! assert_eq!(rs[1], BlockRange::new(1, 10));
//!
//! // The 6th block (index 5) is the first block of the second range.
//! assert_eq!(rs.block_number(5), 1);
//!
//! assert_eq!(rs.to_string(), "4,15,20,1,10");
//! ```
//!
//! ### Building a Sorted Set from Byte Ranges
//!
//! ```rust
//! use blockset::{BlockSize, SortedRangeSet};
//!
//! let block_size = BlockSize::new(4096).unwrap();
//! let mut rs = SortedRangeSet::new();
//!
//! rs.insert_bytes(4096, 4096, block_size);
//! rs.insert_bytes(4096 * 3 - 1, 4096 * 7, block_size);
//! rs.insert_bytes(4096 * 15 + 1, 4096 * 4, block_size);
//! assert_eq!(rs.to_string(), "4,1,10,15,20");
//!
//! // Byte 10 of block 16 lands after the nine blocks of [1, 10) and block 15.
//! assert_eq!(rs.offset_in_range_set(4096 * 16 + 10, block_size), 40970);
//! ```
//!
//! ## Error Handling
//!
//! Invalid input is a broken precondition. Operations come in pairs: the `try_*` form returns
//! `RangeSetResult<T>`, and the plain form panics with the same message for callers that treat
//! malformed data as unrecoverable corruption. The main errors are:
//!
//! - `RangeSetError::InvalidToken`, `InvalidCount`, `CountMismatch`: malformed text
//! - `RangeSetError::InvalidRange`: an empty or reversed interval
//! - `RangeSetError::BlockIndexOutOfBounds`: a flattened index past the end of the set
//! - `RangeSetError::OffsetNotInRangeSet`: a byte offset in a block the set does not claim
//!
//! ## Logging
//!
//! Rejections are reported through the `log` facade at `debug` level and merges at `trace`
//! level. Install any `log` implementation to see them.
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for all public types; range sets use their text form.
//!
//! ## Thread Safety
//!
//! All types are plain owned values and are `Send` and `Sync`. Mutation through `insert`
//! needs `&mut`, so sharing a set across threads for writing requires an external lock.
//!
//! ## License
//!
//! Licensed under the Apache License, Version 2.0.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod blocksize;
mod range;
mod rangeset;
mod result;
#[cfg(feature = "serde")]
mod serialize;
mod sorted;

pub use self::blocksize::BlockSize;
pub use self::range::BlockRange;
pub use self::rangeset::RangeSet;
pub use self::result::{RangeSetError, RangeSetResult};
pub use self::sorted::SortedRangeSet;
