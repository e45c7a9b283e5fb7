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

//! Serde support. Range sets travel as their text form so that persisted
//! descriptions stay byte-for-byte identical to the canonical encoding.

use crate::rangeset::RangeSet;
use crate::sorted::SortedRangeSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::borrow::Cow;

impl Serialize for RangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RangeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = Cow::<'de, str>::deserialize(deserializer)?;
        // The empty set is written as an empty string.
        if text.is_empty() {
            return Ok(RangeSet::new());
        }
        RangeSet::try_parse(&text).map_err(de::Error::custom)
    }
}

impl Serialize for SortedRangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_range_set().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SortedRangeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RangeSet::deserialize(deserializer).map(SortedRangeSet::from)
    }
}

#[cfg(test)]
mod tests {
    use crate::{BlockRange, BlockSize, RangeSet, SortedRangeSet};

    #[test]
    fn test_range_set_as_text() {
        let rs = RangeSet::parse("4,8,10,1,5");
        let json = serde_json::to_string(&rs).unwrap();
        assert_eq!(json, "\"4,8,10,1,5\"");
        assert_eq!(serde_json::from_str::<RangeSet>(&json).unwrap(), rs);
    }

    #[test]
    fn test_empty_range_set() {
        let json = serde_json::to_string(&RangeSet::new()).unwrap();
        assert_eq!(json, "\"\"");
        assert!(serde_json::from_str::<RangeSet>(&json).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_text_is_rejected() {
        assert!(serde_json::from_str::<RangeSet>("\"2,1,10 \"").is_err());
        assert!(serde_json::from_str::<RangeSet>("\"2,5,5\"").is_err());
    }

    #[test]
    fn test_sorted_range_set_normalizes() {
        let rs: SortedRangeSet = serde_json::from_str("\"4,8,10,1,8\"").unwrap();
        assert_eq!(rs.to_string(), "2,1,10");
        assert_eq!(serde_json::to_string(&rs).unwrap(), "\"2,1,10\"");
    }

    #[test]
    fn test_block_range_and_size() {
        let range = BlockRange::new(3, 9);
        assert_eq!(serde_json::to_string(&range).unwrap(), "[3,9]");
        assert_eq!(serde_json::from_str::<BlockRange>("[3,9]").unwrap(), range);
        assert!(serde_json::from_str::<BlockRange>("[9,3]").is_err());

        let bs = BlockSize::new(4096).unwrap();
        assert_eq!(serde_json::to_string(&bs).unwrap(), "4096");
        assert!(serde_json::from_str::<BlockSize>("0").is_err());
    }
}
