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

use blockset::{BlockRange, RangeSet};
use criterion::{Criterion, black_box};

fn sample(ranges: u64) -> RangeSet {
    (0..ranges)
        .map(|i| {
            let start = (i * 7919) % 100_000;
            BlockRange::new(start, start + 1 + i % 64)
        })
        .collect()
}

pub fn bench_parse(c: &mut Criterion) {
    let text = sample(1000).to_string();
    c.bench_function("parse 1000 ranges", |b| {
        b.iter(|| RangeSet::parse(black_box(&text)));
    });
}

pub fn bench_to_string(c: &mut Criterion) {
    let rs = sample(1000);
    c.bench_function("format 1000 ranges", |b| {
        b.iter(|| black_box(&rs).to_string());
    });
}

pub fn bench_block_number(c: &mut Criterion) {
    let rs = sample(1000);
    let blocks = rs.blocks();
    c.bench_function("block number walk", |b| {
        b.iter(|| {
            for i in (0..blocks).step_by(97) {
                black_box(rs.block_number(i));
            }
        });
    });
}

pub fn bench_split(c: &mut Criterion) {
    let rs = sample(1000);
    c.bench_function("split 1000 ranges into 16", |b| {
        b.iter(|| black_box(&rs).split(black_box(16)));
    });
}
