// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Join Tests
//!
//! Every strategy must produce the same set of matching position pairs,
//! and swapping the operands must swap the pairs.

use colstore::executor::{choose_strategy, join, JoinHashTable, JoinInput, JoinOutput, JoinStrategy};
use colstore::Config;

const STRATEGIES: [JoinStrategy; 3] = [
    JoinStrategy::NestedLoop,
    JoinStrategy::Hash,
    JoinStrategy::RadixPartitioned,
];

fn pairs(out: &JoinOutput) -> Vec<(i32, i32)> {
    assert_eq!(out.left.len(), out.right.len());
    let mut pairs: Vec<(i32, i32)> = out.left.iter().copied().zip(out.right.iter().copied()).collect();
    pairs.sort_unstable();
    pairs
}

fn swapped(mut pairs: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
    for pair in &mut pairs {
        *pair = (pair.1, pair.0);
    }
    pairs.sort_unstable();
    pairs
}

/// Pseudo-random values in `0..modulus`
fn values(count: usize, modulus: i32, seed: u64) -> Vec<i32> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as i32).rem_euclid(modulus)
        })
        .collect()
}

fn expected(left: JoinInput<'_>, right: JoinInput<'_>) -> Vec<(i32, i32)> {
    let mut pairs = Vec::new();
    for (&lv, &lp) in left.values.iter().zip(left.positions) {
        for (&rv, &rp) in right.values.iter().zip(right.positions) {
            if lv == rv {
                pairs.push((lp, rp));
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

/// Config that partitions down to tiny leaves
fn partitioning_config() -> Config {
    Config::new().with_cache_size_bytes(16).with_hash_threshold_bytes(0)
}

#[test]
fn test_small_example_all_strategies() {
    let left = JoinInput::new(&[0, 1, 2, 3], &[1, 2, 2, 3]).unwrap();
    let right = JoinInput::new(&[0, 1, 2], &[2, 3, 3]).unwrap();
    for strategy in STRATEGIES {
        let out = join(left, right, &Config::default(), Some(strategy));
        assert_eq!(
            pairs(&out),
            vec![(1, 0), (2, 0), (3, 1), (3, 2)],
            "strategy {}",
            strategy
        );
    }
}

#[test]
fn test_strategies_agree_on_larger_inputs() {
    let config = partitioning_config();
    let lv = values(3000, 500, 1);
    let rv = values(2000, 500, 2);
    let lp: Vec<i32> = (0..lv.len() as i32).collect();
    let rp: Vec<i32> = (0..rv.len() as i32).map(|p| p * 2 + 1).collect();
    let left = JoinInput::new(&lp, &lv).unwrap();
    let right = JoinInput::new(&rp, &rv).unwrap();

    let truth = expected(left, right);
    assert!(!truth.is_empty());
    for strategy in STRATEGIES {
        assert_eq!(pairs(&join(left, right, &config, Some(strategy))), truth, "{}", strategy);
    }
}

#[test]
fn test_join_is_symmetric() {
    let config = partitioning_config();
    let av = values(700, 60, 11);
    let bv = values(900, 60, 12);
    let ap: Vec<i32> = (0..700).collect();
    let bp: Vec<i32> = (1000..1900).collect();
    let a = JoinInput::new(&ap, &av).unwrap();
    let b = JoinInput::new(&bp, &bv).unwrap();
    for strategy in STRATEGIES {
        let ab = pairs(&join(a, b, &config, Some(strategy)));
        let ba = pairs(&join(b, a, &config, Some(strategy)));
        assert_eq!(ab, swapped(ba), "{}", strategy);
    }
}

#[test]
fn test_negative_and_extreme_values() {
    let config = partitioning_config();
    let lv = [i32::MIN, -7, 0, i32::MAX, -7, 12];
    let rv = [-7, i32::MAX, i32::MIN, 5, -7];
    let lp: Vec<i32> = (0..lv.len() as i32).collect();
    let rp: Vec<i32> = (0..rv.len() as i32).collect();
    let left = JoinInput::new(&lp, &lv).unwrap();
    let right = JoinInput::new(&rp, &rv).unwrap();
    let truth = expected(left, right);
    assert_eq!(truth.len(), 6);
    for strategy in STRATEGIES {
        assert_eq!(pairs(&join(left, right, &config, Some(strategy))), truth, "{}", strategy);
    }
}

#[test]
fn test_empty_operand() {
    let left = JoinInput::new(&[], &[]).unwrap();
    let right = JoinInput::new(&[0], &[1]).unwrap();
    for strategy in STRATEGIES {
        assert!(join(left, right, &Config::default(), Some(strategy)).is_empty());
    }
}

#[test]
fn test_mismatched_operand() {
    assert!(JoinInput::new(&[0, 1], &[1]).is_err());
}

#[test]
fn test_strategy_choice() {
    let config = Config::default();
    assert_eq!(choose_strategy(10, 1_000_000, &config), JoinStrategy::NestedLoop);
    assert_eq!(choose_strategy(1023, 1023, &config), JoinStrategy::NestedLoop);
    assert_eq!(choose_strategy(1024, 5000, &config), JoinStrategy::RadixPartitioned);
}

#[test]
fn test_hash_table_probe() {
    let table = JoinHashTable::build(&[4, -4, 4, 9], &[10, 11, 12, 13], 4);
    assert_eq!(table.len(), 4);
    let mut hits: Vec<i32> = table.probe(4).collect();
    hits.sort_unstable();
    assert_eq!(hits, vec![10, 12]);
    assert_eq!(table.probe(-4).collect::<Vec<_>>(), vec![11]);
    assert_eq!(table.probe(5).count(), 0);
}
