//! Locality-sensitive prefilter for clone candidates.
//!
//! Min-hash over a fragment's node labels, banded so that fragments
//! sharing any band land in the same bucket. Misses are possible (the
//! filter trades recall for pair count); fixed seeds keep it
//! deterministic.

use std::hash::Hasher;

use facet_core::types::collections::{FxHashMap, FxHashSet};
use rustc_hash::FxHasher;

use super::types::Fragment;

const BAND_SEEDS: [u64; 4] = [
    0x9e37_79b9_7f4a_7c15,
    0xbf58_476d_1ce4_e5b9,
    0x94d0_49bb_1331_11eb,
    0x2545_f491_4f6c_dd1d,
];

fn hash_label(label: &str, seed: u64) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(seed);
    hasher.write(label.as_bytes());
    hasher.finish()
}

/// One min-hash value per band.
fn signature(fragment: &Fragment) -> [u64; BAND_SEEDS.len()] {
    let mut bands = [u64::MAX; BAND_SEEDS.len()];
    let tree = &fragment.tree;
    for i in 0..tree.size() {
        let label = tree.label(i).to_string();
        for (band, &seed) in BAND_SEEDS.iter().enumerate() {
            bands[band] = bands[band].min(hash_label(&label, seed));
        }
    }
    bands
}

/// Candidate index pairs `(i, j)` with `i < j`: fragments sharing at
/// least one min-hash band.
pub fn candidate_pairs(fragments: &[Fragment]) -> FxHashSet<(usize, usize)> {
    let mut buckets: FxHashMap<(usize, u64), Vec<usize>> = FxHashMap::default();
    for (idx, fragment) in fragments.iter().enumerate() {
        for (band, value) in signature(fragment).into_iter().enumerate() {
            buckets.entry((band, value)).or_default().push(idx);
        }
    }

    let mut pairs = FxHashSet::default();
    for members in buckets.values() {
        for (a, &i) in members.iter().enumerate() {
            for &j in &members[a + 1..] {
                pairs.insert((i.min(j), i.max(j)));
            }
        }
    }
    pairs
}
