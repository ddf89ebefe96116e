//! Clone grouping over the pair similarity graph.
//!
//! Five strategies behind one operation, selected by
//! [`GroupingMode`]: connected components, k-core, star/medoid,
//! complete linkage (maximal cliques), and centroid (strict linkage).
//! All of them consume a shared [`SimilarityIndex`] so pair lookups and
//! clone ordering stay canonical across strategies.

pub mod centroid;
pub mod clique;
pub mod connected;
pub mod kcore;
pub mod star;

use facet_core::config::{GroupingConfig, GroupingMode};
use facet_core::types::collections::FxHashMap;

use super::types::{CloneGroup, ClonePair, CloneType, FragmentInfo};

/// Order-insensitive pair lookup plus a deterministic total order over
/// the clones mentioned by any pair.
#[derive(Debug, Default)]
pub struct SimilarityIndex {
    clones: Vec<FragmentInfo>,
    sims: FxHashMap<(usize, usize), f64>,
    types: FxHashMap<(usize, usize), CloneType>,
}

impl SimilarityIndex {
    pub fn from_pairs(pairs: &[ClonePair]) -> Self {
        use std::collections::BTreeMap;

        // Clones ordered by location; the index in `clones` is the
        // canonical clone id for every strategy.
        let mut by_key: BTreeMap<(String, u32, u32, u32), FragmentInfo> = BTreeMap::new();
        for pair in pairs {
            by_key
                .entry(pair.fragment1.sort_key())
                .or_insert_with(|| pair.fragment1.clone());
            by_key
                .entry(pair.fragment2.sort_key())
                .or_insert_with(|| pair.fragment2.clone());
        }
        let clones: Vec<FragmentInfo> = by_key.into_values().collect();
        let order: FxHashMap<(String, u32, u32, u32), usize> = clones
            .iter()
            .enumerate()
            .map(|(idx, info)| (info.sort_key(), idx))
            .collect();

        let mut sims = FxHashMap::default();
        let mut types = FxHashMap::default();
        for pair in pairs {
            let a = order[&pair.fragment1.sort_key()];
            let b = order[&pair.fragment2.sort_key()];
            let key = pair_key(a, b);
            let entry = sims.entry(key).or_insert(pair.similarity);
            if pair.similarity > *entry {
                *entry = pair.similarity;
            }
            types.entry(key).or_insert(pair.clone_type);
        }

        Self { clones, sims, types }
    }

    pub fn len(&self) -> usize {
        self.clones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }

    pub fn clone_info(&self, idx: usize) -> &FragmentInfo {
        &self.clones[idx]
    }

    /// Cached similarity for a pair, order-insensitive.
    pub fn similarity(&self, a: usize, b: usize) -> Option<f64> {
        if a == b {
            return Some(1.0);
        }
        self.sims.get(&pair_key(a, b)).copied()
    }

    pub fn pair_type(&self, a: usize, b: usize) -> Option<CloneType> {
        self.types.get(&pair_key(a, b)).copied()
    }

    /// Edges at or above the threshold, sorted.
    pub fn edges(&self, threshold: f64) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .sims
            .iter()
            .filter(|(_, &sim)| sim >= threshold)
            .map(|(&key, _)| key)
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Per-clone sorted neighbor lists at the threshold.
    pub fn adjacency(&self, threshold: f64) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.len()];
        for (a, b) in self.edges(threshold) {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }
        adjacency
    }
}

fn pair_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Group clone pairs with the configured strategy. Groups have at
/// least two members and come out sorted by similarity (descending),
/// then size, then first-member location.
pub fn group(pairs: &[ClonePair], config: &GroupingConfig) -> Vec<CloneGroup> {
    let index = SimilarityIndex::from_pairs(pairs);
    if index.is_empty() {
        return Vec::new();
    }
    let threshold = config.threshold;
    let raw = match config.mode {
        GroupingMode::Connected => connected::components(&index, threshold),
        GroupingMode::KCore => kcore::components(&index, threshold, config.kcore_k),
        GroupingMode::StarMedoid => star::assign(&index, threshold),
        GroupingMode::CompleteLinkage => clique::maximal_cliques(&index, threshold),
        GroupingMode::Centroid => centroid::strict_linkage(&index, threshold),
    };
    finalize(&index, raw)
}

fn finalize(index: &SimilarityIndex, raw: Vec<Vec<usize>>) -> Vec<CloneGroup> {
    let mut groups: Vec<CloneGroup> = raw
        .into_iter()
        .filter(|members| members.len() >= 2)
        .map(|mut members| {
            members.sort_unstable();
            let (similarity, clone_type) = summarize(index, &members);
            CloneGroup {
                id: 0,
                members: members.iter().map(|&m| index.clone_info(m).clone()).collect(),
                similarity,
                clone_type,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.members.len().cmp(&a.members.len()))
            .then_with(|| a.members[0].sort_key().cmp(&b.members[0].sort_key()))
    });
    for (id, group) in groups.iter_mut().enumerate() {
        group.id = id;
    }
    groups
}

/// Group similarity is the mean over the cached member-pair
/// similarities; the group type is the majority cached pair type,
/// falling back to Type-3 when no pair carries one.
fn summarize(index: &SimilarityIndex, members: &[usize]) -> (f64, CloneType) {
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut type_counts: FxHashMap<CloneType, usize> = FxHashMap::default();
    for (i, &a) in members.iter().enumerate() {
        for &b in &members[i + 1..] {
            if let Some(sim) = index.similarity(a, b) {
                sum += sim;
                count += 1;
            }
            if let Some(t) = index.pair_type(a, b) {
                *type_counts.entry(t).or_default() += 1;
            }
        }
    }
    let similarity = if count == 0 { 0.0 } else { sum / count as f64 };
    let clone_type = type_counts
        .into_iter()
        .max_by(|(ta, ca), (tb, cb)| ca.cmp(cb).then(tb.cmp(ta)))
        .map(|(t, _)| t)
        .unwrap_or(CloneType::Type3);
    (similarity, clone_type)
}
