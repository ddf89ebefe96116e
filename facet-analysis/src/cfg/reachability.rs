//! Forward reachability over the CFG.

use std::collections::VecDeque;
use std::time::Instant;

use facet_core::types::collections::{FxHashMap, FxHashSet};

use super::types::{BlockId, Cfg};

/// Result of a reachability pass. Maps go from block id to block label.
#[derive(Debug, Clone)]
pub struct ReachabilityResult {
    pub reachable: FxHashMap<BlockId, String>,
    pub unreachable: FxHashMap<BlockId, String>,
    /// `reachable / total`; an empty CFG is defined as fully reachable.
    pub ratio: f64,
    pub analysis_time_us: u64,
}

impl ReachabilityResult {
    pub fn is_reachable(&self, id: BlockId) -> bool {
        self.reachable.contains_key(&id)
    }

    /// Unreachable block ids in ascending order.
    pub fn unreachable_ids_sorted(&self) -> Vec<BlockId> {
        let mut ids: Vec<BlockId> = self.unreachable.keys().copied().collect();
        ids.sort();
        ids
    }
}

/// BFS from entry following every edge kind.
pub fn analyze(cfg: &Cfg) -> ReachabilityResult {
    let start = Instant::now();
    let mut visited: FxHashSet<BlockId> = FxHashSet::default();
    let mut queue = VecDeque::new();

    visited.insert(cfg.entry);
    queue.push_back(cfg.entry);
    while let Some(block) = queue.pop_front() {
        for edge in cfg.successors(block) {
            if visited.insert(edge.to) {
                queue.push_back(edge.to);
            }
        }
    }

    let mut reachable = FxHashMap::default();
    let mut unreachable = FxHashMap::default();
    for block in cfg.blocks() {
        if visited.contains(&block.id) {
            reachable.insert(block.id, block.label.clone());
        } else {
            unreachable.insert(block.id, block.label.clone());
        }
    }

    let total = cfg.block_count();
    let ratio = if total == 0 {
        1.0
    } else {
        reachable.len() as f64 / total as f64
    };

    ReachabilityResult {
        reachable,
        unreachable,
        ratio,
        analysis_time_us: start.elapsed().as_micros() as u64,
    }
}
