//! Centroid (strict linkage) grouping: BFS expansion where a candidate
//! joins only if it is similar enough to every current member.

use std::collections::VecDeque;

use facet_core::types::collections::FxHashSet;

use super::SimilarityIndex;

pub fn strict_linkage(index: &SimilarityIndex, threshold: f64) -> Vec<Vec<usize>> {
    let adjacency = index.adjacency(threshold);
    let n = index.len();
    let mut assigned = vec![false; n];
    let mut groups = Vec::new();

    for seed in 0..n {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut members = vec![seed];
        let mut queue: VecDeque<usize> = adjacency[seed].iter().copied().collect();
        let mut enqueued: FxHashSet<usize> = adjacency[seed].iter().copied().collect();

        while let Some(candidate) = queue.pop_front() {
            if assigned[candidate] {
                continue;
            }
            let compatible = members
                .iter()
                .all(|&m| index.similarity(m, candidate).unwrap_or(0.0) >= threshold);
            if !compatible {
                continue;
            }
            assigned[candidate] = true;
            members.push(candidate);
            for &next in &adjacency[candidate] {
                if !assigned[next] && enqueued.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        groups.push(members);
    }
    groups
}
