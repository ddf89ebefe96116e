//! k-core grouping: peel low-degree vertices, then take connected
//! components of what survives.

use std::collections::VecDeque;

use super::SimilarityIndex;

/// Components of the k-core of the threshold-filtered graph. `k` is
/// floored to 2: below that the peel would keep everything an edge
/// touches.
pub fn components(index: &SimilarityIndex, threshold: f64, k: usize) -> Vec<Vec<usize>> {
    let k = k.max(2);
    let adjacency = index.adjacency(threshold);
    let n = index.len();

    let mut degree: Vec<usize> = adjacency.iter().map(|a| a.len()).collect();
    let mut removed = vec![false; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| degree[v] < k).collect();

    while let Some(v) = queue.pop_front() {
        if removed[v] {
            continue;
        }
        removed[v] = true;
        for &next in &adjacency[v] {
            if !removed[next] {
                degree[next] -= 1;
                if degree[next] < k {
                    queue.push_back(next);
                }
            }
        }
    }

    // Components over the peeled graph. Survivors connected only
    // through removed vertices are separate components.
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for seed in 0..n {
        if removed[seed] || visited[seed] {
            continue;
        }
        let mut component = Vec::new();
        let mut bfs: VecDeque<usize> = VecDeque::from([seed]);
        visited[seed] = true;
        while let Some(v) = bfs.pop_front() {
            component.push(v);
            for &next in &adjacency[v] {
                if !removed[next] && !visited[next] {
                    visited[next] = true;
                    bfs.push_back(next);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}
