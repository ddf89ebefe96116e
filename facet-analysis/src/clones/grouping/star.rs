//! Star/medoid grouping: seed with connected components, then
//! iteratively reassign every clone to its best medoid.

use super::{connected, SimilarityIndex};

const MAX_ITERATIONS: usize = 10;
/// Stop when fewer than 1% of clones move in an iteration.
const CHURN_STOP: f64 = 0.01;

/// The medoid of a member set: the clone with the highest mean
/// similarity to the others, lowest index on ties.
fn medoid(index: &SimilarityIndex, members: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &candidate in members {
        let mut sum = 0.0;
        for &other in members {
            if other != candidate {
                sum += index.similarity(candidate, other).unwrap_or(0.0);
            }
        }
        let mean = if members.len() > 1 {
            sum / (members.len() - 1) as f64
        } else {
            0.0
        };
        let better = match best {
            None => true,
            Some((_, best_mean)) => mean > best_mean,
        };
        if better {
            best = Some((candidate, mean));
        }
    }
    best.map(|(candidate, _)| candidate)
}

pub fn assign(index: &SimilarityIndex, threshold: f64) -> Vec<Vec<usize>> {
    let n = index.len();
    let mut groups = connected::components(index, threshold);

    for _ in 0..MAX_ITERATIONS {
        let medoids: Vec<Option<usize>> = groups.iter().map(|g| medoid(index, g)).collect();

        // Current assignment of every clone.
        let mut assignment: Vec<Option<usize>> = vec![None; n];
        for (g, members) in groups.iter().enumerate() {
            for &m in members {
                assignment[m] = Some(g);
            }
        }

        let mut changed = 0usize;
        let mut total = 0usize;
        for clone in 0..n {
            let Some(current) = assignment[clone] else {
                continue;
            };
            total += 1;
            // Best medoid by similarity, lowest group index on ties.
            let mut best: Option<(usize, f64)> = None;
            for (g, m) in medoids.iter().enumerate() {
                let Some(m) = m else { continue };
                let sim = index.similarity(clone, *m).unwrap_or(0.0);
                let better = match best {
                    None => true,
                    Some((_, best_sim)) => sim > best_sim,
                };
                if better {
                    best = Some((g, sim));
                }
            }
            if let Some((g, sim)) = best {
                // Only move when the new medoid actually clears the bar.
                if sim >= threshold && g != current {
                    assignment[clone] = Some(g);
                    changed += 1;
                }
            }
        }

        let mut next: Vec<Vec<usize>> = vec![Vec::new(); groups.len()];
        for clone in 0..n {
            if let Some(g) = assignment[clone] {
                next[g].push(clone);
            }
        }
        groups = next.into_iter().filter(|g| !g.is_empty()).collect();

        if total == 0 || (changed as f64 / total as f64) < CHURN_STOP {
            break;
        }
    }
    groups
}
