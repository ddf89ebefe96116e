//! Complete-linkage grouping: every maximal clique of the
//! threshold-filtered graph, via Bron-Kerbosch with pivoting.

use facet_core::types::ast::MAX_TRAVERSAL_DEPTH;
use facet_core::types::collections::FxHashSet;

use super::SimilarityIndex;

pub fn maximal_cliques(index: &SimilarityIndex, threshold: f64) -> Vec<Vec<usize>> {
    let adjacency: Vec<FxHashSet<usize>> = index
        .adjacency(threshold)
        .into_iter()
        .map(|neighbors| neighbors.into_iter().collect())
        .collect();

    // Isolated vertices can never reach clique size 2.
    let candidates: Vec<usize> = (0..index.len())
        .filter(|&v| !adjacency[v].is_empty())
        .collect();

    let mut cliques = Vec::new();
    bron_kerbosch(
        &adjacency,
        &mut Vec::new(),
        candidates,
        Vec::new(),
        &mut cliques,
        0,
    );
    cliques.sort();
    cliques
}

/// `r` is the growing clique, `p` the candidates (sorted), `x` the
/// excluded set (sorted). The pivot is the vertex of `p ∪ x` covering
/// the most candidates, so only non-neighbors of the pivot branch.
fn bron_kerbosch(
    adjacency: &[FxHashSet<usize>],
    r: &mut Vec<usize>,
    p: Vec<usize>,
    x: Vec<usize>,
    out: &mut Vec<Vec<usize>>,
    depth: usize,
) {
    if depth >= MAX_TRAVERSAL_DEPTH {
        tracing::warn!("clique recursion limit reached, emitting current clique as-is");
        if r.len() >= 2 {
            out.push(r.clone());
        }
        return;
    }
    if p.is_empty() && x.is_empty() {
        if r.len() >= 2 {
            out.push(r.clone());
        }
        return;
    }

    let pivot = p
        .iter()
        .chain(x.iter())
        .copied()
        .max_by_key(|&u| (p.iter().filter(|&&v| adjacency[u].contains(&v)).count(), std::cmp::Reverse(u)))
        .expect("p or x is non-empty");

    let mut p = p;
    let mut x = x;
    let branch: Vec<usize> = p
        .iter()
        .copied()
        .filter(|v| !adjacency[pivot].contains(v))
        .collect();
    for v in branch {
        let neighbors = &adjacency[v];
        let p_next: Vec<usize> = p.iter().copied().filter(|u| neighbors.contains(u)).collect();
        let x_next: Vec<usize> = x.iter().copied().filter(|u| neighbors.contains(u)).collect();
        r.push(v);
        bron_kerbosch(adjacency, r, p_next, x_next, out, depth + 1);
        r.pop();
        p.retain(|&u| u != v);
        x.push(v);
    }
}
