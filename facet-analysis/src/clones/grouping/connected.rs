//! Connected-component grouping via union-find.

use facet_core::types::collections::FxHashMap;

use super::SimilarityIndex;

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression.
        let mut cursor = x;
        while self.parent[cursor] != root {
            let next = self.parent[cursor];
            self.parent[cursor] = root;
            cursor = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Smaller root wins so component ids are stable.
            let (lo, hi) = (ra.min(rb), ra.max(rb));
            self.parent[hi] = lo;
        }
    }
}

/// Components of the threshold-filtered similarity graph, ordered by
/// their smallest member.
pub fn components(index: &SimilarityIndex, threshold: f64) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(index.len());
    for (a, b) in index.edges(threshold) {
        uf.union(a, b);
    }

    let mut by_root: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    for clone in 0..index.len() {
        by_root.entry(uf.find(clone)).or_default().push(clone);
    }
    let mut components: Vec<Vec<usize>> = by_root.into_values().collect();
    components.sort_by_key(|c| c[0]);
    components
}
