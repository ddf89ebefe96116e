//! Tree edit distance over post-order labeled trees.
//!
//! Keyroot dynamic program: for every pair of key roots the forest
//! distance table is filled once, persisting subtree distances into the
//! tree-distance table. Memory is O(|T1| * |T2|) per comparison, which
//! is why the detector batches pairs instead of fanning out per pair.

use super::cost::CloneCostModel;
use super::tree::LabeledTree;

/// Minimum-cost edit sequence turning `t1` into `t2`.
pub fn tree_distance(t1: &LabeledTree, t2: &LabeledTree, costs: &CloneCostModel) -> f64 {
    if t1.is_empty() && t2.is_empty() {
        return 0.0;
    }
    if t1.is_empty() {
        return (0..t2.size()).map(|j| costs.insert(t2.label(j))).sum();
    }
    if t2.is_empty() {
        return (0..t1.size()).map(|i| costs.delete(t1.label(i))).sum();
    }

    let n = t1.size();
    let m = t2.size();
    let mut td = vec![vec![0.0f64; m]; n];
    let mut fd = vec![vec![0.0f64; m + 1]; n + 1];

    for &i in t1.keyroots() {
        for &j in t2.keyroots() {
            forest_distance(t1, t2, i, j, costs, &mut td, &mut fd);
        }
    }
    td[n - 1][m - 1]
}

/// Similarity in [0, 1]: `1 - distance / max(|T1|, |T2|)`, clamped.
/// Identical trees score 1.0; the measure is symmetric.
pub fn similarity(t1: &LabeledTree, t2: &LabeledTree, costs: &CloneCostModel) -> f64 {
    let larger = t1.size().max(t2.size());
    if larger == 0 {
        return 1.0;
    }
    let distance = tree_distance(t1, t2, costs);
    (1.0 - distance / larger as f64).clamp(0.0, 1.0)
}

fn forest_distance(
    t1: &LabeledTree,
    t2: &LabeledTree,
    i: usize,
    j: usize,
    costs: &CloneCostModel,
    td: &mut [Vec<f64>],
    fd: &mut [Vec<f64>],
) {
    let li = t1.lld(i);
    let lj = t2.lld(j);

    fd[0][0] = 0.0;
    for x in li..=i {
        let dx = x - li + 1;
        fd[dx][0] = fd[dx - 1][0] + costs.delete(t1.label(x));
    }
    for y in lj..=j {
        let dy = y - lj + 1;
        fd[0][dy] = fd[0][dy - 1] + costs.insert(t2.label(y));
    }

    for x in li..=i {
        let dx = x - li + 1;
        for y in lj..=j {
            let dy = y - lj + 1;
            let delete = fd[dx - 1][dy] + costs.delete(t1.label(x));
            let insert = fd[dx][dy - 1] + costs.insert(t2.label(y));
            if t1.lld(x) == li && t2.lld(y) == lj {
                // Both prefixes are whole subtrees: this forest distance
                // doubles as the subtree distance.
                let rename = fd[dx - 1][dy - 1] + costs.rename(t1.label(x), t2.label(y));
                let best = delete.min(insert).min(rename);
                fd[dx][dy] = best;
                td[x][y] = best;
            } else {
                // Splice in the previously computed subtree distance.
                let lx = t1.lld(x);
                let ly = t2.lld(y);
                let bridge = fd[lx - li][ly - lj] + td[x][y];
                fd[dx][dy] = delete.min(insert).min(bridge);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_core::config::CostModelKind;
    use facet_core::types::ast::AstNode;

    fn model() -> CloneCostModel {
        CloneCostModel::new(CostModelKind::Default, false, false)
    }

    fn call(callee: &str, args: &[&str]) -> LabeledTree {
        let mut node = AstNode::new("CallExpression")
            .with_callee(AstNode::new("Identifier").with_name(callee));
        for arg in args {
            node = node.with_arg(AstNode::new("Identifier").with_name(*arg));
        }
        LabeledTree::from_ast(&node)
    }

    #[test]
    fn identical_trees_have_zero_distance() {
        let a = call("f", &["x", "y"]);
        let b = call("f", &["x", "y"]);
        assert_eq!(tree_distance(&a, &b, &model()), 0.0);
        assert_eq!(similarity(&a, &b, &model()), 1.0);
    }

    #[test]
    fn single_rename_costs_one_unit() {
        let a = call("f", &["x", "y"]);
        let b = call("f", &["x", "z"]);
        assert_eq!(tree_distance(&a, &b, &model()), 1.0);
    }

    #[test]
    fn insertion_counts_once() {
        let a = call("f", &["x"]);
        let b = call("f", &["x", "y"]);
        assert_eq!(tree_distance(&a, &b, &model()), 1.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = call("f", &["x", "y", "z"]);
        let b = call("g", &["x"]);
        assert_eq!(
            tree_distance(&a, &b, &model()),
            tree_distance(&b, &a, &model())
        );
    }
}
