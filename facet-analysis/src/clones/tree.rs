//! Labeled ordered trees in post-order form, ready for tree edit
//! distance.
//!
//! Conversion flattens an AST fragment into post-order arrays (labels,
//! leftmost-leaf descendants, key roots), the three inputs the distance
//! kernel needs. Child order is the AST's fixed slot order, so
//! conversion is deterministic.

use facet_core::types::ast::{AstNode, NodeCategory, MAX_TRAVERSAL_DEPTH};
use serde::{Deserialize, Serialize};

/// A tree-node label: the node kind, extended with the distinguishing
/// payload for identifiers (name), literals (value), functions and
/// classes (name), and operators (op).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeLabel {
    pub base: String,
    pub detail: Option<String>,
    pub category: NodeCategory,
}

impl TreeLabel {
    fn from_node(node: &AstNode) -> Self {
        let detail = if node.kind.is_identifier() || node.kind.is_function() || node.kind.is_class() {
            node.name.clone()
        } else if node.kind.is_literal()
            || matches!(node.kind.as_str(), "BinaryExpression" | "LogicalExpression" | "UnaryExpression" | "AssignmentExpression" | "UpdateExpression")
        {
            node.value.clone()
        } else {
            None
        };
        Self {
            base: node.kind.as_str().to_string(),
            detail,
            category: node.kind.category(),
        }
    }
}

impl std::fmt::Display for TreeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}({})", self.base, detail),
            None => f.write_str(&self.base),
        }
    }
}

/// An ordered labeled tree flattened into post-order arrays.
///
/// `lld[i]` is the post-order id of node i's leftmost leaf descendant.
/// `keyroots` are the nodes with no left sibling on their root path:
/// for each distinct `lld` value, the highest post-order id having it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledTree {
    labels: Vec<TreeLabel>,
    lld: Vec<usize>,
    keyroots: Vec<usize>,
}

impl LabeledTree {
    /// Convert an AST subtree. Depth-guarded: below the cutoff a node
    /// becomes a leaf, so pathological trees stay comparable.
    pub fn from_ast(root: &AstNode) -> Self {
        let mut labels = Vec::new();
        let mut lld = Vec::new();
        build_postorder(root, &mut labels, &mut lld, 0);

        // For each distinct lld value keep the largest post-order id.
        let mut last_for_lld: Vec<Option<usize>> = vec![None; labels.len()];
        for (id, &leaf) in lld.iter().enumerate() {
            last_for_lld[leaf] = Some(id);
        }
        let mut keyroots: Vec<usize> = last_for_lld.into_iter().flatten().collect();
        keyroots.sort_unstable();
        keyroots.dedup();

        Self { labels, lld, keyroots }
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of the node with post-order id `i`.
    pub fn label(&self, i: usize) -> &TreeLabel {
        &self.labels[i]
    }

    pub fn lld(&self, i: usize) -> usize {
        self.lld[i]
    }

    pub fn keyroots(&self) -> &[usize] {
        &self.keyroots
    }
}

/// Post-order flatten. Returns the root's post-order id.
fn build_postorder(node: &AstNode, labels: &mut Vec<TreeLabel>, lld: &mut Vec<usize>, depth: usize) -> usize {
    let mut first_child_lld = None;
    if depth < MAX_TRAVERSAL_DEPTH {
        for child in node.slots() {
            let child_id = build_postorder(child, labels, lld, depth + 1);
            if first_child_lld.is_none() {
                first_child_lld = Some(lld[child_id]);
            }
        }
    } else {
        tracing::warn!(
            kind = %node.kind,
            "tree conversion depth limit reached, treating node as leaf"
        );
    }
    let id = labels.len();
    labels.push(TreeLabel::from_node(node));
    lld.push(first_child_lld.unwrap_or(id));
    id
}
