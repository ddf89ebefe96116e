//! Edit-cost model for clone comparison.
//!
//! Three variants: `Default` (uniform unit costs, binary rename),
//! `Weighted` (type multipliers, binary rename), and `Javascript`
//! (type multipliers plus graded renames from a label-similarity
//! table and the ignore rules).

use facet_core::config::{CloneConfig, CostModelKind};
use facet_core::types::ast::NodeCategory;

use super::tree::TreeLabel;

const BASE_COST: f64 = 1.0;

/// Pairs of node kinds considered interchangeable enough for a cheap
/// rename: different syntax for the same construct.
const RELATED_KINDS: &[(&str, &str)] = &[
    ("FunctionDeclaration", "FunctionExpression"),
    ("FunctionDeclaration", "ArrowFunctionExpression"),
    ("FunctionExpression", "ArrowFunctionExpression"),
    ("ForStatement", "ForOfStatement"),
    ("ForStatement", "ForInStatement"),
    ("ForInStatement", "ForOfStatement"),
    ("ForStatement", "WhileStatement"),
    ("WhileStatement", "DoWhileStatement"),
    ("IfStatement", "ConditionalExpression"),
    ("IfStatement", "SwitchStatement"),
];

/// Configured cost model, cheap to copy around worker threads.
#[derive(Debug, Clone)]
pub struct CloneCostModel {
    kind: CostModelKind,
    ignore_literals: bool,
    ignore_identifiers: bool,
}

impl CloneCostModel {
    pub fn new(kind: CostModelKind, ignore_literals: bool, ignore_identifiers: bool) -> Self {
        Self {
            kind,
            ignore_literals,
            ignore_identifiers,
        }
    }

    pub fn from_config(config: &CloneConfig) -> Self {
        Self::new(config.cost_model, config.ignore_literals, config.ignore_identifiers)
    }

    pub fn insert(&self, label: &TreeLabel) -> f64 {
        BASE_COST * self.type_multiplier(label)
    }

    pub fn delete(&self, label: &TreeLabel) -> f64 {
        BASE_COST * self.type_multiplier(label)
    }

    pub fn rename(&self, from: &TreeLabel, to: &TreeLabel) -> f64 {
        if from == to {
            return 0.0;
        }
        if self.ignore_literals
            && from.category == NodeCategory::Literal
            && to.category == NodeCategory::Literal
        {
            return 0.0;
        }
        if self.ignore_identifiers
            && from.category == NodeCategory::Identifier
            && to.category == NodeCategory::Identifier
        {
            return 0.0;
        }
        match self.kind {
            CostModelKind::Javascript => BASE_COST * (1.0 - label_similarity(from, to)),
            CostModelKind::Default | CostModelKind::Weighted => BASE_COST,
        }
    }

    fn type_multiplier(&self, label: &TreeLabel) -> f64 {
        if self.kind == CostModelKind::Default {
            return 1.0;
        }
        match label.category {
            NodeCategory::Structural => 1.5,
            NodeCategory::ControlFlow => 1.3,
            NodeCategory::Literal if self.ignore_literals => 0.1,
            NodeCategory::Identifier if self.ignore_identifiers => 0.2,
            NodeCategory::Expression => 0.8,
            _ => 1.0,
        }
    }
}

/// Graded similarity between two different labels, in [0, 1).
fn label_similarity(a: &TreeLabel, b: &TreeLabel) -> f64 {
    if a.base == b.base {
        // Same base type, different detail (renamed identifier,
        // different literal value, different operator).
        return 0.8;
    }
    if is_related(&a.base, &b.base) {
        return 0.5;
    }
    if a.category == b.category {
        return 0.3;
    }
    0.0
}

fn is_related(a: &str, b: &str) -> bool {
    RELATED_KINDS
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}
