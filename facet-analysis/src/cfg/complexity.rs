//! Cyclomatic complexity over the CFG.
//!
//! A block with `n >= 2` outgoing conditional edges contributes `n - 1`
//! decision points: an if contributes 1, an n-way switch head n. Loop
//! headers emit exactly one conditional pair during construction, so
//! back-edges (`Loop` kind) are never counted and need no compensation.
//! Short-circuit operators and ternaries add one each.

use facet_core::config::ComplexityConfig;
use facet_core::types::ast::{AstNode, SourceLocation, MAX_TRAVERSAL_DEPTH};
use serde::{Deserialize, Serialize};

use super::types::Cfg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    pub function: String,
    pub complexity: u32,
    pub decision_points: u32,
    pub logical_operators: u32,
    pub nesting_depth: u32,
    pub risk: RiskLevel,
    pub location: Option<SourceLocation>,
}

/// McCabe complexity for one CFG. `function` supplies the original AST
/// for the nesting-depth walk; without it the depth is reported as 0.
pub fn calculate(cfg: &Cfg, function: Option<&AstNode>, config: &ComplexityConfig) -> ComplexityMetrics {
    let mut decision_points = 0u32;
    for block in cfg.blocks() {
        let conditional = cfg
            .successors(block.id)
            .filter(|e| e.kind.is_conditional())
            .count() as u32;
        if conditional >= 2 {
            decision_points += conditional - 1;
        }
    }

    let mut logical_operators = 0u32;
    for block in cfg.blocks() {
        for stmt in &block.statements {
            logical_operators += count_expression_decisions(stmt);
        }
    }

    let complexity = (decision_points + logical_operators + 1).max(1);
    ComplexityMetrics {
        function: cfg.name.clone(),
        complexity,
        decision_points,
        logical_operators,
        nesting_depth: function.map(nesting_depth).unwrap_or(0),
        risk: risk_level(complexity, config),
        location: cfg.function_location.clone(),
    }
}

pub fn risk_level(complexity: u32, config: &ComplexityConfig) -> RiskLevel {
    if complexity <= config.low_threshold {
        RiskLevel::Low
    } else if complexity <= config.medium_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// `&&`, `||`, `??` and ternaries inside one statement subtree.
/// Nested functions are their own decision scope and are skipped.
fn count_expression_decisions(stmt: &AstNode) -> u32 {
    let mut count = 0u32;
    stmt.walk(&mut |node| {
        if node.kind.is_function() {
            return false;
        }
        match node.kind.as_str() {
            "LogicalExpression" | "BinaryExpression" => {
                if matches!(node.value.as_deref(), Some("&&") | Some("||") | Some("??")) {
                    count += 1;
                }
            }
            "ConditionalExpression" => count += 1,
            _ => {}
        }
        true
    });
    count
}

/// Maximum nesting depth reached inside a function subtree. Depth
/// increments on if/switch/loop/try/catch entries; nested functions are
/// not descended into.
pub fn nesting_depth(function: &AstNode) -> u32 {
    fn descend(node: &AstNode, depth: u32, max: &mut u32, guard: usize) {
        if guard >= MAX_TRAVERSAL_DEPTH {
            return;
        }
        for child in node.slots() {
            if child.kind.is_function() {
                continue;
            }
            let next = if nests(child) { depth + 1 } else { depth };
            *max = (*max).max(next);
            descend(child, next, max, guard + 1);
        }
    }

    fn nests(node: &AstNode) -> bool {
        node.kind.is_loop()
            || matches!(
                node.kind.as_str(),
                "IfStatement" | "SwitchStatement" | "TryStatement" | "CatchClause"
            )
    }

    let mut max = 0;
    descend(function, 0, &mut max, 0);
    max
}
