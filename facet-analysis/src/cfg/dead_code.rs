//! Dead-code classification over unreachable CFG blocks.

use facet_core::types::ast::SourceLocation;
use serde::{Deserialize, Serialize};

use super::reachability::ReachabilityResult;
use super::types::{BasicBlock, Cfg};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeadCodeReason {
    UnreachableAfterReturn,
    UnreachableAfterBreak,
    UnreachableAfterContinue,
    UnreachableAfterThrow,
    UnreachableAfterInfiniteLoop,
    UnreachableBranch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
}

/// One unreachable statement-bearing block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadCodeFinding {
    pub function: String,
    pub block_label: String,
    pub reason: DeadCodeReason,
    pub severity: Severity,
    pub location: SourceLocation,
    pub statement_count: usize,
}

/// Classify every unreachable block that carries at least one statement.
///
/// Findings come out in block-creation order, which follows source
/// order within a function.
pub fn detect(cfg: &Cfg, reachability: &ReachabilityResult) -> Vec<DeadCodeFinding> {
    let mut findings = Vec::new();
    for block in cfg.blocks() {
        if reachability.is_reachable(block.id) || block.statements.is_empty() {
            continue;
        }
        let (reason, severity) = classify(cfg, block);
        let location = block
            .statements
            .first()
            .map(|s| s.location.clone())
            .unwrap_or_default();
        findings.push(DeadCodeFinding {
            function: cfg.name.clone(),
            block_label: block.label.clone(),
            reason,
            severity,
            location,
            statement_count: block.statements.len(),
        });
    }
    findings
}

/// Inspect predecessor tails, preferring the fallthrough origin (the
/// block whose trailing jump orphaned this one), then edge predecessors.
fn classify(cfg: &Cfg, block: &BasicBlock) -> (DeadCodeReason, Severity) {
    let origins = block
        .fallthrough_from
        .into_iter()
        .chain(cfg.predecessors(block.id).map(|e| e.from));

    for pred in origins {
        let Some(last) = cfg.block(pred).last_statement() else {
            continue;
        };
        let reason = match last.kind.as_str() {
            "ReturnStatement" => DeadCodeReason::UnreachableAfterReturn,
            "BreakStatement" => DeadCodeReason::UnreachableAfterBreak,
            "ContinueStatement" => DeadCodeReason::UnreachableAfterContinue,
            "ThrowStatement" => DeadCodeReason::UnreachableAfterThrow,
            _ => continue,
        };
        return (reason, Severity::Critical);
    }

    if block.label.contains("unreachable") {
        (DeadCodeReason::UnreachableAfterInfiniteLoop, Severity::Warning)
    } else {
        (DeadCodeReason::UnreachableBranch, Severity::Warning)
    }
}
