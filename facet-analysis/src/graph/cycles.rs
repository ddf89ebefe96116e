//! Circular-dependency detection via Tarjan's SCC.

use std::time::Instant;

use facet_core::types::collections::{FxHashMap, FxHashSet};
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};

use super::dependency::{DependencyEdgeKind, DependencyGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CycleSeverity {
    fn from_size(size: usize) -> Self {
        match size {
            0..=2 => Self::Low,
            3..=4 => Self::Medium,
            5..=6 => Self::High,
            _ => Self::Critical,
        }
    }
}

/// One edge participating in a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyPath {
    pub from: String,
    pub to: String,
    pub kind: DependencyEdgeKind,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyCycle {
    /// Participating module ids, lexicographically sorted.
    pub modules: Vec<String>,
    /// Edges with both endpoints inside the cycle, sorted by (from, to).
    pub paths: Vec<DependencyPath>,
    pub severity: CycleSeverity,
    /// Lowest-weight in-cycle edge: the cheapest place to cut.
    pub suggested_break: Option<DependencyPath>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CircularDependencyAnalysis {
    pub cycles: Vec<DependencyCycle>,
    /// Modules appearing in more than one cycle.
    pub core_modules: Vec<String>,
    pub analysis_time_us: u64,
}

/// Detect all dependency cycles. An SCC is a cycle when it has two or
/// more members, or a single member with a self-loop.
pub fn detect(graph: &DependencyGraph) -> CircularDependencyAnalysis {
    let start = Instant::now();
    let pg = graph.inner();
    let sccs = petgraph::algo::tarjan_scc(pg);

    let mut cycles = Vec::new();
    for scc in sccs {
        let is_cycle = scc.len() >= 2
            || (scc.len() == 1 && pg.find_edge(scc[0], scc[0]).is_some());
        if !is_cycle {
            continue;
        }
        let members: FxHashSet<NodeIndex> = scc.iter().copied().collect();

        let mut modules: Vec<String> = scc.iter().map(|&idx| pg[idx].id.clone()).collect();
        modules.sort();

        let mut paths: Vec<DependencyPath> = pg
            .edge_references()
            .filter(|e| members.contains(&e.source()) && members.contains(&e.target()))
            .map(|e| DependencyPath {
                from: pg[e.source()].id.clone(),
                to: pg[e.target()].id.clone(),
                kind: e.weight().kind,
                weight: e.weight().weight,
            })
            .collect();
        paths.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

        let suggested_break = paths
            .iter()
            .min_by(|a, b| {
                (a.weight, &a.from, &a.to).cmp(&(b.weight, &b.from, &b.to))
            })
            .cloned();

        cycles.push(DependencyCycle {
            severity: CycleSeverity::from_size(modules.len()),
            modules,
            paths,
            suggested_break,
        });
    }
    cycles.sort_by(|a, b| a.modules.cmp(&b.modules));

    let mut appearance: FxHashMap<&str, usize> = FxHashMap::default();
    for cycle in &cycles {
        for module in &cycle.modules {
            *appearance.entry(module.as_str()).or_default() += 1;
        }
    }
    let mut core_modules: Vec<String> = appearance
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(module, _)| module.to_string())
        .collect();
    core_modules.sort();

    CircularDependencyAnalysis {
        cycles,
        core_modules,
        analysis_time_us: start.elapsed().as_micros() as u64,
    }
}
