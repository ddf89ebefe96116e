//! Coupling metrics: Martin metrics (Ca/Ce/I/A/D, stability zones) and
//! CBO, plus transitive-dependency queries.

use facet_core::config::{CboConfig, CouplingConfig};
use facet_core::types::collections::{FxHashMap, FxHashSet};
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::cfg::complexity::RiskLevel;
use crate::modules::source_type::is_builtin;
use crate::modules::types::ModuleInfo;

use super::dependency::DependencyGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityZone {
    MainSequence,
    ZoneOfPain,
    ZoneOfUselessness,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingMetrics {
    pub module: String,
    /// Afferent coupling: modules depending on this one.
    pub ca: u32,
    /// Efferent coupling: modules this one depends on.
    pub ce: u32,
    pub instability: f64,
    /// Exported-interface proportion proxy, `min(1, exports/10)`.
    /// Deliberately coarse: no semantic notion of "abstract" exists at
    /// this level.
    pub abstractness: f64,
    /// Distance from the main sequence, `|A + I - 1|`.
    pub distance: f64,
    pub zone: StabilityZone,
    pub risk: RiskLevel,
    pub transitive_dependencies: u32,
    pub max_dependency_depth: u32,
}

/// Compute coupling metrics for every node, sorted by module id.
pub fn compute(graph: &DependencyGraph, config: &CouplingConfig) -> Vec<CouplingMetrics> {
    let mut depth_memo: FxHashMap<NodeIndex, u32> = FxHashMap::default();
    graph
        .module_ids()
        .into_iter()
        .map(|id| {
            let ca = graph.in_degree(&id) as u32;
            let ce = graph.out_degree(&id) as u32;
            let instability = if ca + ce == 0 {
                0.5
            } else {
                ce as f64 / (ca + ce) as f64
            };
            let exports = graph.node(&id).map(|n| n.exports.len()).unwrap_or(0);
            let abstractness = (exports as f64 / 10.0).min(1.0);
            let distance = (abstractness + instability - 1.0).abs();
            CouplingMetrics {
                ca,
                ce,
                instability,
                abstractness,
                distance,
                zone: classify_zone(instability, abstractness, distance, config),
                risk: risk_level(ca + ce, distance, config),
                transitive_dependencies: transitive_dependencies(graph, &id).len() as u32,
                max_dependency_depth: max_dependency_depth_memo(graph, &id, &mut depth_memo),
                module: id,
            }
        })
        .collect()
}

/// Stability-zone classification in the (A, I) plane.
pub fn classify_zone(
    instability: f64,
    abstractness: f64,
    distance: f64,
    config: &CouplingConfig,
) -> StabilityZone {
    if distance < config.distance_threshold {
        return StabilityZone::MainSequence;
    }
    if instability < 0.5 && abstractness < 0.5 {
        StabilityZone::ZoneOfPain
    } else if instability > 0.5 && abstractness > 0.5 {
        StabilityZone::ZoneOfUselessness
    } else {
        StabilityZone::MainSequence
    }
}

fn risk_level(total_coupling: u32, distance: f64, config: &CouplingConfig) -> RiskLevel {
    if total_coupling >= config.coupling_high_threshold || distance > 0.5 {
        RiskLevel::High
    } else if total_coupling >= config.coupling_medium_threshold || distance > config.distance_threshold
    {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Every module reachable from `id` over dependency edges, excluding
/// `id` itself. Sorted.
pub fn transitive_dependencies(graph: &DependencyGraph, id: &str) -> Vec<String> {
    let Some(start) = graph.index_of(id) else {
        return Vec::new();
    };
    let pg = graph.inner();
    let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
    let mut stack = vec![start];
    while let Some(idx) = stack.pop() {
        for next in pg.neighbors_directed(idx, Direction::Outgoing) {
            if next != start && visited.insert(next) {
                stack.push(next);
            }
        }
    }
    let mut ids: Vec<String> = visited.into_iter().map(|i| pg[i].id.clone()).collect();
    ids.sort();
    ids
}

/// Longest dependency chain below `id`. Cycles contribute 0 on revisit.
pub fn max_dependency_depth(graph: &DependencyGraph, id: &str) -> u32 {
    let mut memo = FxHashMap::default();
    max_dependency_depth_memo(graph, id, &mut memo)
}

fn max_dependency_depth_memo(
    graph: &DependencyGraph,
    id: &str,
    memo: &mut FxHashMap<NodeIndex, u32>,
) -> u32 {
    let Some(start) = graph.index_of(id) else {
        return 0;
    };
    let mut on_stack = FxHashSet::default();
    depth_of(graph, start, memo, &mut on_stack)
}

fn depth_of(
    graph: &DependencyGraph,
    idx: NodeIndex,
    memo: &mut FxHashMap<NodeIndex, u32>,
    on_stack: &mut FxHashSet<NodeIndex>,
) -> u32 {
    if let Some(&d) = memo.get(&idx) {
        return d;
    }
    if !on_stack.insert(idx) {
        return 0;
    }
    let depth = graph
        .inner()
        .neighbors_directed(idx, Direction::Outgoing)
        .map(|next| 1 + depth_of(graph, next, memo, on_stack))
        .max()
        .unwrap_or(0);
    on_stack.remove(&idx);
    memo.insert(idx, depth);
    depth
}

/// Coupling between objects: distinct modules a module depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CboMetrics {
    pub module: String,
    pub cbo: u32,
    pub dependencies: Vec<String>,
    pub risk: RiskLevel,
}

/// CBO straight from module info, so builtin/type-only filtering works
/// even when those imports never became graph nodes.
pub fn compute_cbo(modules: &FxHashMap<String, ModuleInfo>, config: &CboConfig) -> Vec<CboMetrics> {
    let mut files: Vec<&String> = modules.keys().collect();
    files.sort();
    files
        .into_iter()
        .map(|file| {
            let module = &modules[file];
            let mut deps: FxHashSet<&str> = FxHashSet::default();
            for import in &module.imports {
                if !config.include_builtins && is_builtin(&import.source) {
                    continue;
                }
                if !config.include_type_imports && import.is_type_only {
                    continue;
                }
                deps.insert(import.source.as_str());
            }
            let mut dependencies: Vec<String> = deps.into_iter().map(String::from).collect();
            dependencies.sort();
            let cbo = dependencies.len() as u32;
            let risk = if cbo <= config.low_threshold {
                RiskLevel::Low
            } else if cbo <= config.medium_threshold {
                RiskLevel::Medium
            } else {
                RiskLevel::High
            };
            CboMetrics {
                module: file.clone(),
                cbo,
                dependencies,
                risk,
            }
        })
        .collect()
}
