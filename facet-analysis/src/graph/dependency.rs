//! Module dependency graph construction over petgraph.
//!
//! Nodes are module IDs (normalized slash paths, project-root
//! relative). A side index maps IDs to petgraph indices; a
//! `StableDiGraph` keeps indices valid across removals. The graph is
//! assembled once and handed read-only to coupling and cycle consumers.

use facet_core::config::DependencyGraphConfig;
use facet_core::types::collections::{FxHashMap, FxHashSet};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::modules::resolve::{self, resolve_relative, stem, unresolved_target};
use crate::modules::types::{ModuleInfo, SourceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleType {
    Internal,
    External,
    Builtin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleNode {
    pub id: String,
    pub name: String,
    pub path: String,
    pub module_type: ModuleType,
    pub is_external: bool,
    pub is_entry_point: bool,
    pub is_leaf: bool,
    pub exports: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyEdgeKind {
    Import,
    Dynamic,
    TypeOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub kind: DependencyEdgeKind,
    pub weight: u32,
}

/// Directed, weighted module graph with O(1) id lookup and both
/// adjacency directions.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: StableDiGraph<ModuleNode, DependencyEdge>,
    ids: FxHashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or return the existing index for its id.
    pub fn add_module(&mut self, node: ModuleNode) -> NodeIndex {
        if let Some(&idx) = self.ids.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.ids.insert(id, idx);
        idx
    }

    /// Add a dependency edge. A repeated `from -> to` pair accumulates
    /// weight onto the existing edge instead of multiplying edges.
    pub fn add_dependency(&mut self, from: NodeIndex, to: NodeIndex, edge: DependencyEdge) {
        if let Some(existing) = self.graph.find_edge(from, to) {
            self.graph[existing].weight += edge.weight;
            return;
        }
        self.graph.add_edge(from, to, edge);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&ModuleNode> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    pub fn node_at(&self, idx: NodeIndex) -> &ModuleNode {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Module ids in lexicographic order.
    pub fn module_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Outgoing neighbor ids in edge-insertion order.
    pub fn dependencies_of(&self, id: &str) -> Vec<String> {
        self.neighbor_ids(id, Direction::Outgoing)
    }

    /// Incoming neighbor ids in edge-insertion order.
    pub fn dependents_of(&self, id: &str) -> Vec<String> {
        self.neighbor_ids(id, Direction::Incoming)
    }

    fn neighbor_ids(&self, id: &str, dir: Direction) -> Vec<String> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        // petgraph iterates adjacency newest-first; reverse to get
        // insertion order.
        let mut ids: Vec<String> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|n| self.graph[n].id.clone())
            .collect();
        ids.reverse();
        ids
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.index_of(id)
            .map(|idx| self.graph.edges_directed(idx, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.index_of(id)
            .map(|idx| self.graph.edges_directed(idx, Direction::Incoming).count())
            .unwrap_or(0)
    }

    /// Every edge as `(from id, to id, edge)`, in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str, &DependencyEdge)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].id.as_str(),
                    self.graph[e.target()].id.as_str(),
                    e.weight(),
                )
            })
            .collect()
    }

    /// Remove a module and all incident edges in both directions.
    pub fn remove_module(&mut self, id: &str) -> Option<ModuleNode> {
        let idx = self.ids.remove(id)?;
        self.graph.remove_node(idx)
    }

    /// Recompute the entry/leaf flags from current degrees.
    pub fn recompute_flags(&mut self) {
        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        for idx in indices {
            let incoming = self.graph.edges_directed(idx, Direction::Incoming).count();
            let outgoing = self.graph.edges_directed(idx, Direction::Outgoing).count();
            let node = &mut self.graph[idx];
            node.is_entry_point = incoming == 0;
            node.is_leaf = outgoing == 0;
        }
    }

    /// Read-only access to the underlying petgraph for the algorithms
    /// that run directly on it (Tarjan SCC).
    pub fn inner(&self) -> &StableDiGraph<ModuleNode, DependencyEdge> {
        &self.graph
    }
}

/// Builds a [`DependencyGraph`] from analyzed module info.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    config: DependencyGraphConfig,
}

impl DependencyGraphBuilder {
    pub fn new(config: DependencyGraphConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn build(&self, modules: &FxHashMap<String, ModuleInfo>) -> DependencyGraph {
        let mut graph = DependencyGraph::new();

        // Known files under their raw paths, for relative resolution.
        let known: FxHashSet<String> = modules.keys().cloned().collect();

        // One node per analyzed file, in sorted order so node indices
        // are deterministic.
        let mut files: Vec<&String> = modules.keys().collect();
        files.sort();
        for file in &files {
            let module = &modules[*file];
            graph.add_module(ModuleNode {
                id: self.module_id(file),
                name: stem(file).to_string(),
                path: (*file).clone(),
                module_type: ModuleType::Internal,
                is_external: false,
                is_entry_point: false,
                is_leaf: false,
                exports: module.exports.iter().map(|e| e.name.clone()).collect(),
            });
        }

        for file in &files {
            let module = &modules[*file];
            let from = graph
                .index_of(&self.module_id(file))
                .expect("importing file was just added");
            for import in &module.imports {
                if import.is_type_only && !self.config.effective_include_type_imports() {
                    continue;
                }
                let Some(to) = self.target_index(&mut graph, file, import, &known) else {
                    continue;
                };
                let kind = if import.is_dynamic {
                    DependencyEdgeKind::Dynamic
                } else if import.is_type_only {
                    DependencyEdgeKind::TypeOnly
                } else {
                    DependencyEdgeKind::Import
                };
                graph.add_dependency(
                    from,
                    to,
                    DependencyEdge {
                        kind,
                        weight: (import.specifiers.len() as u32).max(1),
                    },
                );
            }
        }

        graph.recompute_flags();
        graph
    }

    /// Resolve one import to a target node, creating external nodes on
    /// demand. `None` suppresses the edge entirely.
    fn target_index(
        &self,
        graph: &mut DependencyGraph,
        from_file: &str,
        import: &crate::modules::types::ImportInfo,
        known: &FxHashSet<String>,
    ) -> Option<NodeIndex> {
        match import.source_type {
            SourceType::Relative => {
                if let Some(resolved) = resolve_relative(from_file, &import.source, known) {
                    return graph.index_of(&self.module_id(&resolved));
                }
                // Unresolved relative targets keep their normalized path
                // as an id; they are project-shaped, so external
                // suppression does not apply.
                let id = self.relative_id(&unresolved_target(from_file, &import.source));
                Some(self.external_node(graph, id, ModuleType::External))
            }
            SourceType::Absolute => {
                let normalized = resolve::normalize(&import.source);
                if known.contains(&normalized) {
                    return graph.index_of(&self.module_id(&normalized));
                }
                if !self.config.include_external {
                    return None;
                }
                Some(self.external_node(graph, normalized, ModuleType::External))
            }
            SourceType::Builtin => {
                if !self.config.include_external {
                    return None;
                }
                Some(self.external_node(graph, import.source.clone(), ModuleType::Builtin))
            }
            SourceType::Package | SourceType::Alias => {
                if !self.config.include_external {
                    return None;
                }
                Some(self.external_node(graph, import.source.clone(), ModuleType::External))
            }
        }
    }

    fn external_node(&self, graph: &mut DependencyGraph, id: String, module_type: ModuleType) -> NodeIndex {
        if let Some(idx) = graph.index_of(&id) {
            return idx;
        }
        graph.add_module(ModuleNode {
            name: stem(&id).to_string(),
            path: id.clone(),
            id,
            module_type,
            is_external: true,
            is_entry_point: false,
            is_leaf: false,
            exports: Vec::new(),
        })
    }

    fn module_id(&self, file: &str) -> String {
        self.relative_id(&resolve::normalize(file))
    }

    fn relative_id(&self, normalized: &str) -> String {
        let root = self.config.effective_project_root();
        if root.is_empty() {
            return normalized.to_string();
        }
        let root = resolve::normalize(root);
        normalized
            .strip_prefix(&format!("{root}/"))
            .unwrap_or(normalized)
            .to_string()
    }
}
