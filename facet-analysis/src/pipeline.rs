//! Project-level orchestration.
//!
//! Per-file phase (parallel): CFG construction, complexity,
//! reachability, dead code, and module extraction. Project phase:
//! dependency graph, coupling, CBO, cycles, unused/orphan analysis,
//! and clone detection with grouping. Per-file failures are captured
//! into the file record; only cancellation aborts the run.

use std::time::Instant;

use facet_core::cancel::CancelToken;
use facet_core::config::FacetConfig;
use facet_core::errors::AnalysisError;
use facet_core::traits::AstProvider;
use facet_core::types::ast::AstNode;
use facet_core::types::collections::FxHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cfg::builder::CfgBuilder;
use crate::cfg::complexity::{self, ComplexityMetrics};
use crate::cfg::dead_code::{self, DeadCodeFinding};
use crate::cfg::reachability;
use crate::clones::detector::CloneDetector;
use crate::clones::grouping;
use crate::clones::types::{CloneGroup, ClonePair, Fragment};
use crate::graph::coupling as coupling_metrics;
use crate::graph::coupling::{CboMetrics, CouplingMetrics};
use crate::graph::cycles::{self, CircularDependencyAnalysis};
use crate::graph::dependency::DependencyGraphBuilder;
use crate::modules::analyzer::ModuleAnalyzer;
use crate::modules::resolve;
use crate::modules::types::ModuleInfo;
use crate::modules::unused::{self, UnusedAnalysis};

/// Per-function record from the CFG phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionAnalysis {
    pub name: String,
    pub complexity: ComplexityMetrics,
    pub reachability_ratio: f64,
    pub dead_code: Vec<DeadCodeFinding>,
}

/// Everything produced for one file. `error` records a non-fatal
/// per-file failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub file: String,
    pub functions: Vec<FunctionAnalysis>,
    pub module: ModuleInfo,
    pub error: Option<String>,
    pub analysis_time_us: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineTimings {
    pub file_phase_us: u64,
    pub graph_phase_us: u64,
    pub clone_phase_us: u64,
    pub total_us: u64,
}

/// Aggregated result of a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub files: Vec<FileAnalysis>,
    pub coupling: Vec<CouplingMetrics>,
    pub cbo: Vec<CboMetrics>,
    pub cycles: CircularDependencyAnalysis,
    pub unused: UnusedAnalysis,
    pub clone_pairs: Vec<ClonePair>,
    pub clone_groups: Vec<CloneGroup>,
    pub timings: PipelineTimings,
}

#[derive(Debug, Default)]
pub struct AnalysisPipeline {
    config: FacetConfig,
}

impl AnalysisPipeline {
    pub fn new(config: FacetConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Analyze a project served by any [`AstProvider`], typically a
    /// plain `file path -> AST root` map. Paths are slash-normalized
    /// before anything else so every downstream id is canonical.
    pub fn analyze<P: AstProvider + Sync>(
        &self,
        provider: &P,
        cancel: &CancelToken,
    ) -> Result<ProjectAnalysis, AnalysisError> {
        let total_start = Instant::now();

        // Normalized path -> (original path, AST).
        let mut normalized: FxHashMap<String, (&str, &AstNode)> = FxHashMap::default();
        for file in provider.files() {
            if let Some(ast) = provider.ast(file) {
                normalized.insert(resolve::normalize(file), (file, ast));
            }
        }
        let mut paths: Vec<&String> = normalized.keys().collect();
        paths.sort();

        // ── Per-file phase ──
        let file_start = Instant::now();
        let mut file_results: Vec<FileAnalysis> = paths
            .par_iter()
            .map(|path| {
                let (original, ast) = normalized[*path];
                self.analyze_file(path, provider.source_text(original), ast)
            })
            .collect();
        file_results.sort_by(|a, b| a.file.cmp(&b.file));
        let file_phase_us = file_start.elapsed().as_micros() as u64;

        if cancel.is_cancelled() {
            return Err(AnalysisError::cancelled("per-file analysis"));
        }

        // ── Graph phase ──
        let graph_start = Instant::now();
        let modules: FxHashMap<String, ModuleInfo> = file_results
            .iter()
            .map(|f| (f.file.clone(), f.module.clone()))
            .collect();
        let graph = DependencyGraphBuilder::new(self.config.dependency_graph.clone()).build(&modules);
        let coupling = coupling_metrics::compute(&graph, &self.config.coupling);
        let cbo = coupling_metrics::compute_cbo(&modules, &self.config.cbo);
        let cycle_analysis = cycles::detect(&graph);
        let owned_asts: FxHashMap<String, AstNode> = normalized
            .iter()
            .map(|(path, (_, ast))| (path.clone(), (*ast).clone()))
            .collect();
        let unused_analysis = unused::analyze(&modules, &owned_asts);
        let graph_phase_us = graph_start.elapsed().as_micros() as u64;

        if cancel.is_cancelled() {
            return Err(AnalysisError::cancelled("graph analysis"));
        }

        // ── Clone phase ──
        let clone_start = Instant::now();
        let detector = CloneDetector::new(self.config.clones.clone());
        let mut fragments: Vec<Fragment> = paths
            .par_iter()
            .flat_map_iter(|path| detector.extract_fragments(normalized[*path].1))
            .collect();
        fragments.sort_by(|a, b| a.info.sort_key().cmp(&b.info.sort_key()));
        let clone_pairs = detector.detect_pairs(&fragments, cancel)?;
        let clone_groups = grouping::group(&clone_pairs, &self.config.grouping);
        let clone_phase_us = clone_start.elapsed().as_micros() as u64;

        Ok(ProjectAnalysis {
            files: file_results,
            coupling,
            cbo,
            cycles: cycle_analysis,
            unused: unused_analysis,
            clone_pairs,
            clone_groups,
            timings: PipelineTimings {
                file_phase_us,
                graph_phase_us,
                clone_phase_us,
                total_us: total_start.elapsed().as_micros() as u64,
            },
        })
    }

    fn analyze_file(&self, path: &str, source_text: Option<&str>, ast: &AstNode) -> FileAnalysis {
        let start = Instant::now();
        let module = ModuleAnalyzer::new(self.config.modules.clone()).analyze(path, ast, source_text);

        // Function nodes by location, for the nesting-depth walk.
        let mut function_nodes: FxHashMap<(u32, u32), &AstNode> = FxHashMap::default();
        collect_function_nodes(ast, &mut function_nodes);

        let mut functions = Vec::new();
        let mut error = None;
        match CfgBuilder::new().build_all(ast) {
            Ok(cfgs) => {
                for (name, cfg) in &cfgs {
                    let function_ast = cfg
                        .function_location
                        .as_ref()
                        .and_then(|loc| function_nodes.get(&(loc.start_line, loc.start_col)))
                        .copied();
                    let reach = reachability::analyze(cfg);
                    functions.push(FunctionAnalysis {
                        name: name.clone(),
                        complexity: complexity::calculate(cfg, function_ast, &self.config.complexity),
                        reachability_ratio: reach.ratio,
                        dead_code: dead_code::detect(cfg, &reach),
                    });
                }
            }
            Err(e) => {
                tracing::warn!(file = %path, error = %e, "per-file CFG analysis failed");
                error = Some(e.to_string());
            }
        }

        FileAnalysis {
            file: path.to_string(),
            functions,
            module,
            error,
            analysis_time_us: start.elapsed().as_micros() as u64,
        }
    }
}

fn collect_function_nodes<'a>(node: &'a AstNode, out: &mut FxHashMap<(u32, u32), &'a AstNode>) {
    for child in node.slots() {
        if child.kind.is_function() {
            out.insert((child.location.start_line, child.location.start_col), child);
        }
        collect_function_nodes(child, out);
    }
}
