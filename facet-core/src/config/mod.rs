//! Analyzer configuration.
//!
//! Plain serde value-types, one per analyzer. No hidden global state:
//! every analyzer takes its config by value or reference, callers
//! override fields explicitly on top of `Default`.

use serde::{Deserialize, Serialize};

/// Cyclomatic-complexity thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityConfig {
    /// Complexity at or below this is low risk. Default: 5.
    pub low_threshold: u32,
    /// Complexity at or below this is medium risk. Default: 10.
    pub medium_threshold: u32,
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            low_threshold: 5,
            medium_threshold: 10,
        }
    }
}

/// Coupling-between-objects thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CboConfig {
    /// Count Node builtins as dependencies. Default: false.
    pub include_builtins: bool,
    /// Count type-only imports as dependencies. Default: false.
    pub include_type_imports: bool,
    /// CBO at or below this is low risk. Default: 5.
    pub low_threshold: u32,
    /// CBO at or below this is medium risk. Default: 10.
    pub medium_threshold: u32,
}

impl Default for CboConfig {
    fn default() -> Self {
        Self {
            include_builtins: false,
            include_type_imports: false,
            low_threshold: 5,
            medium_threshold: 10,
        }
    }
}

/// Dependency-graph construction options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyGraphConfig {
    /// Keep package/builtin/unresolved modules as graph nodes. Default: false.
    pub include_external: bool,
    /// Create edges for type-only imports (tagged `TypeOnly`). Default: true.
    pub include_type_imports: Option<bool>,
    /// Module IDs are made relative to this root when set.
    pub project_root: Option<String>,
}

impl DependencyGraphConfig {
    pub fn effective_include_type_imports(&self) -> bool {
        self.include_type_imports.unwrap_or(true)
    }

    pub fn effective_project_root(&self) -> &str {
        self.project_root.as_deref().unwrap_or("")
    }
}

/// Coupling-metric thresholds (Martin metrics).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CouplingConfig {
    /// Instability above this marks a module unstable. Default: 0.8.
    pub instability_high_threshold: f64,
    /// Instability below this marks a module stable. Default: 0.2.
    pub instability_low_threshold: f64,
    /// Distance from the main sequence below this is acceptable. Default: 0.4.
    pub distance_threshold: f64,
    /// Total coupling (Ca+Ce) at or above this is high risk. Default: 20.
    pub coupling_high_threshold: u32,
    /// Total coupling (Ca+Ce) at or above this is medium risk. Default: 10.
    pub coupling_medium_threshold: u32,
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            instability_high_threshold: 0.8,
            instability_low_threshold: 0.2,
            distance_threshold: 0.4,
            coupling_high_threshold: 20,
            coupling_medium_threshold: 10,
        }
    }
}

/// Which edit-cost model the clone detector uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModelKind {
    /// Uniform unit costs, binary rename.
    Default,
    /// Language-aware multipliers, label-similarity renames, ignore rules.
    #[default]
    Javascript,
    /// Type multipliers with binary rename.
    Weighted,
}

/// Clone-detector options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneConfig {
    /// Minimum fragment height in source lines. Default: 5.
    pub min_lines: u32,
    /// Minimum fragment size in AST nodes. Default: 10.
    pub min_nodes: usize,
    pub cost_model: CostModelKind,
    /// Treat all literals as interchangeable. Default: false.
    pub ignore_literals: bool,
    /// Treat all identifiers as interchangeable. Default: false.
    pub ignore_identifiers: bool,
    pub type1_threshold: f64,
    pub type2_threshold: f64,
    pub type3_threshold: f64,
    pub type4_threshold: f64,
    /// Prefilter candidate pairs with locality-sensitive hashing. Default: false.
    pub use_lsh: bool,
    /// Pair-batch size for small fragment sets. Default: 1000.
    pub batch_size_large: usize,
    /// Pair-batch size once the fragment count crosses the threshold. Default: 100.
    pub batch_size_small: usize,
    /// Fragment count at which the small batch size kicks in. Default: 1000.
    pub batch_size_threshold: usize,
    /// Size-ratio prune: a pair is skipped when the smaller fragment is
    /// below `(1 - size_ratio)` of the larger. Default: 0.3.
    pub size_ratio: f64,
    /// Absolute line-count difference always tolerated by the prune. Default: 5.
    pub line_diff_tolerance: u32,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            min_lines: 5,
            min_nodes: 10,
            cost_model: CostModelKind::Javascript,
            ignore_literals: false,
            ignore_identifiers: false,
            type1_threshold: 0.98,
            type2_threshold: 0.95,
            type3_threshold: 0.80,
            type4_threshold: 0.70,
            use_lsh: false,
            batch_size_large: 1000,
            batch_size_small: 100,
            batch_size_threshold: 1000,
            size_ratio: 0.3,
            line_diff_tolerance: 5,
        }
    }
}

/// Clone grouping strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    #[default]
    Connected,
    KCore,
    StarMedoid,
    CompleteLinkage,
    Centroid,
}

/// Clone grouping options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub mode: GroupingMode,
    /// Minimum pair similarity for two clones to be grouped. Default: 0.8.
    pub threshold: f64,
    /// Degree bound for k-core grouping, floored to 2. Default: 2.
    pub kcore_k: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            mode: GroupingMode::Connected,
            threshold: 0.8,
            kcore_k: 2,
        }
    }
}

/// Module-analyzer options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Record imports of Node builtins. Default: true.
    pub include_builtins: bool,
    /// Record type-only imports. Default: true.
    pub include_type_imports: bool,
    /// Resolve relative import paths against the importing file. Default: true.
    pub resolve_relative: bool,
    /// Prefixes classified as path aliases. Default: `@/`, `~/`.
    pub alias_patterns: Vec<String>,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            include_builtins: true,
            include_type_imports: true,
            resolve_relative: true,
            alias_patterns: vec!["@/".to_string(), "~/".to_string()],
        }
    }
}

/// Aggregate configuration for a full pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetConfig {
    pub complexity: ComplexityConfig,
    pub cbo: CboConfig,
    pub dependency_graph: DependencyGraphConfig,
    pub coupling: CouplingConfig,
    pub clones: CloneConfig,
    pub grouping: GroupingConfig,
    pub modules: ModuleConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_round_trips_through_json() {
        let config = FacetConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: FacetConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.complexity.low_threshold, config.complexity.low_threshold);
        assert_eq!(back.clones.type1_threshold, config.clones.type1_threshold);
        assert_eq!(back.grouping.mode, config.grouping.mode);
        assert_eq!(back.modules.alias_patterns, config.modules.alias_patterns);
    }

    #[test]
    fn partial_config_fills_missing_fields_with_defaults() {
        let json = r#"{
            "complexity": { "low_threshold": 3 },
            "grouping": { "mode": "k_core", "kcore_k": 4 }
        }"#;
        let config: FacetConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.complexity.low_threshold, 3);
        assert_eq!(config.complexity.medium_threshold, 10);
        assert_eq!(config.grouping.mode, GroupingMode::KCore);
        assert_eq!(config.grouping.kcore_k, 4);
        assert!((config.grouping.threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.clones.min_lines, 5);
    }

    #[test]
    fn cost_model_and_mode_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&CostModelKind::Javascript).unwrap(),
            "\"javascript\""
        );
        assert_eq!(
            serde_json::to_string(&GroupingMode::CompleteLinkage).unwrap(),
            "\"complete_linkage\""
        );
    }
}
