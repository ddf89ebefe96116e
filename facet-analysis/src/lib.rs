//! # facet-analysis
//!
//! Analysis engine for the Facet structural-quality tool.
//! Contains the control-flow graph builder, reachability and dead-code
//! analysis, cyclomatic complexity, module analysis, the dependency
//! graph with coupling metrics and cycle detection, and the clone
//! detection pipeline with its grouping strategies.

pub mod cfg;
pub mod clones;
pub mod graph;
pub mod modules;
pub mod pipeline;
