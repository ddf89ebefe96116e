//! The module dependency graph and its consumers: coupling metrics and
//! cycle detection.

pub mod coupling;
pub mod cycles;
pub mod dependency;

pub use dependency::{
    DependencyEdge, DependencyEdgeKind, DependencyGraph, DependencyGraphBuilder, ModuleNode, ModuleType,
};
