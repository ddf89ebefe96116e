//! # facet-core
//!
//! Foundation crate for the Facet analysis engine.
//! Defines the AST input model, configuration, errors, cancellation,
//! and shared collection types. Every other crate in the workspace
//! depends on this.

pub mod cancel;
pub mod config;
pub mod errors;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use cancel::CancelToken;
pub use config::FacetConfig;
pub use errors::error_code::FacetErrorCode;
pub use errors::AnalysisError;
pub use types::ast::{AstNode, NodeCategory, NodeKind, SourceLocation};
pub use types::collections::{FxHashMap, FxHashSet};
