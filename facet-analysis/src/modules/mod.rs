//! Module analysis: import/export extraction, path resolution, and
//! cross-file unused/orphan detection.

pub mod analyzer;
pub mod resolve;
pub mod source_type;
pub mod types;
pub mod unused;

pub use analyzer::ModuleAnalyzer;
pub use types::{ExportInfo, ExportKind, ImportInfo, ImportKind, ImportSpecifier, ModuleInfo, SourceType};
