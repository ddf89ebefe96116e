//! Module-level records produced by the analyzer.

use facet_core::types::ast::SourceLocation;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// How an import source string was classified. Pure string matching:
/// no file-system probing, no `node_modules` resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    /// `./x` or `../x`
    Relative,
    /// `/abs/path`
    Absolute,
    /// Bare specifier resolved to a package name.
    Package,
    /// `node:fs` or a known Node builtin name.
    Builtin,
    /// Matches a configured alias prefix (`@/`, `~/`).
    Alias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportKind {
    Default,
    Named,
    Namespace,
    SideEffect,
    Dynamic,
    Require,
    TypeOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    /// Binding name in the importing file.
    pub local: String,
    /// Name as exported by the source module.
    pub imported: String,
    pub is_type: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportInfo {
    pub source: String,
    pub source_type: SourceType,
    pub kind: ImportKind,
    pub specifiers: SmallVec<[ImportSpecifier; 2]>,
    pub location: SourceLocation,
    pub is_dynamic: bool,
    pub is_type_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportKind {
    Default,
    Named,
    /// `export * from '...'`
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportInfo {
    pub name: String,
    pub kind: ExportKind,
    /// Non-empty for re-exports (`export ... from 'source'`).
    pub source: Option<String>,
    pub is_type_only: bool,
    /// The exported symbol is a function declaration.
    pub is_function: bool,
    pub location: SourceLocation,
}

impl ExportInfo {
    pub fn is_reexport(&self) -> bool {
        self.source.is_some()
    }
}

/// Everything the analyzer knows about one source file. Immutable after
/// analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub file: String,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    /// Deduplicated, sorted import sources.
    pub dependencies: Vec<String>,
}
