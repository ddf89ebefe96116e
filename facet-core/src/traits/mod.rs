//! Integration seams for embedders.

use crate::types::ast::AstNode;
use crate::types::collections::FxHashMap;

/// Source of parsed ASTs, one root per file.
///
/// The engine never parses source text itself; a parser adapter
/// implements this over whatever frontend it wraps. The provided impl
/// for a plain map covers the common case of a pre-parsed project.
pub trait AstProvider {
    /// Paths of every file the provider can serve. Order is not
    /// significant; consumers sort.
    fn files(&self) -> Vec<&str>;

    /// The immutable AST root for a file, if it was parsed.
    fn ast(&self, file: &str) -> Option<&AstNode>;

    /// Raw source text, if the provider retains it. Only consulted for
    /// the `import type ` line-prefix check.
    fn source_text(&self, _file: &str) -> Option<&str> {
        None
    }
}

impl AstProvider for FxHashMap<String, AstNode> {
    fn files(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn ast(&self, file: &str) -> Option<&AstNode> {
        self.get(file)
    }
}
