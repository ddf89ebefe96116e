//! Clone records.

use facet_core::types::ast::SourceLocation;
use serde::{Deserialize, Serialize};

use super::tree::LabeledTree;

/// A candidate code fragment: an AST subtree rooted at a function,
/// class, loop, branch, or try statement.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub info: FragmentInfo,
    /// Labeled-tree form, converted once and reused across every
    /// pairwise comparison.
    pub tree: LabeledTree,
}

/// The serializable part of a fragment, referenced from pairs and groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentInfo {
    pub location: SourceLocation,
    pub kind: String,
    pub name: Option<String>,
    pub line_count: u32,
    pub node_count: usize,
    pub complexity: Option<u32>,
}

impl FragmentInfo {
    /// Deterministic total order over fragments, by location.
    pub fn sort_key(&self) -> (String, u32, u32, u32) {
        (
            self.location.file.clone(),
            self.location.start_line,
            self.location.start_col,
            self.location.end_line,
        )
    }
}

/// Clone taxonomy: exact, renamed, gapped, semantically similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CloneType {
    Type1,
    Type2,
    Type3,
    Type4,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClonePair {
    pub fragment1: FragmentInfo,
    pub fragment2: FragmentInfo,
    pub similarity: f64,
    pub clone_type: CloneType,
    pub confidence: f64,
}

/// A set of two or more clones sharing one similarity level and a
/// dominant type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneGroup {
    pub id: usize,
    pub members: Vec<FragmentInfo>,
    pub similarity: f64,
    pub clone_type: CloneType,
}
