//! The AST input model.
//!
//! Facet does not parse source text. An external parser adapter lowers
//! its parse tree into [`AstNode`] values and hands the engine a map of
//! `file path -> AST root`. The node shape mirrors the ESTree vocabulary:
//! a `kind` tag, a source location, optional `name`/`value` payloads,
//! generic and role-specific child collections, and boxed single-child
//! slots for the common named fields.
//!
//! Conventions the analyzers rely on:
//! - `ImportDeclaration.value` holds the import source string;
//!   `name == Some("type")` marks a type-only import.
//! - Import/export specifiers carry the local binding in `name` and the
//!   imported/exported name in `value`; type-only specifiers use the
//!   `ImportTypeSpecifier` / `ExportTypeSpecifier` kinds.
//! - `BinaryExpression` / `LogicalExpression` carry the operator in `value`.
//! - Re-exports (`export ... from`) carry the source in `value`.
//! - `Literal.value` is the literal's raw text.

use serde::{Deserialize, Serialize};

/// Hard ceiling on recursive traversals. At the limit the traversal
/// treats the node as a leaf rather than aborting the pipeline.
pub const MAX_TRAVERSAL_DEPTH: usize = 1000;

/// A position range within a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            start_col: 0,
            end_line,
            end_col: 0,
        }
    }

    /// Number of source lines covered, inclusive.
    pub fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// Coarse node classification used by the clone cost model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Functions, classes, program roots.
    Structural,
    /// Branching and looping constructs.
    ControlFlow,
    /// Other statements.
    Statement,
    Expression,
    Identifier,
    Literal,
    Jsx,
    Other,
}

/// The node type tag, drawn from the fixed JS/TS vocabulary.
///
/// Backed by a string rather than a closed enum: parser adapters emit
/// grammar-specific kinds (JSX, TS-only nodes) that the engine only
/// needs to classify coarsely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKind(String);

impl NodeKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_program(&self) -> bool {
        self.0 == "Program"
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self.0.as_str(),
            "FunctionDeclaration" | "FunctionExpression" | "ArrowFunctionExpression" | "MethodDefinition"
        )
    }

    pub fn is_class(&self) -> bool {
        matches!(self.0.as_str(), "ClassDeclaration" | "ClassExpression")
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self.0.as_str(),
            "ForStatement" | "ForInStatement" | "ForOfStatement" | "WhileStatement" | "DoWhileStatement"
        )
    }

    pub fn is_jump(&self) -> bool {
        matches!(
            self.0.as_str(),
            "ReturnStatement" | "BreakStatement" | "ContinueStatement" | "ThrowStatement"
        )
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self.0.as_str(), "Identifier" | "JSXIdentifier" | "PrivateIdentifier")
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.0.as_str(),
            "Literal"
                | "StringLiteral"
                | "NumericLiteral"
                | "BooleanLiteral"
                | "NullLiteral"
                | "TemplateLiteral"
                | "RegExpLiteral"
        )
    }

    pub fn is_import_declaration(&self) -> bool {
        self.0 == "ImportDeclaration"
    }

    pub fn is_export_declaration(&self) -> bool {
        matches!(
            self.0.as_str(),
            "ExportNamedDeclaration" | "ExportDefaultDeclaration" | "ExportAllDeclaration"
        )
    }

    /// Nodes that open a clone-detection fragment: functions, classes,
    /// loops, branches, and try blocks.
    pub fn is_fragment_root(&self) -> bool {
        self.is_function()
            || self.is_class()
            || self.is_loop()
            || matches!(self.0.as_str(), "IfStatement" | "TryStatement")
    }

    pub fn category(&self) -> NodeCategory {
        match self.0.as_str() {
            "Program" | "FunctionDeclaration" | "FunctionExpression" | "ArrowFunctionExpression"
            | "MethodDefinition" | "ClassDeclaration" | "ClassExpression" | "ClassBody" => {
                NodeCategory::Structural
            }
            "IfStatement" | "SwitchStatement" | "SwitchCase" | "ForStatement" | "ForInStatement"
            | "ForOfStatement" | "WhileStatement" | "DoWhileStatement" | "TryStatement"
            | "CatchClause" | "ConditionalExpression" => NodeCategory::ControlFlow,
            "Identifier" | "JSXIdentifier" | "PrivateIdentifier" => NodeCategory::Identifier,
            "Literal" | "StringLiteral" | "NumericLiteral" | "BooleanLiteral" | "NullLiteral"
            | "TemplateLiteral" | "RegExpLiteral" => NodeCategory::Literal,
            s if s.starts_with("JSX") => NodeCategory::Jsx,
            s if s.ends_with("Expression") || s.ends_with("Chaining") => NodeCategory::Expression,
            s if s.ends_with("Statement") || s.ends_with("Declaration") || s.ends_with("Declarator") => {
                NodeCategory::Statement
            }
            _ => NodeCategory::Other,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for NodeKind {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeKind {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// An immutable parse-tree node.
///
/// Child collections and named slots together cover the ESTree shapes
/// the analyzers consume. Empty collections and `None` slots cost
/// nothing to skip, so the single struct stays cheaper than a closed
/// enum across the whole vocabulary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AstNode {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub value: Option<String>,
    pub location: SourceLocation,

    pub children: Vec<AstNode>,
    /// Statement list (`body` in ESTree terms).
    pub body: Vec<AstNode>,
    pub params: Vec<AstNode>,
    pub cases: Vec<AstNode>,
    /// Catch/finally handler nodes of a try statement.
    pub handlers: Vec<AstNode>,
    pub arguments: Vec<AstNode>,
    pub declarations: Vec<AstNode>,
    pub specifiers: Vec<AstNode>,

    pub test: Option<Box<AstNode>>,
    pub consequent: Option<Box<AstNode>>,
    pub alternate: Option<Box<AstNode>>,
    pub init: Option<Box<AstNode>>,
    pub update: Option<Box<AstNode>>,
    pub handler: Option<Box<AstNode>>,
    pub finalizer: Option<Box<AstNode>>,
    pub left: Option<Box<AstNode>>,
    pub right: Option<Box<AstNode>>,
    pub argument: Option<Box<AstNode>>,
    pub callee: Option<Box<AstNode>>,
    pub object: Option<Box<AstNode>>,
    pub property: Option<Box<AstNode>>,
}

impl Default for NodeKind {
    fn default() -> Self {
        Self("Unknown".to_string())
    }
}

impl AstNode {
    pub fn new(kind: impl Into<NodeKind>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    // ── Builder surface (used by parser adapters and tests) ──

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_stmt(mut self, stmt: AstNode) -> Self {
        self.body.push(stmt);
        self
    }

    pub fn with_param(mut self, param: AstNode) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_case(mut self, case: AstNode) -> Self {
        self.cases.push(case);
        self
    }

    pub fn with_catch(mut self, handler: AstNode) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn with_arg(mut self, arg: AstNode) -> Self {
        self.arguments.push(arg);
        self
    }

    pub fn with_decl(mut self, decl: AstNode) -> Self {
        self.declarations.push(decl);
        self
    }

    pub fn with_spec(mut self, spec: AstNode) -> Self {
        self.specifiers.push(spec);
        self
    }

    pub fn with_test(mut self, node: AstNode) -> Self {
        self.test = Some(Box::new(node));
        self
    }

    pub fn with_consequent(mut self, node: AstNode) -> Self {
        self.consequent = Some(Box::new(node));
        self
    }

    pub fn with_alternate(mut self, node: AstNode) -> Self {
        self.alternate = Some(Box::new(node));
        self
    }

    pub fn with_init(mut self, node: AstNode) -> Self {
        self.init = Some(Box::new(node));
        self
    }

    pub fn with_update(mut self, node: AstNode) -> Self {
        self.update = Some(Box::new(node));
        self
    }

    pub fn with_handler(mut self, node: AstNode) -> Self {
        self.handler = Some(Box::new(node));
        self
    }

    pub fn with_finalizer(mut self, node: AstNode) -> Self {
        self.finalizer = Some(Box::new(node));
        self
    }

    pub fn with_left(mut self, node: AstNode) -> Self {
        self.left = Some(Box::new(node));
        self
    }

    pub fn with_right(mut self, node: AstNode) -> Self {
        self.right = Some(Box::new(node));
        self
    }

    pub fn with_argument(mut self, node: AstNode) -> Self {
        self.argument = Some(Box::new(node));
        self
    }

    pub fn with_callee(mut self, node: AstNode) -> Self {
        self.callee = Some(Box::new(node));
        self
    }

    pub fn with_object(mut self, node: AstNode) -> Self {
        self.object = Some(Box::new(node));
        self
    }

    pub fn with_property(mut self, node: AstNode) -> Self {
        self.property = Some(Box::new(node));
        self
    }

    // ── Traversal ──

    /// All child nodes in the fixed slot order: generic children, body,
    /// params, cases, handlers, arguments, declarations, specifiers,
    /// then the named single-child slots.
    ///
    /// Every traversal in the engine (and the clone-tree conversion)
    /// uses this order, which is what makes outputs deterministic.
    pub fn slots(&self) -> impl Iterator<Item = &AstNode> {
        self.children
            .iter()
            .chain(self.body.iter())
            .chain(self.params.iter())
            .chain(self.cases.iter())
            .chain(self.handlers.iter())
            .chain(self.arguments.iter())
            .chain(self.declarations.iter())
            .chain(self.specifiers.iter())
            .chain(self.test.as_deref())
            .chain(self.consequent.as_deref())
            .chain(self.alternate.as_deref())
            .chain(self.init.as_deref())
            .chain(self.update.as_deref())
            .chain(self.handler.as_deref())
            .chain(self.finalizer.as_deref())
            .chain(self.left.as_deref())
            .chain(self.right.as_deref())
            .chain(self.argument.as_deref())
            .chain(self.callee.as_deref())
            .chain(self.object.as_deref())
            .chain(self.property.as_deref())
    }

    /// Preorder traversal. The visitor returning `false` prunes the
    /// subtree below the current node.
    pub fn walk<F: FnMut(&AstNode) -> bool>(&self, visitor: &mut F) {
        self.walk_at(visitor, 0);
    }

    fn walk_at<F: FnMut(&AstNode) -> bool>(&self, visitor: &mut F, depth: usize) {
        if !visitor(self) {
            return;
        }
        if depth >= MAX_TRAVERSAL_DEPTH {
            tracing::warn!(
                kind = %self.kind,
                file = %self.location.file,
                line = self.location.start_line,
                "traversal depth limit reached, treating node as leaf"
            );
            return;
        }
        for child in self.slots() {
            child.walk_at(visitor, depth + 1);
        }
    }

    /// Total node count of this subtree, including the root.
    /// Depth-guarded: beyond the limit a node counts as a leaf.
    pub fn subtree_size(&self) -> usize {
        let mut count = 0usize;
        self.walk(&mut |_| {
            count += 1;
            true
        });
        count
    }

    /// Number of source lines this node spans.
    pub fn line_count(&self) -> u32 {
        self.location.line_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_order_is_children_first() {
        let node = AstNode::new("IfStatement")
            .with_test(AstNode::new("Identifier").with_name("x"))
            .with_child(AstNode::new("Literal").with_value("1"));
        let kinds: Vec<&str> = node.slots().map(|n| n.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Literal", "Identifier"]);
    }

    #[test]
    fn walk_prunes_subtree() {
        let tree = AstNode::new("Program").with_stmt(
            AstNode::new("FunctionDeclaration")
                .with_name("f")
                .with_stmt(AstNode::new("ReturnStatement")),
        );
        let mut seen = Vec::new();
        tree.walk(&mut |n| {
            seen.push(n.kind.as_str().to_string());
            !n.kind.is_function()
        });
        assert_eq!(seen, vec!["Program", "FunctionDeclaration"]);
    }

    #[test]
    fn subtree_size_counts_all_slots() {
        let node = AstNode::new("BinaryExpression")
            .with_value("&&")
            .with_left(AstNode::new("Identifier").with_name("a"))
            .with_right(AstNode::new("Identifier").with_name("b"));
        assert_eq!(node.subtree_size(), 3);
    }

    #[test]
    fn node_round_trips_through_json() {
        let node = AstNode::new("IfStatement")
            .with_location(SourceLocation::new("a.ts", 3, 7))
            .with_test(
                AstNode::new("BinaryExpression")
                    .with_value(">")
                    .with_left(AstNode::new("Identifier").with_name("x"))
                    .with_right(AstNode::new("Literal").with_value("0")),
            )
            .with_consequent(AstNode::new("ReturnStatement"));
        let json = serde_json::to_string(&node).unwrap();
        let back: AstNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
        assert_eq!(back.subtree_size(), node.subtree_size());
    }

    #[test]
    fn deep_tree_is_cut_off_not_overflowed() {
        let mut node = AstNode::new("Identifier");
        for _ in 0..(MAX_TRAVERSAL_DEPTH + 50) {
            node = AstNode::new("UnaryExpression").with_argument(node);
        }
        // Conservative: the guard undercounts instead of blowing the stack.
        assert!(node.subtree_size() <= MAX_TRAVERSAL_DEPTH + 2);
    }
}
