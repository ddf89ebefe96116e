//! Arena-backed control-flow graph.
//!
//! Blocks live in a single vector owned by the [`Cfg`]; edges live in a
//! second vector and are referenced from both endpoints by index. No
//! back-pointers, no reference cycles, cache-friendly traversal.

use facet_core::types::ast::{AstNode, SourceLocation};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Index of a block within its CFG's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Index of an edge within its CFG's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

/// Edge classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Normal,
    CondTrue,
    CondFalse,
    Exception,
    /// Back-edge from a loop body tail to its header.
    Loop,
    Break,
    Continue,
    Return,
}

impl EdgeKind {
    /// True for the two conditional-branch kinds.
    pub fn is_conditional(self) -> bool {
        matches!(self, Self::CondTrue | Self::CondFalse)
    }
}

/// A typed, directed edge between two blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: BlockId,
    pub to: BlockId,
    pub kind: EdgeKind,
}

/// A maximal straight-line statement sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    /// Human-readable label, e.g. `entry`, `if_merge_3`, `unreachable_7`.
    /// Dead-code classification keys on the `unreachable` sentinel.
    pub label: String,
    pub statements: Vec<AstNode>,
    pub successors: SmallVec<[EdgeId; 2]>,
    pub predecessors: SmallVec<[EdgeId; 2]>,
    pub is_entry: bool,
    pub is_exit: bool,
    /// Set when this block was created as the landing spot for
    /// statements following a jump: the block whose trailing jump
    /// orphaned it. Not a traversable edge.
    pub fallthrough_from: Option<BlockId>,
}

impl BasicBlock {
    /// The block's final statement, if any.
    pub fn last_statement(&self) -> Option<&AstNode> {
        self.statements.last()
    }
}

/// A control-flow graph for one function (or the module top level).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cfg {
    pub name: String,
    pub entry: BlockId,
    pub exit: BlockId,
    blocks: Vec<BasicBlock>,
    edges: Vec<Edge>,
    /// Location of the originating function node, when there is one.
    pub function_location: Option<SourceLocation>,
}

impl Cfg {
    /// Create a CFG with its entry and exit blocks pre-registered.
    pub fn new(name: impl Into<String>) -> Self {
        let mut cfg = Self {
            name: name.into(),
            entry: BlockId(0),
            exit: BlockId(1),
            blocks: Vec::new(),
            edges: Vec::new(),
            function_location: None,
        };
        let entry = cfg.add_block("entry");
        let exit = cfg.add_block("exit");
        cfg.entry = entry;
        cfg.exit = exit;
        cfg.blocks[entry.0 as usize].is_entry = true;
        cfg.blocks[exit.0 as usize].is_exit = true;
        cfg
    }

    /// Register a new empty block and return its id.
    pub fn add_block(&mut self, label: impl Into<String>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock {
            id,
            label: label.into(),
            statements: Vec::new(),
            successors: SmallVec::new(),
            predecessors: SmallVec::new(),
            is_entry: false,
            is_exit: false,
            fallthrough_from: None,
        });
        id
    }

    /// Add a typed edge and mirror it into both endpoints.
    pub fn connect(&mut self, from: BlockId, to: BlockId, kind: EdgeKind) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge { from, to, kind });
        self.blocks[from.0 as usize].successors.push(id);
        self.blocks[to.0 as usize].predecessors.push(id);
        id
    }

    /// True if an edge `from -> to` already exists, of any kind.
    pub fn has_edge(&self, from: BlockId, to: BlockId) -> bool {
        self.blocks[from.0 as usize]
            .successors
            .iter()
            .any(|&e| self.edges[e.0 as usize].to == to)
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0 as usize]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.0 as usize]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0 as usize]
    }

    /// Blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter()
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of a block, in creation order.
    pub fn successors(&self, id: BlockId) -> impl Iterator<Item = &Edge> {
        self.blocks[id.0 as usize]
            .successors
            .iter()
            .map(move |&e| &self.edges[e.0 as usize])
    }

    /// Incoming edges of a block, in creation order.
    pub fn predecessors(&self, id: BlockId) -> impl Iterator<Item = &Edge> {
        self.blocks[id.0 as usize]
            .predecessors
            .iter()
            .map(move |&e| &self.edges[e.0 as usize])
    }

    /// Append a statement to a block.
    pub fn push_statement(&mut self, id: BlockId, stmt: AstNode) {
        self.blocks[id.0 as usize].statements.push(stmt);
    }

    /// True if the block ends in a statement that transfers control away
    /// (return/break/continue/throw).
    pub fn ends_in_jump(&self, id: BlockId) -> bool {
        self.block(id)
            .last_statement()
            .map(|s| s.kind.is_jump())
            .unwrap_or(false)
    }
}
