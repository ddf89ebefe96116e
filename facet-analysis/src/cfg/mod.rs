//! Control-flow graphs: construction, reachability, dead code, complexity.

pub mod builder;
pub mod complexity;
pub mod dead_code;
pub mod reachability;
pub mod types;

pub use builder::CfgBuilder;
pub use types::{BasicBlock, BlockId, Cfg, Edge, EdgeId, EdgeKind};
