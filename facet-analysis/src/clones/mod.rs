//! Clone detection: labeled-tree conversion, tree edit distance with a
//! language-aware cost model, pair detection, and grouping strategies.

pub mod apted;
pub mod cost;
pub mod detector;
pub mod grouping;
pub mod lsh;
pub mod tree;
pub mod types;

pub use detector::CloneDetector;
pub use grouping::group;
pub use types::{ClonePair, CloneType, Fragment, FragmentInfo};
