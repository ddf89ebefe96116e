//! Hash collections used across the workspace.
//!
//! FxHash is not DoS-resistant, which is fine here: keys are module
//! paths and node labels from the analyzed tree, never attacker input.

pub use rustc_hash::{FxHashMap, FxHashSet};
