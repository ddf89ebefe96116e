//! Clone detection: fragment extraction, pair generation, and
//! classification.

use facet_core::cancel::CancelToken;
use facet_core::config::{CloneConfig, ComplexityConfig};
use facet_core::errors::AnalysisError;
use facet_core::types::ast::AstNode;
use rayon::prelude::*;

use crate::cfg::builder::CfgBuilder;
use crate::cfg::complexity;

use super::apted;
use super::cost::CloneCostModel;
use super::lsh;
use super::tree::LabeledTree;
use super::types::{ClonePair, CloneType, Fragment, FragmentInfo};

/// Detects clone pairs among extracted AST fragments.
#[derive(Debug, Default)]
pub struct CloneDetector {
    config: CloneConfig,
}

impl CloneDetector {
    pub fn new(config: CloneConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Extract candidate fragments: function/class/loop/if/try subtrees
    /// meeting the line and node-count floors. Fragments come out in
    /// location order.
    pub fn extract_fragments(&self, ast: &AstNode) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        ast.walk(&mut |node| {
            if node.kind.is_fragment_root() {
                let line_count = node.line_count();
                let node_count = node.subtree_size();
                if line_count >= self.config.min_lines && node_count >= self.config.min_nodes {
                    fragments.push(Fragment {
                        info: FragmentInfo {
                            location: node.location.clone(),
                            kind: node.kind.as_str().to_string(),
                            name: node.name.clone(),
                            line_count,
                            node_count,
                            complexity: fragment_complexity(node),
                        },
                        tree: LabeledTree::from_ast(node),
                    });
                }
            }
            true
        });
        fragments.sort_by(|a, b| a.info.sort_key().cmp(&b.info.sort_key()));
        fragments
    }

    /// Compare fragments pairwise and keep everything at or above the
    /// Type-4 threshold. Cancellation is polled per batch.
    pub fn detect_pairs(
        &self,
        fragments: &[Fragment],
        cancel: &CancelToken,
    ) -> Result<Vec<ClonePair>, AnalysisError> {
        let candidates = self.candidate_indices(fragments);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let batch_size = if fragments.len() > self.config.batch_size_threshold {
            self.config.batch_size_small
        } else {
            self.config.batch_size_large
        }
        .max(1);

        let costs = CloneCostModel::from_config(&self.config);
        let batches: Result<Vec<Vec<ClonePair>>, AnalysisError> = candidates
            .par_chunks(batch_size)
            .map(|batch| {
                if cancel.is_cancelled() {
                    return Err(AnalysisError::cancelled("clone pair comparison"));
                }
                let mut out = Vec::new();
                for &(i, j) in batch {
                    let similarity =
                        apted::similarity(&fragments[i].tree, &fragments[j].tree, &costs);
                    if let Some(clone_type) = self.classify(similarity) {
                        let f1 = fragments[i].info.clone();
                        let f2 = fragments[j].info.clone();
                        out.push(ClonePair {
                            confidence: self.confidence(similarity, &f1, &f2),
                            fragment1: f1,
                            fragment2: f2,
                            similarity,
                            clone_type,
                        });
                    }
                }
                Ok(out)
            })
            .collect();

        let mut pairs: Vec<ClonePair> = batches?.into_iter().flatten().collect();
        pairs.sort_by(|a, b| {
            (a.fragment1.sort_key(), a.fragment2.sort_key())
                .cmp(&(b.fragment1.sort_key(), b.fragment2.sort_key()))
        });
        Ok(pairs)
    }

    /// Pair similarity to clone type, most exact first.
    pub fn classify(&self, similarity: f64) -> Option<CloneType> {
        if similarity >= self.config.type1_threshold {
            Some(CloneType::Type1)
        } else if similarity >= self.config.type2_threshold {
            Some(CloneType::Type2)
        } else if similarity >= self.config.type3_threshold {
            Some(CloneType::Type3)
        } else if similarity >= self.config.type4_threshold {
            Some(CloneType::Type4)
        } else {
            None
        }
    }

    /// Ordered candidate index pairs after the LSH prefilter (when
    /// enabled) and the size-ratio prune.
    fn candidate_indices(&self, fragments: &[Fragment]) -> Vec<(usize, usize)> {
        let mut candidates = Vec::new();
        if self.config.use_lsh {
            let mut filtered: Vec<(usize, usize)> =
                lsh::candidate_pairs(fragments).into_iter().collect();
            filtered.sort_unstable();
            for (i, j) in filtered {
                if !self.prunable(&fragments[i].info, &fragments[j].info) {
                    candidates.push((i, j));
                }
            }
        } else {
            for i in 0..fragments.len() {
                for j in (i + 1)..fragments.len() {
                    if !self.prunable(&fragments[i].info, &fragments[j].info) {
                        candidates.push((i, j));
                    }
                }
            }
        }
        candidates
    }

    fn prunable(&self, a: &FragmentInfo, b: &FragmentInfo) -> bool {
        // Same-file overlapping ranges are nested fragments (a loop
        // inside its own function); comparing them is self-similarity.
        if a.location.file == b.location.file
            && a.location.start_line <= b.location.end_line
            && b.location.start_line <= a.location.end_line
        {
            return true;
        }

        let small = a.node_count.min(b.node_count) as f64;
        let large = a.node_count.max(b.node_count) as f64;
        if small < (1.0 - self.config.size_ratio) * large {
            return true;
        }

        let short = a.line_count.min(b.line_count);
        let long = a.line_count.max(b.line_count);
        if long - short > self.config.line_diff_tolerance
            && (short as f64) < (1.0 - self.config.size_ratio) * (long as f64)
        {
            return true;
        }
        false
    }

    /// Confidence: the similarity, nudged up for larger fragments and
    /// for matching complexity, never past 1.0.
    fn confidence(&self, similarity: f64, a: &FragmentInfo, b: &FragmentInfo) -> f64 {
        let size_bonus = (a.node_count.min(b.node_count) as f64 / 500.0).min(0.05);
        let complexity_bonus = match (a.complexity, b.complexity) {
            (Some(x), Some(y)) if x == y => 0.05,
            (Some(x), Some(y)) if x.abs_diff(y) <= 2 => 0.025,
            _ => 0.0,
        };
        (similarity + size_bonus + complexity_bonus).min(1.0)
    }
}

/// Cyclomatic complexity for function fragments; other fragment kinds
/// carry none.
fn fragment_complexity(node: &AstNode) -> Option<u32> {
    if !node.kind.is_function() {
        return None;
    }
    let cfg = CfgBuilder::new().build(node).ok()?;
    Some(complexity::calculate(&cfg, Some(node), &ComplexityConfig::default()).complexity)
}
