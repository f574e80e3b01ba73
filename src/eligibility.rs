//! Per-abstract eligibility index.
//!
//! Evaluates the match scorer over every (abstract, reviewer) pair once
//! and retains only the pairs that clear the minimum-match threshold.
//! Everything downstream (solver, repair, reporting) reads scores from
//! this index; the scorer is never called again after the build.

use crate::config::AssignConfig;
use crate::records::{Abstract, ReviewerPool};
use crate::scoring::match_score;
use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Frozen index of eligible (abstract, reviewer) pairs.
///
/// Abstracts are addressed by their ordinal in the input slice, reviewers
/// by their pool index. Eligible lists are sorted by reviewer index, so
/// every downstream iteration order is deterministic.
#[derive(Debug, Clone)]
pub struct EligibilityIndex {
    /// Per abstract: eligible reviewer index → match score.
    scores: Vec<HashMap<usize, f64>>,
    /// Per abstract: eligible reviewer indices, ascending.
    eligible: Vec<Vec<usize>>,
    /// Per abstract: eligible ∩ experienced, ascending.
    eligible_experienced: Vec<Vec<usize>>,
    /// Per reviewer: experience at or above the threshold.
    experienced: Vec<bool>,
    /// Ordinals of abstracts with no eligible reviewer at all.
    pub no_eligible: Vec<usize>,
    /// Ordinals of abstracts with eligible reviewers but none experienced.
    pub no_experienced: Vec<usize>,
}

impl EligibilityIndex {
    /// Builds the index by scoring every pair.
    ///
    /// Structurally problematic abstracts (empty eligible set, or empty
    /// eligible-experienced subset) are flagged and logged; they cannot
    /// be satisfied by any later stage but must not abort the run.
    pub fn build(abstracts: &[Abstract], pool: &ReviewerPool, config: &AssignConfig) -> Self {
        let experienced: Vec<bool> = pool
            .iter()
            .map(|(_, r)| r.experience >= config.experience_threshold)
            .collect();

        let score_row = |abstract_: &Abstract| -> HashMap<usize, f64> {
            pool.iter()
                .filter_map(|(index, reviewer)| {
                    let score = match_score(abstract_, reviewer, config);
                    (score > config.min_match_score).then_some((index, score))
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        let scores: Vec<HashMap<usize, f64>> = abstracts.par_iter().map(score_row).collect();
        #[cfg(not(feature = "parallel"))]
        let scores: Vec<HashMap<usize, f64>> = abstracts.iter().map(score_row).collect();

        let mut eligible = Vec::with_capacity(abstracts.len());
        let mut eligible_experienced = Vec::with_capacity(abstracts.len());
        let mut no_eligible = Vec::new();
        let mut no_experienced = Vec::new();

        for (ordinal, row) in scores.iter().enumerate() {
            let mut indices: Vec<usize> = row.keys().copied().collect();
            indices.sort_unstable();
            let with_experience: Vec<usize> = indices
                .iter()
                .copied()
                .filter(|&r| experienced[r])
                .collect();

            if indices.is_empty() {
                no_eligible.push(ordinal);
                log::warn!(
                    "abstract {:?} has no eligible reviewers",
                    abstracts[ordinal].id
                );
            } else if with_experience.is_empty() {
                no_experienced.push(ordinal);
                log::warn!(
                    "abstract {:?} has no eligible experienced reviewers",
                    abstracts[ordinal].id
                );
            }

            eligible.push(indices);
            eligible_experienced.push(with_experience);
        }

        Self {
            scores,
            eligible,
            eligible_experienced,
            experienced,
            no_eligible,
            no_experienced,
        }
    }

    /// Match score for an eligible pair; `None` when the pair is not
    /// eligible.
    pub fn score(&self, abstract_ordinal: usize, reviewer: usize) -> Option<f64> {
        self.scores[abstract_ordinal].get(&reviewer).copied()
    }

    /// Eligible reviewers for an abstract, ascending by index.
    pub fn eligible(&self, abstract_ordinal: usize) -> &[usize] {
        &self.eligible[abstract_ordinal]
    }

    /// Eligible experienced reviewers for an abstract, ascending by index.
    pub fn eligible_experienced(&self, abstract_ordinal: usize) -> &[usize] {
        &self.eligible_experienced[abstract_ordinal]
    }

    pub fn is_experienced(&self, reviewer: usize) -> bool {
        self.experienced[reviewer]
    }

    pub fn n_abstracts(&self) -> usize {
        self.eligible.len()
    }

    pub fn n_reviewers(&self) -> usize {
        self.experienced.len()
    }

    /// Reviewers appearing in at least one eligible set, ascending.
    ///
    /// The solver's load band applies exactly to these reviewers.
    pub fn active_reviewers(&self) -> Vec<usize> {
        let mut active = vec![false; self.experienced.len()];
        for indices in &self.eligible {
            for &r in indices {
                active[r] = true;
            }
        }
        active
            .iter()
            .enumerate()
            .filter_map(|(r, &a)| a.then_some(r))
            .collect()
    }
}
