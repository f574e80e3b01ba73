//! Integer-program model for the assignment problem.

use crate::config::AssignConfig;
use crate::eligibility::EligibilityIndex;

/// Sparse binary integer program over eligible (abstract, reviewer)
/// pairs.
///
/// One implicit binary decision variable exists per candidate pair —
/// never over the full Cartesian product. The objective maximizes the
/// total match score of selected pairs subject to:
///
/// - **Coverage**: every abstract with a non-empty candidate list gets
///   exactly `target` reviewers.
/// - **Load band**: every reviewer in [`active_reviewers`] carries
///   between `load_min` and `load_max` assignments inclusive.
/// - **Experience coverage**: every abstract with a non-empty
///   experienced candidate list gets at least one experienced reviewer.
///
/// [`active_reviewers`]: AssignmentModel::active_reviewers
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    /// Abstract ids, ordinal order matching the candidate lists.
    pub abstract_ids: Vec<String>,
    /// Per abstract: `(reviewer index, match score)` candidates,
    /// ascending by reviewer index.
    pub candidates: Vec<Vec<(usize, f64)>>,
    /// Per abstract: experienced candidate reviewer indices, ascending.
    pub experienced_candidates: Vec<Vec<usize>>,
    /// Reviewers appearing in at least one candidate list; the load
    /// band applies exactly to these.
    pub active_reviewers: Vec<usize>,
    /// Total number of reviewers in the pool.
    pub n_reviewers: usize,
    /// Exact reviewers per abstract.
    pub target: usize,
    /// Lower bound of the load band.
    pub load_min: usize,
    /// Upper bound of the load band.
    pub load_max: usize,
}

impl AssignmentModel {
    /// Builds the model from a built eligibility index.
    pub fn from_index(
        abstract_ids: Vec<String>,
        index: &EligibilityIndex,
        config: &AssignConfig,
    ) -> Self {
        let candidates: Vec<Vec<(usize, f64)>> = (0..index.n_abstracts())
            .map(|a| {
                index
                    .eligible(a)
                    .iter()
                    .map(|&r| {
                        let score = index.score(a, r).unwrap_or(0.0);
                        (r, score)
                    })
                    .collect()
            })
            .collect();
        let experienced_candidates: Vec<Vec<usize>> = (0..index.n_abstracts())
            .map(|a| index.eligible_experienced(a).to_vec())
            .collect();

        Self {
            abstract_ids,
            candidates,
            experienced_candidates,
            active_reviewers: index.active_reviewers(),
            n_reviewers: index.n_reviewers(),
            target: config.reviewers_per_abstract,
            load_min: config.min_abstracts_per_reviewer,
            load_max: config.max_abstracts_per_reviewer,
        }
    }

    /// Total number of decision variables (candidate pairs).
    pub fn var_count(&self) -> usize {
        self.candidates.iter().map(Vec::len).sum()
    }

    /// Number of abstracts.
    pub fn abstract_count(&self) -> usize {
        self.abstract_ids.len()
    }

    /// Validates internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.abstract_ids.len() != self.candidates.len()
            || self.abstract_ids.len() != self.experienced_candidates.len()
        {
            return Err("candidate lists do not match abstract ids".into());
        }
        if self.target == 0 {
            return Err("target reviewers per abstract must be at least 1".into());
        }
        if self.load_min > self.load_max {
            return Err(format!(
                "load band is empty: min {} > max {}",
                self.load_min, self.load_max
            ));
        }
        for (ordinal, row) in self.candidates.iter().enumerate() {
            for &(reviewer, score) in row {
                if reviewer >= self.n_reviewers {
                    return Err(format!(
                        "abstract {:?}: reviewer index {reviewer} out of range",
                        self.abstract_ids[ordinal]
                    ));
                }
                if !score.is_finite() || score < 0.0 {
                    return Err(format!(
                        "abstract {:?}: invalid score {score} for reviewer {reviewer}",
                        self.abstract_ids[ordinal]
                    ));
                }
            }
            for &reviewer in &self.experienced_candidates[ordinal] {
                if !row.iter().any(|&(r, _)| r == reviewer) {
                    return Err(format!(
                        "abstract {:?}: experienced candidate {reviewer} is not a candidate",
                        self.abstract_ids[ordinal]
                    ));
                }
            }
        }
        Ok(())
    }

    /// Objective upper bound ignoring load constraints: the sum, per
    /// abstract, of its `target` highest candidate scores.
    ///
    /// A feasible solution matching this bound is provably optimal.
    pub fn objective_upper_bound(&self) -> f64 {
        self.candidates
            .iter()
            .map(|row| {
                let mut scores: Vec<f64> = row.iter().map(|&(_, s)| s).collect();
                scores.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
                scores.iter().take(self.target).sum::<f64>()
            })
            .sum()
    }

    /// Candidate score lookup.
    pub fn score(&self, abstract_ordinal: usize, reviewer: usize) -> Option<f64> {
        self.candidates[abstract_ordinal]
            .iter()
            .find(|&&(r, _)| r == reviewer)
            .map(|&(_, s)| s)
    }

    /// Whether `reviewer` is an experienced candidate for the abstract.
    pub fn is_experienced_candidate(&self, abstract_ordinal: usize, reviewer: usize) -> bool {
        self.experienced_candidates[abstract_ordinal].contains(&reviewer)
    }
}
