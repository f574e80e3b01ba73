//! Aggregation and serialization of the final assignment.
//!
//! Produces the two artifacts consumed by the downstream document
//! generator: the per-abstract assignment report and the run
//! statistics. Both serialize to pretty JSON.

use crate::eligibility::EligibilityIndex;
use crate::error::AssignError;
use crate::records::{Abstract, Assignment, ReviewerPool};
use crate::repair::Residuals;
use crate::solver::SolverStatus;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One reviewer on one abstract, as reported downstream.
#[derive(Debug, Clone, Serialize)]
pub struct AssignedReviewer {
    /// `(first, last)` name pair.
    pub reviewer_name: (String, String),
    pub match_score: f64,
    pub experienced: bool,
}

/// All reviewers assigned to one abstract.
#[derive(Debug, Clone, Serialize)]
pub struct AbstractAssignment {
    pub abstract_id: String,
    pub title: String,
    pub assigned_reviewers: Vec<AssignedReviewer>,
}

/// Final assignment, ordered by abstract id.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentReport {
    pub assignments: Vec<AbstractAssignment>,
}

impl AssignmentReport {
    /// Builds the report from the repaired assignment.
    pub fn build(
        abstracts: &[Abstract],
        pool: &ReviewerPool,
        index: &EligibilityIndex,
        assignment: &Assignment,
    ) -> Self {
        let ordinal_of: HashMap<&str, usize> = abstracts
            .iter()
            .enumerate()
            .map(|(ordinal, a)| (a.id.as_str(), ordinal))
            .collect();

        let assignments = assignment
            .iter()
            .filter_map(|(id, assigned)| {
                let &ordinal = ordinal_of.get(id.as_str())?;
                let assigned_reviewers = assigned
                    .iter()
                    .map(|&r| AssignedReviewer {
                        reviewer_name: pool.get(r).name(),
                        match_score: index.score(ordinal, r).unwrap_or(0.0),
                        experienced: index.is_experienced(r),
                    })
                    .collect();
                Some(AbstractAssignment {
                    abstract_id: id.clone(),
                    title: abstracts[ordinal].title.clone(),
                    assigned_reviewers,
                })
            })
            .collect();

        Self { assignments }
    }

    pub fn to_json(&self) -> Result<String, AssignError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Min/mean/max over realized match scores.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub count: usize,
}

impl ScoreStats {
    /// `None` when no assignments were realized.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        Some(Self {
            min,
            mean,
            max,
            count: scores.len(),
        })
    }
}

/// An assigned reviewer's load over the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewerLoad {
    pub reviewer_name: (String, String),
    pub load: usize,
}

/// Run statistics: loads, idle reviewers, score distribution, and the
/// residual violations left after repair.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub solver_status: SolverStatus,
    pub assigned_reviewers: Vec<ReviewerLoad>,
    pub idle_reviewers: Vec<(String, String)>,
    /// Load value → number of reviewers carrying it (assigned only).
    pub load_histogram: BTreeMap<usize, usize>,
    pub score_stats: Option<ScoreStats>,
    pub residuals: Residuals,
}

impl Statistics {
    /// Aggregates statistics from the repaired assignment.
    pub fn build(
        abstracts: &[Abstract],
        pool: &ReviewerPool,
        index: &EligibilityIndex,
        assignment: &Assignment,
        residuals: Residuals,
        solver_status: SolverStatus,
    ) -> Self {
        let loads = assignment.loads(pool.len());

        let mut assigned_reviewers = Vec::new();
        let mut idle_reviewers = Vec::new();
        let mut load_histogram: BTreeMap<usize, usize> = BTreeMap::new();
        for (r, reviewer) in pool.iter() {
            if loads[r] > 0 {
                assigned_reviewers.push(ReviewerLoad {
                    reviewer_name: reviewer.name(),
                    load: loads[r],
                });
                *load_histogram.entry(loads[r]).or_insert(0) += 1;
            } else {
                idle_reviewers.push(reviewer.name());
            }
        }

        let ordinal_of: HashMap<&str, usize> = abstracts
            .iter()
            .enumerate()
            .map(|(ordinal, a)| (a.id.as_str(), ordinal))
            .collect();
        let scores: Vec<f64> = assignment
            .iter()
            .filter_map(|(id, assigned)| {
                let &ordinal = ordinal_of.get(id.as_str())?;
                Some(
                    assigned
                        .iter()
                        .map(move |&r| index.score(ordinal, r).unwrap_or(0.0))
                        .collect::<Vec<f64>>(),
                )
            })
            .flatten()
            .collect();

        Self {
            solver_status,
            assigned_reviewers,
            idle_reviewers,
            load_histogram,
            score_stats: ScoreStats::from_scores(&scores),
            residuals,
        }
    }

    pub fn to_json(&self) -> Result<String, AssignError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
