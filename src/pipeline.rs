//! End-to-end batch pipeline.
//!
//! Scorer → index → solver → repair → reporting, strictly in sequence.
//! The run always completes: structural infeasibility, solver timeouts,
//! and leftover violations surface in the statistics report rather than
//! as errors. Only an unusable configuration or an empty record set
//! aborts.

use crate::config::AssignConfig;
use crate::eligibility::EligibilityIndex;
use crate::error::AssignError;
use crate::records::{Abstract, Assignment, Reviewer, ReviewerPool};
use crate::repair::{RepairEngine, Residuals};
use crate::report::{AssignmentReport, Statistics};
use crate::solver::{AssignmentModel, GreedySwapSolver, IpSolver, SolverConfig, SolverStatus};

/// Everything a run produces.
#[derive(Debug)]
pub struct RunOutput {
    /// The repaired assignment.
    pub assignment: Assignment,
    /// Per-abstract report for the document generator.
    pub report: AssignmentReport,
    /// Load, score, and residual statistics.
    pub statistics: Statistics,
    /// Status the solver returned before repair.
    pub solver_status: SolverStatus,
    /// Post-repair invariant violations.
    pub residuals: Residuals,
    /// Total match score of the solver's selection.
    pub objective_value: f64,
}

/// One-shot assignment pipeline.
///
/// # Examples
///
/// ```ignore
/// let output = Pipeline::new(AssignConfig::default())
///     .run(abstracts, reviewers)?;
/// println!("{}", output.report.to_json()?);
/// ```
pub struct Pipeline {
    config: AssignConfig,
    solver: Box<dyn IpSolver>,
}

impl Pipeline {
    /// Creates a pipeline with the built-in solver backend.
    pub fn new(config: AssignConfig) -> Self {
        Self {
            config,
            solver: Box::new(GreedySwapSolver::new()),
        }
    }

    /// Replaces the solver backend.
    pub fn with_solver<S: IpSolver + 'static>(mut self, solver: S) -> Self {
        self.solver = Box::new(solver);
        self
    }

    /// Runs the full pipeline over in-memory records.
    ///
    /// Invalid records are skipped with a warning; the run aborts only
    /// when the configuration is unusable or no valid records remain.
    pub fn run(
        &self,
        abstracts: Vec<Abstract>,
        reviewers: Vec<Reviewer>,
    ) -> Result<RunOutput, AssignError> {
        self.config
            .validate()
            .map_err(AssignError::InvalidConfig)?;

        let abstracts = screen(abstracts, "abstract", |a| {
            a.validate().map_err(|reason| (a.id.clone(), reason))
        });
        let reviewers = screen(reviewers, "reviewer", |r| {
            r.validate()
                .map_err(|reason| (format!("{} {}", r.first_name, r.last_name), reason))
        });
        if abstracts.is_empty() {
            return Err(AssignError::NoAbstracts);
        }
        if reviewers.is_empty() {
            return Err(AssignError::NoReviewers);
        }

        let pool = ReviewerPool::new(reviewers);
        log::info!(
            "scoring {} abstracts against {} reviewers",
            abstracts.len(),
            pool.len()
        );
        let index = EligibilityIndex::build(&abstracts, &pool, &self.config);

        let ids: Vec<String> = abstracts.iter().map(|a| a.id.clone()).collect();
        let model = AssignmentModel::from_index(ids.clone(), &index, &self.config);
        log::info!(
            "solving: {} decision variables over {} abstracts",
            model.var_count(),
            model.abstract_count()
        );

        let solver_config = SolverConfig::default()
            .with_time_limit_ms(self.config.time_limit_ms)
            .with_num_workers(self.config.num_workers);
        let solution = self.solver.solve(&model, &solver_config);
        match solution.status {
            SolverStatus::Optimal => {
                log::info!(
                    "solver: optimal, objective {:.2} in {} ms",
                    solution.objective_value,
                    solution.solve_time_ms
                );
            }
            SolverStatus::Feasible => {
                log::warn!(
                    "solver: feasible but not proven optimal, objective {:.2}",
                    solution.objective_value
                );
            }
            SolverStatus::Infeasible | SolverStatus::ModelInvalid => {
                log::warn!(
                    "solver: no complete solution ({:?}); repair will finish the assignment",
                    solution.status
                );
            }
        }

        let mut assignment = solution.assignment;
        let engine = RepairEngine::new(&index, &ids, &self.config);
        let residuals = engine.repair(&mut assignment);

        let report = AssignmentReport::build(&abstracts, &pool, &index, &assignment);
        let statistics = Statistics::build(
            &abstracts,
            &pool,
            &index,
            &assignment,
            residuals,
            solution.status,
        );

        Ok(RunOutput {
            assignment,
            report,
            statistics,
            solver_status: solution.status,
            residuals,
            objective_value: solution.objective_value,
        })
    }
}

/// Keeps valid records, logging a warning per rejected one.
fn screen<T>(
    records: Vec<T>,
    kind: &str,
    validate: impl Fn(&T) -> Result<(), (String, String)>,
) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| match validate(record) {
            Ok(()) => true,
            Err((id, reason)) => {
                log::warn!("skipping {kind} {id:?}: {reason}");
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn abstract_record(id: &str, authors: &[&str], points: f64, focus: &str) -> Abstract {
        Abstract {
            id: id.into(),
            title: format!("Abstract {id}"),
            authors: authors.iter().map(|s| s.to_string()).collect(),
            category_scores: HashMap::from([("ai".to_string(), points)]),
            focus_topic: focus.into(),
        }
    }

    fn reviewer_record(first: &str, last: &str, experience: u32, focus: &[&str]) -> Reviewer {
        Reviewer {
            first_name: first.into(),
            last_name: last.into(),
            categories: vec!["ai".into()],
            focus_topics: focus.iter().map(|s| s.to_string()).collect(),
            experience,
        }
    }

    fn small_config() -> AssignConfig {
        AssignConfig::default()
            .with_reviewers_per_abstract(2)
            .with_min_abstracts_per_reviewer(0)
            .with_max_abstracts_per_reviewer(3)
    }

    #[test]
    fn test_end_to_end_well_posed() {
        let abstracts = vec![
            abstract_record("1", &["J. Lee"], 8.0, "x"),
            abstract_record("2", &[], 6.0, "y"),
        ];
        let reviewers = vec![
            reviewer_record("Ada", "Ng", 12, &["x"]),
            reviewer_record("Bo", "Li", 4, &[]),
            reviewer_record("Cy", "Wu", 15, &["y"]),
        ];

        let output = Pipeline::new(small_config())
            .run(abstracts, reviewers)
            .expect("run");

        assert!(output.solver_status.is_solution_found());
        assert!(output.residuals.is_clean());
        for entry in &output.report.assignments {
            assert_eq!(entry.assigned_reviewers.len(), 2);
            assert!(entry.assigned_reviewers.iter().any(|r| r.experienced));
        }
    }

    #[test]
    fn test_coi_reviewer_never_assigned() {
        let abstracts = vec![abstract_record("1", &["J. Lee"], 8.0, "")];
        let reviewers = vec![
            reviewer_record("Jin", "Lee", 20, &[]), // COI with the author
            reviewer_record("Ada", "Ng", 12, &[]),
            reviewer_record("Bo", "Li", 11, &[]),
        ];

        let output = Pipeline::new(small_config())
            .run(abstracts, reviewers)
            .expect("run");

        assert!(!output.assignment.contains("1", 0));
        assert_eq!(output.assignment.reviewers_of("1").len(), 2);
    }

    #[test]
    fn test_default_band_infeasible_then_repaired() {
        // With the default load band (min 10) a small instance is
        // structurally infeasible for the exact program; repair still
        // produces a full assignment.
        let abstracts = vec![
            abstract_record("1", &[], 8.0, ""),
            abstract_record("2", &[], 7.0, ""),
        ];
        let reviewers = vec![
            reviewer_record("Ada", "Ng", 12, &[]),
            reviewer_record("Bo", "Li", 4, &[]),
            reviewer_record("Cy", "Wu", 15, &[]),
        ];

        let output = Pipeline::new(AssignConfig::default().with_reviewers_per_abstract(2))
            .run(abstracts, reviewers)
            .expect("run");

        assert_eq!(output.solver_status, SolverStatus::Infeasible);
        assert!(output.residuals.is_clean());
        for id in ["1", "2"] {
            assert_eq!(output.assignment.reviewers_of(id).len(), 2);
        }
    }

    #[test]
    fn test_unsatisfiable_abstract_is_reported_not_fatal() {
        // Abstract "2" matches nobody: flagged, reported, never a crash.
        let abstracts = vec![
            abstract_record("1", &[], 8.0, ""),
            Abstract {
                id: "2".into(),
                title: "Unmatchable".into(),
                authors: vec![],
                category_scores: HashMap::from([("obscure".to_string(), 9.0)]),
                focus_topic: String::new(),
            },
        ];
        let reviewers = vec![
            reviewer_record("Ada", "Ng", 12, &[]),
            reviewer_record("Bo", "Li", 11, &[]),
        ];

        let output = Pipeline::new(small_config())
            .run(abstracts, reviewers)
            .expect("run");

        assert!(output.assignment.reviewers_of("2").is_empty());
        assert_eq!(output.residuals.incomplete, 1);
        assert!(output.statistics.to_json().expect("json").contains("incomplete"));
    }

    #[test]
    fn test_invalid_records_skipped() {
        let mut bad = abstract_record("3", &[], 8.0, "");
        bad.category_scores.insert("ai".into(), 99.0);
        let abstracts = vec![abstract_record("1", &[], 8.0, ""), bad];
        let reviewers = vec![
            reviewer_record("Ada", "Ng", 12, &[]),
            reviewer_record("Bo", "", 11, &[]), // empty last name
            reviewer_record("Cy", "Wu", 11, &[]),
        ];

        let output = Pipeline::new(small_config())
            .run(abstracts, reviewers)
            .expect("run");

        // The malformed abstract and reviewer are gone entirely.
        assert_eq!(output.report.assignments.len(), 1);
        assert_eq!(
            output.statistics.assigned_reviewers.len()
                + output.statistics.idle_reviewers.len(),
            2
        );
    }

    #[test]
    fn test_empty_inputs_are_errors() {
        let result = Pipeline::new(small_config()).run(vec![], vec![]);
        assert!(matches!(result, Err(AssignError::NoAbstracts)));

        let result = Pipeline::new(small_config())
            .run(vec![abstract_record("1", &[], 8.0, "")], vec![]);
        assert!(matches!(result, Err(AssignError::NoReviewers)));
    }

    #[test]
    fn test_bad_config_is_error() {
        let config = AssignConfig::default().with_reviewers_per_abstract(0);
        let result = Pipeline::new(config).run(
            vec![abstract_record("1", &[], 8.0, "")],
            vec![reviewer_record("Ada", "Ng", 12, &[])],
        );
        assert!(matches!(result, Err(AssignError::InvalidConfig(_))));
    }

    #[test]
    fn test_run_is_deterministic() {
        let abstracts = || {
            vec![
                abstract_record("1", &[], 8.0, "x"),
                abstract_record("2", &[], 6.0, "x"),
                abstract_record("3", &[], 7.0, "y"),
            ]
        };
        let reviewers = || {
            vec![
                reviewer_record("Ada", "Ng", 12, &["x"]),
                reviewer_record("Bo", "Li", 4, &[]),
                reviewer_record("Cy", "Wu", 15, &["y"]),
                reviewer_record("Di", "Ho", 11, &[]),
            ]
        };

        let pipeline = Pipeline::new(small_config());
        let first = pipeline.run(abstracts(), reviewers()).expect("run");
        let second = pipeline.run(abstracts(), reviewers()).expect("run");

        for id in ["1", "2", "3"] {
            assert_eq!(
                first.assignment.reviewers_of(id),
                second.assignment.reviewers_of(id)
            );
        }
    }
}
