//! Solver interface and the built-in deterministic backend.

use super::model::AssignmentModel;
use crate::records::Assignment;
use std::time::Instant;

const EPS: f64 = 1e-9;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No solution satisfying every constraint was found; the returned
    /// assignment may be empty or partial and is completed downstream.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
}

impl SolverStatus {
    /// Whether a constraint-satisfying solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: u64,
    /// Worker-thread hint for backends that parallelize internally.
    ///
    /// The built-in [`GreedySwapSolver`] is single-threaded and ignores
    /// it.
    pub num_workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 600_000,
            num_workers: 4,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }
}

/// Outcome of a solver run: a tagged status plus the variable
/// assignment it stands for.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solver status.
    pub status: SolverStatus,
    /// Total match score of the selected pairs.
    pub objective_value: f64,
    /// Reviewer indices per abstract id. Present for every abstract in
    /// the model, possibly short or empty.
    pub assignment: Assignment,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
}

impl Solution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: 0.0,
            assignment: Assignment::new(),
            solve_time_ms: 0,
        }
    }
}

/// Trait for integer-program solver backends.
///
/// Implementors provide the actual optimization logic. This is the seam
/// where an external MIP solver (CBC, HiGHS, CP-SAT) would plug in; the
/// built-in [`GreedySwapSolver`] provides a dependency-free
/// deterministic backend.
pub trait IpSolver {
    /// Solves the model and returns a solution, blocking for at most
    /// (approximately) the configured time budget.
    fn solve(&self, model: &AssignmentModel, config: &SolverConfig) -> Solution;
}

/// Built-in deterministic backend.
///
/// Greedy construction per abstract (best experienced candidate first
/// where required, then best remaining by score), a load-band
/// redistribution pass, and time-budgeted steepest-ascent swap
/// improvement. Ties always break toward the lower reviewer index.
///
/// Optimality is claimed only when the objective reaches the
/// per-abstract top-k upper bound, which proves no better selection
/// exists. Structural impossibilities (an abstract with fewer
/// candidates than the target, or a load-band lower bound exceeding
/// total capacity) yield [`SolverStatus::Infeasible`] together with the
/// best partial assignment found.
pub struct GreedySwapSolver;

impl GreedySwapSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GreedySwapSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether replacing `out` with `inn` in `slot` keeps the abstract's
/// experience coverage.
fn keeps_experience(
    model: &AssignmentModel,
    abstract_ordinal: usize,
    slot: &[usize],
    out: usize,
    inn: usize,
) -> bool {
    if model.experienced_candidates[abstract_ordinal].is_empty() {
        return true;
    }
    model.is_experienced_candidate(abstract_ordinal, inn)
        || slot
            .iter()
            .any(|&r| r != out && model.is_experienced_candidate(abstract_ordinal, r))
}

/// Candidates of one abstract ordered best-first: score descending,
/// reviewer index ascending on ties.
fn ranked_candidates(model: &AssignmentModel, abstract_ordinal: usize) -> Vec<(usize, f64)> {
    let mut ranked = model.candidates[abstract_ordinal].clone();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    ranked
}

impl GreedySwapSolver {
    /// Greedy construction: per abstract, the best experienced candidate
    /// under the load cap (when experience coverage applies), then the
    /// best remaining candidates under the cap.
    fn construct(&self, model: &AssignmentModel, loads: &mut [usize]) -> Vec<Vec<usize>> {
        let mut chosen: Vec<Vec<usize>> = Vec::with_capacity(model.abstract_count());

        for a in 0..model.abstract_count() {
            let ranked = ranked_candidates(model, a);
            let mut slot: Vec<usize> = Vec::with_capacity(model.target);

            if !model.experienced_candidates[a].is_empty() {
                if let Some(&(r, _)) = ranked.iter().find(|&&(r, _)| {
                    model.is_experienced_candidate(a, r) && loads[r] < model.load_max
                }) {
                    slot.push(r);
                    loads[r] += 1;
                }
            }

            for &(r, _) in &ranked {
                if slot.len() == model.target {
                    break;
                }
                if !slot.contains(&r) && loads[r] < model.load_max {
                    slot.push(r);
                    loads[r] += 1;
                }
            }

            chosen.push(slot);
        }

        chosen
    }

    /// Load-band redistribution: moves assignments toward reviewers
    /// below the lower load bound, stealing only from donors that stay
    /// at or above the bound and never breaking experience coverage.
    fn raise_min_loads(&self, model: &AssignmentModel, chosen: &mut [Vec<usize>], loads: &mut [usize]) {
        if model.load_min == 0 {
            return;
        }

        for &r in &model.active_reviewers {
            if loads[r] >= model.load_min {
                continue;
            }

            // Abstracts where r is a candidate, best score first.
            let mut options: Vec<(usize, f64)> = (0..model.abstract_count())
                .filter_map(|a| model.score(a, r).map(|s| (a, s)))
                .collect();
            options.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });

            for (a, _) in options {
                if loads[r] >= model.load_min {
                    break;
                }
                if chosen[a].contains(&r) || loads[r] >= model.load_max {
                    continue;
                }

                if chosen[a].len() < model.target {
                    chosen[a].push(r);
                    loads[r] += 1;
                    continue;
                }

                // Donor: lowest-scoring assigned reviewer whose removal
                // keeps its own load in band and the slot's experience
                // coverage intact.
                let donor = chosen[a]
                    .iter()
                    .copied()
                    .filter(|&d| loads[d] > model.load_min)
                    .filter(|&d| keeps_experience(model, a, &chosen[a], d, r))
                    .min_by(|&x, &y| {
                        let sx = model.score(a, x).unwrap_or(0.0);
                        let sy = model.score(a, y).unwrap_or(0.0);
                        sx.partial_cmp(&sy)
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then(x.cmp(&y))
                    });

                if let Some(d) = donor {
                    let position = chosen[a].iter().position(|&x| x == d);
                    if let Some(position) = position {
                        chosen[a][position] = r;
                        loads[d] -= 1;
                        loads[r] += 1;
                    }
                }
            }
        }
    }

    /// Steepest-ascent swap improvement under the time budget.
    fn improve(
        &self,
        model: &AssignmentModel,
        chosen: &mut [Vec<usize>],
        loads: &mut [usize],
        started: Instant,
        time_limit_ms: u64,
    ) {
        loop {
            let mut improved = false;

            for a in 0..model.abstract_count() {
                if started.elapsed().as_millis() as u64 >= time_limit_ms {
                    return;
                }

                let ranked = ranked_candidates(model, a);
                let assigned: Vec<usize> = chosen[a].clone();

                for out in assigned {
                    let out_score = model.score(a, out).unwrap_or(0.0);
                    // Removal must not drop the donor below the band.
                    if loads[out] <= model.load_min {
                        continue;
                    }

                    let replacement = ranked.iter().copied().find(|&(inn, score)| {
                        score > out_score + EPS
                            && !chosen[a].contains(&inn)
                            && loads[inn] < model.load_max
                            && keeps_experience(model, a, &chosen[a], out, inn)
                    });

                    if let Some((inn, _)) = replacement {
                        let position = chosen[a].iter().position(|&x| x == out);
                        if let Some(position) = position {
                            chosen[a][position] = inn;
                            loads[out] -= 1;
                            loads[inn] += 1;
                            improved = true;
                        }
                    }
                }
            }

            if !improved {
                return;
            }
        }
    }

    /// Checks the full constraint set against a candidate selection.
    fn is_feasible(&self, model: &AssignmentModel, chosen: &[Vec<usize>], loads: &[usize]) -> bool {
        for a in 0..model.abstract_count() {
            if !model.candidates[a].is_empty() && chosen[a].len() != model.target {
                return false;
            }
            if !model.experienced_candidates[a].is_empty()
                && !chosen[a]
                    .iter()
                    .any(|&r| model.is_experienced_candidate(a, r))
            {
                return false;
            }
        }
        model
            .active_reviewers
            .iter()
            .all(|&r| (model.load_min..=model.load_max).contains(&loads[r]))
    }
}

impl IpSolver for GreedySwapSolver {
    fn solve(&self, model: &AssignmentModel, config: &SolverConfig) -> Solution {
        if model.validate().is_err() {
            return Solution::empty(SolverStatus::ModelInvalid);
        }

        let started = Instant::now();

        // Structural impossibilities the exact formulation would reject.
        let covered = model
            .candidates
            .iter()
            .filter(|row| !row.is_empty())
            .count();
        let short_coverage = model
            .candidates
            .iter()
            .any(|row| !row.is_empty() && row.len() < model.target);
        let band_overcommitted =
            model.load_min * model.active_reviewers.len() > model.target * covered;

        let mut loads = vec![0usize; model.n_reviewers];
        let mut chosen = self.construct(model, &mut loads);
        self.raise_min_loads(model, &mut chosen, &mut loads);
        self.improve(model, &mut chosen, &mut loads, started, config.time_limit_ms);

        let objective_value: f64 = chosen
            .iter()
            .enumerate()
            .flat_map(|(a, slot)| slot.iter().map(move |&r| (a, r)))
            .map(|(a, r)| model.score(a, r).unwrap_or(0.0))
            .sum();

        let feasible =
            !short_coverage && !band_overcommitted && self.is_feasible(model, &chosen, &loads);

        let status = if !feasible {
            SolverStatus::Infeasible
        } else if objective_value >= model.objective_upper_bound() - 1e-6 {
            SolverStatus::Optimal
        } else {
            SolverStatus::Feasible
        };

        let mut assignment = Assignment::new();
        for (a, slot) in chosen.iter().enumerate() {
            let mut slot = slot.clone();
            slot.sort_unstable();
            *assignment.slot_mut(&model.abstract_ids[a]) = slot;
        }

        Solution {
            status,
            objective_value,
            assignment,
            solve_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(model: &AssignmentModel) -> Solution {
        GreedySwapSolver::new().solve(model, &SolverConfig::default())
    }

    fn base_model() -> AssignmentModel {
        AssignmentModel {
            abstract_ids: vec!["1".into(), "2".into()],
            candidates: vec![
                vec![(0, 20.0), (1, 30.0), (2, 15.0)],
                vec![(0, 18.0), (1, 40.0), (2, 25.0)],
            ],
            experienced_candidates: vec![vec![1], vec![1]],
            active_reviewers: vec![0, 1, 2],
            n_reviewers: 3,
            target: 2,
            load_min: 0,
            load_max: 2,
        }
    }

    #[test]
    fn test_optimal_when_unconstrained() {
        let solution = solve(&base_model());
        assert_eq!(solution.status, SolverStatus::Optimal);
        // Top-2 per abstract: (30 + 20) + (40 + 25) = 115.
        assert!((solution.objective_value - 115.0).abs() < 1e-9);
        assert_eq!(solution.assignment.reviewers_of("1"), &[0, 1]);
        assert_eq!(solution.assignment.reviewers_of("2"), &[1, 2]);
    }

    #[test]
    fn test_load_cap_forces_feasible_not_optimal() {
        // Reviewer 1 is best for both abstracts but can take only one.
        let model = AssignmentModel {
            abstract_ids: vec!["1".into(), "2".into()],
            candidates: vec![
                vec![(0, 20.0), (1, 30.0), (3, 5.0)],
                vec![(1, 40.0), (2, 25.0), (3, 6.0)],
            ],
            experienced_candidates: vec![vec![1, 3], vec![1, 3]],
            active_reviewers: vec![0, 1, 2, 3],
            n_reviewers: 4,
            target: 2,
            load_min: 0,
            load_max: 1,
        };
        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert!(solution.objective_value < model.objective_upper_bound());

        let loads = solution.assignment.loads(4);
        assert!(loads.iter().all(|&l| l <= 1));
        for id in ["1", "2"] {
            assert_eq!(solution.assignment.reviewers_of(id).len(), 2);
        }
    }

    #[test]
    fn test_short_coverage_is_infeasible_with_partial_assignment() {
        let mut model = base_model();
        model.target = 3;
        model.candidates[1] = vec![(1, 40.0), (2, 25.0)];
        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Infeasible);
        // Partial, not empty: the short abstract still got both candidates.
        assert_eq!(solution.assignment.reviewers_of("2").len(), 2);
        assert_eq!(solution.assignment.reviewers_of("1").len(), 3);
    }

    #[test]
    fn test_band_overcommitment_is_infeasible() {
        let mut model = base_model();
        // 3 active reviewers x min 4 = 12 > 2 abstracts x 2 slots.
        model.load_min = 4;
        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_min_load_redistribution() {
        let mut model = base_model();
        model.load_min = 1;
        model.load_max = 2;
        let solution = solve(&model);
        assert!(solution.status.is_solution_found());
        let loads = solution.assignment.loads(3);
        for &r in &model.active_reviewers {
            assert!(loads[r] >= 1, "reviewer {r} below min load: {loads:?}");
        }
    }

    #[test]
    fn test_experience_coverage_enforced() {
        // Reviewer 1 is experienced but lowest-scoring everywhere.
        let model = AssignmentModel {
            abstract_ids: vec!["1".into()],
            candidates: vec![vec![(0, 50.0), (1, 12.0), (2, 45.0)]],
            experienced_candidates: vec![vec![1]],
            active_reviewers: vec![0, 1, 2],
            n_reviewers: 3,
            target: 2,
            load_min: 0,
            load_max: 5,
        };
        let solution = solve(&model);
        assert!(solution.status.is_solution_found());
        assert!(solution.assignment.contains("1", 1));
        assert_eq!(solution.assignment.reviewers_of("1").len(), 2);
    }

    #[test]
    fn test_no_eligible_abstract_gets_empty_slot() {
        let mut model = base_model();
        model.candidates[0].clear();
        model.experienced_candidates[0].clear();
        let solution = solve(&model);
        assert!(solution.assignment.reviewers_of("1").is_empty());
        assert_eq!(solution.assignment.reviewers_of("2").len(), 2);
        // Coverage applies only to abstracts with candidates.
        assert!(solution.status.is_solution_found());
    }

    #[test]
    fn test_invalid_model() {
        let mut model = base_model();
        model.target = 0;
        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::ModelInvalid);
        assert!(solution.assignment.is_empty());
    }

    #[test]
    fn test_empty_model_is_optimal() {
        let model = AssignmentModel {
            abstract_ids: vec![],
            candidates: vec![],
            experienced_candidates: vec![],
            active_reviewers: vec![],
            n_reviewers: 0,
            target: 3,
            load_min: 0,
            load_max: 30,
        };
        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, 0.0);
    }

    #[test]
    fn test_deterministic() {
        let model = base_model();
        let first = solve(&model);
        let second = solve(&model);
        assert_eq!(first.status, second.status);
        for id in ["1", "2"] {
            assert_eq!(
                first.assignment.reviewers_of(id),
                second.assignment.reviewers_of(id)
            );
        }
    }
}
