//! Assignment solver.
//!
//! Formulates the reviewer-assignment integer program and solves it
//! under a wall-clock budget.
//!
//! # Key Components
//!
//! - **Model**: [`AssignmentModel`] — sparse binary program over
//!   eligible pairs with coverage, load-band, and experience-coverage
//!   constraints
//! - **Solver**: [`IpSolver`] trait — interface for solver backends
//! - **Backend**: [`GreedySwapSolver`] — built-in deterministic
//!   construction + swap-improvement backend
//!
//! # Design
//!
//! The [`IpSolver`] trait is the seam for plugging in external MIP
//! solvers (CBC, HiGHS, CP-SAT). A backend returns once, with a tagged
//! [`SolverStatus`] and a variable assignment, after blocking for at
//! most the configured time budget; any internal parallelism is opaque
//! to callers. Non-optimal but feasible results are accepted and passed
//! downstream with their status; infeasibility yields an empty or
//! partial assignment that the repair engine completes.

mod model;
mod solve;

pub use model::AssignmentModel;
pub use solve::{GreedySwapSolver, IpSolver, Solution, SolverConfig, SolverStatus};
