//! Reviewer-to-abstract assignment core.
//!
//! Assigns a fixed number of reviewers to every abstract in a submission
//! pool, maximizing aggregate topical fit under capacity, quality, and
//! conflict-of-interest constraints. The pipeline is a single
//! synchronous batch job:
//!
//! - **Scoring**: pure compatibility score per (abstract, reviewer)
//!   pair with conflict-of-interest exclusion and experience scaling.
//! - **Eligibility**: per-abstract sets of reviewers above the minimum
//!   match threshold, and their experienced subsets.
//! - **Solver**: sparse binary integer program (coverage, load band,
//!   experience coverage) solved under a wall-clock budget behind a
//!   pluggable backend trait.
//! - **Repair**: three deterministic greedy passes that restore the
//!   invariants a time-boxed solver may leave unmet, followed by a
//!   residual-violation scan.
//! - **Reporting**: load and score aggregates plus the serialized
//!   assignment for downstream document generation.
//!
//! # Architecture
//!
//! Ingestion (CSV/JSON parsing, field normalization) and document
//! assembly are external collaborators: the crate consumes typed
//! [`records::Abstract`] and [`records::Reviewer`] values and produces
//! serializable reports. A run always completes; unmet invariants
//! surface as residual-violation counts in the statistics report, never
//! as errors.

pub mod config;
pub mod eligibility;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod repair;
pub mod report;
pub mod scoring;
pub mod solver;

pub use config::AssignConfig;
pub use error::AssignError;
pub use pipeline::{Pipeline, RunOutput};
