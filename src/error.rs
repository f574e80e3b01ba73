//! Error taxonomy for the assignment pipeline.
//!
//! Only conditions that prevent the run from producing any output are
//! errors. Structural infeasibility, solver timeouts, and duplicate
//! reviewer identities are all recoverable and surface as warnings or
//! residual-violation counts instead (see [`crate::repair::Residuals`]).

use thiserror::Error;

/// Errors returned by the pipeline surface.
#[derive(Debug, Error)]
pub enum AssignError {
    /// No abstracts survived record validation.
    #[error("no valid abstracts to assign")]
    NoAbstracts,

    /// No reviewers survived record validation.
    #[error("no valid reviewers available")]
    NoReviewers,

    /// The run configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A report could not be serialized.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
