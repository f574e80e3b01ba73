//! Run configuration.

/// Configuration for a full assignment run.
///
/// Every knob carries a production default and can be overridden per
/// run.
///
/// # Examples
///
/// ```
/// use revmatch::config::AssignConfig;
///
/// let config = AssignConfig::default()
///     .with_reviewers_per_abstract(2)
///     .with_max_abstracts_per_reviewer(20)
///     .with_time_limit_ms(30_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct AssignConfig {
    /// Multiplier applied when the abstract's focus topic is among the
    /// reviewer's declared focus-topic interests.
    pub topic_multiplier: f64,

    /// Minimum match score a (abstract, reviewer) pair must *exceed*
    /// to be considered eligible.
    pub min_match_score: f64,

    /// Exact number of reviewers each abstract should receive.
    pub reviewers_per_abstract: usize,

    /// Lower bound of the per-reviewer load band.
    ///
    /// Applies to every reviewer appearing in at least one eligible set.
    /// Enforced only inside the solver; the repair engine treats max load
    /// as the hard cap and leaves under-loaded reviewers alone.
    pub min_abstracts_per_reviewer: usize,

    /// Upper bound of the per-reviewer load band. Hard cap everywhere.
    pub max_abstracts_per_reviewer: usize,

    /// Years of experience at or above which a reviewer counts as
    /// experienced.
    pub experience_threshold: u32,

    /// Wall-clock budget for the solver, in milliseconds.
    pub time_limit_ms: u64,

    /// Worker-thread hint passed to the solver backend.
    ///
    /// Opaque to the rest of the pipeline; the built-in solver is
    /// single-threaded and ignores it.
    pub num_workers: usize,
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self {
            topic_multiplier: 1.2,
            min_match_score: 10.0,
            reviewers_per_abstract: 3,
            min_abstracts_per_reviewer: 10,
            max_abstracts_per_reviewer: 30,
            experience_threshold: 10,
            time_limit_ms: 600_000,
            num_workers: 4,
        }
    }
}

impl AssignConfig {
    pub fn with_topic_multiplier(mut self, m: f64) -> Self {
        self.topic_multiplier = m;
        self
    }

    pub fn with_min_match_score(mut self, s: f64) -> Self {
        self.min_match_score = s;
        self
    }

    pub fn with_reviewers_per_abstract(mut self, n: usize) -> Self {
        self.reviewers_per_abstract = n;
        self
    }

    pub fn with_min_abstracts_per_reviewer(mut self, n: usize) -> Self {
        self.min_abstracts_per_reviewer = n;
        self
    }

    pub fn with_max_abstracts_per_reviewer(mut self, n: usize) -> Self {
        self.max_abstracts_per_reviewer = n;
        self
    }

    pub fn with_experience_threshold(mut self, years: u32) -> Self {
        self.experience_threshold = years;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.topic_multiplier < 1.0 {
            return Err(format!(
                "topic_multiplier must be >= 1.0, got {}",
                self.topic_multiplier
            ));
        }
        if self.min_match_score < 0.0 {
            return Err(format!(
                "min_match_score must be non-negative, got {}",
                self.min_match_score
            ));
        }
        if self.reviewers_per_abstract == 0 {
            return Err("reviewers_per_abstract must be at least 1".into());
        }
        if self.min_abstracts_per_reviewer > self.max_abstracts_per_reviewer {
            return Err(format!(
                "load band is empty: min {} > max {}",
                self.min_abstracts_per_reviewer, self.max_abstracts_per_reviewer
            ));
        }
        if self.max_abstracts_per_reviewer == 0 {
            return Err("max_abstracts_per_reviewer must be at least 1".into());
        }
        Ok(())
    }
}
