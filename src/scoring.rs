//! Pure compatibility scoring for (abstract, reviewer) pairs.
//!
//! The score is a deterministic function of its two inputs and the run
//! configuration. No side effects, no error paths: a malformed record
//! simply contributes nothing to the total.

use crate::config::AssignConfig;
use crate::records::{Abstract, Reviewer};
use deunicode::deunicode;

/// Folds a name to a comparable form: accents stripped, lowercased.
///
/// `"Müller"`, `"MULLER"`, and `"muller"` all fold to `"muller"`.
pub fn fold_name(name: &str) -> String {
    deunicode(name).to_lowercase()
}

/// Computes the match score for one (abstract, reviewer) pair.
///
/// 1. Conflict of interest: if the reviewer's folded last name occurs as
///    a substring of any folded author string, the score is 0 regardless
///    of topical fit.
/// 2. Category overlap: the abstract's relevance score is added for every
///    category also present (case-insensitively) in the reviewer's
///    interest set.
/// 3. Focus bonus: the running total is multiplied by
///    `topic_multiplier` when the abstract's focus topic is among the
///    reviewer's focus-topic interests.
/// 4. Experience scaling: the total is multiplied by the reviewer's
///    years of experience. A zero-experience reviewer therefore always
///    scores 0; this deliberately keeps novices out of automatic
///    high-value matches and is a tunable policy, not a law.
pub fn match_score(abstract_: &Abstract, reviewer: &Reviewer, config: &AssignConfig) -> f64 {
    let last = fold_name(&reviewer.last_name);
    for author in &abstract_.authors {
        if fold_name(author).contains(&last) {
            return 0.0;
        }
    }

    let interests: Vec<String> = reviewer
        .categories
        .iter()
        .map(|c| c.to_lowercase())
        .collect();

    // HashMap iteration order varies per instance and f64 addition is
    // not associative; summing in key order keeps equal records scoring
    // bit-identically.
    let mut matched: Vec<(&String, f64)> = abstract_
        .category_scores
        .iter()
        .filter(|(category, _)| interests.contains(&category.to_lowercase()))
        .map(|(category, points)| (category, *points))
        .collect();
    matched.sort_unstable_by_key(|&(category, _)| category);
    let mut score: f64 = matched.iter().map(|&(_, points)| points).sum();

    if reviewer
        .focus_topics
        .iter()
        .any(|t| t == &abstract_.focus_topic)
    {
        score *= config.topic_multiplier;
    }

    score * f64::from(reviewer.experience)
}
