//! Input records and the assignment container.
//!
//! `Abstract` and `Reviewer` are produced by ingestion collaborators and
//! are read-only for the whole run. The only mutable entity is
//! [`Assignment`], which the solver builds and the repair engine patches
//! in place.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A submission requiring reviewer coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Abstract {
    /// Unique identifier, typically the submission number.
    pub id: String,

    /// Display title, carried through to the assignment report.
    #[serde(default)]
    pub title: String,

    /// Author display names, used only for conflict-of-interest checks.
    pub authors: Vec<String>,

    /// Category name → relevance score in 0..=10.
    ///
    /// A missing map deserializes as empty: the abstract simply matches
    /// nobody on categories.
    #[serde(default)]
    pub category_scores: HashMap<String, f64>,

    /// Single focus-topic tag.
    #[serde(default)]
    pub focus_topic: String,
}

impl Abstract {
    /// Validates this record in isolation.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("abstract id is empty".into());
        }
        for (category, score) in &self.category_scores {
            if !score.is_finite() || *score < 0.0 || *score > 10.0 {
                return Err(format!(
                    "category {category:?} score {score} is outside 0..=10"
                ));
            }
        }
        Ok(())
    }
}

/// A reviewer record.
///
/// Two reviewers are distinct entities even when every field collides;
/// identity is the pool index, never the name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reviewer {
    pub first_name: String,
    pub last_name: String,

    /// Declared interest categories.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Declared focus-topic interests.
    ///
    /// Serialized as `focus_topic` for compatibility with the ingestion
    /// collaborator's records.
    #[serde(default, rename = "focus_topic")]
    pub focus_topics: Vec<String>,

    /// Years of experience.
    pub experience: u32,
}

impl Reviewer {
    /// Validates this record in isolation.
    pub fn validate(&self) -> Result<(), String> {
        if self.last_name.is_empty() {
            return Err("reviewer last name is empty".into());
        }
        Ok(())
    }

    /// `(first, last)` name pair as emitted in reports.
    pub fn name(&self) -> (String, String) {
        (self.first_name.clone(), self.last_name.clone())
    }
}

/// Frozen reviewer collection with stable integer indices.
///
/// The index of a reviewer is its position in the pool, assigned once at
/// construction and never changed. All solver and repair structures use
/// this index as their compact key, replacing lookups keyed by mutable
/// name tuples.
#[derive(Debug, Clone)]
pub struct ReviewerPool {
    reviewers: Vec<Reviewer>,
}

impl ReviewerPool {
    /// Builds a pool from a reviewer collection.
    ///
    /// Duplicate `(first, last)` pairs are a data-quality warning, not an
    /// error: both entries are retained under distinct indices.
    pub fn new(reviewers: Vec<Reviewer>) -> Self {
        let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
        for (index, reviewer) in reviewers.iter().enumerate() {
            let key = (reviewer.first_name.as_str(), reviewer.last_name.as_str());
            if let Some(first_index) = seen.get(&key) {
                log::warn!(
                    "duplicate reviewer {:?} {:?} (indices {first_index} and {index}); keeping both",
                    reviewer.first_name,
                    reviewer.last_name
                );
            } else {
                seen.insert(key, index);
            }
        }
        Self { reviewers }
    }

    pub fn len(&self) -> usize {
        self.reviewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviewers.is_empty()
    }

    /// Returns the reviewer at `index`. Panics when out of range; indices
    /// come from the pool itself, so an out-of-range index is a bug.
    pub fn get(&self, index: usize) -> &Reviewer {
        &self.reviewers[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Reviewer)> {
        self.reviewers.iter().enumerate()
    }
}

/// Mutable mapping from abstract id to assigned reviewer indices.
///
/// Backed by a `BTreeMap` so iteration (and therefore every report) is
/// ordered by abstract id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Assignment {
    slots: BTreeMap<String, Vec<usize>>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reviewers currently assigned to `id` (empty when unknown).
    pub fn reviewers_of(&self, id: &str) -> &[usize] {
        self.slots.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable slot for `id`, created empty on first access.
    pub fn slot_mut(&mut self, id: &str) -> &mut Vec<usize> {
        self.slots.entry(id.to_string()).or_default()
    }

    pub fn contains(&self, id: &str, reviewer: usize) -> bool {
        self.reviewers_of(id).contains(&reviewer)
    }

    /// Iterates slots in abstract-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<usize>)> {
        self.slots.iter()
    }

    /// Number of abstracts with a (possibly empty) slot.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Per-reviewer assignment counts over the whole run.
    pub fn loads(&self, n_reviewers: usize) -> Vec<usize> {
        let mut loads = vec![0usize; n_reviewers];
        for assigned in self.slots.values() {
            for &reviewer in assigned {
                loads[reviewer] += 1;
            }
        }
        loads
    }
}
