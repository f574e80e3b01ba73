//! Deterministic greedy repair of solver output.
//!
//! The solver is time-boxed and may return with invariants unmet, or
//! with no solution at all. The repair engine restores what can be
//! restored by sweeping three passes in fixed order until none of them
//! changes the assignment:
//!
//! 1. [`complete`](RepairEngine::complete) — fill short abstracts,
//! 2. [`ensure_experience`](RepairEngine::ensure_experience) — swap in
//!    experienced reviewers where coverage is missing,
//! 3. [`relieve_overload`](RepairEngine::relieve_overload) — shed
//!    assignments from reviewers above the load cap.
//!
//! Whatever remains unmet afterwards is a data or capacity problem, not
//! a bug: it is counted in [`Residuals`] and reported, never thrown.
//!
//! Tie-breaking is explicit everywhere: higher match score wins, and
//! equal scores fall back to the lower reviewer index.

use crate::config::AssignConfig;
use crate::eligibility::EligibilityIndex;
use crate::records::Assignment;
use serde::Serialize;
use std::cmp::Ordering;

/// Post-repair invariant violations, recomputed from scratch by
/// [`RepairEngine::residuals`].
///
/// A well-posed instance (enough eligible, experienced capacity) reports
/// zero on all three counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Residuals {
    /// Abstracts whose assigned count differs from the target.
    pub incomplete: usize,
    /// Abstracts with a non-empty eligible-experienced subset but no
    /// experienced reviewer assigned.
    pub missing_experience: usize,
    /// Reviewers above the maximum load.
    pub overloaded: usize,
}

impl Residuals {
    /// Whether every invariant holds.
    pub fn is_clean(&self) -> bool {
        self.incomplete == 0 && self.missing_experience == 0 && self.overloaded == 0
    }
}

/// Greedy repair over one assignment.
///
/// Borrows the frozen eligibility index and mutates the assignment in
/// place; single-threaded, one pass at a time.
pub struct RepairEngine<'a> {
    index: &'a EligibilityIndex,
    abstract_ids: &'a [String],
    target: usize,
    load_max: usize,
}

/// `(score desc, index asc)` ordering key for candidate selection.
fn better(a: (f64, usize), b: (f64, usize)) -> Ordering {
    b.0.partial_cmp(&a.0)
        .unwrap_or(Ordering::Equal)
        .then(a.1.cmp(&b.1))
}

impl<'a> RepairEngine<'a> {
    pub fn new(
        index: &'a EligibilityIndex,
        abstract_ids: &'a [String],
        config: &AssignConfig,
    ) -> Self {
        Self {
            index,
            abstract_ids,
            target: config.reviewers_per_abstract,
            load_max: config.max_abstracts_per_reviewer,
        }
    }

    /// Sweeps the three passes in order until none of them changes the
    /// assignment, then returns the residual scan.
    ///
    /// One sweep is not enough: the swap passes lower the outgoing
    /// reviewer's load, which can re-open capacity that `complete` had
    /// already given up on. Every pass makes monotone progress (slots
    /// never shrink, experience coverage is never lost, total overload
    /// never grows), so the loop terminates.
    pub fn repair(&self, assignment: &mut Assignment) -> Residuals {
        let mut added = 0;
        let mut swapped = 0;
        let mut shed = 0;
        loop {
            let sweep_added = self.complete(assignment);
            let sweep_swapped = self.ensure_experience(assignment);
            let sweep_shed = self.relieve_overload(assignment);
            added += sweep_added;
            swapped += sweep_swapped;
            shed += sweep_shed;
            if sweep_added + sweep_swapped + sweep_shed == 0 {
                break;
            }
        }
        let residuals = self.residuals(assignment);
        log::info!(
            "repair: {added} added, {swapped} experience swaps, {shed} overload moves; \
             residuals: {} incomplete, {} missing experience, {} overloaded",
            residuals.incomplete,
            residuals.missing_experience,
            residuals.overloaded
        );
        residuals
    }

    /// Pass 1: completeness.
    ///
    /// Every abstract below the target count greedily receives the
    /// highest-scoring still-eligible, not-yet-assigned reviewer whose
    /// load is below the cap, until the target is reached or candidates
    /// run out. Returns the number of additions.
    pub fn complete(&self, assignment: &mut Assignment) -> usize {
        let mut loads = assignment.loads(self.index.n_reviewers());
        let mut added = 0;

        for (ordinal, id) in self.abstract_ids.iter().enumerate() {
            loop {
                if assignment.reviewers_of(id).len() >= self.target {
                    break;
                }
                let slot = assignment.reviewers_of(id);
                let candidate = self
                    .index
                    .eligible(ordinal)
                    .iter()
                    .copied()
                    .filter(|&r| !slot.contains(&r) && loads[r] < self.load_max)
                    .min_by(|&x, &y| {
                        better(
                            (self.index.score(ordinal, x).unwrap_or(0.0), x),
                            (self.index.score(ordinal, y).unwrap_or(0.0), y),
                        )
                    });
                match candidate {
                    Some(r) => {
                        assignment.slot_mut(id).push(r);
                        loads[r] += 1;
                        added += 1;
                    }
                    None => break,
                }
            }
        }

        added
    }

    /// Pass 2: experience coverage.
    ///
    /// For every abstract lacking an experienced reviewer despite a
    /// non-empty eligible-experienced subset, the lowest-scoring
    /// assigned non-experienced reviewer is swapped for the
    /// highest-scoring available experienced one under the load cap.
    /// Abstracts where no experienced reviewer fits under the cap stay
    /// flagged rather than break the cap. Returns the number of swaps.
    pub fn ensure_experience(&self, assignment: &mut Assignment) -> usize {
        let mut loads = assignment.loads(self.index.n_reviewers());
        let mut swapped = 0;

        for (ordinal, id) in self.abstract_ids.iter().enumerate() {
            if self.index.eligible_experienced(ordinal).is_empty() {
                continue;
            }
            let slot = assignment.reviewers_of(id);
            if slot.iter().any(|&r| self.index.is_experienced(r)) {
                continue;
            }

            let incoming = self
                .index
                .eligible_experienced(ordinal)
                .iter()
                .copied()
                .filter(|&r| !slot.contains(&r) && loads[r] < self.load_max)
                .min_by(|&x, &y| {
                    better(
                        (self.index.score(ordinal, x).unwrap_or(0.0), x),
                        (self.index.score(ordinal, y).unwrap_or(0.0), y),
                    )
                });
            let outgoing = slot
                .iter()
                .copied()
                .min_by(|&x, &y| {
                    let sx = self.index.score(ordinal, x).unwrap_or(0.0);
                    let sy = self.index.score(ordinal, y).unwrap_or(0.0);
                    sx.partial_cmp(&sy).unwrap_or(Ordering::Equal).then(x.cmp(&y))
                });

            if let (Some(inn), Some(out)) = (incoming, outgoing) {
                let slot = assignment.slot_mut(id);
                if let Some(position) = slot.iter().position(|&r| r == out) {
                    slot[position] = inn;
                    loads[out] -= 1;
                    loads[inn] += 1;
                    swapped += 1;
                }
            }
        }

        swapped
    }

    /// Pass 3: overload relief.
    ///
    /// Every reviewer above the load cap repeatedly drops their
    /// lowest-scoring assignment; that abstract is backfilled with the
    /// best-scoring alternative under the cap that preserves experience
    /// coverage. Where no safe backfill exists the assignment is kept
    /// and the overload is left for the residual scan. Returns the
    /// number of completed moves.
    pub fn relieve_overload(&self, assignment: &mut Assignment) -> usize {
        let mut loads = assignment.loads(self.index.n_reviewers());
        let mut moved = 0;

        for reviewer in 0..self.index.n_reviewers() {
            if loads[reviewer] <= self.load_max {
                continue;
            }

            // This reviewer's assignments, lowest score first.
            let mut held: Vec<(usize, f64)> = self
                .abstract_ids
                .iter()
                .enumerate()
                .filter(|(_, id)| assignment.contains(id, reviewer))
                .map(|(ordinal, _)| {
                    (ordinal, self.index.score(ordinal, reviewer).unwrap_or(0.0))
                })
                .collect();
            held.sort_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });

            for (ordinal, _) in held {
                if loads[reviewer] <= self.load_max {
                    break;
                }
                let id = &self.abstract_ids[ordinal];
                let slot = assignment.reviewers_of(id);

                // Dropping the only experienced reviewer requires an
                // experienced replacement.
                let needs_experienced = !self.index.eligible_experienced(ordinal).is_empty()
                    && self.index.is_experienced(reviewer)
                    && !slot
                        .iter()
                        .any(|&r| r != reviewer && self.index.is_experienced(r));

                let replacement = self
                    .index
                    .eligible(ordinal)
                    .iter()
                    .copied()
                    .filter(|&r| !slot.contains(&r) && loads[r] < self.load_max)
                    .filter(|&r| !needs_experienced || self.index.is_experienced(r))
                    .min_by(|&x, &y| {
                        better(
                            (self.index.score(ordinal, x).unwrap_or(0.0), x),
                            (self.index.score(ordinal, y).unwrap_or(0.0), y),
                        )
                    });

                if let Some(inn) = replacement {
                    let slot = assignment.slot_mut(id);
                    if let Some(position) = slot.iter().position(|&r| r == reviewer) {
                        slot[position] = inn;
                        loads[reviewer] -= 1;
                        loads[inn] += 1;
                        moved += 1;
                    }
                }
            }

            if loads[reviewer] > self.load_max {
                log::warn!(
                    "reviewer {reviewer} remains above max load ({} > {})",
                    loads[reviewer],
                    self.load_max
                );
            }
        }

        moved
    }

    /// Final validation scan, recomputed from scratch.
    pub fn residuals(&self, assignment: &Assignment) -> Residuals {
        let incomplete = self
            .abstract_ids
            .iter()
            .filter(|id| assignment.reviewers_of(id).len() != self.target)
            .count();

        let missing_experience = self
            .abstract_ids
            .iter()
            .enumerate()
            .filter(|(ordinal, id)| {
                !self.index.eligible_experienced(*ordinal).is_empty()
                    && !assignment
                        .reviewers_of(id)
                        .iter()
                        .any(|&r| self.index.is_experienced(r))
            })
            .count();

        let overloaded = assignment
            .loads(self.index.n_reviewers())
            .iter()
            .filter(|&&load| load > self.load_max)
            .count();

        Residuals {
            incomplete,
            missing_experience,
            overloaded,
        }
    }
}
