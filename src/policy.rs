/*! Scheduling policies and the dispatch primitive shared by both
hierarchy levels.

A core picks among its components and a component picks among its
ready jobs with the same two policies, so both levels go through a
single [Policy::select_next] primitive. This also pins down the
tie-break rule in exactly one place: candidates are compared in
iteration order and a later candidate wins only by being *strictly*
better, so equal priorities and equal deadlines resolve to the
earlier-declared entity. */

use derive_more::Display;

use crate::time::Instant;

/// Static priority value; smaller means more important, 1 is the
/// highest priority.
pub type Priority = u32;

/// The two supported scheduling policies, applicable at both the
/// core-over-components and the component-over-tasks level.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Fixed-priority scheduling (rate-monotonic when priorities
    /// follow periods).
    #[display(fmt = "FP")]
    FixedPriority,
    /// Earliest-deadline-first scheduling.
    #[display(fmt = "EDF")]
    EarliestDeadlineFirst,
}

/// A dispatchable entity: a ready job, or a component with pending
/// work and remaining budget.
pub trait Candidate {
    /// The candidate's static priority, if its parent schedules by
    /// fixed priority.
    fn static_priority(&self) -> Option<Priority>;

    /// The absolute deadline relevant for EDF dispatch: a job's
    /// deadline, or the end of a component's current budget period.
    fn deadline(&self) -> Instant;
}

impl Policy {
    /// Pick the next candidate to run, or `None` if there is none.
    ///
    /// Callers must present candidates in declaration order; ties go
    /// to the first candidate presented.
    pub fn select_next<C: Candidate>(&self, candidates: impl IntoIterator<Item = C>) -> Option<C> {
        let mut iter = candidates.into_iter();
        let mut chosen = iter.next()?;
        for c in iter {
            let better = match self {
                // missing priorities rank last; scenario validation
                // rules them out for fixed-priority parents
                Policy::FixedPriority => {
                    c.static_priority().unwrap_or(Priority::MAX)
                        < chosen.static_priority().unwrap_or(Priority::MAX)
                }
                Policy::EarliestDeadlineFirst => c.deadline() < chosen.deadline(),
            };
            if better {
                chosen = c;
            }
        }
        Some(chosen)
    }
}
