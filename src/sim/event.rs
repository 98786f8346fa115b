use std::cmp::Ordering;

use crate::time::Instant;

/// The kinds of simulation events. The declaration order doubles as
/// the processing order for events sharing a timestamp, which keeps
/// traces deterministic: budgets are replenished before new jobs are
/// admitted, completions are folded in before exhaustion is checked,
/// and the dispatch decision is revisited last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    BudgetReplenish,
    JobArrival,
    JobCompletion,
    BudgetExhausted,
    SchedulingPoint,
}

/// A scheduled simulation event. `subject` identifies the affected
/// entity (component, task, or job, depending on the kind) and
/// breaks remaining ordering ties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub at: Instant,
    pub kind: EventKind,
    pub subject: usize,
}

// Timestamps never hold NaN, so the total order below is consistent
// with PartialEq.
impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .total_cmp(&other.at)
            .then(self.kind.cmp(&other.kind))
            .then(self.subject.cmp(&other.subject))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simultaneous_events_order_by_kind() {
        let mut events = vec![
            Event {
                at: 10.0,
                kind: EventKind::SchedulingPoint,
                subject: 0,
            },
            Event {
                at: 10.0,
                kind: EventKind::JobArrival,
                subject: 3,
            },
            Event {
                at: 10.0,
                kind: EventKind::BudgetReplenish,
                subject: 1,
            },
            Event {
                at: 5.0,
                kind: EventKind::BudgetExhausted,
                subject: 0,
            },
            Event {
                at: 10.0,
                kind: EventKind::JobArrival,
                subject: 1,
            },
        ];
        events.sort();
        let kinds: Vec<(f64, EventKind, usize)> =
            events.iter().map(|e| (e.at, e.kind, e.subject)).collect();
        assert_eq!(
            kinds,
            vec![
                (5.0, EventKind::BudgetExhausted, 0),
                (10.0, EventKind::BudgetReplenish, 1),
                (10.0, EventKind::JobArrival, 1),
                (10.0, EventKind::JobArrival, 3),
                (10.0, EventKind::SchedulingPoint, 0),
            ]
        );
    }
}
