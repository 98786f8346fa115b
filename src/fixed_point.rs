/*! Iterative fixed-point search for response-time bounds

The worst-case response time of a task is the smallest positive
solution of `R = service_time(workload(R))`, where `workload` sums
the task's own demand and the interference it suffers, and
`service_time` inverts the supply-bound function of the resource the
task runs on. The search iterates from the task's own demand and
terminates at the fixed point, when the assumed response time exceeds
the deadline (no smaller solution can exist beyond it), or at an
iteration cutoff that guards against non-convergence on misconfigured
inputs. */

use crate::supply::SupplyBound;
use crate::time::{Duration, Service};

/// Iteration cutoff; reaching it means the analysis is inconclusive,
/// never that the task is schedulable.
const MAX_ITERATIONS: u32 = 1_000;

/// The outcome of a fixed-point search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchOutcome {
    /// A fixed point no larger than the deadline was found.
    Converged(Duration),
    /// The iteration passed the task's deadline; the carried value
    /// is the response-time estimate at divergence, for diagnostics.
    ExceededDeadline(Duration),
    /// The iteration cutoff was reached without a verdict.
    Diverged,
}

impl SearchOutcome {
    /// True iff the search proves the deadline is met.
    pub fn is_schedulable(&self) -> bool {
        matches!(self, SearchOutcome::Converged(_))
    }

    /// The response-time bound or estimate, if the search produced one.
    pub fn response_time(&self) -> Option<Duration> {
        match self {
            SearchOutcome::Converged(r) | SearchOutcome::ExceededDeadline(r) => Some(*r),
            SearchOutcome::Diverged => None,
        }
    }
}

/// Conduct an iterative fixed-point search for the response time of
/// a task with relative deadline `deadline` under the given supply.
///
/// `workload` must be monotone in its argument and must include the
/// demand of the task under analysis itself (so `workload(0)` is the
/// task's own cost).
pub fn search<SBF, RHS>(supply: &SBF, deadline: Duration, workload: RHS) -> SearchOutcome
where
    SBF: SupplyBound + ?Sized,
    RHS: Fn(Duration) -> Service,
{
    let mut assumed_response_time = supply.service_time(workload(0.0));
    for _ in 0..MAX_ITERATIONS {
        if assumed_response_time > deadline {
            return SearchOutcome::ExceededDeadline(assumed_response_time);
        }
        let response_time_bound = supply.service_time(workload(assumed_response_time));
        if response_time_bound <= assumed_response_time {
            // we have converged
            return SearchOutcome::Converged(response_time_bound);
        } else {
            // continue iterating
            assumed_response_time = response_time_bound;
        }
    }
    // if we get here, we failed to converge => no verdict
    SearchOutcome::Diverged
}
