/*! Models of processor demand

This module provides the trait [RequestBound] for (arbitrarily
shaped) processor demand, along with the two curves the analysis
engine needs: the request-bound function of a periodic task (demand
*released* within a window, which drives fixed-priority interference)
and the demand-bound function of an implicit-deadline periodic task
(demand *due* within a window, which drives the EDF test). */

use auto_impl::auto_impl;
use itertools::Itertools;

use crate::time::{Duration, Service};

/// The general interface for processor demand. This can represent
/// the demand of a single task, or the cumulative demand of multiple
/// tasks.
#[auto_impl(&, Box, Rc)]
pub trait RequestBound {
    /// Bound the total amount of service needed in an interval of
    /// length `delta`.
    fn service_needed(&self, delta: Duration) -> Service;

    /// Yield an iterator over the points (i.e., values of `delta` in
    /// [RequestBound::service_needed]) at which the demand changes.
    /// The iterator is infinite and strictly increasing; callers
    /// bound it with their horizon.
    fn steps_iter(&self) -> Box<dyn Iterator<Item = Duration> + '_>;
}

/// The request-bound function of a periodic task: an interval of
/// length `delta` sees `ceil(delta / period)` job releases, each
/// demanding `wcet` units of service.
#[derive(Debug, Clone, Copy)]
pub struct RBF {
    pub wcet: Service,
    pub period: Duration,
}

impl RequestBound for RBF {
    fn service_needed(&self, delta: Duration) -> Service {
        (delta / self.period).ceil() * self.wcet
    }

    fn steps_iter(&self) -> Box<dyn Iterator<Item = Duration> + '_> {
        Box::new((0u64..).map(move |k| k as Duration * self.period))
    }
}

/// The demand-bound function of an implicit-deadline periodic task:
/// only jobs whose deadline falls within the interval contribute, so
/// an interval of length `delta` carries `floor(delta / period)`
/// full job demands.
#[derive(Debug, Clone, Copy)]
pub struct DBF {
    pub wcet: Service,
    pub period: Duration,
}

impl RequestBound for DBF {
    fn service_needed(&self, delta: Duration) -> Service {
        (delta / self.period).floor() * self.wcet
    }

    fn steps_iter(&self) -> Box<dyn Iterator<Item = Duration> + '_> {
        // the task's deadlines
        Box::new((1u64..).map(move |k| k as Duration * self.period))
    }
}

/// The total demand of a vector of individual demand sources (e.g.,
/// all tasks of a component, or all higher-priority tasks).
#[derive(Debug, Clone)]
pub struct Aggregate<T> {
    sources: Vec<T>,
}

impl<T> Aggregate<T> {
    pub fn new(sources: Vec<T>) -> Self {
        Aggregate { sources }
    }
}

impl<T: RequestBound> RequestBound for Aggregate<T> {
    fn service_needed(&self, delta: Duration) -> Service {
        self.sources.iter().map(|rb| rb.service_needed(delta)).sum()
    }

    fn steps_iter(&self) -> Box<dyn Iterator<Item = Duration> + '_> {
        Box::new(
            self.sources
                .iter()
                .map(|rb| rb.steps_iter())
                .kmerge_by(|a, b| a < b)
                .dedup_by(|a, b| a == b),
        )
    }
}
