/*! Models of resource supply (dedicated processors and
bounded-delay reservations)

This module provides the trait [SupplyBound], which models the notion
of a *supply-bound function* (SBF). The derived [BoundedDelay]
interface is the only channel through which a component's budget
allocation is visible to the analysis engine and the simulator. */

use auto_impl::auto_impl;

use crate::time::{Duration, Service};

/// Generic interface for models of processor supply.
#[auto_impl(&, Box, Rc)]
pub trait SupplyBound {
    /// Bound the minimum amount of service provided during an
    /// interval of length `delta`.
    fn provided_service(&self, delta: Duration) -> Service;

    /// Bound the maximum interval length during which the supply
    /// provides at least `demand` amount of service.
    fn service_time(&self, demand: Service) -> Duration;
}

mod bounded_delay;
mod dedicated;

pub use bounded_delay::{BoundedDelay, DelayModel};
pub use dedicated::Dedicated;
