use derive_more::Display;

use super::SupplyBound;
use crate::error::Error;
use crate::scenario::Component;
use crate::time::{Duration, Service};

/// The conversion from a periodic allocation (Q, P) to the maximum
/// delay Δ of the derived bounded-delay interface.
///
/// Which formula applies is an analysis-policy choice, so the
/// conversion is a parameter of [BoundedDelay::from_allocation]
/// rather than a constant.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DelayModel {
    /// Δ = 2·(P − Q): the standard periodic-resource conversion,
    /// accounting for a worst-case blackout at both ends of a
    /// replenishment window. The default.
    #[display(fmt = "2(P-Q)")]
    TwiceSlack,
    /// Δ = P − Q: a single worst-case blackout per window.
    #[display(fmt = "P-Q")]
    Slack,
}

impl Default for DelayModel {
    fn default() -> Self {
        DelayModel::TwiceSlack
    }
}

/// A bounded-delay resource (BDR) interface: after at most `delay`
/// time units, the resource sustains a bandwidth of `bandwidth`
/// processor capacity.
///
/// `0 < bandwidth <= 1` and `delay >= 0` hold for every interface
/// derived through [BoundedDelay::from_allocation].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedDelay {
    /// Guaranteed bandwidth α.
    pub bandwidth: f64,
    /// Maximum initial delay Δ before the bandwidth is available.
    pub delay: Duration,
}

impl BoundedDelay {
    /// Derive the interface of a component's periodic allocation:
    /// α = Q/P and Δ per the chosen [DelayModel].
    ///
    /// A component with Q > P has no valid interface and is rejected
    /// with [Error::InvalidBudget].
    pub fn from_allocation(component: &Component, model: DelayModel) -> Result<Self, Error> {
        let (q, p) = (component.budget, component.period);
        if q > p {
            return Err(Error::InvalidBudget {
                component: component.id.clone(),
                budget: q,
                period: p,
            });
        }
        let slack = p - q;
        Ok(BoundedDelay {
            bandwidth: q / p,
            delay: match model {
                DelayModel::TwiceSlack => 2.0 * slack,
                DelayModel::Slack => slack,
            },
        })
    }

    /// The interface of a fully dedicated processor: α = 1, Δ = 0.
    pub fn dedicated() -> Self {
        BoundedDelay {
            bandwidth: 1.0,
            delay: 0.0,
        }
    }
}

impl SupplyBound for BoundedDelay {
    fn provided_service(&self, delta: Duration) -> Service {
        (self.bandwidth * (delta - self.delay)).max(0.0)
    }

    fn service_time(&self, demand: Service) -> Duration {
        if demand <= 0.0 {
            return 0.0;
        }
        self.delay + demand / self.bandwidth
    }
}
