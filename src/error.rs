use thiserror::Error;

use crate::time::Duration;

/// Configuration and analysis errors surfaced by the core.
///
/// Deadline misses and unschedulable verdicts are *not* errors: they
/// are expected analysis outcomes and appear in the result records.
/// Of the variants below, [Error::UnresolvedReference] and
/// [Error::MissingPriority] are scenario-fatal, since no downstream
/// verdict can be meaningful for a structurally broken scenario. The
/// remaining variants abort evaluation only for the affected entity;
/// every rejected entity still appears in the output with its reason
/// code.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A component's budget exceeds its period, so no bounded-delay
    /// interface can be derived for it.
    #[error("component '{component}' has budget {budget} > period {period}")]
    InvalidBudget {
        component: String,
        budget: Duration,
        period: Duration,
    },

    /// A core's speed factor is not strictly positive.
    #[error("core '{core}' has non-positive speed factor {speed_factor}")]
    InvalidSpeedFactor { core: String, speed_factor: f64 },

    /// The response-time iteration for a task hit its iteration
    /// cutoff without converging or provably exceeding the deadline.
    /// The task is reported as unschedulable, unproven.
    #[error("response-time iteration for task '{task}' did not converge")]
    NonConvergentAnalysis { task: String },

    /// A task or component names a parent that does not exist.
    #[error("{kind} '{name}' references nonexistent {referenced_kind} '{referenced}'")]
    UnresolvedReference {
        kind: &'static str,
        name: String,
        referenced_kind: &'static str,
        referenced: String,
    },

    /// A child of a fixed-priority parent has no static priority.
    #[error("{kind} '{name}' needs a static priority: its parent schedules by fixed priority")]
    MissingPriority { kind: &'static str, name: String },
}
