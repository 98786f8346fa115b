/*! Evaluation entry point and result records

[evaluate] runs both verification engines — the analytic tests of
[analysis][crate::analysis] and the discrete-event simulator of
[sim][crate::sim] — over one scenario and folds their verdicts into
one record per task and one per component. Serialization of the
records is the embedding application's concern.

Configuration errors abort evaluation only for the affected entity:
a component with an invalid budget, or every component of a core with
an invalid speed factor, still appears in the output, carrying its
reason code, while the rest of the scenario is evaluated normally. */

use std::collections::HashMap;

use crate::analysis::{self, ComponentAnalysis};
use crate::error::Error;
use crate::fixed_point::SearchOutcome;
use crate::scenario::Scenario;
use crate::sim::{self, ComponentStats, TaskStats};
use crate::supply::{BoundedDelay, DelayModel};
use crate::time::Duration;

/// Evaluation parameters.
#[derive(Debug, Clone, Default)]
pub struct EvalConfig {
    /// The periodic-allocation-to-BDR conversion to apply.
    pub delay_model: DelayModel,
    /// Simulation horizon; defaults to the hyperperiod of all task
    /// periods.
    pub horizon: Option<Duration>,
}

/// Combined verdict for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub task: String,
    pub component: String,
    /// Proven schedulable by the analytic engine.
    pub analytic_schedulable: bool,
    /// Response-time bound (or the estimate at divergence) from the
    /// analytic engine, if it produced one.
    pub analytic_response_time: Option<Duration>,
    /// No deadline miss observed within the simulation horizon.
    pub simulated_schedulable: bool,
    pub avg_response_time: Duration,
    pub max_response_time: Duration,
    /// Reason this task could not be fully evaluated: an inherited
    /// configuration rejection, or an inconclusive response-time
    /// iteration (unschedulable, unproven).
    pub rejection: Option<Error>,
}

/// Combined verdict for one component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRecord {
    pub component: String,
    pub core: String,
    /// The derived bounded-delay interface, absent if rejected.
    pub interface: Option<BoundedDelay>,
    /// AND over the component's tasks of both engines' flags.
    pub schedulable: bool,
    /// Whether the core's capacity sustains this component's budget
    /// allocation alongside its siblings, absent if rejected.
    pub core_supply_ok: Option<bool>,
    /// Fraction of the core consumed during simulation.
    pub utilization: Option<f64>,
    /// Preemptions suffered during simulation.
    pub preemptions: Option<usize>,
    /// Reason this component was excluded from evaluation.
    pub rejection: Option<Error>,
}

/// The full evaluation output: one record per task and component, in
/// declaration order. Rejected entities are present, never omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub tasks: Vec<TaskRecord>,
    pub components: Vec<ComponentRecord>,
}

/// Evaluate a scenario with both engines and aggregate the results.
pub fn evaluate(scenario: &Scenario, config: &EvalConfig) -> ScenarioReport {
    let horizon = config.horizon.unwrap_or_else(|| scenario.hyperperiod());

    // entity-local configuration checks
    let rejections: Vec<Option<Error>> = (0..scenario.components.len())
        .map(|ci| {
            scenario
                .check_speed(scenario.core_of(ci))
                .and_then(|_| scenario.check_budget(ci))
                .err()
        })
        .collect();

    let mut analyses: HashMap<usize, ComponentAnalysis> = HashMap::new();
    let mut supply_ok: HashMap<usize, bool> = HashMap::new();
    let mut task_stats: HashMap<usize, TaskStats> = HashMap::new();
    let mut comp_stats: HashMap<usize, ComponentStats> = HashMap::new();

    for core in 0..scenario.cores.len() {
        if scenario.check_speed(core).is_err() {
            continue;
        }
        let admitted: Vec<usize> = scenario
            .components_of(core)
            .iter()
            .copied()
            .filter(|&ci| rejections[ci].is_none())
            .collect();

        for (&ci, ok) in admitted
            .iter()
            .zip(analysis::core_supply_check(scenario, core, &admitted))
        {
            supply_ok.insert(ci, ok);
        }
        for &ci in &admitted {
            // the budget was checked above, so this cannot fail
            if let Ok(a) = analysis::analyze_component(scenario, ci, config.delay_model) {
                analyses.insert(ci, a);
            }
        }

        let stats = sim::simulate_core(scenario, core, &admitted, horizon);
        for t in stats.tasks {
            task_stats.insert(t.task, t);
        }
        for c in stats.components {
            comp_stats.insert(c.component, c);
        }
    }

    let tasks = scenario
        .tasks
        .iter()
        .enumerate()
        .map(|(ti, task)| {
            let ci = scenario.component_of(ti);
            let analytic = analyses
                .get(&ci)
                .and_then(|a| a.tasks.iter().find(|t| t.task == ti));
            let sim = task_stats.get(&ti);
            let rejection = rejections[ci].clone().or_else(|| {
                match analytic.and_then(|t| t.outcome) {
                    Some(SearchOutcome::Diverged) => Some(Error::NonConvergentAnalysis {
                        task: task.name.clone(),
                    }),
                    _ => None,
                }
            });
            TaskRecord {
                task: task.name.clone(),
                component: task.component.clone(),
                analytic_schedulable: analytic.map_or(false, |t| t.schedulable),
                analytic_response_time: analytic
                    .and_then(|t| t.outcome)
                    .and_then(|o| o.response_time()),
                simulated_schedulable: sim.map_or(false, |t| t.schedulable()),
                avg_response_time: sim.map_or(0.0, |t| t.avg_response_time),
                max_response_time: sim.map_or(0.0, |t| t.max_response_time),
                rejection,
            }
        })
        .collect();

    let components = scenario
        .components
        .iter()
        .enumerate()
        .map(|(ci, comp)| {
            let analysis = analyses.get(&ci);
            let stats = comp_stats.get(&ci);
            let schedulable = rejections[ci].is_none()
                && scenario.tasks_of(ci).iter().all(|&ti| {
                    let a = analysis
                        .and_then(|a| a.tasks.iter().find(|t| t.task == ti))
                        .map_or(false, |t| t.schedulable);
                    let s = task_stats.get(&ti).map_or(false, |t| t.schedulable());
                    a && s
                });
            ComponentRecord {
                component: comp.id.clone(),
                core: comp.core.clone(),
                interface: analysis.map(|a| a.interface),
                schedulable,
                core_supply_ok: supply_ok.get(&ci).copied(),
                utilization: stats.map(|s| s.utilization),
                preemptions: stats.map(|s| s.preemptions),
                rejection: rejections[ci].clone(),
            }
        })
        .collect();

    ScenarioReport { tasks, components }
}
