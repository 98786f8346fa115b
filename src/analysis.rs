/*! Analytic schedulability tests for the two-level hierarchy

Component-level tests run against the component's derived
bounded-delay interface: an iterative response-time analysis per task
for fixed-priority components, and a demand-bound check at every
demand step up to the hyperperiod for EDF components. The core-level
test abstracts each component as a periodic server (WCET = budget,
period = period) and runs the same machinery over the servers against
a dedicated supply.

The higher-priority set of a task includes equal-priority tasks
declared earlier, which makes the analytic ordering agree with the
simulator's dispatch tie-break. */

use crate::demand::{Aggregate, RequestBound, DBF, RBF};
use crate::error::Error;
use crate::fixed_point::{self, SearchOutcome};
use crate::policy::{Policy, Priority};
use crate::scenario::Scenario;
use crate::supply::{BoundedDelay, Dedicated, DelayModel, SupplyBound};
use crate::time::{hyperperiod, Duration, Instant, Service, TIME_EPS};

/// Analytic verdict for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskAnalysis {
    /// Task index into the scenario.
    pub task: usize,
    /// True iff the analysis proves the task meets its deadline.
    pub schedulable: bool,
    /// The fixed-point search outcome; `None` for tasks of EDF
    /// components, whose verdict is the component-level demand test.
    pub outcome: Option<SearchOutcome>,
}

/// Analytic verdict for one component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentAnalysis {
    /// Component index into the scenario.
    pub component: usize,
    /// The derived bounded-delay interface.
    pub interface: BoundedDelay,
    /// Per-task verdicts, in the component's task declaration order.
    pub tasks: Vec<TaskAnalysis>,
    /// True iff every task of the component is schedulable.
    pub schedulable: bool,
    /// The first instant at which demand exceeds supply, for EDF
    /// components that fail the demand test.
    pub first_violation: Option<Instant>,
}

/// Run the component-level schedulability test for one component
/// against its derived bounded-delay interface.
///
/// Fails with [Error::InvalidBudget] if no interface can be derived;
/// the caller is expected to have validated the core's speed factor
/// already, since effective execution times depend on it.
pub fn analyze_component(
    scenario: &Scenario,
    component: usize,
    model: DelayModel,
) -> Result<ComponentAnalysis, Error> {
    let comp = &scenario.components[component];
    let interface = BoundedDelay::from_allocation(comp, model)?;
    let tasks = scenario.tasks_of(component);

    let analysis = match comp.policy {
        Policy::FixedPriority => fp_component(scenario, tasks, &interface),
        Policy::EarliestDeadlineFirst => edf_component(scenario, tasks, &interface),
    };

    Ok(ComponentAnalysis {
        component,
        interface,
        schedulable: analysis.0.iter().all(|t| t.schedulable),
        tasks: analysis.0,
        first_violation: analysis.1,
    })
}

/// Response-time analysis of fixed-priority tasks under a given
/// supply: per task, the smallest positive fixed point of
/// `R = service_time(C_i + sum_hp ceil(R / T_j) * C_j)`.
fn fp_component<S: SupplyBound>(
    scenario: &Scenario,
    tasks: &[usize],
    supply: &S,
) -> (Vec<TaskAnalysis>, Option<Instant>) {
    let verdicts = tasks
        .iter()
        .enumerate()
        .map(|(pos, &ti)| {
            let cost = scenario.effective_wcet(ti);
            let deadline = scenario.tasks[ti].period;
            let interference = Aggregate::new(
                tasks
                    .iter()
                    .enumerate()
                    .filter(|&(hp_pos, &hp)| {
                        higher_priority(
                            scenario.tasks[hp].priority,
                            hp_pos,
                            scenario.tasks[ti].priority,
                            pos,
                        )
                    })
                    .map(|(_, &hp)| RBF {
                        wcet: scenario.effective_wcet(hp),
                        period: scenario.tasks[hp].period,
                    })
                    .collect(),
            );
            let outcome = fixed_point::search(supply, deadline, |r: Duration| {
                cost + interference.service_needed(r)
            });
            TaskAnalysis {
                task: ti,
                schedulable: outcome.is_schedulable(),
                outcome: Some(outcome),
            }
        })
        .collect();
    (verdicts, None)
}

/// Does (`prio_a`, declared at `pos_a`) outrank (`prio_b`, declared
/// at `pos_b`)? Equal priorities resolve to declaration order, like
/// the simulator's dispatch.
fn higher_priority(
    prio_a: Option<Priority>,
    pos_a: usize,
    prio_b: Option<Priority>,
    pos_b: usize,
) -> bool {
    let a = prio_a.unwrap_or(Priority::MAX);
    let b = prio_b.unwrap_or(Priority::MAX);
    a < b || (a == b && pos_a < pos_b)
}

/// Demand-bound test of EDF tasks under a given supply: at every
/// point where the cumulative demand steps, up to the hyperperiod,
/// the supply must be able to deliver the demand in time.
fn edf_component<S: SupplyBound>(
    scenario: &Scenario,
    tasks: &[usize],
    supply: &S,
) -> (Vec<TaskAnalysis>, Option<Instant>) {
    let demand = Aggregate::new(
        tasks
            .iter()
            .map(|&ti| DBF {
                wcet: scenario.effective_wcet(ti),
                period: scenario.tasks[ti].period,
            })
            .collect(),
    );
    let horizon = hyperperiod(tasks.iter().map(|&ti| scenario.tasks[ti].period));
    let first_violation = demand_violation(&demand, supply, horizon);
    let ok = first_violation.is_none();
    let verdicts = tasks
        .iter()
        .map(|&ti| TaskAnalysis {
            task: ti,
            schedulable: ok,
            outcome: None,
        })
        .collect();
    (verdicts, first_violation)
}

/// The first demand step at which the supply cannot cover the
/// cumulative demand in time, if any.
fn demand_violation<D: RequestBound, S: SupplyBound>(
    demand: &D,
    supply: &S,
    horizon: Duration,
) -> Option<Instant> {
    demand
        .steps_iter()
        .take_while(|t| *t <= horizon)
        .find(|&t| supply.service_time(demand.service_needed(t)) > t + TIME_EPS)
}

/// Core-level supply check: can the core's full capacity sustain the
/// budget allocations of the given components under the core's
/// policy?
///
/// Components are abstracted as periodic servers and checked against
/// a dedicated supply (a bounded-delay resource with bandwidth 1 and
/// no delay). Returns one verdict per component, in the given order.
pub fn core_supply_check(scenario: &Scenario, core: usize, components: &[usize]) -> Vec<bool> {
    let proc = Dedicated::new();
    let servers: Vec<(Service, Duration, Option<Priority>)> = components
        .iter()
        .map(|&ci| {
            let c = &scenario.components[ci];
            (c.budget, c.period, c.priority)
        })
        .collect();

    match scenario.cores[core].policy {
        Policy::FixedPriority => servers
            .iter()
            .enumerate()
            .map(|(pos, &(budget, period, prio))| {
                let interference = Aggregate::new(
                    servers
                        .iter()
                        .enumerate()
                        .filter(|&(hp_pos, &(_, _, hp_prio))| {
                            higher_priority(hp_prio, hp_pos, prio, pos)
                        })
                        .map(|(_, &(q, p, _))| RBF { wcet: q, period: p })
                        .collect(),
                );
                fixed_point::search(&proc, period, |r: Duration| {
                    budget + interference.service_needed(r)
                })
                .is_schedulable()
            })
            .collect(),
        Policy::EarliestDeadlineFirst => {
            let demand = Aggregate::new(
                servers
                    .iter()
                    .map(|&(q, p, _)| DBF { wcet: q, period: p })
                    .collect(),
            );
            let horizon = hyperperiod(servers.iter().map(|&(_, p, _)| p));
            let ok = demand_violation(&demand, &proc, horizon).is_none();
            vec![ok; servers.len()]
        }
    }
}
