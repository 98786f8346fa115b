/*! The static system description: tasks grouped into components,
components assigned to cores.

A [Scenario] is the unit of input to both the analytic engine
([analysis][crate::analysis]) and the simulator ([sim][crate::sim]).
It is immutable after construction and may be shared freely across
concurrent per-core simulations. Construction resolves every
cross-reference to an index; declaration order is preserved because
it defines every tie-break downstream. */

use crate::error::Error;
use crate::policy::{Policy, Priority};
use crate::time::{Duration, Service};

/// A periodic task with an implicit deadline equal to its period.
/// Execution times are nominal, i.e., before speed scaling.
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique task name.
    pub name: String,
    /// Best-case execution time.
    pub bcet: Service,
    /// Worst-case execution time.
    pub wcet: Service,
    /// Period and implicit relative deadline.
    pub period: Duration,
    /// Static priority; meaningful only if the owning component
    /// schedules by fixed priority.
    pub priority: Option<Priority>,
    /// Id of the owning component.
    pub component: String,
}

/// A component: a set of tasks sharing a periodic budget allocation
/// of `budget` time units every `period` time units on its core.
#[derive(Debug, Clone)]
pub struct Component {
    /// Unique component id.
    pub id: String,
    /// How the component schedules its own tasks.
    pub policy: Policy,
    /// Guaranteed budget Q per period.
    pub budget: Service,
    /// Replenishment period P.
    pub period: Duration,
    /// Id of the core the component is assigned to.
    pub core: String,
    /// Static priority; meaningful only if the core schedules by
    /// fixed priority.
    pub priority: Option<Priority>,
}

/// A processor core.
#[derive(Debug, Clone)]
pub struct Core {
    /// Unique core id.
    pub id: String,
    /// Relative speed; execution times scale by `1 / speed_factor`.
    pub speed_factor: f64,
    /// How the core schedules its components.
    pub policy: Policy,
}

impl Core {
    /// Convert a nominal execution time to the effective execution
    /// time on this core.
    ///
    /// The speed factor is validated during evaluation, not here.
    pub fn effective(&self, wcet: Service) -> Service {
        wcet / self.speed_factor
    }
}

/// A fully cross-referenced system description.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub tasks: Vec<Task>,
    pub components: Vec<Component>,
    pub cores: Vec<Core>,
    task_component: Vec<usize>,
    component_core: Vec<usize>,
    tasks_of_component: Vec<Vec<usize>>,
    components_of_core: Vec<Vec<usize>>,
}

impl Scenario {
    /// Build a scenario from its raw records, resolving all
    /// cross-references.
    ///
    /// Fails with [Error::UnresolvedReference] if a task names a
    /// nonexistent component or a component a nonexistent core, and
    /// with [Error::MissingPriority] if a fixed-priority parent has
    /// a child without a static priority. Both reject the scenario
    /// wholesale. Budget and speed-factor validity are checked
    /// per-entity during evaluation instead.
    pub fn new(
        tasks: Vec<Task>,
        components: Vec<Component>,
        cores: Vec<Core>,
    ) -> Result<Self, Error> {
        let mut component_core = Vec::with_capacity(components.len());
        let mut components_of_core = vec![Vec::new(); cores.len()];
        for (ci, comp) in components.iter().enumerate() {
            let core = cores
                .iter()
                .position(|c| c.id == comp.core)
                .ok_or_else(|| Error::UnresolvedReference {
                    kind: "component",
                    name: comp.id.clone(),
                    referenced_kind: "core",
                    referenced: comp.core.clone(),
                })?;
            if cores[core].policy == Policy::FixedPriority && comp.priority.is_none() {
                return Err(Error::MissingPriority {
                    kind: "component",
                    name: comp.id.clone(),
                });
            }
            component_core.push(core);
            components_of_core[core].push(ci);
        }

        let mut task_component = Vec::with_capacity(tasks.len());
        let mut tasks_of_component = vec![Vec::new(); components.len()];
        for (ti, task) in tasks.iter().enumerate() {
            let comp = components
                .iter()
                .position(|c| c.id == task.component)
                .ok_or_else(|| Error::UnresolvedReference {
                    kind: "task",
                    name: task.name.clone(),
                    referenced_kind: "component",
                    referenced: task.component.clone(),
                })?;
            if components[comp].policy == Policy::FixedPriority && task.priority.is_none() {
                return Err(Error::MissingPriority {
                    kind: "task",
                    name: task.name.clone(),
                });
            }
            task_component.push(comp);
            tasks_of_component[comp].push(ti);
        }

        Ok(Scenario {
            tasks,
            components,
            cores,
            task_component,
            component_core,
            tasks_of_component,
            components_of_core,
        })
    }

    /// Index of the component owning the given task.
    pub fn component_of(&self, task: usize) -> usize {
        self.task_component[task]
    }

    /// Index of the core hosting the given component.
    pub fn core_of(&self, component: usize) -> usize {
        self.component_core[component]
    }

    /// Tasks of a component, in declaration order.
    pub fn tasks_of(&self, component: usize) -> &[usize] {
        &self.tasks_of_component[component]
    }

    /// Components of a core, in declaration order.
    pub fn components_of(&self, core: usize) -> &[usize] {
        &self.components_of_core[core]
    }

    /// The given task's WCET scaled to its core's speed.
    pub fn effective_wcet(&self, task: usize) -> Service {
        let core = self.core_of(self.component_of(task));
        self.cores[core].effective(self.tasks[task].wcet)
    }

    /// Validity of the given component's budget allocation.
    pub fn check_budget(&self, component: usize) -> Result<(), Error> {
        let comp = &self.components[component];
        if comp.budget > comp.period {
            Err(Error::InvalidBudget {
                component: comp.id.clone(),
                budget: comp.budget,
                period: comp.period,
            })
        } else {
            Ok(())
        }
    }

    /// Validity of the given core's speed factor.
    pub fn check_speed(&self, core: usize) -> Result<(), Error> {
        let c = &self.cores[core];
        if c.speed_factor > 0.0 {
            Ok(())
        } else {
            Err(Error::InvalidSpeedFactor {
                core: c.id.clone(),
                speed_factor: c.speed_factor,
            })
        }
    }

    /// The hyperperiod of all task periods, the default horizon for
    /// simulation and demand analysis.
    pub fn hyperperiod(&self) -> Duration {
        crate::time::hyperperiod(self.tasks.iter().map(|t| t.period))
    }
}
