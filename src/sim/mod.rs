/*! Hierarchical discrete-event simulation

The simulator executes one core at a time: virtual time advances
across a priority-ordered event queue, and at every event the
dispatch decision is recomputed at both levels — the core picks a
component among those with pending jobs and remaining budget, the
picked component picks a job under its own policy. Budget depletion
is what realizes the bounded-delay guarantee operationally: a
component whose budget ran dry is ineligible until its next
replenishment, even with ready jobs.

Execution accounting is slice-based. Whenever time advances, the
elapsed slice is first charged to the running job and its component's
budget; the end of a slice (completion or exhaustion) is itself a
scheduled event, and a slice end superseded by a preemption
degenerates to a plain scheduling point, so determinism never depends
on cancelling events.

Cores are logically independent event streams over the read-only
[Scenario]; this implementation runs them sequentially. */

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::policy::{Candidate, Priority};
use crate::scenario::Scenario;
use crate::time::{Duration, Instant, Service, TIME_EPS};

mod event;

pub use event::{Event, EventKind};

#[cfg(test)]
mod tests;

/// Aggregated per-task observations over one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStats {
    /// Task index into the scenario.
    pub task: usize,
    /// Number of jobs that completed within the horizon.
    pub completed_jobs: usize,
    /// Mean response time over completed jobs (0 if none completed).
    pub avg_response_time: Duration,
    /// Maximum response time over completed jobs (0 if none).
    pub max_response_time: Duration,
    /// Jobs that missed their deadline, completed or not.
    pub deadline_misses: usize,
}

impl TaskStats {
    /// True iff no job instance missed its deadline within the horizon.
    pub fn schedulable(&self) -> bool {
        self.deadline_misses == 0
    }
}

/// Aggregated per-component observations over one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentStats {
    /// Component index into the scenario.
    pub component: usize,
    /// Total budget consumed.
    pub consumed: Service,
    /// Fraction of the core spent in this component.
    pub utilization: f64,
    /// Times a dispatched job was displaced while still incomplete.
    pub preemptions: usize,
}

/// The observations of one simulated core.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreStats {
    /// Core index into the scenario.
    pub core: usize,
    pub tasks: Vec<TaskStats>,
    pub components: Vec<ComponentStats>,
}

/// Simulate every core of a (validated) scenario until the given
/// horizon, or the scenario's hyperperiod if none is given.
pub fn simulate(scenario: &Scenario, horizon: Option<Duration>) -> Vec<CoreStats> {
    let horizon = horizon.unwrap_or_else(|| scenario.hyperperiod());
    (0..scenario.cores.len())
        .map(|core| simulate_core(scenario, core, scenario.components_of(core), horizon))
        .collect()
}

/// Simulate the given components of one core until `horizon`.
///
/// The caller selects which components participate; rejected
/// components (invalid budget) are expected to be filtered out
/// beforehand.
pub fn simulate_core(
    scenario: &Scenario,
    core: usize,
    components: &[usize],
    horizon: Duration,
) -> CoreStats {
    CoreSim::new(scenario, core, components, horizon).run()
}

/// A single activation of a task.
#[derive(Debug, Clone)]
struct Job {
    id: usize,
    task: usize,
    /// Position of the owning component in the simulated set.
    comp_pos: usize,
    arrival: Instant,
    deadline: Instant,
    remaining: Service,
}

/// Supply budget state of one component instance.
#[derive(Debug, Clone)]
struct BudgetState {
    budget_left: Service,
    /// End of the current budget period; doubles as the component's
    /// EDF deadline at the core level.
    next_replenish: Instant,
    consumed: Service,
    preemptions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunningSlice {
    comp_pos: usize,
    job: usize,
}

/// Accumulator for one task's response-time observations.
#[derive(Debug, Clone, Default)]
struct ResponseAcc {
    completed: usize,
    sum: Duration,
    max: Duration,
    misses: usize,
}

struct CompCandidate {
    pos: usize,
    priority: Option<Priority>,
    deadline: Instant,
}

impl Candidate for CompCandidate {
    fn static_priority(&self) -> Option<Priority> {
        self.priority
    }

    fn deadline(&self) -> Instant {
        self.deadline
    }
}

struct JobCandidate {
    job: usize,
    priority: Option<Priority>,
    deadline: Instant,
}

impl Candidate for JobCandidate {
    fn static_priority(&self) -> Option<Priority> {
        self.priority
    }

    fn deadline(&self) -> Instant {
        self.deadline
    }
}

struct CoreSim<'a> {
    scenario: &'a Scenario,
    core: usize,
    components: Vec<usize>,
    horizon: Duration,
    now: Instant,
    queue: BinaryHeap<Reverse<Event>>,
    budgets: Vec<BudgetState>,
    jobs: Vec<Job>,
    next_job_id: usize,
    running: Option<RunningSlice>,
    responses: Vec<ResponseAcc>,
}

impl<'a> CoreSim<'a> {
    fn new(scenario: &'a Scenario, core: usize, components: &[usize], horizon: Duration) -> Self {
        let mut sim = CoreSim {
            scenario,
            core,
            components: components.to_vec(),
            horizon,
            now: 0.0,
            queue: BinaryHeap::new(),
            budgets: Vec::new(),
            jobs: Vec::new(),
            next_job_id: 0,
            running: None,
            responses: vec![ResponseAcc::default(); scenario.tasks.len()],
        };
        for (pos, &ci) in sim.components.iter().enumerate() {
            let comp = &scenario.components[ci];
            sim.budgets.push(BudgetState {
                budget_left: comp.budget,
                next_replenish: comp.period,
                consumed: 0.0,
                preemptions: 0,
            });
            sim.queue.push(Reverse(Event {
                at: comp.period,
                kind: EventKind::BudgetReplenish,
                subject: pos,
            }));
            for &ti in scenario.tasks_of(ci) {
                sim.queue.push(Reverse(Event {
                    at: 0.0,
                    kind: EventKind::JobArrival,
                    subject: ti,
                }));
            }
        }
        sim.queue.push(Reverse(Event {
            at: 0.0,
            kind: EventKind::SchedulingPoint,
            subject: 0,
        }));
        sim
    }

    fn run(mut self) -> CoreStats {
        loop {
            let next_at = match self.queue.peek() {
                Some(Reverse(ev)) if ev.at < self.horizon => ev.at,
                _ => break,
            };
            self.advance_to(next_at);
            // drain the whole batch of simultaneous events (the heap
            // yields them in the fixed per-kind order) before
            // revisiting the dispatch decision
            while let Some(&Reverse(ev)) = self.queue.peek() {
                if ev.at > next_at {
                    break;
                }
                self.queue.pop();
                self.handle(ev);
            }
            self.dispatch();
        }
        self.advance_to(self.horizon);
        self.finalize()
    }

    /// Charge the elapsed slice to the running job and its budget,
    /// then move virtual time to `t`.
    fn advance_to(&mut self, t: Instant) {
        if let Some(run) = self.running {
            let dt = t - self.now;
            if dt > 0.0 {
                {
                    let budget = &mut self.budgets[run.comp_pos];
                    budget.budget_left = (budget.budget_left - dt).max(0.0);
                    budget.consumed += dt;
                }
                let pos = self
                    .jobs
                    .iter()
                    .position(|j| j.id == run.job)
                    .expect("running job must be live");
                self.jobs[pos].remaining -= dt;
                if self.jobs[pos].remaining <= TIME_EPS {
                    self.complete(pos, t);
                    self.running = None;
                } else if self.budgets[run.comp_pos].budget_left <= TIME_EPS {
                    self.running = None;
                }
            }
        }
        self.now = t;
    }

    fn handle(&mut self, ev: Event) {
        match ev.kind {
            EventKind::BudgetReplenish => {
                let comp = &self.scenario.components[self.components[ev.subject]];
                let next = self.now + comp.period;
                let budget = &mut self.budgets[ev.subject];
                budget.budget_left = comp.budget;
                budget.next_replenish = next;
                self.queue.push(Reverse(Event {
                    at: next,
                    kind: EventKind::BudgetReplenish,
                    subject: ev.subject,
                }));
            }
            EventKind::JobArrival => {
                self.release(ev.subject);
            }
            // slice ends and explicit scheduling points carry no
            // state of their own; the charge happened in advance_to
            // and the dispatch pass follows the batch
            EventKind::JobCompletion | EventKind::BudgetExhausted | EventKind::SchedulingPoint => {}
        }
    }

    fn release(&mut self, task: usize) {
        let t = &self.scenario.tasks[task];
        let comp_pos = self
            .components
            .iter()
            .position(|&ci| ci == self.scenario.component_of(task))
            .expect("arrivals are only scheduled for simulated components");
        let job = Job {
            id: self.next_job_id,
            task,
            comp_pos,
            arrival: self.now,
            deadline: self.now + t.period,
            remaining: self.scenario.effective_wcet(task),
        };
        self.next_job_id += 1;
        self.queue.push(Reverse(Event {
            at: self.now + t.period,
            kind: EventKind::JobArrival,
            subject: task,
        }));
        if job.remaining <= TIME_EPS {
            // degenerate zero-cost job: completes upon release
            self.responses[task].completed += 1;
        } else {
            self.jobs.push(job);
        }
    }

    /// Record a completion at instant `t` and retire the job.
    fn complete(&mut self, pos: usize, t: Instant) {
        let job = self.jobs.remove(pos);
        let acc = &mut self.responses[job.task];
        let response = t - job.arrival;
        acc.completed += 1;
        acc.sum += response;
        acc.max = acc.max.max(response);
        if t > job.deadline + TIME_EPS {
            acc.misses += 1;
        }
    }

    /// Recompute the two-level dispatch decision and schedule the
    /// end of the chosen slice.
    fn dispatch(&mut self) {
        let chosen = self.choose();
        if let (Some(prev), Some(next)) = (self.running, chosen) {
            if prev != next && self.jobs.iter().any(|j| j.id == prev.job) {
                // the displaced job is still incomplete
                self.budgets[prev.comp_pos].preemptions += 1;
            }
        }
        self.running = chosen;

        if let Some(run) = chosen {
            let budget_left = self.budgets[run.comp_pos].budget_left;
            let remaining = self
                .jobs
                .iter()
                .find(|j| j.id == run.job)
                .map(|j| j.remaining)
                .expect("chosen job must be live");
            let (dur, kind, subject) = if remaining <= budget_left {
                (remaining, EventKind::JobCompletion, run.job)
            } else {
                (budget_left, EventKind::BudgetExhausted, run.comp_pos)
            };
            self.queue.push(Reverse(Event {
                at: self.now + dur,
                kind,
                subject,
            }));
        }
    }

    /// Core-level pick among eligible components, then task-level
    /// pick within the winner. Candidates are presented in
    /// declaration order, which realizes the tie-break rule.
    fn choose(&self) -> Option<RunningSlice> {
        let core_policy = self.scenario.cores[self.core].policy;
        let comp_candidates = self
            .components
            .iter()
            .enumerate()
            .filter(|&(pos, _)| {
                self.budgets[pos].budget_left > TIME_EPS
                    && self.jobs.iter().any(|j| j.comp_pos == pos)
            })
            .map(|(pos, &ci)| CompCandidate {
                pos,
                priority: self.scenario.components[ci].priority,
                deadline: self.budgets[pos].next_replenish,
            });
        let comp = core_policy.select_next(comp_candidates)?;

        let ci = self.components[comp.pos];
        let comp_policy = self.scenario.components[ci].policy;
        let mut job_candidates = Vec::new();
        for &ti in self.scenario.tasks_of(ci) {
            for job in self.jobs.iter().filter(|j| j.task == ti) {
                job_candidates.push(JobCandidate {
                    job: job.id,
                    priority: self.scenario.tasks[ti].priority,
                    deadline: job.deadline,
                });
            }
        }
        let job = comp_policy.select_next(job_candidates)?;

        Some(RunningSlice {
            comp_pos: comp.pos,
            job: job.job,
        })
    }

    fn finalize(mut self) -> CoreStats {
        // jobs still live at the horizon have missed iff their
        // deadline has already passed
        for job in &self.jobs {
            if job.deadline <= self.horizon + TIME_EPS {
                self.responses[job.task].misses += 1;
            }
        }

        let mut tasks = Vec::new();
        for &ci in &self.components {
            for &ti in self.scenario.tasks_of(ci) {
                let acc = &self.responses[ti];
                tasks.push(TaskStats {
                    task: ti,
                    completed_jobs: acc.completed,
                    avg_response_time: if acc.completed > 0 {
                        acc.sum / acc.completed as f64
                    } else {
                        0.0
                    },
                    max_response_time: acc.max,
                    deadline_misses: acc.misses,
                });
            }
        }

        let components = self
            .budgets
            .iter()
            .enumerate()
            .map(|(pos, b)| ComponentStats {
                component: self.components[pos],
                consumed: b.consumed,
                utilization: if self.horizon > 0.0 {
                    b.consumed / self.horizon
                } else {
                    0.0
                },
                preemptions: b.preemptions,
            })
            .collect();

        CoreStats {
            core: self.core,
            tasks,
            components,
        }
    }
}
