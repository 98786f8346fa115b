use assert_approx_eq::assert_approx_eq;

use crate::policy::Policy;
use crate::scenario::{Component, Core, Scenario, Task};
use crate::sim::{simulate, simulate_core, CoreStats, TaskStats};

fn task(
    name: &str,
    component: &str,
    wcet: f64,
    period: f64,
    priority: Option<u32>,
) -> Task {
    Task {
        name: name.into(),
        bcet: wcet,
        wcet,
        period,
        priority,
        component: component.into(),
    }
}

fn component(id: &str, policy: Policy, budget: f64, period: f64, priority: u32) -> Component {
    Component {
        id: id.into(),
        policy,
        budget,
        period,
        core: "core0".into(),
        priority: Some(priority),
    }
}

fn one_core(policy: Policy) -> Vec<Core> {
    vec![Core {
        id: "core0".into(),
        speed_factor: 1.0,
        policy,
    }]
}

fn stat<'a>(scenario: &Scenario, stats: &'a CoreStats, name: &str) -> &'a TaskStats {
    stats
        .tasks
        .iter()
        .find(|t| scenario.tasks[t.task].name == name)
        .unwrap()
}

#[test]
fn half_budget_component_meets_deadlines() {
    let s = Scenario::new(
        vec![
            task("a", "c0", 2.0, 10.0, Some(1)),
            task("b", "c0", 4.0, 20.0, Some(2)),
        ],
        vec![component("c0", Policy::FixedPriority, 5.0, 10.0, 1)],
        one_core(Policy::FixedPriority),
    )
    .unwrap();

    let stats = simulate_core(&s, 0, &[0], 20.0);

    // a runs 0-2 and 10-12; b runs 2-5, is cut off by budget
    // exhaustion, and finishes 12-13 after the replenishment
    let a = stat(&s, &stats, "a");
    assert_eq!(a.completed_jobs, 2);
    assert_approx_eq!(a.avg_response_time, 2.0);
    assert_approx_eq!(a.max_response_time, 2.0);
    assert_eq!(a.deadline_misses, 0);

    let b = stat(&s, &stats, "b");
    assert_eq!(b.completed_jobs, 1);
    assert_approx_eq!(b.avg_response_time, 13.0);
    assert_approx_eq!(b.max_response_time, 13.0);
    assert_eq!(b.deadline_misses, 0);

    assert_approx_eq!(stats.components[0].consumed, 8.0);
    assert_approx_eq!(stats.components[0].utilization, 0.4);
}

#[test]
fn overloaded_component_misses_deadline() {
    let s = Scenario::new(
        vec![
            task("a", "c0", 2.0, 10.0, Some(1)),
            task("b", "c0", 8.0, 20.0, Some(2)),
        ],
        vec![component("c0", Policy::FixedPriority, 5.0, 10.0, 1)],
        one_core(Policy::FixedPriority),
    )
    .unwrap();

    let stats = simulate_core(&s, 0, &[0], 20.0);

    let a = stat(&s, &stats, "a");
    assert_eq!(a.completed_jobs, 2);
    assert_eq!(a.deadline_misses, 0);

    // b accumulates only 3 + 3 units of service before its deadline
    // at the horizon
    let b = stat(&s, &stats, "b");
    assert_eq!(b.completed_jobs, 0);
    assert_eq!(b.deadline_misses, 1);
    assert!(!b.schedulable());

    assert_approx_eq!(stats.components[0].consumed, 10.0);
}

#[test]
fn edf_deadline_ties_go_to_earlier_declared_task() {
    let s = Scenario::new(
        vec![
            task("a", "c0", 2.0, 10.0, None),
            task("b", "c0", 4.0, 20.0, None),
        ],
        vec![component("c0", Policy::EarliestDeadlineFirst, 5.0, 10.0, 1)],
        one_core(Policy::FixedPriority),
    )
    .unwrap();

    let stats = simulate_core(&s, 0, &[0], 20.0);

    // at t = 10 the second job of a (deadline 20) ties with the
    // leftover job of b (deadline 20); a was declared first and runs
    // 10-12, so b finishes at 13
    let a = stat(&s, &stats, "a");
    assert_approx_eq!(a.max_response_time, 2.0);
    let b = stat(&s, &stats, "b");
    assert_eq!(b.completed_jobs, 1);
    assert_approx_eq!(b.max_response_time, 13.0);
    assert_eq!(b.deadline_misses, 0);
}

#[test]
fn fixed_priority_core_preempts_lower_priority_component() {
    let s = Scenario::new(
        vec![
            task("x", "c0", 2.0, 5.0, Some(1)),
            task("y", "c1", 6.0, 10.0, Some(1)),
        ],
        vec![
            component("c0", Policy::FixedPriority, 4.0, 10.0, 1),
            component("c1", Policy::FixedPriority, 6.0, 10.0, 2),
        ],
        one_core(Policy::FixedPriority),
    )
    .unwrap();

    let stats = simulate_core(&s, 0, &[0, 1], 10.0);

    // x runs 0-2 and 5-7 (its release at 5 preempts y); y fills the
    // gaps 2-5 and 7-10, finishing right at its deadline
    let x = stat(&s, &stats, "x");
    assert_eq!(x.completed_jobs, 2);
    assert_approx_eq!(x.max_response_time, 2.0);

    let y = stat(&s, &stats, "y");
    assert_eq!(y.completed_jobs, 1);
    assert_approx_eq!(y.max_response_time, 10.0);
    assert_eq!(y.deadline_misses, 0);

    assert_eq!(stats.components[0].preemptions, 0);
    assert_eq!(stats.components[1].preemptions, 1);
    assert_approx_eq!(stats.components[0].consumed, 4.0);
    assert_approx_eq!(stats.components[1].consumed, 6.0);
}

#[test]
fn edf_core_ranks_components_by_period_instance() {
    let s = Scenario::new(
        vec![
            task("a", "c0", 4.0, 20.0, Some(1)),
            task("b", "c1", 1.0, 5.0, Some(1)),
        ],
        vec![
            component("c0", Policy::FixedPriority, 5.0, 10.0, 1),
            component("c1", Policy::FixedPriority, 2.0, 5.0, 2),
        ],
        one_core(Policy::EarliestDeadlineFirst),
    )
    .unwrap();

    let stats = simulate_core(&s, 0, &[0, 1], 20.0);

    // c1's budget period ends at 5, before c0's at 10, so b runs
    // first despite c0 being declared first
    let b = stat(&s, &stats, "b");
    assert_eq!(b.completed_jobs, 4);
    assert_approx_eq!(b.max_response_time, 1.0);

    let a = stat(&s, &stats, "a");
    assert_eq!(a.completed_jobs, 1);
    assert_approx_eq!(a.max_response_time, 5.0);
}

#[test]
fn simulation_is_deterministic() {
    let s = Scenario::new(
        vec![
            task("a", "c0", 2.0, 10.0, Some(1)),
            task("b", "c0", 4.0, 20.0, Some(2)),
            task("c", "c1", 3.0, 8.0, None),
        ],
        vec![
            component("c0", Policy::FixedPriority, 5.0, 10.0, 1),
            component("c1", Policy::EarliestDeadlineFirst, 3.0, 8.0, 2),
        ],
        one_core(Policy::FixedPriority),
    )
    .unwrap();

    let first = simulate(&s, None);
    let second = simulate(&s, None);
    // bit-identical statistics, not merely approximately equal
    assert_eq!(first, second);
}

#[test]
fn full_budget_behaves_like_no_reservation_at_all() {
    let run = |budget: f64, period: f64| {
        let s = Scenario::new(
            vec![
                task("a", "c0", 2.0, 10.0, Some(1)),
                task("b", "c0", 4.0, 20.0, Some(2)),
            ],
            vec![component("c0", Policy::FixedPriority, budget, period, 1)],
            one_core(Policy::FixedPriority),
        )
        .unwrap();
        simulate_core(&s, 0, &[0], 40.0).tasks
    };

    // Q = P means the budget never runs dry; the replenishment
    // period is then unobservable
    let short = run(10.0, 10.0);
    let long = run(25.0, 25.0);
    assert_eq!(short, long);
}

#[test]
fn speed_scaling_stretches_execution() {
    let mut cores = one_core(Policy::FixedPriority);
    cores[0].speed_factor = 0.5;
    let s = Scenario::new(
        vec![task("a", "c0", 2.0, 10.0, Some(1))],
        vec![component("c0", Policy::FixedPriority, 10.0, 10.0, 1)],
        cores,
    )
    .unwrap();

    let stats = simulate_core(&s, 0, &[0], 10.0);
    // a half-speed core doubles the effective execution time
    assert_approx_eq!(stat(&s, &stats, "a").max_response_time, 4.0);
}
