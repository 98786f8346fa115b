/*! Compositional schedulability analysis and simulation of two-level
hierarchical real-time systems

A [Scenario][scenario::Scenario] describes periodic tasks grouped
into components, components with periodic budget allocations assigned
to cores, and cores running at different relative speeds. Each
component's allocation is abstracted into a bounded-delay resource
interface ([supply::BoundedDelay]), and two independent verifiers
judge every task against it:

- the analytic engine ([analysis]) — iterative response-time analysis
  for fixed-priority components and demand-bound checks for EDF
  components, both inverted through the supply-bound function;
- the discrete-event simulator ([sim]) — nested RM/EDF dispatching
  with budget depletion and replenishment.

[report::evaluate] runs both and folds their verdicts into one record
per task and component. The analytic engine is conservative: whatever
it proves schedulable does not miss a deadline in simulation, while
the converse need not hold near the horizon boundary. */

pub mod analysis;
pub mod demand;
pub mod error;
pub mod fixed_point;
pub mod policy;
pub mod report;
pub mod scenario;
pub mod sim;
pub mod supply;
pub mod time;

#[cfg(test)]
mod tests {
    use crate::policy::Policy;
    use crate::report::{evaluate, EvalConfig};
    use crate::scenario::{Component, Core, Scenario, Task};
    use crate::supply::DelayModel;
    use assert_approx_eq::assert_approx_eq;

    /// Running example: one RM core at full speed, one RM component
    /// with half the bandwidth (Q = 5,
    /// P = 10), and two tasks.
    fn half_bandwidth_scenario(b_wcet: f64) -> Scenario {
        Scenario::new(
            vec![
                Task {
                    name: "a".into(),
                    bcet: 2.0,
                    wcet: 2.0,
                    period: 10.0,
                    priority: Some(1),
                    component: "c0".into(),
                },
                Task {
                    name: "b".into(),
                    bcet: b_wcet,
                    wcet: b_wcet,
                    period: 20.0,
                    priority: Some(2),
                    component: "c0".into(),
                },
            ],
            vec![Component {
                id: "c0".into(),
                policy: Policy::FixedPriority,
                budget: 5.0,
                period: 10.0,
                core: "core0".into(),
                priority: Some(1),
            }],
            vec![Core {
                id: "core0".into(),
                speed_factor: 1.0,
                policy: Policy::FixedPriority,
            }],
        )
        .unwrap()
    }

    #[test]
    fn half_bandwidth_example_end_to_end() {
        let report = evaluate(
            &half_bandwidth_scenario(4.0),
            &EvalConfig {
                delay_model: DelayModel::Slack,
                horizon: None,
            },
        );

        let c = &report.components[0];
        let interface = c.interface.unwrap();
        assert_approx_eq!(interface.bandwidth, 0.5);
        assert_approx_eq!(interface.delay, 5.0);

        // no instance misses within the hyperperiod
        assert!(report.tasks.iter().all(|t| t.simulated_schedulable));
        // the higher-priority task is also analytically proven
        assert!(report.tasks[0].analytic_schedulable);
        assert_approx_eq!(report.tasks[0].analytic_response_time.unwrap(), 9.0);
    }

    #[test]
    fn overloaded_example_fails_both_engines() {
        let report = evaluate(
            &half_bandwidth_scenario(8.0),
            &EvalConfig {
                delay_model: DelayModel::Slack,
                horizon: None,
            },
        );

        let b = &report.tasks[1];
        assert!(!b.analytic_schedulable);
        assert!(!b.simulated_schedulable);
        assert!(!report.components[0].schedulable);
    }

    #[test]
    fn repeated_evaluation_is_idempotent() {
        let scenario = half_bandwidth_scenario(4.0);
        let config = EvalConfig::default();
        assert_eq!(evaluate(&scenario, &config), evaluate(&scenario, &config));
    }
}
