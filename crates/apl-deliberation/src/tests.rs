//! Unit tests for apl-deliberation.

use std::sync::Arc;

use apl_agent::{
    Action, Agent, AgentArguments, ContextContainer, DefaultMessenger, Plan, Trigger,
    TriggerCategory, TriggerInterceptor,
};
use apl_core::{AgentId, Payload};

use crate::DeliberationCycle;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A run-once plan emitting `label`.
fn emit(label: &'static str) -> Plan {
    Plan::run_once(move |_| Ok(Some(Payload::new(label))))
}

fn labels(actions: &[Action]) -> Vec<&'static str> {
    actions.iter().map(|a| *a.downcast_ref::<&'static str>().unwrap()).collect()
}

fn run(agent: &Arc<Agent>) -> Vec<&'static str> {
    let messenger = DefaultMessenger::new();
    labels(&DeliberationCycle::standard().run(agent, &messenger).unwrap())
}

fn on<T: 'static>(label: &'static str) -> impl Fn(&Trigger, &ContextContainer) -> Option<Plan> + Send + Sync + 'static {
    move |t, _| t.downcast_ref::<T>().map(|_| emit(label))
}

struct Ping;
struct Pong;

// ── Apply ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod apply_tests {
    use super::*;

    #[test]
    fn consuming_interceptor_hides_trigger_from_schemes() {
        let agent = Agent::new(AgentId(0), AgentArguments::new().external_scheme(on::<Ping>("scheme")));
        agent.adopt_interceptor(TriggerCategory::External, TriggerInterceptor::new(true, on::<Ping>("interceptor")));
        agent.add_external_trigger(Trigger::external(Ping)).unwrap();

        assert_eq!(run(&agent), vec!["interceptor"]);
        assert!(agent.interceptors(TriggerCategory::External).is_empty());
    }

    #[test]
    fn observer_runs_before_schemes_and_keeps_trigger() {
        let agent = Agent::new(AgentId(0), AgentArguments::new().external_scheme(on::<Ping>("scheme")));
        agent.adopt_interceptor(TriggerCategory::External, TriggerInterceptor::new(false, on::<Ping>("observer")));
        agent.add_external_trigger(Trigger::external(Ping)).unwrap();

        assert_eq!(run(&agent), vec!["observer", "scheme"]);
        assert!(agent.interceptors(TriggerCategory::External).is_empty());
    }

    #[test]
    fn unmatched_interceptor_stays() {
        let agent = Agent::new(AgentId(0), AgentArguments::new());
        agent.adopt_interceptor(TriggerCategory::External, TriggerInterceptor::new(true, on::<Pong>("pong")));
        agent.add_external_trigger(Trigger::external(Ping)).unwrap();

        assert!(run(&agent).is_empty());
        assert_eq!(agent.interceptors(TriggerCategory::External).len(), 1);
    }

    #[test]
    fn interceptor_fires_once_per_pass() {
        let agent = Agent::new(AgentId(0), AgentArguments::new());
        agent.adopt_interceptor(TriggerCategory::External, TriggerInterceptor::new(true, on::<Ping>("first")));
        agent.add_external_trigger(Trigger::external(Ping)).unwrap();
        agent.add_external_trigger(Trigger::external(Ping)).unwrap();

        assert_eq!(run(&agent), vec!["first"]);
    }

    #[test]
    fn first_matching_scheme_wins() {
        let arguments = AgentArguments::new()
            .external_scheme(on::<Pong>("pong"))
            .external_scheme(on::<Ping>("a"))
            .external_scheme(on::<Ping>("b"));
        let agent = Agent::new(AgentId(0), arguments);
        agent.add_external_trigger(Trigger::external(Ping)).unwrap();

        assert_eq!(run(&agent), vec!["a"]);
    }

    #[test]
    fn unmatched_triggers_are_discarded() {
        let agent = Agent::new(AgentId(0), AgentArguments::new());
        agent.add_external_trigger(Trigger::external(Ping)).unwrap();
        agent.receive_message(Arc::new(apl_agent::Message::new(Pong))).unwrap();
        run(&agent);
        assert!(agent.take_external_triggers().is_empty());
        assert!(agent.drain_messages().is_empty());
    }

    #[test]
    fn each_category_uses_its_own_schemes() {
        let arguments = AgentArguments::new()
            .internal_scheme(on::<Ping>("internal"))
            .message_scheme(on::<Ping>("message"));
        let agent = Agent::new(AgentId(0), arguments);
        agent.receive_message(Arc::new(apl_agent::Message::new(Ping))).unwrap();
        agent.add_internal_trigger(Trigger::internal(Ping)).unwrap();
        agent.add_external_trigger(Trigger::external(Ping)).unwrap();

        assert_eq!(run(&agent), vec!["internal", "message"]);
    }
}

// ── Goals ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod goal_tests {
    use apl_agent::Goal;

    use super::*;

    fn goal_scheme(t: &Trigger, _: &ContextContainer) -> Option<Plan> {
        t.as_goal().map(|_| Plan::new(|_| Ok(Some(Payload::new("pursue")))))
    }

    #[test]
    fn pursued_goal_gets_one_plan() {
        let goal = Goal::persistent("g");
        let arguments = AgentArguments::new().goal_scheme(goal_scheme).initial_goal(goal.clone());
        let agent = Agent::new(AgentId(0), arguments);

        assert_eq!(run(&agent), vec!["pursue"]);
        assert!(goal.is_pursued());
        assert_eq!(run(&agent), vec!["pursue"]);
        assert_eq!(agent.nof_plans(), 1);
    }

    #[test]
    fn dropped_goal_stops_plan_and_can_be_readopted() {
        let goal = Goal::persistent("g");
        let arguments = AgentArguments::new().goal_scheme(goal_scheme).initial_goal(goal.clone());
        let agent = Agent::new(AgentId(0), arguments);
        run(&agent);

        agent.drop_goal(&goal);
        assert!(run(&agent).is_empty());
        assert_eq!(agent.nof_plans(), 0);

        agent.adopt_goal(goal.clone()).unwrap();
        assert_eq!(run(&agent), vec!["pursue"]);
        assert!(goal.is_pursued());
    }

    #[test]
    fn consuming_goal_interceptor_keeps_goal() {
        let goal = Goal::persistent("g");
        let arguments = AgentArguments::new().goal_scheme(goal_scheme).initial_goal(goal.clone());
        let agent = Agent::new(AgentId(0), arguments);
        agent.adopt_interceptor(
            TriggerCategory::Goal,
            TriggerInterceptor::new(true, |t: &Trigger, _: &ContextContainer| {
                t.as_goal().map(|_| emit("intercepted"))
            }),
        );

        assert_eq!(run(&agent), vec!["intercepted", "pursue"]);
        assert!(agent.has_goal(&goal));
    }

    #[test]
    fn achieved_goal_is_dropped_before_matching() {
        struct Done;
        let goal = Goal::new("g", |c| c.contains::<Done>());
        let arguments = AgentArguments::new()
            .goal_scheme(goal_scheme)
            .initial_goal(goal.clone())
            .context(Done);
        let agent = Agent::new(AgentId(0), arguments);

        assert!(run(&agent).is_empty());
        assert!(!agent.has_goal(&goal));
        assert!(!goal.is_pursued());
    }
}

// ── Action phase ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod execute_tests {
    use apl_agent::{PlanExecutionError, PlanFailure};

    use super::*;
    use crate::DeliberationError;

    #[test]
    fn actions_follow_plan_order() {
        let arguments = AgentArguments::new()
            .initial_plan(emit("a"))
            .initial_plan(Plan::run_once(|_| Ok(None)))
            .initial_plan(emit("b"))
            .initial_plan(emit("c"));
        let agent = Agent::new(AgentId(0), arguments);
        assert_eq!(run(&agent), vec!["a", "b", "c"]);
        assert_eq!(agent.nof_plans(), 0);
    }

    #[test]
    fn plans_adopted_during_execution_run_next_cycle() {
        let parent = Plan::run_once(|iface| {
            iface.adopt_plan(emit("child"));
            Ok(Some(Payload::new("parent")))
        });
        let agent = Agent::new(AgentId(0), AgentArguments::new().initial_plan(parent));
        assert_eq!(run(&agent), vec!["parent"]);
        assert_eq!(run(&agent), vec!["child"]);
    }

    #[test]
    fn recoverable_error_becomes_internal_trigger() {
        let failing = Plan::new(|_| Err(PlanExecutionError::new("bad input").into()));
        let on_error = |t: &Trigger, _: &ContextContainer| {
            t.as_plan_error().map(|e| {
                let message = e.message().to_owned();
                Plan::run_once(move |_| Ok(Some(Payload::new(message))))
            })
        };
        let arguments = AgentArguments::new().initial_plan(failing).internal_scheme(on_error);
        let agent = Agent::new(AgentId(0), arguments);
        let messenger = DefaultMessenger::new();
        let cycle = DeliberationCycle::standard();

        assert!(cycle.run(&agent, &messenger).unwrap().is_empty());
        assert_eq!(agent.nof_plans(), 0);

        let actions = cycle.run(&agent, &messenger).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].downcast_ref::<String>().map(String::as_str), Some("bad input"));
    }

    #[test]
    fn undeliverable_message_is_recoverable() {
        let plan = Plan::run_once(|iface| {
            iface.send_message(AgentId(42), "hello")?;
            Ok(None)
        });
        let agent = Agent::new(AgentId(0), AgentArguments::new().initial_plan(plan));
        assert!(run(&agent).is_empty());
        let errors = agent.take_internal_triggers();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_plan_error().is_some());
    }

    #[test]
    fn fatal_failure_aborts_cycle() {
        let arguments = AgentArguments::new()
            .initial_plan(Plan::run_once(|_| Err(PlanFailure::Fatal("broken".into()))))
            .initial_plan(emit("never"));
        let agent = Agent::new(AgentId(7), arguments);
        let messenger = DefaultMessenger::new();

        match DeliberationCycle::standard().run(&agent, &messenger) {
            Err(DeliberationError::Fatal { agent: id, reason }) => {
                assert_eq!(id, AgentId(7));
                assert_eq!(reason, "broken");
            }
            other => panic!("expected fatal error, got {other:?}"),
        }
    }

    #[test]
    fn missing_concurrency_context_is_fatal() {
        let plan = Plan::run_once(|iface| {
            iface.notify_when_finished(|| (), Trigger::internal)?;
            Ok(None)
        });
        let agent = Agent::new(AgentId(1), AgentArguments::new().initial_plan(plan));
        let messenger = DefaultMessenger::new();
        assert!(matches!(
            DeliberationCycle::standard().run(&agent, &messenger),
            Err(DeliberationError::Fatal { .. })
        ));
    }
}

// ── Full cycle ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cycle_tests {
    use apl_agent::{Goal, LifecycleState};
    use parking_lot::Mutex;

    use super::*;
    use crate::{DeliberationResult, DeliberationStep};

    struct Counter(u32);

    #[test]
    fn counter_goal_reached_then_agent_sleeps() {
        let goal = Goal::new("count to 3", |c| c.get::<Counter>().is_some_and(|n| n.0 >= 3));
        let scheme = |t: &Trigger, _: &ContextContainer| {
            t.as_goal().map(|_| {
                Plan::new(|iface| {
                    if let Some(mut counter) = iface.context_mut::<Counter>() {
                        counter.0 += 1;
                    }
                    Ok(None)
                })
            })
        };
        let arguments = AgentArguments::new()
            .context(Counter(0))
            .goal_scheme(scheme)
            .initial_goal(goal.clone());
        let agent = Agent::new(AgentId(0), arguments);
        agent.invoke();

        for expected in 1..=3 {
            run(&agent);
            assert_eq!(agent.contexts().get::<Counter>().unwrap().0, expected);
            assert!(!agent.check_sleeping());
        }
        run(&agent);
        assert_eq!(agent.contexts().get::<Counter>().unwrap().0, 3);
        assert!(!agent.has_goal(&goal));
        assert!(agent.check_sleeping());
        assert_eq!(agent.lifecycle(), LifecycleState::Waiting);
    }

    #[test]
    fn custom_steps_run_before_plans() {
        struct Recorder(Arc<Mutex<Vec<usize>>>);
        impl DeliberationStep for Recorder {
            fn execute(&self, agent: &Arc<Agent>) -> DeliberationResult<()> {
                self.0.lock().push(agent.nof_plans());
                Ok(())
            }
        }
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cycle = DeliberationCycle::standard().with_step(Recorder(Arc::clone(&seen)));
        assert_eq!(cycle.nof_steps(), 6);

        let agent = Agent::new(AgentId(0), AgentArguments::new().initial_plan(emit("x")));
        let messenger = DefaultMessenger::new();
        cycle.run(&agent, &messenger).unwrap();
        assert_eq!(*seen.lock(), vec![1]);
    }
}
