//! The action phase: execute every live plan once.

use std::sync::Arc;

use apl_agent::{Action, Agent, Messenger, Plan, PlanFailure, PlanInterface, Trigger};
use tracing::debug;

use crate::{DeliberationError, DeliberationResult};

/// Executes all plans in order and collects their actions.
///
/// | Outcome                         | Plan            | Side effect                       |
/// |---------------------------------|-----------------|-----------------------------------|
/// | `Ok(_)`, not finished           | kept            | action collected                  |
/// | `Ok(_)`, finished               | removed         | action collected                  |
/// | `Err(Execution)`                | removed         | error raised as internal trigger  |
/// | `Err(Fatal)`                    | (agent ends)    | `DeliberationError::Fatal`        |
/// | goal no longer held             | removed         | not executed                      |
///
/// Plans adopted while the phase runs are executed from the next cycle on.
pub struct ExecutePlans;

impl ExecutePlans {
    pub fn execute(&self, agent: &Arc<Agent>, messenger: &dyn Messenger) -> DeliberationResult<Vec<Action>> {
        let mut survivors = Vec::new();
        let result = Self::run_plans(agent, messenger, agent.take_plans(), &mut survivors);
        agent.restore_plans(survivors);
        result
    }

    fn run_plans(
        agent:     &Arc<Agent>,
        messenger: &dyn Messenger,
        plans:     Vec<Plan>,
        survivors: &mut Vec<Plan>,
    ) -> DeliberationResult<Vec<Action>> {
        let mut iface = PlanInterface::new(agent, messenger);
        let mut actions = Vec::new();
        let mut plans = plans.into_iter();

        while let Some(mut plan) = plans.next() {
            if plan.goal().is_some_and(|g| !agent.has_goal(g)) {
                continue;
            }
            match plan.execute(&mut iface) {
                Ok(action) => {
                    actions.extend(action);
                    if !plan.is_finished() {
                        survivors.push(plan);
                    }
                }
                Err(PlanFailure::Execution(err)) => {
                    debug!(agent = %agent.id(), %err, "plan failed");
                    agent.add_internal_trigger(Trigger::plan_error(err))?;
                }
                Err(PlanFailure::Fatal(reason)) => {
                    survivors.extend(plans);
                    return Err(DeliberationError::Fatal { agent: agent.id(), reason });
                }
            }
        }
        Ok(actions)
    }
}
