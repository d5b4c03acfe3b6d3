//! The four sense/reason phases.  Each mutates agent state only.

use std::sync::Arc;

use apl_agent::{Agent, Trigger, TriggerCategory};

use crate::{DeliberationResult, apply};

/// One phase of the deliberation cycle.
///
/// Steps run on the thread executing the agent's cycle.  A returned error is
/// fatal to the agent.
pub trait DeliberationStep: Send + Sync + 'static {
    fn execute(&self, agent: &Arc<Agent>) -> DeliberationResult<()>;
}

/// Drop achieved goals, then match the remaining goals.
pub struct ApplyGoals;

impl DeliberationStep for ApplyGoals {
    fn execute(&self, agent: &Arc<Agent>) -> DeliberationResult<()> {
        agent.clear_achieved_goals();
        let goals = agent.goals().into_iter().map(Trigger::Goal).collect();
        apply(agent, TriggerCategory::Goal, goals);
        Ok(())
    }
}

pub struct ApplyExternalTriggers;

impl DeliberationStep for ApplyExternalTriggers {
    fn execute(&self, agent: &Arc<Agent>) -> DeliberationResult<()> {
        apply(agent, TriggerCategory::External, agent.take_external_triggers());
        Ok(())
    }
}

pub struct ApplyInternalTriggers;

impl DeliberationStep for ApplyInternalTriggers {
    fn execute(&self, agent: &Arc<Agent>) -> DeliberationResult<()> {
        apply(agent, TriggerCategory::Internal, agent.take_internal_triggers());
        Ok(())
    }
}

pub struct ApplyMessages;

impl DeliberationStep for ApplyMessages {
    fn execute(&self, agent: &Arc<Agent>) -> DeliberationResult<()> {
        let messages = agent.drain_messages().into_iter().map(Trigger::Message).collect();
        apply(agent, TriggerCategory::Message, messages);
        Ok(())
    }
}
