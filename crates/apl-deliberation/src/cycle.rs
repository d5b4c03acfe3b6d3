//! One full sense→reason→act pass over an agent.

use std::sync::Arc;

use apl_agent::{Action, Agent, Messenger};

use crate::{
    ApplyExternalTriggers, ApplyGoals, ApplyInternalTriggers, ApplyMessages, DeliberationResult,
    DeliberationStep, ExecutePlans,
};

/// An ordered list of deliberation steps followed by the action phase.
///
/// The action phase always runs last.  Steps added with
/// [`with_step`](Self::with_step) run after the standard four, in the order
/// they were added.
pub struct DeliberationCycle {
    steps:  Vec<Box<dyn DeliberationStep>>,
    action: ExecutePlans,
}

impl Default for DeliberationCycle {
    fn default() -> Self {
        Self::standard()
    }
}

impl DeliberationCycle {
    /// Goals, external triggers, internal triggers, messages, then plans.
    pub fn standard() -> Self {
        Self {
            steps:  vec![
                Box::new(ApplyGoals),
                Box::new(ApplyExternalTriggers),
                Box::new(ApplyInternalTriggers),
                Box::new(ApplyMessages),
            ],
            action: ExecutePlans,
        }
    }

    pub fn with_step(mut self, step: impl DeliberationStep) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn nof_steps(&self) -> usize {
        self.steps.len() + 1
    }

    /// Run every step, then the action phase.  The first step error aborts
    /// the cycle.
    pub fn run(&self, agent: &Arc<Agent>, messenger: &dyn Messenger) -> DeliberationResult<Vec<Action>> {
        for step in &self.steps {
            step.execute(agent)?;
        }
        self.action.execute(agent, messenger)
    }
}
