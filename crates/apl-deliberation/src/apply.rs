//! The apply algorithm: match a trigger snapshot against one category's
//! interceptors, then its plan schemes.
//!
//! 1. **Interceptor pass.**  For each interceptor in list order, scan the
//!    triggers until one instantiates a plan.  On a hit the interceptor leaves
//!    its list, the plan is adopted, and a consuming interceptor also removes
//!    the trigger (goals are never removed).  Interceptors without a hit stay.
//! 2. **Scheme pass.**  For each remaining trigger, the first scheme that
//!    instantiates wins.  Goals already pursued are skipped; a goal that gets
//!    a plan is flagged pursued and attached to it.  Unmatched triggers are
//!    dropped.

use std::sync::Arc;

use apl_agent::{Agent, Trigger, TriggerCategory, TriggerInterceptor};
use tracing::trace;

/// Apply `triggers` on `agent`'s `category` lists.  Returns the number of
/// plans adopted.
pub fn apply(agent: &Agent, category: TriggerCategory, mut triggers: Vec<Trigger>) -> usize {
    if triggers.is_empty() {
        return 0;
    }
    let contexts = agent.contexts();
    let mut adopted = 0;

    // Snapshot: interceptors fire at most once per pass.
    let interceptors: Vec<Arc<TriggerInterceptor>> = agent.interceptors(category).clone();
    for interceptor in interceptors {
        let hit = triggers
            .iter()
            .enumerate()
            .find_map(|(pos, t)| interceptor.instantiate(t, &contexts).map(|plan| (pos, plan)));
        let Some((pos, plan)) = hit else {
            continue;
        };
        agent.remove_interceptor(category, &interceptor);
        if interceptor.is_consuming() && !triggers[pos].is_goal() {
            triggers.remove(pos);
        }
        agent.adopt_plan(plan);
        adopted += 1;
    }

    for trigger in &triggers {
        let goal = trigger.as_goal();
        if goal.is_some_and(|g| g.is_pursued()) {
            continue;
        }
        let plan = agent
            .schemes(category)
            .iter()
            .find_map(|scheme| scheme.instantiate(trigger, &contexts));
        let Some(plan) = plan else {
            continue;
        };
        let plan = match goal {
            Some(goal) => {
                goal.set_pursued(true);
                plan.with_goal(goal.clone())
            }
            None => plan,
        };
        agent.adopt_plan(plan);
        adopted += 1;
    }

    if adopted > 0 {
        trace!(agent = %agent.id(), ?category, adopted, "plans adopted");
    }
    adopted
}
