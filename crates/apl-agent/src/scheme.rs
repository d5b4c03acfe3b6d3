//! Plan schemes: declarative rules mapping a trigger to a plan.

use std::sync::Arc;

use crate::{ContextContainer, Plan, Trigger, TriggerCategory};

/// A rule that may instantiate a [`Plan`] for a trigger.
///
/// Implemented for every `Fn(&Trigger, &ContextContainer) -> Option<Plan>`
/// closure, so most schemes are written inline:
///
/// ```rust
/// use apl_agent::{Plan, PlanScheme, Trigger};
///
/// struct Hello;
///
/// let scheme = |trigger: &Trigger, _: &apl_agent::ContextContainer| {
///     trigger
///         .downcast_ref::<Hello>()
///         .map(|_| Plan::run_once(|_| Ok(None)))
/// };
/// assert!(scheme.instantiate(&Trigger::external(Hello), &Default::default()).is_some());
/// ```
///
/// # Thread safety
///
/// Schemes are shared by every cycle of the owning agent and may run on any
/// worker thread, so implementations must be `Send + Sync`.  Schemes are
/// pure: they see contexts read-only and must not touch the agent.
pub trait PlanScheme: Send + Sync + 'static {
    /// Return `Some(plan)` to fire, `None` to pass.
    fn instantiate(&self, trigger: &Trigger, contexts: &ContextContainer) -> Option<Plan>;
}

impl<F> PlanScheme for F
where
    F: Fn(&Trigger, &ContextContainer) -> Option<Plan> + Send + Sync + 'static,
{
    fn instantiate(&self, trigger: &Trigger, contexts: &ContextContainer) -> Option<Plan> {
        self(trigger, contexts)
    }
}

/// The four ordered, immutable scheme lists of one agent.
#[derive(Default, Clone)]
pub struct PlanSchemeBase {
    lists: [Vec<Arc<dyn PlanScheme>>; 4],
}

impl PlanSchemeBase {
    pub(crate) fn push(&mut self, category: TriggerCategory, scheme: Arc<dyn PlanScheme>) {
        self.lists[category.index()].push(scheme);
    }

    pub(crate) fn extend(&mut self, other: PlanSchemeBase) {
        for (mine, theirs) in self.lists.iter_mut().zip(other.lists) {
            mine.extend(theirs);
        }
    }

    /// Schemes for `category`, in registration order.
    pub fn schemes(&self, category: TriggerCategory) -> &[Arc<dyn PlanScheme>] {
        &self.lists[category.index()]
    }
}
