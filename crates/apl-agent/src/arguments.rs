//! Fluent builder describing an agent before it is spawned.
//!
//! # Usage
//!
//! ```rust
//! use apl_agent::{AgentArguments, Goal, Plan, Trigger};
//!
//! struct Counter(u32);
//! struct Ping;
//!
//! let arguments = AgentArguments::new()
//!     .context(Counter(0))
//!     .external_scheme(|t: &Trigger, _: &apl_agent::ContextContainer| {
//!         t.downcast_ref::<Ping>().map(|_| Plan::run_once(|_| Ok(None)))
//!     })
//!     .initial_goal(Goal::persistent("stay alive"));
//!
//! // Arguments compose: shared behavior is built once and included.
//! let logging = AgentArguments::new().shutdown_plan(Plan::run_once(|_| Ok(None)));
//! let arguments = arguments.include(logging);
//! # let _ = arguments;
//! ```
//!
//! Arguments are consumed once, by [`Agent::new`][crate::Agent::new].

use std::any::Any;
use std::sync::Arc;

use crate::{ContextContainer, Goal, Plan, PlanScheme, PlanSchemeBase, TriggerCategory};

#[derive(Default)]
pub struct AgentArguments {
    pub(crate) schemes:        PlanSchemeBase,
    pub(crate) contexts:       ContextContainer,
    pub(crate) initial_plans:  Vec<Plan>,
    pub(crate) shutdown_plans: Vec<Plan>,
    pub(crate) initial_goals:  Vec<Goal>,
}

impl AgentArguments {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Plan schemes ──────────────────────────────────────────────────────

    /// Register a scheme for `category`.  Schemes are tried in registration
    /// order; the first to instantiate wins.
    pub fn scheme(mut self, category: TriggerCategory, scheme: impl PlanScheme) -> Self {
        self.schemes.push(category, Arc::new(scheme));
        self
    }

    pub fn goal_scheme(self, scheme: impl PlanScheme) -> Self {
        self.scheme(TriggerCategory::Goal, scheme)
    }

    pub fn external_scheme(self, scheme: impl PlanScheme) -> Self {
        self.scheme(TriggerCategory::External, scheme)
    }

    pub fn internal_scheme(self, scheme: impl PlanScheme) -> Self {
        self.scheme(TriggerCategory::Internal, scheme)
    }

    pub fn message_scheme(self, scheme: impl PlanScheme) -> Self {
        self.scheme(TriggerCategory::Message, scheme)
    }

    // ── State ─────────────────────────────────────────────────────────────

    /// Add a context.  A second context of the same type replaces the first.
    pub fn context<C: Any + Send + Sync>(mut self, context: C) -> Self {
        self.contexts.insert(context);
        self
    }

    /// A plan executed from the first cycle on.
    pub fn initial_plan(mut self, plan: Plan) -> Self {
        self.initial_plans.push(plan);
        self
    }

    /// A plan executed exactly once, after the agent's last cycle.
    pub fn shutdown_plan(mut self, plan: Plan) -> Self {
        self.shutdown_plans.push(plan);
        self
    }

    pub fn initial_goal(mut self, goal: Goal) -> Self {
        self.initial_goals.push(goal);
        self
    }

    /// Merge `other` into `self`.  `other`'s schemes, plans and goals come
    /// after ours; its contexts replace ours of the same type.
    pub fn include(mut self, other: AgentArguments) -> Self {
        self.schemes.extend(other.schemes);
        self.contexts.absorb(other.contexts);
        self.initial_plans.extend(other.initial_plans);
        self.shutdown_plans.extend(other.shutdown_plans);
        self.initial_goals.extend(other.initial_goals);
        self
    }
}
