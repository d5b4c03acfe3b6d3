//! Per-agent mutable state: trigger queues, goals, plans, interceptors,
//! contexts and the lifecycle state machine.
//!
//! # Locking
//!
//! Every container has its own `parking_lot::Mutex`; there is no agent-wide
//! lock.  Producers (any thread) lock one container, append, and then flip the
//! lifecycle while still holding it.  [`Agent::check_sleeping`] takes all
//! containers in a fixed order before the lifecycle:
//!
//! ```text
//! external → internal → goals → plans → messages → lifecycle
//! ```
//!
//! so "check-then-sleep" and "append-then-wake" can never interleave, and a
//! wake is never lost.
//!
//! # Lifecycle
//!
//! | State       | Awake | Entered by                                       |
//! |-------------|-------|--------------------------------------------------|
//! | `Initiated` | yes   | construction                                     |
//! | `Active`    | yes   | [`Agent::invoke`], or a producer waking the agent |
//! | `Waiting`   | no    | [`Agent::check_sleeping`] with no pending work   |
//! | `Suspended` | no    | [`Agent::suspend`]                               |

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use apl_core::AgentId;
use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::interceptor::{insert_ordered, remove_by_identity};
use crate::{
    AgentArguments, AgentError, AgentResult, ContextContainer, Goal, Message, Plan, PlanScheme,
    PlanSchemeBase, Trigger, TriggerCategory, TriggerInterceptor,
};

// ── LifecycleState ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LifecycleState {
    Initiated,
    Active,
    Waiting,
    Suspended,
}

impl LifecycleState {
    /// Only awake agents are eligible for scheduling.
    #[inline]
    pub fn is_awake(self) -> bool {
        matches!(self, LifecycleState::Initiated | LifecycleState::Active)
    }
}

// ── Rescheduler ───────────────────────────────────────────────────────────────

/// Puts a sleeping agent back on the scheduler.  Installed once by the
/// platform that owns the agent.
pub trait Rescheduler: Send + Sync {
    fn wake_up(&self);
}

type DeathListener = Box<dyn Fn(AgentId) + Send + Sync>;

// ── Agent ─────────────────────────────────────────────────────────────────────

pub struct Agent {
    id:              AgentId,
    lifecycle:       Mutex<LifecycleState>,
    external:        Mutex<Vec<Trigger>>,
    internal:        Mutex<Vec<Trigger>>,
    messages:        Mutex<VecDeque<Arc<Message>>>,
    goals:           Mutex<Vec<Goal>>,
    plans:           Mutex<Vec<Plan>>,
    shutdown_plans:  Mutex<Vec<Plan>>,
    interceptors:    [Mutex<Vec<Arc<TriggerInterceptor>>>; 4],
    schemes:         PlanSchemeBase,
    contexts:        RwLock<ContextContainer>,
    stopped:         AtomicBool,
    finished:        AtomicBool,
    rescheduler:     OnceLock<Box<dyn Rescheduler>>,
    death_listeners: Mutex<Vec<DeathListener>>,
}

impl Agent {
    /// Build an agent from its arguments.  Initial plans and goals are in
    /// place before the first cycle.
    pub fn new(id: AgentId, arguments: AgentArguments) -> Arc<Self> {
        let AgentArguments { schemes, contexts, initial_plans, shutdown_plans, initial_goals } =
            arguments;

        let mut goals: Vec<Goal> = Vec::with_capacity(initial_goals.len());
        for goal in initial_goals {
            if !goals.iter().any(|g| g.ptr_eq(&goal)) {
                goals.push(goal);
            }
        }

        Arc::new(Self {
            id,
            lifecycle: Mutex::new(LifecycleState::Initiated),
            external: Mutex::new(Vec::new()),
            internal: Mutex::new(Vec::new()),
            messages: Mutex::new(VecDeque::new()),
            goals: Mutex::new(goals),
            plans: Mutex::new(initial_plans),
            shutdown_plans: Mutex::new(shutdown_plans),
            interceptors: Default::default(),
            schemes,
            contexts: RwLock::new(contexts),
            stopped: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            rescheduler: OnceLock::new(),
            death_listeners: Mutex::new(Vec::new()),
        })
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    pub fn lifecycle(&self) -> LifecycleState {
        *self.lifecycle.lock()
    }

    pub fn is_awake(&self) -> bool {
        self.lifecycle().is_awake()
    }

    /// Install the rescheduler.  Returns `false` if one was already set.
    pub fn set_rescheduler(&self, rescheduler: Box<dyn Rescheduler>) -> bool {
        self.rescheduler.set(rescheduler).is_ok()
    }

    /// Mark the agent active.  Called once on registration.
    pub fn invoke(&self) {
        *self.lifecycle.lock() = LifecycleState::Active;
    }

    /// Put the agent to sleep regardless of pending work.  Any producer
    /// wakes it again.
    pub fn suspend(&self) {
        *self.lifecycle.lock() = LifecycleState::Suspended;
        debug!(agent = %self.id, "suspended");
    }

    /// Must be called with the appended-to container still locked.
    fn wake_if_sleeping(&self) -> AgentResult<()> {
        let mut state = self.lifecycle.lock();
        if state.is_awake() || self.is_done() {
            return Ok(());
        }
        let rescheduler = self.rescheduler.get().ok_or(AgentError::MissingRescheduler(self.id))?;
        *state = LifecycleState::Active;
        rescheduler.wake_up();
        debug!(agent = %self.id, "woken");
        Ok(())
    }

    /// Post-cycle check.  Moves the agent to `Waiting` if, at one consistent
    /// instant, it has no triggers, goals, plans or messages.  Returns `true`
    /// if the agent is asleep afterwards.
    pub fn check_sleeping(&self) -> bool {
        let external = self.external.lock();
        let internal = self.internal.lock();
        let goals = self.goals.lock();
        let plans = self.plans.lock();
        let messages = self.messages.lock();
        let mut state = self.lifecycle.lock();

        let idle = external.is_empty()
            && internal.is_empty()
            && goals.is_empty()
            && plans.is_empty()
            && messages.is_empty();
        if idle && state.is_awake() {
            *state = LifecycleState::Waiting;
            debug!(agent = %self.id, "sleeping");
        }
        !state.is_awake()
    }

    /// The agent decided it is done.  Its shutdown plans run on its next
    /// scheduled cycle.
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Release);
    }

    /// Stop the agent from outside.  Death listeners are notified on the first
    /// call only.
    pub fn force_stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        let listeners = std::mem::take(&mut *self.death_listeners.lock());
        for listener in &listeners {
            listener(self.id);
        }
    }

    pub fn is_done(&self) -> bool {
        self.stopped.load(Ordering::Acquire) || self.finished.load(Ordering::Acquire)
    }

    pub fn register_death_listener<F>(&self, listener: F)
    where
        F: Fn(AgentId) + Send + Sync + 'static,
    {
        self.death_listeners.lock().push(Box::new(listener));
    }

    // ── Producers (any thread) ────────────────────────────────────────────

    pub fn receive_message(&self, message: Arc<Message>) -> AgentResult<()> {
        let mut messages = self.messages.lock();
        messages.push_back(message);
        self.wake_if_sleeping()
    }

    pub fn add_external_trigger(&self, trigger: Trigger) -> AgentResult<()> {
        let mut external = self.external.lock();
        external.push(trigger);
        self.wake_if_sleeping()
    }

    pub fn add_internal_trigger(&self, trigger: Trigger) -> AgentResult<()> {
        let mut internal = self.internal.lock();
        internal.push(trigger);
        self.wake_if_sleeping()
    }

    /// Adopt `goal` unless it is already held (by identity).
    pub fn adopt_goal(&self, goal: Goal) -> AgentResult<()> {
        let mut goals = self.goals.lock();
        if goals.iter().any(|g| g.ptr_eq(&goal)) {
            return Ok(());
        }
        goals.push(goal);
        self.wake_if_sleeping()
    }

    /// Adopt a plan from outside the deliberation thread.
    pub fn asynchronous_adopt_plan(&self, plan: Plan) -> AgentResult<()> {
        let mut plans = self.plans.lock();
        plans.push(plan);
        self.wake_if_sleeping()
    }

    // ── Goals ─────────────────────────────────────────────────────────────

    /// Remove `goal` and reset its pursued flag.  Returns `true` if it was held.
    pub fn drop_goal(&self, goal: &Goal) -> bool {
        let mut goals = self.goals.lock();
        match goals.iter().position(|g| g.ptr_eq(goal)) {
            Some(pos) => {
                goals.remove(pos).set_pursued(false);
                true
            }
            None => false,
        }
    }

    pub fn has_goal(&self, goal: &Goal) -> bool {
        self.goals.lock().iter().any(|g| g.ptr_eq(goal))
    }

    /// Snapshot of the current goals, in adoption order.
    pub fn goals(&self) -> Vec<Goal> {
        self.goals.lock().clone()
    }

    /// Drop every goal whose predicate holds against the current contexts.
    /// Returns the dropped goals.
    pub fn clear_achieved_goals(&self) -> Vec<Goal> {
        let achieved: Vec<Goal> = {
            let snapshot = self.goals();
            let contexts = self.contexts.read();
            snapshot.into_iter().filter(|g| g.is_achieved(&contexts)).collect()
        };
        if !achieved.is_empty() {
            let mut goals = self.goals.lock();
            goals.retain(|g| !achieved.iter().any(|a| a.ptr_eq(g)));
            for goal in &achieved {
                goal.set_pursued(false);
            }
        }
        achieved
    }

    // ── Plans ─────────────────────────────────────────────────────────────

    /// Adopt a plan from the deliberation thread.  Executed from the next
    /// action phase on.
    pub fn adopt_plan(&self, plan: Plan) {
        self.plans.lock().push(plan);
    }

    /// Move all plans out for execution.  Plans adopted while they are out
    /// are kept and merged back by [`restore_plans`](Self::restore_plans).
    pub fn take_plans(&self) -> Vec<Plan> {
        std::mem::take(&mut *self.plans.lock())
    }

    /// Put the surviving plans back, ahead of plans adopted in the meantime.
    pub fn restore_plans(&self, survivors: Vec<Plan>) {
        let mut plans = self.plans.lock();
        let adopted = std::mem::replace(&mut *plans, survivors);
        plans.extend(adopted);
    }

    pub fn nof_plans(&self) -> usize {
        self.plans.lock().len()
    }

    /// Hand out the shutdown plans.  Empty on every call after the first.
    pub fn take_shutdown_plans(&self) -> Vec<Plan> {
        std::mem::take(&mut *self.shutdown_plans.lock())
    }

    // ── Trigger queues (deliberation thread) ──────────────────────────────

    pub fn take_external_triggers(&self) -> Vec<Trigger> {
        std::mem::take(&mut *self.external.lock())
    }

    pub fn take_internal_triggers(&self) -> Vec<Trigger> {
        std::mem::take(&mut *self.internal.lock())
    }

    /// Drain the message queue in arrival order.
    pub fn drain_messages(&self) -> Vec<Arc<Message>> {
        self.messages.lock().drain(..).collect()
    }

    // ── Interceptors ──────────────────────────────────────────────────────

    pub fn interceptors(&self, category: TriggerCategory) -> MutexGuard<'_, Vec<Arc<TriggerInterceptor>>> {
        self.interceptors[category.index()].lock()
    }

    /// Consuming interceptors go to the tail, non-consuming ones to the head.
    pub fn adopt_interceptor(&self, category: TriggerCategory, interceptor: Arc<TriggerInterceptor>) {
        insert_ordered(&mut self.interceptors(category), interceptor);
    }

    pub fn remove_interceptor(&self, category: TriggerCategory, interceptor: &Arc<TriggerInterceptor>) -> bool {
        remove_by_identity(&mut self.interceptors(category), interceptor)
    }

    /// Remove `interceptor` from all four lists.  Returns `true` if it was in
    /// any of them.
    pub fn remove_interceptor_everywhere(&self, interceptor: &Arc<TriggerInterceptor>) -> bool {
        let mut found = false;
        for category in TriggerCategory::ALL {
            found |= self.remove_interceptor(category, interceptor);
        }
        found
    }

    // ── Schemes and contexts ──────────────────────────────────────────────

    pub fn schemes(&self, category: TriggerCategory) -> &[Arc<dyn PlanScheme>] {
        self.schemes.schemes(category)
    }

    pub fn contexts(&self) -> RwLockReadGuard<'_, ContextContainer> {
        self.contexts.read()
    }

    pub fn contexts_mut(&self) -> RwLockWriteGuard<'_, ContextContainer> {
        self.contexts.write()
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle())
            .field("done", &self.is_done())
            .finish_non_exhaustive()
    }
}
