//! `PlanInterface` — the narrow view of an agent handed to executing plans.
//!
//! A plan body never sees [`Agent`] directly.  Everything it may do (read and
//! write contexts, adopt goals and plans, raise internal triggers, send
//! messages, install interceptors, schedule off-cycle work) goes through this
//! interface, which also carries the per-execution `finished` flag.
//!
//! # Builder helpers
//!
//! | Helper                        | Installs                                        |
//! |-------------------------------|-------------------------------------------------|
//! | `wait_for_message` & co.      | consuming, run-once interceptor                 |
//! | `suspend_goal_until`          | non-consuming interceptor in all four lists     |
//! | `suspend_to_next_cycle`       | non-consuming internal interceptor + marker     |
//! | `repeat_while`                | self-suspending run-once plan                   |
//! | `notify_when_finished`        | task on the `ConcurrencyContext` + trigger      |
//! | `adopt_plan_when_finished`    | task on the `ConcurrencyContext` + plan         |

use std::any::Any;
use std::sync::Arc;

use apl_core::AgentId;
use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, Mutex, RwLockReadGuard, RwLockWriteGuard,
};
use tracing::warn;

use crate::{
    Agent, AgentError, AgentResult, ConcurrencyContext, ContextContainer, EnhancedInterceptor,
    Goal, InterceptorBuilder, Message, Messenger, Plan, PlanResult, Trigger, TriggerCategory,
    TriggerInterceptor,
};

/// Content of the private trigger used by
/// [`PlanInterface::suspend_to_next_cycle`].
struct SuspensionMarker;

type Condition = Arc<dyn Fn(&ContextContainer) -> bool + Send + Sync>;
type RepeatedBody = Arc<dyn Fn(&mut PlanInterface<'_>) -> PlanResult + Send + Sync>;

pub struct PlanInterface<'a> {
    agent:     &'a Arc<Agent>,
    messenger: &'a dyn Messenger,
    finished:  bool,
}

impl<'a> PlanInterface<'a> {
    pub fn new(agent: &'a Arc<Agent>, messenger: &'a dyn Messenger) -> Self {
        Self { agent, messenger, finished: false }
    }

    pub(crate) fn begin_plan(&mut self) {
        self.finished = false;
    }

    pub(crate) fn take_plan_finished(&mut self) -> bool {
        std::mem::take(&mut self.finished)
    }

    /// Mark the executing plan finished.  It is removed after this execution.
    pub fn finish_plan(&mut self) {
        self.finished = true;
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent.id()
    }

    pub fn agent(&self) -> &Arc<Agent> {
        self.agent
    }

    pub fn messenger(&self) -> &dyn Messenger {
        self.messenger
    }

    /// Ask for the agent to be shut down after this cycle.
    pub fn finish_agent(&self) {
        self.agent.finish();
    }

    // ── Contexts ──────────────────────────────────────────────────────────

    /// Read guard on context `C`.  Drop it before calling anything that needs
    /// write access.
    pub fn context<C: Any + Send + Sync>(&self) -> Option<MappedRwLockReadGuard<'a, C>> {
        RwLockReadGuard::try_map(self.agent.contexts(), |c| c.get::<C>()).ok()
    }

    pub fn context_mut<C: Any + Send + Sync>(&self) -> Option<MappedRwLockWriteGuard<'a, C>> {
        RwLockWriteGuard::try_map(self.agent.contexts_mut(), |c| c.get_mut::<C>()).ok()
    }

    // ── Goals, plans, triggers ────────────────────────────────────────────

    pub fn has_goal(&self, goal: &Goal) -> bool {
        self.agent.has_goal(goal)
    }

    pub fn adopt_goal(&self, goal: Goal) -> AgentResult<()> {
        self.agent.adopt_goal(goal)
    }

    pub fn drop_goal(&self, goal: &Goal) -> bool {
        self.agent.drop_goal(goal)
    }

    /// Adopt a plan; it first executes in the next cycle.
    pub fn adopt_plan(&self, plan: Plan) {
        self.agent.adopt_plan(plan);
    }

    /// Raise an internal trigger, processed in the next cycle.
    pub fn add_internal_trigger(&self, trigger: Trigger) -> AgentResult<()> {
        self.agent.add_internal_trigger(trigger)
    }

    // ── Interceptors ──────────────────────────────────────────────────────

    pub fn adopt_interceptor(&self, category: TriggerCategory, interceptor: Arc<TriggerInterceptor>) {
        self.agent.adopt_interceptor(category, interceptor);
    }

    /// Remove `interceptor` from all four lists.
    pub fn remove_interceptor(&self, interceptor: &Arc<TriggerInterceptor>) -> bool {
        self.agent.remove_interceptor_everywhere(interceptor)
    }

    // ── Messaging ─────────────────────────────────────────────────────────

    /// Send `content` to one agent.
    pub fn send_message<T: Any + Send + Sync>(&self, receiver: AgentId, content: T) -> AgentResult<()> {
        let message = Message::new(content).to(receiver).from(self.agent_id());
        self.messenger.deliver_to(receiver, Arc::new(message))
    }

    /// Send a prepared message.  The sender is always set to this agent.
    pub fn send(&self, message: Message) -> AgentResult<()> {
        self.messenger.deliver(Arc::new(message.from(self.agent_id())))
    }

    /// Send `content` to every other registered agent.
    pub fn broadcast<T: Any + Send + Sync>(&self, content: T) -> AgentResult<()> {
        self.send(Message::new(content))
    }

    // ── Wait helpers ──────────────────────────────────────────────────────

    /// Install a consuming, run-once interceptor on `category`.  The returned
    /// handle can be made mutually exclusive with other waits.
    pub fn wait_for<S, B>(&self, category: TriggerCategory, selector: S, body: B) -> EnhancedInterceptor
    where
        S: Fn(&Trigger) -> bool + Send + Sync + 'static,
        B: Fn(&Trigger, &mut PlanInterface<'_>) -> PlanResult + Send + Sync + 'static,
    {
        let enhanced = InterceptorBuilder::new()
            .selector(selector)
            .consuming(true)
            .force_run_once(true)
            .body(body)
            .build();
        self.adopt_interceptor(category, Arc::clone(enhanced.interceptor()));
        enhanced
    }

    pub fn wait_for_message<S, B>(&self, selector: S, body: B) -> EnhancedInterceptor
    where
        S: Fn(&Message) -> bool + Send + Sync + 'static,
        B: Fn(&Message, &mut PlanInterface<'_>) -> PlanResult + Send + Sync + 'static,
    {
        self.wait_for(
            TriggerCategory::Message,
            move |t| t.as_message().is_some_and(|m| selector(m)),
            move |t, iface| match t.as_message() {
                Some(m) => body(m, iface),
                None => Ok(None),
            },
        )
    }

    pub fn wait_for_external_trigger<S, B>(&self, selector: S, body: B) -> EnhancedInterceptor
    where
        S: Fn(&Trigger) -> bool + Send + Sync + 'static,
        B: Fn(&Trigger, &mut PlanInterface<'_>) -> PlanResult + Send + Sync + 'static,
    {
        self.wait_for(TriggerCategory::External, selector, body)
    }

    pub fn wait_for_internal_trigger<S, B>(&self, selector: S, body: B) -> EnhancedInterceptor
    where
        S: Fn(&Trigger) -> bool + Send + Sync + 'static,
        B: Fn(&Trigger, &mut PlanInterface<'_>) -> PlanResult + Send + Sync + 'static,
    {
        self.wait_for(TriggerCategory::Internal, selector, body)
    }

    /// Goals are never consumed: the goal stays held after the wait fires.
    pub fn wait_for_goal<S, B>(&self, selector: S, body: B) -> EnhancedInterceptor
    where
        S: Fn(&Goal) -> bool + Send + Sync + 'static,
        B: Fn(&Goal, &mut PlanInterface<'_>) -> PlanResult + Send + Sync + 'static,
    {
        self.wait_for(
            TriggerCategory::Goal,
            move |t| t.as_goal().is_some_and(|g| selector(g)),
            move |t, iface| match t.as_goal() {
                Some(g) => body(g, iface),
                None => Ok(None),
            },
        )
    }

    // ── Suspension ────────────────────────────────────────────────────────

    /// Drop `goal` and re-adopt it once a trigger of any category satisfies
    /// `condition`.
    pub fn suspend_goal_until<F>(&self, goal: &Goal, condition: F) -> EnhancedInterceptor
    where
        F: Fn(&Trigger) -> bool + Send + Sync + 'static,
    {
        self.drop_goal(goal);
        let goal = goal.clone();
        let enhanced = InterceptorBuilder::new()
            .selector(condition)
            .force_run_once(true)
            .body(move |_, iface| {
                iface.adopt_goal(goal.clone())?;
                Ok(None)
            })
            .build();
        enhanced.removes(&enhanced);
        for category in TriggerCategory::ALL {
            self.adopt_interceptor(category, Arc::clone(enhanced.interceptor()));
        }
        enhanced
    }

    /// Park `plan` until the next cycle.
    pub fn suspend_to_next_cycle(&self, plan: Plan) -> AgentResult<()> {
        let marker = Trigger::internal(SuspensionMarker);
        let key = marker.clone();
        let slot = Mutex::new(Some(plan));
        let interceptor = TriggerInterceptor::new(false, move |t: &Trigger, _: &ContextContainer| {
            if t.same(&key) { slot.lock().take() } else { None }
        });
        self.adopt_interceptor(TriggerCategory::Internal, interceptor);
        self.add_internal_trigger(marker)
    }

    /// Run `body` once per cycle for as long as `condition` holds, starting
    /// next cycle.
    pub fn repeat_while<C, B>(&self, condition: C, body: B)
    where
        C: Fn(&ContextContainer) -> bool + Send + Sync + 'static,
        B: Fn(&mut PlanInterface<'_>) -> PlanResult + Send + Sync + 'static,
    {
        self.adopt_plan(repeating_plan(Arc::new(condition), Arc::new(body)));
    }

    // ── Off-cycle work ────────────────────────────────────────────────────

    fn concurrency_context(&self) -> AgentResult<ConcurrencyContext> {
        self.agent
            .contexts()
            .get::<ConcurrencyContext>()
            .cloned()
            .ok_or(AgentError::NoConcurrencyContext(self.agent_id()))
    }

    /// Run `task` on the agent's `ConcurrencyContext`; its result becomes an
    /// internal trigger via `make_trigger`.
    pub fn notify_when_finished<R, T, F>(&self, task: T, make_trigger: F) -> AgentResult<()>
    where
        T: FnOnce() -> R + Send + 'static,
        F: FnOnce(R) -> Trigger + Send + 'static,
    {
        let pool = self.concurrency_context()?;
        let agent = Arc::clone(self.agent);
        pool.spawn(move || {
            let trigger = make_trigger(task());
            if let Err(err) = agent.add_internal_trigger(trigger) {
                warn!(agent = %agent.id(), %err, "task completion lost");
            }
        });
        Ok(())
    }

    /// Run `task` on the agent's `ConcurrencyContext`; on completion, adopt a
    /// run-once plan that receives the result.
    pub fn adopt_plan_when_finished<R, T, B>(&self, task: T, body: B) -> AgentResult<()>
    where
        R: Send + 'static,
        T: FnOnce() -> R + Send + 'static,
        B: FnOnce(R, &mut PlanInterface<'_>) -> PlanResult + Send + 'static,
    {
        let pool = self.concurrency_context()?;
        let agent = Arc::clone(self.agent);
        pool.spawn(move || {
            let result = task();
            let plan = Plan::run_once(move |iface| body(result, iface));
            if let Err(err) = agent.asynchronous_adopt_plan(plan) {
                warn!(agent = %agent.id(), %err, "task completion lost");
            }
        });
        Ok(())
    }
}

fn repeating_plan(condition: Condition, body: RepeatedBody) -> Plan {
    Plan::run_once(move |iface| {
        let holds = condition(&iface.agent.contexts());
        if !holds {
            return Ok(None);
        }
        let action = body(iface)?;
        iface.suspend_to_next_cycle(repeating_plan(Arc::clone(&condition), Arc::clone(&body)))?;
        Ok(action)
    })
}
