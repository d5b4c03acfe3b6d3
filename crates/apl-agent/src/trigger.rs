//! Triggers: the stimuli matched against interceptors and plan schemes.
//!
//! Every trigger has reference identity.  Cloning a `Trigger` yields the same
//! trigger (its content sits behind an `Arc`), and [`Trigger::same`] compares
//! identities, never contents.  Two separately created triggers with equal
//! content are different triggers.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use apl_core::{AgentId, Payload};

use crate::{ContextContainer, PlanExecutionError};

// ── TriggerCategory ───────────────────────────────────────────────────────────

/// The four trigger channels.  Each has its own plan schemes and interceptor
/// list, and its own phase in the deliberation cycle (in this order).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TriggerCategory {
    Goal,
    External,
    Internal,
    Message,
}

impl TriggerCategory {
    pub const ALL: [TriggerCategory; 4] = [
        TriggerCategory::Goal,
        TriggerCategory::External,
        TriggerCategory::Internal,
        TriggerCategory::Message,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

// ── Goal ──────────────────────────────────────────────────────────────────────

type AchievedFn = dyn Fn(&ContextContainer) -> bool + Send + Sync;

struct GoalInner {
    content:  Payload,
    achieved: Box<AchievedFn>,
    pursued:  AtomicBool,
}

/// A persistent trigger that stays with the agent until its achievement
/// predicate holds or it is dropped.
///
/// The `pursued` flag is set when a goal plan scheme instantiates a plan for
/// it; while set, goal schemes skip the goal.
#[derive(Clone)]
pub struct Goal(Arc<GoalInner>);

impl Goal {
    /// A goal carrying `content`, achieved once `is_achieved` returns `true`.
    pub fn new<T, F>(content: T, is_achieved: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&ContextContainer) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(GoalInner {
            content:  Payload::new(content),
            achieved: Box::new(is_achieved),
            pursued:  AtomicBool::new(false),
        }))
    }

    /// A maintenance goal: never achieved, only ever dropped.
    pub fn persistent<T: Any + Send + Sync>(content: T) -> Self {
        Self::new(content, |_| false)
    }

    pub fn is_achieved(&self, contexts: &ContextContainer) -> bool {
        (self.0.achieved)(contexts)
    }

    pub fn is_pursued(&self) -> bool {
        self.0.pursued.load(Ordering::Acquire)
    }

    pub fn set_pursued(&self, pursued: bool) {
        self.0.pursued.store(pursued, Ordering::Release);
    }

    pub fn content(&self) -> &Payload {
        &self.0.content
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.content.downcast_ref()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Goal) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("content", &self.0.content)
            .field("pursued", &self.is_pursued())
            .finish()
    }
}

// ── Message ───────────────────────────────────────────────────────────────────

/// An inter-agent message.  An empty `receivers` list means broadcast.
#[derive(Debug, Clone)]
pub struct Message {
    pub sender:    Option<AgentId>,
    pub receivers: Vec<AgentId>,
    pub content:   Payload,
}

impl Message {
    pub fn new<T: Any + Send + Sync>(content: T) -> Self {
        Self { sender: None, receivers: Vec::new(), content: Payload::new(content) }
    }

    pub fn to(mut self, receiver: AgentId) -> Self {
        self.receivers.push(receiver);
        self
    }

    pub fn from(mut self, sender: AgentId) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn is_broadcast(&self) -> bool {
        self.receivers.is_empty()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.content.downcast_ref()
    }
}

// ── Trigger ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum Trigger {
    /// An event injected from outside the agent (environment, other agents).
    External(Payload),
    /// An event the agent raised for itself.
    Internal(Payload),
    Message(Arc<Message>),
    Goal(Goal),
    /// A recoverable plan failure from the previous cycle.
    PlanError(Arc<PlanExecutionError>),
}

impl Trigger {
    pub fn external<T: Any + Send + Sync>(content: T) -> Self {
        Trigger::External(Payload::new(content))
    }

    pub fn internal<T: Any + Send + Sync>(content: T) -> Self {
        Trigger::Internal(Payload::new(content))
    }

    pub fn plan_error(error: PlanExecutionError) -> Self {
        Trigger::PlanError(Arc::new(error))
    }

    pub fn is_goal(&self) -> bool {
        matches!(self, Trigger::Goal(_))
    }

    pub fn as_goal(&self) -> Option<&Goal> {
        match self {
            Trigger::Goal(goal) => Some(goal),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Trigger::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn as_plan_error(&self) -> Option<&PlanExecutionError> {
        match self {
            Trigger::PlanError(error) => Some(error),
            _ => None,
        }
    }

    /// The user content carried by the trigger (`None` for plan errors).
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Trigger::External(p) | Trigger::Internal(p) => Some(p),
            Trigger::Message(m) => Some(&m.content),
            Trigger::Goal(g) => Some(g.content()),
            Trigger::PlanError(_) => None,
        }
    }

    /// Downcast the content to `T`, whatever the trigger kind.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload().and_then(|p| p.downcast_ref::<T>())
    }

    /// Reference identity.
    pub fn same(&self, other: &Trigger) -> bool {
        match (self, other) {
            (Trigger::External(a), Trigger::External(b)) => a.ptr_eq(b),
            (Trigger::Internal(a), Trigger::Internal(b)) => a.ptr_eq(b),
            (Trigger::Message(a), Trigger::Message(b)) => Arc::ptr_eq(a, b),
            (Trigger::Goal(a), Trigger::Goal(b)) => a.ptr_eq(b),
            (Trigger::PlanError(a), Trigger::PlanError(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::External(p) => f.debug_tuple("External").field(p).finish(),
            Trigger::Internal(p) => f.debug_tuple("Internal").field(p).finish(),
            Trigger::Message(m) => f.debug_tuple("Message").field(m).finish(),
            Trigger::Goal(g) => f.debug_tuple("Goal").field(g).finish(),
            Trigger::PlanError(e) => f.debug_tuple("PlanError").field(e).finish(),
        }
    }
}

impl From<Goal> for Trigger {
    fn from(goal: Goal) -> Self {
        Trigger::Goal(goal)
    }
}
