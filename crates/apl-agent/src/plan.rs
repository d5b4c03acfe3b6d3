//! Plans: stateful units of behavior executed once per deliberation cycle.
//!
//! A plan is one of three variants, all closure-backed:
//!
//! | Variant     | Constructor          | Finishes when                                |
//! |-------------|----------------------|----------------------------------------------|
//! | Generic     | [`Plan::new`]        | the body calls [`PlanInterface::finish_plan`] |
//! | RunOnce     | [`Plan::run_once`]   | after its single execution                   |
//! | Decoupled   | [`Plan::decoupled`]  | as Generic; the body also sees its trigger   |
//!
//! A body returns `Ok(Some(action))` to emit an action this cycle, `Ok(None)`
//! to emit nothing, or a [`PlanFailure`].

use std::fmt;

use apl_core::Payload;
use thiserror::Error;

use crate::{AgentError, Goal, PlanInterface, Trigger};

/// An outward-facing action produced by a plan.  Collected per agent into the
/// tick result map.
pub type Action = Payload;

pub type PlanResult = Result<Option<Action>, PlanFailure>;

// ── Errors ────────────────────────────────────────────────────────────────────

/// A recoverable plan failure.  The failing plan is removed and the error is
/// re-injected as an internal trigger for the next cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("plan execution failed: {message}")]
pub struct PlanExecutionError {
    message: String,
}

impl PlanExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Everything a plan body can fail with.
#[derive(Debug, Error)]
pub enum PlanFailure {
    /// Recoverable: the agent lives on.
    #[error(transparent)]
    Execution(#[from] PlanExecutionError),

    /// Unrecoverable: the agent is killed.
    #[error("fatal plan failure: {0}")]
    Fatal(String),
}

impl From<AgentError> for PlanFailure {
    /// Undeliverable messages are recoverable; configuration errors are not.
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::ReceiverNotFound(_) => {
                PlanFailure::Execution(PlanExecutionError::new(err.to_string()))
            }
            AgentError::MissingRescheduler(_) | AgentError::NoConcurrencyContext(_) => {
                PlanFailure::Fatal(err.to_string())
            }
        }
    }
}

// ── Plan ──────────────────────────────────────────────────────────────────────

type GenericBody = Box<dyn FnMut(&mut PlanInterface<'_>) -> PlanResult + Send>;
type RunOnceBody = Box<dyn FnOnce(&mut PlanInterface<'_>) -> PlanResult + Send>;
type DecoupledBody = Box<dyn FnMut(&Trigger, &mut PlanInterface<'_>) -> PlanResult + Send>;

enum PlanBody {
    Generic(GenericBody),
    RunOnce(Option<RunOnceBody>),
    Decoupled {
        trigger:  Trigger,
        body:     DecoupledBody,
        run_once: bool,
    },
}

pub struct Plan {
    body:     PlanBody,
    finished: bool,
    goal:     Option<Goal>,
}

impl Plan {
    /// A plan that runs every cycle until its body calls
    /// [`PlanInterface::finish_plan`].
    pub fn new<F>(body: F) -> Self
    where
        F: FnMut(&mut PlanInterface<'_>) -> PlanResult + Send + 'static,
    {
        Self::from_body(PlanBody::Generic(Box::new(body)))
    }

    /// A plan that runs exactly once.
    pub fn run_once<F>(body: F) -> Self
    where
        F: FnOnce(&mut PlanInterface<'_>) -> PlanResult + Send + 'static,
    {
        Self::from_body(PlanBody::RunOnce(Some(Box::new(body))))
    }

    /// A plan bound to the trigger that instantiated it.
    pub fn decoupled<F>(trigger: Trigger, body: F) -> Self
    where
        F: FnMut(&Trigger, &mut PlanInterface<'_>) -> PlanResult + Send + 'static,
    {
        Self::from_body(PlanBody::Decoupled { trigger, body: Box::new(body), run_once: false })
    }

    /// A decoupled plan that finishes after its first execution.
    pub fn decoupled_once<F>(trigger: Trigger, body: F) -> Self
    where
        F: FnMut(&Trigger, &mut PlanInterface<'_>) -> PlanResult + Send + 'static,
    {
        Self::from_body(PlanBody::Decoupled { trigger, body: Box::new(body), run_once: true })
    }

    fn from_body(body: PlanBody) -> Self {
        Self { body, finished: false, goal: None }
    }

    /// Mark this plan as pursuing `goal`.  The plan stops being executed once
    /// the agent no longer holds the goal.
    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Run the plan body once.
    pub fn execute(&mut self, iface: &mut PlanInterface<'_>) -> PlanResult {
        iface.begin_plan();
        let result = match &mut self.body {
            PlanBody::Generic(body) => body(iface),
            PlanBody::RunOnce(slot) => {
                iface.finish_plan();
                match slot.take() {
                    Some(body) => body(iface),
                    None => Ok(None),
                }
            }
            PlanBody::Decoupled { trigger, body, run_once } => {
                if *run_once {
                    iface.finish_plan();
                }
                body(trigger, iface)
            }
        };
        if iface.take_plan_finished() {
            self.finished = true;
        }
        result
    }
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.body {
            PlanBody::Generic(_) => "Generic",
            PlanBody::RunOnce(_) => "RunOnce",
            PlanBody::Decoupled { .. } => "Decoupled",
        };
        f.debug_struct("Plan")
            .field("kind", &kind)
            .field("finished", &self.finished)
            .field("goal", &self.goal)
            .finish()
    }
}
