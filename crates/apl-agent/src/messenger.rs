//! Message routing between agents.

use std::collections::HashMap;
use std::sync::Arc;

use apl_core::AgentId;
use parking_lot::RwLock;

use crate::{Agent, AgentError, AgentResult, Message};

/// In-process routing from agent id to agent.
///
/// Delivery always ends in [`Agent::receive_message`], which wakes a sleeping
/// receiver.
pub trait Messenger: Send + Sync {
    fn register(&self, agent: Arc<Agent>);

    fn deregister(&self, id: AgentId) -> Option<Arc<Agent>>;

    /// Ids of all registered agents, ascending.
    fn agent_ids(&self) -> Vec<AgentId>;

    fn deliver_to(&self, receiver: AgentId, message: Arc<Message>) -> AgentResult<()>;

    /// Deliver to every receiver of `message`, or to every registered agent
    /// except the sender when it has none.  All receivers are attempted; the
    /// first error is returned.
    fn deliver(&self, message: Arc<Message>) -> AgentResult<()> {
        let receivers = if message.is_broadcast() {
            self.agent_ids()
                .into_iter()
                .filter(|id| Some(*id) != message.sender)
                .collect()
        } else {
            message.receivers.clone()
        };

        let mut first_error = None;
        for receiver in receivers {
            if let Err(err) = self.deliver_to(receiver, Arc::clone(&message)) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

// ── DefaultMessenger ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct DefaultMessenger {
    agents: RwLock<HashMap<AgentId, Arc<Agent>>>,
}

impl DefaultMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }
}

impl Messenger for DefaultMessenger {
    fn register(&self, agent: Arc<Agent>) {
        self.agents.write().insert(agent.id(), agent);
    }

    fn deregister(&self, id: AgentId) -> Option<Arc<Agent>> {
        self.agents.write().remove(&id)
    }

    fn agent_ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.agents.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn deliver_to(&self, receiver: AgentId, message: Arc<Message>) -> AgentResult<()> {
        // Clone out of the read lock so delivery never holds the registry.
        let agent = self.agents.read().get(&receiver).cloned();
        match agent {
            Some(agent) => agent.receive_message(message),
            None => Err(AgentError::ReceiverNotFound(receiver)),
        }
    }
}
