//! Type-erased, heterogeneous context storage.
//!
//! # Design
//!
//! Each context type `C` is stored once, as a `Box<dyn Any + Send + Sync>` in
//! a `HashMap<TypeId, …>`.  Contexts are the agent's beliefs and resources:
//! plan schemes and goal predicates read them, plans read and write them.
//!
//! The container itself is plain data; the owning [`Agent`][crate::Agent]
//! keeps it behind a `parking_lot::RwLock` and hands plans mapped guards.
//!
//! # Usage
//!
//! ```rust
//! use apl_agent::ContextContainer;
//!
//! struct Counter(u32);
//!
//! let mut contexts = ContextContainer::new();
//! contexts.insert(Counter(0));
//! contexts.get_mut::<Counter>().unwrap().0 += 1;
//! assert_eq!(contexts.get::<Counter>().unwrap().0, 1);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Registry of application-defined contexts, one value per type.
#[derive(Default)]
pub struct ContextContainer {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ContextContainer {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// Store `context`, returning the previous value of the same type.
    pub fn insert<C: Any + Send + Sync>(&mut self, context: C) -> Option<C> {
        self.map
            .insert(TypeId::of::<C>(), Box::new(context))
            .and_then(|old| old.downcast::<C>().ok())
            .map(|old| *old)
    }

    /// Remove and return the context of type `C`.
    pub fn remove<C: Any + Send + Sync>(&mut self) -> Option<C> {
        self.map
            .remove(&TypeId::of::<C>())
            .and_then(|old| old.downcast::<C>().ok())
            .map(|old| *old)
    }

    // ── Read access ───────────────────────────────────────────────────────

    /// Shared reference to context `C`, or `None` if it was never added.
    pub fn get<C: Any + Send + Sync>(&self) -> Option<&C> {
        self.map
            .get(&TypeId::of::<C>())
            .and_then(|c| c.downcast_ref::<C>())
    }

    pub fn get_mut<C: Any + Send + Sync>(&mut self) -> Option<&mut C> {
        self.map
            .get_mut(&TypeId::of::<C>())
            .and_then(|c| c.downcast_mut::<C>())
    }

    // ── Metadata ──────────────────────────────────────────────────────────

    /// Number of distinct context types currently stored.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// `true` if a context of type `C` is stored.
    pub fn contains<C: Any + Send + Sync>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<C>())
    }

    /// Move every context of `other` into `self`; `other` wins on conflicts.
    pub(crate) fn absorb(&mut self, other: ContextContainer) {
        self.map.extend(other.map);
    }
}
