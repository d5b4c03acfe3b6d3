//! Type-erased, shareable content for triggers, messages and actions.
//!
//! The engine never interprets what an agent perceives or does; it only moves
//! values between producers, plan schemes and the tick result map.  A
//! `Payload` wraps any `Send + Sync + 'static` value behind an `Arc` so that:
//!
//! - cloning is cheap and preserves **identity** ([`Payload::ptr_eq`]),
//! - consumers recover the concrete type with [`Payload::downcast_ref`].
//!
//! ```rust
//! use apl_core::Payload;
//!
//! let p = Payload::new("hello");
//! assert_eq!(p.downcast_ref::<&str>(), Some(&"hello"));
//! assert!(p.ptr_eq(&p.clone()));
//! assert!(!p.ptr_eq(&Payload::new("hello")));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Payload {
    value:     Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Payload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value:     Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// `true` if the wrapped value is a `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Reference identity: `true` only for clones of the same payload.
    #[inline]
    pub fn ptr_eq(&self, other: &Payload) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    /// Name of the wrapped type, for logs.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload<{}>", self.type_name)
    }
}
