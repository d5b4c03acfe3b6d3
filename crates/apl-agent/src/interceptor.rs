//! Trigger interceptors: one-shot, priority rules tried before plan schemes.
//!
//! An interceptor fires at most once: the deliberation step removes it from
//! its list on the first match.  A **consuming** interceptor also removes the
//! (non-goal) trigger it matched, so plan schemes never see it.
//!
//! [`InterceptorBuilder`] produces [`EnhancedInterceptor`]s: selector-based
//! interceptors whose plan, on its first execution, removes a configurable
//! set of other interceptors.  This is what makes
//! [`make_mutually_exclusive`] work.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::{ContextContainer, Plan, PlanInterface, PlanResult, PlanScheme, Trigger};

// ── TriggerInterceptor ────────────────────────────────────────────────────────

pub struct TriggerInterceptor {
    consuming: bool,
    scheme:    Box<dyn PlanScheme>,
}

impl TriggerInterceptor {
    pub fn new(consuming: bool, scheme: impl PlanScheme) -> Arc<Self> {
        Arc::new(Self { consuming, scheme: Box::new(scheme) })
    }

    pub fn is_consuming(&self) -> bool {
        self.consuming
    }

    pub fn instantiate(&self, trigger: &Trigger, contexts: &ContextContainer) -> Option<Plan> {
        self.scheme.instantiate(trigger, contexts)
    }
}

impl fmt::Debug for TriggerInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerInterceptor")
            .field("consuming", &self.consuming)
            .finish_non_exhaustive()
    }
}

/// Insert `interceptor` into `list`: consuming ones at the tail, observers
/// (non-consuming) at the head.
pub(crate) fn insert_ordered(list: &mut Vec<Arc<TriggerInterceptor>>, interceptor: Arc<TriggerInterceptor>) {
    if interceptor.is_consuming() {
        list.push(interceptor);
    } else {
        list.insert(0, interceptor);
    }
}

/// Remove `interceptor` (by identity) from `list`.  Returns `true` if found.
pub(crate) fn remove_by_identity(
    list:        &mut Vec<Arc<TriggerInterceptor>>,
    interceptor: &Arc<TriggerInterceptor>,
) -> bool {
    match list.iter().position(|i| Arc::ptr_eq(i, interceptor)) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}

// ── EnhancedInterceptor ───────────────────────────────────────────────────────

type Selector = Arc<dyn Fn(&Trigger) -> bool + Send + Sync>;
type SharedBody = Arc<dyn Fn(&Trigger, &mut PlanInterface<'_>) -> PlanResult + Send + Sync>;
type RemovalList = Arc<Mutex<Vec<Weak<TriggerInterceptor>>>>;

/// A built interceptor plus its removal list.
///
/// Removal targets are held weakly: two mutually exclusive interceptors refer
/// to each other without keeping each other alive.
#[derive(Clone)]
pub struct EnhancedInterceptor {
    interceptor: Arc<TriggerInterceptor>,
    removals:    RemovalList,
}

impl EnhancedInterceptor {
    pub fn interceptor(&self) -> &Arc<TriggerInterceptor> {
        &self.interceptor
    }

    /// When `self` fires, its plan removes `other` from every interceptor list.
    pub fn removes(&self, other: &EnhancedInterceptor) {
        self.removals.lock().push(Arc::downgrade(&other.interceptor));
    }
}

/// Whichever of `a` and `b` fires first removes the other.
pub fn make_mutually_exclusive(a: &EnhancedInterceptor, b: &EnhancedInterceptor) {
    a.removes(b);
    b.removes(a);
}

/// Whichever interceptor in `group` fires first removes all the others.
pub fn make_all_mutually_exclusive(group: &[EnhancedInterceptor]) {
    for a in group {
        for b in group {
            if !Arc::ptr_eq(&a.interceptor, &b.interceptor) {
                a.removes(b);
            }
        }
    }
}

// ── InterceptorBuilder ────────────────────────────────────────────────────────

/// Fluent builder for [`EnhancedInterceptor`].
///
/// | Method              | Default                                   |
/// |---------------------|-------------------------------------------|
/// | `.selector(f)`      | matches every trigger                     |
/// | `.consuming(b)`     | `false`                                   |
/// | `.force_run_once(b)`| `false`                                   |
/// | `.body(f)`          | finishes immediately, emits nothing       |
///
/// Without `force_run_once` the instantiated plan runs every cycle until its
/// body calls [`PlanInterface::finish_plan`].
pub struct InterceptorBuilder {
    selector:       Selector,
    consuming:      bool,
    force_run_once: bool,
    body:           SharedBody,
}

impl Default for InterceptorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterceptorBuilder {
    pub fn new() -> Self {
        Self {
            selector:       Arc::new(|_| true),
            consuming:      false,
            force_run_once: false,
            body:           Arc::new(|_, iface| {
                iface.finish_plan();
                Ok(None)
            }),
        }
    }

    pub fn selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&Trigger) -> bool + Send + Sync + 'static,
    {
        self.selector = Arc::new(selector);
        self
    }

    pub fn consuming(mut self, consuming: bool) -> Self {
        self.consuming = consuming;
        self
    }

    pub fn force_run_once(mut self, run_once: bool) -> Self {
        self.force_run_once = run_once;
        self
    }

    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&Trigger, &mut PlanInterface<'_>) -> PlanResult + Send + Sync + 'static,
    {
        self.body = Arc::new(body);
        self
    }

    pub fn build(self) -> EnhancedInterceptor {
        let removals: RemovalList = Arc::new(Mutex::new(Vec::new()));
        let Self { selector, consuming, force_run_once, body } = self;

        let plan_removals = Arc::clone(&removals);
        let scheme = move |trigger: &Trigger, _: &ContextContainer| -> Option<Plan> {
            if !selector(trigger) {
                return None;
            }
            Some(removing_plan(
                trigger.clone(),
                Arc::clone(&body),
                force_run_once,
                Arc::clone(&plan_removals),
            ))
        };

        EnhancedInterceptor {
            interceptor: TriggerInterceptor::new(consuming, scheme),
            removals,
        }
    }
}

/// Wrap `body` in a plan that first clears the removal list's targets out of
/// every interceptor list, then delegates to the decoupled body.
fn removing_plan(trigger: Trigger, body: SharedBody, run_once: bool, removals: RemovalList) -> Plan {
    let call = move |t: &Trigger, iface: &mut PlanInterface<'_>| body(t, iface);
    let mut inner = if run_once {
        Plan::decoupled_once(trigger, call)
    } else {
        Plan::decoupled(trigger, call)
    };
    let mut first_execution = true;

    Plan::new(move |iface| {
        if first_execution {
            first_execution = false;
            let targets: Vec<Arc<TriggerInterceptor>> =
                removals.lock().iter().filter_map(Weak::upgrade).collect();
            for target in &targets {
                iface.remove_interceptor(target);
            }
        }
        let result = inner.execute(iface);
        if inner.is_finished() {
            iface.finish_plan();
        }
        result
    })
}
