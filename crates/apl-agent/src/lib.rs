//! `apl-agent` — agent state and everything a plan can touch.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`trigger`]     | `Trigger`, `TriggerCategory`, `Goal`, `Message`                 |
//! | [`plan`]        | `Plan`, `PlanResult`, `PlanExecutionError`, `PlanFailure`       |
//! | [`scheme`]      | `PlanScheme` trait, `PlanSchemeBase`                            |
//! | [`interceptor`] | `TriggerInterceptor`, `InterceptorBuilder`, mutual exclusion    |
//! | [`context`]     | `ContextContainer` (typed heterogeneous map)                    |
//! | [`agent`]       | `Agent`, `LifecycleState`, `Rescheduler`                        |
//! | [`arguments`]   | `AgentArguments` (fluent construction)                          |
//! | [`interface`]   | `PlanInterface` (the plan's view of its agent)                  |
//! | [`messenger`]   | `Messenger` trait, `DefaultMessenger`                           |
//! | [`concurrency`] | `ConcurrencyContext` (off-cycle task pool)                      |
//! | [`error`]       | `AgentError`, `AgentResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                            |
//! |---------|---------------------------------------------------|
//! | `serde` | Forwards to `apl-core/serde`.                     |

pub mod agent;
pub mod arguments;
pub mod concurrency;
pub mod context;
pub mod error;
pub mod interceptor;
pub mod interface;
pub mod messenger;
pub mod plan;
pub mod scheme;
pub mod trigger;


pub use agent::{Agent, LifecycleState, Rescheduler};
pub use arguments::AgentArguments;
pub use concurrency::ConcurrencyContext;
pub use context::ContextContainer;
pub use error::{AgentError, AgentResult};
pub use interceptor::{
    EnhancedInterceptor, InterceptorBuilder, TriggerInterceptor, make_all_mutually_exclusive,
    make_mutually_exclusive,
};
pub use interface::PlanInterface;
pub use messenger::{DefaultMessenger, Messenger};
pub use plan::{Action, Plan, PlanExecutionError, PlanFailure, PlanResult};
pub use scheme::{PlanScheme, PlanSchemeBase};
pub use trigger::{Goal, Message, Trigger, TriggerCategory};
