//! pingpong — smallest demo for the rust_apl agent engine.
//!
//! Two agents rally `Ping`/`Pong` messages.  The pinger never registers a
//! message scheme: every reply is caught by a one-shot wait-for-message
//! interceptor that re-arms itself.  A third agent counts to a target driven
//! only by a goal and goes to sleep once the goal is achieved.
//!
//! Environment: `APL_THREADS`, `APL_SEED`, `APL_TICKS`, `APL_TIMELOG`,
//! and `RUST_LOG` for log filtering.

use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use apl_agent::{AgentArguments, ContextContainer, Goal, Message, Plan, PlanInterface, Trigger};
use apl_core::{AgentId, EngineConfig};
use apl_output::TimeLogHook;
use apl_sim::{PlatformBuilder, SimulationEngine};

// ── Constants ─────────────────────────────────────────────────────────────────

const THREADS:      usize = 4;
const TICKS:        u64   = 30;
const SEED:         u64   = 42;
const RALLIES:      u32   = 5;
const COUNT_TARGET: u32   = 10;

// ── Messages and contexts ─────────────────────────────────────────────────────

struct Ping(u32);

struct Pong(u32);

#[derive(Default)]
struct Rallies(u32);

#[derive(Default)]
struct Counter(u32);

// ── Pinger ────────────────────────────────────────────────────────────────────

/// Wait for the next `Pong`, then serve again or finish.
fn await_pong(iface: &PlanInterface<'_>, ponger: AgentId) {
    iface.wait_for_message(
        |m| m.downcast_ref::<Pong>().is_some(),
        move |m: &Message, iface| {
            let n = m.downcast_ref::<Pong>().map_or(0, |p| p.0);
            if let Some(mut rallies) = iface.context_mut::<Rallies>() {
                rallies.0 = n + 1;
            }
            if n + 1 >= RALLIES {
                info!(agent = %iface.agent_id(), rallies = n + 1, "pinger done");
                iface.finish_agent();
            } else {
                iface.send_message(ponger, Ping(n + 1))?;
                await_pong(iface, ponger);
            }
            Ok(None)
        },
    );
}

fn pinger(ponger: AgentId) -> AgentArguments {
    AgentArguments::new()
        .context(Rallies::default())
        .initial_plan(Plan::run_once(move |iface| {
            iface.send_message(ponger, Ping(0))?;
            await_pong(iface, ponger);
            Ok(None)
        }))
        .shutdown_plan(Plan::run_once(|iface| {
            let rallies = iface.context::<Rallies>().map_or(0, |r| r.0);
            info!(agent = %iface.agent_id(), rallies, "pinger shutting down");
            Ok(None)
        }))
}

// ── Ponger ────────────────────────────────────────────────────────────────────

fn on_ping(trigger: &Trigger, _: &ContextContainer) -> Option<Plan> {
    let message = trigger.as_message()?;
    let n = message.downcast_ref::<Ping>()?.0;
    let sender = message.sender?;
    Some(Plan::run_once(move |iface| {
        iface.send_message(sender, Pong(n))?;
        Ok(None)
    }))
}

fn ponger() -> AgentArguments {
    AgentArguments::new().message_scheme(on_ping)
}

// ── Counter ───────────────────────────────────────────────────────────────────

fn counter() -> AgentArguments {
    let goal = Goal::new("count", |c| c.get::<Counter>().is_some_and(|n| n.0 >= COUNT_TARGET));
    let scheme = |t: &Trigger, _: &ContextContainer| {
        t.as_goal().map(|_| {
            Plan::new(|iface| {
                if let Some(mut counter) = iface.context_mut::<Counter>() {
                    counter.0 += 1;
                }
                Ok(None)
            })
        })
    };
    AgentArguments::new()
        .context(Counter::default())
        .goal_scheme(scheme)
        .initial_goal(goal)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::new(THREADS, TICKS).with_seed(SEED).with_env_overrides()?;
    println!("=== pingpong — rust_apl agent engine ===");
    println!(
        "Threads: {:?}  |  Ticks: {:?}  |  Seed: {:?}",
        config.num_threads, config.total_ticks, config.seed
    );

    let platform = PlatformBuilder::new(config.clone()).build()?;
    let pong_id = platform.spawn(ponger())?;
    let ping_id = platform.spawn(pinger(pong_id))?;
    let counter_id = platform.spawn(counter())?;
    println!("Spawned {} agents", platform.nof_agents());

    let mut engine = SimulationEngine::new(std::sync::Arc::clone(&platform));
    let time_log = match TimeLogHook::from_config(&config)? {
        Some(hook) => {
            let errors = hook.errors();
            engine.register_hook(hook);
            Some(errors)
        }
        None => None,
    };

    let started = Instant::now();
    let last_tick = engine.run();
    println!("Ran {} ticks in {:.2?}", last_tick.0, started.elapsed());

    if let Some(e) = time_log.and_then(|errors| errors.take()) {
        return Err(e.into());
    }
    if let Some(path) = &config.time_log {
        println!("Time log: {}", path.display());
    }

    println!("Pinger alive: {}", platform.agent(ping_id).is_some());
    if let Some(agent) = platform.agent(counter_id) {
        let count = agent.contexts().get::<Counter>().map_or(0, |c| c.0);
        println!("Counter reached {count} (target {COUNT_TARGET}), state {:?}", agent.lifecycle());
    }
    Ok(())
}
