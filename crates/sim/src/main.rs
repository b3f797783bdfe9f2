//! Headless simulator: loads content, plays a skirmish and reports events.
mod config;
mod scenario;

use std::collections::BTreeMap;

use ai_content::ContentFactory;
use anyhow::{Context, Result};
use config::SimConfig;
use runtime::{Runtime, RuntimeConfig, SimEvent, Topic};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _guard = setup_logging(&config)?;

    let content = ContentFactory::new(&config.content_dir)
        .load()
        .with_context(|| format!("loading content from {}", config.content_dir.display()))?;

    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            ai: content.config.clone(),
            seed: config.seed,
            worker_threads: config.worker_threads,
            ..RuntimeConfig::default()
        })
        .content(content)
        .build()
        .await?;

    let tallies = [Topic::Lifecycle, Topic::Combat]
        .map(|topic| tally(runtime.subscribe(topic)));

    let handle = runtime.handle();
    let agents = scenario::setup(&handle).await?;

    let mut faults = 0;
    for _ in 0..config.ticks {
        faults += handle.tick(config.tick_ms).await?.faults;
    }

    for agent in agents {
        match handle.query_agent(agent).await? {
            Some(snapshot) => tracing::info!(
                %agent,
                archetype = ?snapshot.archetype,
                alive = snapshot.state.alive,
                x = snapshot.state.position.x,
                y = snapshot.state.position.y,
                motion = ?snapshot.motion,
                "final state"
            ),
            None => tracing::info!(%agent, "gone"),
        }
    }

    drop(handle);
    runtime.shutdown().await?;

    let mut counts = BTreeMap::new();
    for task in tallies {
        for (kind, count) in task.await? {
            *counts.entry(kind).or_insert(0usize) += count;
        }
    }
    tracing::info!(
        ticks = config.ticks,
        tick_ms = config.tick_ms,
        seed = config.seed,
        faults,
        "simulation finished"
    );
    for (kind, count) in counts {
        tracing::info!("{kind}: {count}");
    }

    Ok(())
}

/// Counts events per kind until the bus closes.
fn tally(mut rx: broadcast::Receiver<SimEvent>) -> JoinHandle<BTreeMap<&'static str, usize>> {
    tokio::spawn(async move {
        let mut counts = BTreeMap::new();
        loop {
            match rx.recv().await {
                Ok(event) => *counts.entry(kind(&event)).or_insert(0) += 1,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event tally lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        counts
    })
}

fn kind(event: &SimEvent) -> &'static str {
    use runtime::CombatRecord;

    match event {
        SimEvent::Spawned { .. } => "spawned",
        SimEvent::Died { .. } => "died",
        SimEvent::Despawned { .. } => "despawned",
        SimEvent::Unsummoned { .. } => "unsummoned",
        SimEvent::Evicted { .. } => "evicted",
        SimEvent::Combat(CombatRecord::Cast { .. }) => "cast",
        SimEvent::Combat(CombatRecord::Swing { .. }) => "swing",
        SimEvent::Combat(CombatRecord::SpellAttack { .. }) => "spell_attack",
        SimEvent::Combat(CombatRecord::Engaged { .. }) => "engaged",
        SimEvent::AgentFault { .. } => "fault",
        SimEvent::TickCompleted { .. } => "tick",
    }
}

/// Stderr logging, plus a non-blocking file layer when a log dir is set.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn setup_logging(
    config: &SimConfig,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::never(dir, "ai-sim.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!(seed = config.seed, content = %config.content_dir.display(), "logging initialized");
    Ok(guard)
}
