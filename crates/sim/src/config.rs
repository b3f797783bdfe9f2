//! Simulation configuration read from the process environment.
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct SimConfig {
    pub seed: u64,
    pub ticks: u32,
    pub tick_ms: u32,
    pub worker_threads: usize,
    pub content_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            ticks: 600,
            tick_ms: 100,
            worker_threads: 2,
            content_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../ai/content/data")),
            log_dir: None,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `AI_SIM_SEED` - World seed (default: 0x5eed)
    /// - `AI_SIM_TICKS` - Number of ticks to run (default: 600)
    /// - `AI_SIM_TICK_MS` - Tick length in milliseconds (default: 100)
    /// - `AI_SIM_WORKERS` - Agent update threads per tick (default: 2)
    /// - `AI_SIM_CONTENT_DIR` - Content data directory (default: bundled data)
    /// - `AI_SIM_LOG_DIR` - Also write logs to `<dir>/ai-sim.log` (default: stderr only)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(seed) = read_env::<u64>("AI_SIM_SEED") {
            config.seed = seed;
        }
        if let Some(ticks) = read_env::<u32>("AI_SIM_TICKS") {
            config.ticks = ticks;
        }
        if let Some(tick_ms) = read_env::<u32>("AI_SIM_TICK_MS") {
            config.tick_ms = tick_ms.max(1);
        }
        if let Some(workers) = read_env::<usize>("AI_SIM_WORKERS") {
            config.worker_threads = workers.max(1);
        }
        if let Ok(dir) = env::var("AI_SIM_CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        config.log_dir = env::var("AI_SIM_LOG_DIR").ok().map(PathBuf::from);

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
