//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive the world.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use ai_content::Content;
use ai_core::AiConfig;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{EventBus, SimEvent, Topic};
use crate::oracle::OracleManager;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub ai: AiConfig,
    /// World seed; every agent RNG derives from it.
    pub seed: u64,
    /// Scoped threads used to update agent groups within one tick.
    pub worker_threads: usize,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            seed: 0,
            worker_threads: 1,
            command_buffer_size: 32,
            event_buffer_size: 256,
        }
    }
}

/// Main runtime that hosts the simulation worker.
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> tokio::sync::broadcast::Receiver<SimEvent> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Commands queued before the call are still processed; outstanding
    /// handle clones fail with [`RuntimeError::CommandChannelClosed`] afterwards.
    pub async fn shutdown(self) -> Result<()> {
        // the worker may already be gone when every sender was dropped
        let _ = self.handle.shutdown_worker().await;
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    content: Option<Content>,
    oracles: Option<OracleManager>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            content: None,
            oracles: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Content to spawn agents from (required).
    pub fn content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Custom collaborators. Defaults to [`OracleManager::from_content`].
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.config.worker_threads = threads;
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let content = self.content.ok_or(RuntimeError::MissingContent)?;
        let oracles = self
            .oracles
            .unwrap_or_else(|| OracleManager::from_content(&content));

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let sim_worker = SimulationWorker::new(
            content.templates,
            oracles,
            Arc::new(self.config.ai),
            self.config.seed,
            self.config.worker_threads,
            command_rx,
            event_bus,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
