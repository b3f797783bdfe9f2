//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! spawning agents, driving ticks and streaming events.
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};

use ai_core::{AbilityId, AgentId, AgentState, Archetype, Millis, MotionKind, OccupantView, Position};

use super::errors::{Result, RuntimeError};
use crate::events::{EventBus, SimEvent, Topic};
use crate::workers::Command;

/// Parameters of one spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub template: u32,
    pub position: Position,
    /// Non-owning back reference (summoner, charmer).
    pub owner: Option<AgentId>,
    /// Agents of the same faction are friendly to each other.
    pub faction: u32,
}

impl SpawnRequest {
    pub fn new(template: u32, position: Position) -> Self {
        Self {
            template,
            position,
            owner: None,
            faction: 0,
        }
    }

    pub fn with_owner(mut self, owner: AgentId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_faction(mut self, faction: u32) -> Self {
        self.faction = faction;
        self
    }
}

/// Read-only copy of one agent as the worker last left it.
#[derive(Debug, Clone)]
pub struct AgentSnapshot {
    pub state: AgentState,
    pub archetype: Option<Archetype>,
    /// Motion stack from bottom to top.
    pub motion: Vec<MotionKind>,
    pub pending_events: usize,
}

/// Outcome of one world tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub clock: u64,
    pub agents: usize,
    pub faults: usize,
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Spawns a hostile-to-everyone agent from `template` at `position`.
    pub async fn spawn(&self, template: u32, position: Position) -> Result<AgentId> {
        self.spawn_with(SpawnRequest::new(template, position)).await
    }

    pub async fn spawn_with(&self, request: SpawnRequest) -> Result<AgentId> {
        self.request(|reply| Command::Spawn { request, reply }).await?
    }

    /// Assigns a target explicitly (charmed or summoned agents).
    pub async fn set_target(&self, agent: AgentId, target: AgentId) -> Result<()> {
        self.request(|reply| Command::SetTarget {
            agent,
            target,
            reply,
        })
        .await?
    }

    /// Puts `agent` in combat with `target`.
    pub async fn enter_combat(&self, agent: AgentId, target: AgentId) -> Result<()> {
        self.request(|reply| Command::EnterCombat {
            agent,
            target,
            reply,
        })
        .await?
    }

    /// Advances the whole world by `delta` milliseconds.
    pub async fn tick(&self, delta: Millis) -> Result<TickSummary> {
        self.request(|reply| Command::Tick { delta, reply }).await
    }

    pub async fn query_agent(&self, agent: AgentId) -> Result<Option<AgentSnapshot>> {
        self.request(|reply| Command::QueryAgent { agent, reply })
            .await
    }

    /// Interrupts the current cast of `agent`. Returns the interrupted ability.
    pub async fn interrupt(&self, agent: AgentId) -> Result<Option<AbilityId>> {
        self.request(|reply| Command::Interrupt { agent, reply })
            .await?
    }

    pub async fn kill(&self, agent: AgentId, killer: Option<AgentId>) -> Result<()> {
        self.request(|reply| Command::Kill {
            agent,
            killer,
            reply,
        })
        .await?
    }

    /// Notifies a vehicle that it became used or idle.
    pub async fn occupant_changed(&self, vehicle: AgentId, in_use: bool) -> Result<()> {
        self.request(|reply| Command::OccupantChanged {
            vehicle,
            in_use,
            reply,
        })
        .await?
    }

    /// Seats `occupant` in `vehicle`. Returns false when boarding was refused.
    pub async fn board(&self, vehicle: AgentId, occupant: OccupantView) -> Result<bool> {
        self.request(|reply| Command::Board {
            vehicle,
            occupant,
            reply,
        })
        .await?
    }

    pub async fn leave(&self, vehicle: AgentId, occupant: AgentId) -> Result<()> {
        self.request(|reply| Command::Leave {
            vehicle,
            occupant,
            reply,
        })
        .await?
    }

    /// Distracts `agent` for `duration` milliseconds.
    pub async fn distract(&self, agent: AgentId, duration: Millis) -> Result<()> {
        self.request(|reply| Command::Distract {
            agent,
            duration,
            reply,
        })
        .await?
    }

    pub(crate) async fn shutdown_worker(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<SimEvent> {
        self.event_bus.subscribe(topic)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
