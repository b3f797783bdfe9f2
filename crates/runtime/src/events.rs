//! Topic-based event bus for simulation events.
//!
//! Publishing is best-effort: a topic without subscribers drops its events.

use ai_core::{AgentId, Archetype};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::oracle::CombatRecord;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Spawns, deaths, despawns, unsummons and seat evictions
    Lifecycle,
    /// Casts, swings and engagements
    Combat,
    /// One event per completed tick
    Tick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Spawned {
        agent: AgentId,
        template: u32,
        archetype: Option<Archetype>,
    },
    Died {
        agent: AgentId,
        killer: Option<AgentId>,
    },
    Despawned {
        agent: AgentId,
    },
    /// A totem expired or lost its owner.
    Unsummoned {
        agent: AgentId,
    },
    Evicted {
        vehicle: AgentId,
        occupant: AgentId,
    },
    Combat(CombatRecord),
    /// An agent's update failed this tick; it retries next tick.
    AgentFault {
        agent: AgentId,
        code: String,
    },
    TickCompleted {
        clock: u64,
        agents: usize,
    },
}

impl SimEvent {
    pub fn topic(&self) -> Topic {
        match self {
            SimEvent::Combat(_) => Topic::Combat,
            SimEvent::TickCompleted { .. } | SimEvent::AgentFault { .. } => Topic::Tick,
            _ => Topic::Lifecycle,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EventBus {
    lifecycle: broadcast::Sender<SimEvent>,
    combat: broadcast::Sender<SimEvent>,
    tick: broadcast::Sender<SimEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a bus with `capacity` buffered events per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lifecycle: broadcast::channel(capacity).0,
            combat: broadcast::channel(capacity).0,
            tick: broadcast::channel(capacity).0,
        }
    }

    pub fn publish(&self, event: SimEvent) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<SimEvent> {
        self.sender(topic).subscribe()
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<SimEvent> {
        match topic {
            Topic::Lifecycle => &self.lifecycle,
            Topic::Combat => &self.combat,
            Topic::Tick => &self.tick,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_only_their_topic() {
        let bus = EventBus::new();
        let mut lifecycle = bus.subscribe(Topic::Lifecycle);
        let mut ticks = bus.subscribe(Topic::Tick);

        bus.publish(SimEvent::Despawned { agent: AgentId(3) });

        assert_eq!(
            lifecycle.try_recv().ok(),
            Some(SimEvent::Despawned { agent: AgentId(3) })
        );
        assert!(ticks.try_recv().is_err());
    }
}
