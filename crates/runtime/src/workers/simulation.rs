//! Simulation worker that owns every agent and drives the world tick.
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs the
//! AI kernel for each agent and publishes events to the [`EventBus`].
//!
//! A tick proceeds in fixed phases: refresh the world snapshot, update every
//! agent (in groups across scoped threads), advance splines and combat
//! timers, then apply the world commands the agents issued (evictions,
//! despawns, totem unsummons).

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use ai_content::AgentTemplate;
use ai_core::{
    AbilityId, AgentId, AgentState, AiConfig, AiEnv, AiError, Brain, CombatOracle, MotionGenerator,
    OccupantView, OracleError, SeatOracle, TotemLifetime, TotemStatus,
};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{mpsc, oneshot};
use tokio::task;
use tracing::{debug, error, info, trace, warn};

use crate::api::{AgentSnapshot, Result, RuntimeError, SpawnRequest, TickSummary};
use crate::events::{EventBus, SimEvent};
use crate::oracle::{CombatRecord, OracleManager};

/// Commands that can be sent to the simulation worker
pub enum Command {
    Spawn {
        request: SpawnRequest,
        reply: oneshot::Sender<Result<AgentId>>,
    },
    SetTarget {
        agent: AgentId,
        target: AgentId,
        reply: oneshot::Sender<Result<()>>,
    },
    EnterCombat {
        agent: AgentId,
        target: AgentId,
        reply: oneshot::Sender<Result<()>>,
    },
    Tick {
        delta: u32,
        reply: oneshot::Sender<TickSummary>,
    },
    QueryAgent {
        agent: AgentId,
        reply: oneshot::Sender<Option<AgentSnapshot>>,
    },
    Interrupt {
        agent: AgentId,
        reply: oneshot::Sender<Result<Option<AbilityId>>>,
    },
    Kill {
        agent: AgentId,
        killer: Option<AgentId>,
        reply: oneshot::Sender<Result<()>>,
    },
    OccupantChanged {
        vehicle: AgentId,
        in_use: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    Board {
        vehicle: AgentId,
        occupant: OccupantView,
        reply: oneshot::Sender<Result<bool>>,
    },
    Leave {
        vehicle: AgentId,
        occupant: AgentId,
        reply: oneshot::Sender<Result<()>>,
    },
    Distract {
        agent: AgentId,
        duration: u32,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Stops the worker loop.
    Shutdown,
}

/// One agent and everything the worker keeps about it.
#[derive(Debug)]
struct AgentSlot {
    state: AgentState,
    brain: Option<Brain>,
    totem: Option<TotemLifetime>,
}

impl AgentSlot {
    fn update(&mut self, env: &AiEnv<'_>, delta: u32) -> std::result::Result<(), OracleError> {
        if !self.state.alive {
            return Ok(());
        }
        match self.brain.as_mut() {
            Some(brain) => brain.update(&mut self.state, env, delta),
            None => Ok(()),
        }
    }
}

/// Background task that owns the agent population.
pub struct SimulationWorker {
    agents: Vec<AgentSlot>,
    templates: HashMap<u32, AgentTemplate>,
    oracles: OracleManager,
    config: Arc<AiConfig>,
    seed: u64,
    worker_threads: usize,
    clock: u64,
    next_id: u32,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SimulationWorker {
    pub fn new(
        templates: impl IntoIterator<Item = AgentTemplate>,
        oracles: OracleManager,
        config: Arc<AiConfig>,
        seed: u64,
        worker_threads: usize,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        let templates: HashMap<_, _> = templates
            .into_iter()
            .map(|template| (template.id, template))
            .collect();

        info!(
            target: "runtime::worker",
            templates = templates.len(),
            worker_threads,
            seed,
            "SimulationWorker initialized"
        );

        Self {
            agents: Vec::new(),
            templates,
            oracles,
            config,
            seed,
            worker_threads: worker_threads.max(1),
            clock: 0,
            next_id: 1,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if matches!(cmd, Command::Shutdown) {
                        break;
                    }
                    self.handle_command(cmd);
                }
                else => break,
            }
        }
        debug!(target: "runtime::worker", agents = self.agents.len(), "worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Spawn { request, reply } => {
                let result = self.spawn(request);
                if reply.send(result).is_err() {
                    debug!("Spawn reply channel closed (caller dropped)");
                }
            }
            Command::SetTarget {
                agent,
                target,
                reply,
            } => {
                let result = self.set_target(agent, target);
                if reply.send(result).is_err() {
                    debug!("SetTarget reply channel closed (caller dropped)");
                }
            }
            Command::EnterCombat {
                agent,
                target,
                reply,
            } => {
                let result = self.enter_combat(agent, target);
                if reply.send(result).is_err() {
                    debug!("EnterCombat reply channel closed (caller dropped)");
                }
            }
            Command::Tick { delta, reply } => {
                let summary = self.tick(delta);
                if reply.send(summary).is_err() {
                    debug!("Tick reply channel closed (caller dropped)");
                }
            }
            Command::QueryAgent { agent, reply } => {
                if reply.send(self.snapshot(agent)).is_err() {
                    debug!("QueryAgent reply channel closed (caller dropped)");
                }
            }
            Command::Interrupt { agent, reply } => {
                let result = self.interrupt(agent);
                if reply.send(result).is_err() {
                    debug!("Interrupt reply channel closed (caller dropped)");
                }
            }
            Command::Kill {
                agent,
                killer,
                reply,
            } => {
                let result = self.kill(agent, killer);
                if reply.send(result).is_err() {
                    debug!("Kill reply channel closed (caller dropped)");
                }
            }
            Command::OccupantChanged {
                vehicle,
                in_use,
                reply,
            } => {
                let result = self.occupant_changed(vehicle, in_use);
                if reply.send(result).is_err() {
                    debug!("OccupantChanged reply channel closed (caller dropped)");
                }
            }
            Command::Board {
                vehicle,
                occupant,
                reply,
            } => {
                let result = self.board(vehicle, occupant);
                if reply.send(result).is_err() {
                    debug!("Board reply channel closed (caller dropped)");
                }
            }
            Command::Leave {
                vehicle,
                occupant,
                reply,
            } => {
                let result = self.leave(vehicle, occupant);
                if reply.send(result).is_err() {
                    debug!("Leave reply channel closed (caller dropped)");
                }
            }
            Command::Distract {
                agent,
                duration,
                reply,
            } => {
                let result = self.with_brain(agent, |brain, state, env| {
                    brain.push_motion(state, env, MotionGenerator::distract(duration))
                });
                if reply.send(result).is_err() {
                    debug!("Distract reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {}
        }
    }

    fn spawn(&mut self, request: SpawnRequest) -> Result<AgentId> {
        let template = self
            .templates
            .get(&request.template)
            .ok_or(RuntimeError::UnknownTemplate(request.template))?;

        let id = AgentId(self.next_id);
        self.next_id += 1;

        let mut state = template.instantiate(id, request.position);
        state.owner = request.owner;
        self.oracles
            .world
            .upsert(state.view(), request.owner, request.faction);

        let totem = template.totem_duration_ms.map(|duration| {
            self.oracles.combat.register_totem(id, template.id);
            TotemLifetime::new(duration)
        });

        let env = self.oracles.env();
        let mut brain = match template.archetype {
            Some(archetype) => Some(Brain::with_archetype(
                archetype,
                &state,
                &env,
                Arc::clone(&self.config),
                self.seed,
            )),
            None => Brain::for_agent(&state, &env, Arc::clone(&self.config), self.seed),
        };
        if let Some(brain) = brain.as_mut()
            && let Err(error) = brain.initialize(&mut state, &env)
        {
            self.oracles.world.remove(id);
            self.oracles.combat.forget(id);
            return Err(error.into());
        }

        let archetype = brain.as_ref().map(Brain::archetype);
        info!(
            target: "runtime::worker",
            agent = %id,
            template = template.id,
            name = %template.name,
            archetype = ?archetype,
            "spawned"
        );
        self.event_bus.publish(SimEvent::Spawned {
            agent: id,
            template: template.id,
            archetype,
        });

        // ids only grow, so pushing keeps the slots sorted
        self.agents.push(AgentSlot {
            state,
            brain,
            totem,
        });
        Ok(id)
    }

    fn set_target(&mut self, agent: AgentId, target: AgentId) -> Result<()> {
        self.require(target)?;
        self.with_brain(agent, |brain, state, env| brain.set_target(state, env, target))
    }

    fn enter_combat(&mut self, agent: AgentId, target: AgentId) -> Result<()> {
        self.require(target)?;
        self.with_brain(agent, |brain, state, env| brain.enter_combat(state, env, target))
    }

    fn interrupt(&mut self, agent: AgentId) -> Result<Option<AbilityId>> {
        self.require(agent)?;
        let Some(ability) = self.oracles.combat.interrupt(agent) else {
            return Ok(None);
        };

        let recovery = self.config.interrupt_recovery_ms;
        self.with_brain(agent, |brain, state, env| {
            brain.spell_interrupted(state, env, ability, recovery);
            Ok(())
        })?;
        Ok(Some(ability))
    }

    fn kill(&mut self, agent: AgentId, killer: Option<AgentId>) -> Result<()> {
        let index = self.index_of(agent)?;
        let env = self.oracles.env();
        let slot = &mut self.agents[index];
        if !slot.state.alive {
            return Err(RuntimeError::AgentDead(agent));
        }

        slot.state.alive = false;
        self.oracles.world.refresh([slot.state.view()]);
        if let Some(brain) = slot.brain.as_mut() {
            brain.just_died(&mut slot.state, &env, killer)?;
        }
        self.oracles.combat.combat_stop(agent);

        info!(target: "runtime::worker", %agent, killer = ?killer, "died");
        self.event_bus.publish(SimEvent::Died { agent, killer });
        self.publish_combat_records();
        Ok(())
    }

    fn occupant_changed(&mut self, vehicle: AgentId, in_use: bool) -> Result<()> {
        self.with_brain(vehicle, |brain, state, env| {
            brain.occupant_changed(state, env, in_use)
        })
    }

    fn board(&mut self, vehicle: AgentId, occupant: OccupantView) -> Result<bool> {
        self.require(vehicle)?;
        let was_empty = self.oracles.seats.occupant_count(vehicle) == 0;
        if !self.oracles.seats.board(vehicle, occupant) {
            debug!(target: "runtime::worker", %vehicle, occupant = %occupant.id, "boarding refused");
            return Ok(false);
        }
        if was_empty {
            self.occupant_changed(vehicle, true)?;
        }
        Ok(true)
    }

    fn leave(&mut self, vehicle: AgentId, occupant: AgentId) -> Result<()> {
        self.require(vehicle)?;
        if self.oracles.seats.leave(vehicle, occupant) {
            self.occupant_changed(vehicle, false)?;
        }
        Ok(())
    }

    /// Advances the whole world by one tick.
    fn tick(&mut self, delta: u32) -> TickSummary {
        self.clock = self.clock.saturating_add(u64::from(delta));
        self.oracles
            .world
            .refresh(self.agents.iter().map(|slot| slot.state.view()));

        self.publish_combat_records();
        let faults = self.update_agents(delta);
        for (agent, fault) in &faults {
            warn!(
                target: "runtime::worker",
                %agent,
                code = fault.error_code(),
                error = %fault,
                "agent update failed"
            );
            self.event_bus.publish(SimEvent::AgentFault {
                agent: *agent,
                code: fault.error_code().to_string(),
            });
        }

        for slot in &mut self.agents {
            self.oracles.planner.advance(&mut slot.state, delta);
        }
        self.oracles.combat.advance(delta);
        self.publish_combat_records();

        self.process_evictions();
        self.process_totems(delta);
        self.process_despawns();

        let summary = TickSummary {
            clock: self.clock,
            agents: self.agents.len(),
            faults: faults.len(),
        };
        trace!(target: "runtime::worker", clock = summary.clock, agents = summary.agents, "tick");
        self.event_bus.publish(SimEvent::TickCompleted {
            clock: summary.clock,
            agents: summary.agents,
        });
        summary
    }

    /// Updates every agent, in contiguous groups on scoped threads.
    ///
    /// Each group holds exclusive `&mut` access to its agents; cross-agent
    /// effects go through the shared collaborators only. On a multi-threaded
    /// tokio runtime the parallel section runs under `block_in_place`.
    fn update_agents(&mut self, delta: u32) -> Vec<(AgentId, RuntimeError)> {
        let env = self.oracles.env();
        let group_size = self.agents.len().div_ceil(self.worker_threads).max(1);

        if self.worker_threads == 1 || self.agents.len() <= group_size {
            return update_group(&mut self.agents, &env, delta);
        }

        let agents = &mut self.agents;
        let mut parallel = move || {
            thread::scope(|scope| {
                let handles: Vec<_> = agents
                    .chunks_mut(group_size)
                    .map(|group| {
                        let ids: Vec<AgentId> = group.iter().map(|slot| slot.state.id).collect();
                        (ids, scope.spawn(move || update_group(group, &env, delta)))
                    })
                    .collect();

                handles
                    .into_iter()
                    .flat_map(|(ids, handle)| group_faults(ids, handle.join()))
                    .collect()
            })
        };

        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                task::block_in_place(parallel)
            }
            _ => parallel(),
        }
    }

    fn process_evictions(&mut self) {
        let mut evictions = self.oracles.seats.take_evictions();
        // groups eject concurrently; per-vehicle order is preserved
        evictions.sort_by_key(|&(vehicle, _)| vehicle);

        for (vehicle, occupant) in evictions {
            info!(target: "runtime::worker", %vehicle, %occupant, "occupant evicted");
            self.event_bus.publish(SimEvent::Evicted { vehicle, occupant });

            if self.oracles.seats.occupants(vehicle).is_empty()
                && let Err(error) = self.occupant_changed(vehicle, false)
            {
                warn!(target: "runtime::worker", %vehicle, %error, "vehicle idle notification failed");
            }
        }
    }

    fn process_totems(&mut self, delta: u32) {
        let alive: HashMap<AgentId, bool> = self
            .agents
            .iter()
            .map(|slot| (slot.state.id, slot.state.alive))
            .collect();

        let mut expired = Vec::new();
        for slot in &mut self.agents {
            let Some(lifetime) = slot.totem.as_mut() else {
                continue;
            };
            let owner_alive = slot
                .state
                .owner
                .is_none_or(|owner| alive.get(&owner).copied().unwrap_or(false));

            if lifetime.update(delta, owner_alive, slot.state.alive) == TotemStatus::Unsummon {
                expired.push(slot.state.id);
            }
        }

        for agent in expired {
            debug!(target: "runtime::worker", %agent, "totem unsummoned");
            self.remove(agent);
            self.event_bus.publish(SimEvent::Unsummoned { agent });
        }
    }

    fn process_despawns(&mut self) {
        for agent in self.oracles.world.take_despawns() {
            if self.remove(agent) {
                info!(target: "runtime::worker", %agent, "despawned");
                self.event_bus.publish(SimEvent::Despawned { agent });
            }
        }
    }

    fn remove(&mut self, agent: AgentId) -> bool {
        let Ok(index) = self.find(agent) else {
            return false;
        };
        self.agents.remove(index);
        self.oracles.world.remove(agent);
        self.oracles.planner.forget(agent);
        self.oracles.combat.forget(agent);
        self.oracles.seats.forget(agent);
        true
    }

    /// Publishes pending combat records in agent order.
    ///
    /// Agent groups record concurrently; a stable sort on the acting agent
    /// restores the single-threaded order since each agent's own records
    /// are pushed sequentially.
    fn publish_combat_records(&self) {
        let mut records = self.oracles.combat.take_records();
        records.sort_by_key(CombatRecord::actor);

        for record in records {
            self.event_bus.publish(SimEvent::Combat(record));
        }
    }

    fn snapshot(&self, agent: AgentId) -> Option<AgentSnapshot> {
        let slot = &self.agents[self.find(agent).ok()?];
        Some(AgentSnapshot {
            state: slot.state.clone(),
            archetype: slot.brain.as_ref().map(Brain::archetype),
            motion: slot
                .brain
                .as_ref()
                .map(|brain| brain.motion().kinds())
                .unwrap_or_default(),
            pending_events: slot
                .brain
                .as_ref()
                .map_or(0, |brain| brain.scheduler().len()),
        })
    }

    /// Runs `call` against the brain of `agent`. Agents without AI accept
    /// every call as a no-op.
    fn with_brain(
        &mut self,
        agent: AgentId,
        call: impl FnOnce(&mut Brain, &mut AgentState, &AiEnv<'_>) -> std::result::Result<(), OracleError>,
    ) -> Result<()> {
        let index = self.index_of(agent)?;
        let env = self.oracles.env();
        let slot = &mut self.agents[index];

        match slot.brain.as_mut() {
            Some(brain) => call(brain, &mut slot.state, &env)?,
            None => trace!(target: "runtime::worker", %agent, "agent has no AI"),
        }
        self.oracles.world.refresh([slot.state.view()]);
        self.publish_combat_records();
        Ok(())
    }

    fn require(&self, agent: AgentId) -> Result<()> {
        self.index_of(agent).map(|_| ())
    }

    fn index_of(&self, agent: AgentId) -> Result<usize> {
        self.find(agent).map_err(|_| RuntimeError::UnknownAgent(agent))
    }

    fn find(&self, agent: AgentId) -> std::result::Result<usize, usize> {
        self.agents.binary_search_by_key(&agent, |slot| slot.state.id)
    }
}

fn update_group(
    group: &mut [AgentSlot],
    env: &AiEnv<'_>,
    delta: u32,
) -> Vec<(AgentId, RuntimeError)> {
    group
        .iter_mut()
        .filter_map(|slot| {
            let error = slot.update(env, delta).err()?;
            Some((slot.state.id, RuntimeError::from(error)))
        })
        .collect()
}

/// Faults of one joined agent group. A panicked group faults every agent it
/// held.
fn group_faults(
    ids: Vec<AgentId>,
    joined: thread::Result<Vec<(AgentId, RuntimeError)>>,
) -> Vec<(AgentId, RuntimeError)> {
    match joined {
        Ok(faults) => faults,
        Err(_) => {
            error!(target: "runtime::worker", agents = ids.len(), "agent group panicked");
            ids.into_iter()
                .map(|id| (id, RuntimeError::AgentPanicked(id)))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;

    #[test]
    fn panicked_group_faults_every_agent() {
        let panic: Box<dyn Any + Send> = Box::new("boom");
        let faults = group_faults(vec![AgentId(3), AgentId(4)], Err(panic));

        let codes: Vec<_> = faults
            .iter()
            .map(|(agent, fault)| (*agent, fault.error_code()))
            .collect();
        assert_eq!(
            codes,
            vec![
                (AgentId(3), "RUNTIME_AGENT_PANICKED"),
                (AgentId(4), "RUNTIME_AGENT_PANICKED"),
            ]
        );
    }

    #[test]
    fn joined_group_keeps_its_own_faults() {
        let joined = Ok(vec![(AgentId(7), RuntimeError::AgentDead(AgentId(7)))]);
        let faults = group_faults(vec![AgentId(6), AgentId(7)], joined);

        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].0, AgentId(7));
    }
}
