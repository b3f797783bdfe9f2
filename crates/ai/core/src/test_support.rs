//! Recording fakes for every collaborator trait.
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::ability::{AbilityDescriptor, AbilityId};
use crate::behavior::AiContext;
use crate::config::AiConfig;
use crate::env::{
    AbilityOracle, AiEnv, AiRng, CastError, CombatOracle, ConditionOracle, EligibilityPredicate,
    MotionPlanner, OccupantView, PathResult, Predicate, SeatOracle, SpatialOracle, SplineTarget,
    WorldOracle,
};
use crate::motion::MotionStack;
use crate::scheduler::EventScheduler;
use crate::state::{AgentId, AgentState, AgentView, Millis, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastRecord {
    pub caster: AgentId,
    pub target: AgentId,
    pub ability: AbilityId,
    pub triggered: bool,
}

#[derive(Debug, Default)]
pub struct CombatFake {
    casts: Mutex<Vec<CastRecord>>,
    casting: Mutex<HashSet<AgentId>>,
    rejected: Mutex<HashSet<AbilityId>>,
    breakable_cc: Mutex<HashSet<AgentId>>,
    swings: Mutex<usize>,
    spell_attacks: Mutex<Vec<AbilityId>>,
    attack_starts: Mutex<Vec<(AgentId, bool)>>,
    attack_stops: Mutex<usize>,
    combat_stops: Mutex<usize>,
    cancels: Mutex<usize>,
}

impl CombatFake {
    pub fn casts(&self) -> Vec<CastRecord> {
        self.casts.lock().unwrap().clone()
    }

    pub fn cast_ids(&self) -> Vec<AbilityId> {
        self.casts().into_iter().map(|record| record.ability).collect()
    }

    pub fn clear_casts(&self) {
        self.casts.lock().unwrap().clear();
    }

    pub fn set_casting(&self, agent: AgentId, casting: bool) {
        let mut set = self.casting.lock().unwrap();
        if casting {
            set.insert(agent);
        } else {
            set.remove(&agent);
        }
    }

    pub fn reject(&self, ability: AbilityId) {
        self.rejected.lock().unwrap().insert(ability);
    }

    pub fn set_breakable_cc(&self, target: AgentId) {
        self.breakable_cc.lock().unwrap().insert(target);
    }

    pub fn swings(&self) -> usize {
        *self.swings.lock().unwrap()
    }

    pub fn spell_attacks(&self) -> Vec<AbilityId> {
        self.spell_attacks.lock().unwrap().clone()
    }

    pub fn attack_starts(&self) -> Vec<(AgentId, bool)> {
        self.attack_starts.lock().unwrap().clone()
    }

    pub fn attack_stops(&self) -> usize {
        *self.attack_stops.lock().unwrap()
    }

    pub fn combat_stops(&self) -> usize {
        *self.combat_stops.lock().unwrap()
    }

    pub fn cancels(&self) -> usize {
        *self.cancels.lock().unwrap()
    }
}

impl CombatOracle for CombatFake {
    fn cast(
        &self,
        caster: AgentId,
        target: AgentId,
        ability: AbilityId,
        triggered: bool,
    ) -> Result<(), CastError> {
        if self.rejected.lock().unwrap().contains(&ability) {
            return Err(CastError::NotReady);
        }
        self.casts.lock().unwrap().push(CastRecord {
            caster,
            target,
            ability,
            triggered,
        });
        Ok(())
    }

    fn is_casting(&self, agent: AgentId) -> bool {
        self.casting.lock().unwrap().contains(&agent)
    }

    fn cancel_cast(&self, agent: AgentId) {
        self.casting.lock().unwrap().remove(&agent);
        *self.cancels.lock().unwrap() += 1;
    }

    fn melee_attack_if_ready(&self, _agent: AgentId) -> bool {
        *self.swings.lock().unwrap() += 1;
        true
    }

    fn spell_attack_if_ready(&self, _agent: AgentId, ability: AbilityId) -> bool {
        self.spell_attacks.lock().unwrap().push(ability);
        true
    }

    fn has_breakable_cc(&self, target: AgentId, _attacker: AgentId) -> bool {
        self.breakable_cc.lock().unwrap().contains(&target)
    }

    fn attack_start(&self, _agent: AgentId, target: AgentId, melee: bool) -> bool {
        self.attack_starts.lock().unwrap().push((target, melee));
        true
    }

    fn attack_stop(&self, _agent: AgentId) {
        *self.attack_stops.lock().unwrap() += 1;
    }

    fn combat_stop(&self, _agent: AgentId) {
        *self.combat_stops.lock().unwrap() += 1;
    }
}

/// Flat ground at a fixed height, no water, line of sight unless blocked.
#[derive(Debug, Default)]
pub struct FlatTerrainFake {
    height: f32,
    blocked: Mutex<bool>,
}

impl FlatTerrainFake {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            blocked: Mutex::new(false),
        }
    }

    pub fn block_sight(&self, blocked: bool) {
        *self.blocked.lock().unwrap() = blocked;
    }
}

impl SpatialOracle for FlatTerrainFake {
    fn line_of_sight(&self, _from: &Position, _to: &Position) -> bool {
        !*self.blocked.lock().unwrap()
    }

    fn ground_height(&self, _map: u32, _x: f32, _y: f32, _z_hint: f32, _models: bool) -> f32 {
        self.height
    }

    fn water_or_ground_height(&self, _map: u32, _x: f32, _y: f32, _z_hint: f32) -> f32 {
        self.height
    }

    fn is_submerged(&self, _map: u32, _x: f32, _y: f32, _z: f32) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct PlannerFake {
    reachable: Mutex<bool>,
    travel: Mutex<Millis>,
    moving: Mutex<bool>,
    paths: Mutex<usize>,
    splines: Mutex<Vec<(AgentId, SplineTarget, bool)>>,
    stops: Mutex<usize>,
    leader: Mutex<Option<AgentId>>,
    leader_moves: Mutex<Vec<Position>>,
}

impl Default for PlannerFake {
    fn default() -> Self {
        Self {
            reachable: Mutex::new(true),
            travel: Mutex::new(1000),
            moving: Mutex::new(false),
            paths: Mutex::new(0),
            splines: Mutex::new(Vec::new()),
            stops: Mutex::new(0),
            leader: Mutex::new(None),
            leader_moves: Mutex::new(Vec::new()),
        }
    }
}

impl PlannerFake {
    pub fn set_reachable(&self, reachable: bool) {
        *self.reachable.lock().unwrap() = reachable;
    }

    pub fn set_travel_time(&self, travel: Millis) {
        *self.travel.lock().unwrap() = travel;
    }

    /// Makes every agent report a spline in progress.
    pub fn set_moving(&self, moving: bool) {
        *self.moving.lock().unwrap() = moving;
    }

    pub fn set_leader(&self, leader: AgentId) {
        *self.leader.lock().unwrap() = Some(leader);
    }

    pub fn path_requests(&self) -> usize {
        *self.paths.lock().unwrap()
    }

    pub fn splines(&self) -> Vec<(AgentId, SplineTarget, bool)> {
        self.splines.lock().unwrap().clone()
    }

    pub fn stops(&self) -> usize {
        *self.stops.lock().unwrap()
    }

    pub fn leader_moves(&self) -> Vec<Position> {
        self.leader_moves.lock().unwrap().clone()
    }
}

impl MotionPlanner for PlannerFake {
    fn compute_path(&self, _agent: AgentId, from: &Position, to: &Position) -> PathResult {
        *self.paths.lock().unwrap() += 1;
        if *self.reachable.lock().unwrap() {
            PathResult::Found(vec![*from, *to])
        } else {
            PathResult::NotFound
        }
    }

    fn launch_spline(&self, agent: AgentId, target: SplineTarget, walk: bool) -> Millis {
        self.splines.lock().unwrap().push((agent, target, walk));
        *self.travel.lock().unwrap()
    }

    fn spline_finalized(&self, _agent: AgentId) -> bool {
        !*self.moving.lock().unwrap()
    }

    fn stop_moving(&self, _agent: AgentId) {
        *self.stops.lock().unwrap() += 1;
    }

    fn is_formation_leader(&self, agent: AgentId) -> bool {
        *self.leader.lock().unwrap() == Some(agent)
    }

    fn leader_move_to(&self, _leader: AgentId, destination: &Position) {
        self.leader_moves.lock().unwrap().push(*destination);
    }
}

#[derive(Debug, Default)]
pub struct AbilityBook {
    entries: HashMap<AbilityId, Arc<AbilityDescriptor>>,
}

impl AbilityBook {
    pub fn new(descriptors: impl IntoIterator<Item = AbilityDescriptor>) -> Self {
        Self {
            entries: descriptors
                .into_iter()
                .map(|descriptor| (descriptor.id, Arc::new(descriptor)))
                .collect(),
        }
    }
}

impl AbilityOracle for AbilityBook {
    fn lookup(&self, id: AbilityId) -> Option<Arc<AbilityDescriptor>> {
        self.entries.get(&id).cloned()
    }
}

#[derive(Debug, Default)]
pub struct WorldFake {
    views: Mutex<HashMap<AgentId, AgentView>>,
    friendly: Mutex<HashSet<(AgentId, AgentId)>>,
    blind: Mutex<HashSet<AgentId>>,
    despawned: Mutex<Vec<AgentId>>,
}

impl WorldFake {
    pub fn insert(&self, view: AgentView) {
        self.views.lock().unwrap().insert(view.id, view);
    }

    pub fn remove(&self, id: AgentId) {
        self.views.lock().unwrap().remove(&id);
    }

    pub fn set_friendly(&self, a: AgentId, b: AgentId) {
        let mut friendly = self.friendly.lock().unwrap();
        friendly.insert((a, b));
        friendly.insert((b, a));
    }

    /// `observer` can no longer perceive anyone.
    pub fn blind(&self, observer: AgentId) {
        self.blind.lock().unwrap().insert(observer);
    }

    pub fn despawned(&self) -> Vec<AgentId> {
        self.despawned.lock().unwrap().clone()
    }
}

impl WorldOracle for WorldFake {
    fn view(&self, id: AgentId) -> Option<AgentView> {
        self.views.lock().unwrap().get(&id).copied()
    }

    fn can_perceive(&self, observer: AgentId, _target: AgentId) -> bool {
        !self.blind.lock().unwrap().contains(&observer)
    }

    fn is_friendly(&self, a: AgentId, b: AgentId) -> bool {
        self.friendly.lock().unwrap().contains(&(a, b))
    }

    fn despawn(&self, agent: AgentId) {
        self.despawned.lock().unwrap().push(agent);
    }
}

/// Occupant must be at least this level.
#[derive(Debug)]
pub struct MinLevel(pub u8);

impl EligibilityPredicate for MinLevel {
    fn evaluate(&self, occupant: &OccupantView) -> bool {
        occupant.level >= self.0
    }
}

#[derive(Debug, Default)]
pub struct ConditionsFake {
    by_template: Mutex<HashMap<u32, Vec<Predicate>>>,
}

impl ConditionsFake {
    pub fn set(&self, template_id: u32, predicates: Vec<Predicate>) {
        self.by_template
            .lock()
            .unwrap()
            .insert(template_id, predicates);
    }
}

impl ConditionOracle for ConditionsFake {
    fn conditions_for(&self, template_id: u32) -> Vec<Predicate> {
        self.by_template
            .lock()
            .unwrap()
            .get(&template_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct SeatsFake {
    occupants: Mutex<HashMap<AgentId, Vec<OccupantView>>>,
    ejected: Mutex<Vec<AgentId>>,
    boardable: Mutex<HashMap<AgentId, bool>>,
}

impl SeatsFake {
    pub fn seat(&self, vehicle: AgentId, occupant: OccupantView) {
        self.occupants
            .lock()
            .unwrap()
            .entry(vehicle)
            .or_default()
            .push(occupant);
    }

    pub fn ejected(&self) -> Vec<AgentId> {
        self.ejected.lock().unwrap().clone()
    }

    pub fn boardable(&self, vehicle: AgentId) -> Option<bool> {
        self.boardable.lock().unwrap().get(&vehicle).copied()
    }
}

impl SeatOracle for SeatsFake {
    fn occupants(&self, vehicle: AgentId) -> Vec<OccupantView> {
        self.occupants
            .lock()
            .unwrap()
            .get(&vehicle)
            .cloned()
            .unwrap_or_default()
    }

    fn eject(&self, vehicle: AgentId, occupant: AgentId) {
        if let Some(seated) = self.occupants.lock().unwrap().get_mut(&vehicle) {
            seated.retain(|view| view.id != occupant);
        }
        self.ejected.lock().unwrap().push(occupant);
    }

    fn set_boardable(&self, vehicle: AgentId, boardable: bool) {
        self.boardable.lock().unwrap().insert(vehicle, boardable);
    }
}

/// Every fake, wired into one environment.
#[derive(Debug, Default)]
pub struct Harness {
    pub combat: CombatFake,
    pub terrain: FlatTerrainFake,
    pub planner: PlannerFake,
    pub abilities: AbilityBook,
    pub world: WorldFake,
    pub conditions: ConditionsFake,
    pub seats: SeatsFake,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_abilities(descriptors: impl IntoIterator<Item = AbilityDescriptor>) -> Self {
        Self {
            abilities: AbilityBook::new(descriptors),
            ..Self::default()
        }
    }

    pub fn env(&self) -> AiEnv<'_> {
        AiEnv::with_all(
            &self.combat,
            &self.terrain,
            &self.planner,
            &self.abilities,
            &self.world,
        )
        .with_conditions(&self.conditions)
        .with_seats(&self.seats)
    }
}

/// Kernel state of one agent, ready to lend out as an [`AiContext`].
#[derive(Debug)]
pub struct Rig {
    pub agent: AgentState,
    pub scheduler: EventScheduler,
    pub motion: MotionStack,
    pub rng: AiRng,
    pub config: AiConfig,
}

impl Rig {
    pub fn new(agent: AgentState) -> Self {
        Self {
            agent,
            scheduler: EventScheduler::new(),
            motion: MotionStack::new(),
            rng: AiRng::new(0x5eed),
            config: AiConfig::default(),
        }
    }

    pub fn ctx<'a, 'env>(&'a mut self, env: &'a AiEnv<'env>) -> AiContext<'a, 'env> {
        AiContext {
            agent: &mut self.agent,
            env,
            scheduler: &mut self.scheduler,
            motion: &mut self.motion,
            rng: &mut self.rng,
            config: &self.config,
        }
    }
}
