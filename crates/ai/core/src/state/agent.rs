use arrayvec::ArrayVec;

use super::{AgentId, Position};
use crate::ability::AbilityId;
use crate::config::AiConfig;

bitflags::bitflags! {
    /// Transient state flags carried by an agent.
    ///
    /// Combat and crowd-control flags are written by the world; motion flags
    /// (`CHASE`, `FOLLOW`, `ROAMING*`, `ROTATING`, `MOVE`) are owned by the
    /// motion generator that set them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UnitState: u32 {
        const IN_COMBAT    = 1 << 0;
        const ROOT         = 1 << 1;
        const STUNNED      = 1 << 2;
        const DISTRACTED   = 1 << 3;
        const CASTING      = 1 << 4;
        const CHASE        = 1 << 5;
        const FOLLOW       = 1 << 6;
        const ROAMING      = 1 << 7;
        const ROAMING_MOVE = 1 << 8;
        const ROTATING     = 1 << 9;
        const MOVE         = 1 << 10;
        const EVADE        = 1 << 11;

        /// Any state that pins the agent in place for wandering purposes.
        const IMMOBILIZED = Self::ROOT.bits() | Self::STUNNED.bits() | Self::DISTRACTED.bits();
    }
}

/// How an agent reacts to hostiles entering its awareness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactState {
    Passive,
    Defensive,
    #[default]
    Aggressive,
}

/// The entity under AI control.
///
/// Owned by the world; borrowed mutably by the kernel for one update call.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentState {
    pub id: AgentId,
    /// Template the agent was spawned from (keys eligibility conditions).
    pub template_id: u32,
    pub position: Position,
    /// Spawn point; wandering is centred here.
    pub home: Position,
    pub respawn_radius: f32,
    /// Current combat target.
    pub target: Option<AgentId>,
    /// Charmer or owner. Lookup-only; never extends the owner's lifetime.
    pub owner: Option<AgentId>,
    pub alive: bool,
    pub can_fly: bool,
    pub civilian: bool,
    pub neutral_to_all: bool,
    pub walking: bool,
    pub visible: bool,
    pub react_state: ReactState,
    pub state: UnitState,
    /// Raw ability ids as configured on the template, in slot order.
    pub abilities: ArrayVec<AbilityId, { AiConfig::MAX_KIT_ABILITIES }>,
}

impl AgentState {
    pub fn new(id: AgentId, position: Position) -> Self {
        Self {
            id,
            template_id: 0,
            position,
            home: position,
            respawn_radius: 0.0,
            target: None,
            owner: None,
            alive: true,
            can_fly: false,
            civilian: false,
            neutral_to_all: false,
            walking: false,
            visible: true,
            react_state: ReactState::Aggressive,
            state: UnitState::empty(),
            abilities: ArrayVec::new(),
        }
    }

    pub fn with_template(mut self, template_id: u32) -> Self {
        self.template_id = template_id;
        self
    }

    pub fn with_owner(mut self, owner: AgentId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_respawn_radius(mut self, radius: f32) -> Self {
        self.respawn_radius = radius;
        self
    }

    pub fn with_flight(mut self, can_fly: bool) -> Self {
        self.can_fly = can_fly;
        self
    }

    /// Sets the ability slots; ids beyond the kit capacity are dropped.
    pub fn with_abilities(mut self, abilities: impl IntoIterator<Item = AbilityId>) -> Self {
        self.abilities = abilities
            .into_iter()
            .take(AiConfig::MAX_KIT_ABILITIES)
            .collect();
        self
    }

    pub fn has_state(&self, flags: UnitState) -> bool {
        self.state.intersects(flags)
    }

    pub fn add_state(&mut self, flags: UnitState) {
        self.state.insert(flags);
    }

    pub fn clear_state(&mut self, flags: UnitState) {
        self.state.remove(flags);
    }

    /// Read-only snapshot as other agents observe it.
    pub fn view(&self) -> AgentView {
        AgentView {
            id: self.id,
            position: self.position,
            alive: self.alive,
            flying: self.can_fly,
        }
    }
}

/// Snapshot of another agent, as reported by the world oracle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentView {
    pub id: AgentId,
    pub position: Position,
    pub alive: bool,
    pub flying: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immobilized_covers_crowd_control_flags() {
        let mut agent = AgentState::new(AgentId(1), Position::default());
        assert!(!agent.has_state(UnitState::IMMOBILIZED));

        agent.add_state(UnitState::DISTRACTED);
        assert!(agent.has_state(UnitState::IMMOBILIZED));

        agent.clear_state(UnitState::DISTRACTED);
        agent.add_state(UnitState::CHASE);
        assert!(!agent.has_state(UnitState::IMMOBILIZED));
    }

    #[test]
    fn ability_slots_are_capped() {
        let agent = AgentState::new(AgentId(1), Position::default())
            .with_abilities((1..=20).map(AbilityId));
        assert_eq!(agent.abilities.len(), AiConfig::MAX_KIT_ABILITIES);
        assert_eq!(agent.abilities[0], AbilityId(1));
    }
}
