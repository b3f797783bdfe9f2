//! Agent templates.

use ai_core::{AbilityId, AgentId, AgentState, Archetype, Millis, Position, ReactState};

use crate::conditions::ConditionSpec;

/// Everything needed to spawn one kind of agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentTemplate {
    pub id: u32,
    pub name: String,
    /// Controller archetype; `None` selects the default for the agent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub archetype: Option<Archetype>,
    /// Ability slots in kit order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<AbilityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub respawn_radius: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub can_fly: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub civilian: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub neutral_to_all: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub react_state: ReactState,
    /// Conditions seated players must keep meeting (vehicles).
    #[cfg_attr(feature = "serde", serde(default))]
    pub seat_conditions: Vec<ConditionSpec>,
    /// Summon lifetime for totems.
    #[cfg_attr(feature = "serde", serde(default))]
    pub totem_duration_ms: Option<Millis>,
}

impl AgentTemplate {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            archetype: None,
            abilities: Vec::new(),
            respawn_radius: 0.0,
            can_fly: false,
            civilian: false,
            neutral_to_all: false,
            react_state: ReactState::default(),
            seat_conditions: Vec::new(),
            totem_duration_ms: None,
        }
    }

    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.archetype = Some(archetype);
        self
    }

    pub fn with_abilities(mut self, abilities: impl IntoIterator<Item = AbilityId>) -> Self {
        self.abilities = abilities.into_iter().collect();
        self
    }

    pub fn with_respawn_radius(mut self, radius: f32) -> Self {
        self.respawn_radius = radius;
        self
    }

    pub fn with_seat_conditions(mut self, conditions: impl IntoIterator<Item = ConditionSpec>) -> Self {
        self.seat_conditions = conditions.into_iter().collect();
        self
    }

    pub fn with_totem_duration(mut self, duration: Millis) -> Self {
        self.totem_duration_ms = Some(duration);
        self
    }

    /// Fresh agent state for a new spawn at `position`.
    pub fn instantiate(&self, id: AgentId, position: Position) -> AgentState {
        let mut agent = AgentState::new(id, position)
            .with_template(self.id)
            .with_respawn_radius(self.respawn_radius)
            .with_flight(self.can_fly)
            .with_abilities(self.abilities.iter().copied());
        agent.civilian = self.civilian;
        agent.neutral_to_all = self.neutral_to_all;
        agent.react_state = self.react_state;
        agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instantiate_copies_template_fields() {
        let template = AgentTemplate::new(42, "sentry")
            .with_abilities([AbilityId(1), AbilityId(2)])
            .with_respawn_radius(8.0);
        let position = Position::new(1, 10.0, 20.0, 0.0);

        let agent = template.instantiate(AgentId(5), position);

        assert_eq!(agent.template_id, 42);
        assert_eq!(agent.home, position);
        assert_eq!(agent.respawn_radius, 8.0);
        assert_eq!(agent.abilities.as_slice(), &[AbilityId(1), AbilityId(2)]);
    }
}
