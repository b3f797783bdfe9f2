use strum::{Display, EnumString};
use tracing::{debug, warn};

use super::{AgentAi, AggressorAi, ArcherAi, CasterAi, CombatAi, TurretAi, VehicleAi};
use crate::ability::AbilityKit;
use crate::config::AiConfig;
use crate::env::AiEnv;
use crate::state::AgentState;

/// Controller archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Archetype {
    /// Melee only, no ability kit.
    Aggressor,
    /// Melee-range caster: aggro casts plus jittered combat abilities.
    Combat,
    /// Ranged caster keeping its shortest ability range.
    Caster,
    /// Single fixed ranged ability with a minimum range.
    Archer,
    /// Stationary attacker with a closed range band.
    Turret,
    /// Mount/vehicle seat controller.
    Vehicle,
}

impl Archetype {
    /// Archetype an agent gets when its template names none.
    ///
    /// Only agents that can be hostile to someone get a controller.
    pub fn select_default(agent: &AgentState) -> Option<Self> {
        AggressorAi::permissible(agent).then_some(Archetype::Aggressor)
    }

    /// Builds the controller for `agent`.
    ///
    /// Missing data (unresolvable abilities, absent collaborators) is logged
    /// here, once, and the controller degrades instead of failing.
    pub fn build(self, agent: &AgentState, env: &AiEnv<'_>, config: &AiConfig) -> Box<dyn AgentAi> {
        debug!(target: "ai::behavior", agent = %agent.id, archetype = %self, "building controller");

        match self {
            Archetype::Aggressor => Box::new(AggressorAi::new()),
            Archetype::Combat => Box::new(CombatAi::new(resolve_kit(agent, env))),
            Archetype::Caster => Box::new(CasterAi::new(resolve_kit(agent, env), config)),
            Archetype::Archer => Box::new(ArcherAi::new(agent, &resolve_kit(agent, env), config)),
            Archetype::Turret => Box::new(TurretAi::new(agent, &resolve_kit(agent, env))),
            Archetype::Vehicle => Box::new(VehicleAi::new(agent, env, config)),
        }
    }
}

fn resolve_kit(agent: &AgentState, env: &AiEnv<'_>) -> AbilityKit {
    match env.abilities() {
        Ok(oracle) => AbilityKit::resolve(agent, oracle),
        Err(error) => {
            if !agent.abilities.is_empty() {
                warn!(target: "ai::kit", agent = %agent.id, %error, "no ability store, melee only");
            }
            AbilityKit::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AgentId, Position};
    use crate::test_support::Harness;

    #[test]
    fn parses_from_snake_case() {
        assert_eq!("turret".parse::<Archetype>().ok(), Some(Archetype::Turret));
        assert_eq!(Archetype::Caster.to_string(), "caster");
        assert!("paladin".parse::<Archetype>().is_err());
    }

    #[test]
    fn civilians_and_neutrals_get_no_default() {
        let hostile = AgentState::new(AgentId(1), Position::default());
        assert_eq!(Archetype::select_default(&hostile), Some(Archetype::Aggressor));

        let mut civilian = hostile.clone();
        civilian.civilian = true;
        assert_eq!(Archetype::select_default(&civilian), None);

        let mut neutral = hostile;
        neutral.neutral_to_all = true;
        assert_eq!(Archetype::select_default(&neutral), None);
    }

    #[test]
    fn build_reports_matching_archetype() {
        let harness = Harness::new();
        let env = harness.env();
        let config = AiConfig::default();
        let agent = AgentState::new(AgentId(1), Position::default());

        for archetype in [
            Archetype::Aggressor,
            Archetype::Combat,
            Archetype::Caster,
            Archetype::Archer,
            Archetype::Turret,
            Archetype::Vehicle,
        ] {
            assert_eq!(archetype.build(&agent, &env, &config).archetype(), archetype);
        }
    }
}
