use std::sync::Arc;

use tracing::error;

use super::skeleton::{CombatPolicy, run_combat_tick};
use super::{AgentAi, AiContext, Archetype};
use crate::ability::{AbilityDescriptor, AbilityKit};
use crate::config::AiConfig;
use crate::env::OracleError;
use crate::motion::MotionGenerator;
use crate::state::{AgentId, AgentState, AgentView, Millis};

/// Fixed ranged attacker.
///
/// Shoots its primary ability from beyond the minimum range and falls back to
/// melee when a target gets inside it. Without a primary ability it only
/// swings.
#[derive(Clone, Debug)]
pub struct ArcherAi {
    primary: Option<Arc<AbilityDescriptor>>,
    min_range: f32,
    combat_distance: f32,
}

impl ArcherAi {
    pub fn new(agent: &AgentState, kit: &AbilityKit, config: &AiConfig) -> Self {
        let primary = kit.at(0).cloned();
        if primary.is_none() {
            error!(target: "ai::behavior", agent = %agent.id, template = agent.template_id, "archer without a primary ability, melee only");
        }

        let min_range = primary
            .as_ref()
            .map(|ability| ability.min_range)
            .filter(|&range| range > 0.0)
            .unwrap_or(config.melee_range);
        let combat_distance = primary.as_ref().map_or(0.0, |ability| ability.max_range);

        Self {
            primary,
            min_range,
            combat_distance,
        }
    }

    pub fn min_range(&self) -> f32 {
        self.min_range
    }

    pub fn combat_distance(&self) -> f32 {
        self.combat_distance
    }
}

impl CombatPolicy for ArcherAi {
    fn on_queue_empty(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        target: &AgentView,
    ) -> Result<(), OracleError> {
        let combat = ctx.env.combat()?;
        let outside_min = ctx.agent.position.distance(&target.position) > self.min_range;

        match &self.primary {
            Some(primary) if outside_min => {
                combat.spell_attack_if_ready(ctx.agent.id, primary.id);
            }
            _ => {
                combat.melee_attack_if_ready(ctx.agent.id);
            }
        }
        Ok(())
    }
}

impl AgentAi for ArcherAi {
    fn archetype(&self) -> Archetype {
        Archetype::Archer
    }

    fn update(&mut self, ctx: &mut AiContext<'_, '_>, delta: Millis) -> Result<(), OracleError> {
        run_combat_tick(self, ctx, delta)
    }

    fn attack_start(&mut self, ctx: &mut AiContext<'_, '_>, who: AgentId) -> Result<(), OracleError> {
        let Some(view) = ctx.env.world()?.view(who) else {
            return Ok(());
        };

        let inside_min = ctx.agent.position.distance(&view.position) <= self.min_range;
        let chase = if inside_min {
            MotionGenerator::chase(who, None)
        } else {
            MotionGenerator::chase(who, Some(self.combat_distance))
        };

        if ctx.engage(who, inside_min)? && !view.flying {
            ctx.replace_motion(chase)?;
        }

        if view.flying {
            ctx.park_motion()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityId, TriggerCondition};
    use crate::motion::{MotionGenerator as Gen, MotionKind};
    use crate::state::Position;
    use crate::test_support::{Harness, Rig};

    const SHOOT: AbilityId = AbilityId(75);
    const SELF: AgentId = AgentId(1);
    const FOE: AgentId = AgentId(2);

    fn setup(min_range: f32, foe: AgentState) -> (Harness, Rig, ArcherAi) {
        let harness = Harness::with_abilities([AbilityDescriptor::new(
            SHOOT,
            TriggerCondition::None,
            0,
        )
        .with_range(min_range, 30.0)]);
        harness.world.insert(foe.view());

        let agent = AgentState::new(SELF, Position::default()).with_abilities([SHOOT]);
        let kit = AbilityKit::resolve(&agent, &harness.abilities);
        let ai = ArcherAi::new(&agent, &kit, &AiConfig::default());
        (harness, Rig::new(agent), ai)
    }

    #[test]
    fn zero_min_range_falls_back_to_melee_range() {
        let foe = AgentState::new(FOE, Position::new(0, 20.0, 0.0, 0.0));
        let (_harness, _rig, ai) = setup(0.0, foe);
        assert_eq!(ai.min_range(), AiConfig::DEFAULT_MELEE_RANGE);
        assert_eq!(ai.combat_distance(), 30.0);
    }

    #[test]
    fn shoots_from_range_and_swings_inside_min_range() {
        let foe = AgentState::new(FOE, Position::new(0, 20.0, 0.0, 0.0));
        let (harness, mut rig, mut ai) = setup(8.0, foe);
        let env = harness.env();
        rig.agent.target = Some(FOE);

        ai.update(&mut rig.ctx(&env), 100).unwrap();
        assert_eq!(harness.combat.spell_attacks(), vec![SHOOT]);
        assert_eq!(harness.combat.swings(), 0);

        rig.agent.position = Position::new(0, 15.0, 0.0, 0.0);
        ai.update(&mut rig.ctx(&env), 100).unwrap();
        assert_eq!(harness.combat.swings(), 1);
    }

    #[test]
    fn unresolved_first_slot_means_melee_only() {
        let foe = AgentState::new(FOE, Position::new(0, 20.0, 0.0, 0.0));
        let (harness, mut rig, _) = setup(8.0, foe);
        let env = harness.env();
        rig.agent = rig.agent.clone().with_abilities([AbilityId(404), SHOOT]);
        let kit = AbilityKit::resolve(&rig.agent, &harness.abilities);
        let mut ai = ArcherAi::new(&rig.agent, &kit, &AiConfig::default());
        rig.agent.target = Some(FOE);

        ai.update(&mut rig.ctx(&env), 100).unwrap();

        assert_eq!(ai.combat_distance(), 0.0);
        assert!(harness.combat.spell_attacks().is_empty());
        assert_eq!(harness.combat.swings(), 1);
    }

    #[test]
    fn attack_start_bounds_chase_by_combat_distance() {
        let foe = AgentState::new(FOE, Position::new(0, 20.0, 0.0, 0.0));
        let (harness, mut rig, mut ai) = setup(8.0, foe);
        let env = harness.env();

        ai.attack_start(&mut rig.ctx(&env), FOE).unwrap();

        assert_eq!(harness.combat.attack_starts(), vec![(FOE, false)]);
        match rig.motion.active() {
            Some(Gen::Chase(chase)) => assert_eq!(chase.max_distance(), Some(30.0)),
            other => panic!("expected chase, got {other:?}"),
        }
    }

    #[test]
    fn attack_start_inside_min_range_chases_to_melee() {
        let foe = AgentState::new(FOE, Position::new(0, 3.0, 0.0, 0.0));
        let (harness, mut rig, mut ai) = setup(8.0, foe);
        let env = harness.env();

        ai.attack_start(&mut rig.ctx(&env), FOE).unwrap();

        assert_eq!(harness.combat.attack_starts(), vec![(FOE, true)]);
        match rig.motion.active() {
            Some(Gen::Chase(chase)) => assert_eq!(chase.max_distance(), None),
            other => panic!("expected chase, got {other:?}"),
        }
    }

    #[test]
    fn flying_target_parks_at_idle() {
        let foe = AgentState::new(FOE, Position::new(0, 20.0, 0.0, 0.0)).with_flight(true);
        let (harness, mut rig, mut ai) = setup(8.0, foe);
        let env = harness.env();

        ai.attack_start(&mut rig.ctx(&env), FOE).unwrap();

        assert_eq!(rig.agent.target, Some(FOE));
        assert_eq!(rig.motion.kinds(), vec![MotionKind::Idle]);
    }
}
