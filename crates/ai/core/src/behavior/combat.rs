use super::skeleton::{
    CombatPolicy, cast_or_recover, fire_death_abilities, open_combat, run_combat_tick,
};
use super::{AgentAi, AiContext, Archetype};
use crate::ability::{AbilityId, AbilityKit, JitterPolicy};
use crate::env::OracleError;
use crate::state::{AgentId, AgentView, Millis};

/// Melee-range caster.
///
/// Fires `OnAggro` abilities when combat opens, keeps `OnCombatTick`
/// abilities on a jittered schedule, and swings in melee in between.
#[derive(Clone, Debug)]
pub struct CombatAi {
    kit: AbilityKit,
    jitter: JitterPolicy,
}

impl CombatAi {
    pub fn new(kit: AbilityKit) -> Self {
        Self {
            kit,
            jitter: JitterPolicy::Simple,
        }
    }

    pub fn kit(&self) -> &AbilityKit {
        &self.kit
    }

    pub fn jitter(&self) -> JitterPolicy {
        self.jitter
    }
}

impl CombatPolicy for CombatAi {
    fn on_crowd_controlled(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        _target: &AgentView,
    ) -> Result<(), OracleError> {
        ctx.disengage()?;
        ctx.park_motion()
    }

    fn fire_due(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        ability: AbilityId,
        target: &AgentView,
    ) -> Result<(), OracleError> {
        let Some(ability) = self.kit.get(ability).cloned() else {
            return Ok(());
        };

        if cast_or_recover(ctx, &ability, target.id, false)? {
            let delay = self
                .jitter
                .rearm(&ability, true, ctx.config.default_cooldown_ms, ctx.rng);
            ctx.scheduler.schedule(ability.id, delay.into());
        }
        Ok(())
    }
}

impl AgentAi for CombatAi {
    fn archetype(&self) -> Archetype {
        Archetype::Combat
    }

    fn update(&mut self, ctx: &mut AiContext<'_, '_>, delta: Millis) -> Result<(), OracleError> {
        run_combat_tick(self, ctx, delta)
    }

    fn enter_combat(&mut self, ctx: &mut AiContext<'_, '_>, who: AgentId) -> Result<(), OracleError> {
        open_combat(ctx, &self.kit, self.jitter, who)
    }

    fn set_target(&mut self, ctx: &mut AiContext<'_, '_>, target: AgentId) -> Result<(), OracleError> {
        let target = if ctx.is_valid_new_target(target)? {
            Some(target)
        } else {
            ctx.agent.target
        };
        let Some(target) = target else {
            return Ok(());
        };

        open_combat(ctx, &self.kit, self.jitter, target)?;
        self.attack_start(ctx, target)
    }

    fn just_died(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        killer: Option<AgentId>,
    ) -> Result<(), OracleError> {
        fire_death_abilities(ctx, &self.kit, killer)
    }

    fn spell_interrupted(&mut self, ctx: &mut AiContext<'_, '_>, ability: AbilityId, recovery: Millis) {
        ctx.scheduler.reschedule(ability, recovery.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityDescriptor, TriggerCondition};
    use crate::motion::MotionKind;
    use crate::state::{AgentState, Position, UnitState};
    use crate::test_support::{Harness, Rig};

    const A: AbilityId = AbilityId(1);
    const B: AbilityId = AbilityId(2);
    const D: AbilityId = AbilityId(3);
    const SELF: AgentId = AgentId(1);
    const FOE: AgentId = AgentId(2);

    fn setup() -> (Harness, Rig, CombatAi) {
        let harness = Harness::with_abilities([
            AbilityDescriptor::new(A, TriggerCondition::OnAggro, 0),
            AbilityDescriptor::new(B, TriggerCondition::OnCombatTick, 2000),
            AbilityDescriptor::new(D, TriggerCondition::OnDeath, 0),
        ]);
        let foe = AgentState::new(FOE, Position::new(0, 3.0, 0.0, 0.0));
        harness.world.insert(foe.view());

        let agent = AgentState::new(SELF, Position::default()).with_abilities([A, B, D]);
        harness.world.insert(agent.view());
        let kit = AbilityKit::resolve(&agent, &harness.abilities);

        (harness, Rig::new(agent), CombatAi::new(kit))
    }

    #[test]
    fn aggro_fires_at_once_and_combat_tick_lands_in_jitter_window() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        rig.agent.target = Some(FOE);

        ai.enter_combat(&mut rig.ctx(&env), FOE).unwrap();

        assert_eq!(harness.combat.cast_ids(), vec![A]);
        let deadline = rig.scheduler.deadline_of(B).unwrap();
        assert!((2000..4000).contains(&deadline), "deadline {deadline}");

        let mut elapsed = 0;
        while elapsed < 4000 {
            ai.update(&mut rig.ctx(&env), 100).unwrap();
            elapsed += 100;
        }
        assert!(harness.combat.cast_ids().contains(&B));
    }

    #[test]
    fn fired_ability_is_rearmed_with_simple_jitter() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        rig.agent.target = Some(FOE);
        rig.scheduler.schedule(B, 0);

        ai.update(&mut rig.ctx(&env), 0).unwrap();

        assert_eq!(harness.combat.cast_ids(), vec![B]);
        let delay = rig.scheduler.deadline_of(B).unwrap() - rig.scheduler.now();
        assert!((2000..4000).contains(&delay));
        assert_eq!(harness.combat.swings(), 0);
    }

    #[test]
    fn swings_when_nothing_is_due() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        rig.agent.target = Some(FOE);

        ai.update(&mut rig.ctx(&env), 100).unwrap();

        assert_eq!(harness.combat.swings(), 1);
        assert!(harness.combat.casts().is_empty());
    }

    #[test]
    fn rejected_cast_is_rescheduled_with_recovery_delay() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        harness.combat.reject(B);
        rig.agent.target = Some(FOE);
        rig.scheduler.schedule(B, 0);

        ai.update(&mut rig.ctx(&env), 0).unwrap();

        assert_eq!(
            rig.scheduler.deadline_of(B),
            Some(u64::from(rig.config.interrupt_recovery_ms))
        );
    }

    #[test]
    fn interruption_overrides_pending_cooldown() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        rig.scheduler.schedule(B, 30_000);

        ai.spell_interrupted(&mut rig.ctx(&env), B, 750);

        assert_eq!(rig.scheduler.deadline_of(B), Some(750));
        assert_eq!(rig.scheduler.len(), 1);
    }

    #[test]
    fn casting_defers_everything() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        rig.agent.target = Some(FOE);
        rig.scheduler.schedule(B, 0);
        harness.combat.set_casting(SELF, true);

        ai.update(&mut rig.ctx(&env), 100).unwrap();

        assert!(harness.combat.casts().is_empty());
        assert_eq!(harness.combat.swings(), 0);
        assert!(rig.agent.has_state(UnitState::CASTING));
        assert!(rig.scheduler.is_scheduled(B));
    }

    #[test]
    fn lost_sight_cancels_cast_and_chases_once() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        rig.agent.target = Some(FOE);
        harness.terrain.block_sight(true);

        ai.update(&mut rig.ctx(&env), 100).unwrap();
        ai.update(&mut rig.ctx(&env), 100).unwrap();

        assert_eq!(harness.combat.cancels(), 2);
        assert_eq!(rig.motion.kinds(), vec![MotionKind::Idle, MotionKind::Chase]);
        assert_eq!(harness.combat.swings(), 0);
    }

    #[test]
    fn idle_fallback_is_idempotent() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        rig.agent.add_state(UnitState::IN_COMBAT);
        rig.ctx(&env)
            .push_motion(crate::motion::MotionGenerator::chase(FOE, None))
            .unwrap();

        for _ in 0..10 {
            ai.update(&mut rig.ctx(&env), 250).unwrap();
            assert!(rig.scheduler.is_empty());
            assert_eq!(rig.motion.active_kind(), Some(MotionKind::Idle));
        }

        assert_eq!(harness.combat.combat_stops(), 1);
        assert!(harness.combat.casts().is_empty());
    }

    #[test]
    fn target_loss_drops_pending_events() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        rig.agent.target = Some(FOE);
        ai.enter_combat(&mut rig.ctx(&env), FOE).unwrap();
        assert!(!rig.scheduler.is_empty());

        harness.world.remove(FOE);
        ai.update(&mut rig.ctx(&env), 100).unwrap();

        assert_eq!(rig.agent.target, None);
        assert!(rig.scheduler.is_empty());
    }

    #[test]
    fn crowd_controlled_target_suspends_offense_but_keeps_target() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        rig.agent.target = Some(FOE);
        rig.agent.add_state(UnitState::IN_COMBAT);
        harness.combat.set_breakable_cc(FOE);

        ai.update(&mut rig.ctx(&env), 100).unwrap();

        assert_eq!(rig.agent.target, Some(FOE));
        assert_eq!(harness.combat.combat_stops(), 1);
        assert_eq!(harness.combat.swings(), 0);
    }

    #[test]
    fn set_target_ignores_friends_and_opens_combat() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();
        let friend = AgentId(9);
        harness.world.set_friendly(SELF, friend);

        ai.set_target(&mut rig.ctx(&env), friend).unwrap();
        assert!(harness.combat.casts().is_empty());
        assert_eq!(rig.agent.target, None);

        ai.set_target(&mut rig.ctx(&env), FOE).unwrap();
        assert_eq!(harness.combat.cast_ids(), vec![A]);
        assert!(rig.scheduler.is_scheduled(B));
        assert_eq!(rig.agent.target, Some(FOE));
        assert_eq!(harness.combat.attack_starts(), vec![(FOE, true)]);
        assert_eq!(rig.motion.active_kind(), Some(MotionKind::Chase));
    }

    #[test]
    fn death_fires_on_death_abilities_at_killer() {
        let (harness, mut rig, mut ai) = setup();
        let env = harness.env();

        ai.just_died(&mut rig.ctx(&env), Some(FOE)).unwrap();

        let casts = harness.combat.casts();
        assert_eq!(casts.len(), 1);
        assert_eq!(casts[0].ability, D);
        assert_eq!(casts[0].target, FOE);
        assert!(casts[0].triggered);
    }
}
