use tracing::trace;

use super::skeleton::{
    CombatPolicy, Flow, cast_or_recover, fire_death_abilities, run_combat_tick,
};
use super::{AgentAi, AiContext, Archetype};
use crate::ability::{AbilityDescriptor, AbilityId, AbilityKit, JitterPolicy, TriggerCondition};
use crate::config::AiConfig;
use crate::env::OracleError;
use crate::motion::MotionGenerator;
use crate::state::{AgentId, AgentView, Millis, UnitState};

/// Ranged caster.
///
/// Keeps within the shortest maximum range of its combat abilities instead of
/// closing to melee. When its queue drains it bursts: one kit member picked
/// at random fires immediately and every combat member is re-armed with the
/// cast-time-aware policy.
#[derive(Clone, Debug)]
pub struct CasterAi {
    kit: AbilityKit,
    jitter: JitterPolicy,
    attack_distance: f32,
}

impl CasterAi {
    pub fn new(kit: AbilityKit, config: &AiConfig) -> Self {
        let attack_distance = kit.shortest_combat_range(config.caster_attack_distance);
        Self {
            kit,
            jitter: JitterPolicy::CastTimeAware,
            attack_distance,
        }
    }

    /// Distance kept from the target while attacking.
    pub fn attack_distance(&self) -> f32 {
        self.attack_distance
    }

    pub fn jitter(&self) -> JitterPolicy {
        self.jitter
    }

    fn rearm(&self, ctx: &mut AiContext<'_, '_>, ability: &AbilityDescriptor, fired: bool) {
        let delay = self
            .jitter
            .rearm(ability, fired, ctx.config.default_cooldown_ms, ctx.rng);
        ctx.scheduler.schedule(ability.id, delay.into());
    }

    fn burst(&mut self, ctx: &mut AiContext<'_, '_>, target: AgentId) -> Result<(), OracleError> {
        if self.kit.is_empty() {
            return Ok(());
        }

        let pick = ctx.rng.pick_index(self.kit.len());
        trace!(target: "ai::behavior", agent = %ctx.agent.id, pick, "caster burst");

        for (index, ability) in self.kit.iter().enumerate() {
            match ability.trigger {
                TriggerCondition::OnAggro => {
                    cast_or_recover(ctx, ability, target, false)?;
                }
                TriggerCondition::OnCombatTick if index == pick => {
                    // a rejected pick keeps the recovery delay cast_or_recover set
                    if cast_or_recover(ctx, ability, target, false)? {
                        self.rearm(ctx, ability, true);
                    }
                }
                TriggerCondition::OnCombatTick => self.rearm(ctx, ability, false),
                TriggerCondition::OnDeath | TriggerCondition::None => {}
            }
        }
        Ok(())
    }
}

impl CombatPolicy for CasterAi {
    fn on_no_target(&mut self, ctx: &mut AiContext<'_, '_>) -> Result<(), OracleError> {
        ctx.scheduler.cancel_all();
        ctx.disengage()?;

        let owner = match ctx.agent.owner {
            Some(owner) => ctx.env.world()?.view(owner).map(|view| view.id),
            None => None,
        };

        match owner {
            Some(owner) if !ctx.agent.has_state(UnitState::FOLLOW) => {
                ctx.park_motion()?;
                let (distance, angle) = (ctx.config.follow_distance, ctx.config.follow_angle);
                ctx.push_motion(MotionGenerator::follow(owner, distance, angle))
            }
            Some(_) => Ok(()),
            None => ctx.park_motion(),
        }
    }

    fn on_owner_blind(&mut self, ctx: &mut AiContext<'_, '_>) -> Result<Flow, OracleError> {
        ctx.env.combat()?.attack_stop(ctx.agent.id);
        Ok(Flow::Stop)
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
            self.rearm(ctx, &ability, true);
        }
        Ok(())
    }

    fn on_queue_empty(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        target: &AgentView,
    ) -> Result<(), OracleError> {
        if !ctx.scheduler.is_empty() {
            return Ok(());
        }

        if self.kit.is_empty() {
            ctx.env.combat()?.melee_attack_if_ready(ctx.agent.id);
            return Ok(());
        }

        self.burst(ctx, target.id)
    }
}

impl AgentAi for CasterAi {
    fn archetype(&self) -> Archetype {
        Archetype::Caster
    }

    fn update(&mut self, ctx: &mut AiContext<'_, '_>, delta: Millis) -> Result<(), OracleError> {
        run_combat_tick(self, ctx, delta)
    }

    fn enter_combat(&mut self, ctx: &mut AiContext<'_, '_>, who: AgentId) -> Result<(), OracleError> {
        if self.kit.is_empty() || !ctx.scheduler.is_empty() {
            return Ok(());
        }
        self.burst(ctx, who)
    }

    /// Engages without closing to melee; the chase stops at attack distance.
    fn attack_start(&mut self, ctx: &mut AiContext<'_, '_>, who: AgentId) -> Result<(), OracleError> {
        if ctx.engage(who, false)? {
            ctx.replace_motion(MotionGenerator::chase(who, Some(self.attack_distance)))?;
        }
        Ok(())
    }

    /// Only acts without a current victim, and only on a candidate already
    /// within attack distance.
    fn set_target(&mut self, ctx: &mut AiContext<'_, '_>, target: AgentId) -> Result<(), OracleError> {
        if self.kit.is_empty() || ctx.agent.target.is_some() {
            return Ok(());
        }
        if !ctx.is_valid_new_target(target)? {
            return Ok(());
        }

        let Some(view) = ctx.env.world()?.view(target) else {
            return Ok(());
        };
        if ctx.agent.position.distance(&view.position) > self.attack_distance {
            return Ok(());
        }

        self.burst(ctx, target)?;
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
