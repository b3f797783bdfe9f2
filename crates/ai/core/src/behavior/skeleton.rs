//! Per-tick protocol shared by every combat archetype.
//!
//! Order of checks, each terminal for the tick when it applies:
//!
//! 1. no target: disengage and fall back ([`CombatPolicy::on_no_target`])
//! 2. target under breakable crowd control ([`CombatPolicy::on_crowd_controlled`])
//! 3. target out of line of sight ([`CombatPolicy::on_out_of_sight`])
//! 4. owner cannot perceive the target ([`CombatPolicy::on_owner_blind`])
//! 5. a cast is in progress
//! 6. fire one due ability, or run the default action
use tracing::{debug, warn};

use super::AiContext;
use crate::ability::{AbilityDescriptor, AbilityId, AbilityKit, JitterPolicy, TriggerCondition};
use crate::env::OracleError;
use crate::motion::MotionGenerator;
use crate::state::{AgentId, AgentView, Millis, UnitState};

/// Whether the tick continues after a hook ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Archetype-specific hooks of the combat tick.
pub trait CombatPolicy {
    /// No target this tick. Must leave no ability events pending.
    fn on_no_target(&mut self, ctx: &mut AiContext<'_, '_>) -> Result<(), OracleError> {
        ctx.scheduler.cancel_all();
        ctx.disengage()?;
        ctx.park_motion()
    }

    /// The target is under crowd control our damage would break.
    fn on_crowd_controlled(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        _target: &AgentView,
    ) -> Result<(), OracleError> {
        ctx.env.combat()?.attack_stop(ctx.agent.id);
        Ok(())
    }

    /// The target is not in line of sight: stop casting and chase.
    fn on_out_of_sight(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        target: &AgentView,
    ) -> Result<(), OracleError> {
        ctx.env.combat()?.cancel_cast(ctx.agent.id);
        if !ctx.agent.has_state(UnitState::CHASE) {
            ctx.replace_motion(MotionGenerator::chase(target.id, None))?;
        }
        Ok(())
    }

    /// The owner cannot perceive the target.
    fn on_owner_blind(&mut self, ctx: &mut AiContext<'_, '_>) -> Result<Flow, OracleError> {
        ctx.env.combat()?.cancel_cast(ctx.agent.id);
        Ok(Flow::Continue)
    }

    /// A scheduled ability came due.
    fn fire_due(
        &mut self,
        _ctx: &mut AiContext<'_, '_>,
        _ability: AbilityId,
        _target: &AgentView,
    ) -> Result<(), OracleError> {
        Ok(())
    }

    /// Nothing was due this tick.
    fn on_queue_empty(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        _target: &AgentView,
    ) -> Result<(), OracleError> {
        ctx.env.combat()?.melee_attack_if_ready(ctx.agent.id);
        Ok(())
    }
}

pub fn run_combat_tick<P>(
    policy: &mut P,
    ctx: &mut AiContext<'_, '_>,
    delta: Millis,
) -> Result<(), OracleError>
where
    P: CombatPolicy + ?Sized,
{
    ctx.scheduler.update(delta);

    let Some(target) = ctx.current_target()? else {
        return policy.on_no_target(ctx);
    };

    let combat = ctx.env.combat()?;
    if combat.has_breakable_cc(target.id, ctx.agent.id) {
        return policy.on_crowd_controlled(ctx, &target);
    }

    if !ctx
        .env
        .spatial()?
        .line_of_sight(&ctx.agent.position, &target.position)
    {
        return policy.on_out_of_sight(ctx, &target);
    }

    if let Some(owner) = ctx.agent.owner
        && !ctx.env.world()?.can_perceive(owner, target.id)
        && policy.on_owner_blind(ctx)? == Flow::Stop
    {
        return Ok(());
    }

    if combat.is_casting(ctx.agent.id) {
        ctx.agent.add_state(UnitState::CASTING);
        return Ok(());
    }
    ctx.agent.clear_state(UnitState::CASTING);

    match ctx.scheduler.execute_event() {
        Some(ability) => policy.fire_due(ctx, ability, &target),
        None => policy.on_queue_empty(ctx, &target),
    }
}

/// Casts `ability` at `target`. A rejected combat-tick cast is rescheduled
/// after the interrupt recovery delay; returns whether the cast was issued.
pub fn cast_or_recover(
    ctx: &mut AiContext<'_, '_>,
    ability: &AbilityDescriptor,
    target: AgentId,
    triggered: bool,
) -> Result<bool, OracleError> {
    match ctx
        .env
        .combat()?
        .cast(ctx.agent.id, target, ability.id, triggered)
    {
        Ok(()) => Ok(true),
        Err(error) => {
            debug!(
                target: "ai::behavior",
                agent = %ctx.agent.id,
                ability = %ability.id,
                %error,
                "cast rejected"
            );
            if ability.trigger == TriggerCondition::OnCombatTick {
                let recovery = ctx.config.interrupt_recovery_ms;
                ctx.scheduler.reschedule(ability.id, recovery.into());
            }
            Ok(false)
        }
    }
}

/// Fires every `OnAggro` kit member at `who` and schedules every
/// `OnCombatTick` member through `jitter`.
pub fn open_combat(
    ctx: &mut AiContext<'_, '_>,
    kit: &AbilityKit,
    jitter: JitterPolicy,
    who: AgentId,
) -> Result<(), OracleError> {
    for ability in kit.iter() {
        match ability.trigger {
            TriggerCondition::OnAggro => {
                cast_or_recover(ctx, ability, who, false)?;
            }
            TriggerCondition::OnCombatTick => {
                let delay = jitter.rearm(ability, false, ctx.config.default_cooldown_ms, ctx.rng);
                ctx.scheduler.schedule(ability.id, delay.into());
            }
            TriggerCondition::OnDeath | TriggerCondition::None => {}
        }
    }
    Ok(())
}

/// Fires every `OnDeath` kit member at the killer, ignoring cooldowns.
pub fn fire_death_abilities(
    ctx: &mut AiContext<'_, '_>,
    kit: &AbilityKit,
    killer: Option<AgentId>,
) -> Result<(), OracleError> {
    let Some(killer) = killer else {
        return Ok(());
    };
    let combat = ctx.env.combat()?;

    for ability in kit.with_trigger(TriggerCondition::OnDeath) {
        if let Err(error) = combat.cast(ctx.agent.id, killer, ability.id, true) {
            warn!(
                target: "ai::behavior",
                agent = %ctx.agent.id,
                ability = %ability.id,
                %error,
                "death ability failed"
            );
        }
    }
    Ok(())
}
