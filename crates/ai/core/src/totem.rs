//! Stationary totem rules: effect immunity and summon lifetime.
use tracing::trace;

use crate::ability::{AbilityDescriptor, EffectKind};
use crate::state::Millis;

/// Template entry of the grounding totem, which must stay targetable by
/// every effect.
pub const TOTEM_GROUNDING_ENTRY: u32 = 5925;

/// Whether a totem spawned from `entry` ignores `ability`.
///
/// Totems shrug off negative aura applications unless the ability also deals
/// school damage. The grounding totem is never immune.
pub fn is_immune_to(entry: u32, ability: &AbilityDescriptor) -> bool {
    if entry == TOTEM_GROUNDING_ENTRY {
        return false;
    }
    if ability.has_effect(EffectKind::SchoolDamage) {
        return false;
    }

    ability
        .effects
        .iter()
        .any(|effect| effect.kind == EffectKind::ApplyAura && !effect.positive)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TotemStatus {
    Active,
    Unsummon,
}

/// Remaining lifetime of one summoned totem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TotemLifetime {
    remaining: Millis,
}

impl TotemLifetime {
    pub fn new(duration: Millis) -> Self {
        Self {
            remaining: duration,
        }
    }

    pub fn remaining(&self) -> Millis {
        self.remaining
    }

    /// Advances the lifetime. A dead owner or a dead totem unsummons at once.
    pub fn update(&mut self, delta: Millis, owner_alive: bool, self_alive: bool) -> TotemStatus {
        if !owner_alive || !self_alive {
            trace!(target: "ai::totem", owner_alive, self_alive, "totem unsummoned by death");
            return TotemStatus::Unsummon;
        }

        if self.remaining <= delta {
            self.remaining = 0;
            return TotemStatus::Unsummon;
        }

        self.remaining -= delta;
        TotemStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityEffect, AbilityId, TriggerCondition};

    fn ability(effects: &[(EffectKind, bool)]) -> AbilityDescriptor {
        AbilityDescriptor::new(AbilityId(1), TriggerCondition::None, 0).with_effects(
            effects
                .iter()
                .map(|&(kind, positive)| AbilityEffect::new(kind, positive)),
        )
    }

    /// Pins the chosen rule: negative, non-damage aura effects are ignored.
    #[test]
    fn immunity_rule() {
        let snare = ability(&[(EffectKind::ApplyAura, false)]);
        let buff = ability(&[(EffectKind::ApplyAura, true)]);
        let dot = ability(&[(EffectKind::SchoolDamage, false), (EffectKind::ApplyAura, false)]);
        let strike = ability(&[(EffectKind::WeaponPercentDamage, false)]);
        let mixed = ability(&[(EffectKind::ApplyAura, true), (EffectKind::ApplyAura, false)]);

        assert!(is_immune_to(3579, &snare));
        assert!(!is_immune_to(3579, &buff));
        assert!(!is_immune_to(3579, &dot));
        assert!(!is_immune_to(3579, &strike));
        assert!(is_immune_to(3579, &mixed));
    }

    #[test]
    fn grounding_totem_is_never_immune() {
        let snare = ability(&[(EffectKind::ApplyAura, false)]);
        assert!(!is_immune_to(TOTEM_GROUNDING_ENTRY, &snare));
    }

    #[test]
    fn lifetime_expires() {
        let mut lifetime = TotemLifetime::new(2000);
        assert_eq!(lifetime.update(1500, true, true), TotemStatus::Active);
        assert_eq!(lifetime.remaining(), 500);
        assert_eq!(lifetime.update(500, true, true), TotemStatus::Unsummon);
    }

    #[test]
    fn death_unsummons_immediately() {
        let mut lifetime = TotemLifetime::new(60_000);
        assert_eq!(lifetime.update(10, false, true), TotemStatus::Unsummon);
        assert_eq!(lifetime.update(10, true, false), TotemStatus::Unsummon);
        assert_eq!(lifetime.remaining(), 60_000);
    }
}
