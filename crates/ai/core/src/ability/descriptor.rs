use std::fmt;

use strum::{Display, EnumString};

use crate::state::Millis;

/// Numeric ability identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityId(pub u32);

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability:{}", self.0)
    }
}

/// When an ability fires automatically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerCondition {
    /// Never fired by the kernel on its own.
    #[default]
    None,
    /// Fired once at the entering target when combat starts.
    OnAggro,
    /// Scheduled and re-armed while in combat.
    OnCombatTick,
    /// Fired at the killer on death, ignoring cooldowns.
    OnDeath,
}

/// Effect kinds the kernel cares about (totem immunity).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    ApplyAura,
    SchoolDamage,
    WeaponPercentDamage,
    NormalizedWeaponDamage,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityEffect {
    pub kind: EffectKind,
    pub positive: bool,
}

impl AbilityEffect {
    pub fn new(kind: EffectKind, positive: bool) -> Self {
        Self { kind, positive }
    }
}

/// Immutable per-ability record, shared by every agent whose kit uses it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDescriptor {
    pub id: AbilityId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trigger: TriggerCondition,
    /// Base cooldown used by the simple jitter policy.
    pub cooldown: Millis,
    /// Actual recovery time used by the cast-time-aware policy.
    #[cfg_attr(feature = "serde", serde(default))]
    pub real_cooldown: Millis,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_range: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_range: f32,
    /// Cast-time hint.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cast_time: Millis,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<AbilityEffect>,
}

impl AbilityDescriptor {
    pub fn new(id: AbilityId, trigger: TriggerCondition, cooldown: Millis) -> Self {
        Self {
            id,
            trigger,
            cooldown,
            real_cooldown: cooldown,
            min_range: 0.0,
            max_range: 0.0,
            cast_time: 0,
            effects: Vec::new(),
        }
    }

    pub fn with_range(mut self, min_range: f32, max_range: f32) -> Self {
        self.min_range = min_range;
        self.max_range = max_range;
        self
    }

    pub fn with_cast_time(mut self, cast_time: Millis) -> Self {
        self.cast_time = cast_time;
        self
    }

    pub fn with_real_cooldown(mut self, real_cooldown: Millis) -> Self {
        self.real_cooldown = real_cooldown;
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = AbilityEffect>) -> Self {
        self.effects = effects.into_iter().collect();
        self
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|effect| effect.kind == kind)
    }
}
