//! Recording combat collaborator backing [`CombatOracle`].
//!
//! No damage model: the ledger validates requests, tracks cast and swing
//! timers, and records what happened so the worker can publish it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use ai_core::{AbilityId, AbilityOracle, AgentId, CastError, CombatOracle, Millis, is_immune_to};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One combat action accepted by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatRecord {
    Cast {
        caster: AgentId,
        target: AgentId,
        ability: AbilityId,
        triggered: bool,
    },
    Swing {
        attacker: AgentId,
        target: Option<AgentId>,
    },
    SpellAttack {
        attacker: AgentId,
        target: Option<AgentId>,
        ability: AbilityId,
    },
    Engaged {
        attacker: AgentId,
        target: AgentId,
        melee: bool,
    },
}

impl CombatRecord {
    /// Agent whose update issued the record.
    pub fn actor(&self) -> AgentId {
        match *self {
            CombatRecord::Cast { caster, .. } => caster,
            CombatRecord::Swing { attacker, .. }
            | CombatRecord::SpellAttack { attacker, .. }
            | CombatRecord::Engaged { attacker, .. } => attacker,
        }
    }
}

pub struct CombatLedger {
    abilities: Arc<dyn AbilityOracle>,
    swing_interval: Millis,
    casting: Mutex<HashMap<AgentId, (AbilityId, Millis)>>,
    swing_timers: Mutex<HashMap<AgentId, Millis>>,
    spell_timers: Mutex<HashMap<(AgentId, AbilityId), Millis>>,
    engaged: Mutex<HashMap<AgentId, AgentId>>,
    crowd_controlled: RwLock<HashSet<AgentId>>,
    totems: RwLock<HashMap<AgentId, u32>>,
    records: Mutex<Vec<CombatRecord>>,
}

impl CombatLedger {
    pub const DEFAULT_SWING_INTERVAL_MS: Millis = 2000;

    pub fn new(abilities: Arc<dyn AbilityOracle>) -> Self {
        Self {
            abilities,
            swing_interval: Self::DEFAULT_SWING_INTERVAL_MS,
            casting: Mutex::new(HashMap::new()),
            swing_timers: Mutex::new(HashMap::new()),
            spell_timers: Mutex::new(HashMap::new()),
            engaged: Mutex::new(HashMap::new()),
            crowd_controlled: RwLock::new(HashSet::new()),
            totems: RwLock::new(HashMap::new()),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn with_swing_interval(mut self, interval: Millis) -> Self {
        self.swing_interval = interval;
        self
    }

    /// Marks `agent` as a totem spawned from template `entry`.
    pub fn register_totem(&self, agent: AgentId, entry: u32) {
        if let Ok(mut totems) = self.totems.write() {
            totems.insert(agent, entry);
        }
    }

    pub fn set_crowd_controlled(&self, target: AgentId, controlled: bool) {
        if let Ok(mut set) = self.crowd_controlled.write() {
            if controlled {
                set.insert(target);
            } else {
                set.remove(&target);
            }
        }
    }

    /// Aborts the cast of `agent`, returning the interrupted ability.
    pub fn interrupt(&self, agent: AgentId) -> Option<AbilityId> {
        self.casting
            .lock()
            .ok()?
            .remove(&agent)
            .map(|(ability, _)| ability)
    }

    /// Advances cast and attack timers.
    pub fn advance(&self, delta: Millis) {
        if let Ok(mut casting) = self.casting.lock() {
            casting.retain(|_, (_, remaining)| {
                *remaining = remaining.saturating_sub(delta);
                *remaining > 0
            });
        }
        if let Ok(mut timers) = self.swing_timers.lock() {
            timers.retain(|_, remaining| {
                *remaining = remaining.saturating_sub(delta);
                *remaining > 0
            });
        }
        if let Ok(mut timers) = self.spell_timers.lock() {
            timers.retain(|_, remaining| {
                *remaining = remaining.saturating_sub(delta);
                *remaining > 0
            });
        }
    }

    pub fn take_records(&self) -> Vec<CombatRecord> {
        self.records
            .lock()
            .map(|mut records| std::mem::take(&mut *records))
            .unwrap_or_default()
    }

    /// Drops every trace of `agent`.
    pub fn forget(&self, agent: AgentId) {
        if let Ok(mut casting) = self.casting.lock() {
            casting.remove(&agent);
        }
        if let Ok(mut engaged) = self.engaged.lock() {
            engaged.remove(&agent);
        }
        if let Ok(mut totems) = self.totems.write() {
            totems.remove(&agent);
        }
    }

    fn record(&self, record: CombatRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    fn engaged_target(&self, agent: AgentId) -> Option<AgentId> {
        self.engaged.lock().ok()?.get(&agent).copied()
    }

    fn totem_entry(&self, agent: AgentId) -> Option<u32> {
        self.totems.read().ok()?.get(&agent).copied()
    }
}

impl std::fmt::Debug for CombatLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatLedger")
            .field("swing_interval", &self.swing_interval)
            .finish_non_exhaustive()
    }
}

impl CombatOracle for CombatLedger {
    fn cast(
        &self,
        caster: AgentId,
        target: AgentId,
        ability: AbilityId,
        triggered: bool,
    ) -> Result<(), CastError> {
        let descriptor = self
            .abilities
            .lookup(ability)
            .ok_or(CastError::UnknownAbility(ability))?;

        if !triggered && self.is_casting(caster) {
            return Err(CastError::NotReady);
        }
        if let Some(entry) = self.totem_entry(target)
            && is_immune_to(entry, &descriptor)
        {
            debug!(target: "runtime::combat", %caster, totem = %target, %ability, "totem immune");
            return Err(CastError::InvalidTarget(target));
        }

        if !triggered
            && descriptor.cast_time > 0
            && let Ok(mut casting) = self.casting.lock()
        {
            casting.insert(caster, (ability, descriptor.cast_time));
        }

        self.record(CombatRecord::Cast {
            caster,
            target,
            ability,
            triggered,
        });
        Ok(())
    }

    fn is_casting(&self, agent: AgentId) -> bool {
        self.casting
            .lock()
            .map(|casting| casting.contains_key(&agent))
            .unwrap_or(false)
    }

    fn cancel_cast(&self, agent: AgentId) {
        self.interrupt(agent);
    }

    fn melee_attack_if_ready(&self, agent: AgentId) -> bool {
        let Ok(mut timers) = self.swing_timers.lock() else {
            return false;
        };
        if timers.contains_key(&agent) {
            return false;
        }
        timers.insert(agent, self.swing_interval);
        drop(timers);

        self.record(CombatRecord::Swing {
            attacker: agent,
            target: self.engaged_target(agent),
        });
        true
    }

    fn spell_attack_if_ready(&self, agent: AgentId, ability: AbilityId) -> bool {
        let cooldown = self
            .abilities
            .lookup(ability)
            .map(|descriptor| descriptor.cooldown)
            .filter(|&cooldown| cooldown > 0)
            .unwrap_or(self.swing_interval);

        let Ok(mut timers) = self.spell_timers.lock() else {
            return false;
        };
        if timers.contains_key(&(agent, ability)) {
            return false;
        }
        timers.insert((agent, ability), cooldown);
        drop(timers);

        self.record(CombatRecord::SpellAttack {
            attacker: agent,
            target: self.engaged_target(agent),
            ability,
        });
        true
    }

    fn has_breakable_cc(&self, target: AgentId, _attacker: AgentId) -> bool {
        self.crowd_controlled
            .read()
            .map(|set| set.contains(&target))
            .unwrap_or(false)
    }

    fn attack_start(&self, agent: AgentId, target: AgentId, melee: bool) -> bool {
        if agent == target {
            return false;
        }
        if let Ok(mut engaged) = self.engaged.lock() {
            engaged.insert(agent, target);
        }
        self.record(CombatRecord::Engaged {
            attacker: agent,
            target,
            melee,
        });
        true
    }

    fn attack_stop(&self, agent: AgentId) {
        if let Ok(mut engaged) = self.engaged.lock() {
            engaged.remove(&agent);
        }
    }

    fn combat_stop(&self, agent: AgentId) {
        self.attack_stop(agent);
        self.cancel_cast(agent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_content::AbilityTable;
    use ai_core::{AbilityDescriptor, AbilityEffect, EffectKind, TriggerCondition};

    const CASTER: AgentId = AgentId(1);
    const TOTEM: AgentId = AgentId(2);

    fn ledger() -> CombatLedger {
        let table = AbilityTable::from_descriptors([
            AbilityDescriptor::new(AbilityId(1), TriggerCondition::OnCombatTick, 5000)
                .with_cast_time(1500),
            AbilityDescriptor::new(AbilityId(2), TriggerCondition::None, 0)
                .with_effects([AbilityEffect::new(EffectKind::ApplyAura, false)]),
        ]);
        CombatLedger::new(Arc::new(table))
    }

    #[test]
    fn cast_time_blocks_until_elapsed() {
        let ledger = ledger();
        ledger.cast(CASTER, AgentId(9), AbilityId(1), false).unwrap();

        assert!(ledger.is_casting(CASTER));
        assert_eq!(
            ledger.cast(CASTER, AgentId(9), AbilityId(1), false),
            Err(CastError::NotReady)
        );

        ledger.advance(1500);
        assert!(!ledger.is_casting(CASTER));
    }

    #[test]
    fn totems_reject_negative_auras() {
        let ledger = ledger();
        ledger.register_totem(TOTEM, 3579);

        assert_eq!(
            ledger.cast(CASTER, TOTEM, AbilityId(2), false),
            Err(CastError::InvalidTarget(TOTEM))
        );
        assert!(ledger.cast(CASTER, TOTEM, AbilityId(1), true).is_ok());
    }

    #[test]
    fn swings_respect_interval() {
        let ledger = ledger();
        assert!(ledger.melee_attack_if_ready(CASTER));
        assert!(!ledger.melee_attack_if_ready(CASTER));

        ledger.advance(CombatLedger::DEFAULT_SWING_INTERVAL_MS);
        assert!(ledger.melee_attack_if_ready(CASTER));
        assert_eq!(ledger.take_records().len(), 2);
    }

    #[test]
    fn unknown_abilities_are_rejected() {
        let ledger = ledger();
        assert_eq!(
            ledger.cast(CASTER, AgentId(9), AbilityId(77), false),
            Err(CastError::UnknownAbility(AbilityId(77)))
        );
    }
}
