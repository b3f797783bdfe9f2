//! Seat eligibility conditions.

use std::collections::HashMap;
use std::sync::Arc;

use ai_core::{ConditionOracle, EligibilityPredicate, OccupantView, Predicate};

/// Data-defined occupant rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionSpec {
    /// The occupant is a living player.
    AlivePlayer,
    /// The occupant's level is at least this.
    MinLevel(u8),
    /// The occupant's level is at most this.
    MaxLevel(u8),
    /// The occupant is not a player.
    NotPlayer,
}

impl EligibilityPredicate for ConditionSpec {
    fn evaluate(&self, occupant: &OccupantView) -> bool {
        match *self {
            ConditionSpec::AlivePlayer => occupant.is_player && occupant.alive,
            ConditionSpec::MinLevel(level) => occupant.level >= level,
            ConditionSpec::MaxLevel(level) => occupant.level <= level,
            ConditionSpec::NotPlayer => !occupant.is_player,
        }
    }
}

/// Seat conditions keyed by agent template.
#[derive(Clone, Debug, Default)]
pub struct ConditionTable {
    by_template: HashMap<u32, Vec<Predicate>>,
}

impl ConditionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the conditions of `template_id`. An empty list removes them.
    pub fn set(&mut self, template_id: u32, specs: &[ConditionSpec]) {
        if specs.is_empty() {
            self.by_template.remove(&template_id);
            return;
        }

        let predicates = specs
            .iter()
            .map(|&spec| Arc::new(spec) as Predicate)
            .collect();
        self.by_template.insert(template_id, predicates);
    }

    pub fn is_empty(&self) -> bool {
        self.by_template.is_empty()
    }
}

impl ConditionOracle for ConditionTable {
    fn conditions_for(&self, template_id: u32) -> Vec<Predicate> {
        self.by_template
            .get(&template_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_core::AgentId;

    fn player(level: u8) -> OccupantView {
        OccupantView {
            id: AgentId(7),
            seat: 0,
            is_player: true,
            alive: true,
            level,
        }
    }

    #[test]
    fn specs_evaluate_against_occupant() {
        assert!(ConditionSpec::AlivePlayer.evaluate(&player(1)));
        assert!(!ConditionSpec::NotPlayer.evaluate(&player(1)));
        assert!(ConditionSpec::MinLevel(70).evaluate(&player(70)));
        assert!(!ConditionSpec::MinLevel(70).evaluate(&player(69)));
        assert!(!ConditionSpec::MaxLevel(10).evaluate(&player(11)));

        let dead = OccupantView {
            alive: false,
            ..player(80)
        };
        assert!(!ConditionSpec::AlivePlayer.evaluate(&dead));
    }

    #[test]
    fn table_is_keyed_by_template() {
        let mut table = ConditionTable::new();
        table.set(100, &[ConditionSpec::AlivePlayer, ConditionSpec::MinLevel(60)]);

        assert_eq!(table.conditions_for(100).len(), 2);
        assert!(table.conditions_for(101).is_empty());

        table.set(100, &[]);
        assert!(table.is_empty());
    }
}
