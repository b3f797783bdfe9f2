use std::sync::Arc;

use arrayvec::ArrayVec;
use tracing::warn;

use super::{AbilityDescriptor, AbilityId, TriggerCondition};
use crate::config::AiConfig;
use crate::env::AbilityOracle;
use crate::state::AgentState;

type Slots = ArrayVec<Option<Arc<AbilityDescriptor>>, { AiConfig::MAX_KIT_ABILITIES }>;

/// The resolved ability list of one agent, in slot order.
///
/// Built once when a controller is constructed. Slots whose id the metadata
/// store cannot resolve stay empty (and are logged once here), so slot
/// positions keep their meaning: an empty slot 0 means no primary ability.
#[derive(Clone, Debug, Default)]
pub struct AbilityKit {
    slots: Slots,
}

impl AbilityKit {
    /// Kit with every given ability resolved, in order. Extra entries beyond
    /// the kit capacity are ignored.
    pub fn new(abilities: Vec<Arc<AbilityDescriptor>>) -> Self {
        Self {
            slots: abilities
                .into_iter()
                .take(AiConfig::MAX_KIT_ABILITIES)
                .map(Some)
                .collect(),
        }
    }

    /// Resolves every configured slot of `agent` through the metadata store.
    pub fn resolve(agent: &AgentState, oracle: &dyn AbilityOracle) -> Self {
        let slots = agent
            .abilities
            .iter()
            .map(|&id| {
                let descriptor = oracle.lookup(id);
                if descriptor.is_none() {
                    warn!(
                        target: "ai::kit",
                        agent = %agent.id,
                        ability = %id,
                        "ability id not resolvable, slot left empty"
                    );
                }
                descriptor
            })
            .collect();

        Self { slots }
    }

    /// True when no slot resolved.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Number of resolved slots.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Resolved abilities in slot order, skipping empty slots.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AbilityDescriptor>> {
        self.slots.iter().flatten()
    }

    pub fn get(&self, id: AbilityId) -> Option<&Arc<AbilityDescriptor>> {
        self.iter().find(|ability| ability.id == id)
    }

    /// Ability configured at slot `index`, if that slot resolved.
    pub fn at(&self, index: usize) -> Option<&Arc<AbilityDescriptor>> {
        self.slots.get(index)?.as_ref()
    }

    pub fn with_trigger(
        &self,
        trigger: TriggerCondition,
    ) -> impl Iterator<Item = &Arc<AbilityDescriptor>> {
        self.iter().filter(move |ability| ability.trigger == trigger)
    }

    /// Shortest maximum range among combat-tick abilities, capped at `cap`.
    pub fn shortest_combat_range(&self, cap: f32) -> f32 {
        self.with_trigger(TriggerCondition::OnCombatTick)
            .map(|ability| ability.max_range)
            .fold(cap, f32::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AgentId, Position};
    use crate::test_support::AbilityBook;

    #[test]
    fn unresolvable_slots_stay_empty() {
        let book = AbilityBook::new([
            AbilityDescriptor::new(AbilityId(1), TriggerCondition::OnAggro, 0),
            AbilityDescriptor::new(AbilityId(3), TriggerCondition::OnCombatTick, 2000),
        ]);
        let agent = AgentState::new(AgentId(1), Position::default())
            .with_abilities([AbilityId(1), AbilityId(2), AbilityId(3)]);

        let kit = AbilityKit::resolve(&agent, &book);

        assert_eq!(kit.len(), 2);
        assert!(kit.get(AbilityId(2)).is_none());
        assert!(kit.at(1).is_none());
        assert_eq!(kit.at(2).map(|a| a.id), Some(AbilityId(3)));
        let ids: Vec<_> = kit.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![AbilityId(1), AbilityId(3)]);
    }

    #[test]
    fn missing_first_slot_leaves_no_primary() {
        let book = AbilityBook::new([AbilityDescriptor::new(
            AbilityId(7),
            TriggerCondition::OnCombatTick,
            1000,
        )]);
        let agent = AgentState::new(AgentId(1), Position::default())
            .with_abilities([AbilityId(99), AbilityId(7)]);

        let kit = AbilityKit::resolve(&agent, &book);

        assert!(kit.at(0).is_none());
        assert_eq!(kit.at(1).map(|a| a.id), Some(AbilityId(7)));
        assert!(!kit.is_empty());
    }

    #[test]
    fn shortest_combat_range_is_capped() {
        let kit = AbilityKit::new(vec![
            Arc::new(
                AbilityDescriptor::new(AbilityId(1), TriggerCondition::OnCombatTick, 1000)
                    .with_range(0.0, 40.0),
            ),
            Arc::new(
                AbilityDescriptor::new(AbilityId(2), TriggerCondition::OnCombatTick, 1000)
                    .with_range(0.0, 20.0),
            ),
            Arc::new(
                AbilityDescriptor::new(AbilityId(3), TriggerCondition::OnAggro, 1000)
                    .with_range(0.0, 5.0),
            ),
        ]);

        assert_eq!(kit.shortest_combat_range(30.0), 20.0);
        assert_eq!(AbilityKit::default().shortest_combat_range(30.0), 30.0);
    }
}
