//! Per-agent timed ability events.
//!
//! The scheduler keeps its own monotonically accumulated clock, advanced only
//! by tick deltas. Deadlines are absolute clock values, so the whole queue is
//! deterministic for a fixed sequence of deltas.
use std::collections::BTreeSet;

use tracing::trace;

use crate::ability::AbilityId;
use crate::state::Millis;

/// Scheduler-internal ordering key: earliest deadline first, then the lower
/// ability id, then insertion order for duplicates of the same id.
type EventKey = (u64, AbilityId, u64);

/// Timer multiset keyed by ability id.
#[derive(Clone, Debug, Default)]
pub struct EventScheduler {
    clock: u64,
    next_seq: u64,
    queue: BTreeSet<EventKey>,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler clock in milliseconds.
    pub fn now(&self) -> u64 {
        self.clock
    }

    /// Advances the clock by one tick delta.
    pub fn update(&mut self, delta: Millis) {
        self.clock = self.clock.saturating_add(u64::from(delta));
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_scheduled(&self, id: AbilityId) -> bool {
        self.queue.iter().any(|&(_, queued, _)| queued == id)
    }

    /// Earliest pending deadline for `id`, if any.
    pub fn deadline_of(&self, id: AbilityId) -> Option<u64> {
        self.queue
            .iter()
            .find(|&&(_, queued, _)| queued == id)
            .map(|&(deadline, _, _)| deadline)
    }

    /// Schedules `id` at `now + delay`, replacing any pending entry for it.
    pub fn schedule(&mut self, id: AbilityId, delay: i64) {
        self.cancel(id);
        self.insert(id, delay);
    }

    /// Schedules `id` at `now + delay` alongside any pending entries for it.
    pub fn schedule_additional(&mut self, id: AbilityId, delay: i64) {
        self.insert(id, delay);
    }

    /// Sets a fresh deadline for `id`, creating the entry when none exists.
    ///
    /// Used for cast interruption: the recovery delay overrides whatever was
    /// pending before.
    pub fn reschedule(&mut self, id: AbilityId, new_delay: i64) {
        self.schedule(id, new_delay);
    }

    /// Drops every pending entry for `id`. Returns how many were removed.
    pub fn cancel(&mut self, id: AbilityId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|&(_, queued, _)| queued != id);
        before - self.queue.len()
    }

    /// Drops all pending entries without firing anything.
    pub fn cancel_all(&mut self) {
        if !self.queue.is_empty() {
            trace!(target: "ai::scheduler", dropped = self.queue.len(), "cancel all events");
        }
        self.queue.clear();
    }

    /// Removes and returns the earliest entry whose deadline is `<= now`.
    ///
    /// Ties on the deadline go to the lower ability id.
    pub fn pop_due(&mut self, now: u64) -> Option<AbilityId> {
        let &key = self.queue.first()?;
        if key.0 > now {
            return None;
        }
        self.queue.remove(&key);
        Some(key.1)
    }

    /// [`pop_due`](Self::pop_due) against the scheduler's own clock.
    pub fn execute_event(&mut self) -> Option<AbilityId> {
        self.pop_due(self.clock)
    }

    fn insert(&mut self, id: AbilityId, delay: i64) {
        debug_assert!(delay >= 0, "negative scheduling delay {delay} for {id}");
        let delay = delay.max(0) as u64;
        let deadline = self.clock.saturating_add(delay);

        self.queue.insert((deadline, id, self.next_seq));
        self.next_seq = self.next_seq.wrapping_add(1);
    }
}
