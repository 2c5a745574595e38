//! Deterministic virtual-time timers.
//!
//! One-shot and repeating timers keyed by [`TimerId`]. Nothing runs on its
//! own: the owner calls [`Scheduler::pop_due`] with the current time and
//! handles each event to completion before asking for the next one.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::Millis;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<E> {
    event: E,
    period: Option<Millis>,
}

/// Heap entry. `seq` breaks ties so timers due together fire in the order
/// they were armed.
#[derive(Debug, PartialEq, Eq)]
struct Slot {
    due: Millis,
    seq: u64,
    id: TimerId,
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on (due, seq)
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Timer queue over event payloads of type `E`
#[derive(Debug)]
pub struct Scheduler<E> {
    queue: BinaryHeap<Slot>,
    timers: HashMap<TimerId, Timer<E>>,
    next_id: u64,
    next_seq: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            timers: HashMap::new(),
            next_id: 0,
            next_seq: 0,
        }
    }
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `event` once at `now + delay`
    pub fn after(&mut self, now: Millis, delay: Millis, event: E) -> TimerId {
        self.arm(now.saturating_add(delay), None, event)
    }

    /// Fire `event` every `period`, first at `now + period`
    pub fn every(&mut self, now: Millis, period: Millis, event: E) -> TimerId {
        debug_assert!(period > 0, "repeating timer needs a non-zero period");
        self.arm(now.saturating_add(period), Some(period.max(1)), event)
    }

    fn arm(&mut self, due: Millis, period: Option<Millis>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, Timer { event, period });
        self.push_slot(due, id);
        id
    }

    fn push_slot(&mut self, due: Millis, id: TimerId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Slot { due, seq, id });
    }

    /// Cancel a timer. Returns true if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        // The heap slot is dropped lazily in `pop_due`
        self.timers.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Number of live timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest time a live timer is due
    pub fn next_due(&mut self) -> Option<Millis> {
        self.discard_cancelled();
        self.queue.peek().map(|slot| slot.due)
    }

    /// Take the earliest timer due at or before `now`.
    ///
    /// Repeating timers are re-armed at `due + period` before returning, so
    /// the handler may cancel them. A repeating timer whose next due time
    /// would overflow fires this last time and is dropped.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, TimerId, E)> {
        self.discard_cancelled();
        if self.queue.peek()?.due > now {
            return None;
        }
        let slot = self.queue.pop()?;
        let timer = self.timers.get(&slot.id)?;
        let event = timer.event.clone();
        match timer.period.and_then(|period| slot.due.checked_add(period)) {
            Some(next) => self.push_slot(next, slot.id),
            None => {
                self.timers.remove(&slot.id);
            }
        }
        Some((slot.due, slot.id, event))
    }

    /// Drop every timer
    pub fn clear(&mut self) {
        self.queue.clear();
        self.timers.clear();
    }

    fn discard_cancelled(&mut self) {
        while let Some(slot) = self.queue.peek() {
            if self.timers.contains_key(&slot.id) {
                break;
            }
            self.queue.pop();
        }
    }
}
