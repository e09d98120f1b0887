//! Virtual-clock timer queue
//!
//! Every delayed step of a session (column stagger, settle, dwell, overlay
//! fades, CTA) is a timer here. Timers fire in due order, ties in scheduling
//! order, and each one can be cancelled individually or all at once.

use std::collections::{BTreeMap, HashMap};

/// Handle of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Timer queue keyed by virtual milliseconds
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_seq: u64,
    queue: BTreeMap<(u64, u64), (TimerId, T)>,
    index: HashMap<TimerId, (u64, u64)>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `payload` to fire `delay_ms` from now
    pub fn schedule_in(&mut self, delay_ms: u64, payload: T) -> TimerId {
        self.schedule_at(self.now_ms.saturating_add(delay_ms), payload)
    }

    /// Schedule `payload` at an absolute time (clamped to now)
    pub fn schedule_at(&mut self, due_ms: u64, payload: T) -> TimerId {
        let due = due_ms.max(self.now_ms);
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        self.queue.insert((due, seq), (id, payload));
        self.index.insert(id, (due, seq));
        id
    }

    /// Cancel one timer; `false` when it already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancel every pending timer
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.queue.len();
        self.queue.clear();
        self.index.clear();
        cancelled
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|&(due, _)| due)
    }

    /// Pop the earliest timer due at or before `until_ms`
    ///
    /// The clock moves to the popped timer's due time, so handlers that
    /// schedule follow-ups measure from the moment their timer fired.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let (&key, _) = self.queue.iter().next()?;
        if key.0 > until_ms {
            return None;
        }
        let (id, payload) = self.queue.remove(&key)?;
        self.index.remove(&id);
        self.now_ms = self.now_ms.max(key.0);
        Some((id, payload))
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
