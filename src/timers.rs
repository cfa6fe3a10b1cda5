/// Deferred actions, drained once per tick.
///
/// Each entry carries the generation it was scheduled in; bumping the
/// generation (new game, next wave, music stopped) silently invalidates
/// everything still pending.  Keyed entries replace any earlier entry with
/// the same key, so re-arming a timer never leaves the old one behind.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;
use std::time::Duration;

struct Entry<K, A> {
    deadline: Duration,
    seq: u64,
    generation: u64,
    key: Option<K>,
    action: A,
}

impl<K, A> PartialEq for Entry<K, A> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl<K, A> Eq for Entry<K, A> {}

impl<K, A> PartialOrd for Entry<K, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K, A> Ord for Entry<K, A> {
    // Reversed so the max-heap pops the earliest deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct TimerQueue<K, A> {
    heap: BinaryHeap<Entry<K, A>>,
    /// Sequence number of the live entry for each key.
    live_keys: HashMap<K, u64>,
    generation: u64,
    next_seq: u64,
}

impl<K: Eq + Hash + Clone, A> Default for TimerQueue<K, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, A> TimerQueue<K, A> {
    pub fn new() -> Self {
        TimerQueue {
            heap: BinaryHeap::new(),
            live_keys: HashMap::new(),
            generation: 0,
            next_seq: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidate everything scheduled so far.
    pub fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.live_keys.clear();
        self.generation
    }

    fn push(&mut self, key: Option<K>, deadline: Duration, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(k) = &key {
            self.live_keys.insert(k.clone(), seq);
        }
        self.heap.push(Entry {
            deadline,
            seq,
            generation: self.generation,
            key,
            action,
        });
    }

    pub fn schedule(&mut self, deadline: Duration, action: A) {
        self.push(None, deadline, action);
    }

    /// Schedule `action`, replacing any pending entry under the same key.
    pub fn schedule_keyed(&mut self, key: K, deadline: Duration, action: A) {
        self.push(Some(key), deadline, action);
    }

    pub fn cancel(&mut self, key: &K) {
        self.live_keys.remove(key);
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.live_keys.contains_key(key)
    }

    fn is_current(&self, entry: &Entry<K, A>) -> bool {
        if entry.generation != self.generation {
            return false;
        }
        match &entry.key {
            Some(k) => self.live_keys.get(k) == Some(&entry.seq),
            None => true,
        }
    }

    /// Pop every current entry whose deadline has passed, earliest first.
    pub fn drain_due(&mut self, now: Duration) -> Vec<A> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|e| e.deadline <= now) {
            let Some(entry) = self.heap.pop() else { break };
            if !self.is_current(&entry) {
                continue;
            }
            if let Some(k) = &entry.key {
                self.live_keys.remove(k);
            }
            due.push(entry.action);
        }
        due
    }

    /// Deadline of the pending entry under `key`.
    pub fn deadline_of(&self, key: &K) -> Option<Duration> {
        let seq = *self.live_keys.get(key)?;
        self.heap
            .iter()
            .find(|e| e.seq == seq && e.generation == self.generation)
            .map(|e| e.deadline)
    }

    /// Earliest deadline among entries that would still fire.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap
            .iter()
            .filter(|e| self.is_current(e))
            .map(|e| e.deadline)
            .min()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.live_keys.clear();
    }
}
