// Timer queue - Cancellable one-shot timers
// Tasks due at the same instant fire in registration order. A cancelled timer
// is forgotten immediately and can never fire.

use super::{micros_to_seconds, seconds_to_micros};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Handle returned by `schedule_once`, used to cancel the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Priority queue of pending one-shot tasks
#[derive(Debug)]
pub struct TimerQueue<T> {
    /// (due time in microseconds, handle id); stale entries are skipped lazily
    deadlines: BinaryHeap<Reverse<(u64, u64)>>,
    pending: HashMap<u64, T>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            deadlines: BinaryHeap::new(),
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    /// Schedule `task` to run at an absolute time (seconds)
    pub fn schedule_at(&mut self, due_seconds: f64, task: T) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;

        self.deadlines
            .push(Reverse((seconds_to_micros(due_seconds), id)));
        self.pending.insert(id, task);
        TimerHandle(id)
    }

    /// Schedule `task` to run `delay_ms` after `now_seconds`
    pub fn schedule_once(&mut self, now_seconds: f64, delay_ms: f64, task: T) -> TimerHandle {
        let due = seconds_to_micros(now_seconds) + seconds_to_micros(delay_ms / 1000.0);
        self.schedule_at(micros_to_seconds(due), task)
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle.0).is_some()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle.0)
    }

    /// Number of timers that can still fire
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }

    /// Time (seconds) of the earliest timer that can still fire
    pub fn next_deadline(&mut self) -> Option<f64> {
        self.discard_cancelled();
        self.deadlines
            .peek()
            .map(|Reverse((due, _))| micros_to_seconds(*due))
    }

    /// Remove and return the earliest timer due at or before `now_seconds`
    pub fn pop_due(&mut self, now_seconds: f64) -> Option<(TimerHandle, T)> {
        self.discard_cancelled();
        let now = seconds_to_micros(now_seconds);

        let Reverse((due, id)) = *self.deadlines.peek()?;
        if due > now {
            return None;
        }
        self.deadlines.pop();
        self.pending.remove(&id).map(|task| (TimerHandle(id), task))
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, id))) = self.deadlines.peek() {
            if self.pending.contains_key(id) {
                break;
            }
            self.deadlines.pop();
        }
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
