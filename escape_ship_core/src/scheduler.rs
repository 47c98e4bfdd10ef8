use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Handle to a scheduled continuation, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    due: Duration,
    token: TimerToken,
    payload: T,
}

/// Tick-driven timer queue.
///
/// Continuations are plain values: the owner decides what to do with each
/// payload once [`advance`](Self::advance) hands it back. Nothing runs
/// between ticks.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_token: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler {
            now: Duration::ZERO,
            next_token: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule_after(&mut self, delay: Duration, payload: T) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.entries.push(Entry {
            due: self.now + delay,
            token,
            payload,
        });
        token
    }

    /// Invalidates `token`. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.token != token);
        self.entries.len() != before
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.entries.iter().any(|entry| entry.token == token)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Moves time forward by `dt` and returns every continuation now due,
    /// earliest first. Ties keep scheduling order.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now += dt;
        let now = self.now;
        let (mut due, waiting): (Vec<Entry<T>>, Vec<Entry<T>>) =
            self.entries.drain(..).partition(|entry| entry.due <= now);
        self.entries = waiting;
        due.sort_by_key(|entry| (entry.due, entry.token.0));
        due.into_iter().map(|entry| entry.payload).collect()
    }

    /// Drops every pending continuation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
