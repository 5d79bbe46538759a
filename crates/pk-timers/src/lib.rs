//! Deterministic timer queue standing in for the page event loop.
//!
//! The queue owns a virtual clock. Hosts register one-shot timeouts and
//! repeating intervals carrying a task payload, then drain due timers with
//! [`TimerQueue::pop_due`] and run each task to completion before asking for
//! the next one. Timers fire in deadline order; timers sharing a deadline
//! fire in the order they were (re)scheduled.

use std::fmt;
use std::time::Duration;

/// Shortest accepted interval period. Zero-period intervals would never let
/// the clock move forward.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle returned when registering a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A timer whose deadline has been reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer<T> {
    pub id: TimerId,
    pub at: Duration,
    pub task: T,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    due: Duration,
    seq: u64,
    period: Option<Duration>,
    task: T,
}

/// Virtual-clock timer queue.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            next_seq: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: Clone + fmt::Debug> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time, measured from queue creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn set_timeout(&mut self, delay: Duration, task: T) -> TimerId {
        self.schedule(delay, None, task)
    }

    pub fn set_interval(&mut self, period: Duration, task: T) -> TimerId {
        let period = period.max(MIN_INTERVAL);
        self.schedule(period, Some(period), task)
    }

    fn schedule(&mut self, delay: Duration, period: Option<Duration>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let seq = self.bump_seq();
        self.entries.push(Entry {
            id,
            due: self.now.saturating_add(delay),
            seq,
            period,
            task,
        });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        seq
    }

    /// Cancels a timer. Returns false if it already fired (timeouts) or was
    /// cleared before.
    pub fn clear(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        before != self.entries.len()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Removes and returns the earliest timer due at or before `deadline`,
    /// moving the clock to its due time. Intervals are re-armed one period
    /// after the time they fired.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<FiredTimer<T>> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= deadline)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(index, _)| index)?;

        let fired_at = self.entries[index].due.max(self.now);
        self.now = fired_at;

        let fired = match self.entries[index].period {
            Some(period) => {
                let seq = self.bump_seq();
                let entry = &mut self.entries[index];
                entry.due = fired_at.saturating_add(period);
                entry.seq = seq;
                FiredTimer {
                    id: entry.id,
                    at: fired_at,
                    task: entry.task.clone(),
                }
            }
            None => {
                let entry = self.entries.swap_remove(index);
                FiredTimer {
                    id: entry.id,
                    at: fired_at,
                    task: entry.task,
                }
            }
        };

        tracing::trace!(timer = %fired.id, at_ms = fired.at.as_millis() as u64, task = ?fired.task, "timer fired");
        Some(fired)
    }

    /// Moves the clock forward to `deadline` without firing anything. Call
    /// after draining [`TimerQueue::pop_due`] for the same deadline.
    pub fn advance_to(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    /// Drains every timer due within `delta` of the current time, handing
    /// each to `run` in firing order. `run` may schedule or clear timers.
    pub fn run_for(&mut self, delta: Duration, mut run: impl FnMut(&mut Self, FiredTimer<T>)) {
        let deadline = self.now.saturating_add(delta);
        while let Some(fired) = self.pop_due(deadline) {
            run(self, fired);
        }
        self.advance_to(deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::TimerQueue;
    use std::time::Duration;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn timeouts_fire_once_at_their_deadline() {
        let mut queue = TimerQueue::new();
        let id = queue.set_timeout(ms(3000), "dismiss");
        assert!(queue.pop_due(ms(2999)).is_none());
        let Some(fired) = queue.pop_due(ms(3000)) else {
            panic!("timeout should be due at 3000ms");
        };
        assert_eq!(fired.id, id);
        assert_eq!(fired.at, ms(3000));
        assert!(!queue.is_active(id));
        assert!(queue.pop_due(ms(100_000)).is_none());
    }

    #[test]
    fn intervals_rearm_every_period() {
        let mut queue = TimerQueue::new();
        queue.set_interval(ms(2000), "tick");
        let mut fired_at = Vec::new();
        queue.run_for(ms(7000), |_, fired| fired_at.push(fired.at));
        assert_eq!(fired_at, vec![ms(2000), ms(4000), ms(6000)]);
        assert_eq!(queue.now(), ms(7000));
        assert_eq!(queue.next_deadline(), Some(ms(8000)));
    }

    #[test]
    fn equal_deadlines_fire_in_registration_order() {
        let mut queue = TimerQueue::new();
        queue.set_timeout(ms(10), "first");
        queue.set_timeout(ms(10), "second");
        queue.set_timeout(ms(5), "earliest");
        let mut order = Vec::new();
        queue.run_for(ms(10), |_, fired| order.push(fired.task));
        assert_eq!(order, vec!["earliest", "first", "second"]);
    }

    #[test]
    fn cleared_timers_never_fire() {
        let mut queue = TimerQueue::new();
        let interval = queue.set_interval(ms(100), "tick");
        let mut ticks = 0;
        queue.run_for(ms(250), |_, _| ticks += 1);
        assert_eq!(ticks, 2);
        assert!(queue.clear(interval));
        assert!(!queue.clear(interval));
        queue.run_for(ms(1000), |_, _| ticks += 1);
        assert_eq!(ticks, 2);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn callbacks_can_cancel_their_own_interval() {
        let mut queue = TimerQueue::new();
        let mut ticks = 0;
        queue.set_interval(ms(100), "tick");
        queue.run_for(ms(1000), |queue, fired| {
            ticks += 1;
            if ticks == 3 {
                queue.clear(fired.id);
            }
        });
        assert_eq!(ticks, 3);
    }

    #[test]
    fn zero_period_intervals_are_clamped() {
        let mut queue = TimerQueue::new();
        queue.set_interval(Duration::ZERO, ());
        let mut ticks = 0;
        queue.run_for(ms(5), |_, _| ticks += 1);
        assert_eq!(ticks, 5);
    }
}
