#![forbid(unsafe_code)]

//! Timer registry: cancellable one-shot and interval timers on explicit time.
//!
//! A [`TimerRegistry`] is owned by exactly one component. It never reads the
//! wall clock: callers pass `now` when scheduling and when polling, which lets
//! tests drive every component with a virtual clock built from
//! `base + Duration`.
//!
//! A timer's "callback" is a typed payload. The owning component pulls due
//! payloads with [`poll_due`](TimerRegistry::poll_due) one at a time and
//! dispatches them itself, so handling one timer may cancel the next before
//! it is ever returned.
//!
//! # Invariants
//!
//! 1. A one-shot timer is returned by `poll_due` at most once, and only when
//!    `deadline <= now`.
//! 2. Due timers come out in deadline order; equal deadlines come out in the
//!    order they were armed.
//! 3. After `cancel(h)` returns, `h` is never returned by `poll_due`.
//! 4. Cancelling a fired or already-cancelled handle is a no-op.
//! 5. `cancel_all` leaves the registry empty.
//!
//! # Failure Modes
//!
//! - Zero interval periods are clamped to 1 ms so a poll loop always ends.
//! - Interval periods missed while nobody polled coalesce into one firing;
//!   the timer is re-armed at the first period boundary after `now`.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Smallest interval period accepted by [`TimerRegistry::schedule_every`].
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Opaque handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw id, unique within the owning registry.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Queue key: deadline first, arming sequence second.
type SlotKey = (Instant, u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TimerHandle,
    period: Option<Duration>,
    payload: T,
}

/// Cancellable timers owned by a single component.
#[derive(Debug, Clone)]
pub struct TimerRegistry<T> {
    queue: BTreeMap<SlotKey, Entry<T>>,
    index: HashMap<TimerHandle, SlotKey>,
    next_handle: u64,
    next_seq: u64,
    fired: u64,
    cancelled: u64,
}

impl<T> Default for TimerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerRegistry<T> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            index: HashMap::new(),
            next_handle: 0,
            next_seq: 0,
            fired: 0,
            cancelled: 0,
        }
    }

    /// Arm a one-shot timer that becomes due at `now + delay`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) -> TimerHandle {
        let handle = self.allocate_handle();
        self.arm(now + delay, Entry {
            handle,
            period: None,
            payload,
        });
        crate::trace!(timer = handle.id(), delay_ms = delay.as_millis() as u64, "timer armed");
        handle
    }

    /// Cancel a pending timer.
    ///
    /// Returns `true` if the timer was pending. Fired, cancelled, or foreign
    /// handles return `false` and change nothing.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(key) = self.index.remove(&handle) else {
            return false;
        };
        self.queue.remove(&key);
        self.cancelled += 1;
        crate::trace!(timer = handle.id(), "timer cancelled");
        true
    }

    /// Cancel every handle in `handles`; returns how many were still pending.
    pub fn cancel_many(&mut self, handles: impl IntoIterator<Item = TimerHandle>) -> usize {
        handles
            .into_iter()
            .filter(|&handle| self.cancel(handle))
            .count()
    }

    /// Cancel everything this registry owns; returns how many were pending.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.queue.len();
        self.queue.clear();
        self.index.clear();
        self.cancelled += count as u64;
        if count > 0 {
            crate::debug!(count, "all timers cancelled");
        }
        count
    }

    /// Whether `handle` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.index.contains_key(&handle)
    }

    /// Deadline of a pending timer.
    #[must_use]
    pub fn deadline_of(&self, handle: TimerHandle) -> Option<Instant> {
        self.index.get(&handle).map(|&(deadline, _)| deadline)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.first_key_value().map(|(&(deadline, _), _)| deadline)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total firings returned by `poll_due`.
    #[must_use]
    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    /// Total timers cancelled while pending.
    #[must_use]
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }

    fn allocate_handle(&mut self) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn arm(&mut self, deadline: Instant, entry: Entry<T>) {
        let key = (deadline, self.next_seq);
        self.next_seq += 1;
        self.index.insert(entry.handle, key);
        self.queue.insert(key, entry);
    }
}

impl<T: Clone> TimerRegistry<T> {
    /// Arm an interval timer, first due at `now + period`, then every
    /// `period` until cancelled.
    pub fn schedule_every(&mut self, now: Instant, period: Duration, payload: T) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        let handle = self.allocate_handle();
        self.arm(now + period, Entry {
            handle,
            period: Some(period),
            payload,
        });
        crate::trace!(
            timer = handle.id(),
            period_ms = period.as_millis() as u64,
            "interval armed"
        );
        handle
    }

    /// Pop the earliest timer whose deadline is `<= now`.
    ///
    /// One-shot timers are consumed. Interval timers are re-armed under the
    /// same handle before their payload is returned.
    pub fn poll_due(&mut self, now: Instant) -> Option<(TimerHandle, T)> {
        let (&key, _) = self.queue.first_key_value()?;
        if key.0 > now {
            return None;
        }
        let entry = self.queue.remove(&key)?;
        self.index.remove(&entry.handle);
        self.fired += 1;

        match entry.period {
            Some(period) => {
                let mut next = key.0 + period;
                while next <= now {
                    next += period;
                }
                let payload = entry.payload.clone();
                let handle = entry.handle;
                self.arm(next, entry);
                Some((handle, payload))
            }
            None => Some((entry.handle, entry.payload)),
        }
    }

    /// Pop every due timer in order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<(TimerHandle, T)> {
        let mut due = Vec::new();
        while let Some(fired) = self.poll_due(now) {
            due.push(fired);
        }
        due
    }
}

// ---------------------------------------------------------------------------
// Timed components
// ---------------------------------------------------------------------------

/// A component that owns timers.
///
/// The runtime sleeps until the earliest [`next_deadline`](Timed::next_deadline)
/// across all components, then calls [`advance`](Timed::advance) with the
/// current instant.
pub trait Timed {
    /// Earliest pending deadline, if any timer is armed.
    fn next_deadline(&self) -> Option<Instant>;

    /// Fire every timer due at `now`, in deadline order.
    fn advance(&mut self, now: Instant);

    /// Cancel every pending timer. No callback may fire afterwards.
    fn teardown(&mut self);
}

/// Earliest of several optional deadlines.
#[must_use]
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let h = timers.schedule(t0, ms(100), "a");

        assert!(timers.poll_due(t0 + ms(99)).is_none());
        assert_eq!(timers.poll_due(t0 + ms(100)), Some((h, "a")));
        assert!(timers.poll_due(t0 + ms(500)).is_none());
        assert!(timers.is_empty());
        assert_eq!(timers.fired_count(), 1);
    }

    #[test]
    fn zero_delay_is_due_immediately() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        timers.schedule(t0, Duration::ZERO, 1);
        assert_eq!(timers.drain_due(t0).len(), 1);
    }

    #[test]
    fn cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let h = timers.schedule(t0, ms(10), ());
        assert!(timers.cancel(h));
        assert!(timers.poll_due(t0 + ms(10)).is_none());
    }

    #[test]
    fn cancel_is_idempotent() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let h = timers.schedule(t0, ms(10), ());
        assert!(timers.cancel(h));
        assert!(!timers.cancel(h));
        assert_eq!(timers.cancelled_count(), 1);
    }

    #[test]
    fn cancel_after_fire_is_noop() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let h = timers.schedule(t0, ms(10), ());
        timers.poll_due(t0 + ms(10));
        assert!(!timers.cancel(h));
        assert_eq!(timers.cancelled_count(), 0);
    }

    #[test]
    fn cancel_many_counts_pending_only() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let a = timers.schedule(t0, ms(10), 'a');
        let b = timers.schedule(t0, ms(20), 'b');
        let c = timers.schedule(t0, ms(30), 'c');
        timers.poll_due(t0 + ms(10));
        assert_eq!(timers.cancel_many([a, b, c, b]), 2);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancel_all_empties() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        for i in 0..5 {
            timers.schedule(t0, ms(i * 10), i);
        }
        assert_eq!(timers.cancel_all(), 5);
        assert!(timers.next_deadline().is_none());
        assert!(timers.drain_due(t0 + ms(1000)).is_empty());
    }

    #[test]
    fn due_order_follows_deadline_then_arming() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        timers.schedule(t0, ms(30), "late");
        timers.schedule(t0, ms(10), "first-tie");
        timers.schedule(t0, ms(10), "second-tie");
        timers.schedule(t0, ms(20), "middle");

        let order: Vec<_> = timers
            .drain_due(t0 + ms(30))
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        assert_eq!(order, vec!["first-tie", "second-tie", "middle", "late"]);
    }

    #[test]
    fn interval_rearms_under_same_handle() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let h = timers.schedule_every(t0, ms(100), "tick");

        assert_eq!(timers.poll_due(t0 + ms(100)), Some((h, "tick")));
        assert!(timers.is_pending(h));
        assert_eq!(timers.deadline_of(h), Some(t0 + ms(200)));
        assert_eq!(timers.poll_due(t0 + ms(200)), Some((h, "tick")));
        assert!(timers.cancel(h));
        assert!(timers.poll_due(t0 + ms(300)).is_none());
    }

    #[test]
    fn interval_coalesces_missed_periods() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let h = timers.schedule_every(t0, ms(100), ());
        assert_eq!(timers.drain_due(t0 + ms(450)).len(), 1);
        assert_eq!(timers.deadline_of(h), Some(t0 + ms(500)));
    }

    #[test]
    fn zero_period_is_clamped() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        timers.schedule_every(t0, Duration::ZERO, ());
        assert_eq!(timers.drain_due(t0 + ms(5)).len(), 1);
    }

    #[test]
    fn earliest_skips_none() {
        let t0 = Instant::now();
        assert_eq!(earliest([None, Some(t0 + ms(5)), Some(t0 + ms(2))]), Some(t0 + ms(2)));
        assert_eq!(earliest([None, None]), None);
    }

    proptest! {
        #[test]
        fn every_uncancelled_timer_fires_once_in_order(
            delays in proptest::collection::vec(0u64..5_000, 1..40),
            cancel_mask in proptest::collection::vec(any::<bool>(), 40),
        ) {
            let t0 = Instant::now();
            let mut timers = TimerRegistry::new();
            let handles: Vec<_> = delays
                .iter()
                .enumerate()
                .map(|(i, &d)| timers.schedule(t0, ms(d), i))
                .collect();
            let mut expected = Vec::new();
            for (i, &h) in handles.iter().enumerate() {
                if cancel_mask[i] {
                    timers.cancel(h);
                } else {
                    expected.push(i);
                }
            }

            let fired: Vec<usize> = timers
                .drain_due(t0 + ms(5_000))
                .into_iter()
                .map(|(_, i)| i)
                .collect();

            let mut sorted = fired.clone();
            sorted.sort_by_key(|&i| (delays[i], i));
            prop_assert_eq!(&fired, &sorted);

            let mut fired_set = fired;
            fired_set.sort_unstable();
            prop_assert_eq!(fired_set, expected);
            prop_assert!(timers.is_empty());
        }
    }
}
