//! Deferred events on the simulation clock.
//!
//! Timed transitions (attack window, cooldown, death-to-game-over delay) are
//! queued here instead of being run as callbacks. An event fires on the first
//! tick at or after its due time, never inside the tick that scheduled it.
//! Nothing is ever cancelled: events carry a [`Generation`] naming the target
//! they were scheduled for, and the receiver drops any event whose target has
//! since been replaced.

/// Identity token for a replaceable simulation object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u32);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Scheduled<E> {
    due_us: u64,
    seq: u64,
    event: E,
}

#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now_us: u64,
    next_seq: u64,
    pending: Vec<Scheduled<E>>,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now_us: 0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    /// Queue `event` to fire `delay_us` after the current clock.
    pub fn schedule_in(&mut self, delay_us: u64, event: E) {
        self.pending.push(Scheduled {
            due_us: self.now_us + delay_us,
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
    }

    /// Move the clock forward and hand back everything now due, ordered by
    /// due time then scheduling order.
    pub fn advance(&mut self, dt_us: u64) -> Vec<E> {
        self.now_us += dt_us;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_us <= self.now_us {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|s| (s.due_us, s.seq));
        due.into_iter().map(|s| s.event).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_fires_on_first_tick_past_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(40_000, "attack_done");

        assert!(scheduler.advance(16_667).is_empty());
        assert!(scheduler.advance(16_667).is_empty());
        assert_eq!(scheduler.advance(16_667), vec!["attack_done"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn zero_delay_waits_for_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(0, 1);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.advance(0), vec![1]);
    }

    #[test]
    fn due_events_come_back_in_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(30, 'c');
        scheduler.schedule_in(10, 'a');
        scheduler.schedule_in(10, 'b');
        scheduler.schedule_in(500, 'z');
        assert_eq!(scheduler.advance(100), vec!['a', 'b', 'c']);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn delay_is_relative_to_current_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.advance(1_000);
        scheduler.schedule_in(500, ());
        assert!(scheduler.advance(499).is_empty());
        assert_eq!(scheduler.advance(1).len(), 1);
    }

    #[test]
    fn generations_are_distinct() {
        let first = Generation::default();
        let second = first.next();
        assert_ne!(first, second);
        assert_eq!(second.raw(), first.raw() + 1);
    }
}
