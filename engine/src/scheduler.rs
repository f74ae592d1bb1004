use std::{collections::BTreeMap, time::Duration};

use tracing::trace;

/// Deferred tasks on a logical clock.
///
/// Nothing fires until `advance` is called, so a task never runs inside the
/// call that scheduled it. Tasks due at the same instant fire in the order
/// they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, task: T) {
        let due = self.now + delay;
        trace!("Scheduling task #{} for {:?}", self.next_seq, due);
        self.queue.insert((due, self.next_seq), task);
        self.next_seq += 1;
    }

    /// Moves the clock forward and returns every task now due, oldest first.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        self.now += elapsed;
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > self.now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_before_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::ZERO, "settle");
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.advance(Duration::ZERO), vec!["settle"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn tasks_fire_when_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(100), 1);
        scheduler.schedule(Duration::from_millis(50), 2);

        assert!(scheduler.advance(Duration::from_millis(40)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(10)), vec![2]);
        assert_eq!(scheduler.advance(Duration::from_millis(49)), Vec::<i32>::new());
        assert_eq!(scheduler.advance(Duration::from_millis(1)), vec![1]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn same_deadline_is_fifo() {
        let mut scheduler = Scheduler::new();
        for i in 0..5 {
            scheduler.schedule(Duration::from_millis(10), i);
        }
        scheduler.schedule(Duration::from_millis(5), 99);
        assert_eq!(
            scheduler.advance(Duration::from_secs(1)),
            vec![99, 0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn delays_are_relative_to_the_current_time() {
        let mut scheduler = Scheduler::new();
        scheduler.advance(Duration::from_millis(500));
        scheduler.schedule(Duration::from_millis(100), "late");
        assert!(scheduler.advance(Duration::from_millis(99)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(1)), vec!["late"]);
    }

    #[test]
    fn clear_drops_pending_tasks() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(1), ());
        scheduler.clear();
        assert!(scheduler.advance(Duration::from_secs(1)).is_empty());
    }
}
