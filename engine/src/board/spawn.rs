use tracing::debug;

use super::rules::opposite_seed;

/// Longest run of identical spawn values before the next one is forced.
pub const MAX_STREAK: u32 = 3;

/// Anti-streak layer between the requested spawn value and the one placed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpawnPicker {
    last: Option<u32>,
    repeats: u32,
    force_different: bool,
}

impl SpawnPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<u32> {
        self.last
    }

    /// Returns the value to actually spawn for a `requested` one.
    pub fn pick(&mut self, requested: u32) -> u32 {
        if self.force_different
            && let Some(last) = self.last
        {
            let forced = opposite_seed(last);
            debug!(
                "Forcing spawn value {} after a run of {} (requested {})",
                forced, last, requested
            );
            self.force_different = false;
            self.repeats = 1;
            self.last = Some(forced);
            return forced;
        }

        if self.last == Some(requested) {
            self.repeats += 1;
            if self.repeats >= MAX_STREAK {
                self.force_different = true;
                self.repeats = 0;
            }
        } else {
            self.repeats = 1;
            self.last = Some(requested);
        }

        requested
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn longest_run(values: &[u32]) -> usize {
        values
            .chunk_by(|a, b| a == b)
            .map(|run| run.len())
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn constant_requests_never_run_past_three() {
        for requested in [2, 3] {
            let mut picker = SpawnPicker::new();
            let spawned: Vec<u32> = (0..150).map(|_| picker.pick(requested)).collect();
            assert!(longest_run(&spawned) <= MAX_STREAK as usize);
            assert_eq!(
                &spawned[..4],
                &[requested, requested, requested, opposite_seed(requested)]
            );
        }
    }

    #[test]
    fn random_requests_never_run_past_three() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut picker = SpawnPicker::new();
        let spawned: Vec<u32> = (0..2_000)
            .map(|_| picker.pick(if rng.random_bool(0.5) { 2 } else { 3 }))
            .collect();
        assert!(longest_run(&spawned) <= MAX_STREAK as usize);

        let twos = spawned.iter().filter(|v| **v == 2).count();
        assert!((800..1_200).contains(&twos), "skewed: {twos} twos");
    }

    #[test]
    fn forcing_only_affects_the_next_spawn() {
        let mut picker = SpawnPicker::new();
        assert_eq!(picker.pick(2), 2);
        assert_eq!(picker.pick(2), 2);
        assert_eq!(picker.pick(2), 2);
        assert_eq!(picker.last(), Some(2));

        assert_eq!(picker.pick(2), 3);
        assert_eq!(picker.last(), Some(3));
        assert_eq!(picker.pick(2), 2);
    }

    #[test]
    fn forced_value_starts_a_new_run() {
        let mut picker = SpawnPicker::new();
        for _ in 0..3 {
            picker.pick(2);
        }
        assert_eq!(picker.pick(3), 3);
        assert_eq!(picker.pick(3), 3);
        assert_eq!(picker.pick(3), 3);
        assert_eq!(picker.pick(3), 2);
    }
}
