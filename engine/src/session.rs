use rand::{Rng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::{
    board::{
        Scorekeeper,
        rules::{SEED_HIGH, SEED_LOW},
    },
    storage::Storage,
};

pub const HIGH_SCORE_KEY: &str = "high_score";

/// Score, persisted high score, and the pre-rolled next spawn value.
pub struct Session {
    score: u64,
    high_score: u64,
    next_value: u32,
    finished: bool,
    rng: StdRng,
    storage: Box<dyn Storage>,
}

fn roll<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.random_bool(0.5) {
        SEED_LOW
    } else {
        SEED_HIGH
    }
}

impl Session {
    pub fn new(storage: Box<dyn Storage>, mut rng: StdRng) -> Self {
        let high_score = storage.get(HIGH_SCORE_KEY).unwrap_or(0);
        debug!("Loaded high score {}", high_score);
        let next_value = roll(&mut rng);
        Self {
            score: 0,
            high_score,
            next_value,
            finished: false,
            rng,
            storage,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn reset(&mut self) {
        self.save();
        self.score = 0;
        self.finished = false;
        self.next_value = roll(&mut self.rng);
    }

    /// Writes the high score if it is above the stored one.
    pub fn save(&mut self) {
        let stored = self.storage.get(HIGH_SCORE_KEY).unwrap_or(0);
        if self.high_score <= stored {
            return;
        }
        match self.storage.set(HIGH_SCORE_KEY, self.high_score) {
            Ok(()) => info!("Saved new high score {}", self.high_score),
            Err(e) => warn!("Failed to save high score {}: {}", self.high_score, e),
        }
    }
}

impl Scorekeeper for Session {
    fn next_spawn_value(&self) -> u32 {
        self.next_value
    }

    fn prepare_next(&mut self) {
        self.next_value = roll(&mut self.rng);
    }

    fn report_merge(&mut self, points: u64) {
        self.score += points;
        if self.score > self.high_score {
            self.high_score = self.score;
        }
    }

    /// Only the first report after a reset counts.
    fn report_game_over(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        info!(
            "Game over with score {} (high score {})",
            self.score, self.high_score
        );
        self.save();
    }
}
