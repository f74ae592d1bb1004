use std::collections::HashMap;

use primes_common::{
    models::{Direction, TileView},
    protocol::{Command, GameEvent},
};
use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    board::{Board, Scorekeeper},
    config::GameConfig,
    error::BoardError,
    scheduler::Scheduler,
    session::Session,
    storage::Storage,
    tile::TileId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Settle,
    Expire(TileId),
}

/// One running game: board, score keeping, deferred work and listeners.
pub struct Game {
    config: GameConfig,
    board: Board,
    session: Session,
    scheduler: Scheduler<Task>,
    subscribers: HashMap<Uuid, mpsc::UnboundedSender<GameEvent>>,
    over: bool,
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

impl Game {
    #[instrument(level = "trace", skip(config, storage))]
    pub fn new(config: GameConfig, storage: Box<dyn Storage>) -> Self {
        info!(
            "Creating new game: {}x{}",
            config.params.width, config.params.height
        );
        let board = Board::new(
            config.params,
            config.styles.clone(),
            rng_from(config.seed),
        );
        let session = Session::new(
            storage,
            rng_from(config.seed.map(|s| s.wrapping_add(1))),
        );
        Self {
            config,
            board,
            session,
            scheduler: Scheduler::new(),
            subscribers: HashMap::new(),
            over: false,
        }
    }

    pub fn subscribe(&mut self) -> (Uuid, mpsc::UnboundedReceiver<GameEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.subscribers.insert(id, sender);
        debug!("Subscriber {} added, total: {}", id, self.subscribers.len());
        (id, receiver)
    }

    pub fn unsubscribe(&mut self, id: &Uuid) {
        if self.subscribers.remove(id).is_none() {
            warn!("Attempted to remove non-existent subscriber: {}", id);
        }
    }

    fn broadcast(&mut self, event: GameEvent) {
        self.subscribers.retain(|id, sender| {
            let alive = sender.send(event.clone()).is_ok();
            if !alive {
                debug!("Dropping closed subscriber {}", id);
            }
            alive
        });
    }

    fn init_event(&self) -> GameEvent {
        GameEvent::Init {
            width: self.board.grid().width(),
            height: self.board.grid().height(),
            tiles: self.board.views(),
            score: self.session.score(),
            high_score: self.session.high_score(),
        }
    }

    /// Clears the board and seeds it with the configured start tiles.
    #[instrument(level = "trace", skip(self))]
    pub fn start(&mut self) {
        self.scheduler.clear();
        self.board.clear();
        self.over = false;

        for value in self.config.start_tiles.clone() {
            if let Err(e) = self.board.create_seed_tile(value) {
                warn!("Could not place start tile {}: {}", value, e);
            }
        }

        info!(
            "Game started with {} tiles, high score {}",
            self.board.tile_count(),
            self.session.high_score()
        );
        self.broadcast(self.init_event());

        if self.board.is_game_over() {
            self.finish();
        }
    }

    pub fn restart(&mut self) {
        info!("Restarting game at score {}", self.session.score());
        self.session.reset();
        self.start();
    }

    /// Applies a command. Returns whether it changed the game.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Move { direction } => self.move_tiles(direction),
            Command::Restart => {
                self.restart();
                true
            }
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn move_tiles(&mut self, direction: Direction) -> bool {
        if self.over {
            debug!("Ignoring {:?} on finished game", direction);
            return false;
        }
        if self.board.is_waiting() {
            debug!("Dropping {:?} while tiles settle", direction);
            return false;
        }

        let outcome = self.board.sweep(direction, &mut self.session);
        if !outcome.changed() {
            return false;
        }

        self.scheduler.schedule(self.config.settle_delay, Task::Settle);
        self.broadcast(GameEvent::Update {
            moves: outcome.moves,
            merges: outcome.merges,
            score: self.session.score(),
        });
        true
    }

    /// Moves the game clock forward, running every deferred task now due.
    pub fn advance(&mut self, elapsed: std::time::Duration) {
        for task in self.scheduler.advance(elapsed) {
            self.run(task);
        }
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::Settle => {
                let outcome = self.board.settle(&mut self.session);
                if let Some(tile) = outcome.spawned {
                    self.broadcast(GameEvent::Spawn { tile });
                }
                if outcome.game_over {
                    self.finish();
                }
            }
            Task::Expire(id) => {
                if self.board.destroy_expired(id) {
                    self.broadcast(GameEvent::Remove { id });
                }
            }
        }
    }

    fn finish(&mut self) {
        if self.over {
            return;
        }
        self.over = true;
        self.session.report_game_over();
        info!("Game over! Final score {}", self.session.score());
        self.broadcast(GameEvent::GameOver {
            score: self.session.score(),
            high_score: self.session.high_score(),
        });
    }

    /// Turns every tile of `target` into a 5 and removes `trigger` after the
    /// conversion delay. Input stays open meanwhile.
    #[instrument(level = "trace", skip(self))]
    pub fn trigger_seed_conversion(
        &mut self,
        trigger: TileId,
        target: u32,
    ) -> Result<(), BoardError> {
        if self.over {
            debug!("Ignoring seed conversion on finished game");
            return Err(BoardError::Finished);
        }
        let conversion = self.board.convert_seeds(trigger, target)?;
        self.scheduler
            .schedule(self.config.conversion_delay, Task::Expire(trigger));
        self.broadcast(GameEvent::Convert {
            converted: conversion.converted,
            trigger: conversion.trigger,
        });
        Ok(())
    }

    /// Persists the high score if it improved.
    pub fn save(&mut self) {
        self.session.save();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snapshot(&self) -> Vec<TileView> {
        self.board.views()
    }

    pub fn score(&self) -> u64 {
        self.session.score()
    }

    pub fn high_score(&self) -> u64 {
        self.session.high_score()
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn is_waiting(&self) -> bool {
        self.board.is_waiting()
    }
}
