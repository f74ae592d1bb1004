use std::collections::HashMap;

use primes_common::{
    models::{Direction, GameParams, Pos, TileView},
    protocol::{TileMerge, TileMove},
};
use rand::rngs::StdRng;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::TileStyles,
    error::BoardError,
    grid::Grid,
    tile::{Tile, TileId},
};

pub mod rules;
pub mod spawn;

use spawn::SpawnPicker;

/// What the board needs from whoever keeps score.
pub trait Scorekeeper {
    /// The pre-selected value for the next spawn, before anti-streak forcing.
    fn next_spawn_value(&self) -> u32;
    /// Called once the pre-selected value has been consumed.
    fn prepare_next(&mut self);
    fn report_merge(&mut self, points: u64);
    fn report_game_over(&mut self);
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepOutcome {
    pub moves: Vec<TileMove>,
    pub merges: Vec<TileMerge>,
}

impl SweepOutcome {
    pub fn changed(&self) -> bool {
        !self.moves.is_empty() || !self.merges.is_empty()
    }

    pub fn points(&self) -> u64 {
        self.merges.iter().map(|merge| merge.points).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleOutcome {
    pub spawned: Option<TileView>,
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub converted: Vec<TileView>,
    pub trigger: TileView,
}

enum Step {
    Moved(TileMove),
    Merged(TileMerge),
}

/// Owns the grid and every tile on it.
///
/// The grid's cell occupancy and each tile's `pos` are two views of the same
/// relation. They are only changed together, by `insert_tile`, `move_tile`,
/// `merge_into` and `destroy_expired`.
pub struct Board {
    grid: Grid,
    tiles: HashMap<TileId, Tile>,
    /// Tiles taken out of play that still hold their cell until destroyed.
    expiring: HashMap<TileId, Tile>,
    styles: TileStyles,
    picker: SpawnPicker,
    waiting: bool,
    rng: StdRng,
}

impl Board {
    pub fn new(params: GameParams, styles: TileStyles, rng: StdRng) -> Self {
        info!("Creating {}x{} board", params.width, params.height);
        Self {
            grid: Grid::new(params.width, params.height),
            tiles: HashMap::new(),
            expiring: HashMap::new(),
            styles,
            picker: SpawnPicker::new(),
            waiting: false,
            rng,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    /// The live tile in `pos`. Expiring tiles are not reported.
    pub fn tile_at(&self, pos: Pos) -> Option<&Tile> {
        self.grid.occupant(pos).and_then(|id| self.tiles.get(&id))
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Every visible tile, live or expiring, in row-major order.
    pub fn views(&self) -> Vec<TileView> {
        let mut views: Vec<TileView> = self
            .tiles
            .values()
            .chain(self.expiring.values())
            .map(Tile::view)
            .collect();
        views.sort_by_key(|view| (view.pos.y, view.pos.x));
        views
    }

    /// Face values by row, `None` for empty cells.
    pub fn rows(&self) -> Vec<Vec<Option<u32>>> {
        let mut rows = vec![vec![None; self.grid.width()]; self.grid.height()];
        for tile in self.tiles.values().chain(self.expiring.values()) {
            rows[tile.pos().y][tile.pos().x] = Some(tile.value());
        }
        rows
    }

    #[instrument(level = "trace", skip(self))]
    pub fn clear(&mut self) {
        debug!(
            "Clearing board: {} live, {} expiring tiles",
            self.tiles.len(),
            self.expiring.len()
        );
        self.grid.clear();
        self.tiles.clear();
        self.expiring.clear();
        self.picker.reset();
        self.waiting = false;
    }

    /// Places a tile of any value in a random empty cell. Used to seed new games.
    #[instrument(level = "trace", skip(self))]
    pub fn create_seed_tile(&mut self, value: u32) -> Result<TileView, BoardError> {
        let pos = self.grid.random_empty_cell(&mut self.rng)?;
        self.place_tile(value, pos)
    }

    /// Places a tile of `value` in the empty cell `pos`.
    pub fn place_tile(&mut self, value: u32, pos: Pos) -> Result<TileView, BoardError> {
        if !self.grid.contains(pos) {
            return Err(BoardError::OutOfBounds(pos));
        }
        if !self.grid.is_empty_at(pos) {
            return Err(BoardError::CellOccupied(pos));
        }
        let tile = Tile::new(value, pos, &self.styles);
        self.insert_tile(tile)
    }

    fn insert_tile(&mut self, tile: Tile) -> Result<TileView, BoardError> {
        self.grid.occupy(tile.pos(), tile.id())?;
        let view = tile.view();
        debug!("Spawned {} at ({}, {})", view.value, view.pos.x, view.pos.y);
        self.tiles.insert(tile.id(), tile);
        Ok(view)
    }

    fn move_tile(&mut self, id: TileId, to: Pos) -> Result<(), BoardError> {
        let tile = self.tiles.get_mut(&id).ok_or(BoardError::UnknownTile)?;
        self.grid.occupy(to, id)?;
        self.grid.vacate(tile.pos());
        tile.set_pos(to);
        Ok(())
    }

    fn merge_into<K: Scorekeeper + ?Sized>(
        &mut self,
        moving_id: TileId,
        target_id: TileId,
        keeper: &mut K,
    ) -> Result<TileMerge, BoardError> {
        if !self.tiles.contains_key(&target_id) {
            return Err(BoardError::UnknownTile);
        }
        let moving = self
            .tiles
            .remove(&moving_id)
            .ok_or(BoardError::UnknownTile)?;
        self.grid.vacate(moving.pos());

        let target = self
            .tiles
            .get_mut(&target_id)
            .ok_or(BoardError::UnknownTile)?;
        let value = rules::merged_value(moving.value(), target.value());
        target.set_value(value, &self.styles);
        target.locked = true;

        let points = rules::merge_points(value);
        keeper.report_merge(points);

        Ok(TileMerge {
            consumed: moving_id,
            into: target_id,
            at: target.pos(),
            value,
            points,
        })
    }

    /// Cells in the order a sweep towards `direction` visits them: the edge
    /// being travelled to first, then outwards.
    fn scan_order(&self, direction: Direction) -> Vec<Pos> {
        let (width, height) = (self.grid.width(), self.grid.height());
        let xs: Vec<usize> = match direction {
            Direction::Right => (0..width).rev().collect(),
            _ => (0..width).collect(),
        };
        let ys: Vec<usize> = match direction {
            Direction::Down => (0..height).rev().collect(),
            _ => (0..height).collect(),
        };
        ys.iter()
            .flat_map(|&y| xs.iter().map(move |&x| Pos { x, y }))
            .collect()
    }

    fn attempt_move<K: Scorekeeper + ?Sized>(
        &mut self,
        from: Pos,
        direction: Direction,
        keeper: &mut K,
    ) -> Result<Option<Step>, BoardError> {
        let Some(id) = self.grid.occupant(from) else {
            return Ok(None);
        };
        let Some(tile) = self.tiles.get(&id) else {
            return Ok(None);
        };

        let mut last_valid = None;
        let mut cursor = from;
        while let Some(next) = self.grid.adjacent(cursor, direction) {
            match self.grid.occupant(next) {
                None => {
                    last_valid = Some(next);
                    cursor = next;
                }
                Some(other) => {
                    let mergeable = self
                        .tiles
                        .get(&other)
                        .is_some_and(|target| rules::can_merge(tile, target));
                    if mergeable {
                        return self
                            .merge_into(id, other, keeper)
                            .map(|merge| Some(Step::Merged(merge)));
                    }
                    break;
                }
            }
        }

        match last_valid {
            Some(to) => {
                self.move_tile(id, to)?;
                Ok(Some(Step::Moved(TileMove { id, from, to })))
            }
            None => Ok(None),
        }
    }

    /// Slides and merges every tile towards `direction`.
    ///
    /// A sweep that changed anything leaves the board waiting until `settle`.
    /// While waiting, sweeps are dropped.
    #[instrument(level = "trace", skip(self, keeper))]
    pub fn sweep<K: Scorekeeper + ?Sized>(
        &mut self,
        direction: Direction,
        keeper: &mut K,
    ) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();

        if self.waiting {
            debug!("Ignoring {:?} sweep while tiles settle", direction);
            return outcome;
        }

        for pos in self.scan_order(direction) {
            match self.attempt_move(pos, direction, keeper) {
                Ok(Some(Step::Moved(tile_move))) => outcome.moves.push(tile_move),
                Ok(Some(Step::Merged(merge))) => outcome.merges.push(merge),
                Ok(None) => {}
                Err(e) => error!(
                    "Sweep {:?} failed at ({}, {}): {}",
                    direction, pos.x, pos.y, e
                ),
            }
        }

        if outcome.changed() {
            self.waiting = true;
            debug!(
                "Sweep {:?}: {} moves, {} merges, {} points",
                direction,
                outcome.moves.len(),
                outcome.merges.len(),
                outcome.points()
            );
        } else {
            debug!("Sweep {:?} changed nothing", direction);
        }

        outcome
    }

    pub fn unlock_all(&mut self) {
        self.tiles.values_mut().for_each(|tile| tile.locked = false);
    }

    /// Draws a value through the anti-streak layer and places it in a random
    /// empty cell. Callers check `is_full` first.
    pub fn spawn<K: Scorekeeper + ?Sized>(
        &mut self,
        keeper: &mut K,
    ) -> Result<TileView, BoardError> {
        let pos = self.grid.random_empty_cell(&mut self.rng)?;
        let value = self.picker.pick(keeper.next_spawn_value());
        keeper.prepare_next();
        self.place_tile(value, pos)
    }

    /// Finishes a changed sweep: unlock, spawn one tile if there is room,
    /// then check whether the game is over.
    #[instrument(level = "trace", skip(self, keeper))]
    pub fn settle<K: Scorekeeper + ?Sized>(&mut self, keeper: &mut K) -> SettleOutcome {
        self.unlock_all();

        let spawned = if self.grid.is_full() {
            None
        } else {
            match self.spawn(keeper) {
                Ok(view) => Some(view),
                Err(e) => {
                    warn!("Spawn after sweep failed: {}", e);
                    None
                }
            }
        };

        self.waiting = false;

        let game_over = self.is_game_over();
        if game_over {
            info!("No merges left on a full board - game over");
            keeper.report_game_over();
        }

        SettleOutcome { spawned, game_over }
    }

    fn has_mergeable_neighbour(&self, tile: &Tile) -> bool {
        Direction::ALL
            .iter()
            .filter_map(|direction| self.grid.adjacent(tile.pos(), *direction))
            .filter_map(|pos| self.tile_at(pos))
            .any(|neighbour| rules::can_merge(tile, neighbour))
    }

    /// True when live tiles fill every cell and none can merge with a
    /// neighbour. Expiring tiles are out of play and do not count.
    pub fn is_game_over(&self) -> bool {
        self.tiles.len() == self.grid.cell_count()
            && !self
                .tiles
                .values()
                .any(|tile| self.has_mergeable_neighbour(tile))
    }

    /// Turns every live tile of value `target` into a 5 and takes `trigger`
    /// out of play. The trigger keeps its cell until `destroy_expired`.
    #[instrument(level = "trace", skip(self))]
    pub fn convert_seeds(
        &mut self,
        trigger: TileId,
        target: u32,
    ) -> Result<Conversion, BoardError> {
        let trigger_tile = self
            .tiles
            .remove(&trigger)
            .ok_or(BoardError::UnknownTile)?;

        let snapshot: Vec<TileId> = self.tiles.keys().copied().collect();
        let mut converted = Vec::new();
        for id in snapshot {
            if let Some(tile) = self.tiles.get_mut(&id)
                && tile.value() == target
            {
                tile.set_value(rules::PRIME_MERGE, &self.styles);
                converted.push(tile.view());
            }
        }
        converted.sort_by_key(|view| (view.pos.y, view.pos.x));

        info!(
            "Converted {} tiles of value {} to {}",
            converted.len(),
            target,
            rules::PRIME_MERGE
        );

        let view = trigger_tile.view();
        self.expiring.insert(trigger, trigger_tile);
        Ok(Conversion {
            converted,
            trigger: view,
        })
    }

    /// Frees the cell of a tile taken out of play by `convert_seeds`.
    pub fn destroy_expired(&mut self, id: TileId) -> bool {
        match self.expiring.remove(&id) {
            Some(tile) => {
                self.grid.vacate(tile.pos());
                debug!("Destroyed expired tile {}", id);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[derive(Default)]
    struct Keeper {
        value: u32,
        points: u64,
        prepared: usize,
        game_overs: usize,
    }

    impl Keeper {
        fn always(value: u32) -> Self {
            Self {
                value,
                ..Self::default()
            }
        }
    }

    impl Scorekeeper for Keeper {
        fn next_spawn_value(&self) -> u32 {
            self.value
        }

        fn prepare_next(&mut self) {
            self.prepared += 1;
        }

        fn report_merge(&mut self, points: u64) {
            self.points += points;
        }

        fn report_game_over(&mut self) {
            self.game_overs += 1;
        }
    }

    fn board(width: usize, height: usize) -> Board {
        Board::new(
            GameParams { width, height },
            TileStyles::default(),
            StdRng::seed_from_u64(99),
        )
    }

    /// Builds a board from rows of face values, 0 meaning empty.
    fn board_from(rows: &[&[u32]]) -> Board {
        let mut board = board(rows[0].len(), rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, value) in row.iter().enumerate() {
                if *value != 0 {
                    board.place_tile(*value, Pos::new(x, y)).unwrap();
                }
            }
        }
        board
    }

    fn values(board: &Board) -> Vec<Vec<u32>> {
        board
            .rows()
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(0)).collect())
            .collect()
    }

    fn assert_consistent(board: &Board) {
        assert_eq!(board.grid().occupied_count(), board.tile_count());
        for tile in board.tiles() {
            assert_eq!(board.grid().occupant(tile.pos()), Some(tile.id()));
        }
    }

    #[test]
    fn empty_board_sweeps_are_no_ops() {
        let mut board = board(4, 4);
        let mut keeper = Keeper::always(2);
        for direction in Direction::ALL {
            let outcome = board.sweep(direction, &mut keeper);
            assert!(!outcome.changed());
            assert!(!board.is_waiting());
        }
        assert_eq!(keeper.points, 0);
        assert_eq!(keeper.prepared, 0);
        assert_eq!(board.tile_count(), 0);
    }

    #[test]
    fn seed_pairs_merge_left_on_small_board() {
        let mut board = board_from(&[&[2, 3], &[2, 3]]);
        let mut keeper = Keeper::always(2);

        let outcome = board.sweep(Direction::Left, &mut keeper);
        assert!(outcome.changed());
        assert_eq!(outcome.merges.len(), 2);
        assert_eq!(values(&board), vec![vec![5, 0], vec![5, 0]]);
        assert_eq!(keeper.points, 20);
        assert_eq!(board.grid().occupied_count(), 2);
        assert!(board.is_waiting());
        assert!(board.tiles().all(|tile| tile.locked));

        let settled = board.settle(&mut keeper);
        assert!(settled.spawned.is_some());
        assert!(!settled.game_over);
        assert_eq!(board.tile_count(), 3);
        assert!(board.tiles().all(|tile| !tile.locked));
        assert!(!board.is_waiting());
        assert_consistent(&board);
    }

    #[test]
    fn merged_tile_cannot_merge_again_in_the_same_sweep() {
        let mut board = board_from(&[&[5, 5, 10, 0]]);
        let mut keeper = Keeper::always(2);
        board.sweep(Direction::Left, &mut keeper);
        assert_eq!(values(&board), vec![vec![10, 10, 0, 0]]);
        assert_eq!(keeper.points, 20);
    }

    #[test]
    fn four_equal_tiles_make_two_pairs() {
        let mut board = board_from(&[&[5, 5, 5, 5]]);
        let mut keeper = Keeper::always(2);
        let outcome = board.sweep(Direction::Left, &mut keeper);
        assert_eq!(values(&board), vec![vec![10, 10, 0, 0]]);
        assert_eq!(outcome.merges.len(), 2);
        assert_eq!(outcome.moves.len(), 1);
        assert_eq!(keeper.points, 40);
    }

    #[test]
    fn seeds_do_not_merge_with_themselves() {
        let mut board = board_from(&[&[2, 2, 0], &[3, 0, 3]]);
        let mut keeper = Keeper::always(2);
        board.sweep(Direction::Left, &mut keeper);
        assert_eq!(values(&board), vec![vec![2, 2, 0], vec![3, 3, 0]]);
        assert_eq!(keeper.points, 0);
    }

    #[test]
    fn tile_slides_then_merges_at_the_far_edge() {
        let mut board = board_from(&[&[0, 2, 0, 3]]);
        let mut keeper = Keeper::always(2);
        let outcome = board.sweep(Direction::Right, &mut keeper);
        assert_eq!(values(&board), vec![vec![0, 0, 0, 5]]);
        assert_eq!(outcome.merges[0].at, Pos::new(3, 0));
        assert_eq!(keeper.points, 10);
        assert_consistent(&board);
    }

    #[test]
    fn vertical_sweeps_start_at_the_target_edge() {
        let column: &[&[u32]] = &[&[5], &[5], &[5]];

        let mut up = board_from(column);
        up.sweep(Direction::Up, &mut Keeper::always(2));
        assert_eq!(values(&up), vec![vec![10], vec![5], vec![0]]);

        let mut down = board_from(column);
        down.sweep(Direction::Down, &mut Keeper::always(2));
        assert_eq!(values(&down), vec![vec![0], vec![5], vec![10]]);
    }

    #[test]
    fn blocked_tile_stops_before_the_obstacle() {
        let mut board = board_from(&[&[0, 0, 0], &[5, 0, 0], &[0, 0, 0], &[10, 0, 0]]);
        let mut keeper = Keeper::always(2);
        board.sweep(Direction::Down, &mut keeper);
        assert_eq!(
            values(&board),
            vec![vec![0, 0, 0], vec![0, 0, 0], vec![5, 0, 0], vec![10, 0, 0]]
        );
    }

    #[test]
    fn sweeps_are_dropped_while_waiting() {
        let mut board = board_from(&[&[0, 5], &[0, 0]]);
        let mut keeper = Keeper::always(2);
        assert!(board.sweep(Direction::Left, &mut keeper).changed());
        assert!(!board.sweep(Direction::Right, &mut keeper).changed());
        assert_eq!(values(&board), vec![vec![5, 0], vec![0, 0]]);

        board.settle(&mut keeper);
        assert!(!board.is_waiting());
    }

    #[test]
    fn tile_count_reconciles_with_merges_and_spawns() {
        let mut board = board(4, 4);
        let mut keeper = Keeper::always(2);
        let mut rng = StdRng::seed_from_u64(5);
        board.create_seed_tile(2).unwrap();
        board.create_seed_tile(3).unwrap();

        for step in 0..300 {
            let direction = Direction::ALL[rand::Rng::random_range(&mut rng, 0..4)];
            let before = board.tile_count();
            let outcome = board.sweep(direction, &mut keeper);
            assert_eq!(board.tile_count(), before - outcome.merges.len(), "step {step}");
            assert_consistent(&board);

            if outcome.changed() {
                let full = board.grid().is_full();
                let settled = board.settle(&mut keeper);
                assert_eq!(settled.spawned.is_some(), !full);
                assert_eq!(
                    board.tile_count(),
                    before - outcome.merges.len() + usize::from(!full)
                );
                assert!(board.tile_count() <= board.grid().cell_count());
                assert_consistent(&board);
                if settled.game_over {
                    break;
                }
            }
        }
    }

    #[test]
    fn spawns_run_through_the_anti_streak_layer() {
        let mut board = board(4, 4);
        let mut keeper = Keeper::always(3);
        let spawned: Vec<u32> = (0..8)
            .map(|_| board.spawn(&mut keeper).unwrap().value)
            .collect();
        assert_eq!(spawned, vec![3, 3, 3, 2, 3, 3, 3, 2]);
        assert_eq!(keeper.prepared, 8);
    }

    #[test]
    fn full_board_does_not_spawn() {
        let mut board = board_from(&[&[0, 5], &[10, 20]]);
        let mut keeper = Keeper::always(2);
        board.place_tile(40, Pos::new(0, 0)).unwrap();
        let settled = board.settle(&mut keeper);
        assert_eq!(settled.spawned, None);
        assert!(settled.game_over);
        assert_eq!(keeper.game_overs, 1);
        assert_eq!(keeper.prepared, 0);
    }

    #[test]
    fn game_over_needs_a_full_board_without_merges() {
        assert!(board_from(&[&[5, 2], &[2, 5]]).is_game_over());
        assert!(board_from(&[&[5, 10, 5], &[2, 5, 2], &[5, 3, 5]]).is_game_over());
        assert!(!board_from(&[&[5, 2], &[10, 3]]).is_game_over());
        assert!(!board_from(&[&[5, 5], &[2, 10]]).is_game_over());
        assert!(!board_from(&[&[5, 2], &[0, 5]]).is_game_over());
    }

    #[test]
    fn game_over_ignores_stale_locks_after_settle() {
        let mut board = board_from(&[&[5, 5, 10], &[20, 40, 80]]);
        let mut keeper = Keeper::always(2);
        board.sweep(Direction::Left, &mut keeper);
        assert_eq!(values(&board), vec![vec![10, 10, 0], vec![20, 40, 80]]);
        let settled = board.settle(&mut keeper);
        assert!(settled.spawned.is_some());
        assert!(!settled.game_over);
    }

    #[test]
    fn unknown_values_do_not_break_merges() {
        let mut board = Board::new(
            GameParams {
                width: 2,
                height: 1,
            },
            TileStyles::new(HashMap::new()),
            StdRng::seed_from_u64(1),
        );
        board.place_tile(2, Pos::new(0, 0)).unwrap();
        board.place_tile(3, Pos::new(1, 0)).unwrap();
        let mut keeper = Keeper::always(2);
        let outcome = board.sweep(Direction::Left, &mut keeper);
        assert_eq!(outcome.merges.len(), 1);
        let merged = board.tile_at(Pos::new(0, 0)).unwrap();
        assert_eq!(merged.value(), 5);
        assert!(merged.style().is_none());
    }

    #[test]
    fn place_tile_rejects_bad_cells() {
        let mut board = board_from(&[&[5, 0]]);
        assert!(matches!(
            board.place_tile(2, Pos::new(0, 0)),
            Err(BoardError::CellOccupied(_))
        ));
        assert!(matches!(
            board.place_tile(2, Pos::new(2, 0)),
            Err(BoardError::OutOfBounds(_))
        ));
        board.place_tile(2, Pos::new(1, 0)).unwrap();
        assert!(matches!(board.create_seed_tile(3), Err(BoardError::GridFull)));
    }

    #[test]
    fn seed_conversion_keeps_trigger_until_destroyed() {
        let mut board = board_from(&[&[3, 0, 3], &[5, 2, 10]]);
        let trigger = board.tile_at(Pos::new(1, 1)).unwrap().id();

        let conversion = board.convert_seeds(trigger, 3).unwrap();
        assert_eq!(conversion.converted.len(), 2);
        assert!(conversion.converted.iter().all(|view| view.value == 5));
        assert_eq!(conversion.trigger.value, 2);
        assert_eq!(values(&board), vec![vec![5, 0, 5], vec![5, 2, 10]]);

        assert!(board.tile(trigger).is_none());
        assert!(board.tile_at(Pos::new(1, 1)).is_none());
        assert_eq!(board.grid().occupant(Pos::new(1, 1)), Some(trigger));
        assert_eq!(board.grid().occupied_count(), 5);

        // The expiring tile blocks but never moves or merges.
        let mut keeper = Keeper::always(2);
        board.sweep(Direction::Left, &mut keeper);
        assert_eq!(values(&board), vec![vec![10, 0, 0], vec![5, 2, 10]]);
        board.settle(&mut keeper);

        assert!(board.destroy_expired(trigger));
        assert!(!board.destroy_expired(trigger));
        assert!(board.grid().occupant(Pos::new(1, 1)).is_none());
        assert_consistent(&board);
    }

    #[test]
    fn seed_conversion_needs_a_live_trigger() {
        let mut board = board_from(&[&[3, 0]]);
        assert!(matches!(
            board.convert_seeds(uuid::Uuid::new_v4(), 3),
            Err(BoardError::UnknownTile)
        ));
    }

    #[test]
    fn clear_resets_everything() {
        let mut board = board_from(&[&[2, 3], &[0, 5]]);
        board.sweep(Direction::Left, &mut Keeper::always(2));
        board.settle(&mut Keeper::always(3));
        board.spawn(&mut Keeper::always(3)).unwrap();
        board.clear();
        assert_eq!(board.tile_count(), 0);
        assert_eq!(board.grid().occupied_count(), 0);
        assert!(!board.is_waiting());

        let mut keeper = Keeper::always(3);
        let spawned: Vec<u32> = (0..4)
            .map(|_| board.spawn(&mut keeper).unwrap().value)
            .collect();
        assert_eq!(spawned, vec![3, 3, 3, 2]);
    }

    #[test]
    fn expiring_tile_does_not_make_the_board_terminal() {
        let mut board = board_from(&[&[5, 2], &[3, 10]]);
        let trigger = board.tile_at(Pos::new(1, 0)).unwrap().id();
        board.convert_seeds(trigger, 7).unwrap();

        assert!(board.grid().is_full());
        assert_eq!(board.tile_count(), 3);
        assert!(!board.is_game_over());

        board.destroy_expired(trigger);
        assert!(!board.is_game_over());
    }
}
