use primes_common::models::{Direction, Pos};
use rand::Rng;

use crate::{error::BoardError, tile::TileId};

/// Fixed-size array of cells, each holding the id of at most one tile.
///
/// The grid only records occupancy. Tiles live on the board, which keeps
/// both sides of the cell/tile relation in step.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    occupied: usize,
    cells: Vec<Option<TileId>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            occupied: 0,
            cells: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.contains(pos).then(|| pos.x + pos.y * self.width)
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// The cell at `(x, y)`, or `None` outside the grid.
    pub fn cell_at(&self, x: usize, y: usize) -> Option<Pos> {
        let pos = Pos { x, y };
        self.contains(pos).then_some(pos)
    }

    pub fn occupant(&self, pos: Pos) -> Option<TileId> {
        self.index(pos).and_then(|i| self.cells[i])
    }

    pub fn is_empty_at(&self, pos: Pos) -> bool {
        self.contains(pos) && self.occupant(pos).is_none()
    }

    /// The neighbour one step towards `direction`, or `None` at the edge.
    pub fn adjacent(&self, pos: Pos, direction: Direction) -> Option<Pos> {
        let (dx, dy) = direction.offset();
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        self.cell_at(x, y)
    }

    /// Picks uniformly among unoccupied cells.
    pub fn random_empty_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Pos, BoardError> {
        let empty: Vec<Pos> = self
            .positions()
            .filter(|pos| self.occupant(*pos).is_none())
            .collect();

        if empty.is_empty() {
            return Err(BoardError::GridFull);
        }

        Ok(empty[rng.random_range(0..empty.len())])
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn is_full(&self) -> bool {
        self.occupied == self.cells.len()
    }

    /// Row-major walk over every cell.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let width = self.width;
        (0..self.cells.len()).map(move |i| Pos {
            x: i % width,
            y: i / width,
        })
    }

    pub(crate) fn occupy(&mut self, pos: Pos, id: TileId) -> Result<(), BoardError> {
        let index = self.index(pos).ok_or(BoardError::OutOfBounds(pos))?;
        match self.cells[index] {
            Some(_) => Err(BoardError::CellOccupied(pos)),
            None => {
                self.cells[index] = Some(id);
                self.occupied += 1;
                Ok(())
            }
        }
    }

    pub(crate) fn vacate(&mut self, pos: Pos) -> Option<TileId> {
        let index = self.index(pos)?;
        let previous = self.cells[index].take();
        if previous.is_some() {
            self.occupied -= 1;
        }
        previous
    }

    pub(crate) fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.occupied = 0;
    }
}
