use primes_common::models::{Pos, TileView};
use tracing::error;
use uuid::Uuid;

use crate::{
    config::{TileStyle, TileStyles},
    error::BoardError,
};

pub type TileId = Uuid;

/// A numbered piece on the board.
///
/// `pos` mirrors the grid's record of which cell holds this tile; only the
/// board's placement routines may change either side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    value: u32,
    pos: Pos,
    /// Set once the tile has absorbed a merge during the current sweep.
    pub locked: bool,
    style: Option<TileStyle>,
}

impl Tile {
    pub(crate) fn new(value: u32, pos: Pos, styles: &TileStyles) -> Self {
        let mut tile = Self {
            id: Uuid::new_v4(),
            value,
            pos,
            locked: false,
            style: None,
        };
        tile.restyle(styles);
        tile
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// `None` when the value had no configured style.
    pub fn style(&self) -> Option<&TileStyle> {
        self.style.as_ref()
    }

    pub(crate) fn set_pos(&mut self, pos: Pos) {
        self.pos = pos;
    }

    /// Changes the face value in place and looks up its style.
    pub fn set_value(&mut self, value: u32, styles: &TileStyles) {
        self.value = value;
        self.restyle(styles);
    }

    fn restyle(&mut self, styles: &TileStyles) {
        match styles.get(self.value) {
            Some(style) => self.style = Some(style.clone()),
            None => {
                error!(
                    "{} (tile {} at ({}, {}))",
                    BoardError::UnknownValue(self.value),
                    self.id,
                    self.pos.x,
                    self.pos.y
                );
                self.style = None;
            }
        }
    }

    pub fn view(&self) -> TileView {
        TileView {
            id: self.id,
            pos: self.pos,
            value: self.value,
            label: self.style.as_ref().map(|style| style.label.clone()),
        }
    }
}
