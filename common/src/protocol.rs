use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Direction, Pos, TileView};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "action")]
pub enum Command {
    #[serde(rename = "move")]
    Move { direction: Direction },
    #[serde(rename = "restart")]
    Restart,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TileMove {
    pub id: Uuid,
    pub from: Pos,
    pub to: Pos,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TileMerge {
    /// The moving tile, destroyed by the merge.
    pub consumed: Uuid,
    /// The stationary tile that now carries `value`.
    pub into: Uuid,
    pub at: Pos,
    pub value: u32,
    pub points: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    #[serde(rename = "init")]
    Init {
        width: usize,
        height: usize,
        tiles: Vec<TileView>,
        score: u64,
        high_score: u64,
    },
    #[serde(rename = "update")]
    Update {
        moves: Vec<TileMove>,
        merges: Vec<TileMerge>,
        score: u64,
    },
    #[serde(rename = "spawn")]
    Spawn { tile: TileView },
    #[serde(rename = "convert")]
    Convert {
        converted: Vec<TileView>,
        trigger: TileView,
    },
    #[serde(rename = "remove")]
    Remove { id: Uuid },
    #[serde(rename = "game_over")]
    GameOver { score: u64, high_score: u64 },
}
