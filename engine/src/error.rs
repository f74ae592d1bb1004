use std::io;

use primes_common::models::Pos;

#[derive(thiserror::Error, Debug)]
pub enum BoardError {
    #[error("no tile style configured for value {0}")]
    UnknownValue(u32),
    #[error("cell ({}, {}) is already occupied", .0.x, .0.y)]
    CellOccupied(Pos),
    #[error("position ({}, {}) is outside the grid", .0.x, .0.y)]
    OutOfBounds(Pos),
    #[error("grid is full")]
    GridFull,
    #[error("no live tile with that id")]
    UnknownTile,
    #[error("game is over")]
    Finished,
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid storage file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid tile style file: {0}")]
    Json(#[from] serde_json::Error),
}
