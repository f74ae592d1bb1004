//! Board state machine for a sliding-tile merge puzzle in which 2 and 3
//! combine into 5 and equal tiles from 5 upwards double.
//!
//! [`game::Game`] is the entry point: it owns a [`board::Board`], the
//! [`session::Session`] keeping score, and a [`scheduler::Scheduler`] for the
//! settle delay that follows every move.

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod tile;
