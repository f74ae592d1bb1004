//! Types shared between the board engine and whatever presents it.

pub mod models;
pub mod protocol;
