//! Error types for the simulation.

use crate::Position;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Capacity exhausted: {0}")]
    CapacityExhausted(String),

    #[error("Position ({}, {}) is outside the grid", .0.x, .0.y)]
    OutOfBounds(Position),

    #[error("Position ({}, {}) is already occupied", .0.x, .0.y)]
    Occupied(Position),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
