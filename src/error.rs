//! Error types for building games and for rejected moves.

use crate::grid::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid game config: {0}")]
    InvalidConfig(String),

    #[error("Could not place country '{country}' after {attempts} attempts")]
    PlacementFailed { country: String, attempts: u32 },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MoveError {
    #[error("The game is over")]
    GameOver,

    #[error("Position ({}, {}) is outside the grid", .0.x, .0.y)]
    OutOfBounds(Position),

    #[error("Cell ({}, {}) does not belong to the moving country", .0.x, .0.y)]
    NotOwned(Position),

    #[error("Cell ({}, {}) has no troops to move", .0.x, .0.y)]
    NoTroops(Position),

    #[error("Moves go one or two cells along a single axis, got dx={dx} dy={dy}")]
    IllegalStep { dx: i32, dy: i32 },
}
