//! # Game Error Types

use carapace_core::{ConfigError, EcsError};
use thiserror::Error;

/// Errors surfaced by the game layer.
#[derive(Error, Debug)]
pub enum GameError {
    /// The ECS runtime rejected an operation.
    #[error("ecs error: {0}")]
    Ecs(#[from] EcsError),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
