//! # Core Error Types
//!
//! Only registration problems abort a caller's operation. Not-found
//! conditions on removal and absent reads are modeled as no-ops and `None`,
//! never as errors.

use thiserror::Error;

use crate::ecs::{ComponentType, EntityId};

/// Errors that can occur in the ECS runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Attempted to attach a component whose kind was never registered.
    #[error("component kind {type_name} is not registered (expected identifier '{identifier}')")]
    UnregisteredComponentKind {
        /// The identifier the kind declares.
        identifier: ComponentType,
        /// Rust type name of the kind.
        type_name: &'static str,
    },

    /// Attempted to bind an identifier that already belongs to another kind.
    #[error("component identifier '{identifier}' is already bound to {registered}, cannot bind {requested}")]
    ComponentTypeConflict {
        /// The contested identifier.
        identifier: ComponentType,
        /// Kind currently bound to the identifier.
        registered: &'static str,
        /// Kind that tried to claim it.
        requested: &'static str,
    },

    /// Attempted to attach a component to an unknown or destroyed entity.
    #[error("entity {0} is not alive")]
    EntityNotAlive(EntityId),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for the expected schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
