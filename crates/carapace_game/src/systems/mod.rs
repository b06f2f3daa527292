//! # Gameplay Systems
//!
//! Priorities follow the core's band convention: motion in the physics band,
//! health right after it so damage dealt by movement is seen the same tick.

mod health;
mod motion;

pub use health::{DeathLog, DeathPolicy, HealthSystem, HEALTH_PRIORITY};
pub use motion::{MotionSystem, MOTION_PRIORITY};
