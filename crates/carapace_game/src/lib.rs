//! # CARAPACE Game
//!
//! Headless collaborators for [`carapace_core`]:
//!
//! - **Components**: [`Transform`], [`Motion`], [`Health`]
//! - **Systems**: [`MotionSystem`] (priority 10), [`HealthSystem`] (priority 20)
//! - **Driver**: [`GameLoop`] turns frame times into `World::update` calls
//!
//! ## Example
//!
//! ```rust
//! use carapace_game::{
//!     register_game_components, GameLoop, GameLoopConfig, Health, HealthSystem,
//!     Motion, MotionSystem, Transform,
//! };
//!
//! let mut game = GameLoop::new(GameLoopConfig::default())?;
//! let world = game.world_mut();
//! register_game_components(world)?;
//! world.add_system(MotionSystem::new());
//! world.add_system(HealthSystem::default());
//!
//! let id = {
//!     let mut ship = world.create_entity();
//!     ship.add_component(Transform::at(0.0, 0.0))?
//!         .add_component(Motion::with_velocity(100.0, 0.0))?
//!         .add_component(Health::new(3.0))?;
//!     ship.id()
//! };
//!
//! game.advance(500.0);
//! let x = game.world().get_component::<Transform>(id).map(|t| t.x);
//! assert!(x.is_some_and(|x| x > 0.0));
//! game.shutdown();
//! # Ok::<(), carapace_game::GameError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod components;
pub mod error;
pub mod game_loop;
pub mod systems;

pub use components::{register_game_components, Bounds, Health, Motion, Transform};
pub use error::{GameError, GameResult};
pub use game_loop::{FrameStats, FrameStatsAccumulator, GameLoop, GameLoopConfig};
pub use systems::{DeathLog, DeathPolicy, HealthSystem, MotionSystem};
