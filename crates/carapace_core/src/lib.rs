//! # CARAPACE Core Engine
//!
//! Entity/component/system runtime for a tick-driven game:
//! - Entities are opaque, never-reused ids
//! - Components are data-only blocks tagged with a stable identifier
//! - Systems run once per tick in priority order
//!
//! ## Architecture Rules
//!
//! 1. **The world is the single authority** - entity handles only forward to it
//! 2. **Absence is not an error** - stale lookups return `None`, removals of
//!    absent things are no-ops
//! 3. **Pairing is enforced** - every attach has a detach, every
//!    `initialize` a `teardown`
//!
//! ## Example
//!
//! ```rust
//! use carapace_core::{Component, ComponentType, System, World};
//!
//! struct Health(f32);
//! impl Component for Health {
//!     const TYPE: ComponentType = ComponentType::new("health");
//! }
//!
//! struct Regen;
//! impl System for Regen {
//!     fn required_components(&self) -> &[ComponentType] {
//!         &[Health::TYPE]
//!     }
//!
//!     fn update(&mut self, world: &mut World, _time: f64, delta: f64) {
//!         for id in self.matching_entities(world) {
//!             if let Some(health) = world.get_component_mut::<Health>(id) {
//!                 health.0 += delta as f32 * 0.001;
//!             }
//!         }
//!     }
//! }
//!
//! let mut world = World::default();
//! world.register_kind::<Health>()?;
//! world.create_entity().add_component(Health(1.0))?;
//! world.add_system(Regen);
//! world.update(0.0, 1000.0);
//! # Ok::<(), carapace_core::EcsError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::WorldConfig;
pub use ecs::{
    Attached, Component, ComponentKind, ComponentRegistry, ComponentStorage, ComponentType,
    Entity, EntityId, EntityRecord, ErasedStorage, System, SystemId, World,
};
pub use error::{ConfigError, ConfigResult, EcsError, EcsResult};
