//! # Entity Component System
//!
//! A small, single-threaded ECS driven one tick at a time.
//!
//! ## Design Philosophy
//!
//! - Component kinds are tagged with immutable string identifiers
//! - Storage is one sparse set per kind, type-erased behind a trait object
//! - Entity ids increase monotonically and are never reused
//! - Systems run in ascending priority, ties in insertion order
//! - Queries return snapshots, so mutation while iterating is safe

mod component;
mod entity;
mod registry;
mod storage;
mod system;
mod world;

pub use component::{Attached, Component, ComponentType};
pub use entity::{Entity, EntityId};
pub use registry::{ComponentKind, ComponentRegistry};
pub use storage::{ComponentStorage, ErasedStorage};
pub use system::{System, SystemId};
pub use world::{EntityRecord, World};
