//! # Entity Management
//!
//! Entities are identifiers issued by the [`World`]:
//! - Ids increase monotonically and are never reused within a world
//! - An [`Entity`] handle is a mutable view bound to one live entity
//!
//! The handle keeps no component set of its own. It reads the world's
//! reverse index, so the two can never disagree.

use std::fmt;

use super::component::{Attached, Component, ComponentType};
use super::world::World;
use crate::error::EcsResult;

/// Unique identifier for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity ID from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a live entity, borrowing its world mutably.
///
/// Every operation forwards to the world, which stays the single authority
/// for storage.
///
/// # Example
///
/// ```rust
/// use carapace_core::{Component, ComponentType, World};
///
/// struct Position { x: f32, y: f32 }
/// impl Component for Position {
///     const TYPE: ComponentType = ComponentType::new("position");
/// }
///
/// let mut world = World::default();
/// world.register_kind::<Position>().unwrap();
///
/// let mut entity = world.create_entity();
/// entity.add_component(Position { x: 1.0, y: 2.0 }).unwrap();
/// assert!(entity.has_component(Position::TYPE));
/// ```
pub struct Entity<'w> {
    id: EntityId,
    world: &'w mut World,
}

impl<'w> Entity<'w> {
    #[inline]
    pub(crate) fn new(id: EntityId, world: &'w mut World) -> Self {
        Self { id, world }
    }

    /// Returns this entity's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the world this entity lives in.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &World {
        self.world
    }

    /// Attaches `component`, replacing any component of the same kind.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponentKind`](crate::EcsError::UnregisteredComponentKind)
    /// if `C` was never registered.
    pub fn add_component<C: Component>(&mut self, component: C) -> EcsResult<&mut Self> {
        self.world.register_component(self.id, component)?;
        Ok(self)
    }

    /// Detaches the component of kind `component_type`. No-op if absent.
    pub fn remove_component(&mut self, component_type: ComponentType) -> &mut Self {
        self.world.unregister_component(self.id, component_type);
        self
    }

    /// Detaches the `C` component and returns its payload.
    pub fn take_component<C: Component>(&mut self) -> Option<C> {
        self.world.take_component::<C>(self.id)
    }

    /// Checks whether a component of kind `component_type` is attached.
    #[must_use]
    pub fn has_component(&self, component_type: ComponentType) -> bool {
        self.world.has_component(self.id, component_type)
    }

    /// Gets the attached `C` component.
    #[must_use]
    pub fn get_component<C: Component>(&self) -> Option<&Attached<C>> {
        self.world.get_component::<C>(self.id)
    }

    /// Gets the attached `C` component mutably.
    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut Attached<C>> {
        self.world.get_component_mut::<C>(self.id)
    }

    /// Returns a snapshot of the attached component kinds, in identifier order.
    #[must_use]
    pub fn component_types(&self) -> Vec<ComponentType> {
        self.world.component_types(self.id)
    }

    /// Detaches every component, then removes the entity from the world.
    pub fn destroy(self) {
        let Self { id, world } = self;
        // Snapshot first: each removal mutates the live set.
        for component_type in world.component_types(id) {
            world.unregister_component(id, component_type);
        }
        world.destroy_entity(id);
    }
}

impl fmt::Debug for Entity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("components", &self.component_types())
            .finish()
    }
}
