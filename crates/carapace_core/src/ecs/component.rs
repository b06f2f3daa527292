//! # Component System
//!
//! Components are pure data containers with no behavior.
//! Each kind carries an immutable string tag that storage and queries are
//! keyed by, instead of the Rust type itself.

use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

use super::entity::EntityId;

/// Stable identifier for a component kind.
///
/// Identifiers are compared by their string value, so two kinds declaring the
/// same tag collide. The [`ComponentRegistry`](super::ComponentRegistry)
/// rejects such collisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentType(&'static str);

impl ComponentType {
    /// Creates a component type identifier.
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the identifier as a string.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Marker trait for ECS components.
///
/// Components must be:
/// - `'static`: Stored type-erased, keyed by [`Component::TYPE`]
/// - Data only: behavior lives in [`System`](super::System)s
///
/// # Example
///
/// ```rust
/// use carapace_core::{Component, ComponentType};
///
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     const TYPE: ComponentType = ComponentType::new("health");
/// }
/// ```
pub trait Component: Any {
    /// Unique identifier for this component kind.
    const TYPE: ComponentType;

    /// Returns the identifier of this instance's kind.
    #[inline]
    fn kind(&self) -> ComponentType {
        Self::TYPE
    }
}

/// A component instance attached to an entity.
///
/// The owning entity is written by the world at attach time and cannot be
/// changed by callers. Once the component is detached the wrapper is gone, so
/// a stale owner can never be read.
///
/// Dereferences to the wrapped component.
#[derive(Debug)]
pub struct Attached<C> {
    entity: EntityId,
    component: C,
}

impl<C: Component> Attached<C> {
    #[inline]
    pub(crate) const fn new(entity: EntityId, component: C) -> Self {
        Self { entity, component }
    }

    /// Returns the entity that owns this component.
    #[inline]
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Unwraps the component payload.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> C {
        self.component
    }
}

impl<C> Deref for Attached<C> {
    type Target = C;

    #[inline]
    fn deref(&self) -> &C {
        &self.component
    }
}

impl<C> DerefMut for Attached<C> {
    #[inline]
    fn deref_mut(&mut self) -> &mut C {
        &mut self.component
    }
}
