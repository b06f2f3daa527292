//! # Component Storage
//!
//! Sparse-set storage for a single component kind:
//! - Components are packed in a dense array for cache-friendly iteration
//! - A sparse index maps entity ids to dense slots, O(1) lookup
//! - Removal swaps the last slot into the hole, O(1) and no shifting
//!
//! The world keeps one storage per kind behind the type-erased
//! [`ErasedStorage`] trait, keyed by [`ComponentType`](super::ComponentType).

use std::any::Any;
use std::collections::HashMap;

use super::component::{Attached, Component};
use super::entity::EntityId;

/// Storage for a single component kind.
///
/// # Type Parameters
///
/// * `C` - The component type to store
pub struct ComponentStorage<C: Component> {
    /// Dense array of attached components.
    dense: Vec<Attached<C>>,
    /// Entity id to dense index.
    sparse: HashMap<EntityId, usize>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates empty storage with room for `capacity` components.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            sparse: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns true if nothing is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Stores `component` for `entity`, binding its owner.
    ///
    /// Returns the replaced component if one was already stored.
    pub(crate) fn insert(&mut self, entity: EntityId, component: C) -> Option<C> {
        let attached = Attached::new(entity, component);
        if let Some(&index) = self.sparse.get(&entity) {
            let previous = std::mem::replace(&mut self.dense[index], attached);
            return Some(previous.into_inner());
        }
        self.sparse.insert(entity, self.dense.len());
        self.dense.push(attached);
        None
    }

    /// Removes and returns the component stored for `entity`.
    pub(crate) fn remove(&mut self, entity: EntityId) -> Option<C> {
        let index = self.sparse.remove(&entity)?;
        let removed = self.dense.swap_remove(index);
        if let Some(moved) = self.dense.get(index) {
            self.sparse.insert(moved.entity(), index);
        }
        Some(removed.into_inner())
    }

    /// Gets the component stored for `entity`.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&Attached<C>> {
        let index = *self.sparse.get(&entity)?;
        self.dense.get(index)
    }

    /// Gets the component stored for `entity` mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut Attached<C>> {
        let index = *self.sparse.get(&entity)?;
        self.dense.get_mut(index)
    }

    /// Checks whether `entity` has a component here.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.sparse.contains_key(&entity)
    }

    /// Iterates over all stored components, in dense (not id) order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Attached<C>> {
        self.dense.iter()
    }

    /// Iterates mutably over all stored components, in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Attached<C>> {
        self.dense.iter_mut()
    }

    /// Removes every component.
    pub(crate) fn clear(&mut self) {
        self.dense.clear();
        self.sparse.clear();
    }
}

impl<C: Component> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind-agnostic view of a [`ComponentStorage`].
///
/// Lets the world detach and query components it only knows by identifier.
pub trait ErasedStorage: Any {
    /// Drops the component stored for `entity`. Returns true if one existed.
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    /// Checks whether `entity` has a component here.
    fn contains_entity(&self, entity: EntityId) -> bool;

    /// Returns the number of stored components.
    fn count(&self) -> usize;

    /// Collects the ids of every entity with a component here.
    fn entity_ids(&self) -> Vec<EntityId>;

    /// Removes every component.
    fn clear_all(&mut self);

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStorage for ComponentStorage<C> {
    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn contains_entity(&self, entity: EntityId) -> bool {
        self.contains(entity)
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn entity_ids(&self) -> Vec<EntityId> {
        self.dense.iter().map(Attached::entity).collect()
    }

    fn clear_all(&mut self) {
        self.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
