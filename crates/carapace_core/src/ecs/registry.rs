//! # Component Registry
//!
//! Binds each component kind to its [`ComponentType`] tag. Registration
//! happens once at startup, before any entity uses the kind. The registry is a
//! plain value owned by the [`World`](super::World); there is no global table.

use std::any::{type_name, TypeId};
use std::collections::{BTreeMap, HashMap};

use super::component::{Component, ComponentType};
use crate::error::{EcsError, EcsResult};

/// Diagnostic description of a registered component kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentKind {
    /// The identifier the kind is registered under.
    pub identifier: ComponentType,
    /// Fully-qualified Rust type name.
    pub type_name: &'static str,
    type_id: TypeId,
}

/// Registry of component kinds.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    by_identifier: BTreeMap<ComponentType, ComponentKind>,
    by_type: HashMap<TypeId, ComponentType>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `C` under `C::TYPE`.
    ///
    /// Registering the same kind twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentTypeConflict`] if the identifier is already
    /// bound to a different kind.
    pub fn register<C: Component>(&mut self) -> EcsResult<()> {
        let type_id = TypeId::of::<C>();

        if let Some(existing) = self.by_identifier.get(&C::TYPE) {
            if existing.type_id == type_id {
                return Ok(());
            }
            return Err(EcsError::ComponentTypeConflict {
                identifier: C::TYPE,
                registered: existing.type_name,
                requested: type_name::<C>(),
            });
        }

        self.by_identifier.insert(
            C::TYPE,
            ComponentKind {
                identifier: C::TYPE,
                type_name: type_name::<C>(),
                type_id,
            },
        );
        self.by_type.insert(type_id, C::TYPE);
        tracing::debug!("Component kind registered: {} ({})", C::TYPE, type_name::<C>());
        Ok(())
    }

    /// Checks whether `C` is registered under its own tag.
    #[inline]
    #[must_use]
    pub fn is_registered<C: Component>(&self) -> bool {
        self.by_type.get(&TypeId::of::<C>()) == Some(&C::TYPE)
    }

    /// Ensures `C` is registered.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponentKind`] otherwise.
    pub fn ensure_registered<C: Component>(&self) -> EcsResult<()> {
        if self.is_registered::<C>() {
            Ok(())
        } else {
            Err(EcsError::UnregisteredComponentKind {
                identifier: C::TYPE,
                type_name: type_name::<C>(),
            })
        }
    }

    /// Looks up the kind bound to `identifier`.
    ///
    /// Intended for diagnostics and tooling, not the per-tick path.
    #[must_use]
    pub fn resolve(&self, identifier: ComponentType) -> Option<ComponentKind> {
        self.by_identifier.get(&identifier).copied()
    }

    /// Returns the number of registered kinds.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    /// Returns true if no kind is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }

    /// Iterates registered kinds in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentKind> {
        self.by_identifier.values()
    }
}
