//! # ECS World
//!
//! The central container for all entities, components, and systems.
//!
//! Three indexing structures are kept mutually consistent by every operation:
//!
//! ```text
//! entities:   EntityId      -> EntityRecord               (existence)
//! storages:   ComponentType -> (EntityId -> Attached<C>)  (per-kind sparse sets)
//! index:      EntityId      -> {ComponentType}            (reverse index)
//! ```
//!
//! Queries return snapshots, so systems may create and destroy entities or
//! attach and detach components while iterating a result.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::time::Instant;

use super::component::{Attached, Component, ComponentType};
use super::entity::{Entity, EntityId};
use super::registry::ComponentRegistry;
use super::storage::{ComponentStorage, ErasedStorage};
use super::system::{System, SystemEntry, SystemId, SystemSchedule};
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};

/// Bookkeeping for a live entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityRecord {
    /// Number of completed ticks when the entity was created.
    pub created_at_tick: u64,
}

/// The ECS World - owner of all game state.
///
/// # Example
///
/// ```rust
/// use carapace_core::{Component, ComponentType, World};
///
/// struct Health(f32);
/// impl Component for Health {
///     const TYPE: ComponentType = ComponentType::new("health");
/// }
///
/// let mut world = World::default();
/// world.register_kind::<Health>().unwrap();
///
/// let id = world.create_entity().id();
/// world.register_component(id, Health(10.0)).unwrap();
///
/// assert_eq!(world.get_entities_with_components(&[Health::TYPE]), vec![id]);
/// world.destroy_entity(id);
/// assert!(world.get_component::<Health>(id).is_none());
/// ```
pub struct World {
    config: WorldConfig,
    registry: ComponentRegistry,

    /// Next id to issue. Never decremented.
    next_entity_id: u64,
    entities: BTreeMap<EntityId, EntityRecord>,
    storages: HashMap<ComponentType, Box<dyn ErasedStorage>>,
    index: BTreeMap<EntityId, BTreeSet<ComponentType>>,

    systems: SystemSchedule,
    next_system_id: u64,
    /// Systems moved out of the schedule while a tick runs.
    in_flight: HashSet<SystemId>,
    /// In-flight systems removed mid-tick, torn down once the running one returns.
    pending_removals: Vec<SystemId>,
    running: bool,
    tick: u64,
}

impl World {
    /// Creates a world with the default configuration and an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a world with the given configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self::with_registry(ComponentRegistry::new(), config)
    }

    /// Creates a world around a registry populated at startup.
    #[must_use]
    pub fn with_registry(registry: ComponentRegistry, config: WorldConfig) -> Self {
        Self {
            config,
            registry,
            next_entity_id: 0,
            entities: BTreeMap::new(),
            storages: HashMap::new(),
            index: BTreeMap::new(),
            systems: SystemSchedule::default(),
            next_system_id: 0,
            in_flight: HashSet::new(),
            pending_removals: Vec::new(),
            running: false,
            tick: 0,
        }
    }

    /// Returns the configuration this world was built with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Returns the component registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Registers component kind `C` with this world's registry.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentTypeConflict`] if `C::TYPE` is bound to
    /// another kind.
    pub fn register_kind<C: Component>(&mut self) -> EcsResult<()> {
        self.registry.register::<C>()
    }

    /// Returns the number of completed ticks.
    #[inline]
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an empty entity with the next unused id.
    pub fn create_entity(&mut self) -> Entity<'_> {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;

        self.entities.insert(
            id,
            EntityRecord {
                created_at_tick: self.tick,
            },
        );
        self.index.insert(id, BTreeSet::new());
        tracing::debug!("Entity created: {}", id);

        Entity::new(id, self)
    }

    /// Returns a handle to a live entity.
    pub fn entity(&mut self, id: EntityId) -> Option<Entity<'_>> {
        if self.contains_entity(id) {
            Some(Entity::new(id, self))
        } else {
            None
        }
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Returns the bookkeeping record of a live entity.
    #[must_use]
    pub fn entity_record(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&id)
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the ids of all live entities, ascending.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Destroys an entity and detaches all its components.
    ///
    /// Unknown or already destroyed ids are ignored.
    pub fn destroy_entity(&mut self, id: EntityId) {
        if self.entities.remove(&id).is_none() {
            return;
        }

        if let Some(types) = self.index.remove(&id) {
            for component_type in types {
                if let Some(storage) = self.storages.get_mut(&component_type) {
                    storage.remove_entity(id);
                }
            }
        }
        tracing::debug!("Entity destroyed: {}", id);
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches `component` to `entity`, replacing any component of the same kind.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnregisteredComponentKind`] if `C` was never registered
    /// - [`EcsError::EntityNotAlive`] if `entity` is unknown or destroyed
    pub fn register_component<C: Component>(
        &mut self,
        entity: EntityId,
        component: C,
    ) -> EcsResult<()> {
        self.registry.ensure_registered::<C>()?;
        if !self.contains_entity(entity) {
            return Err(EcsError::EntityNotAlive(entity));
        }

        let capacity = self.config.initial_capacity;
        let storage = self
            .storages
            .entry(C::TYPE)
            .or_insert_with(|| Box::new(ComponentStorage::<C>::with_capacity(capacity)))
            .as_any_mut()
            .downcast_mut::<ComponentStorage<C>>()
            .ok_or(EcsError::UnregisteredComponentKind {
                identifier: C::TYPE,
                type_name: std::any::type_name::<C>(),
            })?;

        let replaced = storage.insert(entity, component).is_some();
        self.index.entry(entity).or_default().insert(C::TYPE);
        tracing::trace!("Component attached: {} -> {} (replaced: {})", C::TYPE, entity, replaced);
        Ok(())
    }

    /// Detaches the component of kind `component_type` from `entity`.
    ///
    /// Returns true if a component was detached; absent pairs are a no-op.
    pub fn unregister_component(&mut self, entity: EntityId, component_type: ComponentType) -> bool {
        let removed = self
            .storages
            .get_mut(&component_type)
            .is_some_and(|storage| storage.remove_entity(entity));

        if let Some(types) = self.index.get_mut(&entity) {
            types.remove(&component_type);
        }
        if removed {
            tracing::trace!("Component detached: {} -> {}", component_type, entity);
        }
        removed
    }

    /// Detaches the `C` component from `entity` and returns its payload.
    pub fn take_component<C: Component>(&mut self, entity: EntityId) -> Option<C> {
        let component = self.storage_mut::<C>()?.remove(entity)?;
        if let Some(types) = self.index.get_mut(&entity) {
            types.remove(&C::TYPE);
        }
        tracing::trace!("Component detached: {} -> {}", C::TYPE, entity);
        Some(component)
    }

    /// Checks whether `entity` carries a component of kind `component_type`.
    #[must_use]
    pub fn has_component(&self, entity: EntityId, component_type: ComponentType) -> bool {
        self.index
            .get(&entity)
            .is_some_and(|types| types.contains(&component_type))
    }

    /// Gets the `C` component of `entity`.
    ///
    /// Returns `None` for absent components and dead entities alike.
    #[must_use]
    pub fn get_component<C: Component>(&self, entity: EntityId) -> Option<&Attached<C>> {
        self.storage::<C>()?.get(entity)
    }

    /// Gets the `C` component of `entity` mutably.
    pub fn get_component_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut Attached<C>> {
        self.storage_mut::<C>()?.get_mut(entity)
    }

    /// Returns the component kinds attached to `entity`, in identifier order.
    ///
    /// Empty for dead entities.
    #[must_use]
    pub fn component_types(&self, entity: EntityId) -> Vec<ComponentType> {
        self.index
            .get(&entity)
            .map(|types| types.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the storage of kind `C`, if any component of it was ever attached.
    #[must_use]
    pub fn storage<C: Component>(&self) -> Option<&ComponentStorage<C>> {
        self.storages
            .get(&C::TYPE)?
            .as_any()
            .downcast_ref::<ComponentStorage<C>>()
    }

    /// Kept crate-private: writes through the store would bypass the index.
    pub(crate) fn storage_mut<C: Component>(&mut self) -> Option<&mut ComponentStorage<C>> {
        self.storages
            .get_mut(&C::TYPE)?
            .as_any_mut()
            .downcast_mut::<ComponentStorage<C>>()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns every live entity carrying all of `required`, ascending by id.
    ///
    /// The result is a snapshot. An empty `required` matches every entity.
    ///
    /// Intersects the per-kind stores starting from the smallest one, so the
    /// cost is bounded by the rarest required kind.
    #[must_use]
    pub fn get_entities_with_components(&self, required: &[ComponentType]) -> Vec<EntityId> {
        if required.is_empty() {
            return self.entity_ids();
        }

        let mut stores = Vec::with_capacity(required.len());
        for component_type in required {
            match self.storages.get(component_type) {
                Some(storage) => stores.push(storage.as_ref()),
                None => return Vec::new(),
            }
        }
        stores.sort_by_key(|storage| storage.count());

        let Some((smallest, rest)) = stores.split_first() else {
            return Vec::new();
        };
        let mut result: Vec<EntityId> = smallest
            .entity_ids()
            .into_iter()
            .filter(|&id| rest.iter().all(|storage| storage.contains_entity(id)))
            .collect();
        result.sort_unstable();
        result
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Adds a system and initializes it.
    ///
    /// The system is ordered by [`System::priority`]; ties keep insertion order.
    /// Added during a tick, it runs from the next tick on.
    pub fn add_system<S: System>(&mut self, system: S) -> SystemId {
        self.add_boxed_system(Box::new(system))
    }

    /// Adds an already boxed system and initializes it.
    pub fn add_boxed_system(&mut self, mut system: Box<dyn System>) -> SystemId {
        let id = SystemId::new(self.next_system_id);
        self.next_system_id += 1;

        system.initialize(self);
        let priority = system.priority();
        tracing::debug!("System added: {} ({}, priority {})", system.name(), id, priority);
        self.systems.insert(SystemEntry {
            id,
            priority,
            system,
        });
        id
    }

    /// Tears down and removes a system. Unknown ids are ignored.
    ///
    /// Returns true if the system was registered. A system removed while a
    /// tick runs is torn down as soon as the currently running system returns
    /// and is not updated again.
    pub fn remove_system(&mut self, id: SystemId) -> bool {
        if let Some(mut entry) = self.systems.remove(id) {
            entry.system.teardown(self);
            tracing::debug!("System removed: {} ({})", entry.system.name(), id);
            return true;
        }
        if self.in_flight.contains(&id) {
            if !self.pending_removals.contains(&id) {
                self.pending_removals.push(id);
            }
            return true;
        }
        false
    }

    /// Checks whether a system is registered.
    #[must_use]
    pub fn has_system(&self, id: SystemId) -> bool {
        (self.systems.contains(id) || self.in_flight.contains(&id))
            && !self.pending_removals.contains(&id)
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len() + self.in_flight.len() - self.pending_removals.len()
    }

    /// Returns system names in execution order.
    ///
    /// Systems in flight during a tick are not listed.
    #[must_use]
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.names().collect()
    }

    /// Runs every system once, in priority order.
    ///
    /// `time` is the driver's clock and `delta` the time since the previous
    /// tick, both in milliseconds. Re-entrant calls from inside a system are
    /// ignored.
    pub fn update(&mut self, time: f64, delta: f64) {
        if self.running {
            tracing::warn!("World::update called from inside a system; ignored");
            return;
        }
        self.running = true;
        let started = Instant::now();

        let mut entries = self.systems.take();
        self.in_flight = entries.iter().map(|entry| entry.id).collect();

        let mut index = 0;
        while let Some(entry) = entries.get_mut(index) {
            entry.system.update(self, time, delta);
            index += 1;
            self.flush_pending_removals(&mut entries, &mut index);
        }

        self.in_flight.clear();
        self.systems.restore(entries);
        self.running = false;
        self.tick += 1;

        if let Some(budget_ms) = self.config.slow_tick_warn_ms {
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            if elapsed_ms > budget_ms {
                tracing::warn!(
                    "Tick {} exceeded budget: {:.3}ms (budget: {:.3}ms)",
                    self.tick,
                    elapsed_ms,
                    budget_ms
                );
            }
        }
    }

    /// Tears down in-flight systems removed during the current tick.
    fn flush_pending_removals(&mut self, entries: &mut Vec<SystemEntry>, index: &mut usize) {
        loop {
            let pending = std::mem::take(&mut self.pending_removals);
            if pending.is_empty() {
                return;
            }
            for id in pending {
                let Some(position) = entries.iter().position(|entry| entry.id == id) else {
                    continue;
                };
                let mut entry = entries.remove(position);
                if position < *index {
                    *index -= 1;
                }
                self.in_flight.remove(&id);
                entry.system.teardown(self);
                tracing::debug!("System removed: {} ({})", entry.system.name(), id);
            }
        }
    }

    /// Tears down every system, destroys every entity, and clears all storage.
    ///
    /// Entity ids keep increasing if the world is used afterwards. Called from
    /// inside a system, the systems in flight are torn down as soon as the
    /// running one returns.
    pub fn destroy(&mut self) {
        tracing::debug!(
            "World destroy: {} systems, {} entities",
            self.system_count(),
            self.entity_count()
        );

        for id in self.in_flight.iter().copied().collect::<Vec<_>>() {
            if !self.pending_removals.contains(&id) {
                self.pending_removals.push(id);
            }
        }

        // Teardown may register further systems; drain until stable.
        loop {
            let entries = self.systems.take();
            if entries.is_empty() {
                break;
            }
            for mut entry in entries {
                entry.system.teardown(self);
                tracing::debug!("System removed: {} ({})", entry.system.name(), entry.id);
            }
        }

        for id in self.entity_ids() {
            self.destroy_entity(id);
        }

        self.entities.clear();
        self.index.clear();
        for storage in self.storages.values_mut() {
            storage.clear_all();
        }
        self.storages.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for World {
    fn drop(&mut self) {
        if !self.systems.is_empty() || !self.entities.is_empty() {
            self.destroy();
        }
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("component_kinds", &self.storages.len())
            .field("systems", &self.system_names())
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    struct Position(f32, f32);
    impl Component for Position {
        const TYPE: ComponentType = ComponentType::new("position");
    }

    #[derive(Debug, PartialEq)]
    struct Health(i32);
    impl Component for Health {
        const TYPE: ComponentType = ComponentType::new("health");
    }

    fn world() -> World {
        let mut world = World::default();
        world.register_kind::<Position>().unwrap();
        world.register_kind::<Health>().unwrap();
        world
    }

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        label: &'static str,
        priority: i32,
        log: Log,
    }

    impl System for Recorder {
        fn required_components(&self) -> &[ComponentType] {
            &[]
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn initialize(&mut self, _world: &mut World) {
            self.log.borrow_mut().push(format!("init:{}", self.label));
        }

        fn update(&mut self, _world: &mut World, _time: f64, _delta: f64) {
            self.log.borrow_mut().push(format!("update:{}", self.label));
        }

        fn teardown(&mut self, _world: &mut World) {
            self.log.borrow_mut().push(format!("teardown:{}", self.label));
        }
    }

    fn recorder(label: &'static str, priority: i32, log: &Log) -> Recorder {
        Recorder {
            label,
            priority,
            log: Rc::clone(log),
        }
    }

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.system_count(), 0);
        assert_eq!(world.tick(), 0);
    }

    #[test]
    fn test_ids_monotonic_and_not_reused() {
        let mut world = world();
        let a = world.create_entity().id();
        let b = world.create_entity().id();
        world.destroy_entity(b);
        let c = world.create_entity().id();
        assert!(a < b && b < c);
        assert!(!world.contains_entity(b));
    }

    #[test]
    fn test_destroy_entity_cascades() {
        let mut world = world();
        let id = world.create_entity().id();
        world.register_component(id, Position(0.0, 0.0)).unwrap();
        world.register_component(id, Health(5)).unwrap();

        world.destroy_entity(id);
        assert!(world.storage::<Position>().unwrap().is_empty());
        assert!(world.storage::<Health>().unwrap().is_empty());
        assert!(world.component_types(id).is_empty());

        // Idempotent.
        world.destroy_entity(id);
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_attach_to_dead_entity_rejected() {
        let mut world = world();
        let id = world.create_entity().id();
        world.destroy_entity(id);
        assert_eq!(
            world.register_component(id, Health(1)),
            Err(EcsError::EntityNotAlive(id))
        );
        assert!(world.storage::<Health>().is_none());
    }

    #[test]
    fn test_conflicting_kind_cannot_claim_live_store() {
        struct Imposter;
        impl Component for Imposter {
            const TYPE: ComponentType = ComponentType::new("health");
        }

        let mut world = world();
        let id = world.create_entity().id();
        world.register_component(id, Health(5)).unwrap();

        assert!(matches!(
            world.register_kind::<Imposter>(),
            Err(EcsError::ComponentTypeConflict { identifier, .. }) if identifier == Health::TYPE
        ));
        assert!(matches!(
            world.register_component(id, Imposter),
            Err(EcsError::UnregisteredComponentKind { .. })
        ));

        // The original kind keeps its identifier and its store.
        assert!(world.registry().is_registered::<Health>());
        world.register_component(id, Health(6)).unwrap();
        assert_eq!(**world.get_component::<Health>(id).unwrap(), Health(6));
        assert_eq!(world.get_entities_with_components(&[Health::TYPE]), vec![id]);
    }

    #[test]
    fn test_last_write_wins() {
        let mut world = world();
        let id = world.create_entity().id();
        world.register_component(id, Health(1)).unwrap();
        world.register_component(id, Health(2)).unwrap();
        assert_eq!(**world.get_component::<Health>(id).unwrap(), Health(2));
        assert_eq!(world.storage::<Health>().unwrap().len(), 1);
    }

    #[test]
    fn test_unregister_absent_is_noop() {
        let mut world = world();
        let id = world.create_entity().id();
        assert!(!world.unregister_component(id, Health::TYPE));
        assert!(!world.unregister_component(EntityId::new(999), Health::TYPE));
    }

    #[test]
    fn test_query_scenario() {
        let mut world = world();
        let e1 = world.create_entity().id();
        world.register_component(e1, Position(0.0, 0.0)).unwrap();
        world.register_component(e1, Health(10)).unwrap();
        let e2 = world.create_entity().id();
        world.register_component(e2, Position(1.0, 1.0)).unwrap();

        let required = [Position::TYPE, Health::TYPE];
        assert_eq!(world.get_entities_with_components(&required), vec![e1]);
        assert_eq!(world.get_entities_with_components(&[Position::TYPE]), vec![e1, e2]);
        assert_eq!(world.get_entities_with_components(&[]), vec![e1, e2]);

        world.destroy_entity(e1);
        assert!(world.get_entities_with_components(&required).is_empty());
        assert!(world.get_component::<Health>(e1).is_none());
    }

    #[test]
    fn test_query_unknown_kind_is_empty() {
        let mut world = world();
        world.create_entity();
        assert!(world
            .get_entities_with_components(&[ComponentType::new("nothing")])
            .is_empty());
    }

    #[test]
    fn test_system_order_and_ties() {
        let log = Log::default();
        let mut world = world();
        world.add_system(recorder("fifty", 50, &log));
        world.add_system(recorder("zero", 0, &log));
        world.add_system(recorder("hundred", 100, &log));
        world.add_system(recorder("zero-b", 0, &log));
        log.borrow_mut().clear();

        world.update(0.0, 16.0);
        assert_eq!(
            *log.borrow(),
            vec!["update:zero", "update:zero-b", "update:fifty", "update:hundred"]
        );
        assert_eq!(world.tick(), 1);
    }

    #[test]
    fn test_system_lifecycle_pairing() {
        let log = Log::default();
        let mut world = world();
        let id = world.add_system(recorder("a", 0, &log));
        world.update(0.0, 1.0);
        assert!(world.remove_system(id));
        assert!(!world.remove_system(id));
        world.update(1.0, 1.0);

        assert_eq!(*log.borrow(), vec!["init:a", "update:a", "teardown:a"]);
    }

    #[test]
    fn test_destroy_tears_down_systems_then_entities() {
        let log = Log::default();
        let mut world = world();
        world.add_system(recorder("a", 1, &log));
        world.add_system(recorder("b", 2, &log));
        let id = world.create_entity().id();
        world.register_component(id, Health(3)).unwrap();

        world.destroy();
        assert_eq!(world.system_count(), 0);
        assert_eq!(world.entity_count(), 0);
        assert!(world.get_component::<Health>(id).is_none());

        world.update(0.0, 1.0);
        assert_eq!(*log.borrow(), vec!["init:a", "init:b", "teardown:a", "teardown:b"]);
    }

    #[test]
    fn test_drop_tears_down() {
        let log = Log::default();
        {
            let mut world = world();
            world.add_system(recorder("a", 0, &log));
        }
        assert_eq!(*log.borrow(), vec!["init:a", "teardown:a"]);
    }

    /// Removes a target system (possibly itself) during its update.
    struct Remover {
        target: Option<SystemId>,
        log: Log,
    }

    impl System for Remover {
        fn required_components(&self) -> &[ComponentType] {
            &[]
        }

        fn update(&mut self, world: &mut World, _time: f64, _delta: f64) {
            self.log.borrow_mut().push("update:remover".into());
            if let Some(target) = self.target.take() {
                world.remove_system(target);
            }
        }

        fn teardown(&mut self, _world: &mut World) {
            self.log.borrow_mut().push("teardown:remover".into());
        }
    }

    #[test]
    fn test_remove_later_system_mid_tick() {
        let log = Log::default();
        let mut world = world();
        let victim = world.add_system(recorder("victim", 10, &log));
        world.add_system(Remover {
            target: Some(victim),
            log: Rc::clone(&log),
        });
        log.borrow_mut().clear();

        world.update(0.0, 1.0);
        assert_eq!(*log.borrow(), vec!["update:remover", "teardown:victim"]);
        assert!(!world.has_system(victim));
        assert_eq!(world.system_count(), 1);

        world.update(1.0, 1.0);
        assert_eq!(
            *log.borrow(),
            vec!["update:remover", "teardown:victim", "update:remover"]
        );
    }

    #[test]
    fn test_system_removes_itself() {
        struct SelfRemover {
            id: Option<SystemId>,
            log: Log,
        }

        impl System for SelfRemover {
            fn required_components(&self) -> &[ComponentType] {
                &[]
            }

            fn update(&mut self, world: &mut World, _time: f64, _delta: f64) {
                self.log.borrow_mut().push("update:self".into());
                if let Some(id) = self.id {
                    world.remove_system(id);
                }
            }

            fn teardown(&mut self, _world: &mut World) {
                self.log.borrow_mut().push("teardown:self".into());
            }
        }

        let log = Log::default();
        let mut world = world();
        world.add_system(recorder("after", 5, &log));
        // Ids are issued sequentially, so the next one belongs to SelfRemover.
        let id = world.add_system(SelfRemover {
            id: Some(SystemId::new(1)),
            log: Rc::clone(&log),
        });
        assert_eq!(id, SystemId::new(1));
        log.borrow_mut().clear();

        world.update(0.0, 1.0);
        world.update(1.0, 1.0);
        assert_eq!(
            *log.borrow(),
            vec!["update:self", "teardown:self", "update:after", "update:after"]
        );
    }

    #[test]
    fn test_system_added_mid_tick_runs_next_tick() {
        struct Spawner {
            log: Log,
            spawned: bool,
        }

        impl System for Spawner {
            fn required_components(&self) -> &[ComponentType] {
                &[]
            }

            fn update(&mut self, world: &mut World, _time: f64, _delta: f64) {
                if !self.spawned {
                    self.spawned = true;
                    world.add_system(recorder("late", -5, &self.log));
                }
            }
        }

        let log = Log::default();
        let mut world = world();
        world.add_system(Spawner {
            log: Rc::clone(&log),
            spawned: false,
        });

        world.update(0.0, 1.0);
        assert_eq!(*log.borrow(), vec!["init:late"]);
        assert_eq!(world.system_count(), 2);

        world.update(1.0, 1.0);
        assert_eq!(*log.borrow(), vec!["init:late", "update:late"]);
        assert_eq!(world.system_names(), vec!["Recorder", "Spawner"]);
    }

    #[test]
    fn test_entity_created_mid_query_not_in_snapshot() {
        let mut world = world();
        let id = world.create_entity().id();
        world.register_component(id, Health(1)).unwrap();

        let snapshot = world.get_entities_with_components(&[Health::TYPE]);
        for entity in snapshot {
            world.destroy_entity(entity);
            let spawned = world.create_entity().id();
            world.register_component(spawned, Health(2)).unwrap();
            assert!(world.get_component::<Health>(entity).is_none());
        }
        assert_eq!(world.get_entities_with_components(&[Health::TYPE]).len(), 1);
    }
}
