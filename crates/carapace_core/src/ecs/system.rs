//! # Systems
//!
//! A system is a behavior unit that runs once per tick against every entity
//! carrying its required component kinds.
//!
//! ## Ordering
//!
//! Priority is the only scheduling lever: lower values run first, equal
//! values keep their insertion order. There is no dependency graph.
//! Convention for the bands:
//!
//! ```text
//!   0..=9    input sampling
//!  10..=19   physics / motion
//!  20..=89   secondary simulation (health, animation)
//!  90..      rendering
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! add_system ─► initialize ─► update, update, ... ─► teardown ◄─ remove_system
//!                                                             ◄─ World::destroy
//! ```

use std::fmt;

use super::component::ComponentType;
use super::entity::EntityId;
use super::world::World;

/// A behavior unit executed by a [`World`] once per tick.
///
/// # Example
///
/// ```rust
/// use carapace_core::{ComponentType, System, World};
///
/// const POSITION: ComponentType = ComponentType::new("position");
///
/// struct Counter {
///     seen: usize,
/// }
///
/// impl System for Counter {
///     fn required_components(&self) -> &[ComponentType] {
///         &[POSITION]
///     }
///
///     fn update(&mut self, world: &mut World, _time: f64, _delta: f64) {
///         self.seen += self.matching_entities(world).len();
///     }
/// }
/// ```
pub trait System: 'static {
    /// Component kinds an entity must carry to be processed.
    ///
    /// Must return the same set for the lifetime of the system.
    fn required_components(&self) -> &[ComponentType];

    /// Execution order within a tick. Lower runs first.
    fn priority(&self) -> i32 {
        0
    }

    /// Short name for diagnostics.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Called exactly once when the system is added, before any update.
    fn initialize(&mut self, _world: &mut World) {}

    /// Called once per tick, in priority order.
    ///
    /// `time` is the driver's clock and `delta` the time since the previous
    /// tick, both in milliseconds.
    fn update(&mut self, world: &mut World, time: f64, delta: f64);

    /// Called exactly once when the system is removed or the world destroyed.
    fn teardown(&mut self, _world: &mut World) {}

    /// Snapshot of the entities matching [`System::required_components`].
    fn matching_entities(&self, world: &World) -> Vec<EntityId> {
        world.get_entities_with_components(self.required_components())
    }
}

/// Handle returned by [`World::add_system`], used to remove the system later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(u64);

impl SystemId {
    #[inline]
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

/// A registered system with its cached priority.
pub(crate) struct SystemEntry {
    pub(crate) id: SystemId,
    pub(crate) priority: i32,
    pub(crate) system: Box<dyn System>,
}

/// Priority-ordered list of systems.
#[derive(Default)]
pub(crate) struct SystemSchedule {
    entries: Vec<SystemEntry>,
}

impl SystemSchedule {
    /// Inserts after every entry with priority `<=` the new one (stable).
    pub(crate) fn insert(&mut self, entry: SystemEntry) {
        let at = self.entries.partition_point(|e| e.priority <= entry.priority);
        self.entries.insert(at, entry);
    }

    pub(crate) fn remove(&mut self, id: SystemId) -> Option<SystemEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub(crate) fn contains(&self, id: SystemId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn ids(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.system.name())
    }

    /// Moves all entries out, leaving the schedule empty.
    pub(crate) fn take(&mut self) -> Vec<SystemEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Puts a previously taken list back, merging anything inserted meanwhile.
    pub(crate) fn restore(&mut self, entries: Vec<SystemEntry>) {
        let added = std::mem::replace(&mut self.entries, entries);
        for entry in added {
            self.insert(entry);
        }
    }
}

/// Strips the module path, e.g. `game::systems::MotionSystem` → `MotionSystem`.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
