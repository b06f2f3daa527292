//! # Health System
//!
//! Counts invulnerability timers down and handles death.
//!
//! An entity "dies" on the first tick its [`Health`] is observed dead. Each
//! death is reported once, in the [`DeathLog`] for that tick. Under
//! [`DeathPolicy::Despawn`] the entity is destroyed right after; under
//! [`DeathPolicy::Keep`] it stays, and is reported again only if it is
//! revived and dies a second time.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use carapace_core::{Component, ComponentType, EntityId, System, World};

use crate::components::Health;

/// Priority of [`HealthSystem`], right after motion.
pub const HEALTH_PRIORITY: i32 = 20;

const REQUIRED: [ComponentType; 1] = [Health::TYPE];

/// What happens to an entity once it dies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeathPolicy {
    /// Leave the entity in the world with `dead` set.
    #[default]
    Keep,
    /// Destroy the entity in the tick it dies.
    Despawn,
}

/// Shared view of the deaths recorded during the most recent tick.
///
/// Clone it before handing the system to the world.
#[derive(Clone, Debug, Default)]
pub struct DeathLog {
    inner: Rc<RefCell<Vec<EntityId>>>,
}

impl DeathLog {
    /// Ids that died during the most recent tick, in ascending order.
    #[must_use]
    pub fn last_tick(&self) -> Vec<EntityId> {
        self.inner.borrow().clone()
    }

    /// Checks whether `id` died during the most recent tick.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.inner.borrow().contains(&id)
    }

    fn replace(&self, deaths: Vec<EntityId>) {
        *self.inner.borrow_mut() = deaths;
    }
}

/// Ticks [`Health`] components and applies the [`DeathPolicy`].
#[derive(Debug, Default)]
pub struct HealthSystem {
    policy: DeathPolicy,
    log: DeathLog,
    /// Dead entities already reported.
    mourned: HashSet<EntityId>,
}

impl HealthSystem {
    /// Creates a system with the given death policy.
    #[must_use]
    pub fn new(policy: DeathPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Returns the death policy.
    #[must_use]
    pub fn policy(&self) -> DeathPolicy {
        self.policy
    }

    /// Returns a handle to the death log.
    #[must_use]
    pub fn death_log(&self) -> DeathLog {
        self.log.clone()
    }
}

impl System for HealthSystem {
    fn required_components(&self) -> &[ComponentType] {
        &REQUIRED
    }

    fn priority(&self) -> i32 {
        HEALTH_PRIORITY
    }

    /// Entities already dead when the system arrives are not reported.
    fn initialize(&mut self, world: &mut World) {
        for id in self.matching_entities(world) {
            if world.get_component::<Health>(id).is_some_and(|h| h.dead) {
                self.mourned.insert(id);
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn update(&mut self, world: &mut World, _time: f64, delta: f64) {
        let delta_ms = delta as f32;
        let mut deaths = Vec::new();

        for id in self.matching_entities(world) {
            let Some(health) = world.get_component_mut::<Health>(id) else {
                continue;
            };
            health.tick_invulnerability(delta_ms);

            if !health.dead {
                self.mourned.remove(&id);
            } else if self.mourned.insert(id) {
                tracing::debug!("Entity {} died (source: {:?})", id, health.last_damage_source);
                deaths.push(id);
            }
        }

        if self.policy == DeathPolicy::Despawn {
            for &id in &deaths {
                world.destroy_entity(id);
                self.mourned.remove(&id);
            }
        }
        self.mourned.retain(|&id| world.contains_entity(id));
        self.log.replace(deaths);
    }

    fn teardown(&mut self, _world: &mut World) {
        self.mourned.clear();
        self.log.replace(Vec::new());
    }
}
