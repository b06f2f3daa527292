//! # Motion System
//!
//! Integrates [`Motion`] into [`Transform`] once per tick:
//!
//! ```text
//! v += a * dt
//! v *= max(0, 1 - drag * dt)
//! p += v * dt
//! clamp p to bounds, reflecting v by `bounce`
//! ```
//!
//! `dt` is the tick delta converted from milliseconds to seconds.

use carapace_core::{Component, ComponentType, EntityId, System, World};

use crate::components::{Motion, Transform};

/// Priority of [`MotionSystem`], in the physics band.
pub const MOTION_PRIORITY: i32 = 10;

const REQUIRED: [ComponentType; 2] = [Motion::TYPE, Transform::TYPE];

/// Moves every entity that has both [`Motion`] and [`Transform`].
#[derive(Debug, Default)]
pub struct MotionSystem {
    moved_last_tick: usize,
}

impl MotionSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bodies integrated during the most recent tick.
    #[must_use]
    pub fn moved_last_tick(&self) -> usize {
        self.moved_last_tick
    }

    /// Copies a body out of the world, applies `step`, and writes it back.
    ///
    /// Returns false if the entity lost either component in the meantime.
    fn with_body(world: &mut World, id: EntityId, step: impl FnOnce(&mut Motion, &mut Transform)) -> bool {
        let Some(mut motion) = world.get_component::<Motion>(id).map(|m| **m) else {
            return false;
        };
        let Some(mut transform) = world.get_component::<Transform>(id).map(|t| **t) else {
            return false;
        };

        step(&mut motion, &mut transform);

        if let Some(slot) = world.get_component_mut::<Motion>(id) {
            **slot = motion;
        }
        if let Some(slot) = world.get_component_mut::<Transform>(id) {
            **slot = transform;
        }
        true
    }
}

/// Advances one body by `dt` seconds.
pub(crate) fn integrate(motion: &mut Motion, transform: &mut Transform, dt: f32) {
    motion.velocity_x += motion.acceleration_x * dt;
    motion.velocity_y += motion.acceleration_y * dt;

    if motion.drag > 0.0 {
        let keep = (1.0 - motion.drag * dt).max(0.0);
        motion.velocity_x *= keep;
        motion.velocity_y *= keep;
    }

    transform.translate(motion.velocity_x * dt, motion.velocity_y * dt);
    confine(motion, transform);
}

/// Clamps the transform into the motion's bounds, reflecting velocity.
pub(crate) fn confine(motion: &mut Motion, transform: &mut Transform) {
    let Some(bounds) = motion.bounds else {
        return;
    };

    if transform.x < bounds.min_x {
        transform.x = bounds.min_x;
        motion.velocity_x = motion.velocity_x.abs() * motion.bounce;
    } else if transform.x > bounds.max_x {
        transform.x = bounds.max_x;
        motion.velocity_x = -motion.velocity_x.abs() * motion.bounce;
    }

    if transform.y < bounds.min_y {
        transform.y = bounds.min_y;
        motion.velocity_y = motion.velocity_y.abs() * motion.bounce;
    } else if transform.y > bounds.max_y {
        transform.y = bounds.max_y;
        motion.velocity_y = -motion.velocity_y.abs() * motion.bounce;
    }
}

impl System for MotionSystem {
    fn required_components(&self) -> &[ComponentType] {
        &REQUIRED
    }

    fn priority(&self) -> i32 {
        MOTION_PRIORITY
    }

    /// Bodies spawned outside their bounds are snapped inside.
    fn initialize(&mut self, world: &mut World) {
        for id in self.matching_entities(world) {
            Self::with_body(world, id, confine);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn update(&mut self, world: &mut World, _time: f64, delta: f64) {
        let dt = (delta / 1000.0) as f32;
        self.moved_last_tick = 0;

        for id in self.matching_entities(world) {
            if Self::with_body(world, id, |motion, transform| integrate(motion, transform, dt)) {
                self.moved_last_tick += 1;
            }
        }
    }

    /// Leaves every body at rest.
    fn teardown(&mut self, world: &mut World) {
        let ids = self.matching_entities(world);
        tracing::debug!("Motion system teardown: halting {} bodies", ids.len());
        for id in ids {
            if let Some(motion) = world.get_component_mut::<Motion>(id) {
                motion.halt();
            }
        }
        self.moved_last_tick = 0;
    }
}
