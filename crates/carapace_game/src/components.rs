//! # Gameplay Components
//!
//! Headless payloads for the reference systems. Each kind declares its tag
//! and is registered once at startup through [`register_game_components`].

use carapace_core::{Component, ComponentType, EcsResult, EntityId, World};

/// Position, rotation, and scale of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// X coordinate in world units.
    pub x: f32,
    /// Y coordinate in world units.
    pub y: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Horizontal scale.
    pub scale_x: f32,
    /// Vertical scale.
    pub scale_y: f32,
}

impl Component for Transform {
    const TYPE: ComponentType = ComponentType::new("transform");
}

impl Transform {
    /// Creates a transform at `(x, y)` with no rotation and unit scale.
    #[inline]
    #[must_use]
    pub const fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Moves by `(dx, dy)`.
    #[inline]
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(0.0, 0.0)
    }
}

/// Axis-aligned rectangle an entity is kept inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f32,
    /// Top edge.
    pub min_y: f32,
    /// Right edge.
    pub max_x: f32,
    /// Bottom edge.
    pub max_y: f32,
}

impl Bounds {
    /// Creates bounds from two corners.
    #[must_use]
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Checks whether a point lies inside, edges included.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// Kinematic state integrated by the motion system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Horizontal velocity, units per second.
    pub velocity_x: f32,
    /// Vertical velocity, units per second.
    pub velocity_y: f32,
    /// Horizontal acceleration, units per second squared.
    pub acceleration_x: f32,
    /// Vertical acceleration, units per second squared.
    pub acceleration_y: f32,
    /// Fraction of velocity lost per second (0 = none).
    pub drag: f32,
    /// Fraction of velocity kept when bouncing off the bounds.
    pub bounce: f32,
    /// Clamp the transform to these bounds, if set.
    pub bounds: Option<Bounds>,
}

impl Component for Motion {
    const TYPE: ComponentType = ComponentType::new("motion");
}

impl Motion {
    /// Creates motion with the given velocity and nothing else.
    #[must_use]
    pub const fn with_velocity(velocity_x: f32, velocity_y: f32) -> Self {
        Self {
            velocity_x,
            velocity_y,
            acceleration_x: 0.0,
            acceleration_y: 0.0,
            drag: 0.0,
            bounce: 0.0,
            bounds: None,
        }
    }

    /// Sets the bounds the entity is clamped to.
    #[must_use]
    pub const fn bounded(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Stops all movement.
    pub fn halt(&mut self) {
        self.velocity_x = 0.0;
        self.velocity_y = 0.0;
        self.acceleration_x = 0.0;
        self.acceleration_y = 0.0;
    }

    /// Checks whether the entity is at rest.
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.velocity_x == 0.0
            && self.velocity_y == 0.0
            && self.acceleration_x == 0.0
            && self.acceleration_y == 0.0
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::with_velocity(0.0, 0.0)
    }
}

/// Health, damage, and death state.
///
/// Timers are in milliseconds, matching the tick delta.
#[derive(Clone, Debug, PartialEq)]
pub struct Health {
    /// Current hit points, in `0.0..=max`.
    pub current: f32,
    /// Maximum hit points.
    pub max: f32,
    /// Set once `current` reaches zero; cleared by [`Health::revive`].
    pub dead: bool,
    /// Remaining invulnerability, in milliseconds.
    pub invulnerable_ms: f32,
    /// Entity that dealt the most recent damage, if known.
    pub last_damage_source: Option<EntityId>,
}

impl Component for Health {
    const TYPE: ComponentType = ComponentType::new("health");
}

impl Health {
    /// Creates full health.
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self::with_current(max, max)
    }

    /// Creates health with a starting value, clamped to `0.0..=max`.
    ///
    /// A negative or NaN `max` counts as zero, a NaN `current` as zero.
    #[must_use]
    pub fn with_current(max: f32, current: f32) -> Self {
        let max = max.max(0.0);
        let current = clamp_hit_points(current, max);
        Self {
            current,
            max,
            dead: current <= 0.0,
            invulnerable_ms: 0.0,
            last_damage_source: None,
        }
    }

    /// Checks whether damage is currently ignored.
    #[inline]
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }

    /// Applies damage. Returns true if any was taken.
    ///
    /// Ignored while dead, invulnerable, or for non-positive amounts.
    pub fn damage(&mut self, amount: f32, source: Option<EntityId>) -> bool {
        if self.dead || self.is_invulnerable() || amount <= 0.0 {
            return false;
        }

        self.current = (self.current - amount).max(0.0);
        self.last_damage_source = source;
        if self.current <= 0.0 {
            self.dead = true;
        }
        true
    }

    /// Heals up to `max`. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.dead || amount <= 0.0 {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - before
    }

    /// Ignores damage for `duration_ms`.
    pub fn set_invulnerable(&mut self, duration_ms: f32) {
        self.invulnerable_ms = duration_ms.max(0.0);
    }

    /// Counts the invulnerability timer down by `delta_ms`.
    pub fn tick_invulnerability(&mut self, delta_ms: f32) {
        if self.invulnerable_ms > 0.0 {
            self.invulnerable_ms = (self.invulnerable_ms - delta_ms).max(0.0);
        }
    }

    /// Brings the entity back with `health` hit points, or full if `None`.
    pub fn revive(&mut self, health: Option<f32>) {
        self.current = clamp_hit_points(health.unwrap_or(self.max), self.max);
        self.dead = self.current <= 0.0;
    }

    /// Returns current health as a fraction of max, `0.0` if max is zero.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Damage-flash phase: alternates every `interval_ms` while invulnerable.
    ///
    /// Always visible when not invulnerable.
    #[must_use]
    pub fn flash_visible(&self, interval_ms: f32) -> bool {
        if !self.is_invulnerable() || interval_ms <= 0.0 {
            return true;
        }
        // Truncation is intended: whole intervals elapsed.
        #[allow(clippy::cast_possible_truncation)]
        let phase = (self.invulnerable_ms / interval_ms).floor() as i64;
        phase % 2 == 0
    }
}

/// Clamps into `0.0..=max` without panicking; NaN on either side yields the bound.
fn clamp_hit_points(value: f32, max: f32) -> f32 {
    value.max(0.0).min(max.max(0.0))
}

/// Registers every gameplay component kind with `world`.
///
/// # Errors
///
/// Returns an error if another kind already claimed one of the identifiers.
pub fn register_game_components(world: &mut World) -> EcsResult<()> {
    world.register_kind::<Transform>()?;
    world.register_kind::<Motion>()?;
    world.register_kind::<Health>()?;
    Ok(())
}
