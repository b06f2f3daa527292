//! # CARAPACE Game Loop
//!
//! Turns frame times into world ticks:
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. CLAMP DELTA                                                      │
//! │    └─ Long pauses never explode the simulation                      │
//! │                                                                     │
//! │ 2. TICK                                                             │
//! │    ├─ Variable step: one World::update with the frame delta         │
//! │    └─ Fixed step:    World::update per whole step accumulated,      │
//! │                      capped at max_steps_per_frame                  │
//! │                                                                     │
//! │ 3. RECORD                                                           │
//! │    └─ FrameStats into the accumulator                               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Configuration is loaded from TOML, with the world's own settings in a
//! `[world]` table:
//!
//! ```toml
//! fixed_step_ms = 16.0
//! max_steps_per_frame = 5
//!
//! [world]
//! initial_capacity = 4096
//! ```

use std::path::Path;
use std::time::{Duration, Instant};

use carapace_core::{ConfigError, ConfigResult, World, WorldConfig};
use serde::{Deserialize, Serialize};

use crate::error::GameResult;

/// Target frame time for 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Configuration for the game loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameLoopConfig {
    /// Simulation step in milliseconds. `None` ticks once per frame with the
    /// frame's own delta.
    pub fixed_step_ms: Option<f64>,
    /// Most fixed steps run in one frame; leftover time is dropped.
    pub max_steps_per_frame: u32,
    /// Frame deltas above this (milliseconds) are clamped.
    pub max_frame_delta_ms: f64,
    /// Settings for the owned world.
    pub world: WorldConfig,
}

impl Default for GameLoopConfig {
    fn default() -> Self {
        Self {
            fixed_step_ms: None,
            max_steps_per_frame: 5,
            max_frame_delta_ms: 100.0,
            world: WorldConfig::default(),
        }
    }
}

impl GameLoopConfig {
    /// Parses and validates a config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges, including the embedded world config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a non-positive step, a zero step
    /// cap, or a non-positive delta clamp.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(step) = self.fixed_step_ms {
            if !step.is_finite() || step <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "fixed_step_ms must be a positive number, got {step}"
                )));
            }
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_steps_per_frame must be at least 1".to_string(),
            ));
        }
        if !self.max_frame_delta_ms.is_finite() || self.max_frame_delta_ms <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_frame_delta_ms must be a positive number, got {}",
                self.max_frame_delta_ms
            )));
        }
        self.world.validate()
    }
}

/// What one call to [`GameLoop::advance`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// World ticks run this frame.
    pub steps: u32,
    /// Simulated time covered by those ticks, in milliseconds.
    pub simulated_ms: f64,
    /// Accumulated time discarded because the step cap was hit.
    pub dropped_ms: f64,
    /// Wall time spent inside `World::update`, in microseconds.
    pub logic_us: u64,
    /// Live entities after the frame.
    pub entity_count: usize,
}

/// Owns a [`World`] and drives its ticks.
pub struct GameLoop {
    world: World,
    config: GameLoopConfig,
    /// Unsimulated time carried between frames (fixed step only).
    accumulator_ms: f64,
    /// Simulated clock handed to systems as `time`.
    elapsed_ms: f64,
    frame_count: u64,
    stats: FrameStatsAccumulator,
    shut_down: bool,
}

impl GameLoop {
    /// Creates a loop with a fresh world.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is out of range.
    pub fn new(config: GameLoopConfig) -> GameResult<Self> {
        config.validate()?;
        let world = World::with_config(config.world.clone());
        Ok(Self::with_world(world, config))
    }

    /// Wraps an existing world. `config.world` is ignored.
    #[must_use]
    pub fn with_world(world: World, config: GameLoopConfig) -> Self {
        match config.fixed_step_ms {
            Some(step) => tracing::info!("Game loop started (fixed step: {}ms)", step),
            None => tracing::info!("Game loop started (variable step)"),
        }
        Self {
            world,
            config,
            accumulator_ms: 0.0,
            elapsed_ms: 0.0,
            frame_count: 0,
            stats: FrameStatsAccumulator::new(),
            shut_down: false,
        }
    }

    /// Returns the world.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns the world mutably, for setup between frames.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GameLoopConfig {
        &self.config
    }

    /// Returns the number of frames advanced.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the simulated clock, in milliseconds.
    #[inline]
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Returns the accumulated statistics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }

    /// Checks whether [`GameLoop::shutdown`] has run.
    #[inline]
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Advances by one frame of `delta_ms` milliseconds.
    ///
    /// Negative or non-finite deltas count as zero. After shutdown this does
    /// nothing and returns empty stats.
    pub fn advance(&mut self, delta_ms: f64) -> FrameStats {
        if self.shut_down {
            tracing::warn!("GameLoop::advance called after shutdown; ignored");
            return FrameStats::default();
        }

        let delta_ms = if delta_ms.is_finite() {
            delta_ms.clamp(0.0, self.config.max_frame_delta_ms)
        } else {
            0.0
        };

        let started = Instant::now();
        let mut stats = FrameStats {
            frame: self.frame_count,
            ..FrameStats::default()
        };

        match self.config.fixed_step_ms {
            None => {
                self.elapsed_ms += delta_ms;
                self.world.update(self.elapsed_ms, delta_ms);
                stats.steps = 1;
                stats.simulated_ms = delta_ms;
            }
            Some(step) => {
                self.accumulator_ms += delta_ms;
                while self.accumulator_ms >= step && stats.steps < self.config.max_steps_per_frame {
                    self.accumulator_ms -= step;
                    self.elapsed_ms += step;
                    self.world.update(self.elapsed_ms, step);
                    stats.steps += 1;
                    stats.simulated_ms += step;
                }
                if self.accumulator_ms >= step {
                    let kept = self.accumulator_ms % step;
                    stats.dropped_ms = self.accumulator_ms - kept;
                    self.accumulator_ms = kept;
                    tracing::warn!(
                        "Frame {} hit the step cap ({}); dropped {:.3}ms",
                        stats.frame,
                        self.config.max_steps_per_frame,
                        stats.dropped_ms
                    );
                }
            }
        }

        stats.logic_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        stats.entity_count = self.world.entity_count();
        self.stats.record(stats);
        self.frame_count += 1;
        stats
    }

    /// Tears the world down. Further calls are no-ops.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.world.destroy();
        self.shut_down = true;
        tracing::info!(
            "Game loop shut down after {} frames ({:.1}ms simulated)",
            self.frame_count,
            self.elapsed_ms
        );
    }
}

impl std::fmt::Debug for GameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLoop")
            .field("frame_count", &self.frame_count)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("shut_down", &self.shut_down)
            .field("world", &self.world)
            .finish_non_exhaustive()
    }
}

/// Accumulates frame statistics over time.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Number of frames recorded.
    pub frames_recorded: u64,
    /// Sum of world ticks.
    pub steps_sum: u64,
    /// Sum of logic times.
    pub logic_us_sum: u64,
    /// Min logic time.
    pub min_logic_us: u64,
    /// Max logic time.
    pub max_logic_us: u64,
    /// Frames whose logic exceeded the target frame time.
    pub frames_over_budget: u64,
    /// Total simulated time dropped by the step cap.
    pub dropped_ms_sum: f64,
}

impl FrameStatsAccumulator {
    /// Creates a new accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            steps_sum: 0,
            logic_us_sum: 0,
            min_logic_us: u64::MAX,
            max_logic_us: 0,
            frames_over_budget: 0,
            dropped_ms_sum: 0.0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.steps_sum += u64::from(stats.steps);
        self.logic_us_sum = self.logic_us_sum.saturating_add(stats.logic_us);
        self.min_logic_us = self.min_logic_us.min(stats.logic_us);
        self.max_logic_us = self.max_logic_us.max(stats.logic_us);
        self.dropped_ms_sum += stats.dropped_ms;

        if u128::from(stats.logic_us) > TARGET_FRAME_TIME.as_micros() {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average logic time per frame in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_logic_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.logic_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average world ticks per frame.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_steps(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.steps_sum as f64 / self.frames_recorded as f64
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Prints a summary of the statistics.
    #[allow(clippy::cast_precision_loss)]
    pub fn print_summary(&self) {
        let min_ms = if self.frames_recorded == 0 {
            0.0
        } else {
            self.min_logic_us as f64 / 1000.0
        };

        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    FRAME STATISTICS SUMMARY                      ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ TIMING ───────────────────────────────────────────────────────┐");
        println!("│ Frames Recorded:    {}", self.frames_recorded);
        println!("│ Average Logic:      {:.3} ms", self.avg_logic_ms());
        println!("│ Min Logic:          {min_ms:.3} ms");
        println!("│ Max Logic:          {:.3} ms", self.max_logic_us as f64 / 1000.0);
        println!("│ Ticks per Frame:    {:.2}", self.avg_steps());
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ BUDGET ───────────────────────────────────────────────────────┐");
        println!(
            "│ Target:             {:.3} ms (60 FPS)",
            TARGET_FRAME_TIME.as_micros() as f64 / 1000.0
        );
        println!(
            "│ Over Budget:        {} frames ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        );
        println!("│ Dropped Time:       {:.3} ms", self.dropped_ms_sum);
        println!("└──────────────────────────────────────────────────────────────────┘");
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
