//! # Headless Simulation
//!
//! Spawns a field of drifting bodies inside an arena, lets a hazard chip
//! away at their health, and reports how many are left after ten simulated
//! seconds.
//!
//! Usage: `headless_sim [config.toml]`

use std::time::Instant;

use carapace_core::{Component, ComponentType, System, World};
use carapace_game::{
    register_game_components, Bounds, DeathPolicy, GameLoop, GameLoopConfig, GameResult, Health,
    HealthSystem, Motion, MotionSystem, Transform,
};

const BODY_COUNT: u16 = 2_000;
const ARENA: f32 = 1_000.0;
const FRAMES: u32 = 600;
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Damages every body on the left half of the arena, once per second each.
struct Hazard {
    since_last_ms: f64,
}

impl System for Hazard {
    fn required_components(&self) -> &[ComponentType] {
        const REQUIRED: [ComponentType; 2] = [Health::TYPE, Transform::TYPE];
        &REQUIRED
    }

    fn priority(&self) -> i32 {
        15
    }

    fn update(&mut self, world: &mut World, _time: f64, delta: f64) {
        self.since_last_ms += delta;
        if self.since_last_ms < 1000.0 {
            return;
        }
        self.since_last_ms -= 1000.0;

        for id in self.matching_entities(world) {
            let exposed = world
                .get_component::<Transform>(id)
                .is_some_and(|t| t.x < ARENA / 2.0);
            if !exposed {
                continue;
            }
            if let Some(health) = world.get_component_mut::<Health>(id) {
                if health.damage(1.0, None) {
                    health.set_invulnerable(250.0);
                }
            }
        }
    }
}

fn spawn_bodies(world: &mut World) -> GameResult<()> {
    let bounds = Bounds::new(0.0, 0.0, ARENA, ARENA);
    for i in 0..BODY_COUNT {
        let f = f32::from(i);
        let mut body = world.create_entity();
        body.add_component(Transform::at((f * 37.0) % ARENA, (f * 91.0) % ARENA))?
            .add_component(Motion {
                bounce: 0.8,
                ..Motion::with_velocity((f % 7.0 - 3.0) * 40.0, (f % 5.0 - 2.0) * 40.0)
            }
            .bounded(bounds))?
            .add_component(Health::new(3.0 + f % 4.0))?;
    }
    Ok(())
}

fn main() -> GameResult<()> {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                  CARAPACE HEADLESS SIMULATION                    ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => GameLoopConfig::from_file(path)?,
        None => GameLoopConfig {
            fixed_step_ms: Some(FRAME_MS),
            ..GameLoopConfig::default()
        },
    };

    let mut game = GameLoop::new(config)?;
    let world = game.world_mut();
    register_game_components(world)?;
    spawn_bodies(world)?;

    let health = HealthSystem::new(DeathPolicy::Despawn);
    let deaths = health.death_log();
    world.add_system(MotionSystem::new());
    world.add_system(Hazard { since_last_ms: 0.0 });
    world.add_system(health);

    println!("Systems: {:?}", game.world().system_names());
    println!("Bodies:  {}", game.world().entity_count());
    println!();

    let started = Instant::now();
    let mut total_deaths = 0;
    for _ in 0..FRAMES {
        let stats = game.advance(FRAME_MS);
        total_deaths += deaths.last_tick().len();
        if stats.frame % 120 == 0 {
            println!(
                "frame {:>4}  ticks {}  bodies {:>5}  logic {:>6}us",
                stats.frame, stats.steps, stats.entity_count, stats.logic_us
            );
        }
    }
    let wall = started.elapsed();

    println!();
    println!("Simulated:  {:.1} ms in {:.1} ms wall", game.elapsed_ms(), wall.as_secs_f64() * 1000.0);
    println!("Deaths:     {total_deaths}");
    println!("Survivors:  {}", game.world().entity_count());
    println!();
    game.stats().print_summary();

    game.shutdown();
    Ok(())
}
