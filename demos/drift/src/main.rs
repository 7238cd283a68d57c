//! Drift — a headless exercise of the scenic runtime.
//!
//! A spawner interface seeds a field with drifting debris; systems integrate
//! motion, sweep anything that leaves the field into a persistent tally, and
//! hand off to a debrief scene once enough debris has been swept. No
//! rendering, no input: every effect is observable through the tracing output
//! and the persistent singleton left behind.

use anyhow::Result;
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scenic_app::{Context, FnSystem, FrameConfig, Game, GameError, Interface, Scene, Stage, System};
use scenic_component::Component;

const FIELD_EXTENT: f32 = 200.0;
const SWEEP_GOAL: u32 = 40;

// -- Components --

#[derive(Debug, Default, Clone, Copy)]
struct Transform {
    position: Vec2,
    velocity: Vec2,
}
impl Component for Transform {}

#[derive(Debug, Default, Clone, Copy)]
struct Debris {
    size: u32,
}
impl Component for Debris {}

// -- Singletons --

/// Persistent across scene switches; the debrief scene reads it.
#[derive(Debug, Default)]
struct SweepTally {
    spawned: u32,
    swept: u32,
}

/// Scene-scoped deterministic velocity source (xorshift).
#[derive(Debug)]
struct FieldRng {
    state: u64,
}

impl Default for FieldRng {
    fn default() -> Self {
        Self { state: 0x9E37_79B9 }
    }
}

impl FieldRng {
    /// Uniform-ish value in [-1, 1].
    fn next_signed(&mut self) -> f32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        ((self.state >> 40) as f32 / (1u32 << 24) as f32) * 2.0 - 1.0
    }
}

// -- Interfaces --

/// Spawn helper shared by every system that creates debris.
#[derive(Debug, Default)]
struct DebrisSpawner;
impl Interface for DebrisSpawner {}

impl DebrisSpawner {
    fn spawn(
        &mut self,
        ctx: &mut Context<'_>,
        position: Vec2,
        velocity: Vec2,
        size: u32,
    ) -> Result<(), GameError> {
        let debris = ctx.create_object("debris")?;
        let transform = ctx.component_mut::<Transform>(debris);
        transform.position = position;
        transform.velocity = velocity;
        ctx.component_mut::<Debris>(debris).size = size;
        ctx.add_tag(debris, "adrift");
        ctx.persistent_mut::<SweepTally>().spawned += 1;
        Ok(())
    }
}

// -- Systems --

/// Seeds a new piece of debris on a fixed cadence.
struct SpawnSystem {
    cooldown: u32,
}

impl System for SpawnSystem {
    fn update(&mut self, ctx: &mut Context<'_>) -> Result<(), GameError> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return Ok(());
        }
        self.cooldown = 6;
        let (vx, vy, roll) = {
            let rng = ctx.singleton_mut::<FieldRng>();
            (rng.next_signed(), rng.next_signed(), rng.next_signed())
        };
        let velocity = Vec2::new(vx, vy) * 90.0;
        let size = if roll > 0.3 { 2 } else { 1 };
        ctx.with_interface::<DebrisSpawner, _>(|spawner, ctx| {
            spawner.spawn(ctx, Vec2::ZERO, velocity, size)
        })?;
        Ok(())
    }
}

/// Integrates positions by the fixed timestep.
struct DriftSystem;

impl System for DriftSystem {
    fn update(&mut self, ctx: &mut Context<'_>) -> Result<(), GameError> {
        let dt = ctx.dt();
        for object in ctx.objects_with::<(Transform,)>() {
            let transform = ctx.component_mut::<Transform>(object);
            transform.position += transform.velocity * dt;
        }
        Ok(())
    }
}

/// Destroys debris that left the field and tallies the sweep.
///
/// Larger debris counts for more, so the sweep goal is reachable even when
/// the spawner has been slow.
struct SweepSystem;

impl System for SweepSystem {
    fn update(&mut self, ctx: &mut Context<'_>) -> Result<(), GameError> {
        let mut swept = 0;
        for object in ctx.objects_with::<(Transform, Debris)>() {
            let position = ctx.component::<Transform>(object).position;
            if position.x.abs() > FIELD_EXTENT || position.y.abs() > FIELD_EXTENT {
                swept += ctx.component::<Debris>(object).size;
                ctx.destroy_object(object);
            }
        }
        if swept > 0 {
            ctx.persistent_mut::<SweepTally>().swept += swept;
        }
        Ok(())
    }
}

/// Hands off to the debrief scene once the sweep goal is met.
struct PhaseSystem;

impl System for PhaseSystem {
    fn update(&mut self, ctx: &mut Context<'_>) -> Result<(), GameError> {
        let swept = ctx.persistent::<SweepTally>().swept;
        if swept >= SWEEP_GOAL {
            info!(swept, "sweep goal met");
            ctx.switch_scene("debrief");
        } else if ctx.frame() % 120 == 0 {
            let adrift = ctx.objects_with_tag("adrift").len();
            info!(frame = ctx.frame(), adrift, swept, "field status");
        }
        Ok(())
    }
}

// -- Scenes --

struct FieldScene;

impl Scene for FieldScene {
    fn init(&mut self, stage: &mut Stage) -> Result<(), GameError> {
        stage.register_components::<(Transform, Debris)>();
        stage.define_object::<(Transform, Debris)>("debris");
        stage.create_singleton::<FieldRng>();
        stage.register_interface(DebrisSpawner);

        stage.register_system(SpawnSystem { cooldown: 0 });
        stage.register_system(DriftSystem);
        stage.register_system(SweepSystem);
        stage.register_system(PhaseSystem);
        Ok(())
    }
}

struct DebriefScene;

impl Scene for DebriefScene {
    fn init(&mut self, stage: &mut Stage) -> Result<(), GameError> {
        stage.register_system(FnSystem::new(|ctx| {
            let tally = ctx.persistent::<SweepTally>();
            info!(
                spawned = tally.spawned,
                swept = tally.swept,
                "debrief complete"
            );
            drop(tally);
            ctx.quit();
            Ok(())
        }));
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("drift=info".parse()?))
        .init();

    let mut game = Game::with_config(FrameConfig {
        frame_rate: 240.0,
        // Safety bound so a misbehaving field still terminates.
        max_frames: 20_000,
    });
    game.create_persistent_singleton::<SweepTally>();
    game.register_scene("field", FieldScene);
    game.register_scene("debrief", DebriefScene);

    game.start("field")?;

    let tally = game.persistent::<SweepTally>();
    info!(spawned = tally.spawned, swept = tally.swept, "drift finished");
    Ok(())
}
