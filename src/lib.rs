//! Ridge Raider - A side-scrolling terrain-flyer arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, terrain, collisions, game state)
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Graphics/accessibility preferences

pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
///
/// World coordinates are canvas-style: x grows right, y grows DOWN.
/// `dt` is normalized so 1.0 is one nominal 60 Hz frame.
pub mod consts {
    /// Wall-clock seconds covered by one dt=1.0 simulation step
    pub const NOMINAL_FRAME_SECS: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Nominal viewport in world units (renderer letterboxes to fit)
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;

    /// Terrain sampling
    pub const TERRAIN_STEP: f32 = 50.0;
    pub const TERRAIN_BASELINE: f32 = 450.0;
    pub const TERRAIN_AMP_SLOW: f32 = 60.0;
    pub const TERRAIN_FREQ_SLOW: f32 = 0.01;
    pub const TERRAIN_AMP_FAST: f32 = 20.0;
    pub const TERRAIN_FREQ_FAST: f32 = 0.05;
    /// Render floor the boundary anchors drop to (keeps the fill watertight)
    pub const FLOOR_Y: f32 = 700.0;
    pub const LEVEL_WIDTH: f32 = 3200.0;
    /// No enemies spawn within this distance of the ship spawn point
    pub const SPAWN_SAFE_ZONE: f32 = 400.0;

    /// Ship defaults
    pub const SHIP_SIZE: f32 = 10.0;
    pub const SHIP_SPAWN_X: f32 = 100.0;
    pub const SHIP_SPAWN_Y: f32 = 200.0;
    /// Radians per dt=1.0 step while a turn key is held
    pub const TURN_RATE: f32 = 0.08;
    pub const THRUST_POWER: f32 = 0.15;
    pub const GRAVITY: f32 = 0.05;
    /// Per-step multiplicative air resistance
    pub const DRAG: f32 = 0.99;
    /// Fuel units burned per dt=1.0 step of thrust; exactly representable
    /// so a full tank drains to exactly zero (100 fuel = 800 steps)
    pub const FUEL_BURN_RATE: f32 = 0.125;
    /// Upper vertical bound (y-down, so this is the sky)
    pub const CEILING_Y: f32 = 20.0;

    /// Landing and crashing
    pub const CRASH_SPEED: f32 = 4.0;
    /// Impacts above this (but below crash) chip health
    pub const BUMP_SPEED: f32 = 1.5;
    pub const BUMP_DAMAGE: f32 = 5.0;
    pub const BOUNCE_RESTITUTION: f32 = 0.3;
    pub const GROUND_FRICTION: f32 = 0.8;

    /// Weapons
    pub const MUZZLE_SPEED: f32 = 8.0;
    pub const SHOT_RADIUS: f32 = 3.0;
    pub const SHOT_LIFE: f32 = 90.0;
    pub const ENEMY_SHOT_SPEED: f32 = 3.5;
    pub const ENEMY_SHOT_LIFE: f32 = 240.0;
    pub const ENEMY_SHOT_DAMAGE: f32 = 10.0;

    /// Enemies
    pub const ENEMY_RADIUS: f32 = 14.0;
    pub const ENEMY_DETECT_RANGE: f32 = 400.0;
    pub const ENEMY_FIRE_PROBABILITY: f32 = 0.02;
    pub const KILL_SCORE: u64 = 100;

    /// Particles
    pub const MAX_PARTICLES: usize = 256;
    pub const PARTICLE_DRAG: f32 = 0.95;

    /// Camera follow factor per frame
    pub const CAMERA_SMOOTHING: f32 = 0.1;
}

/// Unit facing vector for a heading angle (radians; -PI/2 points up in y-down coords)
#[inline]
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
