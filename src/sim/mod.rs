//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Normalized fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod state;
pub mod terrain;
pub mod tick;

pub use camera::Camera;
pub use collision::{GroundContact, circles_overlap, clamp_to_ceiling, resolve_ground_contact};
pub use state::{
    Enemy, EnemyKind, GameEvent, GameState, HudSnapshot, Particle, Projectile, SessionPhase, Ship,
};
pub use terrain::{Terrain, TerrainSample, ridge_height};
pub use tick::{TickInput, tick};
