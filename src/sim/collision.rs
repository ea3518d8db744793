//! Collision detection and response
//!
//! Ship-vs-terrain is a piecewise-linear ground test with snap/bounce or
//! crash response; projectile hits are plain circle overlap checks.

use glam::Vec2;

use super::state::Ship;
use super::terrain::Terrain;
use crate::consts::*;

/// Outcome of a ship/terrain contact test for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundContact {
    /// No contact (includes flying outside the generated terrain range)
    Airborne,
    /// Soft touchdown; position snapped and velocity reflected
    Landed { impact_speed: f32 },
    /// Impact above the crash threshold; health zeroed
    Crashed { impact_speed: f32 },
}

/// Test the ship's bottom edge against the interpolated ground line and
/// apply the response. The caller owns the phase transition and effects.
pub fn resolve_ground_contact(ship: &mut Ship, terrain: &Terrain) -> GroundContact {
    let Some(ground) = terrain.height_at(ship.pos.x) else {
        // Outside the level bounds: free fall, never a program error
        return GroundContact::Airborne;
    };
    if ship.pos.y + SHIP_SIZE <= ground {
        return GroundContact::Airborne;
    }

    let impact_speed = ship.vel.length();
    if impact_speed > CRASH_SPEED {
        ship.take_damage(100.0);
        return GroundContact::Crashed { impact_speed };
    }

    // Soft landing: snap to the surface, bounce with restitution, scrub
    // horizontal speed with friction
    ship.pos.y = ground - SHIP_SIZE;
    ship.vel.y = -ship.vel.y * BOUNCE_RESTITUTION;
    ship.vel.x *= GROUND_FRICTION;
    if impact_speed > BUMP_SPEED {
        ship.take_damage(BUMP_DAMAGE);
    }
    GroundContact::Landed { impact_speed }
}

/// Pin the ship below the sky bound and kill any remaining upward motion
pub fn clamp_to_ceiling(ship: &mut Ship) {
    if ship.pos.y < CEILING_Y {
        ship.pos.y = CEILING_Y;
        if ship.vel.y < 0.0 {
            ship.vel.y = 0.0;
        }
    }
}

/// Circle overlap test used for all projectile/entity pairs
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}
