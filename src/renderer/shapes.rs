//! Shape generation for 2D primitives
//!
//! Everything is tessellated on the CPU in world coordinates; the pipeline
//! applies the camera translation when mapping to NDC, so shape code never
//! thinks about the viewport.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::heading_vector;
use crate::sim::{Enemy, EnemyKind, GameState, Particle, Ship, Terrain};

/// Background grid spacing in world units
const GRID_SPACING: f32 = 100.0;
/// Grid scrolls at half the camera speed for a depth cue
const GRID_PARALLAX: f32 = 0.5;

/// Generate vertices for an axis-aligned rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, max.y, color),
        Vertex::new(min.x, max.y, color),
    ]
}

/// Generate vertices for a thick line segment
pub fn line(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    vec![
        Vertex::new(a.x + perp.x, a.y + perp.y, color),
        Vertex::new(a.x - perp.x, a.y - perp.y, color),
        Vertex::new(b.x + perp.x, b.y + perp.y, color),
        Vertex::new(b.x + perp.x, b.y + perp.y, color),
        Vertex::new(a.x - perp.x, a.y - perp.y, color),
        Vertex::new(b.x - perp.x, b.y - perp.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }
    vertices
}

/// Fixed-spacing background grid covering the viewport, offset by the camera
/// at half speed for parallax
pub fn background_grid(camera: Vec2) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    let off_x = (camera.x * GRID_PARALLAX).rem_euclid(GRID_SPACING);
    let off_y = (camera.y * GRID_PARALLAX).rem_euclid(GRID_SPACING);

    let cols = (VIEW_WIDTH / GRID_SPACING) as u32 + 2;
    for k in 0..cols {
        let x = camera.x + k as f32 * GRID_SPACING - off_x;
        vertices.extend(line(
            Vec2::new(x, camera.y),
            Vec2::new(x, camera.y + VIEW_HEIGHT),
            1.0,
            colors::GRID,
        ));
    }
    let rows = (VIEW_HEIGHT / GRID_SPACING) as u32 + 2;
    for k in 0..rows {
        let y = camera.y + k as f32 * GRID_SPACING - off_y;
        vertices.extend(line(
            Vec2::new(camera.x, y),
            Vec2::new(camera.x + VIEW_WIDTH, y),
            1.0,
            colors::GRID,
        ));
    }
    vertices
}

/// Filled terrain strip from the sample list down to the render floor, plus
/// a brighter ridge line. The boundary anchors already sit at the floor, so
/// the fill is watertight.
pub fn terrain_strip(terrain: &Terrain) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(terrain.samples.len() * 12);
    for pair in terrain.samples.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let fa = Vec2::new(a.x, FLOOR_Y);
        let fb = Vec2::new(b.x, FLOOR_Y);

        vertices.push(Vertex::new(a.x, a.ground_y, colors::TERRAIN_FILL));
        vertices.push(Vertex::new(b.x, b.ground_y, colors::TERRAIN_FILL));
        vertices.push(Vertex::new(fb.x, fb.y, colors::TERRAIN_FILL));
        vertices.push(Vertex::new(a.x, a.ground_y, colors::TERRAIN_FILL));
        vertices.push(Vertex::new(fb.x, fb.y, colors::TERRAIN_FILL));
        vertices.push(Vertex::new(fa.x, fa.y, colors::TERRAIN_FILL));

        vertices.extend(line(
            Vec2::new(a.x, a.ground_y),
            Vec2::new(b.x, b.ground_y),
            2.0,
            colors::TERRAIN_EDGE,
        ));
    }
    vertices
}

/// The ship as a rotated triangular glyph
pub fn ship_glyph(ship: &Ship) -> Vec<Vertex> {
    let nose = ship.pos + heading_vector(ship.angle) * (SHIP_SIZE * 1.5);
    let left = ship.pos + heading_vector(ship.angle + 2.5) * SHIP_SIZE;
    let right = ship.pos + heading_vector(ship.angle - 2.5) * SHIP_SIZE;
    vec![
        Vertex::new(nose.x, nose.y, colors::SHIP),
        Vertex::new(left.x, left.y, colors::SHIP),
        Vertex::new(right.x, right.y, colors::SHIP),
    ]
}

/// Proportional health bar floating above an entity
pub fn health_bar(center_x: f32, y: f32, width: f32, fraction: f32) -> Vec<Vertex> {
    let fraction = fraction.clamp(0.0, 1.0);
    let half = width / 2.0;
    let mut vertices = rect(
        Vec2::new(center_x - half, y),
        Vec2::new(center_x + half, y + 3.0),
        colors::HEALTH_BAR_BG,
    );
    vertices.extend(rect(
        Vec2::new(center_x - half, y),
        Vec2::new(center_x - half + width * fraction, y + 3.0),
        colors::HEALTH_BAR_FILL,
    ));
    vertices
}

/// An enemy with a kind-keyed body and its health bar
pub fn enemy_shape(enemy: &Enemy) -> Vec<Vertex> {
    let mut vertices = match enemy.kind {
        EnemyKind::Turret => {
            // Squat base with a barrel poking skyward
            let r = enemy.radius;
            let mut v = rect(
                enemy.pos + Vec2::new(-r, -r * 0.5),
                enemy.pos + Vec2::new(r, r * 0.5),
                colors::TURRET,
            );
            v.extend(line(
                enemy.pos,
                enemy.pos + Vec2::new(0.0, -r * 1.4),
                3.0,
                colors::TURRET,
            ));
            v
        }
        EnemyKind::Floater => circle(enemy.pos, enemy.radius, colors::FLOATER, 16),
    };
    let fraction = enemy.hp as f32 / enemy.kind.max_hp() as f32;
    vertices.extend(health_bar(
        enemy.pos.x,
        enemy.pos.y - enemy.radius - 10.0,
        enemy.radius * 2.0,
        fraction,
    ));
    vertices
}

/// A particle quad with alpha proportional to remaining life
pub fn particle_quad(particle: &Particle) -> Vec<Vertex> {
    let alpha = (particle.life / particle.max_life).clamp(0.0, 1.0);
    let color = [
        particle.color[0],
        particle.color[1],
        particle.color[2],
        particle.color[3] * alpha,
    ];
    let half = Vec2::splat(particle.size / 2.0);
    rect(particle.pos - half, particle.pos + half, color)
}

/// Tessellate the whole frame in draw order: grid, terrain, enemies, shots,
/// ship, particles on top. `draw_grid` and `max_particles` come from the
/// player's quality settings.
pub fn build_scene(state: &GameState, draw_grid: bool, max_particles: usize) -> Vec<Vertex> {
    let mut vertices = if draw_grid {
        background_grid(state.camera.pos)
    } else {
        Vec::new()
    };
    vertices.extend(terrain_strip(&state.terrain));

    for enemy in state.enemies.iter().filter(|e| e.active) {
        vertices.extend(enemy_shape(enemy));
    }
    for shot in &state.player_shots {
        let half = Vec2::splat(SHOT_RADIUS);
        vertices.extend(rect(shot.pos - half, shot.pos + half, colors::PLAYER_SHOT));
    }
    for shot in &state.enemy_shots {
        let half = Vec2::splat(SHOT_RADIUS);
        vertices.extend(rect(shot.pos - half, shot.pos + half, colors::ENEMY_SHOT));
    }

    // The wreck stops being drawn once the attempt has ended
    if state.ship.health > 0.0 {
        vertices.extend(ship_glyph(&state.ship));
    }
    for particle in state.particles.iter().take(max_particles) {
        vertices.extend(particle_quad(particle));
    }
    vertices
}
