//! Procedural terrain generation
//!
//! A level's ground is a ridge line sampled from two superimposed sine waves
//! at a fixed step, bracketed by two floor anchors so the filled polygon is
//! watertight. Height lookup is index arithmetic plus linear interpolation.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::EnemyKind;
use crate::consts::*;

/// One ground-height sample; `x` values are strictly increasing
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TerrainSample {
    pub x: f32,
    pub ground_y: f32,
}

/// Immutable level terrain, regenerated on level advance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    /// Leading floor anchor, ridge samples every `TERRAIN_STEP`, trailing
    /// floor anchor
    pub samples: Vec<TerrainSample>,
    pub width: f32,
}

/// Ridge height at x: slow and fast sine over a fixed baseline (y-down,
/// so smaller values are higher peaks)
#[inline]
pub fn ridge_height(x: f32) -> f32 {
    TERRAIN_BASELINE
        + TERRAIN_AMP_SLOW * (x * TERRAIN_FREQ_SLOW).sin()
        + TERRAIN_AMP_FAST * (x * TERRAIN_FREQ_FAST).sin()
}

impl Terrain {
    /// Pure function of (level, width); the level number does not perturb the
    /// height formula, only enemy placement elsewhere.
    pub fn generate(_level: u32, width: f32) -> Self {
        let steps = (width / TERRAIN_STEP).ceil() as usize;
        let mut samples = Vec::with_capacity(steps + 3);
        samples.push(TerrainSample {
            x: -TERRAIN_STEP,
            ground_y: FLOOR_Y,
        });
        for i in 0..=steps {
            let x = i as f32 * TERRAIN_STEP;
            samples.push(TerrainSample {
                x,
                ground_y: ridge_height(x),
            });
        }
        samples.push(TerrainSample {
            x: width + TERRAIN_STEP,
            ground_y: FLOOR_Y,
        });
        Self { samples, width }
    }

    /// Interpolated ground height at `x`, or `None` outside the generated
    /// range (the caller leaves the ship in free fall)
    pub fn height_at(&self, x: f32) -> Option<f32> {
        if !(0.0..=self.width).contains(&x) {
            return None;
        }
        // Ridge samples start at index 1; index 0 is the leading floor anchor
        let idx = (x / TERRAIN_STEP) as usize + 1;
        let a = self.samples.get(idx)?;
        let b = self.samples.get(idx + 1)?;
        let t = (x - a.x) / (b.x - a.x);
        Some(a.ground_y + (b.ground_y - a.ground_y) * t)
    }

    /// Scatter `3 + level` enemies at random x outside the spawn safe zone,
    /// hovering above the ridge. Randomness comes only from the injected RNG.
    pub fn scatter_enemies(&self, rng: &mut Pcg32, level: u32) -> Vec<(Vec2, EnemyKind)> {
        let count = 3 + level as usize;
        (0..count)
            .map(|_| {
                let x = rng.random_range(SPAWN_SAFE_ZONE..self.width);
                let kind = if rng.random_bool(0.5) {
                    EnemyKind::Turret
                } else {
                    EnemyKind::Floater
                };
                let hover = match kind {
                    EnemyKind::Turret => rng.random_range(10.0..30.0),
                    EnemyKind::Floater => rng.random_range(80.0..160.0),
                };
                (Vec2::new(x, ridge_height(x) - hover), kind)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_samples_strictly_increasing() {
        let terrain = Terrain::generate(0, LEVEL_WIDTH);
        for pair in terrain.samples.windows(2) {
            assert!(pair[0].x < pair[1].x);
        }
    }

    #[test]
    fn test_anchors_reach_floor() {
        let terrain = Terrain::generate(2, LEVEL_WIDTH);
        let first = terrain.samples.first().unwrap();
        let last = terrain.samples.last().unwrap();
        assert_eq!(first.ground_y, FLOOR_Y);
        assert_eq!(last.ground_y, FLOOR_Y);
        assert!(first.x < 0.0);
        assert!(last.x > terrain.width);
    }

    #[test]
    fn test_height_matches_formula_at_sample_points() {
        let terrain = Terrain::generate(0, LEVEL_WIDTH);
        for i in 0..10 {
            let x = i as f32 * TERRAIN_STEP;
            let h = terrain.height_at(x).unwrap();
            assert!((h - ridge_height(x)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_height_interpolates_between_samples() {
        let terrain = Terrain::generate(0, LEVEL_WIDTH);
        let x = TERRAIN_STEP * 1.5;
        let expected = (ridge_height(TERRAIN_STEP) + ridge_height(TERRAIN_STEP * 2.0)) / 2.0;
        let h = terrain.height_at(x).unwrap();
        assert!((h - expected).abs() < 1e-3);
    }

    #[test]
    fn test_height_out_of_range_is_none() {
        let terrain = Terrain::generate(0, LEVEL_WIDTH);
        assert!(terrain.height_at(-5.0).is_none());
        assert!(terrain.height_at(terrain.width + 1.0).is_none());
        assert!(terrain.height_at(terrain.width).is_some());
    }

    #[test]
    fn test_scatter_respects_safe_zone_and_count() {
        let terrain = Terrain::generate(0, LEVEL_WIDTH);
        let mut rng = Pcg32::seed_from_u64(99);
        let spawns = terrain.scatter_enemies(&mut rng, 4);
        assert_eq!(spawns.len(), 7);
        for (pos, _) in &spawns {
            assert!(pos.x >= SPAWN_SAFE_ZONE);
            assert!(pos.x <= terrain.width);
            // Hovering above the ridge (y-down: above means smaller y)
            assert!(pos.y < ridge_height(pos.x));
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = Terrain::generate(3, LEVEL_WIDTH);
        let b = Terrain::generate(3, LEVEL_WIDTH);
        assert_eq!(a.samples.len(), b.samples.len());
        for (sa, sb) in a.samples.iter().zip(&b.samples) {
            assert_eq!(sa.x, sb.x);
            assert_eq!(sa.ground_y, sb.ground_y);
        }
    }
}
