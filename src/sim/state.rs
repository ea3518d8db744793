//! Game state and core simulation types
//!
//! One `GameState` value owns the whole session: ship, terrain, entities,
//! camera, RNG. No module-level mutable state anywhere in the crate.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::terrain::Terrain;
use crate::consts::*;
use crate::heading_vector;

/// Current phase of a play session
///
/// Exactly one phase is active; only `Playing` drives the update pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Initial state, awaiting an explicit start
    Idle,
    /// Simulation active
    Playing,
    /// Frozen mid-level
    Paused,
    /// Ship destroyed; terminal per attempt
    GameOver,
    /// All enemies down; terminal per attempt
    Victory,
}

/// Transition notifications queued during a tick and drained by the host.
///
/// `LevelCleared` fires exactly once per victory, driving the celebratory
/// hook without the host having to diff phases itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    EnemyDestroyed { id: u32 },
    ShipDestroyed,
    LevelCleared,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in radians; -PI/2 points straight up (y-down world)
    pub angle: f32,
    /// Clamped to [0, 100] on every mutation
    pub fuel: f32,
    /// Clamped to [0, 100] on every mutation
    pub health: f32,
}

impl Ship {
    pub fn spawn() -> Self {
        Self {
            pos: Vec2::new(SHIP_SPAWN_X, SHIP_SPAWN_Y),
            vel: Vec2::ZERO,
            angle: -std::f32::consts::FRAC_PI_2,
            fuel: 100.0,
            health: 100.0,
        }
    }

    /// Unit vector along the current heading
    #[inline]
    pub fn facing(&self) -> Vec2 {
        heading_vector(self.angle)
    }

    pub fn burn_fuel(&mut self, amount: f32) {
        self.fuel = (self.fuel - amount).clamp(0.0, 100.0);
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).clamp(0.0, 100.0);
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

/// A projectile; player shots and enemy shots share this shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining lifetime in dt units; collisions zero this to destroy the shot
    pub life: f32,
}

impl Projectile {
    #[inline]
    pub fn alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Ground emplacement sitting on the ridge
    Turret,
    /// Hovers higher above the terrain
    Floater,
}

impl EnemyKind {
    pub fn max_hp(&self) -> u8 {
        match self {
            EnemyKind::Turret => 3,
            EnemyKind::Floater => 2,
        }
    }
}

/// An enemy emplacement
///
/// Destroyed enemies are tombstoned (`active = false`) rather than removed,
/// so iteration indices stay stable within a frame; the tombstones are purged
/// at the next level generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub kind: EnemyKind,
    pub hp: u8,
    pub active: bool,
    /// Tick of the most recent shot; gates fire rate only when the session's
    /// `enemy_fire_cooldown_ticks` is nonzero
    pub last_fire_tick: u64,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, kind: EnemyKind) -> Self {
        Self {
            id,
            pos,
            radius: ENEMY_RADIUS,
            kind,
            hp: kind.max_hp(),
            active: true,
            last_fire_tick: 0,
        }
    }
}

/// A particle for visual effects (no gameplay effect)
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub color: [f32; 4],
    pub size: f32,
}

/// Read-only per-frame telemetry for the external HUD
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub fuel: f32,
    pub health: f32,
    pub level: u32,
    pub phase: SessionPhase,
    pub enemies_left: usize,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed; a fixed seed reproduces enemy layout and fire decisions
    pub seed: u64,
    #[serde(skip, default = "default_rng")]
    pub rng: Pcg32,
    /// Current level (0-based); seeds enemy count
    pub level: u32,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: SessionPhase,
    pub ship: Ship,
    pub terrain: Terrain,
    /// Enemies in spawn order; tombstones stay until the next level
    pub enemies: Vec<Enemy>,
    /// Player shots in spawn order (collision pairs resolve in this order)
    pub player_shots: Vec<Projectile>,
    pub enemy_shots: Vec<Projectile>,
    /// Visual particles (not gameplay-affecting); ring-style so eviction
    /// at the cap stays O(1)
    #[serde(skip)]
    pub particles: VecDeque<Particle>,
    pub camera: Camera,
    /// Previous-frame fire input, for edge-triggered firing
    #[serde(default)]
    pub fire_was_held: bool,
    /// Minimum ticks between shots per enemy; 0 disables the gate and leaves
    /// firing a pure per-frame probability draw
    #[serde(default)]
    pub enemy_fire_cooldown_ticks: u64,
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new idle session with the given seed.
    ///
    /// Terrain is generated immediately so the idle screen has a backdrop;
    /// gameplay entities are reset again on `start`.
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 0,
            score: 0,
            time_ticks: 0,
            phase: SessionPhase::Idle,
            ship: Ship::spawn(),
            // reset_level below generates the real terrain
            terrain: Terrain {
                samples: Vec::new(),
                width: 0.0,
            },
            enemies: Vec::new(),
            player_shots: Vec::new(),
            enemy_shots: Vec::new(),
            particles: VecDeque::new(),
            camera: Camera::default(),
            fire_was_held: false,
            enemy_fire_cooldown_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        };
        state.reset_level();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Regenerate terrain and enemies for the current level and reset the
    /// ship and all transient entities. Purges enemy tombstones.
    pub fn reset_level(&mut self) {
        self.terrain = Terrain::generate(self.level, LEVEL_WIDTH);
        self.enemies.clear();
        let spawns = self.terrain.scatter_enemies(&mut self.rng, self.level);
        for (pos, kind) in spawns {
            let id = self.next_entity_id();
            self.enemies.push(Enemy::new(id, pos, kind));
        }
        self.ship = Ship::spawn();
        self.player_shots.clear();
        self.enemy_shots.clear();
        self.particles.clear();
        self.fire_was_held = false;
        self.camera.snap_to(self.ship.pos);
    }

    /// `Idle -> Playing`: begin the first attempt
    pub fn start(&mut self) {
        if self.phase != SessionPhase::Idle {
            return;
        }
        self.reset_level();
        self.phase = SessionPhase::Playing;
        log::info!("session started (seed {}, level {})", self.seed, self.level);
    }

    /// `GameOver -> Playing`: retry the same level
    pub fn restart(&mut self) {
        if self.phase != SessionPhase::GameOver {
            return;
        }
        self.reset_level();
        self.phase = SessionPhase::Playing;
        log::info!("level {} restarted", self.level);
    }

    /// `Victory -> Playing`: move on to the next level
    pub fn advance_level(&mut self) {
        if self.phase != SessionPhase::Victory {
            return;
        }
        self.level += 1;
        self.reset_level();
        self.phase = SessionPhase::Playing;
        log::info!("advanced to level {}", self.level);
    }

    /// Toggle between `Playing` and `Paused`
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            SessionPhase::Playing => SessionPhase::Paused,
            SessionPhase::Paused => SessionPhase::Playing,
            other => other,
        };
    }

    pub fn active_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    /// The single read-only view the presentation layer polls each frame
    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            fuel: self.ship.fuel,
            health: self.ship.health,
            level: self.level,
            phase: self.phase,
            enemies_left: self.active_enemies(),
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Append a particle, evicting the oldest past the cap
    pub fn spawn_particle(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.pop_front();
        }
        self.particles.push_back(particle);
    }

    /// Radial particle burst at a point (impacts, explosions, exhaust pops)
    pub fn spawn_burst(&mut self, pos: Vec2, count: usize, base_speed: f32, color: [f32; 4]) {
        for _ in 0..count {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = base_speed * self.rng.random_range(0.4..1.0);
            let life = self.rng.random_range(20.0..45.0);
            let particle = Particle {
                pos,
                vel: heading_vector(angle) * speed,
                life,
                max_life: life,
                color,
                size: self.rng.random_range(1.5..4.0),
            };
            self.spawn_particle(particle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping_never_leaves_range() {
        let mut ship = Ship::spawn();
        ship.take_damage(250.0);
        assert_eq!(ship.health, 0.0);
        ship.take_damage(-500.0);
        assert_eq!(ship.health, 100.0);
        ship.burn_fuel(1e6);
        assert_eq!(ship.fuel, 0.0);
    }

    #[test]
    fn test_phase_transitions_gated() {
        let mut state = GameState::new(7);
        assert_eq!(state.phase, SessionPhase::Idle);

        // Restart/advance are no-ops outside their source phase
        state.restart();
        assert_eq!(state.phase, SessionPhase::Idle);
        state.advance_level();
        assert_eq!(state.phase, SessionPhase::Idle);

        state.start();
        assert_eq!(state.phase, SessionPhase::Playing);
        // Start is a no-op once playing
        state.start();
        assert_eq!(state.phase, SessionPhase::Playing);

        state.toggle_pause();
        assert_eq!(state.phase, SessionPhase::Paused);
        state.toggle_pause();
        assert_eq!(state.phase, SessionPhase::Playing);
    }

    #[test]
    fn test_advance_increments_level_and_purges_tombstones() {
        let mut state = GameState::new(3);
        state.start();
        for enemy in &mut state.enemies {
            enemy.active = false;
        }
        state.phase = SessionPhase::Victory;
        state.advance_level();
        assert_eq!(state.level, 1);
        assert!(state.enemies.iter().all(|e| e.active));
        // Level 1 carries one more enemy than level 0
        assert_eq!(state.enemies.len(), 4);
    }

    #[test]
    fn test_new_session_has_full_terrain() {
        let state = GameState::new(9);
        assert_eq!(state.terrain.width, LEVEL_WIDTH);
        assert!(state.terrain.height_at(0.0).is_some());
        assert!(state.terrain.height_at(LEVEL_WIDTH / 2.0).is_some());
        assert!(!state.enemies.is_empty());
    }

    #[test]
    fn test_same_seed_same_enemy_layout() {
        let a = GameState::new(42);
        let b = GameState::new(42);
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.kind, eb.kind);
        }
    }

    #[test]
    fn test_particle_cap() {
        let mut state = GameState::new(1);
        for _ in 0..4 {
            state.spawn_burst(Vec2::ZERO, 100, 2.0, [1.0; 4]);
        }
        assert!(state.particles.len() <= MAX_PARTICLES);
    }

    #[test]
    fn test_particle_cap_evicts_oldest_first() {
        let mut state = GameState::new(1);
        let tagged = |x: f32| Particle {
            pos: Vec2::new(x, 0.0),
            vel: Vec2::ZERO,
            life: 10.0,
            max_life: 10.0,
            color: [1.0; 4],
            size: 2.0,
        };
        for i in 0..MAX_PARTICLES {
            state.spawn_particle(tagged(i as f32));
        }
        state.spawn_particle(tagged(9999.0));

        assert_eq!(state.particles.len(), MAX_PARTICLES);
        // Particle 0 was evicted; the newest landed at the back
        assert_eq!(state.particles.front().unwrap().pos.x, 1.0);
        assert_eq!(state.particles.back().unwrap().pos.x, 9999.0);
    }
}
