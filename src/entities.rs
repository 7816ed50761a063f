/// All game entity types — pure data, no logic.
///
/// World coordinates share the display's pixel frame: `lateral` runs
/// 0..width left to right, `vertical` runs 0..height top to bottom, and
/// `depth` is the distance from the viewer (smaller = closer).

use serde::{Deserialize, Serialize};

use crate::particles::ParticleSystem;

/// Smallest depth any entity may hold; projection and size scaling divide by it.
pub const MIN_DEPTH: f32 = 0.1;

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3Depth {
    pub lateral: f32,
    pub vertical: f32,
    pub depth: f32,
}

impl Vec3Depth {
    /// Build a point, clamping depth to `MIN_DEPTH`.
    pub fn new(lateral: f32, vertical: f32, depth: f32) -> Self {
        Self {
            lateral,
            vertical,
            depth: clamp_depth(depth),
        }
    }

    /// Distance in the lateral/vertical plane, ignoring depth.
    pub fn planar_distance(&self, lateral: f32, vertical: f32) -> f32 {
        let dx = self.lateral - lateral;
        let dy = self.vertical - vertical;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Substitute `MIN_DEPTH` for anything at or below it (including NaN).
pub fn clamp_depth(depth: f32) -> f32 {
    if depth > MIN_DEPTH {
        depth
    } else {
        MIN_DEPTH
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

/// Opaque-enough RGB triple. Only the fade step reads channels back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const RED_ORANGE: Color = Color::rgb(255, 69, 0);
    pub const DEEP_ORANGE: Color = Color::rgb(255, 140, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const LIGHT_GRAY: Color = Color::rgb(150, 150, 150);
    pub const DARK_GRAY: Color = Color::rgb(50, 50, 50);
    pub const TAN: Color = Color::rgb(210, 180, 140);
}

// ── Ship ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tilt {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ship {
    pub lateral: f32,
    pub vertical: f32,
    pub tilt: Tilt,
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// One poll of the four hardware buttons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Buttons {
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
}

/// Buttons translated through a variant's `ButtonMap`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub restart: bool,
}

// ── Entity tables ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub position: Vec3Depth,
    pub size: f32,
    pub health: i32,
    pub is_boss: bool,
    /// Set once the obstacle has passed the viewer and earned escape credit.
    /// Escaped obstacles can no longer be shot down.
    pub escaped: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub position: Vec3Depth,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUp {
    pub position: Vec3Depth,
}

/// City scenery. Buildings stand on the ground plane, so only lateral and
/// depth vary; `height` is in world units above the ground.
#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    pub lateral: f32,
    pub depth: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub lateral: f32,
    pub vertical: f32,
    pub depth: f32,
}

// ── Master game state ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// Time-boxed special weapon granted by a power-up pickup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpecialWeapon {
    pub active: bool,
    /// Frames left before `active` clears.
    pub timer: u32,
}

/// The entire game state. Cloneable so `tick` can hand back a fresh copy
/// without mutating the caller's.
#[derive(Clone, Debug)]
pub struct GameState {
    pub ship: Ship,
    pub obstacles: Vec<Obstacle>,
    pub projectiles: Vec<Projectile>,
    pub power_ups: Vec<PowerUp>,
    pub buildings: Vec<Building>,
    /// Fixed-size pool, recycled in place.
    pub stars: Vec<Star>,
    pub particles: ParticleSystem,
    pub special_weapon: SpecialWeapon,
    pub score: u32,
    /// Score value at which the most recent boss spawned.
    pub last_boss_score: u32,
    /// Frames left before auto-fire may shoot again.
    pub fire_cooldown: u32,
    pub status: GameStatus,
    pub frame: u64,
    pub width: u16,
    pub height: u16,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }
}
