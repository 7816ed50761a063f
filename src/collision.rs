/// Collision & scoring — runs after every table has advanced for the frame.
///
/// All tests are planar (lateral/vertical) distances or projected bounds;
/// depth only decides eligibility.

use rand::Rng;

use crate::config::{BuildingConfig, CrashConfig, ObstacleConfig, PowerUpConfig};
use crate::entities::{GameState, GameStatus, Obstacle, Vec3Depth};
use crate::projection::Projection;

// ── Projectile ↔ obstacle ────────────────────────────────────────────────────

/// Would a projectile at `shot` hit `obstacle` this frame?
///
/// Only obstacles inside the near-field band can be hit, and escaped ones
/// never can. The hit radius grows with the obstacle's projected size.
pub fn projectile_hits(obstacle: &Obstacle, shot: &Vec3Depth, cfg: &ObstacleConfig, projection: &Projection) -> bool {
    let pos = &obstacle.position;
    if obstacle.escaped || pos.depth > cfg.min_collision_distance {
        return false;
    }
    let radius = cfg.hit_radius + projection.apparent_size(obstacle.size, pos.depth);
    pos.planar_distance(shot.lateral, shot.vertical) < radius
}

/// Resolve every projectile against the obstacle table. Each projectile
/// resolves at most one obstacle (first match wins) and is consumed by it.
/// Returns how many projectiles hit.
pub fn resolve_projectile_hits(
    state: &mut GameState,
    cfg: &ObstacleConfig,
    projection: &Projection,
    rng: &mut impl Rng,
) -> usize {
    let mut hits = 0;
    let mut survivors = Vec::with_capacity(state.projectiles.len());

    for shot in std::mem::take(&mut state.projectiles) {
        let target = state
            .obstacles
            .iter()
            .position(|o| projectile_hits(o, &shot.position, cfg, projection));
        let Some(idx) = target else {
            survivors.push(shot);
            continue;
        };
        hits += 1;

        let obstacle = &mut state.obstacles[idx];
        if obstacle.is_boss {
            obstacle.health -= 1;
            if obstacle.health <= 0 {
                let origin = obstacle.position;
                state.obstacles.remove(idx);
                state.particles.spawn_burst(origin, &cfg.boss_explosion, rng);
                state.score += cfg.boss.score;
                log::debug!("boss destroyed, score {}", state.score);
            }
        } else {
            let origin = obstacle.position;
            state.obstacles.remove(idx);
            state.particles.spawn_burst(origin, &cfg.explosion, rng);
            state.score += cfg.kill_score;
        }
    }

    state.projectiles = survivors;
    hits
}

// ── Escape credit ─────────────────────────────────────────────────────────────

/// Mark obstacles that have passed the viewer and return the points they
/// earn. Each obstacle is credited once; from then on it cannot be shot,
/// so escape and kill scoring never both apply to the same obstacle.
pub fn credit_escapes(obstacles: &mut [Obstacle], cfg: &ObstacleConfig) -> u32 {
    let mut credit = 0;
    for obstacle in obstacles.iter_mut().filter(|o| !o.escaped) {
        if obstacle.position.depth <= cfg.escape_depth {
            obstacle.escaped = true;
            credit += cfg.escape_score;
        }
    }
    credit
}

// ── Ship ↔ power-up ───────────────────────────────────────────────────────────

/// Pick up every power-up within reach of the ship. Returns whether any was
/// collected; a pickup (re)starts the special-weapon timer.
pub fn collect_power_ups(state: &mut GameState, cfg: &PowerUpConfig) -> bool {
    let (lateral, vertical) = (state.ship.lateral, state.ship.vertical);
    let before = state.power_ups.len();
    state
        .power_ups
        .retain(|p| p.position.planar_distance(lateral, vertical) >= cfg.pickup_radius);

    let collected = state.power_ups.len() < before;
    if collected {
        state.special_weapon.active = true;
        state.special_weapon.timer = cfg.duration;
        log::debug!("power-up collected, special weapon for {} frames", cfg.duration);
    }
    collected
}

/// Count the special weapon down by one frame.
pub fn tick_special_weapon(state: &mut GameState) {
    if state.is_over() || !state.special_weapon.active {
        return;
    }
    let weapon = &mut state.special_weapon;
    weapon.timer = weapon.timer.saturating_sub(1);
    if weapon.timer == 0 {
        weapon.active = false;
    }
}

// ── Ship crashes ──────────────────────────────────────────────────────────────

/// Move to `GameOver`, leaving a burst at the ship and one at `wreck`.
/// Does nothing if the game is already over. Returns whether it fired.
pub fn trigger_game_over(state: &mut GameState, crash: &CrashConfig, wreck: Vec3Depth, rng: &mut impl Rng) -> bool {
    if state.is_over() {
        return false;
    }
    state.status = GameStatus::GameOver;
    let ship = Vec3Depth::new(state.ship.lateral, state.ship.vertical, 1.0);
    state.particles.spawn_burst(ship, &crash.ship, rng);
    state.particles.spawn_burst(wreck, &crash.wreck, rng);
    log::debug!("game over at frame {}, score {}", state.frame, state.score);
    true
}

/// Proximity test between the ship and obstacles that have reached it.
pub fn check_ship_obstacles(
    state: &mut GameState,
    cfg: &ObstacleConfig,
    crash: &CrashConfig,
    projection: &Projection,
    rng: &mut impl Rng,
) -> bool {
    if state.is_over() {
        return false;
    }
    let (lateral, vertical) = (state.ship.lateral, state.ship.vertical);
    let hit = state.obstacles.iter().find(|o| {
        let pos = &o.position;
        pos.depth <= cfg.escape_depth
            && pos.planar_distance(lateral, vertical) < cfg.hit_radius + projection.apparent_size(o.size, pos.depth)
    });
    match hit.map(|o| o.position) {
        Some(wreck) => trigger_game_over(state, crash, wreck, rng),
        None => false,
    }
}

/// Test the ship against the projected front face of every building in the
/// collision band.
pub fn check_ship_buildings(
    state: &mut GameState,
    cfg: &BuildingConfig,
    crash: &CrashConfig,
    projection: &Projection,
    rng: &mut impl Rng,
) -> bool {
    if state.is_over() {
        return false;
    }
    let (w, h) = (state.width, state.height);
    let (ship_x, ship_y) = (state.ship.lateral, state.ship.vertical);
    let band = cfg.collision_depth;

    let hit = state.buildings.iter().find(|b| {
        if b.depth <= band.min || b.depth >= band.max {
            return false;
        }
        let lateral = b.lateral - f32::from(w) / 2.0;
        let base = projection.project(lateral, 0.0, b.depth, w, h);
        let top = projection.project(lateral, b.height, b.depth, w, h);
        let half_width = projection.apparent_size(b.width, b.depth) / 2.0;
        let (left, right) = (base.x as f32 - half_width, base.x as f32 + half_width);
        left < ship_x && ship_x < right && (top.y as f32) < ship_y && ship_y < base.y as f32
    });

    match hit.map(|b| b.depth) {
        Some(depth) => {
            let wreck = Vec3Depth::new(ship_x, ship_y, depth);
            trigger_game_over(state, crash, wreck, rng)
        }
        None => false,
    }
}
