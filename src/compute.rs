/// Game state machine.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (plus the config and, where needed, an RNG handle) and returns
/// a brand-new `GameState`. Side effects are limited to the injected RNG.
///
/// One call to `tick` is one frame: input → tables → collisions → particles.
/// The special-weapon countdown runs with the input step, so a pickup made
/// this frame still shows the full duration when the frame ends.

use rand::Rng;

use crate::collision::{
    check_ship_buildings, check_ship_obstacles, collect_power_ups, resolve_projectile_hits, tick_special_weapon,
};
use crate::config::{GameConfig, ShipConfig, SmokeConfig};
use crate::entities::{Buttons, Controls, GameState, GameStatus, Ship, SpecialWeapon, Tilt, Vec3Depth};
use crate::particles::ParticleSystem;
use crate::tables::{
    auto_fire, generate_skyline, init_stars, step_buildings, step_obstacles, step_power_ups, step_projectiles,
    step_stars,
};

// ── Constructors ─────────────────────────────────────────────────────────────

fn centred_ship(width: u16, height: u16) -> Ship {
    Ship {
        lateral: f32::from(width / 2),
        vertical: f32::from(height / 2),
        tilt: Tilt::Center,
    }
}

/// Build the initial game state: ship centred, tables empty apart from the
/// star pool and the opening skyline.
pub fn init_state(config: &GameConfig, rng: &mut impl Rng) -> GameState {
    let (width, height) = (config.display.width, config.display.height);
    let stars = config
        .stars
        .as_ref()
        .map(|cfg| init_stars(cfg, width, height, rng))
        .unwrap_or_default();
    let buildings = config
        .buildings
        .as_ref()
        .map(|cfg| generate_skyline(cfg, width, rng))
        .unwrap_or_default();

    GameState {
        ship: centred_ship(width, height),
        obstacles: Vec::new(),
        projectiles: Vec::new(),
        power_ups: Vec::new(),
        buildings,
        stars,
        particles: ParticleSystem::new(),
        special_weapon: SpecialWeapon::default(),
        score: 0,
        last_boss_score: 0,
        fire_cooldown: 0,
        status: GameStatus::Playing,
        frame: 0,
        width,
        height,
    }
}

/// Start over after a game over. The star pool is kept as is; everything
/// else goes back to its opening state.
pub fn reset(state: &GameState, config: &GameConfig, rng: &mut impl Rng) -> GameState {
    log::debug!("restart after score {}", state.score);
    let buildings = config
        .buildings
        .as_ref()
        .map(|cfg| generate_skyline(cfg, state.width, rng))
        .unwrap_or_default();
    GameState {
        ship: centred_ship(state.width, state.height),
        obstacles: Vec::new(),
        projectiles: Vec::new(),
        power_ups: Vec::new(),
        buildings,
        stars: state.stars.clone(),
        particles: ParticleSystem::new(),
        special_weapon: SpecialWeapon::default(),
        score: 0,
        last_boss_score: 0,
        fire_cooldown: 0,
        status: GameStatus::Playing,
        frame: state.frame,
        width: state.width,
        height: state.height,
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Move and tilt the ship for one frame of held controls. Each axis only
/// moves while the ship is still inside the margin on that side.
pub fn steer_ship(state: &GameState, controls: &Controls, cfg: &ShipConfig) -> GameState {
    let mut ship = state.ship.clone();
    let (w, h) = (f32::from(state.width), f32::from(state.height));

    if controls.up && ship.vertical > cfg.margin {
        ship.vertical -= cfg.speed;
    }
    if controls.down && ship.vertical < h - cfg.margin {
        ship.vertical += cfg.speed;
    }
    if controls.left && ship.lateral > cfg.margin {
        ship.lateral -= cfg.speed;
    }
    if controls.right && ship.lateral < w - cfg.margin {
        ship.lateral += cfg.speed;
    }

    ship.tilt = if controls.left {
        Tilt::Left
    } else if controls.right {
        Tilt::Right
    } else {
        Tilt::Center
    };

    GameState {
        ship,
        ..state.clone()
    }
}

/// Exhaust smoke below the ship, plus a wing-tip puff on the raised side.
fn emit_smoke(state: &mut GameState, cfg: &SmokeConfig, rng: &mut impl Rng) {
    let ship = &state.ship;
    let below = ship.vertical + cfg.trail_offset;
    let exhaust = Vec3Depth::new(ship.lateral, below, 1.0);
    let wing = match ship.tilt {
        Tilt::Left => Some((ship.lateral - cfg.wing_offset, cfg.drift)),
        Tilt::Right => Some((ship.lateral + cfg.wing_offset, -cfg.drift)),
        Tilt::Center => None,
    };

    state.particles.spawn_burst(exhaust, &cfg.puff, rng);
    if let Some((lateral, drift)) = wing {
        let origin = Vec3Depth::new(lateral, below, 1.0);
        state.particles.spawn_drifting(origin, &cfg.puff, drift, rng);
    }
}

// ── Per-frame tick (nearly pure — RNG is injected) ──────────────────────────

/// Advance the simulation by one frame. All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
///
/// While the game is over only the scenery (stars and buildings) and the
/// particles keep moving, and the restart control starts a fresh game.
pub fn tick(state: &GameState, buttons: Buttons, config: &GameConfig, rng: &mut impl Rng) -> GameState {
    let controls = config.ship.buttons.resolve(buttons);

    if state.is_over() {
        if controls.restart {
            return reset(state, config, rng);
        }
        let mut next = state.clone();
        if let Some(cfg) = &config.stars {
            step_stars(&mut next, cfg, rng);
        }
        if let Some(cfg) = &config.buildings {
            step_buildings(&mut next, cfg, rng);
        }
        next.particles.advance(next.width, next.height, rng);
        next.frame += 1;
        return next;
    }

    // ── 1. Input & timers ────────────────────────────────────────────────────
    let mut next = steer_ship(state, &controls, &config.ship);
    tick_special_weapon(&mut next);
    if let Some(cfg) = &config.smoke {
        emit_smoke(&mut next, cfg, rng);
    }

    // ── 2. Entity tables ─────────────────────────────────────────────────────
    if let Some(cfg) = &config.stars {
        step_stars(&mut next, cfg, rng);
    }
    if let Some(cfg) = &config.buildings {
        step_buildings(&mut next, cfg, rng);
    }
    if let Some(cfg) = &config.obstacles {
        step_obstacles(&mut next, cfg, rng);
    }
    if let Some(cfg) = &config.projectiles {
        auto_fire(&mut next, cfg);
        step_projectiles(&mut next, cfg);
    }
    if let Some(cfg) = &config.power_ups {
        step_power_ups(&mut next, cfg, rng);
    }

    // ── 3. Collisions & scoring ──────────────────────────────────────────────
    let projection = config.projection;
    if let Some(cfg) = &config.obstacles {
        resolve_projectile_hits(&mut next, cfg, &projection, rng);
    }
    if let Some(cfg) = &config.power_ups {
        collect_power_ups(&mut next, cfg);
    }
    if let Some(cfg) = &config.obstacles {
        check_ship_obstacles(&mut next, cfg, &config.crash, &projection, rng);
    }
    if let Some(cfg) = &config.buildings {
        check_ship_buildings(&mut next, cfg, &config.crash, &projection, rng);
    }

    // ── 4. Particles ─────────────────────────────────────────────────────────
    next.particles.advance(next.width, next.height, rng);
    next.frame += 1;
    next
}
