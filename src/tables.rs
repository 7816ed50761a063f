/// Entity tables — spawn, advance and cull policies for each kind of object.
///
/// Every `step_*` function runs one frame for its table. Spawning is a
/// per-frame lottery: `roll_spawn(rate)` hits with probability
/// `1 / (rate + 1)`, so a table fills roughly once every `rate` frames.

use rand::Rng;

use crate::collision::credit_escapes;
use crate::config::{BuildingConfig, ObstacleConfig, PowerUpConfig, ProjectileConfig, StarfieldConfig};
use crate::entities::{Building, Color, GameState, Obstacle, PowerUp, Projectile, Star, Vec3Depth};

/// Draw from `0..=rate` and report whether it came up zero.
pub fn roll_spawn(rate: u32, rng: &mut impl Rng) -> bool {
    rng.gen_range(0..=rate) == 0
}

fn pick<T: Copy>(items: &[T], rng: &mut impl Rng) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.gen_range(0..items.len())])
    }
}

// ── Starfield ─────────────────────────────────────────────────────────────────

fn scatter_star(star: &mut Star, cfg: &StarfieldConfig, width: u16, height: u16, rng: &mut impl Rng) {
    star.lateral = rng.gen_range(0.0..=f32::from(width));
    star.vertical = rng.gen_range(0.0..=f32::from(height));
    star.depth = cfg.depth.sample(rng);
}

/// Fill the fixed star pool.
pub fn init_stars(cfg: &StarfieldConfig, width: u16, height: u16, rng: &mut impl Rng) -> Vec<Star> {
    (0..cfg.count)
        .map(|_| {
            let mut star = Star {
                lateral: 0.0,
                vertical: 0.0,
                depth: 1.0,
            };
            scatter_star(&mut star, cfg, width, height, rng);
            star
        })
        .collect()
}

/// Drift every star toward the viewer, recycling the ones that arrive.
/// The pool never grows or shrinks.
pub fn step_stars(state: &mut GameState, cfg: &StarfieldConfig, rng: &mut impl Rng) {
    let (w, h) = (state.width, state.height);
    for star in &mut state.stars {
        star.depth -= cfg.speed;
        if star.depth <= cfg.recycle_depth {
            scatter_star(star, cfg, w, h, rng);
        }
    }
}

// ── Buildings ─────────────────────────────────────────────────────────────────

/// Lay a row of buildings across the screen from left to right.
pub fn generate_skyline(cfg: &BuildingConfig, width: u16, rng: &mut impl Rng) -> Vec<Building> {
    let sky = &cfg.skyline;
    let mut buildings = Vec::new();
    let mut x = 0.0;
    while x < f32::from(width) {
        buildings.push(Building {
            lateral: x,
            depth: sky.depth.sample(rng),
            width: sky.width,
            height: sky.height.sample(rng).round(),
            color: pick(&sky.colors, rng).unwrap_or(Color::LIGHT_GRAY),
        });
        x += sky.width + sky.gap.sample(rng).round();
    }
    buildings
}

/// Buildings the renderer should draw: the visible few that are still far
/// enough away. Nearer ones are live for collision but not drawn.
pub fn drawable_buildings<'a>(buildings: &'a [Building], cfg: &'a BuildingConfig) -> impl Iterator<Item = &'a Building> {
    buildings
        .iter()
        .take(cfg.max_visible)
        .filter(move |b| b.depth > cfg.draw_depth)
}

pub fn step_buildings(state: &mut GameState, cfg: &BuildingConfig, rng: &mut impl Rng) {
    state.buildings.retain(|b| b.depth > cfg.cull_depth);

    for building in state.buildings.iter_mut().take(cfg.max_visible) {
        building.depth -= cfg.speed;
    }

    if state.buildings.len() < cfg.max_visible && roll_spawn(cfg.spawn_rate, rng) {
        let building = Building {
            lateral: rng.gen_range(0.0..=f32::from(state.width)),
            depth: cfg.spawn_depth.sample(rng),
            width: cfg.width.sample(rng).round(),
            height: cfg.height.sample(rng).round(),
            color: pick(&cfg.colors, rng).unwrap_or(Color::DARK_GRAY),
        };
        log::trace!("building spawned at depth {:.1}", building.depth);
        state.buildings.push(building);
    }
}

// ── Obstacles ─────────────────────────────────────────────────────────────────

/// Build the next obstacle. A boss replaces it exactly once per score
/// milestone: when `score` is a multiple of `boss.every` and differs from
/// `last_boss_score`, which is then updated. `boss.every == 0` disables bosses.
pub fn spawn_obstacle(
    score: u32,
    last_boss_score: &mut u32,
    cfg: &ObstacleConfig,
    width: u16,
    height: u16,
    rng: &mut impl Rng,
) -> Obstacle {
    let w = f32::from(width);
    let vertical = rng.gen_range(0.0..=f32::from(height));
    let depth = cfg.spawn_depth.sample(rng);

    if score.checked_rem(cfg.boss.every) == Some(0) && score != *last_boss_score {
        *last_boss_score = score;
        log::debug!("boss spawned at score {score}");
        return Obstacle {
            position: Vec3Depth::new(rng.gen_range(w / 4.0..=w * 3.0 / 4.0), vertical, depth),
            size: cfg.boss.size,
            health: cfg.boss.health,
            is_boss: true,
            escaped: false,
        };
    }

    // Regular obstacles come in from either flank.
    let lateral = if rng.gen_bool(0.5) {
        rng.gen_range(0.0..=w / 4.0)
    } else {
        rng.gen_range(w * 3.0 / 4.0..=w)
    };
    Obstacle {
        position: Vec3Depth::new(lateral, vertical, depth),
        size: cfg.size,
        health: cfg.health,
        is_boss: false,
        escaped: false,
    }
}

/// Move obstacles closer, drop the ones past the viewer, maybe spawn one,
/// then award escape credit.
pub fn step_obstacles(state: &mut GameState, cfg: &ObstacleConfig, rng: &mut impl Rng) {
    for obstacle in &mut state.obstacles {
        obstacle.position.depth -= cfg.speed;
    }
    state.obstacles.retain(|o| o.position.depth > cfg.cull_depth);

    if roll_spawn(cfg.spawn_rate, rng) {
        let obstacle = spawn_obstacle(
            state.score,
            &mut state.last_boss_score,
            cfg,
            state.width,
            state.height,
            rng,
        );
        state.obstacles.push(obstacle);
    }

    state.score += credit_escapes(&mut state.obstacles, cfg);
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Fire a volley when some obstacle is lined up in front of the ship and the
/// cooldown has run out. Returns whether anything was fired.
pub fn auto_fire(state: &mut GameState, cfg: &ProjectileConfig) -> bool {
    if state.fire_cooldown > 0 {
        state.fire_cooldown -= 1;
        return false;
    }

    let ship = &state.ship;
    let lined_up = state
        .obstacles
        .iter()
        .any(|o| (ship.lateral - o.position.lateral).abs() < cfg.aim_window && o.position.depth < cfg.aim_depth);
    if !lined_up {
        return false;
    }

    let (lateral, vertical) = (ship.lateral, ship.vertical);
    if state.special_weapon.active {
        for offset in [-cfg.special_spread, 0.0, cfg.special_spread] {
            state.projectiles.push(Projectile {
                position: Vec3Depth::new(lateral + offset, vertical, cfg.launch_depth),
                color: cfg.special_color,
            });
        }
    } else {
        state.projectiles.push(Projectile {
            position: Vec3Depth::new(lateral, vertical, cfg.launch_depth),
            color: cfg.color,
        });
    }
    state.fire_cooldown = cfg.fire_cooldown_frames;
    true
}

/// Drop projectiles that reached their range, then push the rest away.
pub fn step_projectiles(state: &mut GameState, cfg: &ProjectileConfig) {
    state.projectiles.retain(|p| p.position.depth < cfg.max_depth);
    for projectile in &mut state.projectiles {
        projectile.position.depth += cfg.speed;
    }
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

pub fn step_power_ups(state: &mut GameState, cfg: &PowerUpConfig, rng: &mut impl Rng) {
    for power_up in &mut state.power_ups {
        power_up.position.depth -= cfg.speed;
    }
    state.power_ups.retain(|p| p.position.depth > cfg.cull_depth);

    if roll_spawn(cfg.spawn_rate, rng) {
        state.power_ups.push(PowerUp {
            position: Vec3Depth::new(
                rng.gen_range(0.0..=f32::from(state.width)),
                rng.gen_range(0.0..=f32::from(state.height)),
                cfg.spawn_depth.sample(rng),
            ),
        });
    }
}
