use approx::assert_relative_eq;

use perspective_arcade::compute::init_state;
use perspective_arcade::config::*;
use perspective_arcade::entities::*;
use perspective_arcade::tables::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn empty_space_state(rng: &mut StdRng) -> GameState {
    let mut state = init_state(&GameConfig::space(), rng);
    state.stars.clear();
    state
}

fn obstacle_at(lateral: f32, vertical: f32, depth: f32) -> Obstacle {
    Obstacle {
        position: Vec3Depth::new(lateral, vertical, depth),
        size: 5.0,
        health: 1,
        is_boss: false,
        escaped: false,
    }
}

/// Obstacle config that practically never spawns on its own.
fn quiet_obstacles() -> ObstacleConfig {
    ObstacleConfig {
        spawn_rate: u32::MAX,
        ..ObstacleConfig::default()
    }
}

// ── roll_spawn ────────────────────────────────────────────────────────────────

#[test]
fn zero_rate_always_spawns() {
    let mut rng = seeded_rng();
    assert!((0..50).all(|_| roll_spawn(0, &mut rng)));
}

#[test]
fn spawn_rate_is_roughly_one_in_rate_plus_one() {
    let mut rng = seeded_rng();
    let hits = (0..31_000).filter(|_| roll_spawn(30, &mut rng)).count();
    assert!((700..1300).contains(&hits), "hits = {hits}");
}

// ── starfield ─────────────────────────────────────────────────────────────────

#[test]
fn star_pool_size_never_changes() {
    let mut rng = seeded_rng();
    let cfg = StarfieldConfig::default();
    let mut state = empty_space_state(&mut rng);
    state.stars = init_stars(&cfg, state.width, state.height, &mut rng);
    assert_eq!(state.stars.len(), 50);

    for _ in 0..500 {
        step_stars(&mut state, &cfg, &mut rng);
        assert_eq!(state.stars.len(), 50);
    }
    for star in &state.stars {
        assert!(star.depth > 0.0 && star.depth <= 1.0);
        assert!(star.lateral >= 0.0 && star.lateral <= f32::from(state.width));
    }
}

// ── buildings ─────────────────────────────────────────────────────────────────

#[test]
fn skyline_spans_the_screen() {
    let mut rng = seeded_rng();
    let cfg = BuildingConfig::default();
    let skyline = generate_skyline(&cfg, 240, &mut rng);
    assert!(skyline.len() >= 4);
    assert_relative_eq!(skyline[0].lateral, 0.0);
    for pair in skyline.windows(2) {
        let gap = pair[1].lateral - pair[0].lateral - cfg.skyline.width;
        assert!((10.0..=30.0).contains(&gap));
    }
    assert!(skyline.iter().all(|b| b.lateral < 240.0));
}

#[test]
fn live_buildings_never_exceed_cap() {
    let mut rng = seeded_rng();
    let cfg = BuildingConfig::default();
    let mut state = empty_space_state(&mut rng);
    let mut spawned_any = false;
    for _ in 0..1000 {
        step_buildings(&mut state, &cfg, &mut rng);
        assert!(state.buildings.len() <= cfg.max_visible);
        spawned_any |= !state.buildings.is_empty();
    }
    assert!(spawned_any);
}

#[test]
fn buildings_cull_at_depth_seven() {
    let mut rng = seeded_rng();
    let cfg = BuildingConfig {
        spawn_rate: u32::MAX,
        ..BuildingConfig::default()
    };
    let mut state = empty_space_state(&mut rng);
    state.buildings.push(Building {
        lateral: 100.0,
        depth: 7.2,
        width: 40.0,
        height: 80.0,
        color: Color::DARK_GRAY,
    });

    step_buildings(&mut state, &cfg, &mut rng);
    assert_eq!(state.buildings.len(), 1);
    assert_relative_eq!(state.buildings[0].depth, 6.8, epsilon = 1e-4);

    step_buildings(&mut state, &cfg, &mut rng);
    assert!(state.buildings.is_empty());
}

#[test]
fn only_far_visible_buildings_are_drawn() {
    let cfg = BuildingConfig::default();
    let building = |depth| Building {
        lateral: 0.0,
        depth,
        width: 40.0,
        height: 80.0,
        color: Color::TAN,
    };
    let buildings = vec![building(8.0), building(12.0), building(15.0)];
    let drawn: Vec<_> = drawable_buildings(&buildings, &cfg).map(|b| b.depth).collect();
    assert_eq!(drawn, vec![12.0]);
}

// ── obstacles ─────────────────────────────────────────────────────────────────

#[test]
fn boss_spawns_once_per_milestone() {
    let mut rng = seeded_rng();
    let cfg = ObstacleConfig::default();
    let mut last_boss_score = 0;

    let first = spawn_obstacle(100, &mut last_boss_score, &cfg, 240, 135, &mut rng);
    assert!(first.is_boss);
    assert_eq!(first.health, 10);
    assert_eq!(last_boss_score, 100);

    for _ in 0..5 {
        let again = spawn_obstacle(100, &mut last_boss_score, &cfg, 240, 135, &mut rng);
        assert!(!again.is_boss);
        assert_eq!(last_boss_score, 100);
    }

    let next = spawn_obstacle(200, &mut last_boss_score, &cfg, 240, 135, &mut rng);
    assert!(next.is_boss);
    assert_eq!(last_boss_score, 200);
}

#[test]
fn no_boss_at_zero_score() {
    let mut rng = seeded_rng();
    let cfg = ObstacleConfig::default();
    let mut last_boss_score = 0;
    let o = spawn_obstacle(0, &mut last_boss_score, &cfg, 240, 135, &mut rng);
    assert!(!o.is_boss);
}

#[test]
fn zero_boss_interval_disables_bosses() {
    let mut rng = seeded_rng();
    let mut cfg = ObstacleConfig::default();
    cfg.boss.every = 0;
    let mut last_boss_score = 0;
    for score in [0, 1, 100, 200] {
        let o = spawn_obstacle(score, &mut last_boss_score, &cfg, 240, 135, &mut rng);
        assert!(!o.is_boss);
    }
    assert_eq!(last_boss_score, 0);
}

#[test]
fn regular_obstacles_come_from_the_flanks() {
    let mut rng = seeded_rng();
    let cfg = ObstacleConfig::default();
    let mut last_boss_score = 0;
    for _ in 0..100 {
        let o = spawn_obstacle(7, &mut last_boss_score, &cfg, 240, 135, &mut rng);
        let x = o.position.lateral;
        assert!(x <= 60.0 || x >= 180.0, "lateral {x}");
        assert!((10.0..=15.0).contains(&o.position.depth));
    }
}

#[test]
fn escape_credit_is_awarded_once() {
    let mut rng = seeded_rng();
    let cfg = quiet_obstacles();
    let mut state = empty_space_state(&mut rng);
    state.obstacles.push(obstacle_at(20.0, 20.0, 1.05));

    step_obstacles(&mut state, &cfg, &mut rng);
    assert_eq!(state.score, 1);
    assert!(state.obstacles[0].escaped);

    for _ in 0..5 {
        step_obstacles(&mut state, &cfg, &mut rng);
    }
    assert_eq!(state.score, 1);
}

#[test]
fn obstacle_below_cull_is_removed_after_scoring_once() {
    let mut rng = seeded_rng();
    let cfg = quiet_obstacles();
    let mut state = empty_space_state(&mut rng);
    state.obstacles.push(obstacle_at(20.0, 20.0, 1.05));

    // 1.05 → 0.95 (escape) … → 0.05 (culled)
    for _ in 0..10 {
        step_obstacles(&mut state, &cfg, &mut rng);
    }
    assert!(state.obstacles.is_empty());
    assert_eq!(state.score, 1);
}

// ── projectiles ───────────────────────────────────────────────────────────────

#[test]
fn auto_fire_needs_a_lined_up_target() {
    let mut rng = seeded_rng();
    let cfg = ProjectileConfig::default();
    let mut state = empty_space_state(&mut rng);

    assert!(!auto_fire(&mut state, &cfg));
    state.obstacles.push(obstacle_at(state.ship.lateral + 50.0, 20.0, 3.0));
    assert!(!auto_fire(&mut state, &cfg));
    state.obstacles.push(obstacle_at(state.ship.lateral + 5.0, 20.0, 3.0));
    assert!(auto_fire(&mut state, &cfg));

    assert_eq!(state.projectiles.len(), 1);
    let shot = &state.projectiles[0];
    assert_relative_eq!(shot.position.lateral, state.ship.lateral);
    assert_relative_eq!(shot.position.depth, 1.0);
    assert_eq!(shot.color, Color::WHITE);
}

#[test]
fn auto_fire_waits_for_cooldown() {
    let mut rng = seeded_rng();
    let cfg = ProjectileConfig::default();
    let mut state = empty_space_state(&mut rng);
    state.obstacles.push(obstacle_at(state.ship.lateral, 20.0, 3.0));

    assert!(auto_fire(&mut state, &cfg));
    for _ in 0..cfg.fire_cooldown_frames {
        assert!(!auto_fire(&mut state, &cfg));
    }
    assert!(auto_fire(&mut state, &cfg));
    assert_eq!(state.projectiles.len(), 2);
}

#[test]
fn special_weapon_fires_a_spread() {
    let mut rng = seeded_rng();
    let cfg = ProjectileConfig::default();
    let mut state = empty_space_state(&mut rng);
    state.special_weapon = SpecialWeapon { active: true, timer: 10 };
    state.obstacles.push(obstacle_at(state.ship.lateral, 20.0, 3.0));

    assert!(auto_fire(&mut state, &cfg));
    let laterals: Vec<f32> = state.projectiles.iter().map(|p| p.position.lateral - state.ship.lateral).collect();
    assert_eq!(laterals, vec![-10.0, 0.0, 10.0]);
    assert!(state.projectiles.iter().all(|p| p.color == Color::CYAN));
}

#[test]
fn projectiles_are_dropped_past_max_depth() {
    let mut rng = seeded_rng();
    let cfg = ProjectileConfig::default();
    let mut state = empty_space_state(&mut rng);
    state.projectiles.push(Projectile {
        position: Vec3Depth::new(50.0, 50.0, 19.9),
        color: Color::WHITE,
    });

    step_projectiles(&mut state, &cfg);
    assert_eq!(state.projectiles.len(), 1);
    assert!(state.projectiles[0].position.depth > 20.0);

    step_projectiles(&mut state, &cfg);
    assert!(state.projectiles.is_empty());
}

// ── power-ups ─────────────────────────────────────────────────────────────────

#[test]
fn power_ups_approach_and_cull() {
    let mut rng = seeded_rng();
    let cfg = PowerUpConfig {
        spawn_rate: u32::MAX,
        ..PowerUpConfig::default()
    };
    let mut state = empty_space_state(&mut rng);
    state.power_ups.push(PowerUp {
        position: Vec3Depth::new(10.0, 10.0, 0.35),
    });

    step_power_ups(&mut state, &cfg, &mut rng);
    assert_relative_eq!(state.power_ups[0].position.depth, 0.25, epsilon = 1e-4);
    step_power_ups(&mut state, &cfg, &mut rng);
    step_power_ups(&mut state, &cfg, &mut rng);
    assert!(state.power_ups.is_empty());
}
