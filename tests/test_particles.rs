use approx::assert_relative_eq;

use perspective_arcade::entities::{Color, Vec3Depth};
use perspective_arcade::particles::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

const W: u16 = 240;
const H: u16 = 135;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn centre() -> Vec3Depth {
    Vec3Depth::new(120.0, 67.0, 2.0)
}

/// Motionless, long-lived particles so a single decay rule can be observed.
fn still_spec(decay: Decay) -> BurstSpec {
    BurstSpec {
        count: 1,
        speed: 0.0,
        vertical_speed: None,
        size: Span::fixed(5.0),
        lifetime: Span::fixed(1000.0),
        color: ColorPolicy::Fixed { color: Color::WHITE },
        shape: FragmentShape::Circle,
        anchor: Anchor::Screen,
        decay,
    }
}

fn plain_decay() -> Decay {
    Decay {
        motion_scale: 1.0,
        truncate_velocity: false,
        size_step: 0.0,
        lifetime_step: 1.0,
        fade: Fade::None,
    }
}

// ── Span ──────────────────────────────────────────────────────────────────────

#[test]
fn span_samples_within_bounds() {
    let mut rng = seeded_rng();
    let span = Span::new(4.0, 12.0);
    for _ in 0..200 {
        let v = span.sample(&mut rng);
        assert!((4.0..=12.0).contains(&v));
    }
    assert_relative_eq!(Span::fixed(3.0).sample(&mut rng), 3.0);
    assert!(!Span::new(2.0, 1.0).is_ordered());
}

// ── spawning ──────────────────────────────────────────────────────────────────

#[test]
fn burst_spawns_exact_count() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    system.spawn_burst(centre(), &BurstSpec::space_explosion(), &mut rng);
    assert_eq!(system.len(), 10);
    system.spawn_burst(centre(), &BurstSpec::space_boss_explosion(), &mut rng);
    assert_eq!(system.len(), 60);
}

#[test]
fn city_explosions_spawn_rectangular_fragments() {
    let mut rng = seeded_rng();
    for (spec, count, color) in [
        (BurstSpec::city_explosion(), 50, Color::RED_ORANGE),
        (BurstSpec::city_boss_explosion(), 150, Color::DEEP_ORANGE),
    ] {
        let mut system = ParticleSystem::new();
        system.spawn_burst(centre(), &spec, &mut rng);
        assert_eq!(system.len(), count);
        for p in system.iter() {
            assert_eq!(p.color, color);
            assert_eq!(p.fragment, Fragment::Rect { width: 3.0, height: 2.0 });
            assert_eq!(p.anchor, Anchor::World);
            assert!(p.velocity.0.abs() <= spec.speed && p.velocity.1.abs() <= spec.speed);
        }
    }
}

#[test]
fn city_explosion_decays_with_red_fade() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    let mut spec = BurstSpec::city_explosion();
    spec.speed = 0.0;
    system.spawn_burst(centre(), &spec, &mut rng);
    system.advance(W, H, &mut rng);
    for p in system.iter() {
        assert_eq!(p.color.r, 250);
        assert_relative_eq!(p.size, 5.95, epsilon = 1e-5);
        assert_relative_eq!(p.lifetime, 14.5);
    }
}

#[test]
fn burst_respects_ranges_and_palette() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    let spec = BurstSpec::wreck_debris();
    system.spawn_burst(centre(), &spec, &mut rng);
    for p in system.iter() {
        assert!(p.velocity.0.abs() <= 5.0 && p.velocity.1.abs() <= 5.0);
        assert!((4.0..=10.0).contains(&p.size));
        assert!((20.0..=50.0).contains(&p.lifetime));
        assert!(p.color == Color::RED_ORANGE || p.color == Color::ORANGE);
        assert!(matches!(p.fragment, Fragment::Rect { .. }));
    }
}

#[test]
fn drift_is_added_to_lateral_velocity() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    system.spawn_drifting(centre(), &still_spec(plain_decay()), 1.0, &mut rng);
    system.advance(W, H, &mut rng);
    let p = system.iter().next().unwrap();
    assert_relative_eq!(p.position.lateral, 121.0);
    assert_relative_eq!(p.position.vertical, 67.0);
}

// ── decay ─────────────────────────────────────────────────────────────────────

#[test]
fn advance_never_grows_the_system() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    system.spawn_burst(centre(), &BurstSpec::space_explosion(), &mut rng);
    system.spawn_burst(centre(), &BurstSpec::ship_debris(), &mut rng);
    let mut previous = system.len();
    for _ in 0..200 {
        system.advance(W, H, &mut rng);
        assert!(system.len() <= previous);
        previous = system.len();
    }
    assert!(system.is_empty());
}

#[test]
fn space_explosion_lives_exactly_its_lifetime() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    let mut spec = BurstSpec::space_explosion();
    spec.speed = 0.0;
    system.spawn_burst(centre(), &spec, &mut rng);
    for _ in 0..9 {
        system.advance(W, H, &mut rng);
    }
    assert_eq!(system.len(), 10);
    system.advance(W, H, &mut rng);
    assert!(system.is_empty());
}

#[test]
fn grey_fade_removes_at_black() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    let decay = Decay {
        fade: Fade::Grey { step: 100 },
        ..plain_decay()
    };
    system.spawn_burst(centre(), &still_spec(decay), &mut rng);

    system.advance(W, H, &mut rng);
    system.advance(W, H, &mut rng);
    assert_eq!(system.iter().next().unwrap().color, Color::grey(55));

    system.advance(W, H, &mut rng);
    assert!(system.is_empty());
}

#[test]
fn smoke_starts_white_and_greys() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    system.spawn_burst(centre(), &BurstSpec::smoke(), &mut rng);
    assert_eq!(system.iter().next().unwrap().color, Color::grey(255));
    system.advance(W, H, &mut rng);
    assert_eq!(system.iter().next().unwrap().color, Color::grey(253));
}

#[test]
fn red_fade_drops_red_channel() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    let decay = Decay {
        fade: Fade::Red { step: 10, shift: false },
        ..plain_decay()
    };
    let mut spec = still_spec(decay);
    spec.color = ColorPolicy::Fixed { color: Color::YELLOW };
    system.spawn_burst(centre(), &spec, &mut rng);
    system.advance(W, H, &mut rng);
    assert_eq!(system.iter().next().unwrap().color, Color::rgb(245, 255, 0));
}

#[test]
fn truncated_velocity_below_one_does_not_move() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    let decay = Decay {
        motion_scale: 2.0,
        truncate_velocity: true,
        size_step: 0.05,
        lifetime_step: 0.5,
        fade: Fade::None,
    };
    let mut spec = still_spec(decay);
    spec.speed = 0.9;
    spec.count = 20;
    system.spawn_burst(centre(), &spec, &mut rng);
    system.advance(W, H, &mut rng);
    for p in system.iter() {
        assert_relative_eq!(p.position.lateral, 120.0);
        assert_relative_eq!(p.position.vertical, 67.0);
        assert_relative_eq!(p.size, 4.95, epsilon = 1e-5);
        assert_relative_eq!(p.lifetime, 999.5);
    }
}

#[test]
fn size_decay_kills_particle() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    let decay = Decay {
        size_step: 2.5,
        ..plain_decay()
    };
    system.spawn_burst(centre(), &still_spec(decay), &mut rng);
    system.advance(W, H, &mut rng);
    assert_eq!(system.len(), 1);
    system.advance(W, H, &mut rng);
    assert!(system.is_empty());
}

#[test]
fn leaving_the_screen_removes_particle() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    system.spawn_drifting(Vec3Depth::new(0.5, 10.0, 1.0), &still_spec(plain_decay()), -1.0, &mut rng);
    system.advance(W, H, &mut rng);
    assert!(system.is_empty());
}

#[test]
fn tumbling_shards_change_shape() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    let mut spec = BurstSpec::ship_debris();
    spec.count = 1;
    spec.speed = 0.0;
    system.spawn_burst(centre(), &spec, &mut rng);
    let before = system.iter().next().unwrap().fragment;
    system.advance(W, H, &mut rng);
    let after = system.iter().next().unwrap().fragment;
    assert!(matches!(after, Fragment::Rect { .. }));
    assert_ne!(before, after);
}

#[test]
fn clear_empties_system() {
    let mut rng = seeded_rng();
    let mut system = ParticleSystem::new();
    system.spawn_burst(centre(), &BurstSpec::space_explosion(), &mut rng);
    system.clear();
    assert!(system.is_empty());
}
