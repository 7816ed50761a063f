/// Decaying visual fragments — smoke trails, explosions, ship debris.
///
/// Particles live apart from the entities that spawned them so a destroyed
/// obstacle can leave its explosion behind. Every step is one frame: size,
/// lifetime and colour shrink by fixed amounts regardless of wall-clock time.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entities::{Color, Vec3Depth};

// ── Burst description ─────────────────────────────────────────────────────────

/// Inclusive sampling range. `min == max` always yields `min`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorPolicy {
    Fixed { color: Color },
    RandomFrom { colors: Vec<Color> },
}

impl ColorPolicy {
    fn pick(&self, rng: &mut impl Rng) -> Color {
        match self {
            ColorPolicy::Fixed { color } => *color,
            ColorPolicy::RandomFrom { colors } if colors.is_empty() => Color::WHITE,
            ColorPolicy::RandomFrom { colors } => colors[rng.gen_range(0..colors.len())],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FragmentShape {
    Circle,
    Rectangle { width: f32, height: f32 },
    /// Rectangle cut at a random angle from the particle's size. With
    /// `tumble` the angle is re-rolled every frame.
    Shard { tumble: bool },
}

/// Whether the renderer draws a particle at its raw coordinates or runs it
/// through the projection first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Screen,
    World,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fade {
    None,
    /// All channels drop together; the particle dies at black.
    Grey { step: u8 },
    /// Red drops by `step`; with `shift`, green or blue also drifts by 10.
    Red { step: u8, shift: bool },
}

/// Per-frame decay rates for one kind of particle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decay {
    pub motion_scale: f32,
    /// Drop the fractional part of the velocity before moving.
    #[serde(default)]
    pub truncate_velocity: bool,
    pub size_step: f32,
    pub lifetime_step: f32,
    pub fade: Fade,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BurstSpec {
    pub count: usize,
    /// Lateral velocity is drawn from `-speed..=speed`.
    pub speed: f32,
    /// Vertical velocity range; defaults to `speed` when absent.
    #[serde(default)]
    pub vertical_speed: Option<f32>,
    pub size: Span,
    pub lifetime: Span,
    pub color: ColorPolicy,
    pub shape: FragmentShape,
    pub anchor: Anchor,
    pub decay: Decay,
}

// ── Presets ───────────────────────────────────────────────────────────────────

impl BurstSpec {
    /// Single smoke puff; emitted one at a time with a sideways drift.
    pub fn smoke() -> Self {
        Self {
            count: 1,
            speed: 1.0,
            vertical_speed: Some(0.5),
            size: Span::new(2.0, 4.0),
            lifetime: Span::new(10.0, 20.0),
            color: ColorPolicy::Fixed { color: Color::grey(255) },
            shape: FragmentShape::Circle,
            anchor: Anchor::Screen,
            decay: Decay {
                motion_scale: 1.0,
                truncate_velocity: false,
                size_step: 0.0,
                lifetime_step: 1.0,
                fade: Fade::Grey { step: 2 },
            },
        }
    }

    fn space_decay() -> Decay {
        Decay {
            motion_scale: 1.0,
            truncate_velocity: false,
            size_step: 0.0,
            lifetime_step: 1.0,
            fade: Fade::None,
        }
    }

    fn city_decay() -> Decay {
        Decay {
            motion_scale: 2.0,
            truncate_velocity: true,
            size_step: 0.05,
            lifetime_step: 0.5,
            fade: Fade::Red { step: 5, shift: true },
        }
    }

    pub fn space_explosion() -> Self {
        Self {
            count: 10,
            speed: 1.0,
            vertical_speed: None,
            size: Span::fixed(5.0),
            lifetime: Span::fixed(10.0),
            color: ColorPolicy::Fixed { color: Color::ORANGE },
            shape: FragmentShape::Circle,
            anchor: Anchor::World,
            decay: Self::space_decay(),
        }
    }

    pub fn space_boss_explosion() -> Self {
        Self {
            count: 50,
            speed: 2.0,
            vertical_speed: None,
            size: Span::fixed(10.0),
            lifetime: Span::fixed(20.0),
            color: ColorPolicy::RandomFrom {
                colors: vec![Color::YELLOW, Color::ORANGE],
            },
            shape: FragmentShape::Circle,
            anchor: Anchor::World,
            decay: Self::space_decay(),
        }
    }

    /// Obstacle kill under the pinhole camera: chunky rectangular fragments
    /// that fall apart with the red fade.
    pub fn city_explosion() -> Self {
        Self {
            count: 50,
            speed: 3.0,
            vertical_speed: None,
            size: Span::fixed(6.0),
            lifetime: Span::fixed(15.0),
            color: ColorPolicy::Fixed { color: Color::RED_ORANGE },
            shape: FragmentShape::Rectangle { width: 3.0, height: 2.0 },
            anchor: Anchor::World,
            decay: Self::city_decay(),
        }
    }

    pub fn city_boss_explosion() -> Self {
        Self {
            count: 150,
            speed: 4.0,
            vertical_speed: None,
            size: Span::fixed(10.0),
            lifetime: Span::fixed(20.0),
            color: ColorPolicy::Fixed { color: Color::DEEP_ORANGE },
            shape: FragmentShape::Rectangle { width: 3.0, height: 2.0 },
            anchor: Anchor::World,
            decay: Self::city_decay(),
        }
    }

    /// Large, long-lived burst left where the ship was destroyed.
    pub fn ship_debris() -> Self {
        Self {
            count: 300,
            speed: 8.0,
            vertical_speed: None,
            size: Span::new(4.0, 12.0),
            lifetime: Span::new(30.0, 70.0),
            color: ColorPolicy::Fixed { color: Color::YELLOW },
            shape: FragmentShape::Shard { tumble: true },
            anchor: Anchor::Screen,
            decay: Decay {
                motion_scale: 2.0,
                truncate_velocity: false,
                size_step: 0.2,
                lifetime_step: 1.0,
                fade: Fade::Red { step: 10, shift: false },
            },
        }
    }

    /// Secondary burst at whatever the ship crashed into.
    pub fn wreck_debris() -> Self {
        Self {
            count: 200,
            speed: 5.0,
            vertical_speed: None,
            size: Span::new(4.0, 10.0),
            lifetime: Span::new(20.0, 50.0),
            color: ColorPolicy::RandomFrom {
                colors: vec![Color::RED_ORANGE, Color::ORANGE],
            },
            shape: FragmentShape::Shard { tumble: false },
            anchor: Anchor::Screen,
            decay: Self::city_decay(),
        }
    }
}

// ── Particles ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fragment {
    Circle,
    Rect { width: f32, height: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3Depth,
    pub size: f32,
    pub color: Color,
    pub lifetime: f32,
    pub velocity: (f32, f32),
    pub fragment: Fragment,
    pub tumble: bool,
    pub anchor: Anchor,
    pub decay: Decay,
}

fn shard(size: f32, rng: &mut impl Rng) -> Fragment {
    let angle = rng.gen_range(0.0..TAU);
    Fragment::Rect {
        width: size * angle.cos(),
        height: size * angle.sin(),
    }
}

impl Particle {
    /// Advance one frame. Returns `false` once the particle should go.
    fn step(&mut self, width: f32, height: f32, rng: &mut impl Rng) -> bool {
        let (mut vx, mut vy) = self.velocity;
        if self.decay.truncate_velocity {
            vx = vx.trunc();
            vy = vy.trunc();
        }
        self.position.lateral += vx * self.decay.motion_scale;
        self.position.vertical += vy * self.decay.motion_scale;
        self.size = (self.size - self.decay.size_step).max(0.0);
        self.lifetime -= self.decay.lifetime_step;

        let mut faded_out = false;
        match self.decay.fade {
            Fade::None => {}
            Fade::Grey { step } => {
                let level = self.color.r.saturating_sub(step);
                self.color = Color::grey(level);
                faded_out = level == 0;
            }
            Fade::Red { step, shift } => {
                if self.color.r > step {
                    self.color.r -= step;
                    if shift {
                        if rng.gen_bool(0.5) {
                            self.color.g = self.color.g.saturating_sub(10);
                        } else {
                            self.color.b = self.color.b.saturating_add(10);
                        }
                    }
                } else {
                    self.color.r = 0;
                }
            }
        }

        if self.tumble {
            self.fragment = shard(self.size, rng);
        }

        let p = &self.position;
        let on_screen = p.lateral >= 0.0 && p.lateral <= width && p.vertical >= 0.0 && p.vertical <= height;
        self.lifetime > 0.0 && self.size > 0.0 && !faded_out && on_screen
    }
}

// ── System ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `spec.count` particles at `origin`.
    pub fn spawn_burst(&mut self, origin: Vec3Depth, spec: &BurstSpec, rng: &mut impl Rng) {
        self.spawn_drifting(origin, spec, 0.0, rng);
    }

    /// Like `spawn_burst`, with `drift` added to every lateral velocity.
    pub fn spawn_drifting(&mut self, origin: Vec3Depth, spec: &BurstSpec, drift: f32, rng: &mut impl Rng) {
        let vertical_speed = spec.vertical_speed.unwrap_or(spec.speed);
        self.particles.reserve(spec.count);
        for _ in 0..spec.count {
            let vx = symmetric(spec.speed, rng) + drift;
            let vy = symmetric(vertical_speed, rng);
            let size = spec.size.sample(rng);
            let lifetime = spec.lifetime.sample(rng);
            let color = spec.color.pick(rng);
            let (fragment, tumble) = match spec.shape {
                FragmentShape::Circle => (Fragment::Circle, false),
                FragmentShape::Rectangle { width, height } => (Fragment::Rect { width, height }, false),
                FragmentShape::Shard { tumble } => (shard(size, rng), tumble),
            };
            self.particles.push(Particle {
                position: origin,
                size,
                color,
                lifetime,
                velocity: (vx, vy),
                fragment,
                tumble,
                anchor: spec.anchor,
                decay: spec.decay,
            });
        }
    }

    /// Run one frame of decay over every particle, dropping the dead ones.
    pub fn advance(&mut self, width: u16, height: u16, rng: &mut impl Rng) {
        let (w, h) = (f32::from(width), f32::from(height));
        self.particles.retain_mut(|p| p.step(w, h, rng));
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

fn symmetric(range: f32, rng: &mut impl Rng) -> f32 {
    if range > 0.0 {
        rng.gen_range(-range..=range)
    } else {
        0.0
    }
}
