//! Game configuration.
//!
//! Each entity table is optional: a variant is just the set of tables it
//! switches on plus their tuning. `GameConfig::space()` and
//! `GameConfig::city()` are the two built-in games; a TOML file can
//! describe anything in between.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entities::{Buttons, Color, Controls};
use crate::error::ConfigError;
use crate::particles::{BurstSpec, Span};
use crate::projection::Projection;

// ── Variants ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Starfield shooter with auto-fire, bosses and power-ups
    Space,
    /// Jet dodging buildings over a city
    City,
}

impl Variant {
    pub fn config(self) -> GameConfig {
        match self {
            Variant::Space => GameConfig::space(),
            Variant::City => GameConfig::city(),
        }
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u16,
    pub height: u16,
    /// Nominal sleep between frames, best effort.
    pub frame_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 135,
            frame_ms: 20,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Button {
    A,
    B,
    X,
    Y,
}

/// Which physical button drives which control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonMap {
    pub up: Button,
    pub down: Button,
    pub left: Button,
    pub right: Button,
    pub restart: Button,
}

impl ButtonMap {
    pub fn resolve(&self, buttons: Buttons) -> Controls {
        let held = |button: Button| match button {
            Button::A => buttons.a,
            Button::B => buttons.b,
            Button::X => buttons.x,
            Button::Y => buttons.y,
        };
        Controls {
            up: held(self.up),
            down: held(self.down),
            left: held(self.left),
            right: held(self.right),
            restart: held(self.restart),
        }
    }

    pub fn space() -> Self {
        Self {
            up: Button::X,
            down: Button::Y,
            left: Button::A,
            right: Button::B,
            restart: Button::A,
        }
    }

    pub fn city() -> Self {
        Self {
            up: Button::A,
            down: Button::X,
            left: Button::B,
            right: Button::Y,
            restart: Button::A,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    /// Pixels moved per frame per held direction.
    pub speed: f32,
    /// The ship never moves closer than this to a screen edge.
    pub margin: f32,
    pub buttons: ButtonMap,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            margin: 20.0,
            buttons: ButtonMap::space(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub count: usize,
    pub speed: f32,
    /// Depth a recycled star is reset into.
    pub depth: Span,
    /// Stars at or below this depth are recycled.
    pub recycle_depth: f32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 50,
            speed: 0.01,
            depth: Span::new(0.1, 1.0),
            recycle_depth: 0.1,
        }
    }
}

/// Skyline laid out across the screen at (re)start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkylineConfig {
    pub width: f32,
    pub gap: Span,
    pub height: Span,
    pub depth: Span,
    pub colors: Vec<Color>,
}

impl Default for SkylineConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            gap: Span::new(10.0, 30.0),
            height: Span::new(50.0, 150.0),
            depth: Span::new(10.0, 20.0),
            colors: vec![Color::LIGHT_GRAY, Color::TAN],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub speed: f32,
    /// Only the first `max_visible` buildings move and are drawn.
    pub max_visible: usize,
    pub spawn_rate: u32,
    /// Buildings at or below this depth are dropped.
    pub cull_depth: f32,
    /// Buildings are drawn only beyond this depth.
    pub draw_depth: f32,
    /// Open depth band in which a building can hit the ship.
    pub collision_depth: Span,
    pub spawn_depth: Span,
    pub width: Span,
    pub height: Span,
    pub colors: Vec<Color>,
    pub skyline: SkylineConfig,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            speed: 0.4,
            max_visible: 2,
            spawn_rate: 10,
            cull_depth: 7.0,
            draw_depth: 9.0,
            collision_depth: Span::new(7.0, 9.0),
            spawn_depth: Span::new(15.0, 20.0),
            width: Span::new(30.0, 80.0),
            height: Span::new(60.0, 200.0),
            colors: vec![Color::DARK_GRAY, Color::LIGHT_GRAY],
            skyline: SkylineConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// A boss replaces the next spawn each time the score hits a multiple of this.
    pub every: u32,
    pub size: f32,
    pub health: i32,
    pub score: u32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            every: 100,
            size: 15.0,
            health: 10,
            score: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub speed: f32,
    pub spawn_rate: u32,
    pub spawn_depth: Span,
    pub cull_depth: f32,
    /// Obstacles at or below this depth have passed the ship.
    pub escape_depth: f32,
    pub size: f32,
    pub health: i32,
    pub kill_score: u32,
    pub escape_score: u32,
    /// Projectiles only hit obstacles at or below this depth.
    pub min_collision_distance: f32,
    /// Hit radius before the depth-scaled obstacle size is added.
    pub hit_radius: f32,
    pub boss: BossConfig,
    pub explosion: BurstSpec,
    pub boss_explosion: BurstSpec,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            speed: 0.1,
            spawn_rate: 30,
            spawn_depth: Span::new(10.0, 15.0),
            cull_depth: 0.1,
            escape_depth: 1.0,
            size: 5.0,
            health: 1,
            kill_score: 10,
            escape_score: 1,
            min_collision_distance: 5.0,
            hit_radius: 10.0,
            boss: BossConfig::default(),
            explosion: BurstSpec::space_explosion(),
            boss_explosion: BurstSpec::space_boss_explosion(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f32,
    /// Projectiles at or beyond this depth are dropped.
    pub max_depth: f32,
    pub launch_depth: f32,
    /// Frames between volleys.
    pub fire_cooldown_frames: u32,
    /// Auto-fire when an obstacle is laterally within this of the ship...
    pub aim_window: f32,
    /// ...and closer than this depth.
    pub aim_depth: f32,
    /// Lateral offset of the side shots while the special weapon is active.
    pub special_spread: f32,
    pub color: Color,
    pub special_color: Color,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 0.2,
            max_depth: 20.0,
            launch_depth: 1.0,
            fire_cooldown_frames: 4,
            aim_window: 20.0,
            aim_depth: 5.0,
            special_spread: 10.0,
            color: Color::WHITE,
            special_color: Color::CYAN,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub speed: f32,
    pub spawn_rate: u32,
    pub spawn_depth: Span,
    pub cull_depth: f32,
    pub pickup_radius: f32,
    /// Frames the special weapon stays active after a pickup.
    pub duration: u32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            speed: 0.1,
            spawn_rate: 200,
            spawn_depth: Span::new(10.0, 15.0),
            cull_depth: 0.1,
            pickup_radius: 15.0,
            duration: 500,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeConfig {
    pub puff: BurstSpec,
    /// Vertical offset of the exhaust below the ship.
    pub trail_offset: f32,
    /// Lateral offset of the wing-tip puff while tilting.
    pub wing_offset: f32,
    /// Extra lateral velocity of wing-tip smoke, away from the raised wing.
    pub drift: f32,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            puff: BurstSpec::smoke(),
            trail_offset: 10.0,
            wing_offset: 20.0,
            drift: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashConfig {
    /// Burst at the ship.
    pub ship: BurstSpec,
    /// Burst at the thing it hit.
    pub wreck: BurstSpec,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            ship: BurstSpec::ship_debris(),
            wreck: BurstSpec::wreck_debris(),
        }
    }
}

// ── Aggregate ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    /// Fixed RNG seed for deterministic replay.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_projection")]
    pub projection: Projection,
    #[serde(default)]
    pub ship: ShipConfig,
    #[serde(default)]
    pub crash: CrashConfig,
    #[serde(default)]
    pub stars: Option<StarfieldConfig>,
    #[serde(default)]
    pub buildings: Option<BuildingConfig>,
    #[serde(default)]
    pub obstacles: Option<ObstacleConfig>,
    #[serde(default)]
    pub projectiles: Option<ProjectileConfig>,
    #[serde(default)]
    pub power_ups: Option<PowerUpConfig>,
    #[serde(default)]
    pub smoke: Option<SmokeConfig>,
}

fn default_projection() -> Projection {
    Projection::InverseDepth
}

impl GameConfig {
    pub fn space() -> Self {
        Self {
            display: DisplayConfig::default(),
            seed: None,
            projection: Projection::InverseDepth,
            ship: ShipConfig::default(),
            crash: CrashConfig {
                ship: BurstSpec::ship_debris(),
                wreck: BurstSpec::space_boss_explosion(),
            },
            stars: Some(StarfieldConfig::default()),
            buildings: None,
            obstacles: Some(ObstacleConfig::default()),
            projectiles: Some(ProjectileConfig::default()),
            power_ups: Some(PowerUpConfig::default()),
            smoke: None,
        }
    }

    pub fn city() -> Self {
        Self {
            display: DisplayConfig::default(),
            seed: None,
            projection: Projection::Pinhole {
                focal_length: 10.0,
                ground_offset: 20.0,
            },
            ship: ShipConfig {
                speed: 6.0,
                margin: 20.0,
                buttons: ButtonMap::city(),
            },
            crash: CrashConfig::default(),
            stars: None,
            buildings: Some(BuildingConfig::default()),
            obstacles: None,
            projectiles: None,
            power_ups: None,
            smoke: Some(SmokeConfig::default()),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.display;
        if d.width == 0 || d.height == 0 {
            return Err(invalid("display must be at least 1x1"));
        }
        if d.frame_ms == 0 {
            return Err(invalid("display.frame_ms must be positive"));
        }
        if let Projection::Pinhole { focal_length, .. } = self.projection {
            if focal_length <= 0.0 {
                return Err(invalid("projection.focal_length must be positive"));
            }
        }
        if self.ship.speed < 0.0 {
            return Err(invalid("ship.speed must not be negative"));
        }

        if let Some(s) = &self.stars {
            check_positive("stars.speed", s.speed)?;
            check_span("stars.depth", &s.depth)?;
        }
        if let Some(b) = &self.buildings {
            check_positive("buildings.speed", b.speed)?;
            for (name, span) in [
                ("buildings.collision_depth", &b.collision_depth),
                ("buildings.spawn_depth", &b.spawn_depth),
                ("buildings.width", &b.width),
                ("buildings.height", &b.height),
                ("buildings.skyline.gap", &b.skyline.gap),
                ("buildings.skyline.height", &b.skyline.height),
                ("buildings.skyline.depth", &b.skyline.depth),
            ] {
                check_span(name, span)?;
            }
            check_positive("buildings.skyline.width", b.skyline.width)?;
            if b.colors.is_empty() || b.skyline.colors.is_empty() {
                return Err(invalid("buildings need at least one colour"));
            }
        }
        if let Some(o) = &self.obstacles {
            check_positive("obstacles.speed", o.speed)?;
            check_positive("obstacles.cull_depth", o.cull_depth)?;
            check_span("obstacles.spawn_depth", &o.spawn_depth)?;
            if o.boss.every == 0 {
                return Err(invalid("obstacles.boss.every must be positive"));
            }
        }
        if let Some(p) = &self.projectiles {
            check_positive("projectiles.speed", p.speed)?;
            check_positive("projectiles.launch_depth", p.launch_depth)?;
            if p.max_depth <= p.launch_depth {
                return Err(invalid("projectiles.max_depth must exceed launch_depth"));
            }
        }
        if let Some(p) = &self.power_ups {
            check_positive("power_ups.speed", p.speed)?;
            check_positive("power_ups.cull_depth", p.cull_depth)?;
            check_span("power_ups.spawn_depth", &p.spawn_depth)?;
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::space()
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}

fn check_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

fn check_span(name: &str, span: &Span) -> Result<(), ConfigError> {
    if span.is_ordered() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} is inverted ({} > {})",
            span.min, span.max
        )))
    }
}
