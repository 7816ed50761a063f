/// Rendering layer — all drawing and terminal I/O lives here.
///
/// `draw_scene` walks an immutable `GameState` and issues `Surface` calls;
/// no game logic is performed. `present` pushes a finished `Canvas` to the
/// terminal, two pixels per cell using upper-half blocks.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Print},
    terminal, QueueableCommand,
};
use rand::Rng;

use perspective_arcade::config::{BuildingConfig, GameConfig};
use perspective_arcade::entities::{Color, GameState, Obstacle, Tilt};
use perspective_arcade::particles::{Anchor, Fragment, Particle};
use perspective_arcade::projection::Projection;
use perspective_arcade::surface::{Canvas, Surface};
use perspective_arcade::tables::drawable_buildings;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_SHIP_SPACE: Color = Color::YELLOW;
const C_SHIP_JET: Color = Color::rgb(100, 100, 255);
const C_FLAME: Color = Color::ORANGE;
const C_BOSS: Color = Color::rgb(128, 0, 128);
const C_MONSTER: Color = Color::rgb(255, 0, 0);
const C_MONSTER_EYE: Color = Color::YELLOW;
const C_POWER_UP: Color = Color::rgb(0, 255, 0);
const C_STAR: Color = Color::WHITE;
const C_TEXT: Color = Color::WHITE;
const C_GRASS: Color = Color::rgb(0, 255, 0);
const C_GRASS_DARK: Color = Color::rgb(0, 180, 0);
const C_GRASS_LIGHT: Color = Color::rgb(20, 220, 20);
const C_BUILDING_SIDE: Color = Color::rgb(100, 100, 100);
const SKY_TOP: (f32, f32, f32) = (135.0, 206.0, 235.0);
const SKY_HORIZON: (f32, f32, f32) = (0.0, 191.0, 255.0);

/// Buildings sink this far into the grass so their base never floats.
const GROUND_OVERLAP: i32 = 10;

// ── Public entry points ───────────────────────────────────────────────────────

/// Draw one complete frame. `rng` only feeds cosmetic flicker (flames,
/// grass speckles) and never touches the simulation.
pub fn draw_scene<S: Surface>(surface: &mut S, state: &GameState, config: &GameConfig, rng: &mut impl Rng) {
    let projection = config.projection;

    match projection {
        Projection::Pinhole { ground_offset, .. } => {
            draw_sky_and_ground(surface, ground_offset as i32, rng);
            if let Some(cfg) = &config.buildings {
                draw_buildings(surface, state, cfg, &projection);
            }
        }
        Projection::InverseDepth => {
            surface.set_color(Color::BLACK);
            surface.clear();
            draw_starfield(surface, state, &projection);
        }
    }

    for obstacle in &state.obstacles {
        draw_obstacle(surface, state, obstacle, &projection);
    }
    for projectile in &state.projectiles {
        let p = projection.project_world(&projectile.position, state.width, state.height);
        surface.set_color(projectile.color);
        surface.circle(p.x, p.y, 2);
    }
    for power_up in &state.power_ups {
        let p = projection.project_world(&power_up.position, state.width, state.height);
        let size = projection.apparent_size(5.0, power_up.position.depth) as i32;
        surface.set_color(C_POWER_UP);
        surface.circle(p.x, p.y, size);
    }

    if !state.is_over() {
        match projection {
            Projection::Pinhole { .. } => draw_jet(surface, state, rng),
            Projection::InverseDepth => draw_space_ship(surface, state),
        }
    }

    for particle in state.particles.iter() {
        draw_particle(surface, state, particle, &projection);
    }

    draw_hud(surface, state);
    if state.is_over() {
        draw_game_over(surface, state);
    }
}

/// Push a canvas to the terminal, scaled to fill it.
pub fn present<W: Write>(out: &mut W, canvas: &Canvas) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let (cols, rows) = (cols.max(1), rows.max(1));
    let (w, h) = canvas.size();
    let sample = |col: u16, sub_row: u32| {
        let x = u32::from(col) * u32::from(w) / u32::from(cols);
        let y = sub_row * u32::from(h) / (u32::from(rows) * 2);
        canvas.pixel(x as i32, y as i32).unwrap_or(Color::BLACK)
    };

    let mut last: Option<(Color, Color)> = None;
    for row in 0..rows {
        out.queue(cursor::MoveTo(0, row))?;
        for col in 0..cols {
            let top = sample(col, u32::from(row) * 2);
            let bottom = sample(col, u32::from(row) * 2 + 1);
            if last != Some((top, bottom)) {
                out.queue(style::SetForegroundColor(term_color(top)))?;
                out.queue(style::SetBackgroundColor(term_color(bottom)))?;
                last = Some((top, bottom));
            }
            out.queue(Print('▀'))?;
        }
    }

    // Text overlays, mapped from canvas pixels to cells
    out.queue(style::SetBackgroundColor(style::Color::Black))?;
    for run in canvas.texts() {
        let col = (run.x.max(0) as u32 * u32::from(cols) / u32::from(w)) as u16;
        let row = (run.y.max(0) as u32 * u32::from(rows) / u32::from(h)) as u16;
        if row >= rows || col >= cols {
            continue;
        }
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(term_color(run.color)))?;
        out.queue(Print(&run.text))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()
}

fn term_color(c: Color) -> style::Color {
    style::Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ── Backdrops ─────────────────────────────────────────────────────────────────

fn draw_sky_and_ground<S: Surface>(surface: &mut S, ground: i32, rng: &mut impl Rng) {
    let (w, h) = surface.size();
    let (w, h) = (i32::from(w), i32::from(h));
    let horizon = (h - ground).max(1);

    for y in 0..horizon {
        let t = y as f32 / horizon as f32;
        let mix = |a: f32, b: f32| (a * (1.0 - t) + b * t) as u8;
        surface.set_color(Color::rgb(
            mix(SKY_TOP.0, SKY_HORIZON.0),
            mix(SKY_TOP.1, SKY_HORIZON.1),
            mix(SKY_TOP.2, SKY_HORIZON.2),
        ));
        surface.line(0, y, w, y);
    }

    surface.set_color(C_GRASS);
    surface.rectangle(0, horizon, w, ground);
    for _ in 0..100 {
        let x = rng.gen_range(0..=w);
        let y = rng.gen_range(horizon..=h);
        surface.set_color(if rng.gen_bool(0.5) { C_GRASS_DARK } else { C_GRASS_LIGHT });
        surface.circle(x, y, 1);
    }
}

fn draw_starfield<S: Surface>(surface: &mut S, state: &GameState, projection: &Projection) {
    let (w, h) = (state.width, state.height);
    surface.set_color(C_STAR);
    for star in &state.stars {
        let lateral = star.lateral - f32::from(w) / 2.0;
        let vertical = star.vertical - f32::from(h) / 2.0;
        let p = projection.project(lateral, vertical, star.depth, w, h);
        surface.circle(p.x, p.y, 1);
    }
}

fn draw_buildings<S: Surface>(surface: &mut S, state: &GameState, cfg: &BuildingConfig, projection: &Projection) {
    let (w, h) = (state.width, state.height);
    for b in drawable_buildings(&state.buildings, cfg) {
        let lateral = b.lateral - f32::from(w) / 2.0;
        let base = projection.project(lateral, 0.0, b.depth, w, h);
        let top = projection.project(lateral, b.height, b.depth, w, h);
        let width = projection.apparent_size(b.width, b.depth) as i32;
        let height = (base.y - top.y).max(0);
        let (x, y) = (base.x - width / 2, top.y + GROUND_OVERLAP);

        // Front face, then a narrower side face; the canvas clips both.
        surface.set_color(b.color);
        surface.rectangle(x, y, width, height);
        let side = width / 4;
        surface.set_color(C_BUILDING_SIDE);
        surface.rectangle(x + width, y + side, side, height - side);
    }
}

// ── Sprites ───────────────────────────────────────────────────────────────────

fn draw_space_ship<S: Surface>(surface: &mut S, state: &GameState) {
    let (x, y) = (state.ship.lateral as i32, state.ship.vertical as i32);
    surface.set_color(C_SHIP_SPACE);
    surface.triangle((x - 10, y), (x + 10, y), (x, y - 20));
}

fn draw_jet<S: Surface>(surface: &mut S, state: &GameState, rng: &mut impl Rng) {
    let (x, y) = (state.ship.lateral as i32, state.ship.vertical as i32);

    surface.set_color(C_FLAME);
    for _ in 0..3 {
        let fx = x + rng.gen_range(-3..=3);
        let fy = y + 12 + rng.gen_range(0..=5);
        surface.circle(fx, fy, rng.gen_range(2..=4));
    }

    // Body, left wing, right wing
    let parts = match state.ship.tilt {
        Tilt::Center => [
            [(x - 15, y + 10), (x + 15, y + 10), (x, y - 15)],
            [(x - 25, y + 5), (x - 5, y + 5), (x - 15, y - 5)],
            [(x + 5, y + 5), (x + 25, y + 5), (x + 15, y - 5)],
        ],
        Tilt::Left => [
            [(x - 10, y + 15), (x + 20, y + 5), (x + 5, y - 15)],
            [(x - 20, y + 10), (x, y + 10), (x - 5, y)],
            [(x + 10, y), (x + 30, y), (x + 20, y - 10)],
        ],
        Tilt::Right => [
            [(x - 20, y + 5), (x + 10, y + 15), (x - 5, y - 15)],
            [(x - 30, y), (x - 10, y), (x - 20, y - 10)],
            [(x, y + 10), (x + 20, y + 10), (x + 5, y)],
        ],
    };
    surface.set_color(C_SHIP_JET);
    for [a, b, c] in parts {
        surface.triangle(a, b, c);
    }
}

fn draw_obstacle<S: Surface>(surface: &mut S, state: &GameState, obstacle: &Obstacle, projection: &Projection) {
    let p = projection.project_world(&obstacle.position, state.width, state.height);
    let (x, y) = (p.x, p.y);
    let size = projection.apparent_size(obstacle.size, obstacle.position.depth) as i32;

    if obstacle.is_boss {
        surface.set_color(C_BOSS);
        surface.circle(x, y, size);
        surface.triangle((x - size * 2, y), (x, y - size), (x, y + size));
        surface.triangle((x + size * 2, y), (x, y - size), (x, y + size));
        let horn = y - size * 3 / 2;
        surface.triangle((x - size / 2, y - size), (x - size / 4, horn), (x, y - size));
        surface.triangle((x + size / 2, y - size), (x + size / 4, horn), (x, y - size));
        surface.set_color(C_MONSTER);
        surface.circle(x - size / 3, y - size / 3, size / 4);
        surface.circle(x + size / 3, y - size / 3, size / 4);
    } else {
        surface.set_color(C_MONSTER);
        surface.circle(x, y, size / 2);
        surface.triangle((x - size, y), (x, y - size / 2), (x, y + size / 2));
        surface.triangle((x + size, y), (x, y - size / 2), (x, y + size / 2));
        surface.set_color(C_MONSTER_EYE);
        surface.circle(x, y - size / 4, size / 4);
    }
}

fn draw_particle<S: Surface>(surface: &mut S, state: &GameState, particle: &Particle, projection: &Projection) {
    let (x, y, size) = match particle.anchor {
        Anchor::Screen => (
            particle.position.lateral as i32,
            particle.position.vertical as i32,
            particle.size,
        ),
        Anchor::World => {
            let p = projection.project_world(&particle.position, state.width, state.height);
            (p.x, p.y, projection.apparent_size(particle.size, particle.position.depth))
        }
    };

    surface.set_color(particle.color);
    match particle.fragment {
        Fragment::Circle => surface.circle(x, y, size.max(1.0) as i32),
        Fragment::Rect { width, height } => surface.rectangle(
            x - (width / 2.0) as i32,
            y - (height / 2.0) as i32,
            width as i32,
            height as i32,
        ),
    }
}

// ── HUD & overlays ────────────────────────────────────────────────────────────

fn draw_hud<S: Surface>(surface: &mut S, state: &GameState) {
    surface.set_color(C_TEXT);
    surface.text(&format!("Score: {}", state.score), 10, 10, 2);
    if state.special_weapon.active {
        surface.set_color(Color::CYAN);
        surface.text(&format!("SPECIAL {}", state.special_weapon.timer), 10, 25, 1);
    }
}

fn draw_game_over<S: Surface>(surface: &mut S, state: &GameState) {
    let (cx, cy) = (i32::from(state.width) / 2, i32::from(state.height) / 2);
    surface.set_color(C_TEXT);
    surface.text("Game Over!", cx - 50, cy - 10, 2);
    surface.text("Press A to restart", cx - 70, cy + 20, 1);
}
