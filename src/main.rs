mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use env_logger::Env;
use rand::{rngs::StdRng, thread_rng, SeedableRng};

use perspective_arcade::compute::{init_state, tick};
use perspective_arcade::config::{Button, ButtonMap, GameConfig, Variant};
use perspective_arcade::entities::Buttons;
use perspective_arcade::error::Result;
use perspective_arcade::surface::Canvas;

#[derive(Parser, Debug)]
#[command(version, about = "Pseudo-3D arcade games in the terminal")]
struct Cli {
    /// Built-in game to start; skips the menu
    #[arg(short, long, value_enum)]
    variant: Option<Variant>,

    /// TOML file describing the game; takes precedence over --variant
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed the simulation RNG for a repeatable run
    #[arg(long)]
    seed: Option<u64>,
}

// ── Held-key input ────────────────────────────────────────────────────────────

/// A key counts as held if its last press/repeat event arrived within this
/// many frames. Covers terminals that never send key-release events: OS
/// key-repeat refreshes it before it expires.
const HOLD_WINDOW: u64 = 6;

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Fold the held keys into one button poll. Letter keys are the buttons
/// themselves; arrows go through the variant's map so they always steer
/// the way they point. Enter presses whichever button restarts.
fn poll_buttons(key_frame: &HashMap<KeyCode, u64>, map: &ButtonMap, frame: u64) -> Buttons {
    let mut buttons = Buttons::default();
    let mut press = |button: Button| match button {
        Button::A => buttons.a = true,
        Button::B => buttons.b = true,
        Button::X => buttons.x = true,
        Button::Y => buttons.y = true,
    };

    let bindings = [
        (KeyCode::Char('a'), Button::A),
        (KeyCode::Char('b'), Button::B),
        (KeyCode::Char('x'), Button::X),
        (KeyCode::Char('y'), Button::Y),
        (KeyCode::Up, map.up),
        (KeyCode::Down, map.down),
        (KeyCode::Left, map.left),
        (KeyCode::Right, map.right),
        (KeyCode::Enter, map.restart),
    ];
    for (key, button) in bindings {
        if is_held(key_frame, &key, frame) {
            press(button);
        }
    }
    buttons
}

fn normalise(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Variant),
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    out.queue(style::ResetColor)?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  PERSPECTIVE  ARCADE  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(5),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select game:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Space", Color::Yellow, "Auto-fire through a starfield, bosses every 100"),
        ("2", "City ", Color::Blue, "Fly low and dodge the skyline"),
    ];
    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(10), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<6}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Arrows or A B X Y : Fly   Enter : Restart   M : Menu   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match normalise(code) {
                KeyCode::Char('1') => return Ok(MenuResult::Start(Variant::Space)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(Variant::City)),
                KeyCode::Char('q') | KeyCode::Esc => return Ok(MenuResult::Quit),
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program, `false` → back to menu.
///
/// Every frame the held keys are folded into a `Buttons` poll and handed to
/// `tick`; the simulation owns restart, so game over needs no special case
/// here.
fn game_loop<W: Write>(
    out: &mut W,
    config: &GameConfig,
    seed: Option<u64>,
    rx: &mpsc::Receiver<Event>,
) -> Result<bool> {
    let mut rng = match seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut cosmetic = thread_rng();
    let frame_time = Duration::from_millis(config.display.frame_ms);

    let mut state = init_state(config, &mut rng);
    let mut canvas = Canvas::new(config.display.width, config.display.height);
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    log::info!("game started: {}x{}", state.width, state.height);

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            let code = normalise(code);
            match kind {
                KeyEventKind::Press => {
                    match code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('m') => return Ok(false),
                        _ => {}
                    }
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let buttons = poll_buttons(&key_frame, &config.ship.buttons, frame);
        let was_over = state.is_over();
        state = tick(&state, buttons, config, &mut rng);
        if !was_over && state.is_over() {
            log::info!("game over, score {}", state.score);
        }

        display::draw_scene(&mut canvas, &state, config, &mut cosmetic);
        display::present(out, &canvas)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("off")).init();
    let cli = Cli::parse();

    // Resolve the config before touching the terminal so errors print cleanly.
    let preset = match (&cli.config, cli.variant) {
        (Some(path), _) => Some(GameConfig::load(path)?),
        (None, Some(variant)) => Some(variant.config()),
        (None, None) => None,
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking event reads live on their own thread so the frame loop never waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, preset, cli.seed);

    // Restore the terminal whether or not the game loop failed
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(style::ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    preset: Option<GameConfig>,
    seed: Option<u64>,
) -> Result<()> {
    if let Some(config) = preset {
        game_loop(out, &config, seed, rx)?;
        return Ok(());
    }

    loop {
        match show_menu(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start(variant) => {
                let quit = game_loop(out, &variant.config(), seed, rx)?;
                if quit {
                    break;
                }
            }
        }
    }
    Ok(())
}
