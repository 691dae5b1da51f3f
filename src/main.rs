use std::fs;
use std::io::{self, Stdout};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use maze_game::config::Settings;
use maze_game::layout::{derive_wall_segments_styled, LayoutStyle};
use maze_game::physics::{PhysicsWorld, RapierWorld};
use maze_game::render::{Frame, Renderer, CELL_W};
use maze_game::session::{GameSession, SessionSettings};
use maze_game::{generate_maze, Direction};

/// Ball speed added per key press, in cells per second.
const NUDGE_PER_UNIT: f32 = 3.0;
/// Fall acceleration after the win, in cells per second squared.
const WIN_GRAVITY_PER_UNIT: f32 = 4.0;
const MIN_UNIT: f32 = 2.0;

struct Game {
    session: GameSession<RapierWorld>,
    frame: Frame,
    rows: usize,
    cols: usize,
    seed: u64,
    path_len: Option<usize>,
}

impl Game {
    fn hud(&self) -> String {
        let path = self
            .path_len
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        if self.session.is_won() {
            format!("You win! Path was {path} cells.  (n new maze, q quit)")
        } else {
            format!(
                "Maze {}x{}  Seed: {}  Path: {}  (wasd/arrows roll, n new maze, q quit)",
                self.rows, self.cols, self.seed, path
            )
        }
    }
}

fn main() -> Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings.log_dir)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &settings);
    if let Err(err) = &result {
        error!("{err:#}");
    }

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn init_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    let file_appender = tracing_appender::rolling::never(dir, "maze.log");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("maze_game=info,maze=info"));

    // The terminal is in raw mode while playing, so logs only go to the file.
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, settings: &Settings) -> Result<()> {
    let seed = settings.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut game = new_game(settings, seed, terminal::size()?)?;
    let mut renderer = Renderer::new();
    let tick = Duration::from_millis(settings.tick_ms);
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('n') => {
                            let next_seed = game.seed.wrapping_add(1);
                            if replace_game(&mut game, settings, next_seed, terminal::size()?) {
                                renderer.invalidate();
                            }
                        }
                        code => {
                            if let Some(dir) = direction_for(code) {
                                game.session.nudge(dir);
                            }
                        }
                    }
                }
                Event::Resize(..) => renderer.invalidate(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
            let was_won = game.session.is_won();
            game.session.tick();
            if !was_won && game.session.is_won() {
                info!(seed = game.seed, "maze solved");
            }
        }

        game.frame.rasterize(game.session.world().bodies());
        renderer.render(stdout, &game.frame, &game.hud())?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

/// Swaps in a fresh maze. If it cannot be built the current one stays in play.
fn replace_game(game: &mut Game, settings: &Settings, seed: u64, term: (u16, u16)) -> bool {
    match new_game(settings, seed, term) {
        Ok(next) => {
            *game = next;
            true
        }
        Err(err) => {
            warn!(seed, "keeping current maze: {err:#}");
            false
        }
    }
}

/// Sizes the play area from a `(cols, rows)` terminal and builds a fresh maze in it.
fn new_game(settings: &Settings, seed: u64, (term_w, term_h): (u16, u16)) -> Result<Game> {
    // one row for the HUD, one spare below the play area
    let frame_w = term_w as usize / CELL_W;
    let frame_h = (term_h as usize).saturating_sub(2);
    let world_w = frame_w.saturating_sub(1) as f32;
    let world_h = frame_h.saturating_sub(1) as f32;
    let unit_w = world_w / settings.cols as f32;
    let unit_h = world_h / settings.rows as f32;
    if unit_w < MIN_UNIT || unit_h < MIN_UNIT {
        bail!(
            "terminal {}x{} is too small for a {}x{} maze",
            term_w,
            term_h,
            settings.rows,
            settings.cols
        );
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let maze = generate_maze(settings.rows, settings.cols, &mut rng)?;
    let style = LayoutStyle::default();
    let segments =
        derive_wall_segments_styled(&maze.horizontals, &maze.verticals, unit_w, unit_h, &style)?;

    let world = RapierWorld::new(settings.tick_ms as f32 / 1000.0);
    let unit = unit_w.min(unit_h);
    let session = GameSession::new(
        world,
        &segments,
        SessionSettings {
            width: world_w,
            height: world_h,
            boundary_thickness: style.wall_thickness,
            nudge: unit * NUDGE_PER_UNIT,
            win_gravity: unit_h * WIN_GRAVITY_PER_UNIT,
        },
    )?;
    let path_len = maze.solution_length();
    info!(
        seed,
        rows = settings.rows,
        cols = settings.cols,
        unit_w,
        unit_h,
        ?path_len,
        "new maze"
    );

    Ok(Game {
        session,
        frame: Frame::new(frame_w, frame_h),
        rows: settings.rows,
        cols: settings.cols,
        seed,
        path_len,
    })
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Direction::Up),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Direction::Right),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Direction::Down),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Direction::Left),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOMY: (u16, u16) = (120, 40);

    #[test]
    fn new_game_fits_the_terminal() {
        let settings = Settings::default();
        let game = new_game(&settings, 7, ROOMY).unwrap();
        assert_eq!(game.frame.width, 60);
        assert_eq!(game.frame.height, 38);
        assert_eq!(game.seed, 7);
        assert!(game.path_len.is_some());
        assert!(!game.session.is_won());
    }

    #[test]
    fn tiny_terminal_is_rejected() {
        assert!(new_game(&Settings::default(), 7, (20, 10)).is_err());
    }

    #[test]
    fn failed_new_maze_keeps_the_current_one() {
        let settings = Settings::default();
        let mut game = new_game(&settings, 7, ROOMY).unwrap();

        assert!(!replace_game(&mut game, &settings, 8, (20, 10)));
        assert_eq!(game.seed, 7);

        assert!(replace_game(&mut game, &settings, 8, ROOMY));
        assert_eq!(game.seed, 8);
    }

    #[test]
    fn movement_keys_map_to_directions() {
        assert_eq!(direction_for(KeyCode::Char('w')), Some(Direction::Up));
        assert_eq!(direction_for(KeyCode::Right), Some(Direction::Right));
        assert_eq!(direction_for(KeyCode::Char('S')), Some(Direction::Down));
        assert_eq!(direction_for(KeyCode::Left), Some(Direction::Left));
        assert_eq!(direction_for(KeyCode::Char('n')), None);
    }
}
