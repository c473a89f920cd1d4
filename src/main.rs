use std::fs::File;
use std::io::{self, Stdout};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pacmaze::config::Settings;
use pacmaze::game::Game;
use pacmaze::grid::Dir;
use pacmaze::render::Renderer;

enum Action {
    Steer(Dir),
    Restart,
    Skip,
    Quit,
}

fn main() -> Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode().context("enabling raw mode")?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &settings);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode().context("restoring terminal")?;
    result
}

/// The terminal is in raw mode, so events only go somewhere when a log file
/// is configured.
fn init_logging(settings: &Settings) -> Result<()> {
    let Some(path) = &settings.log_path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, settings: &Settings) -> Result<()> {
    let mut rng = match settings.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let mut game = Game::new(settings, &mut rng)?;
    let mut renderer = Renderer::new();
    let tick = Duration::from_millis(settings.tick_ms);
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));
    let mut last_tick = Instant::now();
    info!(seed = ?settings.seed, tick_ms = settings.tick_ms, "starting");

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            match action_for(key.code) {
                Some(Action::Quit) => return Ok(()),
                Some(Action::Steer(dir)) => {
                    game.steer(dir);
                }
                Some(Action::Restart) => {
                    game.restart(&mut rng)?;
                    renderer.invalidate();
                }
                Some(Action::Skip) => {
                    if game.skip_level(&mut rng)? {
                        renderer.invalidate();
                    }
                }
                None => {}
            }
        }

        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
            game.tick(&mut rng)?;
        }
        renderer.render(stdout, &game)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn action_for(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('r') => Some(Action::Restart),
        KeyCode::Char('n') => Some(Action::Skip),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Steer(Dir::Up)),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Steer(Dir::Down)),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::Steer(Dir::Left)),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::Steer(Dir::Right)),
        _ => None,
    }
}
