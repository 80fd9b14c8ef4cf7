//! TETRAD - falling blocks in the terminal
//!
//! The engine runs on a tokio task; this thread only draws snapshots and
//! forwards key presses.

mod input;
mod ui;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use input::KeyMap;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};
use tetrad::session::{self, SessionHandle};
use tetrad::settings::Settings;
use tetrad::{Command, Status};
use tracing_subscriber::filter::{Directive, EnvFilter};

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Input delay after game over to prevent accidental exit
const GAME_OVER_INPUT_DELAY: Duration = Duration::from_secs(1);

/// Get the tetrad temp directory, creating it if needed
fn tetrad_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("tetrad");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let tetrad_dir = tetrad_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&tetrad_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let directive: Directive = "tetrad=debug".parse().map_err(io::Error::other)?;
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_ansi(false)
        .init();

    tracing::info!(
        "TETRAD starting up, session={:08x}, log={}",
        session_id,
        tetrad_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    // Write out the defaults on first run so there is a file to edit
    if Settings::settings_path().is_some_and(|path| !path.exists()) {
        if let Err(err) = settings.save() {
            tracing::warn!(%err, "could not write default settings");
        }
    }

    let seed = settings.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "piece seed");

    let runtime = tokio::runtime::Runtime::new()?;
    let handle = session::spawn(settings.game_config(), seed, runtime.handle())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let keymap = KeyMap::from_settings(&settings);

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &handle, &keymap);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    let status = runtime.block_on(handle.shutdown());
    if result.is_ok() {
        print_summary(&status, seed);
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &SessionHandle,
    keymap: &KeyMap,
) -> io::Result<()> {
    let mut game_over_time: Option<Instant> = None;

    loop {
        let snapshot = session.snapshot();
        terminal.draw(|frame| ui::render_game(frame, &snapshot))?;

        if snapshot.status.is_game_over() && game_over_time.is_none() {
            game_over_time = Some(Instant::now());
        }

        if !event::poll(FRAME_DURATION)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(since) = game_over_time {
            if since.elapsed() >= GAME_OVER_INPUT_DELAY {
                return Ok(());
            }
            continue;
        }

        match keymap.command_for(key) {
            Some(Command::Quit) => {
                session.send(Command::Quit);
                return Ok(());
            }
            Some(command) => {
                if !session.send(command) {
                    tracing::debug!(?command, "session already ended");
                }
            }
            None => {}
        }
    }
}

fn print_summary(status: &Status, seed: u64) {
    println!("\nThanks for playing TETRAD!");
    println!("Final Score: {}", status.points);
    println!("Level: {} | Lines: {}", status.level, status.lines);
    println!("Seed: {}", seed);
}
