//! Background control loop
//!
//! One task owns the [`Game`]. It waits on either the next queued command or
//! the gravity deadline, so a command is never applied in the middle of a
//! tick. The wait is a `select!`, which lets pause, speed changes and game
//! over cut it short instead of sleeping through them.

use crate::game::{Command, Game, GameConfig, GameState, Refresh, Snapshot, Status};
use crate::grid::{Grid, GridError};
use crate::score::GravityCurve;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

/// Publishes a fresh [`Snapshot`] on every refresh
#[derive(Debug)]
pub struct Publisher {
    tx: watch::Sender<Snapshot>,
}

impl Refresh for Publisher {
    fn refresh(&mut self, grid: &Grid, status: &Status) {
        self.tx.send_replace(Snapshot::capture(grid, status));
    }
}

/// Handle to a running session
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<Status>,
}

/// Start a session on `handle`
pub fn spawn(config: GameConfig, seed: u64, handle: &Handle) -> Result<SessionHandle, GridError> {
    let grid = Grid::new(config.rows, config.columns)?;
    Ok(spawn_with_grid(grid, config.gravity, seed, handle))
}

/// Start a session on a prepared grid
pub fn spawn_with_grid(grid: Grid, gravity: GravityCurve, seed: u64, handle: &Handle) -> SessionHandle {
    let (tx, mut snapshots) = watch::channel(blank(grid.num_rows(), grid.num_columns()));
    let game = Game::with_grid(grid, gravity, seed, Publisher { tx });
    // The spawn refresh is the starting point, not a change
    snapshots.borrow_and_update();
    let (commands, command_rx) = mpsc::unbounded_channel();
    let task = handle.spawn(run(game, command_rx));
    SessionHandle {
        commands,
        snapshots,
        task,
    }
}

impl SessionHandle {
    /// Queue a command, returns false once the session has ended
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// The most recently published state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn status(&self) -> Status {
        self.snapshots.borrow().status
    }

    /// Wait for the next published state. Returns false when the session has
    /// ended and nothing more will be published.
    pub async fn changed(&mut self) -> bool {
        self.snapshots.changed().await.is_ok()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session to end on its own (game over or quit)
    pub async fn wait(self) -> Status {
        let Self {
            commands,
            snapshots,
            task,
        } = self;
        let status = finish(task, &snapshots).await;
        drop(commands);
        status
    }

    /// Close the command queue and wait for the loop to stop
    pub async fn shutdown(self) -> Status {
        let Self {
            commands,
            snapshots,
            task,
        } = self;
        drop(commands);
        finish(task, &snapshots).await
    }
}

async fn finish(task: JoinHandle<Status>, snapshots: &watch::Receiver<Snapshot>) -> Status {
    match task.await {
        Ok(status) => status,
        Err(err) => {
            warn!(%err, "session task failed");
            snapshots.borrow().status
        }
    }
}

async fn run(mut game: Game<Publisher>, mut commands: mpsc::UnboundedReceiver<Command>) -> Status {
    info!(seed = game.seed(), "session started");
    let mut next_tick = Instant::now() + game.tick_interval();

    while !game.is_game_over() {
        let paused = game.state() == GameState::Paused;
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    info!("command queue closed");
                    break;
                };
                let changed = game.process(command);
                debug!(?command, changed, "command");
                // A resumed game or a freshly spawned piece gets a full interval
                let resumed = paused && game.state() == GameState::Playing;
                if resumed || (changed && command == Command::HardDrop) {
                    next_tick = Instant::now() + game.tick_interval();
                }
            }
            () = sleep_until(next_tick), if !paused => {
                let outcome = game.tick();
                debug!(?outcome, "tick");
                next_tick = Instant::now() + game.tick_interval();
            }
        }
    }

    let status = game.status();
    info!(
        points = status.points,
        level = status.level,
        lines = status.lines,
        "session ended"
    );
    status
}

/// Placeholder published until the game's first refresh
fn blank(rows: usize, columns: usize) -> Snapshot {
    Snapshot {
        rows,
        columns,
        cells: vec![None; rows * columns],
        status: Status {
            points: 0,
            level: 1,
            lines: 0,
            last_cleared: 0,
            state: GameState::Playing,
        },
    }
}
