//! Core game state and logic

use crate::block::BlockColor;
use crate::grid::{DEFAULT_COLUMNS, DEFAULT_ROWS, Grid, GridError};
use crate::piece::Piece;
use crate::score::{GravityCurve, Score};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{debug, error, info};

/// Board size and speed curve for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub gravity: GravityCurve,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            gravity: GravityCurve::default(),
        }
    }
}

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
}

/// Commands an input collaborator can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    HardDrop,
    Pause,
    Quit,
}

/// What one gravity step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Paused or over; nothing happened
    Idle,
    /// The active piece moved down one row
    Fell,
    /// The active piece came to rest, rows were scanned and a new piece spawned
    Landed { rows_cleared: u32 },
    /// The piece came to rest but the next one could not spawn
    ToppedOut { rows_cleared: u32 },
}

/// Session status for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub points: u64,
    pub level: u32,
    pub lines: u32,
    pub last_cleared: u32,
    pub state: GameState,
}

impl Status {
    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }
}

/// Owned copy of everything a renderer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub rows: usize,
    pub columns: usize,
    /// Row-major cell colors
    pub cells: Vec<Option<BlockColor>>,
    pub status: Status,
}

impl Snapshot {
    pub fn capture(grid: &Grid, status: &Status) -> Self {
        Self {
            rows: grid.num_rows(),
            columns: grid.num_columns(),
            cells: grid
                .rows()
                .flat_map(|row| row.iter().map(|cell| cell.map(|block| block.color())))
                .collect(),
            status: *status,
        }
    }

    /// Color at (`row`, `col`), `None` when empty or out of range
    pub fn color_at(&self, row: usize, col: usize) -> Option<BlockColor> {
        if row >= self.rows || col >= self.columns {
            return None;
        }
        self.cells[row * self.columns + col]
    }
}

/// Display hook, invoked after every mutation that changed visible state
pub trait Refresh {
    fn refresh(&mut self, grid: &Grid, status: &Status);
}

/// A display that ignores refreshes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefresh;

impl Refresh for NoRefresh {
    fn refresh(&mut self, _grid: &Grid, _status: &Status) {}
}

impl<F: FnMut(&Grid, &Status)> Refresh for F {
    fn refresh(&mut self, grid: &Grid, status: &Status) {
        self(grid, status)
    }
}

/// The board controller
///
/// Owns the grid and the active piece; applies player commands and gravity
/// ticks, clears rows, and keeps score. All mutation goes through `&mut self`,
/// so commands and ticks are serialized by construction.
pub struct Game<R: Refresh = NoRefresh> {
    grid: Grid,
    active: Option<Piece>,
    score: Score,
    state: GameState,
    gravity: GravityCurve,
    rng: ChaCha8Rng,
    seed: u64,
    display: R,
}

impl Game<NoRefresh> {
    /// Create a new game on an empty grid
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, GridError> {
        Game::with_display(config, seed, NoRefresh)
    }
}

impl<R: Refresh> Game<R> {
    /// Create a new game that refreshes `display` after every change
    pub fn with_display(config: GameConfig, seed: u64, display: R) -> Result<Self, GridError> {
        let grid = Grid::new(config.rows, config.columns)?;
        Ok(Self::with_grid(grid, config.gravity, seed, display))
    }

    /// Start a game on a prepared grid. If the first piece cannot spawn the
    /// game is over immediately.
    pub fn with_grid(grid: Grid, gravity: GravityCurve, seed: u64, display: R) -> Self {
        let mut game = Self {
            grid,
            active: None,
            score: Score::new(),
            state: GameState::Playing,
            gravity,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            display,
        };
        info!(
            seed,
            rows = game.grid.num_rows(),
            columns = game.grid.num_columns(),
            "new game"
        );
        game.spawn();
        game.refresh();
        game
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn active_piece(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn score(&self) -> u64 {
        self.score.points
    }

    pub fn level(&self) -> u32 {
        self.score.level
    }

    pub fn lines(&self) -> u32 {
        self.score.lines
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn display(&self) -> &R {
        &self.display
    }

    pub fn status(&self) -> Status {
        Status {
            points: self.score.points,
            level: self.score.level,
            lines: self.score.lines,
            last_cleared: self.score.last_cleared,
            state: self.state,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.grid, &self.status())
    }

    /// Gravity period at the current level
    pub fn tick_interval(&self) -> Duration {
        self.gravity.interval(self.score.level)
    }

    /// Apply a command, returns true if visible state changed
    pub fn process(&mut self, command: Command) -> bool {
        match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::MoveDown => self.move_down(),
            Command::Rotate => self.rotate(),
            Command::HardDrop => self.hard_drop(),
            Command::Pause => self.toggle_pause(),
            Command::Quit => self.quit(),
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(0, -1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(0, 1)
    }

    /// Move down one row. Unlike a tick, a blocked move does not land the piece.
    pub fn move_down(&mut self) -> bool {
        self.shift(1, 0)
    }

    pub fn rotate(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let Some(piece) = &mut self.active else {
            return false;
        };
        // The square reports success without moving; nothing to redraw
        if piece.shape().is_rotation_invariant() {
            return false;
        }
        let rotated = piece.rotate(&mut self.grid);
        if rotated {
            self.refresh();
        }
        rotated
    }

    /// Drop the piece to rest and resolve the landing immediately
    pub fn hard_drop(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let Some(piece) = &mut self.active else {
            return false;
        };
        let distance = piece.hard_drop(&mut self.grid);
        debug!(distance, "hard drop");
        self.settle();
        self.refresh();
        true
    }

    /// Toggle between playing and paused
    pub fn toggle_pause(&mut self) -> bool {
        self.state = match self.state {
            GameState::Playing => {
                info!("paused");
                GameState::Paused
            }
            GameState::Paused => {
                info!("resumed");
                GameState::Playing
            }
            GameState::GameOver => return false,
        };
        self.refresh();
        true
    }

    /// End the session
    pub fn quit(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        info!(points = self.score.points, "quit");
        self.state = GameState::GameOver;
        self.refresh();
        true
    }

    /// One gravity step
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != GameState::Playing {
            return TickOutcome::Idle;
        }
        let Some(piece) = &mut self.active else {
            return TickOutcome::Idle;
        };
        let outcome = if piece.translate(&mut self.grid, 1, 0) {
            TickOutcome::Fell
        } else {
            self.settle()
        };
        self.refresh();
        outcome
    }

    fn shift(&mut self, delta_row: i32, delta_col: i32) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let Some(piece) = &mut self.active else {
            return false;
        };
        let moved = piece.translate(&mut self.grid, delta_row, delta_col);
        if moved {
            self.refresh();
        }
        moved
    }

    /// The active piece can no longer fall: its blocks become static,
    /// completed rows are cleared and scored, and the next piece spawns.
    fn settle(&mut self) -> TickOutcome {
        self.active = None;
        let rows_cleared = match self.grid.clear_completed_rows() {
            Ok(rows) => rows,
            Err(err) => {
                error!(%err, "row compaction failed");
                0
            }
        };
        let level_before = self.score.level;
        let awarded = self.score.add_clear(rows_cleared);
        if rows_cleared > 0 {
            info!(rows_cleared, awarded, points = self.score.points, "rows cleared");
        }
        if self.score.level != level_before {
            info!(
                level = self.score.level,
                interval_ms = self.tick_interval().as_millis() as u64,
                "level up"
            );
        }
        if self.spawn() {
            TickOutcome::Landed { rows_cleared }
        } else {
            TickOutcome::ToppedOut { rows_cleared }
        }
    }

    fn spawn(&mut self) -> bool {
        match Piece::spawn(&mut self.grid, &mut self.rng) {
            Some(piece) => {
                self.active = Some(piece);
                true
            }
            None => {
                info!(
                    points = self.score.points,
                    level = self.score.level,
                    lines = self.score.lines,
                    "game over"
                );
                self.state = GameState::GameOver;
                false
            }
        }
    }

    fn refresh(&mut self) {
        let status = self.status();
        self.display.refresh(&self.grid, &status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::shape::Shape;

    #[derive(Default)]
    struct Counter(u32);

    impl Refresh for Counter {
        fn refresh(&mut self, _grid: &Grid, _status: &Status) {
            self.0 += 1;
        }
    }

    fn fill_row_except(grid: &mut Grid, row: i32, skip: &[i32]) {
        for col in 0..grid.num_columns() as i32 {
            if !skip.contains(&col) {
                let block = grid.allocate_block(BlockColor::Gray);
                block.place_into(grid, Location::new(row, col)).unwrap();
            }
        }
    }

    /// Swap the random active piece for a known shape
    fn force_shape<R: Refresh>(game: &mut Game<R>, shape: Shape) {
        if let Some(piece) = game.active.take() {
            for block in piece.blocks() {
                block.remove_from_grid(&mut game.grid);
            }
        }
        game.active = Piece::spawn_shape(&mut game.grid, shape);
        assert!(game.active.is_some());
    }

    #[test]
    fn test_new_game() {
        let game = Game::new(GameConfig::default(), 1).unwrap();
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), 1);
        assert_eq!(game.grid().occupied(), 4);
        assert!(game.active_piece().is_some());
        assert_eq!(game.tick_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_invalid_config() {
        let config = GameConfig {
            rows: 0,
            ..GameConfig::default()
        };
        assert!(Game::new(config, 1).is_err());
    }

    #[test]
    fn test_tick_moves_piece_down() {
        let mut game = Game::new(GameConfig::default(), 3).unwrap();
        let before = game.active_piece().unwrap().locations(game.grid()).unwrap();
        assert_eq!(game.tick(), TickOutcome::Fell);
        let after = game.active_piece().unwrap().locations(game.grid()).unwrap();
        assert_eq!(after, before.map(|loc| loc.offset(1, 0)));
    }

    #[test]
    fn test_tick_lands_and_spawns() {
        let mut game = Game::new(GameConfig::default(), 5).unwrap();
        force_shape(&mut game, Shape::O);
        for _ in 0..18 {
            assert_eq!(game.tick(), TickOutcome::Fell);
        }
        assert_eq!(game.tick(), TickOutcome::Landed { rows_cleared: 0 });
        assert_eq!(game.grid().occupied(), 8);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_move_down_does_not_land() {
        let mut game = Game::new(GameConfig::default(), 5).unwrap();
        force_shape(&mut game, Shape::O);
        while game.move_down() {}
        assert_eq!(game.grid().occupied(), 4);
    }

    #[test]
    fn test_hard_drop_clears_two_rows() {
        let mut grid = Grid::new(20, 10).unwrap();
        fill_row_except(&mut grid, 19, &[4, 5]);
        fill_row_except(&mut grid, 18, &[4, 5]);
        let mut game = Game::with_grid(grid, GravityCurve::default(), 9, NoRefresh);
        force_shape(&mut game, Shape::O);

        assert!(game.hard_drop());
        assert_eq!(game.status().last_cleared, 2);
        assert_eq!(game.score(), 100);
        assert_eq!(game.level(), 3);
        assert_eq!(game.lines(), 2);
        assert_eq!(game.tick_interval(), Duration::from_millis(250));
        // Only the freshly spawned piece remains
        assert_eq!(game.grid().occupied(), 4);
    }

    #[test]
    fn test_four_row_clear() {
        let mut grid = Grid::new(20, 10).unwrap();
        for row in 16..20 {
            fill_row_except(&mut grid, row, &[4]);
        }
        // Something above the cleared rows to watch fall
        let marker = grid.allocate_block(BlockColor::Green);
        marker.place_into(&mut grid, Location::new(15, 0)).unwrap();
        let mut game = Game::with_grid(grid, GravityCurve::default(), 9, NoRefresh);
        force_shape(&mut game, Shape::I);

        assert!(game.hard_drop());
        assert_eq!(game.score(), 1200);
        assert_eq!(game.level(), 5);
        assert_eq!(marker.location(game.grid()), Some(Location::new(19, 0)));
        assert_eq!(game.tick_interval(), Duration::from_millis(125));
    }

    #[test]
    fn test_partial_rows_score_nothing() {
        let mut grid = Grid::new(20, 10).unwrap();
        fill_row_except(&mut grid, 19, &[4, 5, 6]);
        let mut game = Game::with_grid(grid, GravityCurve::default(), 9, NoRefresh);
        force_shape(&mut game, Shape::O);
        assert!(game.hard_drop());
        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), 1);
    }

    #[test]
    fn test_top_out_ends_game() {
        // Pieces only ever occupy the middle columns, so rows never complete
        let config = GameConfig {
            rows: 6,
            ..GameConfig::default()
        };
        let mut game = Game::new(config, 11).unwrap();
        for _ in 0..20 {
            if game.is_game_over() {
                break;
            }
            game.hard_drop();
        }
        assert!(game.is_game_over());
        assert!(game.active_piece().is_none());

        let frozen = game.snapshot();
        for command in [
            Command::MoveLeft,
            Command::MoveRight,
            Command::MoveDown,
            Command::Rotate,
            Command::HardDrop,
            Command::Pause,
            Command::Quit,
        ] {
            assert!(!game.process(command));
        }
        assert_eq!(game.tick(), TickOutcome::Idle);
        assert_eq!(game.snapshot(), frozen);
    }

    #[test]
    fn test_tick_top_out() {
        let config = GameConfig {
            rows: 5,
            ..GameConfig::default()
        };
        let mut game = Game::new(config, 3).unwrap();
        let mut last = TickOutcome::Idle;
        for _ in 0..500 {
            if game.is_game_over() {
                break;
            }
            last = game.tick();
        }
        assert!(game.is_game_over());
        assert!(matches!(last, TickOutcome::ToppedOut { .. }));
        assert!(game.active_piece().is_none());
        assert_eq!(game.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_blocked_first_spawn_is_game_over() {
        let mut grid = Grid::new(20, 10).unwrap();
        fill_row_except(&mut grid, 0, &[0]);
        let game = Game::with_grid(grid, GravityCurve::default(), 1, NoRefresh);
        assert!(game.is_game_over());
        assert!(game.status().is_game_over());
    }

    #[test]
    fn test_failed_moves_are_ignored() {
        let mut game = Game::new(GameConfig::default(), 2).unwrap();
        force_shape(&mut game, Shape::O);
        for _ in 0..4 {
            assert!(game.move_left());
        }
        let before = game.snapshot();
        assert!(!game.move_left());
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn test_pause_blocks_commands_and_ticks() {
        let mut game = Game::new(GameConfig::default(), 4).unwrap();
        assert!(game.process(Command::Pause));
        assert_eq!(game.state(), GameState::Paused);
        let before = game.snapshot();
        assert!(!game.process(Command::MoveRight));
        assert!(!game.process(Command::HardDrop));
        assert_eq!(game.tick(), TickOutcome::Idle);
        assert_eq!(game.snapshot().cells, before.cells);

        assert!(game.process(Command::Pause));
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.tick(), TickOutcome::Fell);
    }

    #[test]
    fn test_quit() {
        let mut game = Game::new(GameConfig::default(), 4).unwrap();
        assert!(game.process(Command::Quit));
        assert!(game.is_game_over());
    }

    #[test]
    fn test_refresh_only_on_change() {
        let mut game = Game::with_display(GameConfig::default(), 8, Counter::default()).unwrap();
        force_shape(&mut game, Shape::O);
        let base = game.display().0;
        assert_eq!(base, 1);

        assert!(game.move_right());
        assert_eq!(game.display().0, base + 1);
        // Square rotation changes nothing on screen
        assert!(!game.rotate());
        assert_eq!(game.display().0, base + 1);
        assert!(game.move_right());
        assert!(game.move_right());
        assert!(game.move_right());
        assert!(!game.move_right());
        assert_eq!(game.display().0, base + 4);

        assert_eq!(game.tick(), TickOutcome::Fell);
        assert_eq!(game.display().0, base + 5);
        assert!(game.hard_drop());
        assert_eq!(game.display().0, base + 6);
    }

    #[test]
    fn test_closure_display_sees_grid() {
        let mut seen = Vec::new();
        {
            let mut game = Game::with_display(GameConfig::default(), 8, |grid: &Grid, status: &Status| {
                seen.push((grid.occupied(), status.level));
            })
            .unwrap();
            game.tick();
        }
        assert_eq!(seen, vec![(4, 1), (4, 1)]);
    }

    #[test]
    fn test_same_seed_same_game() {
        let script = [
            Command::MoveLeft,
            Command::Rotate,
            Command::HardDrop,
            Command::MoveRight,
            Command::MoveRight,
            Command::HardDrop,
            Command::Rotate,
            Command::HardDrop,
        ];
        let play = || {
            let mut game = Game::new(GameConfig::default(), 77).unwrap();
            for command in script {
                game.process(command);
                game.tick();
            }
            game.snapshot()
        };
        assert_eq!(play(), play());
    }
}
