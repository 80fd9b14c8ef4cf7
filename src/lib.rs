//! TETRAD - falling-piece grid engine
//!
//! A bounded occupancy grid, four-block pieces that translate and rotate
//! atomically against it, and a tick-driven controller that applies gravity,
//! clears completed rows, and tracks score and level.

pub mod block;
pub mod game;
pub mod grid;
pub mod location;
pub mod piece;
pub mod score;
pub mod session;
pub mod settings;
pub mod shape;

pub use block::{Block, BlockColor, BlockId};
pub use game::{Command, Game, GameConfig, GameState, NoRefresh, Refresh, Snapshot, Status, TickOutcome};
pub use grid::{Grid, GridError};
pub use location::Location;
pub use piece::Piece;
pub use score::{GravityCurve, Score};
pub use shape::Shape;
