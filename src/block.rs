//! Single grid occupants
//!
//! A block is a small copyable handle (id + color). Where a block sits is
//! recorded only by the [`Grid`], which indexes its occupants by id, so the
//! grid and the block can never disagree about placement.

use crate::grid::{Grid, GridError};
use crate::location::Location;
use std::fmt;

/// The seven block colors, one per shape kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockColor {
    Red,
    Gray,
    Cyan,
    Yellow,
    Magenta,
    Blue,
    Green,
}

impl BlockColor {
    /// Every color, in shape order
    pub fn all() -> [BlockColor; 7] {
        [
            BlockColor::Red,
            BlockColor::Gray,
            BlockColor::Cyan,
            BlockColor::Yellow,
            BlockColor::Magenta,
            BlockColor::Blue,
            BlockColor::Green,
        ]
    }
}

/// Identity of a block within one grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single occupant: identity plus color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    id: BlockId,
    color: BlockColor,
}

impl Block {
    pub(crate) fn new(id: BlockId, color: BlockColor) -> Self {
        Self { id, color }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn color(&self) -> BlockColor {
        self.color
    }

    /// Where this block currently sits in `grid`, if anywhere
    pub fn location(&self, grid: &Grid) -> Option<Location> {
        grid.locate(self.id)
    }

    pub fn is_placed(&self, grid: &Grid) -> bool {
        self.location(grid).is_some()
    }

    /// Place this block at `loc`.
    ///
    /// Fails without touching the grid if `loc` is out of bounds, already
    /// occupied, or this block is already placed somewhere.
    pub fn place_into(&self, grid: &mut Grid, loc: Location) -> Result<(), GridError> {
        grid.put(loc, *self)
    }

    /// Take this block off the grid, returning where it was.
    /// No-op on an unplaced block.
    pub fn remove_from_grid(&self, grid: &mut Grid) -> Option<Location> {
        let loc = grid.locate(self.id)?;
        grid.clear_cell(loc);
        Some(loc)
    }

    /// Relocate a placed block to an empty cell in one step.
    ///
    /// Used by row compaction; player moves go through
    /// [`Piece`](crate::Piece), which validates all four targets first.
    pub fn move_to(&self, grid: &mut Grid, new_loc: Location) -> Result<(), GridError> {
        let Some(old_loc) = grid.locate(self.id) else {
            return Err(GridError::NotPlaced { block: self.id });
        };
        if old_loc == new_loc {
            return Ok(());
        }
        grid.check_vacant(new_loc)?;
        grid.clear_cell(old_loc);
        grid.put(new_loc, *self)
    }
}
