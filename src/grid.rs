//! Bounded cell grid, occupancy bookkeeping and row compaction

use crate::block::{Block, BlockColor, BlockId};
use crate::location::Location;
use std::collections::HashMap;
use tracing::info;

/// Standard playfield dimensions
pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLUMNS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("location {location} is outside the {rows}x{columns} grid")]
    OutOfBounds {
        location: Location,
        rows: usize,
        columns: usize,
    },
    #[error("location {location} is already occupied")]
    Occupied { location: Location },
    #[error("block {block} is not placed in this grid")]
    NotPlaced { block: BlockId },
    #[error("block {block} is already placed at {location}")]
    AlreadyPlaced { block: BlockId, location: Location },
    #[error("grid dimensions must be at least 1x1, got {rows}x{columns}")]
    EmptyDimensions { rows: usize, columns: usize },
    #[error("grid dimensions {rows}x{columns} are too large")]
    TooLarge { rows: usize, columns: usize },
}

/// The playfield
///
/// Owns the occupancy table (location -> block) and the reverse index
/// (block -> location). Both are only ever updated together.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    columns: usize,
    /// Row-major, `row * columns + col`
    cells: Vec<Option<Block>>,
    placements: HashMap<BlockId, Location>,
    next_block_id: u64,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            cells: vec![None; DEFAULT_ROWS * DEFAULT_COLUMNS],
            placements: HashMap::new(),
            next_block_id: 0,
        }
    }
}

impl Grid {
    /// Create an empty grid; both dimensions must be at least 1 and fit a
    /// [`Location`] coordinate
    pub fn new(rows: usize, columns: usize) -> Result<Self, GridError> {
        if rows == 0 || columns == 0 {
            return Err(GridError::EmptyDimensions { rows, columns });
        }
        let too_large = GridError::TooLarge { rows, columns };
        if i32::try_from(rows).is_err() || i32::try_from(columns).is_err() {
            return Err(too_large);
        }
        let len = rows.checked_mul(columns).ok_or(too_large)?;
        Ok(Self {
            rows,
            columns,
            cells: vec![None; len],
            placements: HashMap::new(),
            next_block_id: 0,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns
    }

    fn index(&self, loc: Location) -> Option<usize> {
        if !self.is_valid(loc) {
            return None;
        }
        Some(loc.row as usize * self.columns + loc.col as usize)
    }

    fn out_of_bounds(&self, loc: Location) -> GridError {
        GridError::OutOfBounds {
            location: loc,
            rows: self.rows,
            columns: self.columns,
        }
    }

    /// True iff `loc` lies inside the grid
    pub fn is_valid(&self, loc: Location) -> bool {
        loc.row >= 0
            && loc.col >= 0
            && (loc.row as usize) < self.rows
            && (loc.col as usize) < self.columns
    }

    /// True iff `loc` is inside the grid and holds no block
    pub fn is_vacant(&self, loc: Location) -> bool {
        matches!(self.index(loc), Some(idx) if self.cells[idx].is_none())
    }

    /// The occupant at `loc`
    ///
    /// # Panics
    ///
    /// Panics if `loc` is outside the grid. Check with [`Grid::is_valid`] first.
    pub fn get(&self, loc: Location) -> Option<Block> {
        match self.index(loc) {
            Some(idx) => self.cells[idx],
            None => panic!("{}", self.out_of_bounds(loc)),
        }
    }

    /// Put `block` at `loc`. The cell must be valid and empty, and the block
    /// must not already be placed.
    pub fn put(&mut self, loc: Location, block: Block) -> Result<(), GridError> {
        self.check_vacant(loc)?;
        if let Some(&location) = self.placements.get(&block.id()) {
            return Err(GridError::AlreadyPlaced {
                block: block.id(),
                location,
            });
        }
        let idx = loc.row as usize * self.columns + loc.col as usize;
        self.cells[idx] = Some(block);
        self.placements.insert(block.id(), loc);
        Ok(())
    }

    /// Clear `loc`, returning whatever was there. Empty cells are a no-op.
    pub fn remove(&mut self, loc: Location) -> Result<Option<Block>, GridError> {
        if !self.is_valid(loc) {
            return Err(self.out_of_bounds(loc));
        }
        Ok(self.clear_cell(loc))
    }

    /// Mint a new unplaced block with an id unique to this grid
    pub fn allocate_block(&mut self, color: BlockColor) -> Block {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        Block::new(id, color)
    }

    /// Where block `id` sits, if it is placed
    pub fn locate(&self, id: BlockId) -> Option<Location> {
        self.placements.get(&id).copied()
    }

    pub(crate) fn check_vacant(&self, loc: Location) -> Result<(), GridError> {
        let Some(idx) = self.index(loc) else {
            return Err(self.out_of_bounds(loc));
        };
        if self.cells[idx].is_some() {
            return Err(GridError::Occupied { location: loc });
        }
        Ok(())
    }

    pub(crate) fn clear_cell(&mut self, loc: Location) -> Option<Block> {
        let idx = self.index(loc)?;
        let block = self.cells[idx].take()?;
        self.placements.remove(&block.id());
        Some(block)
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Iterate over rows top to bottom, each as a slice of cells
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Block>]> {
        self.cells.chunks(self.columns)
    }

    /// Check if every column in `row` is occupied
    pub fn is_row_complete(&self, row: usize) -> bool {
        if row >= self.rows {
            return false;
        }
        let start = row * self.columns;
        self.cells[start..start + self.columns]
            .iter()
            .all(Option::is_some)
    }

    /// Remove every block in `row` and drop everything above it by one row
    pub fn clear_row(&mut self, row: usize) -> Result<(), GridError> {
        let row = row as i32;
        for col in 0..self.columns as i32 {
            self.remove(Location::new(row, col))?;
        }
        // Walk upward from the cleared row; each destination was vacated by
        // the previous iteration.
        for r in (0..row).rev() {
            for col in 0..self.columns as i32 {
                let from = Location::new(r, col);
                if let Some(block) = self.get(from) {
                    block.move_to(self, from.offset(1, 0))?;
                }
            }
        }
        Ok(())
    }

    /// Scan rows top to bottom, clearing each complete row as it is found.
    /// Returns how many rows were cleared.
    pub fn clear_completed_rows(&mut self) -> Result<u32, GridError> {
        let mut cleared = 0;
        for row in 0..self.rows {
            if self.is_row_complete(row) {
                self.clear_row(row)?;
                cleared += 1;
            }
        }
        if cleared > 0 {
            info!(cleared, "cleared completed rows");
        }
        Ok(cleared)
    }
}
