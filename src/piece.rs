//! Active falling piece logic

use crate::block::Block;
use crate::grid::{Grid, GridError};
use crate::location::Location;
use crate::shape::Shape;
use rand::Rng;
use tracing::{debug, error};

/// Four blocks of one shape, moved as a unit.
///
/// The piece owns its block handles; the grid it was spawned into records
/// where they are. Every public operation leaves all four blocks placed.
#[derive(Debug, Clone)]
pub struct Piece {
    shape: Shape,
    /// `blocks[0]` is the rotation pivot
    blocks: [Block; 4],
}

impl Piece {
    /// Spawn a uniformly random shape at the top of `grid`.
    /// Returns `None` if the spawn cells are not all valid and empty.
    pub fn spawn<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Option<Self> {
        Self::spawn_shape(grid, Shape::random(rng))
    }

    /// Spawn a specific shape at the top of `grid`
    pub fn spawn_shape(grid: &mut Grid, shape: Shape) -> Option<Self> {
        let locs = shape.spawn_locations(grid.num_columns());
        if !locs.iter().all(|&loc| grid.is_vacant(loc)) {
            debug!(?shape, "spawn area blocked");
            return None;
        }
        let color = shape.color();
        let blocks = [(); 4].map(|_| grid.allocate_block(color));
        let piece = Self { shape, blocks };
        if let Err(err) = piece.place_all(grid, &locs) {
            debug!(?shape, %err, "spawn rejected");
            return None;
        }
        debug!(?shape, "spawned piece");
        Some(piece)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn blocks(&self) -> &[Block; 4] {
        &self.blocks
    }

    /// Current locations of the four blocks, pivot first
    pub fn locations(&self, grid: &Grid) -> Option<[Location; 4]> {
        let mut locs = [Location::new(0, 0); 4];
        for (slot, block) in locs.iter_mut().zip(&self.blocks) {
            *slot = block.location(grid)?;
        }
        Some(locs)
    }

    /// Try to move by (`delta_row`, `delta_col`), returns true if successful.
    /// On failure the piece stays exactly where it was.
    pub fn translate(&mut self, grid: &mut Grid, delta_row: i32, delta_col: i32) -> bool {
        let Some(old_locs) = self.remove_blocks(grid) else {
            return false;
        };
        let new_locs = old_locs.map(|loc| loc.offset(delta_row, delta_col));
        self.commit(grid, &old_locs, &new_locs)
    }

    /// Try to rotate a quarter turn about the pivot, returns true if successful.
    ///
    /// The square is rotation-invariant: it always succeeds and never moves.
    pub fn rotate(&mut self, grid: &mut Grid) -> bool {
        if self.shape.is_rotation_invariant() {
            return true;
        }
        let Some(old_locs) = self.remove_blocks(grid) else {
            return false;
        };
        let Location { row: row0, col: col0 } = old_locs[0];
        let new_locs = old_locs.map(|Location { row, col }| {
            Location::new(row0 - col0 + col, row0 + col0 - row)
        });
        self.commit(grid, &old_locs, &new_locs)
    }

    /// Move down as far as possible and return distance dropped
    pub fn hard_drop(&mut self, grid: &mut Grid) -> u32 {
        let mut distance = 0;
        while self.translate(grid, 1, 0) {
            distance += 1;
        }
        distance
    }

    /// Lift all four blocks off the grid, returning where they were.
    /// Nothing is removed unless all four are placed.
    fn remove_blocks(&self, grid: &mut Grid) -> Option<[Location; 4]> {
        let locs = self.locations(grid)?;
        for block in &self.blocks {
            block.remove_from_grid(grid);
        }
        Some(locs)
    }

    /// Place block `i` at `locs[i]`, all or nothing
    fn place_all(&self, grid: &mut Grid, locs: &[Location; 4]) -> Result<(), GridError> {
        for &loc in locs {
            grid.check_vacant(loc)?;
        }
        for (i, (block, &loc)) in self.blocks.iter().zip(locs).enumerate() {
            if let Err(err) = block.place_into(grid, loc) {
                for placed in &self.blocks[..i] {
                    placed.remove_from_grid(grid);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Second half of a move: the blocks are off the grid, land them on
    /// `new_locs` or put them back on `old_locs`.
    fn commit(&self, grid: &mut Grid, old_locs: &[Location; 4], new_locs: &[Location; 4]) -> bool {
        if self.place_all(grid, new_locs).is_ok() {
            return true;
        }
        if let Err(err) = self.place_all(grid, old_locs) {
            error!(%err, shape = ?self.shape, "failed to restore piece");
        }
        false
    }
}
