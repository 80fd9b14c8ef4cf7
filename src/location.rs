//! Grid coordinates

use std::fmt;

/// A (row, column) coordinate. Row 0 is the top of the grid and rows
/// increase downward; column 0 is the left edge.
///
/// Locations are plain values and may lie outside any grid; use
/// [`Grid::is_valid`](crate::Grid::is_valid) before touching a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub row: i32,
    pub col: i32,
}

impl Location {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The location `delta_row` rows down and `delta_col` columns right
    pub const fn offset(self, delta_row: i32, delta_col: i32) -> Self {
        Self {
            row: self.row + delta_row,
            col: self.col + delta_col,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(i32, i32)> for Location {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}
