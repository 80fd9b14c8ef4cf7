//! Tetrad shape definitions
//!
//! Seven shapes, each with a fixed spawn pattern and a fixed color.

use crate::block::BlockColor;
use crate::location::Location;
use rand::Rng;

/// The 7 shape kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    I, // Red - long bar
    T, // Gray - T-shape
    O, // Cyan - square
    L, // Yellow - L-shape
    J, // Magenta - J-shape
    S, // Blue - S-shape
    Z, // Green - Z-shape
}

impl Shape {
    /// Get the color shared by all four blocks of this shape
    pub fn color(&self) -> BlockColor {
        match self {
            Shape::I => BlockColor::Red,
            Shape::T => BlockColor::Gray,
            Shape::O => BlockColor::Cyan,
            Shape::L => BlockColor::Yellow,
            Shape::J => BlockColor::Magenta,
            Shape::S => BlockColor::Blue,
            Shape::Z => BlockColor::Green,
        }
    }

    pub fn all() -> [Shape; 7] {
        [
            Shape::I,
            Shape::T,
            Shape::O,
            Shape::L,
            Shape::J,
            Shape::S,
            Shape::Z,
        ]
    }

    /// Pick a shape uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Shape {
        let all = Shape::all();
        all[rng.gen_range(0..all.len())]
    }

    /// Whether rotating this shape is a visual no-op
    pub fn is_rotation_invariant(&self) -> bool {
        matches!(self, Shape::O)
    }

    /// Spawn offsets (row, col) relative to the spawn anchor.
    /// The first entry is the rotation pivot.
    pub fn offsets(&self) -> [(i32, i32); 4] {
        match self {
            // I    T      O     L     J     S      Z
            // #   ###     ##    #      #     ##   ##
            // #    #      ##    #      #    ##     ##
            // #                 ##    ##
            // #
            Shape::I => [(1, 0), (0, 0), (2, 0), (3, 0)],
            Shape::T => [(0, 0), (0, 1), (0, -1), (1, 0)],
            Shape::O => [(0, 0), (0, 1), (1, 0), (1, 1)],
            Shape::L => [(1, 0), (0, 0), (2, 0), (2, 1)],
            Shape::J => [(1, 1), (0, 1), (2, 1), (2, 0)],
            Shape::S => [(0, 0), (0, 1), (1, 0), (1, -1)],
            Shape::Z => [(0, 0), (0, -1), (1, 0), (1, 1)],
        }
    }

    /// Absolute spawn locations on a grid `columns` wide
    pub fn spawn_locations(&self, columns: usize) -> [Location; 4] {
        let anchor = spawn_anchor(columns);
        self.offsets()
            .map(|(dr, dc)| anchor.offset(dr, dc))
    }
}

/// Top row, just left of center
pub fn spawn_anchor(columns: usize) -> Location {
    Location::new(0, columns as i32 / 2 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_every_shape_has_four_distinct_cells() {
        for shape in Shape::all() {
            let locs: HashSet<_> = shape.spawn_locations(10).into_iter().collect();
            assert_eq!(locs.len(), 4, "{shape:?}");
        }
    }

    #[test]
    fn test_spawn_fits_top_of_standard_grid() {
        for shape in Shape::all() {
            for loc in shape.spawn_locations(10) {
                assert!((0..4).contains(&loc.row), "{shape:?} {loc}");
                assert!((0..10).contains(&loc.col), "{shape:?} {loc}");
            }
        }
    }

    #[test]
    fn test_i_spawns_in_column_four() {
        let locs = Shape::I.spawn_locations(10);
        assert!(locs.iter().all(|loc| loc.col == 4));
        let mut rows: Vec<_> = locs.iter().map(|loc| loc.row).collect();
        rows.sort();
        assert_eq!(rows, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_colors_are_distinct() {
        let colors: HashSet<_> = Shape::all().iter().map(Shape::color).collect();
        assert_eq!(colors.len(), 7);
        // Every color belongs to some shape
        for color in BlockColor::all() {
            assert!(colors.contains(&color), "{color:?}");
        }
    }

    #[test]
    fn test_random_covers_all_shapes() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut counts: HashMap<Shape, u32> = HashMap::new();
        for _ in 0..7000 {
            *counts.entry(Shape::random(&mut rng)).or_default() += 1;
        }
        assert_eq!(counts.len(), 7);
        // Uniform: each shape should land near 1000
        assert!(counts.values().all(|&n| (800..1200).contains(&n)), "{counts:?}");
    }

    #[test]
    fn test_random_is_reproducible() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(Shape::random(&mut a), Shape::random(&mut b));
        }
    }
}
