//! Scoring, leveling and the gravity speed curve

use std::time::Duration;

/// Points for clearing 0, 1, 2, 3 or 4 rows in one scan
const ROW_CLEAR_POINTS: [u64; 5] = [0, 40, 100, 300, 1200];

/// Default tick periods for levels 1, 2, 3 and 4+
pub const DEFAULT_INTERVALS_MS: [u64; 4] = [1000, 500, 250, 125];

/// Points awarded for clearing `rows` rows in a single scan.
/// More than four rows at once is impossible with four-block pieces and scores
/// as four.
pub fn points_for(rows: u32) -> u64 {
    ROW_CLEAR_POINTS[(rows as usize).min(ROW_CLEAR_POINTS.len() - 1)]
}

/// Score tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level, starts at 1 and never decreases
    pub level: u32,
    /// Total rows cleared this session
    pub lines: u32,
    /// Rows cleared by the most recent scan
    pub last_cleared: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
            last_cleared: 0,
        }
    }

    /// Record the result of one row-completion scan.
    /// Every cleared row raises the level by one. Returns the points awarded.
    pub fn add_clear(&mut self, rows: u32) -> u64 {
        let awarded = points_for(rows);
        self.points += awarded;
        self.lines += rows;
        self.level += rows;
        self.last_cleared = rows;
        awarded
    }
}

/// Tick period per level: entry `i` applies to level `i + 1`, and every
/// level past the end of the table uses the last (fastest) entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GravityCurve {
    intervals: Vec<Duration>,
}

impl Default for GravityCurve {
    fn default() -> Self {
        Self::from_millis(&DEFAULT_INTERVALS_MS)
    }
}

impl GravityCurve {
    /// Build a curve from millisecond periods. An empty table, or one with a
    /// zero period, yields the default curve.
    pub fn from_millis(intervals_ms: &[u64]) -> Self {
        if intervals_ms.is_empty() || intervals_ms.contains(&0) {
            return Self::default();
        }
        Self {
            intervals: intervals_ms
                .iter()
                .map(|&ms| Duration::from_millis(ms))
                .collect(),
        }
    }

    /// Get the tick period for `level`
    pub fn interval(&self, level: u32) -> Duration {
        let idx = (level.max(1) as usize - 1).min(self.intervals.len() - 1);
        self.intervals[idx]
    }
}
