//! Summary statistics over the final temperature field.
//!
//! Statistics consider room cells only: halo and wall cells are excluded
//! entirely. The accumulator keeps raw moments plus the two threshold
//! counters so partial results can be merged block-wise.

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::mask::InteriorMask;

/// Room cells warmer than this count toward `pct_above_18`.
pub const WARM_THRESHOLD: f64 = 18.0;

/// Room cells colder than this count toward `pct_below_15`.
pub const COLD_THRESHOLD: f64 = 15.0;

/// Per-building summary record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStatistics {
    /// Number of room cells the statistics cover.
    pub room_cells: usize,
    /// Arithmetic mean temperature.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Percentage of room cells above [`WARM_THRESHOLD`], in [0, 100].
    pub pct_above_18: f64,
    /// Percentage of room cells below [`COLD_THRESHOLD`], in [0, 100].
    pub pct_below_15: f64,
}

/// Accumulator for single-pass statistics over room-cell temperatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAccumulator {
    count: usize,
    sum: f64,
    sum_sq: f64,
    above_warm: usize,
    below_cold: usize,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
        if value > WARM_THRESHOLD {
            self.above_warm += 1;
        }
        if value < COLD_THRESHOLD {
            self.below_cold += 1;
        }
    }

    /// Fold another accumulator into this one, for block-wise reduction.
    #[inline]
    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.above_warm += other.above_warm;
        self.below_cold += other.below_cold;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Finalize into a statistics record.
    ///
    /// Errors with [`Error::NoRoomCells`] when nothing was accumulated: a
    /// building without rooms has no defined mean, and a silent NaN would
    /// otherwise leak into downstream reports.
    pub fn finalize(&self) -> Result<FieldStatistics> {
        if self.count == 0 {
            return Err(Error::NoRoomCells);
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        // Clamp against negative variance from float rounding.
        let variance = (self.sum_sq / n - mean * mean).max(0.0);
        Ok(FieldStatistics {
            room_cells: self.count,
            mean,
            std_dev: variance.sqrt(),
            pct_above_18: 100.0 * self.above_warm as f64 / n,
            pct_below_15: 100.0 * self.below_cold as f64 / n,
        })
    }
}

/// Reduce the room cells of a solved grid into a summary record.
pub fn summarize(grid: &Grid, mask: &InteriorMask) -> Result<FieldStatistics> {
    mask.check_alignment(grid)?;

    let dims = grid.dims();
    let buf = grid.current();
    let mut acc = StatsAccumulator::new();
    for i in 0..dims.height {
        for j in 0..dims.width {
            if mask.is_room(i, j) {
                acc.add(buf[dims.idx(i + 1, j + 1)]);
            }
        }
    }
    acc.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2x2(values: [f64; 4]) -> Grid {
        Grid::from_interior(&values, 2, 2, 0.0).unwrap()
    }

    #[test]
    fn test_mean_and_std() {
        let grid = grid_2x2([10.0, 20.0, 10.0, 20.0]);
        let mask = InteriorMask::all_rooms(2, 2).unwrap();
        let stats = summarize(&grid, &mask).unwrap();

        assert_eq!(stats.room_cells, 4);
        assert!((stats.mean - 15.0).abs() < 1e-12);
        assert!((stats.std_dev - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_percentages() {
        // 19 and 20 above warm; 10 below cold; 16 in neither band.
        let grid = grid_2x2([19.0, 20.0, 10.0, 16.0]);
        let mask = InteriorMask::all_rooms(2, 2).unwrap();
        let stats = summarize(&grid, &mask).unwrap();

        assert!((stats.pct_above_18 - 50.0).abs() < 1e-12);
        assert!((stats.pct_below_15 - 25.0).abs() < 1e-12);
        assert!(stats.pct_above_18 + stats.pct_below_15 <= 100.0);
    }

    #[test]
    fn test_walls_excluded() {
        let grid = grid_2x2([100.0, 1.0, 1.0, 1.0]);
        let mask = InteriorMask::new(vec![false, true, true, true], 2, 2).unwrap();
        let stats = summarize(&grid, &mask).unwrap();

        assert_eq!(stats.room_cells, 3);
        assert!((stats.mean - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_room_cells_is_an_error() {
        let grid = grid_2x2([1.0, 2.0, 3.0, 4.0]);
        let mask = InteriorMask::new(vec![false; 4], 2, 2).unwrap();
        assert!(matches!(
            summarize(&grid, &mask),
            Err(Error::NoRoomCells)
        ));
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let values = [3.0, 17.0, 21.0, 14.9, 18.1, 16.0];
        let mut whole = StatsAccumulator::new();
        for v in values {
            whole.add(v);
        }

        let mut left = StatsAccumulator::new();
        let mut right = StatsAccumulator::new();
        for v in &values[..3] {
            left.add(*v);
        }
        for v in &values[3..] {
            right.add(*v);
        }
        left.merge(&right);

        let a = whole.finalize().unwrap();
        let b = left.finalize().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_boundary_values_not_counted() {
        // Exactly 18 is not above, exactly 15 is not below.
        let grid = grid_2x2([18.0, 15.0, 18.0, 15.0]);
        let mask = InteriorMask::all_rooms(2, 2).unwrap();
        let stats = summarize(&grid, &mask).unwrap();
        assert_eq!(stats.pct_above_18, 0.0);
        assert_eq!(stats.pct_below_15, 0.0);
    }
}
