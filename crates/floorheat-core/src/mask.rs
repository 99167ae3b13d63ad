//! Room/wall classification of a floorplan interior.

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Boolean classification of each interior cell: `true` means the cell is a
/// room and participates in relaxation, `false` means a wall or
/// outside-the-building cell whose temperature stays frozen at its initial
/// value. Aligned with a grid's interior region (no halo) and immutable for
/// the lifetime of a solve.
#[derive(Debug, Clone)]
pub struct InteriorMask {
    height: usize,
    width: usize,
    cells: Vec<bool>,
}

impl InteriorMask {
    pub fn new(cells: Vec<bool>, height: usize, width: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(Error::EmptyDomain);
        }
        if cells.len() != height * width {
            return Err(Error::BadBufferLength {
                len: cells.len(),
                height,
                width,
            });
        }
        Ok(Self {
            height,
            width,
            cells,
        })
    }

    /// Mask where every interior cell is a room.
    pub fn all_rooms(height: usize, width: usize) -> Result<Self> {
        Self::new(vec![true; height * width], height, width)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether interior cell (i, j) is a room. Interior coordinates, so the
    /// cell at padded position (i+1, j+1).
    #[inline]
    pub fn is_room(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.width + j]
    }

    /// Row-major cell slice, one bool per interior cell.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn room_count(&self) -> usize {
        self.cells.iter().filter(|&&room| room).count()
    }

    /// Check that this mask covers exactly `grid`'s interior.
    ///
    /// A mismatch is a fatal precondition violation; every solve entry point
    /// calls this before the first sweep.
    pub fn check_alignment(&self, grid: &Grid) -> Result<()> {
        let dims = grid.dims();
        if dims.height != self.height || dims.width != self.width {
            return Err(Error::DimensionMismatch {
                field_height: dims.height,
                field_width: dims.width,
                mask_height: self.height,
                mask_width: self.width,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_lookup() {
        let mask = InteriorMask::new(vec![true, false, false, true], 2, 2).unwrap();
        assert!(mask.is_room(0, 0));
        assert!(!mask.is_room(0, 1));
        assert!(!mask.is_room(1, 0));
        assert!(mask.is_room(1, 1));
        assert_eq!(mask.room_count(), 2);
    }

    #[test]
    fn test_rejects_bad_length() {
        let err = InteriorMask::new(vec![true; 3], 2, 2).unwrap_err();
        assert!(matches!(err, Error::BadBufferLength { len: 3, .. }));
    }

    #[test]
    fn test_alignment() {
        let grid = Grid::from_interior(&[0.0; 6], 2, 3, 0.0).unwrap();
        let ok = InteriorMask::all_rooms(2, 3).unwrap();
        assert!(ok.check_alignment(&grid).is_ok());

        let bad = InteriorMask::all_rooms(3, 2).unwrap();
        let err = bad.check_alignment(&grid).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }
}
