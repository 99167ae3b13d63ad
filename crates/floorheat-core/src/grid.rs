//! Padded temperature grid with double-buffered storage.
//!
//! The grid stores an H x W interior surrounded by a one-cell halo, giving
//! an (H+2) x (W+2) row-major buffer. Halo cells carry the fixed Dirichlet
//! boundary condition and are never relaxed. Two backing buffers are kept so
//! a sweep reads the current buffer and writes the next one; [`Grid::swap`]
//! flips which slot is current without copying data.

use crate::error::{Error, Result};

/// Interior dimensions of a grid, with helpers for the padded layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    /// Interior rows, excluding the halo.
    pub height: usize,
    /// Interior columns, excluding the halo.
    pub width: usize,
}

impl GridDims {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Rows including the halo.
    #[inline]
    pub fn padded_height(&self) -> usize {
        self.height + 2
    }

    /// Columns including the halo.
    #[inline]
    pub fn padded_width(&self) -> usize {
        self.width + 2
    }

    /// Total cells in a padded buffer.
    #[inline]
    pub fn padded_len(&self) -> usize {
        self.padded_height() * self.padded_width()
    }

    /// Linear index of padded cell (i, j).
    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        i * self.padded_width() + j
    }

    /// Whether padded cell (i, j) lies on the outer halo border.
    #[inline]
    pub fn on_halo(&self, i: usize, j: usize) -> bool {
        i == 0 || j == 0 || i == self.padded_height() - 1 || j == self.padded_width() - 1
    }
}

/// Double-buffered padded temperature field.
#[derive(Debug, Clone)]
pub struct Grid {
    dims: GridDims,
    bufs: [Vec<f64>; 2],
    current: usize,
}

impl Grid {
    /// Embed an H x W interior field into a padded grid.
    ///
    /// `values` is row-major with `height * width` elements. Every halo cell
    /// is set to `border`; both backing buffers start from the same state.
    pub fn from_interior(values: &[f64], height: usize, width: usize, border: f64) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(Error::EmptyDomain);
        }
        if values.len() != height * width {
            return Err(Error::BadBufferLength {
                len: values.len(),
                height,
                width,
            });
        }

        let dims = GridDims::new(height, width);
        let mut buf = vec![border; dims.padded_len()];
        for i in 0..height {
            let src = &values[i * width..(i + 1) * width];
            let start = dims.idx(i + 1, 1);
            buf[start..start + width].copy_from_slice(src);
        }

        Ok(Self {
            dims,
            bufs: [buf.clone(), buf],
            current: 0,
        })
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// The buffer holding the latest completed sweep.
    pub fn current(&self) -> &[f64] {
        &self.bufs[self.current]
    }

    /// Split borrow of (current, next) for one sweep.
    ///
    /// The sweep reads only from the first slice and writes only to the
    /// second; the disjoint buffers are what make the update Jacobi rather
    /// than Gauss-Seidel.
    pub fn pair_mut(&mut self) -> (&[f64], &mut [f64]) {
        let (lo, hi) = self.bufs.split_at_mut(1);
        if self.current == 0 {
            (&lo[0], &mut hi[0])
        } else {
            (&hi[0], &mut lo[0])
        }
    }

    /// Make the next buffer current. Flips the slot index; no data moves.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Read a single cell in padded coordinates.
    #[inline]
    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.bufs[self.current][self.dims.idx(i, j)]
    }

    /// Overwrite the current buffer, e.g. with a field read back from a
    /// compute device. Length must match the padded layout.
    pub fn write_current(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.dims.padded_len() {
            return Err(Error::BadBufferLength {
                len: values.len(),
                height: self.dims.padded_height(),
                width: self.dims.padded_width(),
            });
        }
        self.bufs[self.current].copy_from_slice(values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_with_border() {
        let grid = Grid::from_interior(&[1.0, 2.0, 3.0, 4.0], 2, 2, 9.0).unwrap();
        assert_eq!(grid.dims().padded_height(), 4);
        assert_eq!(grid.dims().padded_width(), 4);

        // Halo everywhere on the border
        for j in 0..4 {
            assert_eq!(grid.value(0, j), 9.0);
            assert_eq!(grid.value(3, j), 9.0);
        }
        assert_eq!(grid.value(1, 0), 9.0);
        assert_eq!(grid.value(2, 3), 9.0);

        // Interior row-major
        assert_eq!(grid.value(1, 1), 1.0);
        assert_eq!(grid.value(1, 2), 2.0);
        assert_eq!(grid.value(2, 1), 3.0);
        assert_eq!(grid.value(2, 2), 4.0);
    }

    #[test]
    fn test_rejects_bad_length() {
        let err = Grid::from_interior(&[1.0, 2.0, 3.0], 2, 2, 0.0).unwrap_err();
        assert!(matches!(err, Error::BadBufferLength { len: 3, .. }));
    }

    #[test]
    fn test_rejects_empty_domain() {
        let err = Grid::from_interior(&[], 0, 4, 0.0).unwrap_err();
        assert!(matches!(err, Error::EmptyDomain));
    }

    #[test]
    fn test_swap_flips_buffers() {
        let mut grid = Grid::from_interior(&[1.0], 1, 1, 0.0).unwrap();
        {
            let (_, next) = grid.pair_mut();
            let mid = next.len() / 2;
            next[mid] = 42.0;
        }
        assert_eq!(grid.value(1, 1), 1.0);
        grid.swap();
        assert_eq!(grid.value(1, 1), 42.0);
        grid.swap();
        assert_eq!(grid.value(1, 1), 1.0);
    }

    #[test]
    fn test_pair_mut_is_disjoint() {
        let mut grid = Grid::from_interior(&[5.0, 6.0], 1, 2, 0.0).unwrap();
        let (cur, next) = grid.pair_mut();
        // Writing the whole next buffer leaves the current one untouched.
        let snapshot: Vec<f64> = cur.to_vec();
        next.fill(-1.0);
        assert_eq!(cur, snapshot.as_slice());
    }
}
