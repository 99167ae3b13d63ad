//! Building source over a directory of NumPy arrays.
//!
//! Data layout, per building id: `{id}_domain.npy` holds the H x W initial
//! temperature field (f64, with an f32 fallback for GPU-oriented data
//! sets), `{id}_interior.npy` the H x W boolean room mask. The worklist is
//! `building_ids.txt`, one id per line.

use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use ndarray_npy::ReadNpyExt;

use floorheat_batch::{BuildingDomain, BuildingSource, SourceError};
use floorheat_core::{Grid, InteriorMask};

/// Worklist file name inside the data directory.
pub const WORKLIST_FILE: &str = "building_ids.txt";

/// Loads building domains from `.npy` files in one directory.
pub struct NpyDirectorySource {
    dir: PathBuf,
    /// Fixed boundary value for the grid halo. The production data sets pad
    /// with zeros and carry the boundary temperatures inside the field edge.
    border: f64,
}

impl NpyDirectorySource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, border: 0.0 }
    }

    pub fn with_border(mut self, border: f64) -> Self {
        self.border = border;
        self
    }

    /// Read the worklist, truncated to the first `count` ids.
    pub fn read_worklist(&self, count: usize) -> std::io::Result<Vec<String>> {
        let text = std::fs::read_to_string(self.dir.join(WORKLIST_FILE))?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(count)
            .map(str::to_string)
            .collect())
    }

    fn domain_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}_domain.npy"))
    }

    fn mask_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}_interior.npy"))
    }
}

fn open(path: &Path) -> Result<File, SourceError> {
    File::open(path).map_err(|e| format!("{}: {e}", path.display()).into())
}

/// Read a 2D float array, trying f64 first and falling back to f32.
fn read_field(path: &Path) -> Result<Array2<f64>, SourceError> {
    match Array2::<f64>::read_npy(open(path)?) {
        Ok(array) => Ok(array),
        Err(_) => {
            let array = Array2::<f32>::read_npy(open(path)?)
                .map_err(|e| format!("{}: {e}", path.display()))?;
            Ok(array.mapv(f64::from))
        }
    }
}

fn read_mask(path: &Path) -> Result<Array2<bool>, SourceError> {
    Array2::<bool>::read_npy(open(path)?)
        .map_err(|e| format!("{}: {e}", path.display()).into())
}

impl BuildingSource for NpyDirectorySource {
    fn load(&self, id: &str) -> Result<BuildingDomain, SourceError> {
        let field = read_field(&self.domain_path(id))?;
        let mask = read_mask(&self.mask_path(id))?;

        let (height, width) = field.dim();
        let values: Vec<f64> = field.iter().copied().collect();
        let grid = Grid::from_interior(&values, height, width, self.border)?;

        let (mask_height, mask_width) = mask.dim();
        let cells: Vec<bool> = mask.iter().copied().collect();
        let mask = InteriorMask::new(cells, mask_height, mask_width)?;

        // Field/mask misalignment surfaces here instead of at solve time so
        // the failure names the offending building.
        mask.check_alignment(&grid)?;

        Ok(BuildingDomain { grid, mask })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_npy::WriteNpyExt;
    use std::io::Write;

    fn write_building(dir: &Path, id: &str, field: &Array2<f64>, mask: &Array2<bool>) {
        let f = File::create(dir.join(format!("{id}_domain.npy"))).unwrap();
        field.write_npy(f).unwrap();
        let f = File::create(dir.join(format!("{id}_interior.npy"))).unwrap();
        mask.write_npy(f).unwrap();
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let field = Array2::from_shape_fn((3, 4), |(i, j)| (i * 4 + j) as f64);
        let mask = Array2::from_shape_fn((3, 4), |(i, j)| i != j);
        write_building(dir.path(), "b1", &field, &mask);

        let source = NpyDirectorySource::new(dir.path().to_path_buf());
        let domain = source.load("b1").unwrap();

        assert_eq!(domain.grid.dims().height, 3);
        assert_eq!(domain.grid.dims().width, 4);
        assert_eq!(domain.grid.value(1, 1), 0.0);
        assert_eq!(domain.grid.value(3, 4), 11.0);
        assert_eq!(domain.grid.value(0, 0), 0.0); // border
        assert!(!domain.mask.is_room(0, 0));
        assert!(domain.mask.is_room(0, 1));
    }

    #[test]
    fn test_f32_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let field32 = Array2::<f32>::from_shape_fn((2, 2), |(i, j)| (i + j) as f32 + 0.5);
        let f = File::create(dir.path().join("b2_domain.npy")).unwrap();
        field32.write_npy(f).unwrap();
        let mask = Array2::from_elem((2, 2), true);
        let f = File::create(dir.path().join("b2_interior.npy")).unwrap();
        mask.write_npy(f).unwrap();

        let source = NpyDirectorySource::new(dir.path().to_path_buf());
        let domain = source.load("b2").unwrap();
        assert_eq!(domain.grid.value(1, 1), 0.5);
        assert_eq!(domain.grid.value(2, 2), 2.5);
    }

    #[test]
    fn test_misaligned_mask_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let field = Array2::<f64>::zeros((3, 3));
        let mask = Array2::from_elem((2, 3), true);
        write_building(dir.path(), "b3", &field, &mask);

        let source = NpyDirectorySource::new(dir.path().to_path_buf());
        let err = source.load("b3").unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = NpyDirectorySource::new(dir.path().to_path_buf());
        let err = source.load("ghost").unwrap_err();
        assert!(err.to_string().contains("ghost_domain.npy"));
    }

    #[test]
    fn test_worklist_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = File::create(dir.path().join(WORKLIST_FILE)).unwrap();
        writeln!(f, "one\ntwo\n\nthree\nfour").unwrap();

        let source = NpyDirectorySource::new(dir.path().to_path_buf());
        let ids = source.read_worklist(3).unwrap();
        assert_eq!(ids, vec!["one", "two", "three"]);
    }
}
