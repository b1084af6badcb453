//! A grid pack laid out on disk, for [`storage::FileFetcher`] and CLI tests.

use std::path::Path;
use tempfile::TempDir;

use crate::fixtures::{bounds, hour_file, manifest_json};
use crate::generators::{create_ozone_grid, npy_bytes, EXAMPLE_4X4};

/// A temporary directory holding `manifest.json` and hour files.
///
/// The directory is removed when the pack is dropped.
pub struct GridPack {
    dir: TempDir,
}

impl GridPack {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::Builder::new()
                .prefix("ozone_pack")
                .tempdir()
                .expect("Failed to create temporary pack directory"),
        }
    }

    /// The 4x4 example: six hours, hour `i` offset by `i` ppb.
    pub fn example() -> Self {
        let pack = Self::empty();
        pack.write("manifest.json", manifest_json(4, 4, bounds::EXAMPLE, 6).as_bytes());
        for hour in 0..6u32 {
            let values: Vec<f32> = EXAMPLE_4X4.iter().map(|v| v + hour as f32).collect();
            pack.write(&hour_file(hour), &npy_bytes(1, 4, 4, &values));
        }
        pack
    }

    /// A CONUS-shaped pack with `hours` smooth ozone fields.
    pub fn conus(rows: usize, cols: usize, hours: u32) -> Self {
        let pack = Self::empty();
        pack.write(
            "manifest.json",
            manifest_json(rows, cols, bounds::CONUS, hours).as_bytes(),
        );
        let values = create_ozone_grid(rows, cols);
        for hour in 0..hours {
            pack.write(&hour_file(hour), &npy_bytes(2, rows, cols, &values));
        }
        pack
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.dir.path().join(name), contents).expect("Failed to write pack file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_pack_files() {
        let pack = GridPack::example();
        assert!(pack.path().join("manifest.json").exists());
        assert!(pack.path().join("ozone_h05.npy").exists());
        assert!(!pack.path().join("ozone_h06.npy").exists());
    }
}
