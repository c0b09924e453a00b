//! Shared test utilities for the tankobon test suite.
//!
//! Builds throwaway collection directories on disk. Files whose extension the
//! `image` crate can encode become real (tiny) images so [`FsLoader`] decodes
//! them; anything else is written as placeholder bytes.
//!
//! [`FsLoader`]: crate::resolver::FsLoader
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_collection("010-Berserk", &["1.png", "02.jpg", "notes.txt"]);
//! let dir = tmp.path().join("010-Berserk");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Write a `width`×`height` image at `dir/name`, encoded by extension.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 180, 160]))
        .save(&path)
        .unwrap_or_else(|e| panic!("failed to write test image {}: {e}", path.display()));
    path
}

fn encodable(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e, "png" | "jpg" | "jpeg"))
}

/// Create `tmp/<dir_name>/` holding the given files.
pub fn setup_collection(dir_name: &str, files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(dir_name);
    std::fs::create_dir_all(&dir).unwrap();
    for name in files {
        if encodable(name) {
            write_image(&dir, name, 4, 6);
        } else {
            std::fs::write(dir.join(name), b"placeholder").unwrap();
        }
    }
    tmp
}
