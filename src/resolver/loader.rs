//! The load primitive the resolver probes candidates with.
//!
//! [`ImageLoader`] is the single seam between resolution logic and the
//! filesystem. The production implementation, [`FsLoader`], accepts a path
//! only if it is a regular file whose header decodes as an image. Tests inject
//! [`tests::MockLoader`], which answers from an in-memory set of paths and
//! records every attempt.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a single candidate was rejected. Never surfaced past the resolver.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),
    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Pixel dimensions of a successfully loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Attempts to load one image. `Sync` so a resolver can be shared by workers.
pub trait ImageLoader: Sync {
    fn attempt_load(&self, path: &Path) -> Result<Dimensions, LoadError>;
}

/// Loads from the local filesystem by decoding the image header.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl ImageLoader for FsLoader {
    fn attempt_load(&self, path: &Path) -> Result<Dimensions, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotAFile(path.to_path_buf()));
        }
        let (width, height) =
            image::image_dimensions(path).map_err(|e| LoadError::Decode(e.to_string()))?;
        Ok(Dimensions { width, height })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Mock loader that succeeds for a fixed set of paths and records attempts.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockLoader {
        pub existing: HashSet<PathBuf>,
        pub attempts: Mutex<Vec<PathBuf>>,
    }

    impl MockLoader {
        pub fn new() -> Self {
            Self::default()
        }

        /// A loader where `dir/<name>` exists for every name given.
        pub fn with_files(dir: &str, names: &[&str]) -> Self {
            Self {
                existing: names.iter().map(|n| Path::new(dir).join(n)).collect(),
                attempts: Mutex::new(Vec::new()),
            }
        }

        pub fn get_attempts(&self) -> Vec<PathBuf> {
            self.attempts.lock().unwrap().clone()
        }

        /// File names attempted, in order.
        pub fn attempted_names(&self) -> Vec<String> {
            self.get_attempts()
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
                .collect()
        }

        pub fn clear_attempts(&self) {
            self.attempts.lock().unwrap().clear();
        }
    }

    impl ImageLoader for MockLoader {
        fn attempt_load(&self, path: &Path) -> Result<Dimensions, LoadError> {
            self.attempts.lock().unwrap().push(path.to_path_buf());
            if self.existing.contains(path) {
                Ok(Dimensions {
                    width: 800,
                    height: 1200,
                })
            } else {
                Err(LoadError::NotAFile(path.to_path_buf()))
            }
        }
    }

    #[test]
    fn mock_records_attempts_in_order() {
        let loader = MockLoader::with_files("/m", &["1.png"]);
        assert!(loader.attempt_load(Path::new("/m/1.webp")).is_err());
        assert!(loader.attempt_load(Path::new("/m/1.png")).is_ok());
        assert_eq!(loader.attempted_names(), vec!["1.webp", "1.png"]);
    }

    #[test]
    fn fs_loader_rejects_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = FsLoader.attempt_load(&tmp.path().join("1.png")).unwrap_err();
        assert!(matches!(err, LoadError::NotAFile(_)));
    }

    #[test]
    fn fs_loader_rejects_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            FsLoader.attempt_load(tmp.path()),
            Err(LoadError::NotAFile(_))
        ));
    }

    #[test]
    fn fs_loader_rejects_undecodable_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("1.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            FsLoader.attempt_load(&path),
            Err(LoadError::Decode(_))
        ));
    }

    #[test]
    fn fs_loader_reads_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = crate::test_helpers::write_image(tmp.path(), "001.png", 3, 5);
        assert_eq!(
            FsLoader.attempt_load(&path).unwrap(),
            Dimensions {
                width: 3,
                height: 5
            }
        );
    }
}
