//! Registered collections and per-collection reading state.
//!
//! The library is a single JSON file, `library.json`, in the data directory.
//! It holds three things:
//!
//! - the theme preference (light or dark),
//! - the registered collections, in the order they were added,
//! - reading progress per collection: current chapter, scroll offset, zoom.
//!
//! # Identity
//!
//! A collection's id is the first 12 hex characters of the SHA-256 of its
//! canonical directory path. Registering the same directory twice is an
//! error, and commands accept any unique id prefix (like short git hashes).
//!
//! # Robustness
//!
//! A missing, unreadable, or corrupt `library.json`, or one written by a
//! different format version, loads as an empty library. A warning is logged
//! so the user knows why their shelf is empty; nothing is overwritten until
//! the next save.

use crate::chapters::{self, ChapterError, ImageCollection};
use crate::config::ViewerConfig;
use crate::naming;
use crate::resolver::ImageFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Name of the library file within the data directory.
const LIBRARY_FILENAME: &str = "library.json";

/// Version of the library file format. Bump when the layout changes.
const LIBRARY_VERSION: u32 = 1;

/// Length of a collection id in hex characters.
const ID_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Chapter(#[from] ChapterError),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("No images found in {0}")]
    NoImages(PathBuf),
    #[error("Collection already registered as {0}")]
    AlreadyRegistered(String),
    #[error("No collection matches '{0}'")]
    UnknownCollection(String),
    #[error("'{0}' matches more than one collection")]
    AmbiguousId(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// A registered collection.
///
/// `images_per_chapter` and `total_chapters` are derived and stored only for
/// display; they are recomputed whenever the counts change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub id: String,
    pub title: String,
    pub base_path: PathBuf,
    pub total_image_count: usize,
    pub declared_chapter_count: usize,
    pub images_per_chapter: usize,
    pub total_chapters: usize,
}

impl LibraryEntry {
    fn new(
        id: String,
        title: String,
        base_path: PathBuf,
        total_image_count: usize,
        declared_chapter_count: usize,
    ) -> Result<Self, ChapterError> {
        let collection =
            ImageCollection::new(base_path.clone(), total_image_count, declared_chapter_count)?;
        Ok(Self {
            id,
            title,
            base_path,
            total_image_count,
            declared_chapter_count,
            images_per_chapter: collection.images_per_chapter(),
            total_chapters: collection.total_chapters(),
        })
    }

    pub fn collection(&self) -> Result<ImageCollection, ChapterError> {
        ImageCollection::new(
            self.base_path.clone(),
            self.total_image_count,
            self.declared_chapter_count,
        )
    }
}

/// Where the reader left off in one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingState {
    /// 0-based current chapter, always within the collection.
    pub chapter: usize,
    /// Vertical scroll offset in pixels, never negative.
    pub scroll: f64,
    pub zoom: f64,
}

impl ReadingState {
    pub fn new(viewer: &ViewerConfig) -> Self {
        Self {
            chapter: 0,
            scroll: 0.0,
            zoom: viewer.default_zoom,
        }
    }

    /// Move to `requested`, clamped into the collection. Resets scroll on change.
    pub fn set_chapter(&mut self, collection: &ImageCollection, requested: i64) -> usize {
        let chapter = chapters::clamp_chapter(collection, requested);
        if chapter != self.chapter {
            self.chapter = chapter;
            self.scroll = 0.0;
        }
        chapter
    }

    /// Move to a 1-based chapter number as typed by the user.
    pub fn open_chapter(&mut self, collection: &ImageCollection, number: i64) -> usize {
        self.set_chapter(collection, number.saturating_sub(1))
    }

    pub fn next_chapter(&mut self, collection: &ImageCollection) -> usize {
        self.set_chapter(collection, self.chapter as i64 + 1)
    }

    pub fn prev_chapter(&mut self, collection: &ImageCollection) -> usize {
        self.set_chapter(collection, self.chapter as i64 - 1)
    }

    pub fn set_scroll(&mut self, scroll: f64) {
        self.scroll = if scroll.is_finite() { scroll.max(0.0) } else { 0.0 };
    }

    pub fn zoom_in(&mut self, viewer: &ViewerConfig) -> f64 {
        self.zoom = viewer.clamp_zoom(self.zoom + viewer.zoom_step);
        self.zoom
    }

    pub fn zoom_out(&mut self, viewer: &ViewerConfig) -> f64 {
        self.zoom = viewer.clamp_zoom(self.zoom - viewer.zoom_step);
        self.zoom
    }

    pub fn reset_zoom(&mut self, viewer: &ViewerConfig) -> f64 {
        self.zoom = viewer.default_zoom;
        self.zoom
    }
}

/// Everything persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    pub version: u32,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    collections: Vec<LibraryEntry>,
    #[serde(default)]
    progress: BTreeMap<String, ReadingState>,
}

impl Default for Library {
    fn default() -> Self {
        Self::empty()
    }
}

impl Library {
    pub fn empty() -> Self {
        Self {
            version: LIBRARY_VERSION,
            theme: Theme::default(),
            collections: Vec::new(),
            progress: BTreeMap::new(),
        }
    }

    /// Load from the data directory. Returns an empty library if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(LIBRARY_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::empty(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "library unreadable, starting empty");
                return Self::empty();
            }
        };
        let library: Self = match serde_json::from_str(&content) {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "library corrupt, starting empty");
                return Self::empty();
            }
        };
        if library.version != LIBRARY_VERSION {
            tracing::warn!(
                path = %path.display(),
                found = library.version,
                expected = LIBRARY_VERSION,
                "library version mismatch, starting empty"
            );
            return Self::empty();
        }
        library
    }

    /// Save to the data directory, creating it if needed.
    pub fn save(&self, data_dir: &Path) -> Result<(), LibraryError> {
        fs::create_dir_all(data_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(data_dir.join(LIBRARY_FILENAME), json)?;
        Ok(())
    }

    /// Registered collections in insertion order.
    pub fn entries(&self) -> &[LibraryEntry] {
        &self.collections
    }

    /// Register a directory as a collection.
    ///
    /// `images` defaults to the number of image files directly inside `dir`;
    /// `title` defaults to the directory name.
    pub fn register(
        &mut self,
        dir: &Path,
        title: Option<String>,
        images: Option<usize>,
        chapters: usize,
    ) -> Result<&LibraryEntry, LibraryError> {
        if !dir.is_dir() {
            return Err(LibraryError::NotADirectory(dir.to_path_buf()));
        }
        let base_path = fs::canonicalize(dir)?;
        let id = collection_id(&base_path);
        if self.collections.iter().any(|e| e.id == id) {
            return Err(LibraryError::AlreadyRegistered(id));
        }

        let total = match images {
            Some(n) => n,
            None => count_images(&base_path)?,
        };
        if total == 0 {
            return Err(LibraryError::NoImages(base_path));
        }
        let title = title.unwrap_or_else(|| naming::collection_title(&base_path));
        let entry = LibraryEntry::new(id, title, base_path, total, chapters)?;

        tracing::info!(
            id = %entry.id,
            title = %entry.title,
            images = entry.total_image_count,
            chapters = entry.total_chapters,
            "collection registered"
        );
        self.collections.push(entry);
        Ok(&self.collections[self.collections.len() - 1])
    }

    /// Remove a collection and its reading state.
    pub fn remove(&mut self, key: &str) -> Result<LibraryEntry, LibraryError> {
        let pos = self.position(key)?;
        let entry = self.collections.remove(pos);
        self.progress.remove(&entry.id);
        tracing::info!(id = %entry.id, title = %entry.title, "collection removed");
        Ok(entry)
    }

    /// Look up a collection by id or unique id prefix.
    pub fn get(&self, key: &str) -> Result<&LibraryEntry, LibraryError> {
        let pos = self.position(key)?;
        Ok(&self.collections[pos])
    }

    fn position(&self, key: &str) -> Result<usize, LibraryError> {
        if let Some(pos) = self.collections.iter().position(|e| e.id == key) {
            return Ok(pos);
        }
        let mut matches = self
            .collections
            .iter()
            .enumerate()
            .filter(|(_, e)| !key.is_empty() && e.id.starts_with(key))
            .map(|(i, _)| i);
        match (matches.next(), matches.next()) {
            (Some(pos), None) => Ok(pos),
            (Some(_), Some(_)) => Err(LibraryError::AmbiguousId(key.to_string())),
            (None, _) => Err(LibraryError::UnknownCollection(key.to_string())),
        }
    }

    /// Change a collection's title or counts. Progress is re-clamped.
    pub fn update(
        &mut self,
        key: &str,
        title: Option<String>,
        images: Option<usize>,
        chapters: Option<usize>,
    ) -> Result<&LibraryEntry, LibraryError> {
        let pos = self.position(key)?;
        let current = &self.collections[pos];
        let updated = LibraryEntry::new(
            current.id.clone(),
            title.unwrap_or_else(|| current.title.clone()),
            current.base_path.clone(),
            images.unwrap_or(current.total_image_count),
            chapters.unwrap_or(current.declared_chapter_count),
        )?;
        if let Some(state) = self.progress.get_mut(&updated.id) {
            let collection = updated.collection()?;
            state.set_chapter(&collection, state.chapter as i64);
        }
        self.collections[pos] = updated;
        Ok(&self.collections[pos])
    }

    /// Reading state for a collection, or a fresh one if never opened.
    ///
    /// The stored zoom is pinned to the current viewer bounds.
    pub fn progress(&self, id: &str, viewer: &ViewerConfig) -> ReadingState {
        let mut state = self
            .progress
            .get(id)
            .cloned()
            .unwrap_or_else(|| ReadingState::new(viewer));
        state.zoom = viewer.clamp_zoom(state.zoom);
        state
    }

    /// Mutable reading state, created on first access.
    pub fn progress_mut(&mut self, id: &str, viewer: &ViewerConfig) -> &mut ReadingState {
        let state = self
            .progress
            .entry(id.to_string())
            .or_insert_with(|| ReadingState::new(viewer));
        state.zoom = viewer.clamp_zoom(state.zoom);
        state
    }
}

/// Short content-addressed id for a canonical directory path.
pub fn collection_id(base_path: &Path) -> String {
    let digest = Sha256::digest(base_path.to_string_lossy().as_bytes());
    let hex = format!("{:x}", digest);
    hex[..ID_LEN].to_string()
}

/// Number of image files directly inside `dir`, by extension.
///
/// Extensions must match exactly (`1.png`, not `1.PNG`), since those are the
/// only names the resolver builds.
pub fn count_images(dir: &Path) -> io::Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let is_image = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| ImageFormat::ALL.iter().any(|f| f.extension() == e));
        if is_image {
            count += 1;
        }
    }
    Ok(count)
}
