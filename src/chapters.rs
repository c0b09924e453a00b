//! Chapter boundaries for a collection of sequentially numbered images.
//!
//! A collection does not carry real chapter markers. The user declares roughly
//! how many chapters it has, and the images are divided evenly:
//!
//! ```text
//! images_per_chapter = max(1, round(total_images / declared_chapters))
//! total_chapters     = max(1, ceil(total_images / images_per_chapter))
//! ```
//!
//! Chapter `i` covers the half-open, 0-based image range
//! `[i * images_per_chapter, min((i + 1) * images_per_chapter, total_images))`.
//! Consecutive chapters are contiguous and together cover every image exactly
//! once. The last chapter absorbs the remainder and may be shorter than the
//! others; no padding chapter is ever created.
//!
//! Everything here is pure arithmetic over [`ImageCollection`] values and safe
//! to call from any thread.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChapterError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Chapter {chapter} out of range (collection has {total} chapters)")]
    OutOfRange { chapter: i64, total: usize },
}

/// A directory of sequentially numbered images plus the user's chapter estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCollection {
    pub base_path: PathBuf,
    pub total_image_count: usize,
    pub declared_chapter_count: usize,
}

impl ImageCollection {
    /// Build a collection, rejecting an empty path and zero counts.
    pub fn new(
        base_path: impl Into<PathBuf>,
        total_image_count: usize,
        declared_chapter_count: usize,
    ) -> Result<Self, ChapterError> {
        let base_path = base_path.into();
        if base_path.as_os_str().is_empty() {
            return Err(ChapterError::InvalidArgument(
                "base path must not be empty".into(),
            ));
        }
        if total_image_count == 0 {
            return Err(ChapterError::InvalidArgument(
                "total image count must be at least 1".into(),
            ));
        }
        if declared_chapter_count == 0 {
            return Err(ChapterError::InvalidArgument(
                "declared chapter count must be at least 1".into(),
            ));
        }
        Ok(Self {
            base_path,
            total_image_count,
            declared_chapter_count,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// `round(total / declared)`, rounding halves up, never below 1.
    pub fn images_per_chapter(&self) -> usize {
        let total = self.total_image_count;
        let declared = self.declared_chapter_count.max(1);
        ((2 * total + declared) / (2 * declared)).max(1)
    }

    /// `ceil(total / images_per_chapter)`, never below 1.
    pub fn total_chapters(&self) -> usize {
        self.total_image_count
            .div_ceil(self.images_per_chapter())
            .max(1)
    }
}

/// Half-open range `[start, end)` of 0-based image indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRange {
    pub start: usize,
    pub end: usize,
}

impl ChapterRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the 0-based image index falls inside this chapter.
    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    /// The 1-based image numbers the resolver expects for this chapter.
    pub fn image_numbers(&self) -> Range<usize> {
        self.start + 1..self.end + 1
    }
}

/// Image range for `chapter_index`.
///
/// Callers are expected to clamp with [`clamp_chapter`] first; anything
/// outside `[0, total_chapters)` is rejected rather than clamped here.
pub fn bounds_for(
    collection: &ImageCollection,
    chapter_index: i64,
) -> Result<ChapterRange, ChapterError> {
    let total = collection.total_chapters();
    let chapter = usize::try_from(chapter_index)
        .ok()
        .filter(|&c| c < total)
        .ok_or(ChapterError::OutOfRange {
            chapter: chapter_index,
            total,
        })?;

    let per = collection.images_per_chapter();
    let start = chapter * per;
    let end = ((chapter + 1) * per).min(collection.total_image_count);
    Ok(ChapterRange { start, end })
}

/// Clamp a requested chapter into `[0, total_chapters - 1]`.
pub fn clamp_chapter(collection: &ImageCollection, requested: i64) -> usize {
    let last = collection.total_chapters() - 1;
    usize::try_from(requested).map_or(0, |c| c.min(last))
}

/// Ranges for every chapter in order.
pub fn all_bounds(collection: &ImageCollection) -> Vec<ChapterRange> {
    let per = collection.images_per_chapter();
    (0..collection.total_chapters())
        .map(|chapter| ChapterRange {
            start: chapter * per,
            end: ((chapter + 1) * per).min(collection.total_image_count),
        })
        .collect()
}
