//! Chapter loading: bounds plus resolution.
//!
//! [`load_chapter`] asks [`chapters::bounds_for`] for a chapter's image range
//! and resolves every page in it. Pages that cannot be resolved are recorded
//! in [`ChapterPages::missing`] and otherwise skipped, so a sparse collection
//! still reads through.
//!
//! ## Parallel Loading
//!
//! With `parallel = true` pages are resolved on the rayon pool. Results are
//! collected by index, so [`ChapterPages::pages`] is in reading order either
//! way. All workers share the collection's resolver; the first page to hit
//! warms the cache for the rest.

use crate::chapters::{self, ChapterError, ChapterRange, ImageCollection};
use crate::resolver::{
    Candidate, Dimensions, ImageLoader, ImageResolver, Resolution, ResolveError,
};
use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    #[error(transparent)]
    Chapter(#[from] ChapterError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// A resolved page ready to display.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Page {
    /// 1-based image number within the collection.
    pub number: usize,
    pub path: PathBuf,
    pub candidate: Candidate,
    pub dimensions: Dimensions,
}

/// One chapter's worth of resolved pages.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChapterPages {
    pub chapter: usize,
    pub range: ChapterRange,
    pub pages: Vec<Page>,
    /// 1-based numbers that no candidate resolved.
    pub missing: Vec<usize>,
    /// Total loads attempted across the chapter.
    pub attempts: usize,
}

impl ChapterPages {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Resolve every page of `chapter_index`.
pub fn load_chapter<L: ImageLoader>(
    collection: &ImageCollection,
    chapter_index: i64,
    resolver: &ImageResolver<L>,
    parallel: bool,
) -> Result<ChapterPages, ReaderError> {
    let range = chapters::bounds_for(collection, chapter_index)?;
    let base = collection.base_path();

    let resolutions: Vec<Resolution> = if parallel {
        range
            .image_numbers()
            .into_par_iter()
            .map(|n| resolver.resolve(base, n))
            .collect::<Result<_, _>>()?
    } else {
        range
            .image_numbers()
            .map(|n| resolver.resolve(base, n))
            .collect::<Result<_, _>>()?
    };

    let mut pages = Vec::with_capacity(range.len());
    let mut missing = Vec::new();
    let mut attempts = 0;
    for resolution in resolutions {
        attempts += resolution.attempts();
        match resolution {
            Resolution::Found(image) => pages.push(Page {
                number: image.index,
                path: image.path,
                candidate: image.candidate,
                dimensions: image.dimensions,
            }),
            Resolution::NotFound { index, .. } => {
                tracing::warn!(
                    base = %base.display(),
                    page = index,
                    "page not found, skipping"
                );
                missing.push(index);
            }
        }
    }

    Ok(ChapterPages {
        chapter: chapter_index as usize,
        range,
        pages,
        missing,
        attempts,
    })
}

/// Missing pages for one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterCheck {
    pub chapter: usize,
    pub range: ChapterRange,
    pub missing: Vec<usize>,
}

/// Result of resolving every page of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub chapters: Vec<ChapterCheck>,
    pub attempts: usize,
}

impl CheckReport {
    pub fn missing_count(&self) -> usize {
        self.chapters.iter().map(|c| c.missing.len()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_count() == 0
    }
}

/// Load every chapter in order and collect missing pages.
pub fn check_collection<L: ImageLoader>(
    collection: &ImageCollection,
    resolver: &ImageResolver<L>,
    parallel: bool,
) -> Result<CheckReport, ReaderError> {
    let mut report = CheckReport::default();
    for chapter in 0..collection.total_chapters() {
        let loaded = load_chapter(collection, chapter as i64, resolver, parallel)?;
        report.attempts += loaded.attempts;
        report.chapters.push(ChapterCheck {
            chapter: loaded.chapter,
            range: loaded.range,
            missing: loaded.missing,
        });
    }
    Ok(report)
}
