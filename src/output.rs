//! CLI output formatting.
//!
//! Every command's result is rendered by a pure `format_*` function returning
//! `Vec<String>`, with a `print_*` wrapper that writes to stdout. Diagnostics
//! go through `tracing` to stderr instead, so stdout stays clean.
//!
//! Entities follow a two-level pattern: a header line led by a 3-digit
//! positional index, then indented context lines.
//!
//! ```text
//! Library (2 collections, theme: light)
//! 001 One Piece [3f2a9c1b0d4e]
//!     Source: /manga/010-One-Piece
//!     25 images, 5 chapters of 6
//!     Reading: chapter 2, zoom 1.25x
//! ```
//!
//! Chapter numbers are shown 1-based; the library stores them 0-based.

use crate::chapters::{self, ImageCollection};
use crate::config::ViewerConfig;
use crate::library::{Library, LibraryEntry, ReadingState};
use crate::reader::{ChapterPages, CheckReport};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Render an inclusive 1-based page span.
fn page_span(start: usize, end: usize) -> String {
    if end <= start + 1 {
        format!("image {}", start + 1)
    } else {
        format!("images {}-{}", start + 1, end)
    }
}

// ============================================================================
// Library
// ============================================================================

pub fn format_library(library: &Library, viewer: &ViewerConfig) -> Vec<String> {
    let entries = library.entries();
    let mut lines = vec![format!(
        "Library ({}, theme: {})",
        plural(entries.len(), "collection"),
        library.theme
    )];
    for (i, entry) in entries.iter().enumerate() {
        lines.extend(format_entry(i + 1, entry, &library.progress(&entry.id, viewer)));
    }
    lines
}

fn format_entry(pos: usize, entry: &LibraryEntry, state: &ReadingState) -> Vec<String> {
    vec![
        format!("{} {} [{}]", format_index(pos), entry.title, entry.id),
        format!("{}Source: {}", indent(1), entry.base_path.display()),
        format!(
            "{}{}, {} of {}",
            indent(1),
            plural(entry.total_image_count, "image"),
            plural(entry.total_chapters, "chapter"),
            entry.images_per_chapter
        ),
        format!(
            "{}Reading: chapter {}, zoom {}x",
            indent(1),
            state.chapter + 1,
            state.zoom
        ),
    ]
}

pub fn print_library(library: &Library, viewer: &ViewerConfig) {
    for line in format_library(library, viewer) {
        println!("{}", line);
    }
}

// ============================================================================
// Chapter table
// ============================================================================

/// One line per chapter with its image span, marking the current chapter.
pub fn format_chapter_table(
    entry: &LibraryEntry,
    collection: &ImageCollection,
    current: usize,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({})",
        entry.title,
        plural(collection.total_chapters(), "chapter")
    )];
    for (i, range) in chapters::all_bounds(collection).iter().enumerate() {
        let marker = if i == current { "  <" } else { "" };
        lines.push(format!(
            "{}{} {} ({}){}",
            indent(1),
            format_index(i + 1),
            page_span(range.start, range.end),
            plural(range.len(), "page"),
            marker
        ));
    }
    lines
}

pub fn print_chapter_table(entry: &LibraryEntry, collection: &ImageCollection, current: usize) {
    for line in format_chapter_table(entry, collection, current) {
        println!("{}", line);
    }
}

// ============================================================================
// Loaded chapter
// ============================================================================

pub fn format_chapter(title: &str, total_chapters: usize, chapter: &ChapterPages) -> Vec<String> {
    let mut lines = vec![format!(
        "{} - chapter {}/{} ({})",
        title,
        chapter.chapter + 1,
        total_chapters,
        page_span(chapter.range.start, chapter.range.end)
    )];
    for page in &chapter.pages {
        let name = page
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        lines.push(format!(
            "{}{} {} ({}x{})",
            indent(1),
            format_index(page.number),
            name,
            page.dimensions.width,
            page.dimensions.height
        ));
    }
    if !chapter.missing.is_empty() {
        lines.push(format!(
            "{}Missing: {}",
            indent(1),
            join_numbers(&chapter.missing)
        ));
    }
    lines
}

pub fn print_chapter(title: &str, total_chapters: usize, chapter: &ChapterPages) {
    for line in format_chapter(title, total_chapters, chapter) {
        println!("{}", line);
    }
}

fn join_numbers(numbers: &[usize]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Check report
// ============================================================================

pub fn format_check(title: &str, report: &CheckReport) -> Vec<String> {
    let mut lines = vec![format!("Checking {}", title)];
    for check in report.chapters.iter().filter(|c| !c.missing.is_empty()) {
        lines.push(format!(
            "{}{} missing {}",
            indent(1),
            format_index(check.chapter + 1),
            join_numbers(&check.missing)
        ));
    }
    if report.is_complete() {
        lines.push(format!(
            "All pages resolved ({})",
            plural(report.attempts, "load attempt")
        ));
    } else {
        lines.push(format!(
            "{} missing across {} ({})",
            plural(report.missing_count(), "page"),
            plural(report.chapters.len(), "chapter"),
            plural(report.attempts, "load attempt")
        ));
    }
    lines
}

pub fn print_check(title: &str, report: &CheckReport) {
    for line in format_check(title, report) {
        println!("{}", line);
    }
}
