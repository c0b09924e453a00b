//! # Tankobon
//!
//! A chapter-paged reader for local manga and image-sequence directories.
//! A collection is a directory of sequentially numbered images; tankobon
//! splits it into chapters from a declared chapter count and finds each page
//! by number without listing the directory.
//!
//! # Architecture
//!
//! Reading a chapter is two steps:
//!
//! ```text
//! 1. Bounds    collection + chapter  →  [start, end)       (pure arithmetic)
//! 2. Resolve   base path + page no.  →  file on disk       (guess, load, remember)
//! ```
//!
//! The [`reader`] module runs both for a whole chapter. The [`library`] module
//! keeps registered collections and reading progress between runs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`chapters`] | `ImageCollection`, chapter ranges, clamping |
//! | [`resolver`] | Candidate generation, convention cache, `ImageLoader` seam |
//! | [`reader`] | Load a chapter's pages in order, collect missing pages |
//! | [`library`] | `library.json`: collections, reading state, theme |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`naming`] | `NNN-name` directory titles |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Guessing Instead of Listing
//!
//! Page `n` is found by trying `(extension, padding)` pairs: `n.webp`,
//! `0n.webp`, `00n.webp`, `n.jpg`, and so on. Whatever works is remembered and
//! tried first for the next page. Directories are almost always consistent, so
//! after the first page of a chapter each lookup costs a single open.
//!
//! ## One Cache Per Collection
//!
//! The remembered convention lives in an [`resolver::ImageResolver`], and a
//! resolver serves one collection. Two collections with different conventions
//! never fight over the same hint, and tests get a fresh cache every time.
//!
//! ## Missing Pages Are Not Errors
//!
//! Scanned collections have gaps. A page no candidate resolves is reported
//! as [`resolver::Resolution::NotFound`] and skipped by the reader. Errors are
//! reserved for requests that are wrong by construction: page 0, an empty
//! path, a chapter past the end.

pub mod chapters;
pub mod config;
pub mod library;
pub mod naming;
pub mod output;
pub mod reader;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_helpers;
