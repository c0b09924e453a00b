//! The remembered convention of the last successful resolution.
//!
//! Sequential pages in one directory almost always share an extension and a
//! padding width, so the last hit is tried first on the next lookup. After the
//! first page of a chapter, every following page typically resolves in a
//! single attempt.
//!
//! The cache is a plain value. [`ImageResolver`](super::ImageResolver) owns one
//! per collection; [`resolve_with`](super::resolve_with) takes one by mutable
//! reference. It is never written to disk.

use super::candidates::{Candidate, DEFAULT_PADDING_WIDTHS, ImageFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverCache {
    pub format: ImageFormat,
    pub padding: u8,
}

impl ResolverCache {
    /// Start from the first entry of each priority list.
    ///
    /// Empty lists fall back to the default priority heads.
    pub fn new(formats: &[ImageFormat], paddings: &[u8]) -> Self {
        Self {
            format: formats.first().copied().unwrap_or(ImageFormat::ALL[0]),
            padding: paddings.first().copied().unwrap_or(DEFAULT_PADDING_WIDTHS[0]),
        }
    }

    /// The candidate to try first.
    pub fn hint(&self) -> Candidate {
        Candidate::new(self.format, self.padding)
    }

    /// Remember a successful candidate.
    pub fn record(&mut self, candidate: Candidate) {
        self.format = candidate.format;
        self.padding = candidate.padding;
    }
}

impl Default for ResolverCache {
    fn default() -> Self {
        Self::new(&ImageFormat::ALL, &DEFAULT_PADDING_WIDTHS)
    }
}
