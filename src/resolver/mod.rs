//! Image resolution without a directory listing.
//!
//! Collections are plain directories of numbered images, but the numbering
//! convention varies: `1.webp`, `01.jpg`, `001.png`. Given a base path and a
//! 1-based index, the resolver tries (extension, padding) [`Candidate`]s in
//! priority order until the [`ImageLoader`] accepts one.
//!
//! | Piece | Role |
//! |---|---|
//! | [`candidates`] | Ordered guesses and file-name synthesis (pure) |
//! | [`ResolverCache`] | Last successful guess, tried first next time |
//! | [`ImageLoader`] | The load primitive; [`FsLoader`] in production |
//! | [`ImageResolver`] | One cache + loader per collection |
//!
//! Attempts run strictly one after another. Each costs one failed open at
//! most, and with the cache warm the first attempt almost always hits.
//!
//! An index with no loadable candidate yields [`Resolution::NotFound`], which
//! is a normal value: sparse collections are expected and readers skip the
//! page. Only structurally invalid requests return [`ResolveError`].

mod cache;
pub mod candidates;
pub mod loader;

pub use cache::ResolverCache;
pub use candidates::{Candidate, DEFAULT_PADDING_WIDTHS, ImageFormat, candidates, file_name};
pub use loader::{Dimensions, FsLoader, ImageLoader, LoadError};

use crate::config::ResolverConfig;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// A page that was found on disk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedImage {
    /// 1-based image index.
    pub index: usize,
    pub path: PathBuf,
    pub candidate: Candidate,
    /// Loads attempted, including the successful one.
    pub attempts: usize,
    pub dimensions: Dimensions,
}

/// Outcome of resolving one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedImage),
    NotFound { index: usize, attempts: usize },
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn index(&self) -> usize {
        match self {
            Resolution::Found(image) => image.index,
            Resolution::NotFound { index, .. } => *index,
        }
    }

    pub fn attempts(&self) -> usize {
        match self {
            Resolution::Found(image) => image.attempts,
            Resolution::NotFound { attempts, .. } => *attempts,
        }
    }

    pub fn found(self) -> Option<ResolvedImage> {
        match self {
            Resolution::Found(image) => Some(image),
            Resolution::NotFound { .. } => None,
        }
    }
}

fn validate(base_path: &Path, index: usize) -> Result<(), ResolveError> {
    if index < 1 {
        return Err(ResolveError::InvalidArgument(
            "image index is 1-based and must be at least 1".into(),
        ));
    }
    if base_path.as_os_str().is_empty() {
        return Err(ResolveError::InvalidArgument(
            "base path must not be empty".into(),
        ));
    }
    Ok(())
}

/// Try every candidate in order; returns the first hit or the attempt count.
fn probe<L: ImageLoader + ?Sized>(
    loader: &L,
    hint: Candidate,
    formats: &[ImageFormat],
    paddings: &[u8],
    base_path: &Path,
    index: usize,
) -> Resolution {
    let mut attempts = 0;
    for candidate in candidates(hint, formats, paddings) {
        let path = base_path.join(candidate.file_name(index));
        attempts += 1;
        match loader.attempt_load(&path) {
            Ok(dimensions) => {
                return Resolution::Found(ResolvedImage {
                    index,
                    path,
                    candidate,
                    attempts,
                    dimensions,
                });
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "candidate rejected");
            }
        }
    }
    tracing::debug!(
        base = %base_path.display(),
        index,
        attempts,
        "no candidate resolved"
    );
    Resolution::NotFound { index, attempts }
}

/// Resolve with an explicit cache, updating it on success.
pub fn resolve_with<L: ImageLoader + ?Sized>(
    loader: &L,
    cache: &mut ResolverCache,
    formats: &[ImageFormat],
    paddings: &[u8],
    base_path: &Path,
    index: usize,
) -> Result<Resolution, ResolveError> {
    validate(base_path, index)?;
    let resolution = probe(loader, cache.hint(), formats, paddings, base_path, index);
    if let Resolution::Found(image) = &resolution {
        cache.record(image.candidate);
    }
    Ok(resolution)
}

/// A loader plus the convention cache for one collection.
///
/// The cache sits behind a mutex so one resolver can serve a parallel chapter
/// load. The lock is not held during loads; a concurrent hit may overwrite the
/// hint another worker just read, which costs attempts but never a wrong file.
pub struct ImageResolver<L> {
    loader: L,
    formats: Vec<ImageFormat>,
    paddings: Vec<u8>,
    cache: Mutex<ResolverCache>,
}

impl<L: ImageLoader> ImageResolver<L> {
    /// Resolver with the default format and padding priorities.
    pub fn new(loader: L) -> Self {
        Self::with_priorities(loader, ImageFormat::ALL.to_vec(), DEFAULT_PADDING_WIDTHS.to_vec())
    }

    pub fn from_config(loader: L, config: &ResolverConfig) -> Self {
        Self::with_priorities(loader, config.formats.clone(), config.padding_widths.clone())
    }

    pub fn with_priorities(loader: L, formats: Vec<ImageFormat>, paddings: Vec<u8>) -> Self {
        let cache = ResolverCache::new(&formats, &paddings);
        Self {
            loader,
            formats,
            paddings,
            cache: Mutex::new(cache),
        }
    }

    /// Resolve a 1-based `index` inside `base_path`.
    pub fn resolve(&self, base_path: &Path, index: usize) -> Result<Resolution, ResolveError> {
        validate(base_path, index)?;
        let hint = self.cache().hint();
        let resolution = probe(
            &self.loader,
            hint,
            &self.formats,
            &self.paddings,
            base_path,
            index,
        );
        if let Resolution::Found(image) = &resolution {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if cache.hint() != image.candidate {
                tracing::debug!(candidate = %image.candidate, "resolver cache updated");
            }
            cache.record(image.candidate);
        }
        Ok(resolution)
    }

    /// Snapshot of the current cache.
    pub fn cache(&self) -> ResolverCache {
        *self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::loader::tests::MockLoader;
    use super::*;

    #[test]
    fn resolves_unpadded_webp_on_first_attempt() {
        let loader = MockLoader::with_files("/m", &["1.webp"]);
        let resolver = ImageResolver::new(loader);
        let image = resolver
            .resolve(Path::new("/m"), 1)
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(image.path, Path::new("/m/1.webp"));
        assert_eq!(image.attempts, 1);
    }

    #[test]
    fn walks_formats_then_paddings_until_hit() {
        let loader = MockLoader::with_files("/m", &["01.jpg"]);
        let resolver = ImageResolver::new(loader);
        let image = resolver
            .resolve(Path::new("/m"), 1)
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(image.candidate, Candidate::new(ImageFormat::Jpg, 1));
        assert_eq!(
            resolver.loader().attempted_names(),
            vec!["1.webp", "01.webp", "001.webp", "1.jpg", "01.jpg"]
        );
    }

    #[test]
    fn next_lookup_tries_cached_candidate_first() {
        let loader = MockLoader::with_files("/m", &["003.png", "004.png"]);
        let resolver = ImageResolver::new(loader);
        assert!(resolver.resolve(Path::new("/m"), 3).unwrap().is_found());
        assert_eq!(resolver.cache().hint(), Candidate::new(ImageFormat::Png, 2));

        resolver.loader().clear_attempts();
        let next = resolver.resolve(Path::new("/m"), 4).unwrap();
        assert_eq!(next.attempts(), 1);
        assert_eq!(resolver.loader().attempted_names(), vec!["004.png"]);
    }

    #[test]
    fn exhaustion_returns_not_found() {
        let resolver = ImageResolver::new(MockLoader::new());
        let resolution = resolver.resolve(Path::new("/m"), 9).unwrap();
        assert_eq!(
            resolution,
            Resolution::NotFound {
                index: 9,
                attempts: 15
            }
        );
    }

    /// In-memory sink for a scoped `tracing` subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn rejected_candidates_are_logged_at_debug() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();

        let resolver = ImageResolver::new(MockLoader::with_files("/m", &["1.jpg"]));
        tracing::subscriber::with_default(subscriber, || {
            resolver.resolve(Path::new("/m"), 1).unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("candidate rejected"));
        assert!(output.contains("1.webp"));
    }

    #[test]
    fn not_found_leaves_cache_alone() {
        let loader = MockLoader::with_files("/m", &["02.gif"]);
        let resolver = ImageResolver::new(loader);
        resolver.resolve(Path::new("/m"), 2).unwrap();
        resolver.resolve(Path::new("/m"), 3).unwrap();
        assert_eq!(resolver.cache().hint(), Candidate::new(ImageFormat::Gif, 1));
    }

    #[test]
    fn zero_index_rejected_without_loading() {
        let resolver = ImageResolver::new(MockLoader::new());
        assert!(matches!(
            resolver.resolve(Path::new("/m"), 0),
            Err(ResolveError::InvalidArgument(_))
        ));
        assert!(resolver.loader().get_attempts().is_empty());
    }

    #[test]
    fn empty_path_rejected_without_loading() {
        let resolver = ImageResolver::new(MockLoader::new());
        assert!(matches!(
            resolver.resolve(Path::new(""), 5),
            Err(ResolveError::InvalidArgument(_))
        ));
        assert!(resolver.loader().get_attempts().is_empty());
    }

    #[test]
    fn resolve_with_updates_explicit_cache() {
        let loader = MockLoader::with_files("/a", &["10.jpeg"]);
        let mut cache = ResolverCache::default();
        let resolution = resolve_with(
            &loader,
            &mut cache,
            &ImageFormat::ALL,
            &DEFAULT_PADDING_WIDTHS,
            Path::new("/a"),
            10,
        )
        .unwrap();
        assert!(resolution.is_found());
        assert_eq!(cache.hint(), Candidate::new(ImageFormat::Jpeg, 0));
    }

    #[test]
    fn separate_resolvers_keep_separate_caches() {
        let a = ImageResolver::new(MockLoader::with_files("/a", &["1.png"]));
        let b = ImageResolver::new(MockLoader::with_files("/b", &["01.jpg"]));
        a.resolve(Path::new("/a"), 1).unwrap();
        b.resolve(Path::new("/b"), 1).unwrap();
        assert_eq!(a.cache().hint(), Candidate::new(ImageFormat::Png, 0));
        assert_eq!(b.cache().hint(), Candidate::new(ImageFormat::Jpg, 1));
    }

    #[test]
    fn restricted_priorities_limit_the_search() {
        let loader = MockLoader::with_files("/m", &["1.gif"]);
        let resolver =
            ImageResolver::with_priorities(loader, vec![ImageFormat::Png], vec![0, 1]);
        let resolution = resolver.resolve(Path::new("/m"), 1).unwrap();
        assert_eq!(resolution.attempts(), 2);
        assert!(!resolution.is_found());
    }
}
