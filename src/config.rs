//! Reader configuration.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the data directory next to `library.json`; stock defaults are the base
//! layer and the user file is merged on top, key by key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resolver]
//! formats = ["webp", "jpg", "jpeg", "png", "gif"]  # Extension priority
//! padding_widths = [0, 1, 2]                       # Extra leading zeros to try
//!
//! [viewer]
//! default_zoom = 1.0
//! min_zoom = 0.25
//! max_zoom = 4.0
//! zoom_step = 0.25
//!
//! [processing]
//! max_processes = 4         # Parallel page resolution (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [resolver]
//! formats = ["jpg", "png"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::resolver::{DEFAULT_PADDING_WIDTHS, ImageFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest padding width accepted in `resolver.padding_widths`.
pub const MAX_PADDING_WIDTH: u8 = 8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Reader configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Candidate priorities for image resolution.
    pub resolver: ResolverConfig,
    /// Zoom bounds and step.
    pub viewer: ViewerConfig,
    /// Parallel resolution settings.
    pub processing: ProcessingConfig,
}

impl ReaderConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let resolver = &self.resolver;
        if resolver.formats.is_empty() {
            return Err(ConfigError::Validation(
                "resolver.formats must not be empty".into(),
            ));
        }
        if resolver.formats.iter().collect::<HashSet<_>>().len() != resolver.formats.len() {
            return Err(ConfigError::Validation(
                "resolver.formats must not contain duplicates".into(),
            ));
        }
        if resolver.padding_widths.is_empty() {
            return Err(ConfigError::Validation(
                "resolver.padding_widths must not be empty".into(),
            ));
        }
        if resolver.padding_widths.iter().collect::<HashSet<_>>().len()
            != resolver.padding_widths.len()
        {
            return Err(ConfigError::Validation(
                "resolver.padding_widths must not contain duplicates".into(),
            ));
        }
        if resolver
            .padding_widths
            .iter()
            .any(|&p| p > MAX_PADDING_WIDTH)
        {
            return Err(ConfigError::Validation(format!(
                "resolver.padding_widths values must be 0-{MAX_PADDING_WIDTH}"
            )));
        }

        let viewer = &self.viewer;
        if !(viewer.min_zoom > 0.0
            && viewer.min_zoom <= viewer.default_zoom
            && viewer.default_zoom <= viewer.max_zoom)
        {
            return Err(ConfigError::Validation(
                "viewer zoom must satisfy 0 < min_zoom <= default_zoom <= max_zoom".into(),
            ));
        }
        if !(viewer.zoom_step > 0.0 && viewer.zoom_step.is_finite()) {
            return Err(ConfigError::Validation(
                "viewer.zoom_step must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Image resolution priorities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Extensions to try, highest priority first.
    pub formats: Vec<ImageFormat>,
    /// Leading zeros beyond the index's own digits, highest priority first.
    pub padding_widths: Vec<u8>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            formats: ImageFormat::ALL.to_vec(),
            padding_widths: DEFAULT_PADDING_WIDTHS.to_vec(),
        }
    }
}

/// Zoom settings applied to per-collection reading state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Zoom factor for a collection that has never been zoomed.
    pub default_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Amount added or removed by one zoom in/out.
    pub zoom_step: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_zoom: 1.0,
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_step: 0.25,
        }
    }
}

impl ViewerConfig {
    /// Pin a zoom factor into `[min_zoom, max_zoom]`.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.default_zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel resolution workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ReaderConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so an
///   overridden `formats` list replaces the stock list rather than extending it.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    load_raw_config_file(&config_path).map(Some)
}

/// Read a specific config file as a raw TOML value. A missing file is an error.
pub fn load_raw_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ReaderConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ReaderConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<ReaderConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Load config from an explicit file path, as passed with `--config`.
pub fn load_config_file(path: &Path) -> Result<ReaderConfig, ConfigError> {
    let overlay = load_raw_config_file(path)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Tankobon Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the data directory (default: .tankobon/config.toml),
# or pass its path with --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Image resolution
# ---------------------------------------------------------------------------
[resolver]
# File extensions to try, highest priority first. The extension that last
# worked is always tried first, regardless of its position here.
formats = ["webp", "jpg", "jpeg", "png", "gif"]

# Leading zeros to try beyond the page number's own digits.
# 0 → 7.jpg, 1 → 07.jpg, 2 → 007.jpg
padding_widths = [0, 1, 2]

# ---------------------------------------------------------------------------
# Viewer
# ---------------------------------------------------------------------------
[viewer]
# Zoom factor for collections that have not been zoomed yet.
default_zoom = 1.0

# Zoom bounds and step for `tankobon zoom`.
min_zoom = 0.25
max_zoom = 4.0
zoom_step = 0.25

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers when resolving a chapter's pages.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
