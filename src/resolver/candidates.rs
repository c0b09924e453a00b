//! Candidate generation for image resolution.
//!
//! These functions describe *which* files to try, not *how* to try them. A
//! [`Candidate`] is one guess at a directory's naming convention: a file
//! extension plus a number of leading zeros. The resolver walks the list
//! produced by [`candidates`] and hands each synthesized path to an
//! [`ImageLoader`](super::ImageLoader).
//!
//! ## Padding
//!
//! `padding` counts zeros *beyond* the number's natural digit count, so the
//! same padding gives different total widths for different indices:
//!
//! | index | padding 0 | padding 1 | padding 2 |
//! |-------|-----------|-----------|-----------|
//! | 7     | `7`       | `07`      | `007`     |
//! | 42    | `42`      | `042`     | `0042`    |
//! | 120   | `120`     | `0120`    | `00120`   |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image file extensions, in default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Webp,
    Jpg,
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    /// Default priority order.
    pub const ALL: [ImageFormat; 5] = [
        ImageFormat::Webp,
        ImageFormat::Jpg,
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Webp => "webp",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
        }
    }

    /// Match a file extension, ignoring ASCII case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("unknown image format: {s}"))
    }
}

/// Default padding widths, in priority order: none, one zero, two zeros.
pub const DEFAULT_PADDING_WIDTHS: [u8; 3] = [0, 1, 2];

/// One (extension, zero-padding) guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub format: ImageFormat,
    pub padding: u8,
}

impl Candidate {
    pub fn new(format: ImageFormat, padding: u8) -> Self {
        Self { format, padding }
    }

    /// File name for a 1-based image index under this convention.
    pub fn file_name(self, index: usize) -> String {
        file_name(index, self)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (+{} zeros)", self.format, self.padding)
    }
}

/// `index` left-padded with `'0'` to `digits + padding` characters, plus extension.
///
/// ```
/// # use tankobon::resolver::{Candidate, ImageFormat, file_name};
/// assert_eq!(file_name(7, Candidate::new(ImageFormat::Jpg, 2)), "007.jpg");
/// assert_eq!(file_name(42, Candidate::new(ImageFormat::Png, 0)), "42.png");
/// ```
pub fn file_name(index: usize, candidate: Candidate) -> String {
    let digits = index.to_string();
    let width = digits.len() + candidate.padding as usize;
    format!(
        "{:0>width$}.{}",
        digits,
        candidate.format.extension(),
        width = width
    )
}

/// Ordered candidate list: `hint` first, then every other pair.
///
/// Formats form the outer loop and paddings the inner loop, both in the
/// given priority order. The hint is never repeated. A hint outside the
/// configured lists is still tried first.
pub fn candidates(hint: Candidate, formats: &[ImageFormat], paddings: &[u8]) -> Vec<Candidate> {
    let mut list = Vec::with_capacity(formats.len() * paddings.len() + 1);
    list.push(hint);
    for &format in formats {
        for &padding in paddings {
            let candidate = Candidate { format, padding };
            if candidate != hint {
                list.push(candidate);
            }
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_without_padding() {
        assert_eq!(file_name(1, Candidate::new(ImageFormat::Webp, 0)), "1.webp");
        assert_eq!(file_name(120, Candidate::new(ImageFormat::Gif, 0)), "120.gif");
    }

    #[test]
    fn file_name_padding_is_relative_to_digit_count() {
        let c = Candidate::new(ImageFormat::Jpg, 1);
        assert_eq!(file_name(7, c), "07.jpg");
        assert_eq!(file_name(42, c), "042.jpg");
        assert_eq!(file_name(120, c), "0120.jpg");
    }

    #[test]
    fn file_name_two_zeros() {
        let c = Candidate::new(ImageFormat::Jpeg, 2);
        assert_eq!(c.file_name(3), "003.jpeg");
        assert_eq!(c.file_name(15), "0015.jpeg");
    }

    #[test]
    fn default_order_starts_with_webp_unpadded() {
        let hint = Candidate::new(ImageFormat::Webp, 0);
        let list = candidates(hint, &ImageFormat::ALL, &DEFAULT_PADDING_WIDTHS);
        assert_eq!(list.len(), 15);
        assert_eq!(list[0], hint);
        assert_eq!(list[1], Candidate::new(ImageFormat::Webp, 1));
        assert_eq!(list[2], Candidate::new(ImageFormat::Webp, 2));
        assert_eq!(list[3], Candidate::new(ImageFormat::Jpg, 0));
        assert_eq!(list[14], Candidate::new(ImageFormat::Gif, 2));
    }

    #[test]
    fn hint_moves_to_front_without_duplication() {
        let hint = Candidate::new(ImageFormat::Png, 2);
        let list = candidates(hint, &ImageFormat::ALL, &DEFAULT_PADDING_WIDTHS);
        assert_eq!(list.len(), 15);
        assert_eq!(list[0], hint);
        assert_eq!(list.iter().filter(|c| **c == hint).count(), 1);
        assert_eq!(list[1], Candidate::new(ImageFormat::Webp, 0));
    }

    #[test]
    fn hint_outside_configured_lists_is_still_first() {
        let hint = Candidate::new(ImageFormat::Gif, 3);
        let list = candidates(hint, &[ImageFormat::Png], &[0]);
        assert_eq!(list, vec![hint, Candidate::new(ImageFormat::Png, 0)]);
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JPG".parse::<ImageFormat>(), Ok(ImageFormat::Jpg));
        assert_eq!(ImageFormat::from_extension("WebP"), Some(ImageFormat::Webp));
        assert!("bmp".parse::<ImageFormat>().is_err());
    }
}
