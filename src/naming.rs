//! Collection titles from directory names.
//!
//! Manga directories are often named with an ordering prefix and dashes in
//! place of spaces: `010-One-Piece/`, `03-Vagabond-Vol-2/`. When a collection
//! is registered without an explicit title, the directory name is parsed with
//! the `NNN-name` convention and the display title is used.
//!
//! - `010-One-Piece` → number=Some(10), display title "One Piece"
//! - `Berserk` → number=None, display title "Berserk"
//! - `007` → number=Some(7), display title "" (falls back to the raw name)

use std::path::Path;

/// Result of parsing a numbered entry name like `010-One-Piece`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `10` from `010-One-Piece`)
    pub number: Option<u32>,
    /// Raw name part after `NNN-`, dashes preserved. Empty if number-only.
    /// For unnumbered entries, this is the full input.
    pub name: String,
    /// Display title: name with dashes and underscores converted to spaces.
    pub display_title: String,
}

fn display(raw: &str) -> String {
    raw.replace(['-', '_'], " ").trim().to_string()
}

/// Parse an entry name following the `NNN-name` convention.
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some((prefix, raw)) = name.split_once('-')
        && let Ok(num) = prefix.parse::<u32>()
    {
        return ParsedName {
            number: Some(num),
            name: raw.to_string(),
            display_title: display(raw),
        };
    }
    if let Ok(num) = name.parse::<u32>() {
        return ParsedName {
            number: Some(num),
            name: String::new(),
            display_title: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: name.to_string(),
        display_title: display(name),
    }
}

/// Default title for a collection directory.
///
/// Uses the parsed display title, or the raw directory name when the parse
/// leaves nothing (number-only names like `007`).
pub fn collection_title(dir: &Path) -> String {
    let raw = dir
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = parse_entry_name(&raw);
    if parsed.display_title.is_empty() {
        raw
    } else {
        parsed.display_title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_with_multi_word_name() {
        let p = parse_entry_name("010-One-Piece");
        assert_eq!(p.number, Some(10));
        assert_eq!(p.name, "One-Piece");
        assert_eq!(p.display_title, "One Piece");
    }

    #[test]
    fn number_only_no_dash() {
        let p = parse_entry_name("007");
        assert_eq!(p.number, Some(7));
        assert_eq!(p.name, "");
        assert_eq!(p.display_title, "");
    }

    #[test]
    fn unnumbered_with_dashes() {
        let p = parse_entry_name("chainsaw-man");
        assert_eq!(p.number, None);
        assert_eq!(p.display_title, "chainsaw man");
    }

    #[test]
    fn underscores_become_spaces() {
        let p = parse_entry_name("02-Vinland_Saga");
        assert_eq!(p.number, Some(2));
        assert_eq!(p.display_title, "Vinland Saga");
    }

    #[test]
    fn collection_title_from_numbered_dir() {
        assert_eq!(collection_title(Path::new("/manga/010-One-Piece")), "One Piece");
    }

    #[test]
    fn collection_title_number_only_keeps_raw_name() {
        assert_eq!(collection_title(Path::new("/scans/007")), "007");
    }

    #[test]
    fn collection_title_plain_dir() {
        assert_eq!(collection_title(Path::new("Berserk")), "Berserk");
    }
}
