//! Stem extraction and substitution.
//!
//! Everything in restem joins on stems (file name minus the final extension),
//! and renames by swapping the stem while keeping the extension. These helpers
//! keep that logic in one place so the indexer, the mapping reader and the
//! planner all agree on what a stem is.

use crate::error::{ErrorKind, Result};
use std::path::{Path, PathBuf};

/// Stem of a path: the file name without its final extension.
///
/// Files without an extension (and dotfiles such as `.hidden`) keep their full
/// name. Non-UTF-8 names are converted lossily.
///
/// ```
/// use restem_storage::stem_of;
/// assert_eq!(stem_of("/in/photo.jpeg"), "photo");
/// assert_eq!(stem_of("archive.tar.gz"), "archive.tar");
/// assert_eq!(stem_of("Makefile"), "Makefile");
/// ```
pub fn stem_of(path: impl AsRef<Path>) -> String {
    path.as_ref().file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Join key derived from a mapping field: any directory components and the
/// final extension are stripped, so `scans/IMG_001.png` and `IMG_001` both
/// produce `IMG_001`.
///
/// Fields that have no file name at all (empty, `.`) produce an empty key.
pub fn key_from_field(field: &str) -> String {
    stem_of(Path::new(field))
}

/// Ensures a stem can be used as a file name inside a single directory.
///
/// # Returns
/// The stem unchanged, or [`InvalidStem`](ErrorKind::InvalidStem) when it is
/// empty, `.`/`..`, or contains a path separator or a null byte.
pub fn validate_stem(stem: &str) -> Result<&str> {
    if stem.is_empty()
        || stem == "."
        || stem == ".."
        || stem.chars().any(|c| std::path::is_separator(c) || c == '\0')
    {
        exn::bail!(ErrorKind::InvalidStem(stem.to_string()));
    }
    Ok(stem)
}

/// File name of `path` with the stem replaced by `stem`; the original
/// extension is kept.
///
/// ```
/// use std::path::Path;
/// use restem_storage::with_stem;
/// assert_eq!(with_stem("/in/a.txt", "renamed_a").unwrap(), Path::new("renamed_a.txt"));
/// assert!(with_stem("/in/a.txt", "../escape").is_err());
/// ```
pub fn with_stem(path: impl AsRef<Path>, stem: &str) -> Result<PathBuf> {
    let stem = validate_stem(stem)?;
    let name = match path.as_ref().extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem.to_string(),
    };
    Ok(PathBuf::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a", "a")]
    #[case("a.txt", "a")]
    #[case("dir/a.txt", "a")]
    #[case("/abs/dir/a.b.c", "a.b")]
    #[case("dir/", "dir")]
    #[case("", "")]
    #[case(".", "")]
    fn test_key_from_field(#[case] field: &str, #[case] expected: &str) {
        assert_eq!(key_from_field(field), expected);
    }

    #[rstest]
    #[case("renamed")]
    #[case("with space")]
    #[case("dots.in.name")]
    #[case("..prefixed")]
    fn test_valid_stems(#[case] stem: &str) {
        assert_eq!(validate_stem(stem).unwrap(), stem);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("a/b")]
    #[case("nul\0byte")]
    fn test_invalid_stems(#[case] stem: &str) {
        let err = validate_stem(stem).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidStem(s) if s == stem));
    }

    #[test]
    fn test_with_stem_keeps_extension() {
        assert_eq!(with_stem("/in/a.txt", "b").unwrap(), Path::new("b.txt"));
        assert_eq!(with_stem("/in/a.tar.gz", "b").unwrap(), Path::new("b.gz"));
        assert_eq!(with_stem("/in/README", "NOTES").unwrap(), Path::new("NOTES"));
        assert_eq!(with_stem("/in/.hidden", "visible").unwrap(), Path::new("visible"));
    }
}
