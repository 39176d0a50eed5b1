use crate::error::{RenameError, RenameResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const PADDING_DIGITS_RANGE: std::ops::RangeInclusive<usize> = 1..=10;
pub const RANDOM_NAME_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 5..=30;

const RANDOM_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// How every selected file gets its new name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    /// Base name for every file. Empty keeps each file's own stem.
    pub pattern: String,
    pub keep_extension: bool,
    pub add_numbering: bool,
    pub padding_digits: usize,
    pub number_at_start: bool,
    pub use_random_names: bool,
    pub random_name_length: usize,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            keep_extension: true,
            add_numbering: false,
            padding_digits: 3,
            number_at_start: true,
            use_random_names: false,
            random_name_length: 10,
        }
    }
}

impl RenameConfig {
    /// Rejects configurations that cannot produce a valid plan. Touches no files.
    pub fn validate(&self) -> RenameResult<()> {
        if self.base_name().is_empty() && !self.add_numbering && !self.use_random_names {
            return Err(RenameError::invalid(
                "specify a rename pattern, enable numbering, or choose random file names",
            ));
        }
        if !PADDING_DIGITS_RANGE.contains(&self.padding_digits) {
            return Err(RenameError::invalid(format!(
                "padding digits must be between {} and {}, got {}",
                PADDING_DIGITS_RANGE.start(),
                PADDING_DIGITS_RANGE.end(),
                self.padding_digits
            )));
        }
        if !RANDOM_NAME_LENGTH_RANGE.contains(&self.random_name_length) {
            return Err(RenameError::invalid(format!(
                "random name length must be between {} and {}, got {}",
                RANDOM_NAME_LENGTH_RANGE.start(),
                RANDOM_NAME_LENGTH_RANGE.end(),
                self.random_name_length
            )));
        }
        if self.base_name().chars().any(is_path_breaking_char) {
            return Err(RenameError::invalid(format!(
                "pattern must not contain path separators: {}",
                self.pattern
            )));
        }
        Ok(())
    }

    /// The pattern without surrounding whitespace. Empty means keep the file's stem.
    pub fn base_name(&self) -> &str {
        self.pattern.trim()
    }

    pub(crate) fn format_number(&self, number: usize) -> String {
        format!("{:0width$}", number, width = self.padding_digits)
    }

    /// Joins `number` to `stem` with a hyphen, on the configured side.
    pub(crate) fn with_number(&self, stem: &OsStr, number: usize) -> OsString {
        let number = self.format_number(number);
        let mut out = OsString::with_capacity(stem.len() + number.len() + 1);
        if self.number_at_start {
            out.push(&number);
            out.push("-");
            out.push(stem);
        } else {
            out.push(stem);
            out.push("-");
            out.push(&number);
        }
        out
    }

    pub(crate) fn with_extension(&self, stem: OsString, extension: &OsStr) -> OsString {
        let mut out = stem;
        if self.keep_extension {
            out.push(extension);
        }
        out
    }
}

/// A path broken into the parts a rename touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SplitName {
    pub directory: PathBuf,
    pub stem: OsString,
    /// Includes the leading dot, empty when the name has no extension.
    pub extension: OsString,
}

impl SplitName {
    pub fn of(path: &Path) -> RenameResult<Self> {
        let file_name = path.file_name().ok_or_else(|| {
            RenameError::Unexpected(format!("path has no file name: {}", path.display()))
        })?;
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let (stem, extension) = split_extension(file_name);
        Ok(Self {
            directory,
            stem,
            extension,
        })
    }

    pub fn join(&self, name: &OsStr) -> PathBuf {
        self.directory.join(name)
    }
}

/// Splits off the last `.ext`, ignoring dots that only lead the name:
/// `.bashrc` and `..a` have no extension, `file.` has the extension `.`.
fn split_extension(file_name: &OsStr) -> (OsString, OsString) {
    let bytes = file_name.as_encoded_bytes();
    let leading_dots = bytes.iter().take_while(|&&b| b == b'.').count();
    let Some(dot) = bytes[leading_dots..].iter().rposition(|&b| b == b'.') else {
        return (file_name.to_os_string(), OsString::new());
    };
    let (stem, extension) = bytes.split_at(leading_dots + dot);
    // SAFETY: both halves come from splitting valid encoded bytes at an ASCII '.'.
    unsafe {
        (
            OsStr::from_encoded_bytes_unchecked(stem).to_os_string(),
            OsStr::from_encoded_bytes_unchecked(extension).to_os_string(),
        )
    }
}

/// True when anything, including a dangling symlink, sits at `path`.
pub(crate) fn is_occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

pub fn random_stem<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| RANDOM_ALPHABET[rng.gen_range(0..RANDOM_ALPHABET.len())] as char)
        .collect()
}

fn is_path_breaking_char(ch: char) -> bool {
    matches!(ch, '/' | '\\' | '\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rejects_config_without_any_transform() {
        let config = RenameConfig::default();
        let err = config.validate().expect_err("no-op config should fail");
        assert!(matches!(err, RenameError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_out_of_range_padding_and_length() {
        let padding = RenameConfig {
            add_numbering: true,
            padding_digits: 11,
            ..RenameConfig::default()
        };
        assert!(padding.validate().is_err());

        let length = RenameConfig {
            use_random_names: true,
            random_name_length: 4,
            ..RenameConfig::default()
        };
        assert!(length.validate().is_err());
    }

    #[test]
    fn rejects_pattern_with_separator() {
        let config = RenameConfig {
            pattern: "../escape".to_string(),
            ..RenameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn numbering_respects_padding_and_side() {
        let mut config = RenameConfig {
            add_numbering: true,
            padding_digits: 4,
            ..RenameConfig::default()
        };
        assert_eq!(config.with_number(OsStr::new("img"), 7), "0007-img");
        config.number_at_start = false;
        assert_eq!(config.with_number(OsStr::new("img"), 7), "img-0007");
    }

    #[test]
    fn split_name_keeps_extension_case_and_dot() {
        let split = SplitName::of(Path::new("/tmp/photos/photo.JPG")).expect("split");
        assert_eq!(split.directory, PathBuf::from("/tmp/photos"));
        assert_eq!(split.stem, "photo");
        assert_eq!(split.extension, ".JPG");
    }

    #[test]
    fn split_name_treats_dotfile_as_stem() {
        let split = SplitName::of(Path::new("/tmp/.bashrc")).expect("split");
        assert_eq!(split.stem, ".bashrc");
        assert!(split.extension.is_empty());

        let split = SplitName::of(Path::new("/tmp/archive.tar.gz")).expect("split");
        assert_eq!(split.stem, "archive.tar");
        assert_eq!(split.extension, ".gz");
    }

    #[test]
    fn split_name_ignores_leading_dots() {
        let split = SplitName::of(Path::new("/tmp/..a")).expect("split");
        assert_eq!(split.stem, "..a");
        assert!(split.extension.is_empty());

        let split = SplitName::of(Path::new("/tmp/..a.b")).expect("split");
        assert_eq!(split.stem, "..a");
        assert_eq!(split.extension, ".b");

        let split = SplitName::of(Path::new("/tmp/file.")).expect("split");
        assert_eq!(split.stem, "file");
        assert_eq!(split.extension, ".");
    }

    #[test]
    fn blank_pattern_counts_as_no_transform() {
        let config = RenameConfig {
            pattern: "   ".to_string(),
            ..RenameConfig::default()
        };
        let err = config.validate().expect_err("blank pattern should fail");
        assert!(matches!(err, RenameError::InvalidConfiguration(_)));
    }

    #[test]
    fn dangling_symlink_is_occupied() {
        let temp = tempfile::tempdir().expect("tempdir");
        let link = temp.path().join("same.txt");
        assert!(!is_occupied(&link));
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(temp.path().join("nowhere"), &link).expect("symlink");
            assert!(!link.exists());
            assert!(is_occupied(&link));
        }
    }

    #[test]
    fn random_stem_uses_lowercase_and_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let stem = random_stem(&mut rng, 8);
            assert_eq!(stem.len(), 8);
            assert!(stem
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
