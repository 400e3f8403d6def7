use crate::Config;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use restem_library::RunOptions;
use restem_library::copy::default_concurrency;
use std::path::{Path, PathBuf};

/// Validated configuration, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Absolute base all relative paths were resolved against.
    pub work: PathBuf,
    pub run: RunOptions,
    pub dry_run: bool,
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and resolve relative paths against the
    /// work directory (itself resolved against the current directory).
    ///
    /// # Errors
    /// - [`Missing`](ErrorKind::Missing) without `input` or `input_csv`,
    /// - [`InvalidDelimiter`](ErrorKind::InvalidDelimiter) unless the
    ///   delimiter is a single ASCII character,
    /// - [`InvalidConcurrency`](ErrorKind::InvalidConcurrency) for zero,
    /// - [`WorkingDirectory`](ErrorKind::WorkingDirectory) if the current
    ///   directory is needed and unavailable.
    pub fn resolve(self) -> Result<Settings> {
        let input = self.input.ok_or_raise(|| ErrorKind::Missing("input"))?;
        let input_csv = self.input_csv.ok_or_raise(|| ErrorKind::Missing("input_csv"))?;
        let delimiter = delimiter(self.delimiter)?;
        let concurrency = match self.concurrency {
            Some(0) => exn::bail!(ErrorKind::InvalidConcurrency),
            Some(n) => n,
            None => default_concurrency(),
        };
        let current = std::env::current_dir().or_raise(|| ErrorKind::WorkingDirectory)?;
        let work = match self.work {
            Some(work) => current.join(work),
            None => current,
        };

        Ok(Settings {
            run: RunOptions {
                input: resolve(&work, &input),
                mapping: resolve(&work, &input_csv),
                output: resolve(&work, &self.output),
                csv: restem_mapping::Options {
                    key_index: self.csv_key_idx_src,
                    delimiter,
                },
                destination_index: self.csv_key_idx_dst,
                concurrency,
            },
            work,
            dry_run: self.dry_run,
            verbose: self.verbose,
        })
    }
}

fn delimiter(c: char) -> Result<u8> {
    if !c.is_ascii() {
        exn::bail!(ErrorKind::InvalidDelimiter(c));
    }
    Ok(c as u8)
}

fn resolve(work: &Path, path: &Path) -> PathBuf {
    // Absolute paths replace `work` entirely.
    work.join(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config() -> Config {
        Config {
            input: Some("in".into()),
            input_csv: Some("map.csv".into()),
            ..Config::default()
        }
    }

    #[test]
    fn test_paths_resolve_against_work() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings = Config {
            work: Some(temp_dir.path().to_path_buf()),
            input_csv: Some("/elsewhere/map.csv".into()),
            ..config()
        }
        .resolve()
        .unwrap();
        assert_eq!(settings.work, temp_dir.path());
        assert_eq!(settings.run.input, temp_dir.path().join("in"));
        assert_eq!(settings.run.mapping, Path::new("/elsewhere/map.csv"));
        assert_eq!(settings.run.output, temp_dir.path().join("output"));
    }

    #[test]
    fn test_work_defaults_to_current_dir() {
        let settings = config().resolve().unwrap();
        assert_eq!(settings.work, std::env::current_dir().unwrap());
        assert!(settings.run.input.is_absolute());
    }

    #[test]
    fn test_indices_and_delimiter() {
        let settings = Config {
            csv_key_idx_src: 2,
            csv_key_idx_dst: 0,
            delimiter: '\t',
            concurrency: Some(7),
            ..config()
        }
        .resolve()
        .unwrap();
        assert_eq!(settings.run.csv.key_index, 2);
        assert_eq!(settings.run.csv.delimiter, b'\t');
        assert_eq!(settings.run.destination_index, 0);
        assert_eq!(settings.run.concurrency, 7);
    }

    #[rstest]
    #[case(Config { input: None, ..config() }, ErrorKind::Missing("input"))]
    #[case(Config { input_csv: None, ..config() }, ErrorKind::Missing("input_csv"))]
    #[case(Config { delimiter: '§', ..config() }, ErrorKind::InvalidDelimiter('§'))]
    #[case(Config { concurrency: Some(0), ..config() }, ErrorKind::InvalidConcurrency)]
    fn test_invalid(#[case] config: Config, #[case] expected: ErrorKind) {
        let err = config.resolve().unwrap_err();
        assert_eq!(*err, expected);
    }
}
