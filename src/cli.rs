//! CLI argument parsing for restem

use clap::Parser;
use restem_config::Overrides;
use std::path::PathBuf;

/// Every setting is optional here; anything not given falls back to the
/// environment, then the config file, then the built-in default.
#[derive(Parser, Debug)]
#[command(name = "restem")]
#[command(author, version, about = "Copy files under new names taken from a CSV mapping", long_about = None)]
pub struct Cli {
    /// Base directory for relative paths (default: current directory)
    #[arg(long)]
    pub work: Option<PathBuf>,

    /// Folder holding the files to rename
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Mapping file
    #[arg(long, alias = "input_csv")]
    pub input_csv: Option<PathBuf>,

    /// Folder the renamed copies are written to (default: output)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Zero-based mapping field holding the source file name (default: 0)
    #[arg(long, alias = "csv_key_idx_src")]
    pub csv_key_idx_src: Option<usize>,

    /// Zero-based mapping field holding the new name (default: 1)
    #[arg(long, alias = "csv_key_idx_dst")]
    pub csv_key_idx_dst: Option<usize>,

    /// Mapping field delimiter (default: ,)
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Maximum number of copies in flight
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Plan and report without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            work: self.work.clone(),
            input: self.input.clone(),
            input_csv: self.input_csv.clone(),
            output: self.output.clone(),
            csv_key_idx_src: self.csv_key_idx_src,
            csv_key_idx_dst: self.csv_key_idx_dst,
            delimiter: self.delimiter,
            concurrency: self.concurrency,
            // Flags can only switch these on.
            dry_run: self.dry_run.then_some(true),
            verbose: self.verbose.then_some(true),
        }
    }
}
