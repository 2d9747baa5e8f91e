use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::{ScanRules, SyncOptions, DEFAULT_SKIP_TOP_DIRS};

#[derive(Parser, Debug)]
#[command(name = "vcxsync")]
#[command(
    about = "Ensure all source files are included in your Visual Studio project files",
    long_about = "Ensure all source files are included in your Visual Studio project files. \
                  The scan selects .h, .hpp, .c, .cpp and .rc files."
)]
#[command(version)]
pub struct Cli {
    /// Directory to scan and to search for the project file (defaults to the current directory)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Only report which files are missing from your project files, do not update them
    #[arg(short, long)]
    pub scan_only: bool,

    /// Path to the .vcxproj file, if it cannot be found automatically
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Path to the .vcxproj.filters file, if it cannot be found automatically
    #[arg(short, long)]
    pub filter: Option<PathBuf>,

    /// Do not create or update the project filter file
    #[arg(short, long)]
    pub no_filter: bool,

    /// Top-level directories that are not scanned
    #[arg(long, num_args = 0.., value_name = "DIR", default_values = DEFAULT_SKIP_TOP_DIRS)]
    pub skip_top_dirs: Vec<String>,

    /// Directories that are not scanned at any depth
    #[arg(long, num_args = 0.., value_name = "DIR")]
    pub skip_all_dirs: Vec<String>,

    /// File names to ignore while scanning
    #[arg(short, long, num_args = 0.., value_name = "FILE")]
    pub ignore: Vec<String>,

    /// Drop the first directory name from generated filter names
    #[arg(long)]
    pub remove_first_dir_name: bool,

    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Resolve the options for a run rooted at `cwd` unless `--directory` says otherwise.
    pub fn into_options(self, cwd: PathBuf) -> SyncOptions {
        SyncOptions {
            root: self.directory.unwrap_or(cwd),
            project: self.project,
            filter: self.filter,
            scan_only: self.scan_only,
            no_filter: self.no_filter,
            remove_first_dir_name: self.remove_first_dir_name,
            rules: ScanRules::new(&self.skip_top_dirs, &self.skip_all_dirs, &self.ignore),
        }
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
