use std::path::PathBuf;

/// Top-level directories that never hold sources worth adding.
pub const DEFAULT_SKIP_TOP_DIRS: [&str; 3] = ["docs", "debug", "release"];

/// Directory and file exclusions applied while scanning. Names are stored
/// lower-cased; matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRules {
    skip_top_dirs: Vec<String>,
    skip_all_dirs: Vec<String>,
    ignore_files: Vec<String>,
}

impl ScanRules {
    pub fn new<S: AsRef<str>>(skip_top_dirs: &[S], skip_all_dirs: &[S], ignore_files: &[S]) -> Self {
        fn lower<S: AsRef<str>>(names: &[S]) -> Vec<String> {
            names.iter().map(|n| n.as_ref().to_lowercase()).collect()
        }
        Self {
            skip_top_dirs: lower(skip_top_dirs),
            skip_all_dirs: lower(skip_all_dirs),
            ignore_files: lower(ignore_files),
        }
    }

    /// Whether a directory `depth` levels below the root should be pruned.
    pub fn skips_dir(&self, name: &str, depth: usize) -> bool {
        let name = name.to_lowercase();
        (depth == 1 && self.skip_top_dirs.contains(&name)) || self.skip_all_dirs.contains(&name)
    }

    pub fn ignores_file(&self, name: &str) -> bool {
        self.ignore_files.contains(&name.to_lowercase())
    }
}

impl Default for ScanRules {
    fn default() -> Self {
        Self::new(&DEFAULT_SKIP_TOP_DIRS, &[], &[])
    }
}

/// Everything one synchronization run needs to know.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Directory that is scanned and searched for the project file.
    pub root: PathBuf,
    pub project: Option<PathBuf>,
    pub filter: Option<PathBuf>,
    pub scan_only: bool,
    pub no_filter: bool,
    pub remove_first_dir_name: bool,
    pub rules: ScanRules,
}

impl SyncOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            project: None,
            filter: None,
            scan_only: false,
            no_filter: false,
            remove_first_dir_name: false,
            rules: ScanRules::default(),
        }
    }
}
