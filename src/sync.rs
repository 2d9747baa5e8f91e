use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::SyncOptions;
use crate::filters::{write_filters, FilterFile};
use crate::model::{plural, Category, FileSet};
use crate::report::{compare, render_scan_report, render_update_summary, CategoryDiff};
use crate::scanner::scan_directory;
use crate::vcxproj::{GroupLayout, VcxprojFile};

/// What a run ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No unambiguous project file; nothing was read or written.
    NoProject,
    /// Scan-only mode: discrepancies were reported.
    Scanned(Vec<CategoryDiff>),
    /// The project (and possibly filter) file was rewritten.
    Updated(Vec<CategoryDiff>),
}

/// Pick the project file: the explicit one if it exists, otherwise the only
/// `*.vcxproj` in `root`.
pub fn locate_project(root: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path.to_path_buf()));
        }
        debug!("{} does not exist, searching {}", path.display(), root.display());
    }

    let mut candidates = Vec::new();
    let entries = fs::read_dir(root)
        .with_context(|| format!("Failed to read directory: {}", root.display()))?;
    for entry in entries {
        let path = entry?.path();
        let is_project = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase().ends_with(".vcxproj"))
            .unwrap_or(false);
        if is_project && path.is_file() {
            candidates.push(path);
        }
    }

    if candidates.len() == 1 {
        Ok(candidates.pop())
    } else {
        debug!("Found {} project file candidates", candidates.len());
        Ok(None)
    }
}

/// The explicit filter file if it exists, otherwise `<project>.filters`.
pub fn locate_filter(project: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) if path.is_file() => path.to_path_buf(),
        _ => {
            let mut name = project.as_os_str().to_os_string();
            name.push(".filters");
            PathBuf::from(name)
        }
    }
}

fn print_sections(layout: &GroupLayout) {
    for category in Category::ALL {
        match layout.section(category) {
            Some(section) => {
                let n = section.paths.len();
                println!(
                    " {} section found, {} {}.",
                    category.section_name(),
                    n,
                    plural("entry", n)
                );
            }
            None => println!(" No {} section found.", category.section_name()),
        }
    }
}

fn print_scan_summary(files: &FileSet) {
    let count = |c| files.len(c);
    let (h, s, r) = (
        count(Category::Header),
        count(Category::Source),
        count(Category::Resource),
    );
    println!("Found {} header {},", h, plural("file", h));
    println!("      {} source {},", s, plural("file", s));
    println!("      {} resource {}.", r, plural("file", r));
}

/// Scan the tree, read the project and filter files, then either report the
/// differences or rewrite both files to match the tree.
pub fn run(opts: &SyncOptions) -> Result<Outcome> {
    let Some(project_path) = locate_project(&opts.root, opts.project.as_deref())? else {
        println!(
            "Could not find the project file.  Please specify it with the --project or -p command line argument."
        );
        return Ok(Outcome::NoProject);
    };
    let filter_path = locate_filter(&project_path, opts.filter.as_deref());

    println!("Scanning directory: {}", opts.root.display());
    let disk = scan_directory(&opts.root, &opts.rules)
        .with_context(|| format!("Failed to scan directory: {}", opts.root.display()))?;
    print_scan_summary(&disk);

    println!("Processing project file: {}", project_path.display());
    let project = VcxprojFile::load(&project_path)
        .with_context(|| format!("Failed to read project file: {}", project_path.display()))?;
    print_sections(project.layout());

    let filter = FilterFile::load_if_exists(&filter_path)
        .with_context(|| format!("Failed to read filter file: {}", filter_path.display()))?;
    let declared_filters = match &filter {
        Some(filter) => {
            println!("Processing project filter file: {}", filter.path.display());
            print_sections(filter.layout());
            filter.files()
        }
        None => {
            println!("No project filter file present.");
            FileSet::new()
        }
    };

    let diffs = compare(&disk, &project.files(), &declared_filters);

    if opts.scan_only {
        print!("{}", render_scan_report(&diffs));
        return Ok(Outcome::Scanned(diffs));
    }

    // Render first so a malformed project aborts before anything is written.
    let rendered = project
        .render(&disk)
        .with_context(|| format!("Failed to update project file: {}", project_path.display()))?;

    println!("Writing project file: {}", project_path.display());
    project
        .save(&rendered)
        .with_context(|| format!("Failed to write project file: {}", project_path.display()))?;

    if !opts.no_filter {
        println!("Writing project filter file: {}", filter_path.display());
        write_filters(&filter_path, &disk, opts.remove_first_dir_name)
            .with_context(|| format!("Failed to write filter file: {}", filter_path.display()))?;
    }

    info!("Synchronized {}", project_path.display());
    print!("{}", render_update_summary(&diffs, !opts.no_filter));
    Ok(Outcome::Updated(diffs))
}
