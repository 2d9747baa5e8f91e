use std::path::{Component, Path};

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::config::ScanRules;
use crate::error::Result;
use crate::model::{Category, FileSet, PATH_SEPARATOR};

/// Recursively collect the headers, sources and resources below `root`.
///
/// Returned paths are relative to `root` and joined with
/// [`PATH_SEPARATOR`]. Directories matched by `rules` are pruned without being
/// entered.
pub fn scan_directory(root: &Path, rules: &ScanRules) -> Result<FileSet> {
    let mut files = FileSet::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            let skip = rules.skips_dir(&name, entry.depth());
            if skip {
                debug!("Skipping directory {}", entry.path().display());
            }
            !skip
        });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if rules.ignores_file(&name) {
            debug!("Ignoring {}", entry.path().display());
            continue;
        }

        let Some(category) = entry
            .path()
            .extension()
            .and_then(|ext| Category::from_extension(&ext.to_string_lossy()))
        else {
            continue;
        };

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let relative = to_project_path(relative);
        trace!("{} -> {}", relative, category.filter_name());
        files.insert(category, relative);
    }

    Ok(files)
}

/// Spell a relative path the way project files do.
pub fn to_project_path(path: &Path) -> String {
    let separator = PATH_SEPARATOR.to_string();
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(separator.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn paths(files: &FileSet, category: Category) -> Vec<String> {
        files.get(category).iter().cloned().collect()
    }

    #[test]
    fn classifies_files_by_extension() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "main.cpp");
        touch(dir.path(), "src/util.C");
        touch(dir.path(), "inc/util.h");
        touch(dir.path(), "inc/detail/impl.HPP");
        touch(dir.path(), "res/app.rc");
        touch(dir.path(), "README.md");
        touch(dir.path(), "src/notes.txt");

        let files = scan_directory(dir.path(), &ScanRules::default()).unwrap();

        assert_eq!(paths(&files, Category::Source), vec!["main.cpp", "src\\util.C"]);
        assert_eq!(
            paths(&files, Category::Header),
            vec!["inc\\detail\\impl.HPP", "inc\\util.h"]
        );
        assert_eq!(paths(&files, Category::Resource), vec!["res\\app.rc"]);
    }

    #[test]
    fn top_level_exclusion_is_shallow() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Debug/generated.cpp");
        touch(dir.path(), "src/module/Debug/trace.cpp");
        touch(dir.path(), "docs/example.cpp");

        let files = scan_directory(dir.path(), &ScanRules::default()).unwrap();

        assert_eq!(
            paths(&files, Category::Source),
            vec!["src\\module\\Debug\\trace.cpp"]
        );
    }

    #[test]
    fn all_depth_exclusion_prunes_nested_dirs() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Debug/generated.cpp");
        touch(dir.path(), "src/module/Debug/trace.cpp");
        touch(dir.path(), "src/module/keep.cpp");

        let rules = ScanRules::new(&["debug"], &["DEBUG"], &[]);
        let files = scan_directory(dir.path(), &rules).unwrap();

        assert_eq!(paths(&files, Category::Source), vec!["src\\module\\keep.cpp"]);
    }

    #[test]
    fn ignored_file_names_are_skipped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "stdafx.cpp");
        touch(dir.path(), "src/StdAfx.h");
        touch(dir.path(), "src/real.h");

        let rules = ScanRules::new(&[] as &[&str], &[], &["STDAFX.CPP", "stdafx.h"]);
        let files = scan_directory(dir.path(), &rules).unwrap();

        assert!(files.get(Category::Source).is_empty());
        assert_eq!(paths(&files, Category::Header), vec!["src\\real.h"]);
    }
}
