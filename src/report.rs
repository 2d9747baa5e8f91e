use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::model::{plural, Category, FileSet};

/// Differences between the scanned tree and what the project and filter
/// files declare, for one category. Every list is sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDiff {
    pub category: Category,
    pub project_missing: Vec<String>,
    pub project_extra: Vec<String>,
    pub filter_missing: Vec<String>,
    pub filter_extra: Vec<String>,
}

impl CategoryDiff {
    pub fn is_clean(&self) -> bool {
        self.project_missing.is_empty()
            && self.project_extra.is_empty()
            && self.filter_missing.is_empty()
            && self.filter_extra.is_empty()
    }
}

fn difference(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Vec<String> {
    a.difference(b).cloned().collect()
}

/// Compare the scanned files against the project and filter declarations.
pub fn compare(disk: &FileSet, project: &FileSet, filters: &FileSet) -> Vec<CategoryDiff> {
    Category::ALL
        .into_iter()
        .map(|category| {
            let real = disk.get(category);
            let proj = project.get(category);
            let filt = filters.get(category);
            CategoryDiff {
                category,
                project_missing: difference(real, proj),
                project_extra: difference(proj, real),
                filter_missing: difference(real, filt),
                filter_extra: difference(filt, real),
            }
        })
        .collect()
}

fn push_list(out: &mut String, label: &str, names: &[String], tail: impl Fn(usize) -> String) {
    if names.is_empty() {
        return;
    }
    let n = names.len();
    let _ = writeln!(out, "The following {} {} {}", plural(label, n), plural("is", n), tail(n));
    for name in names {
        let _ = writeln!(out, "  {name}");
    }
}

/// The scan-only report: every discrepancy, or a "nothing missing" line.
pub fn render_scan_report(diffs: &[CategoryDiff]) -> String {
    let mut out = String::new();
    for diff in diffs {
        let label = diff.category.label();
        push_list(&mut out, label, &diff.project_missing, |_| {
            "missing from your project file:".to_string()
        });
        push_list(&mut out, label, &diff.project_extra, |n| {
            format!("in your project file, but {} not exist on disk:", plural("does", n))
        });
        push_list(&mut out, label, &diff.filter_missing, |_| {
            "missing from your project filter file:".to_string()
        });
        push_list(&mut out, label, &diff.filter_extra, |n| {
            format!("in your project filter file, but {} not exist on disk:", plural("does", n))
        });
        if diff.is_clean() {
            let _ = writeln!(out, "No {} are missing from your project files.", plural(label, 2));
        }
    }
    out
}

/// Per-category added/removed counts after an update.
pub fn render_update_summary(diffs: &[CategoryDiff], include_filters: bool) -> String {
    let mut out = String::new();
    for diff in diffs {
        let label = diff.category.label();
        let added = diff.project_missing.len();
        let _ = writeln!(
            out,
            "Removed {} and added {} {} to the project file.",
            diff.project_extra.len(),
            added,
            plural(label, added)
        );
        if include_filters {
            let added = diff.filter_missing.len();
            let _ = writeln!(
                out,
                "Removed {} and added {} {} to the project filter file.",
                diff.filter_extra.len(),
                added,
                plural(label, added)
            );
        }
    }
    out
}
