//! The `.vcxproj.filters` companion file.
//!
//! Unlike the project file, the filter file is never patched: it is read to
//! report what it declares, then regenerated from the scanned tree with one
//! filter per source directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{parent_dir, strip_first_dir, Category, FileSet, PATH_SEPARATOR};
use crate::textfile::{write_with_backup, TextFile};
use crate::vcxproj::GroupLayout;

const LE: &str = "\r\n";

/// Namespace for the name-based identifiers of generated sub-filters.
const FILTER_NAMESPACE: Uuid = Uuid::from_u128(0x5c1e_7a0b_3d94_4f2e_9b61_08a4_c7d2_e315);

/// Order of the top-level filter declarations.
const DECLARATION_ORDER: [Category; 3] = [Category::Source, Category::Header, Category::Resource];

/// Order of sub-filter declarations and of the per-category item groups.
const GROUP_ORDER: [Category; 3] = [Category::Header, Category::Resource, Category::Source];

#[derive(Debug, Clone)]
pub struct FilterFile {
    pub path: PathBuf,
    layout: GroupLayout,
}

impl FilterFile {
    /// Read the filter file at `path`, or `None` if there is none.
    pub fn load_if_exists(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(None);
        }
        let file = TextFile::load(path)?;
        let layout = GroupLayout::parse(&file.text)?;
        Ok(Some(Self {
            path: file.path,
            layout,
        }))
    }

    pub fn layout(&self) -> &GroupLayout {
        &self.layout
    }

    pub fn files(&self) -> FileSet {
        self.layout.files()
    }
}

/// Distinct sub-filter directories for one category. Files directly in the
/// root contribute nothing; with `strip_first` the leading directory is
/// dropped and single-level directories vanish.
pub fn sub_filters(paths: &BTreeSet<String>, strip_first: bool) -> BTreeSet<String> {
    paths
        .iter()
        .map(|path| parent_dir(path))
        .filter(|dir| !dir.is_empty())
        .filter_map(|dir| if strip_first { strip_first_dir(dir) } else { Some(dir) })
        .map(str::to_string)
        .collect()
}

/// The filter a file is listed under, e.g. `Header Files\inc`.
pub fn filter_for(category: Category, path: &str, strip_first: bool) -> String {
    let path = if strip_first {
        strip_first_dir(path).unwrap_or(path)
    } else {
        path
    };
    match parent_dir(path) {
        "" => category.filter_name().to_string(),
        dir => format!("{}{}{}", category.filter_name(), PATH_SEPARATOR, dir),
    }
}

fn filter_guid(name: &str) -> String {
    let uuid = Uuid::new_v5(&FILTER_NAMESPACE, name.as_bytes());
    format!("{{{}}}", uuid.to_string().to_uppercase())
}

/// Build a complete filter document for `files`.
pub fn render_filters(files: &FileSet, strip_first: bool) -> String {
    let mut content = String::new();
    content.push_str(&format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>{LE}"));
    content.push_str(&format!(
        "<Project ToolsVersion=\"4.0\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">{LE}"
    ));

    content.push_str(&format!("  <ItemGroup>{LE}"));
    for category in DECLARATION_ORDER {
        content.push_str(&format!("    <Filter Include=\"{}\">{LE}", category.filter_name()));
        content.push_str(&format!(
            "      <UniqueIdentifier>{}</UniqueIdentifier>{LE}",
            category.filter_guid()
        ));
        content.push_str(&format!(
            "      <Extensions>{}</Extensions>{LE}",
            category.filter_extensions()
        ));
        content.push_str(&format!("    </Filter>{LE}"));
    }
    for category in GROUP_ORDER {
        for dir in sub_filters(files.get(category), strip_first) {
            let name = format!("{}{}{}", category.filter_name(), PATH_SEPARATOR, dir);
            content.push_str(&format!("    <Filter Include=\"{}\">{LE}", escape(&name)));
            content.push_str(&format!(
                "      <UniqueIdentifier>{}</UniqueIdentifier>{LE}",
                filter_guid(&name)
            ));
            content.push_str(&format!("    </Filter>{LE}"));
        }
    }
    content.push_str(&format!("  </ItemGroup>{LE}"));

    for category in GROUP_ORDER {
        let kind = category.item_kind();
        content.push_str(&format!("  <ItemGroup>{LE}"));
        for path in files.get(category) {
            let filter = filter_for(category, path, strip_first);
            content.push_str(&format!("    <{kind} Include=\"{}\">{LE}", escape(path)));
            content.push_str(&format!("      <Filter>{}</Filter>{LE}", escape(&filter)));
            content.push_str(&format!("    </{kind}>{LE}"));
        }
        content.push_str(&format!("  </ItemGroup>{LE}"));
    }

    content.push_str(&format!("</Project>{LE}"));
    content
}

/// Regenerate the filter file at `path`, backing up any previous version.
pub fn write_filters(path: &Path, files: &FileSet, strip_first: bool) -> Result<()> {
    write_with_backup(path, &render_filters(files, strip_first), true)
}
