//! File categories and the per-category path sets shared by the scanner,
//! the readers and the writers.

use std::collections::BTreeSet;

/// Separator used for every path stored in a [`FileSet`]. MSBuild files always
/// spell relative paths with backslashes, so scanned paths are converted to
/// match regardless of the host.
pub const PATH_SEPARATOR: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Header,
    Source,
    Resource,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Header, Category::Source, Category::Resource];

    /// Classify a file extension (without the dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "h" | "hpp" => Some(Category::Header),
            "c" | "cpp" => Some(Category::Source),
            "rc" => Some(Category::Resource),
            _ => None,
        }
    }

    /// MSBuild item element used for this category.
    pub fn item_kind(self) -> &'static str {
        match self {
            Category::Header => "ClInclude",
            Category::Source => "ClCompile",
            Category::Resource => "ResourceCompile",
        }
    }

    /// Top-level filter name shown by Visual Studio.
    pub fn filter_name(self) -> &'static str {
        match self {
            Category::Header => "Header Files",
            Category::Source => "Source Files",
            Category::Resource => "Resource Files",
        }
    }

    pub fn filter_guid(self) -> &'static str {
        match self {
            Category::Header => "{93995380-89BD-4b04-88EB-625FBE52EBFB}",
            Category::Source => "{4FC737F1-C7A5-4376-A066-2A32D752A2FF}",
            Category::Resource => "{67DA6AB6-F800-4c08-8B7A-83BB121AAD01}",
        }
    }

    pub fn filter_extensions(self) -> &'static str {
        match self {
            Category::Header => "h;hh;hpp;hxx;hm;inl;inc;xsd",
            Category::Source => "cpp;c;cc;cxx;def;odl;idl;hpj;bat;asm;asmx",
            Category::Resource => {
                "rc;ico;cur;bmp;dlg;rc2;rct;bin;rgs;gif;jpg;jpeg;jpe;resx;tiff;tif;png;wav;mfcribbon-ms"
            }
        }
    }

    /// Singular label used in reports, e.g. "Header File".
    pub fn label(self) -> &'static str {
        match self {
            Category::Header => "Header File",
            Category::Source => "Source File",
            Category::Resource => "Resource File",
        }
    }

    /// Section name used in progress output, e.g. "Includes".
    pub fn section_name(self) -> &'static str {
        match self {
            Category::Header => "Includes",
            Category::Source => "Compiles",
            Category::Resource => "Resources",
        }
    }

    /// Short name of the `<ItemGroup>` kind, used in structure errors.
    pub fn group_label(self) -> &'static str {
        match self {
            Category::Header => "Include",
            Category::Source => "Compile",
            Category::Resource => "Resource",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Header => 0,
            Category::Source => 1,
            Category::Resource => 2,
        }
    }
}

/// Relative paths of the headers, sources and resources of one tree or one
/// project file. Each container is kept sorted so output order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: [BTreeSet<String>; 3],
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, path: impl Into<String>) -> bool {
        self.files[category.index()].insert(path.into())
    }

    pub fn get(&self, category: Category) -> &BTreeSet<String> {
        &self.files[category.index()]
    }

    pub fn len(&self, category: Category) -> usize {
        self.get(category).len()
    }
}

/// Pluralize the handful of words the reports use.
pub fn plural(word: &str, count: usize) -> &str {
    if count == 1 {
        return word;
    }
    match word {
        "entry" => "entries",
        "file" => "files",
        "Header File" => "Header Files",
        "Source File" => "Source Files",
        "Resource File" => "Resource Files",
        "is" => "are",
        "does" => "do",
        other => other,
    }
}

/// Directory part of a stored path, or `""` for files directly in the root.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once(PATH_SEPARATOR).map_or("", |(dir, _)| dir)
}

/// Drop the leading directory segment of a stored path, if it has one.
pub fn strip_first_dir(path: &str) -> Option<&str> {
    path.split_once(PATH_SEPARATOR).map(|(_, rest)| rest)
}
