use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use quick_xml::escape::{escape, unescape};
use regex::Regex;
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::model::{Category, FileSet, PATH_SEPARATOR};
use crate::textfile::{write_with_backup, TextFile};

/// Regexes locating `<ItemGroup>` blocks and the file entries inside them.
struct Patterns {
    group_start: Regex,
    group_end: Regex,
    single: BTreeMap<Category, Regex>,
    multi: BTreeMap<Category, Regex>,
}

static PATTERNS: OnceLock<std::result::Result<Patterns, regex::Error>> = OnceLock::new();

fn patterns() -> Result<&'static Patterns> {
    PATTERNS
        .get_or_init(Patterns::new)
        .as_ref()
        .map_err(|e| SyncError::Regex(e.clone()))
}

impl Patterns {
    fn new() -> std::result::Result<Self, regex::Error> {
        let mut single = BTreeMap::new();
        let mut multi = BTreeMap::new();
        for category in Category::ALL {
            let kind = category.item_kind();
            // <ClCompile Include="a.cpp" />
            single.insert(
                category,
                Regex::new(&format!(r#"(?i)<{kind}\s*Include=['"](.+?)['"]\s*/>"#))?,
            );
            // <ClCompile Include="a.cpp">...</ClCompile>
            multi.insert(
                category,
                Regex::new(&format!(
                    r#"(?im)^\s*<{kind}\s*Include=['"](.+?)['"]\s*>\s*(?s:.*?)\s*</{kind}>"#
                ))?,
            );
        }
        Ok(Self {
            group_start: Regex::new(r"(?i)<ItemGroup>")?,
            group_end: Regex::new(r"(?i)</ItemGroup>")?,
            single,
            multi,
        })
    }

    fn matches(&self, category: Category, body: &str) -> bool {
        self.single[&category].is_match(body) || self.multi[&category].is_match(body)
    }

    fn extract(&self, category: Category, body: &str) -> Result<Vec<String>> {
        let single = self.single[&category].captures_iter(body);
        let multi = self.multi[&category].captures_iter(body);
        single
            .chain(multi)
            .filter_map(|caps| caps.get(1))
            .map(|m| -> Result<String> { Ok(normalize_path(&unescape(m.as_str())?)) })
            .collect()
    }
}

fn normalize_path(path: &str) -> String {
    path.replace('/', &PATH_SEPARATOR.to_string())
}

/// One `<ItemGroup>` block, as byte ranges into the document text.
#[derive(Debug, Clone)]
struct ItemGroup {
    /// From just after `<ItemGroup>` to the start of the closing tag's line
    /// (or to the next group if the closing tag is missing).
    body: Range<usize>,
    /// The closing tag, including the indentation in front of it. `None` when
    /// the first `</ItemGroup>` after the start is missing or shares its line
    /// with other markup.
    close: Option<Range<usize>>,
}

/// The single group holding one category's entries, and the paths it declares.
#[derive(Debug, Clone)]
pub struct Section {
    group: usize,
    pub paths: Vec<String>,
}

/// The `<ItemGroup>` layout of an MSBuild file: every group, and for each
/// category the one group that declares its entries.
#[derive(Debug, Clone)]
pub struct GroupLayout {
    groups: Vec<ItemGroup>,
    sections: BTreeMap<Category, Section>,
}

impl GroupLayout {
    /// Split `text` into groups and locate the section of each category.
    ///
    /// Fails with [`SyncError::AmbiguousGroups`] when more than one group
    /// declares entries of the same kind, and with
    /// [`SyncError::MissingStructure`] when such a group has no closing tag on
    /// a line of its own. A category without any group is simply absent.
    pub fn parse(text: &str) -> Result<Self> {
        let patterns = patterns()?;

        let starts: Vec<_> = patterns.group_start.find_iter(text).collect();
        let mut groups = Vec::with_capacity(starts.len());
        for (i, start) in starts.iter().enumerate() {
            let segment_end = starts.get(i + 1).map_or(text.len(), |next| next.start());
            let segment = &text[start.end()..segment_end];
            let close = patterns.group_end.find(segment).and_then(|m| {
                let tag_start = start.end() + m.start();
                let line_start = text[..tag_start].rfind('\n').map_or(0, |i| i + 1);
                text[line_start..tag_start]
                    .chars()
                    .all(|c| c == ' ' || c == '\t')
                    .then_some(line_start..start.end() + m.end())
            });
            let body_end = close.as_ref().map_or(segment_end, |c| c.start);
            groups.push(ItemGroup {
                body: start.end()..body_end,
                close,
            });
        }

        let mut candidates: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
        for (index, group) in groups.iter().enumerate() {
            let body = &text[group.body.clone()];
            for category in Category::ALL {
                if patterns.matches(category, body) {
                    candidates.entry(category).or_default().push(index);
                }
            }
        }

        let ambiguous: Vec<Category> = candidates
            .iter()
            .filter(|(_, found)| found.len() > 1)
            .map(|(category, _)| *category)
            .collect();
        if !ambiguous.is_empty() {
            return Err(SyncError::AmbiguousGroups(ambiguous));
        }

        let mut sections = BTreeMap::new();
        for (category, found) in candidates {
            let group = found[0];
            if groups[group].close.is_none() {
                return Err(SyncError::MissingStructure(format!(
                    "the <ItemGroup> holding {} entries has no closing tag on its own line",
                    category.item_kind()
                )));
            }
            let paths = patterns.extract(category, &text[groups[group].body.clone()])?;
            debug!(
                "{} group at byte {} declares {} entries",
                category.item_kind(),
                groups[group].body.start,
                paths.len()
            );
            sections.insert(category, Section { group, paths });
        }

        Ok(Self { groups, sections })
    }

    pub fn section(&self, category: Category) -> Option<&Section> {
        self.sections.get(&category)
    }

    /// Every declared path, grouped by category.
    pub fn files(&self) -> FileSet {
        let mut files = FileSet::new();
        for (category, section) in &self.sections {
            for path in &section.paths {
                files.insert(*category, path.clone());
            }
        }
        files
    }
}

/// A `.vcxproj` file whose file lists can be replaced in place.
#[derive(Debug, Clone)]
pub struct VcxprojFile {
    file: TextFile,
    layout: GroupLayout,
}

impl VcxprojFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_text_file(TextFile::load(path)?)
    }

    pub fn from_text_file(file: TextFile) -> Result<Self> {
        let layout = GroupLayout::parse(&file.text)?;
        Ok(Self { file, layout })
    }

    pub fn layout(&self) -> &GroupLayout {
        &self.layout
    }

    pub fn files(&self) -> FileSet {
        self.layout.files()
    }

    /// Produce the project text declaring exactly `files`.
    ///
    /// Each category's group body is regenerated with self-closing entries;
    /// everything else is copied verbatim. Categories with files but no group
    /// get a new group right after the closing tag of the last one.
    pub fn render(&self, files: &FileSet) -> Result<String> {
        let text = &self.file.text;
        let le = self.file.line_ending.as_str();

        let last = self.layout.groups.last().ok_or_else(|| {
            SyncError::MissingStructure(format!("no <ItemGroup> in {}", self.file.path.display()))
        })?;
        let last_close = last.close.clone().ok_or_else(|| {
            SyncError::MissingStructure(format!(
                "the last <ItemGroup> in {} is never closed",
                self.file.path.display()
            ))
        })?;
        let group_indent = leading_whitespace(&text[last_close.clone()]);
        let fallback_indent = format!("{group_indent}  ");

        let mut edits: Vec<(Range<usize>, String)> = Vec::new();
        let mut replaced: Vec<usize> = Vec::new();
        let mut missing: Vec<Category> = Vec::new();

        for category in Category::ALL {
            match self.layout.section(category) {
                // A group holding two kinds is rebuilt for the first one only.
                Some(section) if !replaced.contains(&section.group) => {
                    replaced.push(section.group);
                    let body = self.layout.groups[section.group].body.clone();
                    let indent = entry_indent(&text[body.clone()]).unwrap_or(fallback_indent.as_str());
                    let mut new_body = le.to_string();
                    push_entries(&mut new_body, category, files, indent, le);
                    edits.push((body, new_body));
                }
                _ if !files.get(category).is_empty() => missing.push(category),
                _ => {}
            }
        }

        if !missing.is_empty() {
            let indent = entry_indent(&text[last.body.clone()]).unwrap_or(fallback_indent.as_str());
            let rest = &text[last_close.end..];
            let mut at = last_close.end;
            let mut block = String::new();
            if rest.starts_with("\r\n") {
                at += 2;
            } else if rest.starts_with('\n') {
                at += 1;
            } else {
                block.push_str(le);
            }
            for category in missing {
                debug!("Adding a new {} group", category.item_kind());
                block.push_str(&format!("{group_indent}<ItemGroup>{le}"));
                push_entries(&mut block, category, files, indent, le);
                block.push_str(&format!("{group_indent}</ItemGroup>{le}"));
            }
            edits.push((at..at, block));
        }

        edits.sort_by_key(|(range, _)| range.start);
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (range, replacement) in edits {
            out.push_str(&text[cursor..range.start]);
            out.push_str(&replacement);
            cursor = range.end;
        }
        out.push_str(&text[cursor..]);
        Ok(out)
    }

    /// Write rendered project text, backing up the previous version first.
    /// The original signature is kept.
    pub fn save(&self, text: &str) -> Result<()> {
        write_with_backup(&self.file.path, text, self.file.bom)
    }
}

fn push_entries(out: &mut String, category: Category, files: &FileSet, indent: &str, le: &str) {
    let kind = category.item_kind();
    for path in files.get(category) {
        out.push_str(&format!("{indent}<{kind} Include=\"{}\" />{le}", escape(path)));
    }
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Indentation of the first non-blank line of a group body.
fn entry_indent(body: &str) -> Option<&str> {
    body.lines()
        .find(|line| !line.trim().is_empty())
        .map(leading_whitespace)
}
