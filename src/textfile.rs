//! Reading and writing MSBuild text files.
//!
//! Visual Studio writes project files as UTF-8 with a signature and CRLF line
//! endings. Both properties are detected on read so a rewrite can reproduce
//! them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SyncError};

const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    CrLf,
    Lf,
}

impl LineEnding {
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") || !text.contains('\n') {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// Decoded contents of a text file plus the formatting needed to write it back.
#[derive(Debug, Clone)]
pub struct TextFile {
    pub path: PathBuf,
    pub text: String,
    pub bom: bool,
    pub line_ending: LineEnding,
}

impl TextFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path)?;
        let mut text = String::from_utf8(bytes).map_err(|source| SyncError::Encoding {
            path: path.clone(),
            source,
        })?;
        let bom = text.starts_with(UTF8_BOM);
        if bom {
            text.replace_range(..UTF8_BOM.len(), "");
        }
        let line_ending = LineEnding::detect(&text);
        Ok(Self { path, text, bom, line_ending })
    }
}

/// Back up `path` to `path.bak` (replacing an older backup) and write
/// `text`, prefixed with a UTF-8 signature when `bom` is set.
pub fn write_with_backup(path: &Path, text: &str, bom: bool) -> Result<()> {
    backup_file(path)?;
    let mut out = String::with_capacity(text.len() + UTF8_BOM.len());
    if bom {
        out.push_str(UTF8_BOM);
    }
    out.push_str(text);
    fs::write(path, out)?;
    Ok(())
}

/// Copy an existing file to `<path>.bak`. Nothing happens if `path` does not exist.
pub fn backup_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Ok(());
    }
    let backup = backup_path(path);
    if backup.is_file() {
        fs::remove_file(&backup)?;
    }
    fs::copy(path, &backup)?;
    debug!("Backed up {} to {}", path.display(), backup.display());
    Ok(())
}

pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}
