use std::path::PathBuf;

use thiserror::Error;

use crate::model::Category;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{} is not valid UTF-8: {source}", .path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Invalid entry pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid escape sequence in file path: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// More than one `<ItemGroup>` declares entries of the same kind.
    #[error("{}", ambiguous_message(.0))]
    AmbiguousGroups(Vec<Category>),

    /// The closing tag of the final `<ItemGroup>` could not be found.
    #[error("Error in formatting of original project file: {0}")]
    MissingStructure(String),
}

fn ambiguous_message(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| format!("Could not determine location of the {} ItemGroup.", c.group_label()))
        .collect::<Vec<_>>()
        .join("\n")
}
