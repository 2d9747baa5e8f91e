//! Synchronize Visual Studio `.vcxproj` and `.vcxproj.filters` files with the
//! C/C++ headers, sources and resources found on disk.

pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod model;
pub mod report;
pub mod scanner;
pub mod sync;
pub mod textfile;
pub mod vcxproj;

pub use config::{ScanRules, SyncOptions};
pub use error::{Result, SyncError};
pub use model::{Category, FileSet};
pub use sync::{run, Outcome};
