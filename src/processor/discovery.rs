//! File discovery module for Hidex TDCR exports
//!
//! An input folder holds one export file per measurement cycle. Files are
//! returned sorted by path; their order carries no meaning since cycles are
//! numbered chronologically after parsing.

use crate::constants::INPUT_FILE_PATTERN;
use crate::error::{Result, TdcrError};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Find all export files directly inside `folder`
pub fn discover_input_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(TdcrError::InputNotFound {
            path: folder.to_path_buf(),
        });
    }

    let pattern = format!(
        "{}/{}",
        Pattern::escape(&folder.to_string_lossy()),
        INPUT_FILE_PATTERN
    );
    debug!("Searching for export files with pattern: {}", pattern);

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|err| TdcrError::Io(err.into_error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        warn!("No export files found in {}", folder.display());
    } else {
        debug!("Found {} export files in {}", files.len(), folder.display());
    }

    Ok(files)
}
