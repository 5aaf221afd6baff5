//! Hidex TDCR export block parsing.
//!
//! An export file starts with a few device identification lines, followed by
//! measurement blocks introduced by a `Sample start` line. Inside a block,
//! `label;value;...` lines carry the fields of interest; everything else is
//! ignored.

use crate::constants::{BLOCK_STARTER, DELIMITER, ID_LINES, labels};
use crate::error::{Result, TdcrError};
use crate::models::RawBlock;
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parse one export file into its measurement blocks
pub fn parse_file(file_path: &Path, file_index: usize) -> Result<Vec<RawBlock>> {
    let bytes = fs::read(file_path)?;
    // Instrument exports are not guaranteed to be UTF-8
    let content = String::from_utf8_lossy(&bytes);

    let blocks = parse_lines(content.lines(), file_index).map_err(|err| match err {
        TdcrError::MissingValue { line, field, .. } => TdcrError::MissingValue {
            path: file_path.display().to_string(),
            line,
            field,
        },
        other => other,
    })?;

    debug!(
        "Parsed {} blocks from {} (file {})",
        blocks.len(),
        file_path.display(),
        file_index
    );

    Ok(blocks)
}

/// Parse a batch of export files, tagging blocks with 1-based file indices
///
/// `progress` advances by one per parsed file.
pub fn parse_files(file_paths: &[PathBuf], progress: &ProgressBar) -> Result<Vec<RawBlock>> {
    let mut blocks = Vec::new();
    for (offset, path) in file_paths.iter().enumerate() {
        if let Some(name) = path.file_name() {
            progress.set_message(name.to_string_lossy().into_owned());
        }
        blocks.extend(parse_file(path, offset + 1)?);
        progress.inc(1);
    }
    Ok(blocks)
}

/// Parse the lines of one export file
pub fn parse_lines<'a, I>(lines: I, file_index: usize) -> Result<Vec<RawBlock>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parser = BlockParser::new(file_index);
    for (line_num, line) in lines.into_iter().enumerate().skip(ID_LINES) {
        parser.feed(line, line_num + 1)?;
    }
    Ok(parser.finish())
}

/// Accumulates blocks while lines are fed in order
struct BlockParser {
    file_index: usize,
    current: RawBlock,
    blocks: Vec<RawBlock>,
}

impl BlockParser {
    fn new(file_index: usize) -> Self {
        Self {
            file_index,
            current: RawBlock::new(file_index),
            blocks: Vec::new(),
        }
    }

    fn feed(&mut self, line: &str, line_num: usize) -> Result<()> {
        if line.trim() == BLOCK_STARTER {
            self.flush();
            return Ok(());
        }

        let Some(label) = labels::ALL.into_iter().find(|label| line.starts_with(label)) else {
            return Ok(());
        };

        let value = line
            .split(DELIMITER)
            .nth(1)
            .ok_or_else(|| TdcrError::MissingValue {
                path: format!("file {}", self.file_index),
                line: line_num,
                field: label,
            })?;

        self.current.set(label, value.trim().to_string());
        Ok(())
    }

    /// Emit the open block unless it is empty, then open a new one
    fn flush(&mut self) {
        let block = std::mem::replace(&mut self.current, RawBlock::new(self.file_index));
        if !block.is_empty() {
            self.blocks.push(block);
        }
    }

    fn finish(mut self) -> Vec<RawBlock> {
        self.flush();
        self.blocks
    }
}
