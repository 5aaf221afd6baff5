//! CSV and text output for derived tables
//!
//! Tables are written with Polars' CSV writer. The compiled table carries a
//! two-level header (group row, then column row) ahead of the data rows.
//! Charts are drawn by [`crate::plot`].

use crate::constants::EXPORT_DATE_TIME_FORMAT;
use crate::error::Result;
use crate::report::CompiledTable;
use crate::schema::ToDataFrame;
use polars::prelude::{Column, CsvWriter, DataFrame, SerWriter};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Write a frame to `path` with a single header row
pub fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    csv_writer(&mut writer, true).finish(frame)?;
    writer.flush()?;

    debug!("Wrote {} rows to {}", frame.height(), path.display());
    Ok(())
}

/// Write the compiled table with its group and column header rows
pub fn write_grouped_csv(table: &CompiledTable, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let mut frame = table.to_dataframe()?;

    // Group row, then column row
    let header_columns: Vec<Column> = frame
        .get_columns()
        .iter()
        .zip(table.column_groups()?)
        .map(|(column, (group, name))| {
            Column::new(column.name().clone(), vec![group.to_string(), name])
        })
        .collect();
    let mut header = DataFrame::new(header_columns)?;

    csv_writer(&mut writer, false).finish(&mut header)?;
    csv_writer(&mut writer, false).finish(&mut frame)?;
    writer.flush()?;

    debug!(
        "Wrote {} compiled rows to {}",
        frame.height(),
        path.display()
    );
    Ok(())
}

fn csv_writer<W: Write>(writer: W, include_header: bool) -> CsvWriter<W> {
    CsvWriter::new(writer)
        .include_header(include_header)
        .with_datetime_format(Some(EXPORT_DATE_TIME_FORMAT.to_string()))
}

/// Write a text file, replacing any previous content
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Start from an empty output folder
pub fn prepare_output_folder(folder: &Path) -> Result<()> {
    if folder.exists() {
        debug!("Removing previous results in {}", folder.display());
        fs::remove_dir_all(folder)?;
    }
    fs::create_dir_all(folder)?;
    Ok(())
}

/// Copy the whole input folder into `destination`
pub fn copy_folder(source: &Path, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination)?;

    let mut copied = 0;
    let entries = WalkDir::new(source)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !entry.path().starts_with(destination));
    for entry in entries {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    debug!(
        "Copied {} files from {} to {}",
        copied,
        source.display(),
        destination.display()
    );
    Ok(())
}
