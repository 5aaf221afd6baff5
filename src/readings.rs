//! Readings table construction.
//!
//! Turns the raw blocks of a batch of export files into typed rows, orders
//! them chronologically and replaces the file tag with a cycle number derived
//! from the order in which the files were actually measured.

use crate::constants::{BACKGROUND_ID, DATE_TIME_FORMAT, SAMPLE_ID, labels};
use crate::error::{Result, TdcrError};
use crate::models::{RawBlock, ReadingRow, ReadingsTable};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use tracing::{debug, warn};

/// Build the validated, chronologically ordered readings table
pub fn build_readings(blocks: &[RawBlock]) -> Result<ReadingsTable> {
    if blocks.is_empty() {
        return Err(TdcrError::NoReadings);
    }

    // Keep the file tag next to each row until cycles are assigned
    let mut tagged = blocks
        .iter()
        .enumerate()
        .map(|(block_num, block)| Ok((block.file, coerce_block(block, block_num + 1)?)))
        .collect::<Result<Vec<(usize, ReadingRow)>>>()?;

    validate_sample_ids(&tagged)?;
    let cycles = assign_cycles(&tagged)?;

    for (file, row) in tagged.iter_mut() {
        row.cycle = cycles[&*file];
    }

    let mut rows: Vec<ReadingRow> = tagged.into_iter().map(|(_, row)| row).collect();
    rows.sort_by_key(|row| row.end_time);

    debug!(
        "Built readings table: {} rows across {} cycles",
        rows.len(),
        cycles.len()
    );

    Ok(ReadingsTable::new(rows))
}

/// Convert the text fields of one block; the cycle is filled in later
fn coerce_block(block: &RawBlock, block_num: usize) -> Result<ReadingRow> {
    let end_time_text = required(block, labels::END_TIME, block_num)?;
    let end_time =
        NaiveDateTime::parse_from_str(end_time_text, DATE_TIME_FORMAT).map_err(|source| {
            TdcrError::InvalidTimestamp {
                value: end_time_text.to_string(),
                block: block_num,
                file: block.file,
                source,
            }
        })?;

    Ok(ReadingRow {
        cycle: 0,
        sample: numeric(block, labels::SAMPLE, block_num)?,
        repetition: numeric(block, labels::REPETITION, block_num)?,
        count_rate: numeric(block, labels::COUNT_RATE, block_num)?,
        counts_reading: numeric(block, labels::COUNTS, block_num)?,
        dead_time: numeric(block, labels::DEAD_TIME, block_num)?,
        real_time: numeric(block, labels::REAL_TIME, block_num)?,
        end_time,
    })
}

fn required<'a>(block: &'a RawBlock, field: &'static str, block_num: usize) -> Result<&'a str> {
    block.get(field).ok_or(TdcrError::MissingField {
        field,
        block: block_num,
        file: block.file,
    })
}

fn numeric<T: FromStr>(block: &RawBlock, field: &'static str, block_num: usize) -> Result<T> {
    let value = required(block, field, block_num)?;
    value.parse::<T>().map_err(|_| TdcrError::InvalidField {
        field,
        value: value.to_string(),
        block: block_num,
        file: block.file,
    })
}

/// Only the background and sample identifiers may appear, and both must
fn validate_sample_ids(tagged: &[(usize, ReadingRow)]) -> Result<()> {
    let found: BTreeSet<u32> = tagged.iter().map(|(_, row)| row.sample).collect();
    let expected = BTreeSet::from([BACKGROUND_ID, SAMPLE_ID]);

    if found != expected {
        warn!("Unexpected sample identifiers in readings: {:?}", found);
        return Err(TdcrError::inconsistent(
            "readings",
            format!(
                "Sample identifiers must be exactly {} (background) and {} (sample), found {:?}",
                BACKGROUND_ID, SAMPLE_ID, found
            ),
        ));
    }
    Ok(())
}

/// Map each file tag to its cycle number, ordering files by earliest end time
fn assign_cycles(tagged: &[(usize, ReadingRow)]) -> Result<BTreeMap<usize, u32>> {
    // file tag -> (row count, earliest end time)
    let mut groups: BTreeMap<usize, (usize, NaiveDateTime)> = BTreeMap::new();
    for (file, row) in tagged {
        groups
            .entry(*file)
            .and_modify(|(count, first)| {
                *count += 1;
                *first = (*first).min(row.end_time);
            })
            .or_insert((1, row.end_time));
    }

    let row_counts: BTreeSet<usize> = groups.values().map(|(count, _)| *count).collect();
    if row_counts.len() > 1 {
        warn!("Unequal row counts per file: {:?}", row_counts);
        return Err(TdcrError::inconsistent(
            "readings",
            "Repetitions per cycle are not consistent for all measurements",
        ));
    }

    let mut order: Vec<(NaiveDateTime, usize)> = groups
        .iter()
        .map(|(file, (_, first))| (*first, *file))
        .collect();
    order.sort();

    Ok(order
        .into_iter()
        .zip(1u32..)
        .map(|((_, file), cycle)| (file, cycle))
        .collect())
}
