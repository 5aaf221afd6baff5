//! Cycle summary and scalar statistics over the readings table.
//!
//! Both derivations double as consistency checks: a cycle whose repetitions
//! were counted for different real times, or a cycle with a dropped
//! repetition, halts processing instead of skewing the totals.

use crate::error::{Result, TdcrError};
use crate::models::{ReadingsTable, Statistics, SummaryRow, SummaryTable};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::debug;

/// One summary row per cycle, in ascending cycle order
pub fn summarize(readings: &ReadingsTable) -> Result<SummaryTable> {
    let mut cycles: BTreeMap<u32, SummaryRow> = BTreeMap::new();

    for row in readings.rows() {
        match cycles.entry(row.cycle) {
            Entry::Occupied(mut entry) => {
                let summary = entry.get_mut();
                if summary.real_time != row.real_time {
                    return Err(TdcrError::inconsistent(
                        "readings",
                        format!(
                            "Real time values are not consistent for all measurements \
                             (cycle {}: {} s and {} s)",
                            row.cycle, summary.real_time, row.real_time
                        ),
                    ));
                }
                summary.repetitions = summary.repetitions.max(row.repetition);
                summary.date = summary.date.min(row.end_time);
            }
            Entry::Vacant(entry) => {
                entry.insert(SummaryRow {
                    cycle: row.cycle,
                    repetitions: row.repetition,
                    real_time: row.real_time,
                    date: row.end_time,
                });
            }
        }
    }

    debug!("Summarized {} cycles", cycles.len());
    Ok(SummaryTable::new(cycles.into_values().collect()))
}

/// Aggregate the summary table into scalar statistics
pub fn compute_statistics(summary: &SummaryTable) -> Result<Statistics> {
    let Some(first) = summary.rows().first() else {
        return Err(TdcrError::inconsistent(
            "summary",
            "No cycles to compute statistics from",
        ));
    };

    if summary
        .rows()
        .iter()
        .any(|row| row.repetitions != first.repetitions)
    {
        return Err(TdcrError::inconsistent(
            "summary",
            "Repetitions per cycle are not consistent",
        ));
    }

    if summary
        .rows()
        .iter()
        .any(|row| row.real_time != first.real_time)
    {
        return Err(TdcrError::inconsistent(
            "summary",
            "Real time values are not consistent for all cycles",
        ));
    }

    let measurements: u64 = summary
        .rows()
        .iter()
        .map(|row| u64::from(row.repetitions))
        .sum();
    let measurement_time: f64 = summary
        .rows()
        .iter()
        .map(|row| f64::from(row.repetitions) * row.real_time)
        .sum();

    Ok(Statistics {
        cycles: summary.len(),
        cycle_repetitions: first.repetitions,
        repetition_time: first.real_time,
        measurements,
        measurement_time,
    })
}
