//! Background, sample and net measurement derivation.
//!
//! Counting statistics follow Poisson rules: the uncertainty of a count is
//! its square root, and the uncertainty of a difference of two independent
//! counts is the square root of their sum.

use crate::error::{Result, TdcrError};
use crate::models::{
    ElapsedUnit, MeasurementRow, MeasurementTable, NetRow, NetTable, ReadingsTable, SampleKind,
};
use std::collections::HashMap;
use tracing::debug;

/// Derive the background or sample table from the readings
///
/// Elapsed time is measured from the earliest end time of the filtered rows,
/// so background and sample tables each have their own zero point.
pub fn derive_measurements(
    readings: &ReadingsTable,
    kind: SampleKind,
    unit: ElapsedUnit,
) -> Result<MeasurementTable> {
    let selected: Vec<_> = readings.filter(kind).collect();

    let Some(origin) = selected.iter().map(|row| row.end_time).min() else {
        debug!("No {} readings found", kind.name());
        return Ok(MeasurementTable::new(kind, unit, Vec::new()));
    };

    let rows = selected
        .into_iter()
        .map(|reading| {
            let live_time = reading.real_time / reading.dead_time;
            let elapsed = reading.end_time - origin;
            let counts = reading.count_rate * live_time / 60.0;
            let counts_uncertainty = counts.sqrt();

            MeasurementRow {
                reading: reading.clone(),
                live_time,
                elapsed,
                elapsed_in_unit: unit.convert(elapsed),
                counts,
                counts_uncertainty,
                counts_uncertainty_pct: counts_uncertainty / counts * 100.0,
            }
        })
        .collect::<Vec<_>>();

    debug!("Derived {} {} measurements", rows.len(), kind.name());
    Ok(MeasurementTable::new(kind, unit, rows))
}

/// Subtract background from sample, pairing rows by (cycle, repetition)
pub fn derive_net(
    background: &MeasurementTable,
    sample: &MeasurementTable,
    unit: ElapsedUnit,
) -> Result<NetTable> {
    if background.kind() != SampleKind::Background || sample.kind() != SampleKind::Sample {
        return Err(TdcrError::inconsistent(
            "net",
            "Net measurements need a background table and a sample table",
        ));
    }

    let background_by_key = index_by_key(background)?;
    let sample_by_key = index_by_key(sample)?;

    if let Some((cycle, repetition)) = background_by_key
        .keys()
        .find(|key| !sample_by_key.contains_key(*key))
    {
        return Err(TdcrError::inconsistent(
            "sample",
            format!(
                "No sample reading for cycle {} repetition {}",
                cycle, repetition
            ),
        ));
    }

    let rows = sample
        .rows()
        .iter()
        .map(|sample_row| {
            let key = (sample_row.reading.cycle, sample_row.reading.repetition);
            let background_row = background_by_key.get(&key).ok_or_else(|| {
                TdcrError::inconsistent(
                    "background",
                    format!(
                        "No background reading for cycle {} repetition {}",
                        key.0, key.1
                    ),
                )
            })?;

            let counts = sample_row.counts - background_row.counts;
            // Poisson variance of each count equals the count itself
            let counts_uncertainty = (sample_row.counts + background_row.counts).sqrt();

            Ok(NetRow {
                cycle: key.0,
                repetition: key.1,
                elapsed: sample_row.elapsed,
                elapsed_in_unit: unit.convert(sample_row.elapsed),
                count_rate: sample_row.reading.count_rate - background_row.reading.count_rate,
                counts,
                counts_uncertainty,
                counts_uncertainty_pct: counts_uncertainty / counts * 100.0,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Derived {} net measurements", rows.len());
    Ok(NetTable::new(unit, rows))
}

fn index_by_key(table: &MeasurementTable) -> Result<HashMap<(u32, u32), &MeasurementRow>> {
    let mut index = HashMap::with_capacity(table.len());
    for row in table.rows() {
        let key = (row.reading.cycle, row.reading.repetition);
        if index.insert(key, row).is_some() {
            return Err(TdcrError::inconsistent(
                table.kind().name(),
                format!(
                    "Cycle {} repetition {} appears more than once",
                    key.0, key.1
                ),
            ));
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::ReadingRow;
    use chrono::{NaiveDateTime, TimeDelta};

    fn at(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn reading(
        cycle: u32,
        sample: u32,
        repetition: u32,
        count_rate: f64,
        dead_time: f64,
        end: &str,
    ) -> ReadingRow {
        ReadingRow {
            cycle,
            sample,
            repetition,
            count_rate,
            counts_reading: 0,
            dead_time,
            real_time: 100.0,
            end_time: at(end),
        }
    }

    fn fixture_readings() -> ReadingsTable {
        ReadingsTable::new(vec![
            reading(1, 1, 1, 83.97, 1.0, "2023-11-30 08:44:20"),
            reading(1, 2, 1, 252623.23, 1.125, "2023-11-30 08:47:44"),
            reading(1, 1, 2, 87.57, 1.0, "2023-11-30 08:51:04"),
            reading(1, 2, 2, 251953.09, 1.124, "2023-11-30 08:54:28"),
            reading(2, 1, 1, 97.77, 1.0, "2023-12-01 12:46:16"),
            reading(2, 2, 1, 223744.1, 1.11, "2023-12-01 12:49:40"),
            reading(2, 1, 2, 85.17, 1.0, "2023-12-01 12:53:00"),
            reading(2, 2, 2, 223689.4, 1.11, "2023-12-01 12:56:24"),
        ])
    }

    #[test]
    fn test_background_counts_and_uncertainty() {
        let background =
            derive_measurements(&fixture_readings(), SampleKind::Background, ElapsedUnit::Seconds)
                .unwrap();
        let first = &background.rows()[0];

        assert_eq!(background.len(), 4);
        assert_eq!(first.live_time, 100.0);
        assert!((first.counts - 139.95).abs() < 1e-9);
        assert!((first.counts_uncertainty - 11.8300).abs() < 1e-4);
        assert_eq!(first.counts_uncertainty, first.counts.sqrt());
        assert!(
            (first.counts_uncertainty_pct - first.counts_uncertainty / first.counts * 100.0).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_sample_live_time_uses_dead_time_factor() {
        let sample =
            derive_measurements(&fixture_readings(), SampleKind::Sample, ElapsedUnit::Seconds)
                .unwrap();
        let first = &sample.rows()[0];

        assert_eq!(first.live_time, 100.0 / 1.125);
        assert_eq!(first.counts, 252623.23 * (100.0 / 1.125) / 60.0);
        assert!(sample.rows().iter().all(|row| row.reading.sample == 2));
    }

    #[test]
    fn test_elapsed_time_has_own_origin() {
        let readings = fixture_readings();
        let background =
            derive_measurements(&readings, SampleKind::Background, ElapsedUnit::Seconds).unwrap();
        let sample =
            derive_measurements(&readings, SampleKind::Sample, ElapsedUnit::Hours).unwrap();

        assert_eq!(background.rows()[0].elapsed, TimeDelta::zero());
        assert_eq!(sample.rows()[0].elapsed, TimeDelta::zero());
        assert_eq!(sample.rows()[1].elapsed, TimeDelta::seconds(404));
        assert_eq!(background.rows()[2].elapsed_in_unit, 100_916.0);
        assert!((sample.rows()[2].elapsed_in_unit - 100_916.0 / 3600.0).abs() < 1e-9);
        assert_eq!(sample.unit(), ElapsedUnit::Hours);
    }

    #[test]
    fn test_net_is_sample_minus_background() {
        let readings = fixture_readings();
        let background =
            derive_measurements(&readings, SampleKind::Background, ElapsedUnit::Seconds).unwrap();
        let sample =
            derive_measurements(&readings, SampleKind::Sample, ElapsedUnit::Seconds).unwrap();

        let net = derive_net(&background, &sample, ElapsedUnit::Seconds).unwrap();

        assert_eq!(net.len(), 4);
        for ((net_row, sample_row), background_row) in
            net.rows().iter().zip(sample.rows()).zip(background.rows())
        {
            assert_eq!(net_row.counts, sample_row.counts - background_row.counts);
            assert_eq!(
                net_row.counts_uncertainty,
                (sample_row.counts + background_row.counts).sqrt()
            );
            assert_eq!(net_row.elapsed, sample_row.elapsed);
        }
        assert!((net.rows()[0].count_rate - 252539.26).abs() < 1e-6);
        assert_eq!(net.rows()[3].elapsed_in_unit, 101_320.0);
    }

    #[test]
    fn test_net_pairs_by_key_not_position() {
        let readings = fixture_readings();
        let background =
            derive_measurements(&readings, SampleKind::Background, ElapsedUnit::Seconds).unwrap();
        let sample =
            derive_measurements(&readings, SampleKind::Sample, ElapsedUnit::Seconds).unwrap();

        let mut reversed = background.rows().to_vec();
        reversed.reverse();
        let shuffled =
            MeasurementTable::new(SampleKind::Background, ElapsedUnit::Seconds, reversed);

        let expected = derive_net(&background, &sample, ElapsedUnit::Seconds).unwrap();
        let actual = derive_net(&shuffled, &sample, ElapsedUnit::Seconds).unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_net_missing_pair_rejected() {
        let readings = fixture_readings();
        let background =
            derive_measurements(&readings, SampleKind::Background, ElapsedUnit::Seconds).unwrap();
        let sample =
            derive_measurements(&readings, SampleKind::Sample, ElapsedUnit::Seconds).unwrap();

        let truncated = MeasurementTable::new(
            SampleKind::Sample,
            ElapsedUnit::Seconds,
            sample.rows()[..3].to_vec(),
        );
        let err = derive_net(&background, &truncated, ElapsedUnit::Seconds).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Consistency);

        let truncated = MeasurementTable::new(
            SampleKind::Background,
            ElapsedUnit::Seconds,
            background.rows()[1..].to_vec(),
        );
        let err = derive_net(&truncated, &sample, ElapsedUnit::Seconds).unwrap_err();
        assert!(err.to_string().contains("No background reading for cycle 1 repetition 1"));
    }

    #[test]
    fn test_net_rejects_swapped_tables() {
        let readings = fixture_readings();
        let background =
            derive_measurements(&readings, SampleKind::Background, ElapsedUnit::Seconds).unwrap();
        let sample =
            derive_measurements(&readings, SampleKind::Sample, ElapsedUnit::Seconds).unwrap();

        assert!(derive_net(&sample, &background, ElapsedUnit::Seconds).is_err());
    }
}
