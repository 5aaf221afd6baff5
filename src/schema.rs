//! Tabular interface of the derived tables.
//!
//! Every table converts into a Polars `DataFrame` whose column names and
//! order are stable; exported CSV files are read by existing downstream
//! tooling that relies on them.

use crate::constants::{columns, groups};
use crate::error::Result;
use crate::models::{MeasurementTable, NetTable, ReadingRow, ReadingsTable, SummaryTable};
use chrono::{NaiveDateTime, TimeDelta};
use polars::prelude::*;

/// Conversion of a derived table into a `DataFrame`
pub trait ToDataFrame {
    fn to_dataframe(&self) -> Result<DataFrame>;

    /// Column names in output order
    fn column_names(&self) -> Result<Vec<String>> {
        Ok(self
            .to_dataframe()?
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect())
    }
}

impl ToDataFrame for ReadingsTable {
    fn to_dataframe(&self) -> Result<DataFrame> {
        let rows: Vec<&ReadingRow> = self.rows().iter().collect();
        Ok(DataFrame::new(reading_columns(&rows))?)
    }
}

impl ToDataFrame for SummaryTable {
    fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = self.rows();
        Ok(DataFrame::new(vec![
            Column::new(
                columns::CYCLE.into(),
                rows.iter().map(|row| row.cycle).collect::<Vec<u32>>(),
            ),
            Column::new(
                columns::REPETITIONS.into(),
                rows.iter().map(|row| row.repetitions).collect::<Vec<u32>>(),
            ),
            Column::new(
                columns::REAL_TIME.into(),
                rows.iter().map(|row| row.real_time).collect::<Vec<f64>>(),
            ),
            Column::new(
                columns::DATE.into(),
                rows.iter().map(|row| row.date).collect::<Vec<NaiveDateTime>>(),
            ),
        ])?)
    }
}

impl ToDataFrame for MeasurementTable {
    fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = self.rows();
        let readings: Vec<&ReadingRow> = rows.iter().map(|row| &row.reading).collect();

        let mut frame_columns = reading_columns(&readings);
        frame_columns.extend([
            Column::new(
                columns::LIVE_TIME.into(),
                rows.iter().map(|row| row.live_time).collect::<Vec<f64>>(),
            ),
            Column::new(
                columns::ELAPSED_TIME.into(),
                rows.iter()
                    .map(|row| format_elapsed(row.elapsed))
                    .collect::<Vec<String>>(),
            ),
            Column::new(
                columns::elapsed_time_in(self.unit().symbol()).into(),
                rows.iter()
                    .map(|row| row.elapsed_in_unit)
                    .collect::<Vec<f64>>(),
            ),
            Column::new(
                columns::COUNTS.into(),
                rows.iter().map(|row| row.counts).collect::<Vec<f64>>(),
            ),
            Column::new(
                columns::COUNTS_UNCERTAINTY.into(),
                rows.iter()
                    .map(|row| row.counts_uncertainty)
                    .collect::<Vec<f64>>(),
            ),
            Column::new(
                columns::COUNTS_UNCERTAINTY_PCT.into(),
                rows.iter()
                    .map(|row| row.counts_uncertainty_pct)
                    .collect::<Vec<f64>>(),
            ),
        ]);

        Ok(DataFrame::new(frame_columns)?)
    }
}

impl ToDataFrame for NetTable {
    fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = self.rows();
        Ok(DataFrame::new(vec![
            Column::new(
                columns::CYCLE.into(),
                rows.iter().map(|row| row.cycle).collect::<Vec<u32>>(),
            ),
            Column::new(
                columns::REPETITIONS.into(),
                rows.iter().map(|row| row.repetition).collect::<Vec<u32>>(),
            ),
            Column::new(
                columns::ELAPSED_TIME.into(),
                rows.iter()
                    .map(|row| format_elapsed(row.elapsed))
                    .collect::<Vec<String>>(),
            ),
            Column::new(
                columns::elapsed_time_in(self.unit().symbol()).into(),
                rows.iter()
                    .map(|row| row.elapsed_in_unit)
                    .collect::<Vec<f64>>(),
            ),
            Column::new(
                columns::COUNT_RATE.into(),
                rows.iter().map(|row| row.count_rate).collect::<Vec<f64>>(),
            ),
            Column::new(
                columns::COUNTS.into(),
                rows.iter().map(|row| row.counts).collect::<Vec<f64>>(),
            ),
            Column::new(
                columns::COUNTS_UNCERTAINTY.into(),
                rows.iter()
                    .map(|row| row.counts_uncertainty)
                    .collect::<Vec<f64>>(),
            ),
            Column::new(
                columns::COUNTS_UNCERTAINTY_PCT.into(),
                rows.iter()
                    .map(|row| row.counts_uncertainty_pct)
                    .collect::<Vec<f64>>(),
            ),
        ])?)
    }
}

fn reading_columns(rows: &[&ReadingRow]) -> Vec<Column> {
    vec![
        Column::new(
            columns::CYCLE.into(),
            rows.iter().map(|row| row.cycle).collect::<Vec<u32>>(),
        ),
        Column::new(
            columns::SAMPLE.into(),
            rows.iter().map(|row| row.sample).collect::<Vec<u32>>(),
        ),
        Column::new(
            columns::REPETITIONS.into(),
            rows.iter().map(|row| row.repetition).collect::<Vec<u32>>(),
        ),
        Column::new(
            columns::COUNT_RATE.into(),
            rows.iter().map(|row| row.count_rate).collect::<Vec<f64>>(),
        ),
        Column::new(
            columns::COUNTS_READING.into(),
            rows.iter()
                .map(|row| row.counts_reading)
                .collect::<Vec<u64>>(),
        ),
        Column::new(
            columns::DEAD_TIME.into(),
            rows.iter().map(|row| row.dead_time).collect::<Vec<f64>>(),
        ),
        Column::new(
            columns::REAL_TIME.into(),
            rows.iter().map(|row| row.real_time).collect::<Vec<f64>>(),
        ),
        Column::new(
            columns::END_TIME.into(),
            rows.iter()
                .map(|row| row.end_time)
                .collect::<Vec<NaiveDateTime>>(),
        ),
    ]
}

/// Render elapsed time as `<days> days HH:MM:SS`
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let total = elapsed.num_seconds();
    let days = total.div_euclid(86_400);
    let rest = total.rem_euclid(86_400);
    format!(
        "{} days {:02}:{:02}:{:02}",
        days,
        rest / 3600,
        rest % 3600 / 60,
        rest % 60
    )
}

/// Flattened name of a column inside the compiled table
pub fn grouped_column_name(group: &str, column: &str) -> String {
    format!("{}{}{}", group, groups::SEPARATOR, column)
}
