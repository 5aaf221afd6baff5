//! Compiled measurement table and text summary.

use crate::config::ProcessorConfig;
use crate::constants::groups;
use crate::error::{Result, TdcrError};
use crate::models::{MeasurementTable, NetTable, Statistics, SummaryTable};
use crate::schema::{ToDataFrame, grouped_column_name};
use polars::prelude::*;
use std::fmt;

/// Background, sample and net tables side by side
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTable {
    background: MeasurementTable,
    sample: MeasurementTable,
    net: NetTable,
}

impl CompiledTable {
    pub fn background(&self) -> &MeasurementTable {
        &self.background
    }

    pub fn sample(&self) -> &MeasurementTable {
        &self.sample
    }

    pub fn net(&self) -> &NetTable {
        &self.net
    }

    pub fn len(&self) -> usize {
        self.net.len()
    }

    pub fn is_empty(&self) -> bool {
        self.net.is_empty()
    }

    /// Group frames in output order
    pub fn grouped_frames(&self) -> Result<Vec<(&'static str, DataFrame)>> {
        Ok(vec![
            (groups::BACKGROUND, self.background.to_dataframe()?),
            (groups::SAMPLE, self.sample.to_dataframe()?),
            (groups::NET, self.net.to_dataframe()?),
        ])
    }

    /// Both header levels, one `(group, column)` pair per output column
    pub fn column_groups(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(self
            .grouped_frames()?
            .into_iter()
            .flat_map(|(group, frame)| {
                frame
                    .get_column_names()
                    .into_iter()
                    .map(|name| (group, name.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect())
    }
}

impl ToDataFrame for CompiledTable {
    fn to_dataframe(&self) -> Result<DataFrame> {
        let mut grouped = Vec::new();
        for (group, frame) in self.grouped_frames()? {
            for column in frame.get_columns() {
                let mut column = column.clone();
                let name = grouped_column_name(group, column.name().as_str());
                column.rename(name.into());
                grouped.push(column);
            }
        }
        Ok(DataFrame::new(grouped)?)
    }
}

/// Join background, sample and net tables under one two-level header
pub fn compile(
    background: &MeasurementTable,
    sample: &MeasurementTable,
    net: &NetTable,
) -> Result<CompiledTable> {
    if background.len() != sample.len() || sample.len() != net.len() {
        return Err(TdcrError::inconsistent(
            "compiled",
            format!(
                "Background, sample and net tables differ in length ({}, {}, {})",
                background.len(),
                sample.len(),
                net.len()
            ),
        ));
    }

    Ok(CompiledTable {
        background: background.clone(),
        sample: sample.clone(),
        net: net.clone(),
    })
}

/// Human-readable summary of a batch of readings
pub struct ReadingsReport<'a> {
    pub config: &'a ProcessorConfig,
    pub summary: Option<&'a SummaryTable>,
    pub statistics: Option<&'a Statistics>,
}

impl fmt::Display for ReadingsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Measurements of {} on {} {}",
            self.config.radionuclide,
            self.config.month_name(),
            self.config.year
        )?;

        let (Some(summary), Some(stats)) = (self.summary, self.statistics) else {
            return Ok(());
        };

        writeln!(f)?;
        writeln!(f, "Summary")?;
        writeln!(f, "Number of cycles: {}", stats.cycles)?;
        writeln!(f, "Repetitions per cycle: {}", stats.cycle_repetitions)?;
        writeln!(f, "Time per repetition: {} s", stats.repetition_time)?;
        writeln!(f, "Total number of measurements: {}", stats.measurements)?;
        writeln!(f, "Total measurement time: {} s", stats.measurement_time)?;
        writeln!(f, "Cycles summary")?;
        match summary.to_dataframe() {
            Ok(frame) => write!(f, "{}", frame),
            Err(_) => Err(fmt::Error),
        }
    }
}
