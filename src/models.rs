//! Core data structures and types for Hidex TDCR processing.
//!
//! Defines the raw block extracted from an instrument export, the typed rows
//! of every derived table, and the closed option enums (sample kind,
//! measurement kind, export kind, elapsed time unit) accepted by the public API.

use crate::constants::{BACKGROUND_ID, SAMPLE_ID, labels};
use crate::error::TdcrError;
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One measurement block of one export file, values still as trimmed text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBlock {
    /// 1-based index of the source file within the parsed batch
    pub file: usize,
    pub sample: Option<String>,
    pub repetition: Option<String>,
    pub count_rate: Option<String>,
    pub counts: Option<String>,
    pub dead_time: Option<String>,
    pub real_time: Option<String>,
    pub end_time: Option<String>,
}

impl RawBlock {
    pub fn new(file: usize) -> Self {
        Self {
            file,
            ..Self::default()
        }
    }

    /// True when no field has been stored yet
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_none())
    }

    /// Store `value` under a recognized label; unknown labels are ignored
    pub fn set(&mut self, label: &str, value: String) {
        let slot = match label {
            labels::SAMPLE => &mut self.sample,
            labels::REPETITION => &mut self.repetition,
            labels::COUNT_RATE => &mut self.count_rate,
            labels::COUNTS => &mut self.counts,
            labels::DEAD_TIME => &mut self.dead_time,
            labels::REAL_TIME => &mut self.real_time,
            labels::END_TIME => &mut self.end_time,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Value stored under `label`, if any
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find(|(name, _)| *name == label)
            .and_then(|(_, value)| value.map(String::as_str))
    }

    fn fields(&self) -> [(&'static str, Option<&String>); 7] {
        [
            (labels::SAMPLE, self.sample.as_ref()),
            (labels::REPETITION, self.repetition.as_ref()),
            (labels::COUNT_RATE, self.count_rate.as_ref()),
            (labels::COUNTS, self.counts.as_ref()),
            (labels::DEAD_TIME, self.dead_time.as_ref()),
            (labels::REAL_TIME, self.real_time.as_ref()),
            (labels::END_TIME, self.end_time.as_ref()),
        ]
    }
}

/// Typed reading with its chronological cycle number
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingRow {
    pub cycle: u32,
    pub sample: u32,
    pub repetition: u32,
    /// Count rate in counts per minute
    pub count_rate: f64,
    /// Count value reported by the instrument
    pub counts_reading: u64,
    /// Dead-time factor (real time / live time)
    pub dead_time: f64,
    /// Real counting duration in seconds
    pub real_time: f64,
    pub end_time: NaiveDateTime,
}

/// Chronologically ordered, validated readings of one batch of files
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingsTable {
    rows: Vec<ReadingRow>,
}

impl ReadingsTable {
    pub(crate) fn new(rows: Vec<ReadingRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ReadingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to one sample kind, in table order
    pub fn filter(&self, kind: SampleKind) -> impl Iterator<Item = &ReadingRow> {
        self.rows.iter().filter(move |row| row.sample == kind.id())
    }
}

/// One row per cycle of the readings table
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub cycle: u32,
    pub repetitions: u32,
    pub real_time: f64,
    /// Earliest end time of the cycle
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub(crate) fn new(rows: Vec<SummaryRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Scalar aggregates over the summary table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of measurement cycles
    pub cycles: usize,
    /// Repetitions performed in every cycle
    pub cycle_repetitions: u32,
    /// Real time of a single repetition in seconds
    pub repetition_time: f64,
    /// Total number of repetitions across all cycles
    pub measurements: u64,
    /// Total counting time in seconds
    pub measurement_time: f64,
}

/// Reading augmented with live time, counts and elapsed time
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRow {
    pub reading: ReadingRow,
    /// Live time in seconds
    pub live_time: f64,
    /// Time since the earliest end time of the table
    pub elapsed: TimeDelta,
    pub elapsed_in_unit: f64,
    pub counts: f64,
    pub counts_uncertainty: f64,
    /// Relative counts uncertainty in percent
    pub counts_uncertainty_pct: f64,
}

/// Background or sample measurements
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementTable {
    kind: SampleKind,
    unit: ElapsedUnit,
    rows: Vec<MeasurementRow>,
}

impl MeasurementTable {
    pub(crate) fn new(kind: SampleKind, unit: ElapsedUnit, rows: Vec<MeasurementRow>) -> Self {
        Self { kind, unit, rows }
    }

    pub fn kind(&self) -> SampleKind {
        self.kind
    }

    pub fn unit(&self) -> ElapsedUnit {
        self.unit
    }

    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sample minus background for one (cycle, repetition)
#[derive(Debug, Clone, PartialEq)]
pub struct NetRow {
    pub cycle: u32,
    pub repetition: u32,
    pub elapsed: TimeDelta,
    pub elapsed_in_unit: f64,
    pub count_rate: f64,
    pub counts: f64,
    pub counts_uncertainty: f64,
    pub counts_uncertainty_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetTable {
    unit: ElapsedUnit,
    rows: Vec<NetRow>,
}

impl NetTable {
    pub(crate) fn new(unit: ElapsedUnit, rows: Vec<NetRow>) -> Self {
        Self { unit, rows }
    }

    pub fn unit(&self) -> ElapsedUnit {
        self.unit
    }

    pub fn rows(&self) -> &[NetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Which readings a measurement table is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Background,
    Sample,
}

impl SampleKind {
    /// `Samp.` identifier used by the instrument
    pub fn id(&self) -> u32 {
        match self {
            SampleKind::Background => BACKGROUND_ID,
            SampleKind::Sample => SAMPLE_ID,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleKind::Background => "background",
            SampleKind::Sample => "sample",
        }
    }
}

/// Measurement tables a processing call derives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementKind {
    Background,
    Sample,
    Net,
    /// Background, sample and net, then the compiled table
    All,
}

impl FromStr for MeasurementKind {
    type Err = TdcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "background" => Ok(MeasurementKind::Background),
            "sample" => Ok(MeasurementKind::Sample),
            "net" => Ok(MeasurementKind::Net),
            "all" => Ok(MeasurementKind::All),
            other => Err(TdcrError::InvalidOption {
                option: "measurement kind",
                value: other.to_string(),
                choices: "\"background\", \"sample\", \"net\" or \"all\"",
            }),
        }
    }
}

/// Tables that can be exported to CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Readings,
    Background,
    Sample,
    Net,
    /// The compiled background/sample/net table
    All,
}

impl ExportKind {
    pub const EVERY: [ExportKind; 5] = [
        ExportKind::Readings,
        ExportKind::Background,
        ExportKind::Sample,
        ExportKind::Net,
        ExportKind::All,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExportKind::Readings => "readings",
            ExportKind::Background => "background",
            ExportKind::Sample => "sample",
            ExportKind::Net => "net",
            ExportKind::All => "all",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }
}

impl FromStr for ExportKind {
    type Err = TdcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportKind::EVERY
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| TdcrError::InvalidOption {
                option: "export table",
                value: s.to_string(),
                choices: "\"readings\", \"background\", \"sample\", \"net\" or \"all\"",
            })
    }
}

/// Unit in which elapsed time is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElapsedUnit {
    #[default]
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "min")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "d")]
    Days,
    #[serde(rename = "wk")]
    Weeks,
    #[serde(rename = "mo")]
    Months,
    #[serde(rename = "yr")]
    Years,
}

impl ElapsedUnit {
    pub const EVERY: [ElapsedUnit; 7] = [
        ElapsedUnit::Seconds,
        ElapsedUnit::Minutes,
        ElapsedUnit::Hours,
        ElapsedUnit::Days,
        ElapsedUnit::Weeks,
        ElapsedUnit::Months,
        ElapsedUnit::Years,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            ElapsedUnit::Seconds => "s",
            ElapsedUnit::Minutes => "min",
            ElapsedUnit::Hours => "h",
            ElapsedUnit::Days => "d",
            ElapsedUnit::Weeks => "wk",
            ElapsedUnit::Months => "mo",
            ElapsedUnit::Years => "yr",
        }
    }

    /// Multiplier converting seconds into this unit
    pub fn factor(&self) -> f64 {
        match self {
            ElapsedUnit::Seconds => 1.0,
            ElapsedUnit::Minutes => 1.0 / 60.0,
            ElapsedUnit::Hours => 1.0 / 3600.0,
            ElapsedUnit::Days => 1.0 / 86400.0,
            ElapsedUnit::Weeks => 1.0 / (86400.0 * 7.0),
            // Average Gregorian month and Julian year
            ElapsedUnit::Months => 1.0 / (86400.0 * 30.44),
            ElapsedUnit::Years => 1.0 / (86400.0 * 365.25),
        }
    }

    pub fn convert(&self, elapsed: TimeDelta) -> f64 {
        elapsed.num_seconds() as f64 * self.factor()
    }
}

impl fmt::Display for ElapsedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ElapsedUnit {
    type Err = TdcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElapsedUnit::EVERY
            .into_iter()
            .find(|unit| unit.symbol() == s)
            .ok_or_else(|| TdcrError::InvalidOption {
                option: "time unit",
                value: s.to_string(),
                choices: "seconds (\"s\"), minutes (\"min\"), hours (\"h\"), days (\"d\"), \
                          weeks (\"wk\"), months (\"mo\"), or years (\"yr\")",
            })
    }
}
