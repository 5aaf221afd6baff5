//! Configuration management and validation.
//!
//! Describes one measurement campaign (radionuclide, year and month) and
//! the processing options applied to it. The export format itself is fixed
//! and lives in [`crate::constants`].

use crate::error::{Result, TdcrError};
use crate::models::{ElapsedUnit, ExportKind};
use chrono::Month;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Processing configuration for one measurement campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Name of the measured radionuclide, e.g. `Lu-177`
    pub radionuclide: String,

    /// Year of the campaign
    pub year: i32,

    /// Month of the campaign (1-12)
    pub month: u32,

    /// Unit used for the elapsed time columns
    pub time_unit: ElapsedUnit,

    /// Copy the raw instrument exports next to the saved tables
    pub copy_readings: bool,

    /// Tables written to CSV when results are saved
    pub exports: Vec<ExportKind>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            radionuclide: String::from("unknown"),
            year: 1970,
            month: 1,
            time_unit: ElapsedUnit::Seconds,
            copy_readings: true,
            exports: ExportKind::EVERY.to_vec(),
        }
    }
}

impl ProcessorConfig {
    pub fn new(radionuclide: impl Into<String>, year: i32, month: u32) -> Self {
        Self {
            radionuclide: radionuclide.into(),
            year,
            month,
            ..Self::default()
        }
    }

    /// Set the elapsed time unit
    pub fn with_time_unit(mut self, time_unit: ElapsedUnit) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Do not copy raw exports when saving results
    pub fn without_readings_copy(mut self) -> Self {
        self.copy_readings = false;
        self
    }

    /// Limit the saved CSV tables to `exports`, in the given order
    pub fn with_exports(mut self, exports: Vec<ExportKind>) -> Self {
        self.exports = exports;
        self
    }

    /// Check the campaign description
    pub fn validate(&self) -> Result<()> {
        if self.radionuclide.trim().is_empty() {
            return Err(TdcrError::Configuration {
                message: "Radionuclide name must not be empty".to_string(),
            });
        }

        if !(1..=12).contains(&self.month) {
            return Err(TdcrError::Configuration {
                message: format!("Month must be between 1 and 12, got {}", self.month),
            });
        }

        if self.exports.is_empty() {
            return Err(TdcrError::Configuration {
                message: "At least one export table must be selected".to_string(),
            });
        }

        debug!(
            "Configuration valid: {} {}-{:02}, time unit {}",
            self.radionuclide, self.year, self.month, self.time_unit
        );
        Ok(())
    }

    /// English month name, or the raw number when out of range
    pub fn month_name(&self) -> String {
        u8::try_from(self.month)
            .ok()
            .and_then(|month| Month::try_from(month).ok())
            .map(|month| month.name().to_string())
            .unwrap_or_else(|| self.month.to_string())
    }

    /// Folder name of the saved results, e.g. `Lu-177_2023_11`
    pub fn output_folder_name(&self) -> String {
        format!("{}_{}_{}", self.radionuclide, self.year, self.month)
    }
}
