//! Processing engine for one batch of Hidex TDCR readings.
//!
//! Holds the tables derived so far and sequences the pipeline stages:
//! parsing, measurement derivation, compilation and export. Each stage is
//! computed in full before any stored table is replaced, so a failing call
//! leaves the processor exactly as it was.

pub mod discovery;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::discover_input_files;

use crate::config::ProcessorConfig;
use crate::constants::{PLOT_EXTENSION, READINGS_COPY_DIR, SUMMARY_FILE_NAME};
use crate::error::{Result, TdcrError};
use crate::measurements::{derive_measurements, derive_net};
use crate::models::{
    ElapsedUnit, ExportKind, MeasurementKind, MeasurementTable, NetTable, RawBlock, ReadingsTable,
    SampleKind, Statistics, SummaryTable,
};
use crate::parser::parse_files;
use crate::plot::{plot_measurements, plot_net};
use crate::readings::build_readings;
use crate::report::{CompiledTable, ReadingsReport, compile};
use crate::schema::ToDataFrame;
use crate::statistics::{compute_statistics, summarize};

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How far the pipeline has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    /// Nothing parsed yet
    Empty,
    /// Readings, summary and statistics are available
    Parsed,
    /// At least one measurement table is available
    Processed,
    /// Background, sample and net are all available, side by side
    Compiled,
}

/// Processor for Hidex TDCR readings of one measurement campaign
#[derive(Debug)]
pub struct HidexProcessor {
    config: ProcessorConfig,
    show_progress: bool,
    readings: Option<ReadingsTable>,
    summary: Option<SummaryTable>,
    statistics: Option<Statistics>,
    background: Option<MeasurementTable>,
    sample: Option<MeasurementTable>,
    net: Option<NetTable>,
    compiled: Option<CompiledTable>,
}

impl HidexProcessor {
    /// Create a processor for a validated campaign configuration
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            show_progress: false,
            readings: None,
            summary: None,
            statistics: None,
            background: None,
            sample: None,
            net: None,
            compiled: None,
        })
    }

    /// Show a progress bar while parsing export files
    pub fn with_progress_bar(mut self) -> Self {
        self.show_progress = true;
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn state(&self) -> ProcessorState {
        if self.compiled.is_some() {
            ProcessorState::Compiled
        } else if self.background.is_some() || self.sample.is_some() || self.net.is_some() {
            ProcessorState::Processed
        } else if self.readings.is_some() {
            ProcessorState::Parsed
        } else {
            ProcessorState::Empty
        }
    }

    pub fn readings(&self) -> Option<&ReadingsTable> {
        self.readings.as_ref()
    }

    pub fn summary(&self) -> Option<&SummaryTable> {
        self.summary.as_ref()
    }

    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    pub fn background(&self) -> Option<&MeasurementTable> {
        self.background.as_ref()
    }

    pub fn sample(&self) -> Option<&MeasurementTable> {
        self.sample.as_ref()
    }

    pub fn net(&self) -> Option<&NetTable> {
        self.net.as_ref()
    }

    pub fn compiled(&self) -> Option<&CompiledTable> {
        self.compiled.as_ref()
    }

    /// Text summary of the campaign and its statistics
    pub fn report(&self) -> ReadingsReport<'_> {
        ReadingsReport {
            config: &self.config,
            summary: self.summary.as_ref(),
            statistics: self.statistics.as_ref(),
        }
    }

    /// Parse every export file in `folder`
    pub fn parse_readings(&mut self, folder: &Path) -> Result<Vec<PathBuf>> {
        let files = discover_input_files(folder)?;
        self.parse_files(&files)?;
        Ok(files)
    }

    /// Parse a batch of export files, one file per measurement cycle
    ///
    /// Replaces readings, summary and statistics. Measurement tables derived
    /// from earlier readings are discarded.
    pub fn parse_files(&mut self, files: &[PathBuf]) -> Result<()> {
        let blocks = self.read_blocks(files)?;
        let readings = build_readings(&blocks)?;
        let summary = summarize(&readings)?;
        let statistics = compute_statistics(&summary)?;

        info!(
            "Parsed {} readings in {} cycles from {} files",
            readings.len(),
            statistics.cycles,
            files.len()
        );

        self.readings = Some(readings);
        self.summary = Some(summary);
        self.statistics = Some(statistics);
        self.background = None;
        self.sample = None;
        self.net = None;
        self.compiled = None;
        Ok(())
    }

    fn read_blocks(&self, files: &[PathBuf]) -> Result<Vec<RawBlock>> {
        let progress = if self.show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            let template =
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
            if let Ok(style) = ProgressStyle::default_bar().template(template) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        match parse_files(files, &progress) {
            Ok(blocks) => {
                progress.finish_and_clear();
                Ok(blocks)
            }
            Err(err) => {
                progress.abandon();
                Err(err)
            }
        }
    }

    /// Parse measurement kind and time unit names, then process
    pub fn process(&mut self, kind: &str, time_unit: &str) -> Result<()> {
        let kind: MeasurementKind = kind.parse()?;
        let time_unit: ElapsedUnit = time_unit.parse()?;
        self.process_readings(kind, time_unit)
    }

    /// Derive measurement tables from the parsed readings
    ///
    /// Replacing the background or sample table discards the net and compiled
    /// tables built from the previous one. Deriving the net table also
    /// compiles it with the background and sample tables it came from.
    pub fn process_readings(
        &mut self,
        kind: MeasurementKind,
        time_unit: ElapsedUnit,
    ) -> Result<()> {
        match kind {
            MeasurementKind::Background | MeasurementKind::Sample => {
                let sample_kind = if kind == MeasurementKind::Background {
                    SampleKind::Background
                } else {
                    SampleKind::Sample
                };
                let readings = self.require_readings(sample_kind.name())?;
                let table = derive_measurements(readings, sample_kind, time_unit)?;

                match sample_kind {
                    SampleKind::Background => self.background = Some(table),
                    SampleKind::Sample => self.sample = Some(table),
                }
                self.net = None;
                self.compiled = None;
            }
            MeasurementKind::Net => {
                let (background, sample) = self.require_measurements("net measurements")?;
                let net = derive_net(background, sample, time_unit)?;
                let compiled = compile(background, sample, &net)?;

                self.net = Some(net);
                self.compiled = Some(compiled);
            }
            MeasurementKind::All => {
                let readings = self.require_readings("measurements")?;
                let background = derive_measurements(readings, SampleKind::Background, time_unit)?;
                let sample = derive_measurements(readings, SampleKind::Sample, time_unit)?;
                let net = derive_net(&background, &sample, time_unit)?;
                let compiled = compile(&background, &sample, &net)?;

                self.background = Some(background);
                self.sample = Some(sample);
                self.net = Some(net);
                self.compiled = Some(compiled);
            }
        }

        debug!("Processed {:?} measurements in {}", kind, time_unit);
        Ok(())
    }

    /// Join the current background, sample and net tables
    pub fn compile_measurements(&mut self) -> Result<()> {
        let (background, sample) = self.require_measurements("compiled measurements")?;
        let net = self.net.as_ref().ok_or(TdcrError::MissingPrerequisite {
            missing: "net",
            target: "compiled measurements",
            remedy: "process the readings",
        })?;

        let compiled = compile(background, sample, net)?;
        self.compiled = Some(compiled);
        Ok(())
    }

    fn require_readings(&self, target: &'static str) -> Result<&ReadingsTable> {
        self.readings
            .as_ref()
            .ok_or(TdcrError::MissingPrerequisite {
                missing: "readings",
                target,
                remedy: "parse the readings",
            })
    }

    fn require_measurements(
        &self,
        target: &'static str,
    ) -> Result<(&MeasurementTable, &MeasurementTable)> {
        match (&self.background, &self.sample) {
            (Some(background), Some(sample)) => Ok((background, sample)),
            _ => Err(TdcrError::MissingPrerequisite {
                missing: "background and sample",
                target,
                remedy: "process the readings",
            }),
        }
    }

    /// Write one table to `<folder>/<kind>.csv`
    pub fn export_table(&self, kind: ExportKind, folder: &Path) -> Result<PathBuf> {
        let path = folder.join(kind.file_name());
        let missing = || TdcrError::MissingPrerequisite {
            missing: match kind {
                ExportKind::All => "background, sample and net",
                _ => kind.name(),
            },
            target: "the CSV export",
            remedy: match kind {
                ExportKind::Readings => "parse the readings",
                _ => "process the readings",
            },
        };

        match kind {
            ExportKind::Readings => {
                let table = self.readings.as_ref().ok_or_else(missing)?;
                writer::write_csv(&mut table.to_dataframe()?, &path)?;
            }
            ExportKind::Background => {
                let table = self.background.as_ref().ok_or_else(missing)?;
                writer::write_csv(&mut table.to_dataframe()?, &path)?;
            }
            ExportKind::Sample => {
                let table = self.sample.as_ref().ok_or_else(missing)?;
                writer::write_csv(&mut table.to_dataframe()?, &path)?;
            }
            ExportKind::Net => {
                let table = self.net.as_ref().ok_or_else(missing)?;
                writer::write_csv(&mut table.to_dataframe()?, &path)?;
            }
            ExportKind::All => {
                let table = self.compiled.as_ref().ok_or_else(missing)?;
                writer::write_grouped_csv(table, &path)?;
            }
        }

        Ok(path)
    }

    /// Draw one measurement table to `<folder>/<kind>.png`
    pub fn export_plot(&self, kind: MeasurementKind, folder: &Path) -> Result<PathBuf> {
        let missing = |name: &'static str| TdcrError::MissingPrerequisite {
            missing: name,
            target: "the plot",
            remedy: "process the readings",
        };
        let plot_path = |name: &str| folder.join(format!("{name}.{PLOT_EXTENSION}"));

        let path = match kind {
            MeasurementKind::Background | MeasurementKind::Sample => {
                let (name, table) = if kind == MeasurementKind::Background {
                    ("background", self.background.as_ref())
                } else {
                    ("sample", self.sample.as_ref())
                };
                let table = table.ok_or_else(|| missing(name))?;
                let path = plot_path(name);
                plot_measurements(table, &path)?;
                path
            }
            MeasurementKind::Net => {
                let table = self.net.as_ref().ok_or_else(|| missing("net"))?;
                let path = plot_path("net");
                plot_net(table, &path)?;
                path
            }
            MeasurementKind::All => {
                return Err(TdcrError::InvalidOption {
                    option: "plot",
                    value: "all".to_string(),
                    choices: "\"background\", \"sample\" or \"net\"",
                });
            }
        };

        debug!("Saved plot {}", path.display());
        Ok(path)
    }

    /// Write the text summary to `<folder>/summary.txt`
    pub fn export_summary(&self, folder: &Path) -> Result<PathBuf> {
        if self.statistics.is_none() {
            return Err(TdcrError::MissingPrerequisite {
                missing: "readings",
                target: "the summary",
                remedy: "parse the readings",
            });
        }

        let path = folder.join(SUMMARY_FILE_NAME);
        writer::write_text(&path, &self.report().to_string())?;
        Ok(path)
    }

    /// Run the whole pipeline on an input folder
    ///
    /// When `output` is given, results are saved to a fresh
    /// `<output>/<radionuclide>_<year>_<month>` folder which is returned.
    pub fn analyze(&mut self, input: &Path, output: Option<&Path>) -> Result<Option<PathBuf>> {
        self.parse_readings(input)?;
        self.process_readings(MeasurementKind::All, self.config.time_unit)?;
        info!("{}", self.report());

        let Some(output) = output else {
            return Ok(None);
        };

        let folder = output.join(self.config.output_folder_name());
        writer::prepare_output_folder(&folder)?;

        if self.config.copy_readings {
            writer::copy_folder(input, &folder.join(READINGS_COPY_DIR))?;
        }
        for &kind in &self.config.exports {
            self.export_table(kind, &folder)?;
        }
        for kind in [
            MeasurementKind::Background,
            MeasurementKind::Sample,
            MeasurementKind::Net,
        ] {
            self.export_plot(kind, &folder)?;
        }
        self.export_summary(&folder)?;

        info!("Results saved to {}", folder.display());
        Ok(Some(folder))
    }
}
