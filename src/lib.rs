//! Hidex TDCR Processor Library
//!
//! Turns the raw exports of a Hidex 300 SL triple-to-double coincidence
//! ratio (TDCR) liquid scintillation counter into analysis-ready tables.
//!
//! This library provides tools for:
//! - Parsing the block-structured instrument export files
//! - Building a chronologically ordered readings table with cycle numbers
//! - Summarizing cycles and deriving campaign statistics
//! - Deriving background, sample and net counts with Poisson uncertainties
//! - Exporting every table to CSV along with a text summary and PNG charts

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod measurements;
pub mod models;
pub mod parser;
pub mod plot;
pub mod processor;
pub mod readings;
pub mod report;
pub mod schema;
pub mod statistics;

pub use config::ProcessorConfig;
pub use error::{ErrorKind, Result, TdcrError};
pub use models::{
    ElapsedUnit, ExportKind, MeasurementKind, MeasurementTable, NetTable, ReadingsTable,
    SampleKind, Statistics, SummaryTable,
};
pub use processor::{HidexProcessor, ProcessorState};
pub use report::CompiledTable;
