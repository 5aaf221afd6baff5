//! Application constants for the Hidex TDCR processor
//!
//! Fixed properties of the instrument export format and the column names of
//! every table the crate produces. Column names are consumed verbatim by
//! downstream CSV readers, so they must not change.

// =============================================================================
// Instrument Export Format
// =============================================================================

/// Number of device identification lines at the top of every export file
pub const ID_LINES: usize = 4;

/// Line that opens a new measurement block
pub const BLOCK_STARTER: &str = "Sample start";

/// Field delimiter inside `label;value;...` lines
pub const DELIMITER: char = ';';

/// Format of the `EndTime` field
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Format used when writing timestamps to exported tables
pub const EXPORT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// File pattern of instrument exports inside an input folder
pub const INPUT_FILE_PATTERN: &str = "*.csv";

/// Field labels extracted from each block
pub mod labels {
    pub const SAMPLE: &str = "Samp.";
    pub const REPETITION: &str = "Repe.";
    pub const COUNT_RATE: &str = "CPM";
    pub const COUNTS: &str = "Counts";
    pub const DEAD_TIME: &str = "DTime";
    pub const REAL_TIME: &str = "Time";
    pub const END_TIME: &str = "EndTime";

    /// All recognized labels in export order
    pub const ALL: [&str; 7] = [
        SAMPLE, REPETITION, COUNT_RATE, COUNTS, DEAD_TIME, REAL_TIME, END_TIME,
    ];
}

// =============================================================================
// Sample Identity Convention
// =============================================================================

/// `Samp.` value of background readings
pub const BACKGROUND_ID: u32 = 1;

/// `Samp.` value of sample readings
pub const SAMPLE_ID: u32 = 2;

// =============================================================================
// Table Column Names
// =============================================================================

pub mod columns {
    pub const CYCLE: &str = "Cycle";
    pub const SAMPLE: &str = "Sample";
    pub const REPETITIONS: &str = "Repetitions";
    pub const COUNT_RATE: &str = "Count rate (cpm)";
    pub const COUNTS_READING: &str = "Counts (reading)";
    pub const DEAD_TIME: &str = "Dead time";
    pub const REAL_TIME: &str = "Real time (s)";
    pub const END_TIME: &str = "End time";
    pub const DATE: &str = "Date";
    pub const LIVE_TIME: &str = "Live time (s)";
    pub const ELAPSED_TIME: &str = "Elapsed time";
    pub const COUNTS: &str = "Counts";
    pub const COUNTS_UNCERTAINTY: &str = "Counts uncertainty";
    pub const COUNTS_UNCERTAINTY_PCT: &str = "Counts uncertainty (%)";

    /// Column holding elapsed time converted to `unit`
    pub fn elapsed_time_in(unit: &str) -> String {
        format!("Elapsed time ({})", unit)
    }
}

/// Top-level column groups of the compiled table
pub mod groups {
    pub const BACKGROUND: &str = "Background";
    pub const SAMPLE: &str = "Sample";
    pub const NET: &str = "Net";

    /// Separator between group and column in flattened compiled column names
    pub const SEPARATOR: char = '/';
}

// =============================================================================
// Output Layout
// =============================================================================

/// Name of the text summary written alongside exported tables
pub const SUMMARY_FILE_NAME: &str = "summary.txt";

/// Extension of the measurement charts, saved as `<kind>.png`
pub const PLOT_EXTENSION: &str = "png";

/// Sub-folder receiving a copy of the raw instrument exports
pub const READINGS_COPY_DIR: &str = "readings";

/// Default log level when no verbosity flag is given
pub const DEFAULT_LOG_LEVEL: &str = "warn";
