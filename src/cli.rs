//! Command-line interface components.

use crate::config::ProcessorConfig;
use crate::constants::DEFAULT_LOG_LEVEL;
use crate::error::Result;
use crate::models::{ElapsedUnit, ExportKind};
use crate::processor::HidexProcessor;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "hidex-tdcr")]
#[command(about = "Derive background, sample and net measurements from Hidex TDCR readings")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Folder holding the Hidex TDCR export files of one campaign
    #[arg(value_name = "INPUT_FOLDER")]
    pub input_folder: PathBuf,

    /// Name of the measured radionuclide, e.g. Lu-177
    #[arg(short, long)]
    pub radionuclide: String,

    /// Year of the measurement campaign
    #[arg(long)]
    pub year: i32,

    /// Month of the measurement campaign (1-12)
    #[arg(long)]
    pub month: u32,

    /// Unit of the elapsed time columns (s, min, h, d, wk, mo, yr)
    #[arg(short, long, default_value = "s")]
    pub time_unit: String,

    /// Folder receiving the results; nothing is saved when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not copy the raw export files next to the results
    #[arg(long)]
    pub no_readings_copy: bool,

    /// Tables saved as CSV (readings, background, sample, net, all)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "readings,background,sample,net,all"
    )]
    pub export: Vec<String>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => DEFAULT_LOG_LEVEL,
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress bars are hidden in quiet mode
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Campaign configuration described by the arguments
    pub fn to_config(&self) -> Result<ProcessorConfig> {
        let time_unit: ElapsedUnit = self.time_unit.parse()?;
        let exports = self
            .export
            .iter()
            .map(|name| name.parse::<ExportKind>())
            .collect::<Result<Vec<_>>>()?;

        let mut config = ProcessorConfig::new(self.radionuclide.clone(), self.year, self.month)
            .with_time_unit(time_unit)
            .with_exports(exports);
        if self.no_readings_copy {
            config = config.without_readings_copy();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hidex_tdcr_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Analyze one campaign and report the outcome on stdout
pub fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.to_config()?;
    debug!("Configuration: {:?}", config);

    let mut processor = HidexProcessor::new(config)?;
    if args.show_progress() {
        processor = processor.with_progress_bar();
    }

    if !args.quiet {
        println!(
            "{}",
            "Analyzing Hidex TDCR readings".bright_green().bold()
        );
        println!(
            "  {} {}",
            "Input:".bright_cyan(),
            args.input_folder.display()
        );
    }

    let saved = processor.analyze(&args.input_folder, args.output.as_deref())?;

    if !args.quiet {
        println!("\n{}", processor.report());
        if let Some(folder) = saved {
            println!(
                "\n  {} {}",
                "Results saved to".bright_cyan(),
                folder.display().to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}
