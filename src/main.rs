use clap::Parser;
use hidex_tdcr_processor::cli::{Args, run, setup_logging};
use std::process;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    if let Err(error) = run(&args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
