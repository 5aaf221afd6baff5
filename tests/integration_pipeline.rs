//! End-to-end tests of the pipeline functions on the fixture exports

use hidex_tdcr_processor::constants::columns;
use hidex_tdcr_processor::error::ErrorKind;
use hidex_tdcr_processor::measurements::{derive_measurements, derive_net};
use hidex_tdcr_processor::parser::{parse_files, parse_lines};
use hidex_tdcr_processor::readings::build_readings;
use hidex_tdcr_processor::report::compile;
use hidex_tdcr_processor::schema::{ToDataFrame, format_elapsed};
use hidex_tdcr_processor::statistics::{compute_statistics, summarize};
use hidex_tdcr_processor::{ElapsedUnit, ReadingsTable, SampleKind};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

fn fixture_files() -> Vec<PathBuf> {
    let folder = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("hidex_tdcr");
    vec![folder.join("run_A.csv"), folder.join("run_B.csv")]
}

fn fixture_readings() -> ReadingsTable {
    let blocks = parse_files(&fixture_files(), &ProgressBar::hidden()).unwrap();
    build_readings(&blocks).unwrap()
}

#[test]
fn test_fixture_statistics() {
    let readings = fixture_readings();
    let summary = summarize(&readings).unwrap();
    let stats = compute_statistics(&summary).unwrap();

    assert_eq!(readings.len(), 8);
    assert_eq!(stats.cycles, 2);
    assert_eq!(stats.cycle_repetitions, 2);
    assert_eq!(stats.repetition_time, 100.0);
    assert_eq!(stats.measurements, 4);
    assert_eq!(stats.measurement_time, 400.0);
    assert_eq!(
        stats.measurements,
        stats.cycles as u64 * u64::from(stats.cycle_repetitions)
    );
}

#[test]
fn test_parsing_is_repeatable() {
    let first = fixture_readings();
    let second = fixture_readings();

    assert_eq!(first, second);
    assert_eq!(summarize(&first).unwrap(), summarize(&second).unwrap());
}

#[test]
fn test_readings_are_chronological() {
    let readings = fixture_readings();
    let rows = readings.rows();

    assert!(rows.windows(2).all(|pair| pair[0].end_time <= pair[1].end_time));
    // run_A.csv was measured after run_B.csv
    assert_eq!(rows[0].cycle, 1);
    assert_eq!(rows[0].end_time.to_string(), "2023-11-30 08:44:20");
    assert_eq!(rows[7].cycle, 2);
}

#[test]
fn test_background_measurements() {
    let readings = fixture_readings();
    let background =
        derive_measurements(&readings, SampleKind::Background, ElapsedUnit::Seconds).unwrap();

    let first = &background.rows()[0];
    assert_eq!(first.live_time, 100.0);
    assert!((first.counts - 139.95).abs() < 1e-9);
    assert!((first.counts_uncertainty - 11.8300).abs() < 1e-4);

    for row in background.rows() {
        assert_eq!(row.counts_uncertainty, row.counts.sqrt());
        assert!(row.counts_uncertainty >= 0.0);
    }

    let third = &background.rows()[2];
    assert_eq!(format_elapsed(third.elapsed), "1 days 04:01:56");
    assert_eq!(third.elapsed_in_unit, 100_916.0);
}

#[test]
fn test_net_is_sample_minus_background() {
    let readings = fixture_readings();
    let background =
        derive_measurements(&readings, SampleKind::Background, ElapsedUnit::Hours).unwrap();
    let sample = derive_measurements(&readings, SampleKind::Sample, ElapsedUnit::Hours).unwrap();
    let net = derive_net(&background, &sample, ElapsedUnit::Hours).unwrap();

    assert_eq!(net.len(), 4);
    for ((net_row, sample_row), background_row) in net
        .rows()
        .iter()
        .zip(sample.rows())
        .zip(background.rows())
    {
        assert_eq!(net_row.counts, sample_row.counts - background_row.counts);
        assert_eq!(
            net_row.count_rate,
            sample_row.reading.count_rate - background_row.reading.count_rate
        );
        assert_eq!(
            net_row.counts_uncertainty,
            (sample_row.counts + background_row.counts).sqrt()
        );
        assert_eq!(net_row.elapsed, sample_row.elapsed);
    }

    let compiled = compile(&background, &sample, &net).unwrap();
    let frame = compiled.to_dataframe().unwrap();
    assert_eq!(frame.height(), 4);
    assert!(frame.column("Net/Elapsed time (h)").is_ok());
}

#[test]
fn test_table_columns() {
    let readings = fixture_readings();
    let sample = derive_measurements(&readings, SampleKind::Sample, ElapsedUnit::Months).unwrap();

    let names = sample.column_names().unwrap();
    assert_eq!(names.len(), 14);
    assert_eq!(names[0], columns::CYCLE);
    assert_eq!(names[7], columns::END_TIME);
    assert_eq!(names[10], "Elapsed time (mo)");
    assert_eq!(names[13], columns::COUNTS_UNCERTAINTY_PCT);
}

#[test]
fn test_unequal_repetitions_rejected() {
    let header = ["Hidex 300 SL", "Serial number;300-0042", "Protocol;Lu-177", "Operator;lab"];
    let block = |sample: u32, repetition: u32, end_time: &str| {
        format!(
            "Sample start\nSamp.;{sample}\nRepe.;{repetition}\nCPM;90.0\nCounts;150\n\
             DTime;1.0\nTime;100\nEndTime;{end_time}\n"
        )
    };

    let three = format!(
        "{}\n{}{}{}",
        header.join("\n"),
        block(1, 1, "30/11/2023 08:44:20"),
        block(2, 1, "30/11/2023 08:47:44"),
        block(1, 2, "30/11/2023 08:51:04"),
    );
    let two = format!(
        "{}\n{}{}",
        header.join("\n"),
        block(1, 1, "01/12/2023 12:46:16"),
        block(2, 1, "01/12/2023 12:49:40"),
    );

    let mut blocks = parse_lines(three.lines(), 1).unwrap();
    blocks.extend(parse_lines(two.lines(), 2).unwrap());

    let err = build_readings(&blocks).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Consistency);
    assert!(
        err.to_string()
            .starts_with("Repetitions per cycle are not consistent for all measurements")
    );
}
