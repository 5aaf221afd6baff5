//! Error handling integration tests

use super::{copy_fixtures, fixture_folder};
use crate::config::ProcessorConfig;
use crate::error::{ErrorKind, TdcrError};
use crate::models::{ElapsedUnit, ExportKind, MeasurementKind};
use crate::processor::{HidexProcessor, ProcessorState};
use std::fs;
use tempfile::TempDir;

fn processor() -> HidexProcessor {
    HidexProcessor::new(ProcessorConfig::new("Lu-177", 2023, 11)).unwrap()
}

#[test]
fn test_invalid_configuration() {
    let result = HidexProcessor::new(ProcessorConfig::new("Lu-177", 2023, 0));

    match result.unwrap_err() {
        TdcrError::Configuration { message } => assert!(message.contains("Month")),
        other => panic!("Expected Configuration error, got {other:?}"),
    }
}

#[test]
fn test_nonexistent_input_folder() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nonexistent");

    let mut processor = processor();
    match processor.parse_readings(&missing).unwrap_err() {
        TdcrError::InputNotFound { path } => assert_eq!(path, missing),
        other => panic!("Expected InputNotFound error, got {other:?}"),
    }
    assert_eq!(processor.state(), ProcessorState::Empty);
}

#[test]
fn test_empty_input_folder() {
    let temp_dir = TempDir::new().unwrap();

    let mut processor = processor();
    let err = processor.parse_readings(temp_dir.path()).unwrap_err();

    assert!(matches!(err, TdcrError::NoReadings));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_process_before_parse() {
    let mut processor = processor();

    let err = processor
        .process_readings(MeasurementKind::Background, ElapsedUnit::Seconds)
        .unwrap_err();

    match err {
        TdcrError::MissingPrerequisite { missing, remedy, .. } => {
            assert_eq!(missing, "readings");
            assert_eq!(remedy, "parse the readings");
        }
        other => panic!("Expected MissingPrerequisite error, got {other:?}"),
    }
}

#[test]
fn test_net_before_background_and_sample() {
    let mut processor = processor();
    processor.parse_readings(&fixture_folder()).unwrap();
    processor.process("background", "s").unwrap();

    let err = processor.process("net", "s").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert_eq!(
        err.to_string(),
        "No background and sample data to compute net measurements. \
         Please process the readings first."
    );
    assert!(processor.net().is_none());
}

#[test]
fn test_compile_before_net() {
    let mut processor = processor();
    processor.parse_readings(&fixture_folder()).unwrap();
    processor.process("background", "s").unwrap();
    processor.process("sample", "s").unwrap();

    let err = processor.compile_measurements().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn test_unknown_time_unit_keeps_tables() {
    let mut processor = processor();
    processor.parse_readings(&fixture_folder()).unwrap();
    processor
        .process_readings(MeasurementKind::All, ElapsedUnit::Minutes)
        .unwrap();
    let background = processor.background().unwrap().clone();

    let err = processor.process("background", "fortnight").unwrap_err();

    match &err {
        TdcrError::InvalidOption { value, .. } => assert_eq!(value, "fortnight"),
        other => panic!("Expected InvalidOption error, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(processor.background().unwrap(), &background);
    assert_eq!(processor.state(), ProcessorState::Compiled);
}

#[test]
fn test_unknown_measurement_kind() {
    let mut processor = processor();
    processor.parse_readings(&fixture_folder()).unwrap();

    let err = processor.process("foreground", "s").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(processor.state(), ProcessorState::Parsed);
}

#[test]
fn test_inconsistent_repetitions_keep_previous_readings() {
    let temp_dir = TempDir::new().unwrap();
    let input = copy_fixtures(&temp_dir);

    let mut processor = processor();
    processor.parse_readings(&input).unwrap();
    let previous = processor.readings().unwrap().clone();

    // A third repetition in one cycle only
    let mut content = fs::read_to_string(input.join("run_A.csv")).unwrap();
    content = content.replace(
        "End of report\n",
        "Sample start\nSamp.;1;\nRepe.;3;\nCPM;90.01;\nCounts;150;\nDTime;1.000;\n\
         Time;100;\nEndTime;01/12/2023 12:59:44;\nEnd of report\n",
    );
    fs::write(input.join("run_A.csv"), content).unwrap();

    let err = processor.parse_readings(&input).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Consistency);
    assert!(err.to_string().contains("not consistent"));
    assert_eq!(processor.readings().unwrap(), &previous);
}

#[test]
fn test_export_before_processing() {
    let temp_dir = TempDir::new().unwrap();
    let mut processor = processor();
    processor.parse_readings(&fixture_folder()).unwrap();

    assert!(
        processor
            .export_table(ExportKind::Readings, temp_dir.path())
            .is_ok()
    );

    let err = processor
        .export_table(ExportKind::All, temp_dir.path())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(!temp_dir.path().join("all.csv").exists());
}

#[test]
fn test_export_summary_before_parse() {
    let temp_dir = TempDir::new().unwrap();
    let processor = processor();

    let err = processor.export_summary(temp_dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn test_export_all_names_every_missing_table() {
    let temp_dir = TempDir::new().unwrap();
    let mut processor = processor();
    processor.parse_readings(&fixture_folder()).unwrap();
    processor.process("background", "s").unwrap();

    let err = processor
        .export_table(ExportKind::All, temp_dir.path())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "No background, sample and net data to compute the CSV export. \
         Please process the readings first."
    );
}

#[test]
fn test_plot_before_processing() {
    let temp_dir = TempDir::new().unwrap();
    let mut processor = processor();
    processor.parse_readings(&fixture_folder()).unwrap();

    let err = processor
        .export_plot(MeasurementKind::Net, temp_dir.path())
        .unwrap_err();
    match err {
        TdcrError::MissingPrerequisite { missing, .. } => assert_eq!(missing, "net"),
        other => panic!("Expected MissingPrerequisite error, got {other:?}"),
    }
    assert!(!temp_dir.path().join("net.png").exists());
}

#[test]
fn test_plot_of_all_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let mut processor = processor();
    processor.parse_readings(&fixture_folder()).unwrap();
    processor
        .process_readings(MeasurementKind::All, ElapsedUnit::Seconds)
        .unwrap();

    let err = processor
        .export_plot(MeasurementKind::All, temp_dir.path())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
