//! Integration tests for ingesting logs from disk
//!
//! Covers the dispatcher end to end:
//! - Float Control CSV and zipped CSV
//! - Floaty JSON
//! - VESC Tool CSV through its dedicated entry point
//! - Content sniffing when the extension says nothing
//! - Analysis of an ingested ride

use float_log_parser::{
    analyze, ingest_file, ingest_vesc_tool_file, travelled_segments, AnalysisConfig, DataSource,
    ParseError, Units,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const FLOAT_CONTROL_RIDE: &str = "Time(s),State,Speed(km/h),Distance(km),Duty%,Voltage,ADC1,ADC2,GPS-Lat,GPS-Long,GPS-Accuracy
0,startup,0,0,0%,60.1,0,0,0,0,0
1,riding,8.5,0.002,12%,60.0,3.1,3.2,45.5,-73.6,5
2,riding,15.2,0.006,25%,59.8,3.1,3.2,45.5001,-73.6001,5
3,wheelslip,22.0,0.012,60%,59.5,3.1,3.2,45.5002,-73.6002,5
";

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write test file");
    path
}

fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).expect("Failed to start zip entry");
        writer
            .write_all(contents.as_bytes())
            .expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

#[test]
fn test_ingest_float_control_csv_from_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_file(temp_dir.path(), "ride.csv", FLOAT_CONTROL_RIDE.as_bytes());

    let result = ingest_file(&path, false).expect("Reading the file should succeed");

    assert_eq!(result.source, DataSource::FloatControl);
    assert_eq!(result.units, Units::Metric);
    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    assert_eq!(result.rows.len(), 4);
    assert_eq!(result.rows[2].duty, 25.0);
    assert_eq!(result.rows[3].state, "wheelslip");
    assert_eq!(result.duration_seconds(), 3.0);
    assert!(result.has_gps_data());
}

#[test]
fn test_ingest_uppercase_extension() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_file(temp_dir.path(), "RIDE.CSV", FLOAT_CONTROL_RIDE.as_bytes());

    let result = ingest_file(&path, false).unwrap();
    assert_eq!(result.source, DataSource::FloatControl);
    assert_eq!(result.rows.len(), 4);
}

#[test]
fn test_ingest_zipped_float_control_csv() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let bytes = zip_bytes(&[("ride.csv", FLOAT_CONTROL_RIDE)]);
    let path = write_file(temp_dir.path(), "ride.zip", &bytes);

    let result = ingest_file(&path, false).unwrap();

    assert_eq!(result.source, DataSource::FloatControl);
    assert!(result.error.is_none());
    assert_eq!(result.rows.len(), 4);
}

#[test]
fn test_ingest_zip_with_two_entries_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let bytes = zip_bytes(&[("a.csv", FLOAT_CONTROL_RIDE), ("b.csv", FLOAT_CONTROL_RIDE)]);
    let path = write_file(temp_dir.path(), "rides.zip", &bytes);

    let result = ingest_file(&path, false).unwrap();

    assert_eq!(result.source, DataSource::None);
    assert!(result.rows.is_empty());
    assert!(matches!(result.error, Some(ParseError::ArchiveEntryCount(2))));
}

#[test]
fn test_ingest_floaty_json_from_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let document = serde_json::json!({
        "id": "ride-7", "name": "Evening loop", "boardId": "board-1",
        "startTime": 1000.0, "endTime": 3000.0, "stopReason": 0,
        "polyline": "", "distance": 1.1,
        "locations": [
            {"timestamp": 1000.0, "altitude": 10.0, "latitude": 51.5,
             "speed": 4.0, "longitude": -0.12, "accuracy": 3.0}
        ],
        "logs": [
            {"timestamp": 1000.0, "batteryVolts": 63.0, "speed": 10.0, "state": 1},
            {"timestamp": 2000.0, "batteryVolts": null, "speed": 12.0, "state": 3}
        ]
    });
    let path = write_file(
        temp_dir.path(),
        "ride.json",
        document.to_string().as_bytes(),
    );

    let result = ingest_file(&path, false).unwrap();

    assert_eq!(result.source, DataSource::Floaty);
    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[1].time, 1.0);
    assert_eq!(result.rows[1].voltage, 63.0);
    assert_eq!(result.rows[1].state, "wheelslip");
    assert_eq!(result.rows[1].gps_latitude, 51.5);
}

#[test]
fn test_ingest_sniffs_content_without_extension() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let csv_path = write_file(temp_dir.path(), "ride_log", FLOAT_CONTROL_RIDE.as_bytes());
    let result = ingest_file(&csv_path, false).unwrap();
    assert_eq!(result.source, DataSource::FloatControl);

    let zip_path = write_file(
        temp_dir.path(),
        "ride_archive",
        &zip_bytes(&[("ride.csv", FLOAT_CONTROL_RIDE)]),
    );
    let result = ingest_file(&zip_path, false).unwrap();
    assert_eq!(result.source, DataSource::FloatControl);
    assert_eq!(result.rows.len(), 4);
}

#[test]
fn test_ingest_unrecognised_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_file(temp_dir.path(), "notes.txt", b"just some notes\n");

    let result = ingest_file(&path, false).unwrap();

    assert_eq!(result.source, DataSource::None);
    assert!(result.rows.is_empty());
    assert!(matches!(result.error, Some(ParseError::Unrecognised(ref name)) if name == "notes.txt"));
}

#[test]
fn test_ingest_missing_file_is_an_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("does_not_exist.csv");

    let err = ingest_file(&path, false).unwrap_err();
    assert!(err.to_string().contains("Failed to read log file"));
}

#[test]
fn test_ingest_vesc_tool_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log = "time;voltage;duty;speed;gps_latitude;gps_longitude;altitude;gps_accuracy;\n\
               1000;80.0;0.10;2.0;0.0;0.0;0.0;0.0;\n\
               3000;79.5;0.35;5.0;51.5;-0.12;40.0;3.0;\n";
    let path = write_file(temp_dir.path(), "vesc.csv", log.as_bytes());

    let result = ingest_vesc_tool_file(&path, false).unwrap();

    assert_eq!(result.source, DataSource::VescTool);
    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[1].time, 2.0);
    assert_eq!(result.rows[1].duty, 35.0);
    assert_eq!(result.rows[1].speed, 18.0);
    assert_eq!(result.rows[0].state, "UNKNOWN");
}

#[test]
fn test_analyze_ingested_ride() {
    let ride = "Time(s),State,Speed(km/h),ADC1,ADC2,GPS-Lat,GPS-Long,GPS-Accuracy
0,riding,10,3,3,0,0,5
1,riding,10,3,3,45.5,-73.6,5
2,riding,10,0,0,45.6,-73.7,5
100,riding,10,3,3,45.7,-73.8,5
101,riding,0,3,3,45.8,-73.9,5
";
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_file(temp_dir.path(), "ride.csv", ride.as_bytes());
    let result = ingest_file(&path, false).unwrap();

    let config = AnalysisConfig::default();
    let analysis = analyze(&result, &config);

    assert_eq!(analysis.gaps.len(), 2);
    assert_eq!(analysis.segments.len(), 2);
    // The zero fix before the first real one is replaced
    assert_eq!(analysis.gps_points[0].latitude, 45.5);
    assert_eq!(analysis.gps_points[0].longitude, -73.6);
    assert!(analysis
        .points_of_interest
        .iter()
        .any(|poi| poi.index == 2 && poi.state == "no footpads at speed"));

    assert!(travelled_segments(&analysis, &config, 0).is_empty());
    let travelled = travelled_segments(&analysis, &config, 2);
    assert_eq!(travelled.len(), 1);
    assert_eq!(travelled[0].end, 2);
}
