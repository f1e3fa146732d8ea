//! Export functionality for parsed rides
//!
//! Canonical rows go to CSV, the analytics bundle (gaps, segments, points of
//! interest and chart ticks) to JSON. Output files sit next to the input
//! unless an output directory is given.

use crate::conversion::convert_rows;
use crate::ticks::{ticks, TickOptions};
use crate::types::*;
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Export options for controlling output formats
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub csv: bool,
    pub analysis: bool,
    pub output_dir: Option<String>,
    /// Convert speed and distance before writing
    pub units: Option<Units>,
}

/// Paths of the files an export wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub csv_path: Option<PathBuf>,
    pub analysis_path: Option<PathBuf>,
}

/// Compute `(rows_csv, analysis_json)` output paths for an input file
pub fn compute_export_paths(input_path: &Path, export_options: &ExportOptions) -> (PathBuf, PathBuf) {
    let base_name = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("ride");

    let output_dir = match export_options.output_dir {
        Some(ref dir) => PathBuf::from(dir),
        None => input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    (
        output_dir.join(format!("{base_name}.rows.csv")),
        output_dir.join(format!("{base_name}.analysis.json")),
    )
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => v.to_string(),
        _ => String::new(),
    }
}

/// Write canonical rows as CSV.
///
/// Columns are `index`, every canonical column, `state`, then the raw
/// columns carried in `extra`. Unsupported values are left empty.
pub fn write_rows_csv<W: Write>(rows: &[CanonicalRow], writer: W) -> Result<()> {
    let extra_columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.extra.keys().map(String::as_str))
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["index"];
    header.extend(RowKey::ALL.iter().map(|key| key.name()));
    header.push("state");
    header.extend(extra_columns.iter().copied());
    csv_writer.write_record(&header)?;

    for row in rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.index.to_string());
        record.extend(RowKey::ALL.iter().map(|key| format_cell(row.get(*key))));
        record.push(row.state.clone());
        for column in &extra_columns {
            record.push(row.extra.get(*column).cloned().unwrap_or_default());
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Chart axis ticks for the series a ride dashboard plots
pub fn chart_ticks(rows: &[CanonicalRow]) -> BTreeMap<&'static str, Vec<f64>> {
    let series: [(&str, RowKey, TickOptions); 7] = [
        ("speed", RowKey::Speed, TickOptions { suggested_min: Some(0.0), ..TickOptions::default() }),
        ("duty", RowKey::Duty, TickOptions { min: Some(0.0), max: Some(100.0), ..TickOptions::default() }),
        ("voltage", RowKey::Voltage, TickOptions::default()),
        ("altitude", RowKey::Altitude, TickOptions::default()),
        ("current_motor", RowKey::CurrentMotor, TickOptions::default()),
        ("temp_motor", RowKey::TempMotor, TickOptions { suggested_min: Some(0.0), ..TickOptions::default() }),
        ("temp_mosfet", RowKey::TempMosfet, TickOptions { suggested_min: Some(0.0), ..TickOptions::default() }),
    ];

    series
        .iter()
        .map(|(name, key, options)| {
            let values: Vec<f64> = rows.iter().filter_map(|row| row.get(*key)).collect();
            (*name, ticks(&values, options))
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct AnalysisDocument<'a> {
    source: DataSource,
    units: Units,
    row_count: usize,
    duration_seconds: f64,
    error: Option<String>,
    warnings: &'a [ParseWarning],
    #[serde(flatten)]
    analysis: &'a RideAnalysis,
    ticks: BTreeMap<&'static str, Vec<f64>>,
}

/// Write the analytics bundle of a ride as pretty JSON.
///
/// `rows` and `units` are the rows as exported, so the ticks match the rows
/// CSV written alongside.
pub fn write_analysis_json<W: Write>(
    result: &ParseResult,
    rows: &[CanonicalRow],
    units: Units,
    analysis: &RideAnalysis,
    writer: W,
) -> Result<()> {
    let document = AnalysisDocument {
        source: result.source,
        units,
        row_count: rows.len(),
        duration_seconds: result.duration_seconds(),
        error: result.error.as_ref().map(ToString::to_string),
        warnings: &result.warnings,
        analysis,
        ticks: chart_ticks(rows),
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

fn create_output_file(path: &Path, debug: bool) -> Result<BufWriter<File>> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {dir:?}"))?;
            if debug {
                println!("Created output directory: {dir:?}");
            }
        }
    }
    let file = File::create(path).with_context(|| format!("Failed to create file: {path:?}"))?;
    Ok(BufWriter::new(file))
}

/// Export a parsed ride according to `export_options`
pub fn export_ride(
    result: &ParseResult,
    analysis: &RideAnalysis,
    input_path: &Path,
    export_options: &ExportOptions,
    debug: bool,
) -> Result<ExportReport> {
    let (csv_path, analysis_path) = compute_export_paths(input_path, export_options);
    let mut report = ExportReport::default();

    let units = export_options.units.unwrap_or(result.units);
    let rows: Cow<'_, [CanonicalRow]> = if units == result.units {
        Cow::Borrowed(result.rows.as_slice())
    } else {
        Cow::Owned(convert_rows(&result.rows, result.units, units))
    };

    if export_options.csv {
        let mut writer = create_output_file(&csv_path, debug)?;
        write_rows_csv(&rows, &mut writer)?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush rows CSV file: {csv_path:?}"))?;
        report.csv_path = Some(csv_path);
    }

    if export_options.analysis {
        let mut writer = create_output_file(&analysis_path, debug)?;
        write_analysis_json(result, &rows, units, analysis, &mut writer)?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush analysis file: {analysis_path:?}"))?;
        report.analysis_path = Some(analysis_path);
    }

    Ok(report)
}
