//! CLI binary for Float Log Parser
//!
//! This provides the command-line interface for the float log parser library.

use anyhow::Result;
use clap::{Arg, Command};
use float_log_parser::{
    analyze, export_ride, ingest_file, ingest_vesc_tool_file, AnalysisConfig, ExportOptions,
    ParseResult, RideAnalysis,
};
use glob::glob;
use std::path::{Path, PathBuf};

const RIDE_LOG_EXTENSIONS: [&str; 3] = ["csv", "zip", "json"];

fn build_command() -> Command {
    Command::new("Float Log Parser")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse Float Control, Floaty and VESC Tool ride logs and derive ride analytics.")
        .arg(
            Arg::new("files")
                .help("Ride logs to parse (.csv, .zip, .json extensions supported, case-insensitive, supports globbing)")
                .required(false)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output and detailed parsing information")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("vesc")
                .long("vesc")
                .help("Treat every input as a VESC Tool CSV log (';' separated)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON file with analysis settings (thresholds, hidden states/segments, battery specs)")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Export canonical rows to <name>.rows.csv")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("analysis")
                .long("analysis")
                .help("Export gaps, segments, points of interest and chart ticks to <name>.analysis.json")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for output files (default: same as input file)")
                .value_name("DIR"),
        )
}

/// Paths a single command-line argument stands for
fn paths_for_pattern(pattern: &str) -> std::result::Result<Vec<PathBuf>, String> {
    if !pattern.contains(['*', '?']) {
        return Ok(vec![PathBuf::from(pattern)]);
    }
    let entries = glob(pattern).map_err(|e| format!("Invalid glob pattern '{pattern}': {e}"))?;
    entries
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("Error expanding glob pattern '{pattern}': {e}"))
}

/// Ride logs are recognised by extension; `--vesc` narrows that to CSV
fn is_ride_log(path: &Path, vesc: bool) -> bool {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => true,
        Some(ext) => !vesc && RIDE_LOG_EXTENSIONS.contains(&ext),
        None => false,
    }
}

fn collect_ride_logs(patterns: &[&String], vesc: bool) -> Vec<PathBuf> {
    let mut logs = Vec::new();
    for pattern in patterns {
        let paths = match paths_for_pattern(pattern) {
            Ok(paths) => paths,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        log::debug!("'{pattern}' stands for {} path(s)", paths.len());

        for path in paths {
            if !path.exists() {
                eprintln!("Warning: File does not exist: {path:?}");
            } else if !is_ride_log(&path, vesc) {
                eprintln!("Warning: Skipping file that is not a ride log: {path:?}");
            } else {
                logs.push(path);
            }
        }
    }
    logs
}

fn print_summary(result: &ParseResult, analysis: &RideAnalysis) {
    println!("  Source:   {}", result.source);
    println!("  Units:    {}", result.units);
    println!(
        "  Rows:     {} ({:.0}s)",
        result.rows.len(),
        result.duration_seconds()
    );
    println!("  Warnings: {}", result.warnings.len());
    println!(
        "  Gaps: {}, segments: {}, points of interest: {}",
        analysis.gaps.len().saturating_sub(1),
        analysis.segments.len(),
        analysis.points_of_interest.len()
    );
    if !result.has_gps_data() {
        println!("  No GPS fixes in this ride");
    }
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();

    let debug = matches.get_flag("debug");
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if debug { "debug" } else { "warn" }),
    )
    .init();

    let vesc = matches.get_flag("vesc");
    let config = match matches.get_one::<String>("config") {
        Some(path) => AnalysisConfig::from_json_file(Path::new(path))?,
        None => AnalysisConfig::default(),
    };
    let export_options = ExportOptions {
        csv: matches.get_flag("csv"),
        analysis: matches.get_flag("analysis"),
        output_dir: matches.get_one::<String>("output-dir").cloned(),
        units: Some(config.units),
    };

    let file_patterns: Vec<&String> = match matches.get_many::<String>("files") {
        Some(files) => files.collect(),
        None => {
            build_command().print_help()?;
            println!();
            return Ok(());
        }
    };
    let ride_logs = collect_ride_logs(&file_patterns, vesc);
    if ride_logs.is_empty() {
        eprintln!("Error: No valid files found to process.");
        eprintln!("Supported extensions: .csv, .zip, .json (case-insensitive)");
        eprintln!("Input patterns were: {file_patterns:?}");
        std::process::exit(1);
    }

    let mut processed_files = 0;
    for (index, path) in ride_logs.iter().enumerate() {
        if index > 0 {
            println!();
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        println!("Processing: {filename}");

        let ingested = if vesc {
            ingest_vesc_tool_file(path, debug)
        } else {
            ingest_file(path, debug)
        };
        let result = match ingested {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error processing {filename}: {e:#}");
                eprintln!("Continuing with next file...");
                continue;
            }
        };

        if let Some(err) = &result.error {
            eprintln!("  {err}");
            if err.is_fatal() {
                eprintln!("Continuing with next file...");
                continue;
            }
        }

        let analysis = analyze(&result, &config);
        print_summary(&result, &analysis);

        match export_ride(&result, &analysis, path, &export_options, debug) {
            Ok(report) => {
                if let Some(csv_path) = report.csv_path {
                    println!("Exported rows to: {}", csv_path.display());
                }
                if let Some(analysis_path) = report.analysis_path {
                    println!("Exported analysis to: {}", analysis_path.display());
                }
            }
            Err(e) => {
                eprintln!("Error exporting {filename}: {e:#}");
                continue;
            }
        }

        processed_files += 1;
    }

    if processed_files == 0 {
        eprintln!(
            "Error: No files were successfully processed out of {} files found.",
            ride_logs.len()
        );
        eprintln!("This could be due to:");
        eprintln!("  - Files not being Float Control, Floaty or VESC Tool logs");
        eprintln!("  - A zip holding more than one file");
        eprintln!("  - Corrupted or empty files");
        eprintln!("Use --debug flag for more detailed error information.");
        std::process::exit(1);
    }

    Ok(())
}
