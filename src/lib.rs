//! Float Log Parser Library
//!
//! A Rust library for ingesting ride logs of self-balancing electric boards
//! (Float Control CSV or zip, Floaty JSON, VESC Tool CSV) into one canonical
//! row model, and for deriving the analytics a ride dashboard needs.
//!
//! # Features
//!
//! - **`cli`** (default): Build the command-line interface binary
//!
//! # Quick Start
//!
//! Ingest a log file and analyse it:
//! ```rust,no_run
//! use float_log_parser::{analyze, ingest_file, AnalysisConfig};
//! use std::path::Path;
//!
//! let result = ingest_file(Path::new("ride.csv"), false).unwrap();
//! if let Some(err) = &result.error {
//!     eprintln!("{err}");
//! }
//! let analysis = analyze(&result, &AnalysisConfig::default());
//! println!("{} rows, {} segments", result.rows.len(), analysis.segments.len());
//! ```
//!
//! Ingest bytes that were uploaded rather than read from disk:
//! ```rust
//! use float_log_parser::{ingest, DataSource, Units};
//!
//! let csv = b"Time(s),State,Speed(km/h)\n0,riding,12\n";
//! let result = ingest(csv, "ride.csv", "text/csv");
//! assert_eq!(result.source, DataSource::FloatControl);
//! assert_eq!(result.units, Units::Metric);
//! assert_eq!(result.rows[0].speed, 12.0);
//! ```
//!
//! # Public API
//!
//! ## Ingestion
//! - [`ingest`] - Dispatch raw bytes to the right adapter
//! - [`ingest_file`] - Read a file and ingest it
//! - [`ingest_vesc_tool_file`] - Read a VESC Tool log
//! - [`parse_float_control_csv`], [`parse_floaty_json`], [`parse_vesc_tool_csv`] - Adapters
//!
//! ## Analytics
//! - [`analyze`] - Gaps, GPS correction, segments and points of interest
//! - [`travelled_segments`] - Segments up to a scrubbed-to row
//! - [`ticks`] - "Nice number" axis ticks
//!
//! ## Export
//! - [`export_ride`] - Write rows CSV and analysis JSON
//! - [`compute_export_paths`] - Helper for consistent path computation

// Module declarations
pub mod analysis;
pub mod config;
pub mod conversion;
pub mod error;
pub mod export;
pub mod parser;
pub mod ticks;
pub mod types;

// Re-export everything from modules for convenience
#[allow(ambiguous_glob_reexports)]
pub use analysis::*;
pub use config::*;
pub use conversion::*;
pub use error::*;
pub use export::*;
#[allow(ambiguous_glob_reexports)]
pub use parser::*;
pub use ticks::*;
pub use types::*;

// Re-export Result type for convenience
pub use anyhow::Result;
