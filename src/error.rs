use thiserror::Error;

/// Why a file could not be (fully) parsed
#[derive(Debug, Error)]
pub enum ParseError {
    /// Nothing about the name, MIME type or content matched a known format
    #[error("Unrecognised file: '{0}'")]
    Unrecognised(String),
    /// Float Control zips hold exactly one CSV
    #[error("Expected a zip containing a single CSV file from Float Control, found {0} entries")]
    ArchiveEntryCount(usize),
    /// The zip container itself is unreadable
    #[error("Failed to read zip archive: {0}")]
    Archive(#[source] zip::result::ZipError),
    /// The single zip entry could not be decompressed
    #[error("Failed to decompress zip entry: {0}")]
    ArchiveEntry(#[source] std::io::Error),
    /// The zip entry is larger than a ride log can plausibly be
    #[error("Zip entry of {size} bytes exceeds the {limit} byte limit")]
    ArchiveEntryTooLarge { size: u64, limit: u64 },
    /// Row-level defects, recovered locally and aggregated
    #[error("Failed to parse {format} properly ({} defects)", defects.len())]
    Rows {
        format: &'static str,
        defects: Vec<String>,
    },
    /// The CSV header line itself could not be read
    #[error("Failed to read {format} header: {cause}")]
    Header {
        format: &'static str,
        #[source]
        cause: csv::Error,
    },
    /// The Floaty document failed structural validation
    #[error("Failed to parse Floaty JSON: {0}")]
    Schema(#[source] serde_json::Error),
}

impl ParseError {
    /// Fatal errors leave no rows behind
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParseError::Rows { .. })
    }
}

/// Invalid analysis configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("{name} must be a positive number of seconds, got {value}")]
    NonPositiveThreshold { name: &'static str, value: f64 },
    #[error("charge threshold ({charge}s) must exceed the ride gap threshold ({ride}s)")]
    ChargeNotAboveRideGap { charge: f64, ride: f64 },
}
