//! Helper functions shared by the log adapters
//!
//! Adapters only share two policies: "parse a float, record and default to 0
//! on failure" and "record an unknown header once". Both write into a
//! [`ParseWarnings`] accumulator owned by a single parse call.

use crate::error::ParseError;
use crate::types::{CanonicalRow, DataSource, ParseResult, ParseWarning, RowKey, Units, WarningKind};
use std::collections::HashSet;

/// Where a raw column ends up in the canonical row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTarget {
    /// A numeric canonical column
    Field(RowKey),
    /// The textual state column
    State,
    /// Known to the source, deliberately not carried
    Ignore,
}

/// Immutable raw-header dictionary of one source
pub type HeaderTable = &'static [(&'static str, HeaderTarget)];

/// Result of looking a raw header up in a [`HeaderTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMapping {
    Mapped(HeaderTarget),
    /// Unknown header, carried through under its raw name
    Passthrough(String),
}

/// Per-parse accumulator of recovered problems
#[derive(Debug, Default)]
pub struct ParseWarnings {
    seen: HashSet<(WarningKind, String)>,
    warnings: Vec<ParseWarning>,
}

impl ParseWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning
    pub fn push(&mut self, kind: WarningKind, message: String) {
        log::warn!("{message}");
        self.warnings.push(ParseWarning { kind, message });
    }

    /// Record a warning unless one with the same kind and key was recorded already
    pub fn push_once(&mut self, kind: WarningKind, key: &str, message: String) {
        if self.seen.insert((kind, key.to_string())) {
            self.push(kind, message);
        }
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn as_slice(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Messages of the warnings that count as row-level defects
    pub fn defect_messages(&self) -> Vec<String> {
        self.warnings
            .iter()
            .filter(|w| w.kind.is_defect())
            .map(|w| w.message.clone())
            .collect()
    }

    pub fn into_vec(self) -> Vec<ParseWarning> {
        self.warnings
    }
}

/// Parse a cell as a float, recording the literal cell and returning 0 on failure.
///
/// Non-finite spellings (`inf`, `NaN`) count as failures.
pub fn parse_float_value(value: &str, warnings: &mut ParseWarnings) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => parsed,
        _ => {
            warnings.push(
                WarningKind::InvalidNumber,
                format!("Failed to parse CSV! Expected a number, but got: '{value}'"),
            );
            0.0
        }
    }
}

/// Map a raw header through a source dictionary.
///
/// An unknown header is recorded once per parse and passed through unchanged.
/// Blank headers (trailing delimiters) are ignored silently.
pub fn map_header(table: HeaderTable, header: &str, warnings: &mut ParseWarnings) -> ColumnMapping {
    let trimmed = header.trim();
    if trimmed.is_empty() {
        return ColumnMapping::Mapped(HeaderTarget::Ignore);
    }

    if let Some((_, target)) = table.iter().find(|(raw, _)| *raw == trimmed) {
        return ColumnMapping::Mapped(*target);
    }

    warnings.push_once(
        WarningKind::UnknownHeader,
        trimmed,
        format!("Unknown header: '{trimmed}'"),
    );
    ColumnMapping::Passthrough(trimmed.to_string())
}

/// Rows read from a delimited text log, with the raw header line
#[derive(Debug)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CanonicalRow>,
}

/// Read a headered, delimited log into canonical rows.
///
/// Every mapped cell is handed to `apply` together with its target. Unknown
/// columns land in [`CanonicalRow::extra`]. A record with the wrong number of
/// fields is recorded and kept with the cells it has; one that cannot be read
/// at all is recorded and skipped. Row indices stay contiguous.
pub fn read_csv_rows<F>(
    input: &str,
    delimiter: u8,
    table: HeaderTable,
    format: &'static str,
    warnings: &mut ParseWarnings,
    mut apply: F,
) -> Result<CsvTable, ParseError>
where
    F: FnMut(&mut CanonicalRow, HeaderTarget, &str, &mut ParseWarnings),
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|cause| ParseError::Header { format, cause })?
        .iter()
        .map(str::to_string)
        .collect();
    let mapping: Vec<ColumnMapping> = headers
        .iter()
        .map(|header| map_header(table, header, warnings))
        .collect();

    let mut rows = Vec::new();
    for (record_number, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warnings.push(
                    WarningKind::MalformedRecord,
                    format!("Skipped malformed record {}: {err}", record_number + 1),
                );
                continue;
            }
        };

        if record.len() != headers.len() {
            warnings.push(
                WarningKind::MalformedRecord,
                format!(
                    "Record {} has {} fields, expected {}",
                    record_number + 1,
                    record.len(),
                    headers.len()
                ),
            );
        }

        let mut row = CanonicalRow::new(rows.len());
        for (column, cell) in mapping.iter().zip(record.iter()) {
            match column {
                ColumnMapping::Mapped(HeaderTarget::Ignore) => {}
                ColumnMapping::Mapped(target) => apply(&mut row, *target, cell, warnings),
                ColumnMapping::Passthrough(name) => {
                    row.extra.insert(name.clone(), cell.to_string());
                }
            }
        }
        rows.push(row);
    }

    Ok(CsvTable { headers, rows })
}

/// Wrap adapter output, turning recorded defects into a `Rows` error
pub fn build_result(
    source: DataSource,
    format: &'static str,
    rows: Vec<CanonicalRow>,
    units: Units,
    warnings: ParseWarnings,
) -> ParseResult {
    let defects = warnings.defect_messages();
    let error = if defects.is_empty() {
        None
    } else {
        Some(ParseError::Rows { format, defects })
    };

    ParseResult {
        source,
        rows,
        units,
        warnings: warnings.into_vec(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: HeaderTable = &[
        ("Voltage", HeaderTarget::Field(RowKey::Voltage)),
        ("State", HeaderTarget::State),
        ("Unused", HeaderTarget::Ignore),
    ];

    #[test]
    fn test_parse_float_value() {
        let mut warnings = ParseWarnings::new();
        assert_eq!(parse_float_value("76.0", &mut warnings), 76.0);
        assert_eq!(parse_float_value(" -0.1 ", &mut warnings), -0.1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_float_value_defaults_to_zero() {
        let mut warnings = ParseWarnings::new();
        assert_eq!(parse_float_value("I am not a number", &mut warnings), 0.0);
        assert_eq!(parse_float_value("", &mut warnings), 0.0);
        assert_eq!(parse_float_value("inf", &mut warnings), 0.0);
        assert_eq!(parse_float_value("NaN", &mut warnings), 0.0);
        assert_eq!(parse_float_value("-nan", &mut warnings), 0.0);

        assert_eq!(warnings.len(), 5);
        assert!(warnings.as_slice()[3].message.contains("'NaN'"));
        let first = &warnings.as_slice()[0];
        assert_eq!(first.kind, WarningKind::InvalidNumber);
        assert!(first.message.contains("I am not a number"));
    }

    #[test]
    fn test_map_header() {
        let mut warnings = ParseWarnings::new();
        assert_eq!(
            map_header(TABLE, "Voltage", &mut warnings),
            ColumnMapping::Mapped(HeaderTarget::Field(RowKey::Voltage))
        );
        assert_eq!(
            map_header(TABLE, " State ", &mut warnings),
            ColumnMapping::Mapped(HeaderTarget::State)
        );
        assert_eq!(
            map_header(TABLE, "", &mut warnings),
            ColumnMapping::Mapped(HeaderTarget::Ignore)
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unknown_header_warned_once() {
        let mut warnings = ParseWarnings::new();
        for _ in 0..3 {
            assert_eq!(
                map_header(TABLE, "Mystery", &mut warnings),
                ColumnMapping::Passthrough("Mystery".to_string())
            );
        }
        map_header(TABLE, "Other", &mut warnings);

        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings.defect_messages()[0], "Unknown header: 'Mystery'");
    }

    #[test]
    fn test_accumulators_are_independent() {
        let mut first = ParseWarnings::new();
        let mut second = ParseWarnings::new();
        map_header(TABLE, "Mystery", &mut first);
        map_header(TABLE, "Mystery", &mut second);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_read_csv_rows_keeps_short_records() {
        let input = "Voltage,State,Mystery\n76,RIDING,a\n75\n74,RIDING,b\n";
        let mut warnings = ParseWarnings::new();
        let table = read_csv_rows(input, b',', TABLE, "test", &mut warnings, |row, target, cell, w| {
            if let HeaderTarget::Field(key) = target {
                row.set(key, parse_float_value(cell, w));
            }
        })
        .unwrap();

        assert_eq!(table.headers, vec!["Voltage", "State", "Mystery"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1].index, 1);
        assert_eq!(table.rows[1].voltage, 75.0);
        assert!(table.rows[1].extra.is_empty());
        assert_eq!(table.rows[2].index, 2);
        assert_eq!(table.rows[2].voltage, 74.0);
        assert_eq!(table.rows[0].extra.get("Mystery").map(String::as_str), Some("a"));

        let kinds: Vec<_> = warnings.as_slice().iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::UnknownHeader, WarningKind::MalformedRecord]);
        assert_eq!(warnings.as_slice()[1].message, "Record 2 has 1 fields, expected 3");
    }

    #[test]
    fn test_build_result_only_defects_become_errors() {
        let mut warnings = ParseWarnings::new();
        warnings.push(WarningKind::UnknownState, "Unknown state: 'X'".to_string());
        let result = build_result(DataSource::FloatControl, "test", Vec::new(), Units::Metric, warnings);
        assert!(result.error.is_none());
        assert_eq!(result.warnings.len(), 1);

        let mut warnings = ParseWarnings::new();
        parse_float_value("x", &mut warnings);
        let result = build_result(DataSource::FloatControl, "test", Vec::new(), Units::Metric, warnings);
        assert!(matches!(result.error, Some(ParseError::Rows { .. })));
    }
}
