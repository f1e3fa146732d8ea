use crate::error::ParseError;
use crate::parser::float_control::parse_float_control_csv;
use crate::parser::floaty::parse_floaty_json;
use crate::parser::vesc_tool::parse_vesc_tool_csv;
use crate::types::*;
use crate::Result;
use anyhow::Context;
use std::io::{Cursor, Read};
use std::path::Path;

/// MIME types the dispatcher recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedMimeType {
    /// Float Control's CSV
    Csv,
    /// Float Control's zipped CSV
    Zip,
    ZipCompressed,
    /// Floaty's JSON
    Json,
}

impl SupportedMimeType {
    pub const ALL: [SupportedMimeType; 4] = [
        SupportedMimeType::Csv,
        SupportedMimeType::Zip,
        SupportedMimeType::ZipCompressed,
        SupportedMimeType::Json,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SupportedMimeType::Csv => "text/csv",
            SupportedMimeType::Zip => "application/zip",
            SupportedMimeType::ZipCompressed => "application/x-zip-compressed",
            SupportedMimeType::Json => "application/json",
        }
    }

    /// Comma-separated list, as used by file pickers
    pub fn accept_list() -> String {
        Self::ALL
            .iter()
            .map(|mime| mime.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Guess a MIME type from a file extension
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "csv" => SupportedMimeType::Csv,
        "zip" => SupportedMimeType::Zip,
        "json" => SupportedMimeType::Json,
        _ => return None,
    };
    Some(mime.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Detected {
    Zip,
    FloatControl,
    Floaty,
}

fn detect(bytes: &[u8], file_name: &str, mime_type: &str) -> Option<Detected> {
    let lower_name = file_name.to_lowercase();
    let has_mime = |mime: SupportedMimeType| mime_type == mime.as_str();

    if has_mime(SupportedMimeType::Zip)
        || has_mime(SupportedMimeType::ZipCompressed)
        || lower_name.ends_with(".zip")
        || bytes.starts_with(ZIP_SIGNATURE)
    {
        return Some(Detected::Zip);
    }
    if has_mime(SupportedMimeType::Csv) || lower_name.ends_with(".csv") {
        return Some(Detected::FloatControl);
    }
    if has_mime(SupportedMimeType::Json) || lower_name.ends_with(".json") {
        return Some(Detected::Floaty);
    }

    sniff_content(bytes)
}

/// Last resort when neither name nor MIME type decide
fn sniff_content(bytes: &[u8]) -> Option<Detected> {
    let first = bytes.iter().position(|b| !b.is_ascii_whitespace())?;
    let content = &bytes[first..];
    if content.starts_with(b"{") {
        return Some(Detected::Floaty);
    }

    let line_end = content
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(content.len());
    let first_line = String::from_utf8_lossy(&content[..line_end]);
    if first_line.contains("Time(s)") && first_line.contains(',') {
        return Some(Detected::FloatControl);
    }
    None
}

/// Largest decompressed log accepted from a zip
pub const MAX_ARCHIVE_ENTRY_BYTES: u64 = 512 * 1024 * 1024;

/// Extract the single CSV a Float Control zip is expected to hold.
///
/// The size declared in the archive is only used to reject an entry early;
/// the read itself stops after `max_bytes`.
fn unzip_single_entry(bytes: &[u8], max_bytes: u64) -> std::result::Result<Vec<u8>, ParseError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(ParseError::Archive)?;
    if archive.len() != 1 {
        return Err(ParseError::ArchiveEntryCount(archive.len()));
    }

    let mut entry = archive.by_index(0).map_err(ParseError::Archive)?;
    if entry.size() > max_bytes {
        return Err(ParseError::ArchiveEntryTooLarge {
            size: entry.size(),
            limit: max_bytes,
        });
    }

    let mut contents = Vec::new();
    entry
        .by_ref()
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut contents)
        .map_err(ParseError::ArchiveEntry)?;
    if contents.len() as u64 > max_bytes {
        return Err(ParseError::ArchiveEntryTooLarge {
            size: contents.len() as u64,
            limit: max_bytes,
        });
    }
    Ok(contents)
}

/// Ingest one uploaded file.
///
/// Picks an adapter from the MIME type, then the file name, then the content.
/// Never fails: every problem is reported through [`ParseResult::error`].
pub fn ingest(bytes: &[u8], file_name: &str, mime_type: &str) -> ParseResult {
    match detect(bytes, file_name, mime_type) {
        Some(Detected::Zip) => match unzip_single_entry(bytes, MAX_ARCHIVE_ENTRY_BYTES) {
            Ok(contents) => parse_float_control_csv(&String::from_utf8_lossy(&contents)),
            Err(err) => ParseResult::failed(DataSource::None, err),
        },
        Some(Detected::FloatControl) => parse_float_control_csv(&String::from_utf8_lossy(bytes)),
        Some(Detected::Floaty) => parse_floaty_json(&String::from_utf8_lossy(bytes)),
        None => ParseResult::failed(
            DataSource::None,
            ParseError::Unrecognised(file_name.to_string()),
        ),
    }
}

fn read_log_file(file_path: &Path, debug: bool) -> Result<Vec<u8>> {
    let bytes = std::fs::read(file_path)
        .with_context(|| format!("Failed to read log file: {:?}", file_path))?;

    if debug {
        println!("=== READING LOG FILE ===");
        println!(
            "File: {} ({} bytes, {:.2} MB)",
            file_path.display(),
            bytes.len(),
            bytes.len() as f64 / 1024.0 / 1024.0
        );
    }
    Ok(bytes)
}

/// Read a log from disk and ingest it, guessing the MIME type from the extension
pub fn ingest_file(file_path: &Path, debug: bool) -> Result<ParseResult> {
    let bytes = read_log_file(file_path, debug)?;
    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = mime_type_for_path(file_path).unwrap_or("");

    let result = ingest(&bytes, &file_name, mime_type);
    if debug {
        print_result_summary(&result);
    }
    Ok(result)
}

/// Read a VESC Tool log from disk; these are never auto-detected
pub fn ingest_vesc_tool_file(file_path: &Path, debug: bool) -> Result<ParseResult> {
    let bytes = read_log_file(file_path, debug)?;
    let result = parse_vesc_tool_csv(&String::from_utf8_lossy(&bytes));
    if debug {
        print_result_summary(&result);
    }
    Ok(result)
}

fn print_result_summary(result: &ParseResult) {
    println!("Source: {}", result.source);
    println!("Units: {}", result.units);
    println!("Rows: {}", result.rows.len());
    println!("Warnings: {}", result.warnings.len());
    if let Some(err) = &result.error {
        println!("Error: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const CSV: &str = "Time(s),State,Speed(km/h),Voltage\n0,riding,10,70\n1,riding,12,69.9\n";

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, contents) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn floaty_json() -> String {
        serde_json::json!({
            "id": "a", "name": "evening", "boardId": "b", "startTime": 0, "endTime": 1000,
            "stopReason": 0, "polyline": "", "distance": 0, "locations": [], "logs": []
        })
        .to_string()
    }

    #[test]
    fn test_csv_by_mime_and_name() {
        let by_mime = ingest(CSV.as_bytes(), "ride", "text/csv");
        assert_eq!(by_mime.source, DataSource::FloatControl);
        assert_eq!(by_mime.rows.len(), 2);

        let by_name = ingest(CSV.as_bytes(), "RIDE.CSV", "");
        assert_eq!(by_name.source, DataSource::FloatControl);
        assert!(by_name.error.is_none());
    }

    #[test]
    fn test_json_goes_to_floaty() {
        let result = ingest(floaty_json().as_bytes(), "ride.json", "");
        assert_eq!(result.source, DataSource::Floaty);
        assert!(result.error.is_none());

        let result = ingest(b"[]", "ride", "application/json");
        assert_eq!(result.source, DataSource::Floaty);
        assert!(matches!(result.error, Some(ParseError::Schema(_))));
    }

    #[test]
    fn test_zip_with_single_csv() {
        let bytes = zip_with(&[("ride.csv", CSV)]);
        for (name, mime) in [
            ("ride.zip", ""),
            ("ride", "application/zip"),
            ("ride", "application/x-zip-compressed"),
            ("ride", ""),
        ] {
            let result = ingest(&bytes, name, mime);
            assert_eq!(result.source, DataSource::FloatControl, "{name} {mime}");
            assert_eq!(result.rows.len(), 2);
            assert_eq!(result.units, Units::Metric);
        }
    }

    #[test]
    fn test_zip_with_two_entries_fails() {
        let bytes = zip_with(&[("a.csv", CSV), ("b.csv", CSV)]);
        let result = ingest(&bytes, "ride.zip", "application/zip");
        assert_eq!(result.source, DataSource::None);
        assert!(result.rows.is_empty());
        assert!(matches!(result.error, Some(ParseError::ArchiveEntryCount(2))));
    }

    #[test]
    fn test_corrupt_zip_fails() {
        let result = ingest(b"definitely not a zip", "ride.zip", "");
        assert_eq!(result.source, DataSource::None);
        assert!(matches!(result.error, Some(ParseError::Archive(_))));
    }

    /// Zip64 archive whose central directory claims `declared_size` bytes
    fn zip_declaring_size(declared_size: u64) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .large_file(true);
        writer.start_file("ride.csv", options).unwrap();
        writer.write_all(CSV.as_bytes()).unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        let central = bytes
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .expect("central directory header");
        let name_len = u16::from_le_bytes([bytes[central + 28], bytes[central + 29]]) as usize;
        let extra = central + 46 + name_len;
        assert_eq!(&bytes[extra..extra + 2], &[0x01, 0x00], "zip64 extra field");
        bytes[extra + 4..extra + 12].copy_from_slice(&declared_size.to_le_bytes());
        bytes
    }

    #[test]
    fn test_zip_declaring_huge_entry_is_rejected() {
        let bytes = zip_declaring_size(0x7fff_ffff_ffff_ffff);
        let result = ingest(&bytes, "ride.zip", "application/zip");

        assert_eq!(result.source, DataSource::None);
        assert!(result.rows.is_empty());
        assert!(matches!(
            result.error,
            Some(ParseError::ArchiveEntryTooLarge {
                size: 0x7fff_ffff_ffff_ffff,
                limit: MAX_ARCHIVE_ENTRY_BYTES
            })
        ));
    }

    #[test]
    fn test_zip_entry_read_stops_at_limit() {
        let bytes = zip_with(&[("ride.csv", CSV)]);

        let contents = unzip_single_entry(&bytes, CSV.len() as u64).unwrap();
        assert_eq!(contents, CSV.as_bytes());

        let err = unzip_single_entry(&bytes, 10).unwrap_err();
        assert!(matches!(err, ParseError::ArchiveEntryTooLarge { limit: 10, .. }));
    }

    #[test]
    fn test_zip_entry_with_understated_size_is_capped() {
        // Declared size passes the early check; the bounded read catches the rest
        let bytes = zip_declaring_size(4);
        let err = unzip_single_entry(&bytes, 10).unwrap_err();
        assert!(matches!(err, ParseError::ArchiveEntryTooLarge { size: 11, limit: 10 }));
    }

    #[test]
    fn test_content_sniffing() {
        assert_eq!(ingest(CSV.as_bytes(), "upload", "").source, DataSource::FloatControl);
        let json = format!("\n  {}", floaty_json());
        assert_eq!(ingest(json.as_bytes(), "upload", "").source, DataSource::Floaty);
    }

    #[test]
    fn test_unrecognised_file() {
        let result = ingest(b"hello world", "notes.txt", "text/plain");
        assert_eq!(result.source, DataSource::None);
        assert_eq!(result.units, Units::Metric);
        assert!(result.rows.is_empty());
        assert!(matches!(result.error, Some(ParseError::Unrecognised(ref name)) if name == "notes.txt"));
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let mut bytes = b"Time(s),State,Speed(km/h)\n0,riding,1\n1,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b",2\n");
        let result = ingest(&bytes, "ride.csv", "");
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].state, "\u{fffd}\u{fffd}");
    }

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(mime_type_for_path(Path::new("a/ride.CSV")), Some("text/csv"));
        assert_eq!(mime_type_for_path(Path::new("ride.zip")), Some("application/zip"));
        assert_eq!(mime_type_for_path(Path::new("ride.json")), Some("application/json"));
        assert_eq!(mime_type_for_path(Path::new("ride")), None);
        assert_eq!(
            SupportedMimeType::accept_list(),
            "text/csv,application/zip,application/x-zip-compressed,application/json"
        );
    }
}
