//! Raw delimited text handling
//!
//! Annotation exports are "CSV-like" at best: preamble lines before the
//! header, ragged rows, quoted cells, stray carriage returns. This module only
//! turns bytes into records of cells; deciding what the cells mean is the
//! detector's job.

use crate::error::ConvertError;
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header names plus rows padded or truncated to the header width
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Cell text for a row and optional column; missing cells read as empty
    pub fn cell<'a>(&'a self, row: &'a [String], column: Option<usize>) -> &'a str {
        column
            .and_then(|idx| row.get(idx))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Delimiter implied by a file's extension: comma for `.csv`, tab otherwise
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

/// Read every non-blank record of an export file
pub fn read_records(path: &Path, delimiter: u8) -> Result<Vec<Vec<String>>, ConvertError> {
    let bytes = fs::read(path)
        .map_err(|e| ConvertError::InputRead(format!("{}: {}", path.display(), e)))?;
    records_from_bytes(&bytes, delimiter)
        .map_err(|e| ConvertError::InputRead(format!("{}: {}", path.display(), e)))
}

/// Split raw bytes into records of cells (whitespace preserved).
///
/// Rows may have any number of cells and quoted cells are unquoted. Records
/// whose cells are all blank are dropped. A leading BOM is ignored and
/// invalid UTF-8 is replaced rather than rejected.
pub fn records_from_bytes(bytes: &[u8], delimiter: u8) -> Result<Vec<Vec<String>>, csv::Error> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut records = Vec::new();
    for record in reader.byte_records() {
        let cells: Vec<String> = record?
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).into_owned())
            .collect();
        if cells.iter().any(|c| !c.trim().is_empty()) {
            records.push(cells);
        }
    }
    Ok(records)
}

/// Pad with empty cells or truncate so the row has exactly `width` cells
pub fn fit_row(mut cells: Vec<String>, width: usize) -> Vec<String> {
    cells.resize(width, String::new());
    cells
}

/// Parse a numeric cell.
///
/// Multi-value cells (`"12.5;13.0"`) use the part before the first `;`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let head = cell.split(';').next().unwrap_or("");
    head.trim().parse::<f64>().ok()
}

/// Like [`parse_number`] but rejects NaN and infinities
pub fn parse_finite(cell: &str) -> Option<f64> {
    parse_number(cell).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_from_extension() {
        assert_eq!(delimiter_for(Path::new("a/b.csv")), b',');
        assert_eq!(delimiter_for(Path::new("a/b.CSV")), b',');
        assert_eq!(delimiter_for(Path::new("a/b.tsv")), b'\t');
        assert_eq!(delimiter_for(Path::new("a/b.txt")), b'\t');
        assert_eq!(delimiter_for(Path::new("a/b")), b'\t');
    }

    #[test]
    fn test_records_are_ragged_and_skip_blank_lines() {
        let records = records_from_bytes(b"Title\r\n\r\n  \t \n1.0\trest\tSTART\r\n2.0\n", b'\t').unwrap();
        assert_eq!(
            records,
            vec![vec!["Title"], vec!["1.0", "rest", "START"], vec!["2.0"]]
        );
    }

    #[test]
    fn test_quoted_cells_are_unquoted() {
        let text = "\"Time\",\"Behavior\",\"Comment\"\n\"1.0\",\"rest\",\"slow, then fast\"\n";
        let records = records_from_bytes(text.as_bytes(), b',').unwrap();
        assert_eq!(records[0], vec!["Time", "Behavior", "Comment"]);
        assert_eq!(records[1], vec!["1.0", "rest", "slow, then fast"]);
    }

    #[test]
    fn test_fit_row() {
        let cells = vec!["1.0".to_string(), "rest".to_string(), "START".to_string()];
        assert_eq!(fit_row(cells.clone(), 5), vec!["1.0", "rest", "START", "", ""]);
        assert_eq!(fit_row(cells, 2), vec!["1.0", "rest"]);
    }

    #[test]
    fn test_table_cell_and_is_empty() {
        let table = Table {
            header: vec!["Time".into(), "Behavior".into()],
            rows: vec![vec!["1".into()]],
        };
        assert!(!table.is_empty());
        assert_eq!(table.cell(&table.rows[0], Some(0)), "1");
        assert_eq!(table.cell(&table.rows[0], Some(1)), "");
        assert_eq!(table.cell(&table.rows[0], None), "");
        assert!(Table::default().is_empty());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 3.25 "), Some(3.25));
        assert_eq!(parse_number("29.97;30"), Some(29.97));
        assert_eq!(parse_number("NA"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_finite("inf"), None);
        assert_eq!(parse_finite("nan"), None);
        assert_eq!(parse_finite("-2"), Some(-2.0));
    }

    #[test]
    fn test_read_records_strips_bom_and_bad_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.tsv");
        let mut bytes = "\u{feff}Time\tBehavior\r\n".as_bytes().to_vec();
        bytes.extend_from_slice(&[0x31, 0xff, 0x0a]);
        fs::write(&path, bytes).unwrap();

        let records = read_records(&path, b'\t').unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], vec!["Time", "Behavior"]);
        assert!(records[1][0].starts_with('1'));
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let err = read_records(Path::new("/nonexistent/export.tsv"), b'\t').unwrap_err();
        assert!(matches!(err, ConvertError::InputRead(_)));
    }
}
