//! Header detection and semantic column resolution
//!
//! Exports from different annotation tools (and different versions of the
//! same tool) name their columns differently and may carry several preamble
//! records before the header. Detection runs an ordered list of header
//! strategies over the records top-down; the first record any strategy
//! accepts is the header. When none qualifies, the positional fallback layout
//! is used.

use crate::schema::table::{fit_row, parse_number, Table};
use log::debug;
use serde::Serialize;

/// Column layout assumed when no header line is recognized
pub const FALLBACK_COLUMNS: [&str; 9] = [
    "Time",
    "Media file path",
    "Total length",
    "FPS",
    "Subject",
    "Behavior",
    "Behavioral category",
    "Comment",
    "Status",
];

/// Substrings that mark a column as a possible status column
const STATUS_NAME_HINTS: [&str; 4] = ["status", "comment", "event", "state"];

/// Semantically meaningful columns of a behavioral export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticColumn {
    Time,
    Behavior,
    Status,
    Fps,
    Duration,
    MediaPath,
    MediaName,
}

impl SemanticColumn {
    /// Header names looked up for this column, in priority order
    pub fn header_names(&self) -> &'static [&'static str] {
        match self {
            SemanticColumn::Time => &["Time"],
            SemanticColumn::Behavior => &["Behavior"],
            SemanticColumn::Status => &["Status"],
            SemanticColumn::Fps => &["FPS"],
            SemanticColumn::Duration => &["Total length", "Media duration"],
            SemanticColumn::MediaPath => &["Media file path"],
            SemanticColumn::MediaName => &["Media file name"],
        }
    }
}

/// A named way of recognizing a header line
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaStrategy {
    pub name: &'static str,
    /// Tokens that must all appear in the lowercased header line
    pub header_tokens: &'static [&'static str],
    /// Columns this export flavor is expected to carry; used for scoring
    pub expects: &'static [SemanticColumn],
}

impl SchemaStrategy {
    /// Aggregated event table (one row per event, with FPS per row)
    pub const AGGREGATED_EVENTS: SchemaStrategy = SchemaStrategy {
        name: "aggregated_events",
        header_tokens: &["time", "behavior", "fps"],
        expects: &[
            SemanticColumn::Time,
            SemanticColumn::Behavior,
            SemanticColumn::Fps,
            SemanticColumn::Duration,
            SemanticColumn::MediaPath,
        ],
    };

    /// Per-observation table keyed by media path with explicit status
    pub const MEDIA_STATUS: SchemaStrategy = SchemaStrategy {
        name: "media_status",
        header_tokens: &["time", "media file path", "status"],
        expects: &[
            SemanticColumn::Time,
            SemanticColumn::Behavior,
            SemanticColumn::Status,
            SemanticColumn::MediaPath,
        ],
    };

    /// Whether `joined` (lowercased header cells joined by spaces) qualifies
    fn accepts(&self, joined: &str) -> bool {
        self.header_tokens.iter().all(|t| joined.contains(t))
    }

    /// Number of expected columns the header can resolve
    fn score(&self, header: &[String]) -> usize {
        self.expects
            .iter()
            .filter(|col| resolve_column(header, **col).is_some())
            .count()
    }
}

/// How the table layout was determined
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaKind {
    /// A header line was recognized
    Header {
        strategy: &'static str,
        /// Zero-based index of the header among the non-blank records
        record: usize,
        score: usize,
    },
    /// No header found; fixed positional columns
    Positional,
}

/// Column indices resolved against a table header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedColumns {
    pub time: Option<usize>,
    pub behavior: Option<usize>,
    pub status: Option<usize>,
    pub fps: Option<usize>,
    pub duration: Option<usize>,
    pub media_path: Option<usize>,
    pub media_name: Option<usize>,
}

/// Result of running detection over one file
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedSchema {
    pub kind: SchemaKind,
    pub table: Table,
    pub columns: ResolvedColumns,
}

/// Detects the layout of a behavioral export
#[derive(Debug, Clone)]
pub struct SchemaDetector {
    strategies: Vec<SchemaStrategy>,
}

impl Default for SchemaDetector {
    fn default() -> Self {
        Self::new(vec![
            SchemaStrategy::AGGREGATED_EVENTS,
            SchemaStrategy::MEDIA_STATUS,
        ])
    }
}

impl SchemaDetector {
    /// Create a detector with strategies in priority order
    pub fn new(strategies: Vec<SchemaStrategy>) -> Self {
        Self { strategies }
    }

    /// Detect header, rows, and semantic columns of one file's records
    pub fn detect(&self, records: &[Vec<String>]) -> DetectedSchema {
        let (kind, table) = match self.find_header(records) {
            Some((kind, header_idx, header)) => {
                let width = header.len();
                let rows = records[header_idx + 1..]
                    .iter()
                    .map(|cells| fit_row(cells.clone(), width))
                    .collect();
                (kind, Table { header, rows })
            }
            None => (SchemaKind::Positional, positional_table(records)),
        };

        let columns = resolve_columns(&table);
        debug!("detected schema {:?} with columns {:?}", kind, columns);
        DetectedSchema {
            kind,
            table,
            columns,
        }
    }

    /// First record any strategy accepts, with the best-scoring strategy for it
    fn find_header(&self, records: &[Vec<String>]) -> Option<(SchemaKind, usize, Vec<String>)> {
        for (idx, cells) in records.iter().enumerate() {
            let header: Vec<String> = cells.iter().map(|s| s.trim().to_string()).collect();
            let joined = header
                .iter()
                .map(|s| s.to_lowercase())
                .collect::<Vec<_>>()
                .join(" ");

            let mut best: Option<(&SchemaStrategy, usize)> = None;
            for strategy in self.strategies.iter().filter(|s| s.accepts(&joined)) {
                let score = strategy.score(&header);
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((strategy, score));
                }
            }

            if let Some((strategy, score)) = best {
                let kind = SchemaKind::Header {
                    strategy: strategy.name,
                    record: idx,
                    score,
                };
                return Some((kind, idx, header));
            }
        }
        None
    }
}

/// Reinterpret every numeric-led record with the fixed fallback columns
fn positional_table(records: &[Vec<String>]) -> Table {
    let header: Vec<String> = FALLBACK_COLUMNS.iter().map(|s| s.to_string()).collect();
    let rows = records
        .iter()
        .filter(|cells| cells.first().and_then(|c| parse_number(c)).is_some())
        .map(|cells| fit_row(cells.clone(), FALLBACK_COLUMNS.len()))
        .collect();
    Table { header, rows }
}

/// Find a header column: exact case-insensitive match, else first substring match
pub fn find_column(header: &[String], name: &str) -> Option<usize> {
    let name = name.to_lowercase();
    header
        .iter()
        .position(|c| c.to_lowercase() == name)
        .or_else(|| header.iter().position(|c| c.to_lowercase().contains(&name)))
}

/// Resolve a semantic column by trying each of its header names in order
pub fn resolve_column(header: &[String], column: SemanticColumn) -> Option<usize> {
    column
        .header_names()
        .iter()
        .find_map(|name| find_column(header, name))
}

/// Resolve every semantic column of a table, including the status column
pub fn resolve_columns(table: &Table) -> ResolvedColumns {
    let header = &table.header;
    ResolvedColumns {
        time: resolve_column(header, SemanticColumn::Time),
        behavior: resolve_column(header, SemanticColumn::Behavior),
        status: detect_status_column(table),
        fps: resolve_column(header, SemanticColumn::Fps),
        duration: resolve_column(header, SemanticColumn::Duration),
        media_path: resolve_column(header, SemanticColumn::MediaPath),
        media_name: resolve_column(header, SemanticColumn::MediaName),
    }
}

/// Find the column that encodes START/STOP.
///
/// Columns whose name hints at a status are checked first; if none of them
/// carries a `start`/`stop` value, every column is checked in order.
pub fn detect_status_column(table: &Table) -> Option<usize> {
    if table.header.is_empty() || table.is_empty() {
        return None;
    }

    let has_status_values = |col: usize| {
        table.rows.iter().any(|row| {
            let value = table.cell(row, Some(col)).to_lowercase();
            value.contains("start") || value.contains("stop")
        })
    };

    let named = table.header.iter().enumerate().filter(|(_, name)| {
        let lower = name.to_lowercase();
        STATUS_NAME_HINTS.iter().any(|hint| lower.contains(hint))
    });

    named
        .map(|(idx, _)| idx)
        .find(|&idx| has_status_values(idx))
        .or_else(|| (0..table.header.len()).find(|&idx| has_status_values(idx)))
}
