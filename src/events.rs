//! Event stream parsing
//!
//! Turns a detected table into an ordered stream of behavior events plus the
//! timing record of the video it annotates. Row order is preserved exactly:
//! interval reconstruction downstream replays events in file order.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::schema::{delimiter_for, parse_finite, parse_number, read_records};
use crate::schema::{DetectedSchema, ResolvedColumns, SchemaDetector, Table};
use crate::types::{round_half_even, BehaviorEvent, EventStatus, VideoRecord};
use log::{debug, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extension appended to media names that carry none
const DEFAULT_VIDEO_EXTENSION: &str = ".mp4";

/// Normalize a behavior name: trim, lowercase, whitespace runs become `_`
pub fn normalize_behavior_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// One parsed export file
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub source: PathBuf,
    pub schema: DetectedSchema,
    pub video: VideoRecord,
    pub events: Vec<BehaviorEvent>,
}

impl ParsedFile {
    /// Distinct normalized behavior names in this file.
    ///
    /// Every row with a non-empty behavior cell counts, even when its time
    /// cell is unusable.
    pub fn behavior_names(&self) -> BTreeSet<String> {
        collect_behavior_names(&self.schema.table, &self.schema.columns)
    }

    /// Whether any status column was resolved (otherwise every event is a point)
    pub fn has_status_column(&self) -> bool {
        self.schema.columns.status.is_some()
    }
}

/// Parser for tabular behavioral exports
#[derive(Debug, Clone)]
pub struct EventStreamParser {
    detector: SchemaDetector,
    default_fps: f64,
    max_frames: usize,
}

impl EventStreamParser {
    pub fn new(config: &ConversionConfig) -> Self {
        Self::with_detector(SchemaDetector::default(), config)
    }

    /// Use a custom detector (e.g. with additional strategies)
    pub fn with_detector(detector: SchemaDetector, config: &ConversionConfig) -> Self {
        Self {
            detector,
            default_fps: config.default_fps,
            max_frames: config.max_frames_per_video,
        }
    }

    /// Read and parse one export file
    pub fn parse_file(&self, path: &Path) -> Result<ParsedFile, ConvertError> {
        let records = read_records(path, delimiter_for(path))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut parsed = self.parse_records(&records, &stem);
        parsed.source = path.to_path_buf();
        Ok(parsed)
    }

    /// Parse already-read records; `fallback_stem` names the video when the
    /// export has no media column
    pub fn parse_records(&self, records: &[Vec<String>], fallback_stem: &str) -> ParsedFile {
        let schema = self.detector.detect(records);
        let video = video_record(
            &schema.table,
            &schema.columns,
            fallback_stem,
            self.default_fps,
            self.max_frames,
        );
        let events = parse_events(&schema.table, &schema.columns, &video.name);
        ParsedFile {
            source: PathBuf::from(fallback_stem),
            schema,
            video,
            events,
        }
    }
}

/// Convert table rows into events, in row order.
///
/// Rows with an unparseable time or an empty behavior are skipped. Without a
/// status column every event is a [`EventStatus::Point`].
pub fn parse_events(table: &Table, columns: &ResolvedColumns, video_ref: &str) -> Vec<BehaviorEvent> {
    let mut events = Vec::new();
    let mut skipped = 0usize;
    for row in &table.rows {
        let Some(timestamp_sec) = parse_finite(table.cell(row, columns.time)) else {
            skipped += 1;
            continue;
        };
        let behavior_raw = table.cell(row, columns.behavior).trim();
        if behavior_raw.is_empty() {
            continue;
        }
        let status = EventStatus::from_status_text(table.cell(row, columns.status));
        events.push(BehaviorEvent {
            video_ref: video_ref.to_string(),
            timestamp_sec,
            behavior_raw: behavior_raw.to_string(),
            behavior: normalize_behavior_name(behavior_raw),
            status,
        });
    }
    if skipped > 0 {
        debug!("{}: {} rows without a usable time skipped", video_ref, skipped);
    }
    events
}

/// Distinct normalized behavior names of a table
pub fn collect_behavior_names(table: &Table, columns: &ResolvedColumns) -> BTreeSet<String> {
    if columns.behavior.is_none() {
        return BTreeSet::new();
    }
    table
        .rows
        .iter()
        .map(|row| table.cell(row, columns.behavior).trim())
        .filter(|b| !b.is_empty())
        .map(normalize_behavior_name)
        .collect()
}

/// Build the video's timing record from the table.
///
/// A frame count that is not finite or exceeds `max_frames` is recomputed
/// from the last event time; if that fails too the video gets 0 frames.
pub fn video_record(
    table: &Table,
    columns: &ResolvedColumns,
    fallback_stem: &str,
    default_fps: f64,
    max_frames: usize,
) -> VideoRecord {
    let name = video_name(table, columns, fallback_stem);
    let (fps, duration) = fps_and_duration(table, columns, default_fps);
    let frame_count = frame_count_within(fps, duration, max_frames)
        .or_else(|| {
            let observed = max_event_time(table, columns);
            warn!(
                "{}: implausible length {} s at {} fps, using last event time {} s",
                name, duration, fps, observed
            );
            frame_count_within(fps, observed, max_frames)
        })
        .unwrap_or_else(|| {
            warn!("{}: no usable frame count, labels left empty", name);
            0
        });
    VideoRecord {
        name,
        fps,
        frame_count,
    }
}

/// `round(fps * duration)` when it is a finite count of at most `max_frames`
fn frame_count_within(fps: f64, duration: f64, max_frames: usize) -> Option<usize> {
    let frames = round_half_even(fps * duration);
    (frames.is_finite() && frames >= 0.0 && frames <= max_frames as f64).then_some(frames as usize)
}

/// Largest finite event time in the table, 0 when there is none
fn max_event_time(table: &Table, columns: &ResolvedColumns) -> f64 {
    table
        .rows
        .iter()
        .filter_map(|row| parse_finite(table.cell(row, columns.time)))
        .fold(0.0, f64::max)
}

/// Resolve fps and total duration (seconds).
///
/// The first parseable cell of each column wins. A missing, non-positive or
/// non-finite fps becomes `default_fps`; a missing duration becomes the
/// largest event time observed (0 when there is none).
pub fn fps_and_duration(table: &Table, columns: &ResolvedColumns, default_fps: f64) -> (f64, f64) {
    let first_value = |column: Option<usize>| {
        column.and_then(|_| {
            table
                .rows
                .iter()
                .find_map(|row| parse_number(table.cell(row, column)))
        })
    };

    let fps = first_value(columns.fps)
        .filter(|f| f.is_finite() && *f > 0.0)
        .unwrap_or(default_fps);

    let duration = first_value(columns.duration)
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or_else(|| max_event_time(table, columns));

    (fps, duration)
}

/// Derive the video file name.
///
/// A `Media file name` value takes precedence over a `Media file path` value;
/// either is reduced to its base name. Without any, the export's own stem is
/// used. Names without an extension get `.mp4`.
pub fn video_name(table: &Table, columns: &ResolvedColumns, fallback_stem: &str) -> String {
    let first_non_empty = |column: Option<usize>| {
        column.and_then(|_| {
            table
                .rows
                .iter()
                .map(|row| table.cell(row, column).trim())
                .find(|v| !v.is_empty())
        })
    };

    let media = first_non_empty(columns.media_name).or_else(|| first_non_empty(columns.media_path));

    let name = match media {
        Some(value) => base_name(value).to_string(),
        None => format!("{}{}", fallback_stem, DEFAULT_VIDEO_EXTENSION),
    };

    if name.contains('.') {
        name
    } else {
        format!("{}{}", name, DEFAULT_VIDEO_EXTENSION)
    }
}

/// Last path component, accepting both `/` and `\` separators
fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}
