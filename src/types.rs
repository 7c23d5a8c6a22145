//! Core data types shared across the conversion stages
//!
//! These are value objects produced and consumed within a single conversion
//! run; only the serialized descriptor outlives it.

use serde::{Deserialize, Serialize};

/// Interval role of a behavioral event, inferred from the status text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Opens an interval for the behavior
    Start,
    /// Closes the behavior's open interval
    Stop,
    /// Marks a single frame
    Point,
}

impl EventStatus {
    /// Classify free-form status text (`"START"`, `"state stop"`, ...).
    ///
    /// `START` takes precedence when both tokens appear.
    pub fn from_status_text(text: &str) -> Self {
        let upper = text.to_uppercase();
        if upper.contains("START") {
            EventStatus::Start
        } else if upper.contains("STOP") {
            EventStatus::Stop
        } else {
            EventStatus::Point
        }
    }
}

/// One timestamped behavior observation from a tabular export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorEvent {
    /// Video the event belongs to
    pub video_ref: String,
    /// Event time in seconds from the start of the video
    pub timestamp_sec: f64,
    /// Behavior name as written by the annotator (trimmed)
    pub behavior_raw: String,
    /// Normalized behavior name (see [`crate::events::normalize_behavior_name`])
    pub behavior: String,
    pub status: EventStatus,
}

/// Per-video timing information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Base file name including extension
    pub name: String,
    /// Frames per second (always > 0)
    pub fps: f64,
    /// Total frames, `round(fps * duration)`
    pub frame_count: usize,
}

/// Label layout of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// One class ID per frame, ID 0 reserved for "other"
    #[default]
    Single,
    /// One boolean per class per frame
    Multilabel,
}

impl LabelMode {
    pub fn is_multilabel(&self) -> bool {
        matches!(self, LabelMode::Multilabel)
    }
}

/// Round half to even, the rounding used for every frame and split count
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}
