//! Conversion configuration
//!
//! Every tunable that affects descriptor content lives here so callers (and
//! tests) can override it explicitly instead of relying on ambient defaults.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};

/// Frame rate assumed when an export carries no usable FPS column
pub const DEFAULT_FPS: f64 = 30.0;

/// Fraction of distinct videos assigned to the training split
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.70;

/// Fraction of distinct videos assigned to the validation split
pub const DEFAULT_VAL_FRACTION: f64 = 0.15;

/// Seed used for the folder-mode shuffle when the caller supplies none
pub const DEFAULT_SHUFFLE_SEED: u64 = 42;

/// File name the trainer looks for next to the annotation exports
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "feral_behavioral_labels.json";

/// Upper bound on the frames of one video; larger counts come from corrupt
/// duration or fps cells (about 19 days at 30 fps)
pub const DEFAULT_MAX_FRAMES_PER_VIDEO: usize = 50_000_000;

/// Video container extensions recognized during folder ingestion
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mts", "m2ts", "mp4", "mov", "m4v", "avi", "mkv", "wmv", "mpg", "mpeg", "mp2", "mpv", "3gp",
    "3g2", "webm",
];

/// Configuration for one conversion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Frame rate used when a file has no usable FPS value
    pub default_fps: f64,
    /// Training split fraction (0-1)
    pub train_fraction: f64,
    /// Validation split fraction (0-1); test receives the remainder
    pub val_fraction: f64,
    /// Seed for the folder-mode shuffle
    pub shuffle_seed: u64,
    /// Whether folder-mode videos are shuffled before splitting
    pub shuffle_folder_videos: bool,
    /// Recognized video extensions (lowercase, without the dot)
    pub video_extensions: Vec<String>,
    /// Descriptor file name used when no explicit output path is given
    pub output_file_name: String,
    /// ffprobe binary used by the default frame counter
    pub ffprobe_path: String,
    /// Frame counts above this are treated as unreadable
    pub max_frames_per_video: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_fps: DEFAULT_FPS,
            train_fraction: DEFAULT_TRAIN_FRACTION,
            val_fraction: DEFAULT_VAL_FRACTION,
            shuffle_seed: DEFAULT_SHUFFLE_SEED,
            shuffle_folder_videos: true,
            video_extensions: VIDEO_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            output_file_name: DEFAULT_OUTPUT_FILE_NAME.to_string(),
            ffprobe_path: "ffprobe".to_string(),
            max_frames_per_video: DEFAULT_MAX_FRAMES_PER_VIDEO,
        }
    }
}

impl ConversionConfig {
    /// Load a configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConvertError> {
        let config: ConversionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the numeric settings are usable
    pub fn validate(&self) -> Result<(), ConvertError> {
        if !self.default_fps.is_finite() || self.default_fps <= 0.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "default_fps must be positive, got {}",
                self.default_fps
            )));
        }
        for (name, value) in [
            ("train_fraction", self.train_fraction),
            ("val_fraction", self.val_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConvertError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.max_frames_per_video == 0 {
            return Err(ConvertError::InvalidConfig(
                "max_frames_per_video must be positive".to_string(),
            ));
        }
        if self.train_fraction + self.val_fraction > 1.0 + f64::EPSILON {
            return Err(ConvertError::InvalidConfig(format!(
                "train_fraction + val_fraction exceeds 1 ({} + {})",
                self.train_fraction, self.val_fraction
            )));
        }
        Ok(())
    }

    /// Whether a path's extension is one of the recognized video containers
    pub fn is_video_file(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.video_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
