//! Frame counting for folder ingestion
//!
//! Counting frames requires decoding container metadata, which is delegated
//! to ffprobe. The [`FrameCounter`] trait keeps the conversion logic
//! independent of that subprocess.

use crate::error::ConvertError;
use crate::types::round_half_even;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source of per-video frame counts
pub trait FrameCounter {
    /// Number of frames in the video; 0 means unreadable
    fn frame_count(&self, path: &Path) -> Result<u64, ConvertError>;
}

/// Frame counter backed by the `ffprobe` binary
#[derive(Debug, Clone)]
pub struct FfprobeFrameCounter {
    binary: PathBuf,
}

impl Default for FfprobeFrameCounter {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeFrameCounter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Whether the binary can be executed
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    streams: Option<Vec<FFprobeStream>>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    nb_frames: Option<String>,
    nb_read_packets: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

impl FrameCounter for FfprobeFrameCounter {
    fn frame_count(&self, path: &Path) -> Result<u64, ConvertError> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-count_packets",
                "-show_entries",
                "stream=nb_frames,nb_read_packets,r_frame_rate,duration",
                "-print_format",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(|e| ConvertError::ProbeError(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::ProbeError(format!(
                "ffprobe failed on {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        parse_probe_output(&output.stdout)
    }
}

/// Extract a frame count from ffprobe's JSON output.
///
/// Prefers the container's `nb_frames`, then the counted packets, then
/// `duration * frame rate`.
fn parse_probe_output(stdout: &[u8]) -> Result<u64, ConvertError> {
    let probe: FFprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ConvertError::ProbeError(format!("Failed to parse ffprobe output: {}", e)))?;

    let Some(stream) = probe.streams.and_then(|s| s.into_iter().next()) else {
        return Ok(0);
    };

    let positive = |value: Option<&str>| value.and_then(|v| v.parse::<u64>().ok()).filter(|&n| n > 0);

    if let Some(n) = positive(stream.nb_frames.as_deref()) {
        return Ok(n);
    }
    if let Some(n) = positive(stream.nb_read_packets.as_deref()) {
        return Ok(n);
    }

    let fps = parse_frame_rate(stream.r_frame_rate.as_deref());
    let duration = stream.duration.as_deref().and_then(|d| d.parse::<f64>().ok());
    match (fps, duration) {
        (Some(fps), Some(duration)) if duration.is_finite() && duration > 0.0 => {
            Ok(round_half_even(fps * duration) as u64)
        }
        _ => Ok(0),
    }
}

/// Parse frame rate string like "30000/1001" to f64
fn parse_frame_rate(rate: Option<&str>) -> Option<f64> {
    let rate = rate?;
    let fps = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den <= 0.0 {
                return None;
            }
            num / den
        }
        None => rate.parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

/// Fixed frame counts keyed by file name; unknown files count as unreadable
#[derive(Debug, Clone, Default)]
pub struct StaticFrameCounter {
    counts: HashMap<String, u64>,
}

impl StaticFrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load counts from a JSON object `{"clip.mp4": 900, ...}`
    pub fn from_json(json: &str) -> Result<Self, ConvertError> {
        Ok(Self {
            counts: serde_json::from_str(json)?,
        })
    }

    pub fn with(mut self, file_name: impl Into<String>, frames: u64) -> Self {
        self.counts.insert(file_name.into(), frames);
        self
    }
}

impl FrameCounter for StaticFrameCounter {
    fn frame_count(&self, path: &Path) -> Result<u64, ConvertError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.counts.get(&name).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_nb_frames() {
        let out = br#"{"streams":[{"nb_frames":"900","nb_read_packets":"901","r_frame_rate":"30/1","duration":"30.0"}]}"#;
        assert_eq!(parse_probe_output(out).unwrap(), 900);
    }

    #[test]
    fn test_falls_back_to_packets_then_duration() {
        let packets = br#"{"streams":[{"nb_frames":"N/A","nb_read_packets":"450"}]}"#;
        assert_eq!(parse_probe_output(packets).unwrap(), 450);

        let duration = br#"{"streams":[{"r_frame_rate":"30000/1001","duration":"10.01"}]}"#;
        assert_eq!(parse_probe_output(duration).unwrap(), 300);
    }

    #[test]
    fn test_no_video_stream_is_zero() {
        assert_eq!(parse_probe_output(br#"{"streams":[]}"#).unwrap(), 0);
        assert_eq!(parse_probe_output(br#"{}"#).unwrap(), 0);
        assert!(parse_probe_output(b"not json").is_err());
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate(Some("25/1")), Some(25.0));
        assert_eq!(parse_frame_rate(Some("30")), Some(30.0));
        assert_eq!(parse_frame_rate(Some("0/0")), None);
        assert_eq!(parse_frame_rate(None), None);
    }

    #[test]
    fn test_missing_binary_is_probe_error() {
        let counter = FfprobeFrameCounter::new("/nonexistent/ffprobe-binary");
        assert!(!counter.is_available());
        let err = counter.frame_count(Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, ConvertError::ProbeError(_)));
    }

    #[test]
    fn test_static_counter() {
        let counter = StaticFrameCounter::new().with("a.mp4", 12);
        assert_eq!(counter.frame_count(Path::new("x/a.mp4")).unwrap(), 12);
        assert_eq!(counter.frame_count(Path::new("x/b.mp4")).unwrap(), 0);

        let loaded = StaticFrameCounter::from_json(r#"{"b.mp4": 40}"#).unwrap();
        assert_eq!(loaded.frame_count(Path::new("y/b.mp4")).unwrap(), 40);
    }
}
