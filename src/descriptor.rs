//! Dataset descriptor assembly and validation
//!
//! The descriptor is the only artifact that outlives a conversion run. Its
//! JSON layout is consumed by training, inference and review tooling:
//!
//! ```json
//! {
//!   "is_multilabel": false,
//!   "class_names": { "0": "other", "1": "rest" },
//!   "labels": { "cage1.mp4": [0, 0, 1, 1] },
//!   "splits": { "train": [], "val": [], "test": [], "inference": [] }
//! }
//! ```

use crate::error::ConvertError;
use crate::split::DatasetSplit;
use crate::vocabulary::{ClassVocabulary, OTHER_CLASS};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Dense labels of one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DenseLabels {
    /// One class ID per frame
    Single(Vec<u32>),
    /// One 0/1 flag per class per frame
    Multi(#[serde(with = "multi_hot")] Vec<Vec<bool>>),
}

impl DenseLabels {
    /// Number of frames
    pub fn len(&self) -> usize {
        match self {
            DenseLabels::Single(frames) => frames.len(),
            DenseLabels::Multi(frames) => frames.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Multilabel frames are written as 0/1 integers
mod multi_hot {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(
        frames: &Vec<Vec<bool>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let ints: Vec<Vec<u8>> = frames
            .iter()
            .map(|f| f.iter().map(|&b| u8::from(b)).collect())
            .collect();
        ints.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<bool>>, D::Error> {
        let ints = Vec::<Vec<u8>>::deserialize(deserializer)?;
        Ok(ints
            .into_iter()
            .map(|f| f.into_iter().map(|v| v != 0).collect())
            .collect())
    }
}

/// Canonical dataset descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDescriptor")]
pub struct DatasetDescriptor {
    pub is_multilabel: bool,
    /// Class ID → name; keys serialize as strings in numeric order
    pub class_names: BTreeMap<u32, String>,
    /// Video file name → dense labels
    pub labels: BTreeMap<String, DenseLabels>,
    pub splits: DatasetSplit,
}

/// Descriptor as written on disk. An empty label list carries no layout, so
/// `is_multilabel` decides which variant it becomes.
#[derive(Deserialize)]
struct RawDescriptor {
    is_multilabel: bool,
    class_names: BTreeMap<u32, String>,
    labels: BTreeMap<String, DenseLabels>,
    splits: DatasetSplit,
}

impl From<RawDescriptor> for DatasetDescriptor {
    fn from(raw: RawDescriptor) -> Self {
        let is_multilabel = raw.is_multilabel;
        let labels = raw
            .labels
            .into_iter()
            .map(|(video, labels)| match labels {
                DenseLabels::Single(frames) if is_multilabel && frames.is_empty() => {
                    (video, DenseLabels::Multi(Vec::new()))
                }
                other => (video, other),
            })
            .collect();
        Self {
            is_multilabel,
            class_names: raw.class_names,
            labels,
            splits: raw.splits,
        }
    }
}

impl DatasetDescriptor {
    /// Assemble a descriptor from its parts
    pub fn assemble(
        vocab: &ClassVocabulary,
        is_multilabel: bool,
        labels: BTreeMap<String, DenseLabels>,
        splits: DatasetSplit,
    ) -> Self {
        Self {
            is_multilabel,
            class_names: vocab.class_names(),
            labels,
            splits,
        }
    }

    /// Descriptor for inference-only runs over unlabeled videos
    pub fn inference_only(videos: Vec<String>) -> Self {
        Self {
            is_multilabel: false,
            class_names: BTreeMap::from([(0, OTHER_CLASS.to_string())]),
            labels: BTreeMap::new(),
            splits: DatasetSplit::inference_only(videos),
        }
    }

    /// Compact JSON, the encoding the trainer reads
    pub fn to_json(&self) -> Result<String, ConvertError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConvertError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConvertError> {
        serde_json::from_str(json)
            .map_err(|e| ConvertError::InvalidDescriptor(format!("Failed to parse descriptor: {}", e)))
    }

    /// Check structural invariants; returns every problem found
    pub fn validate(&self) -> Vec<DescriptorIssue> {
        let mut issues = Vec::new();
        let class_count = self.class_names.len();

        for (video, labels) in &self.labels {
            match labels {
                DenseLabels::Single(frames) => {
                    if self.is_multilabel && !frames.is_empty() {
                        issues.push(DescriptorIssue::new(video, "scalar labels in a multilabel dataset"));
                    }
                    if let Some(bad) = frames
                        .iter()
                        .find(|&&id| id != 0 && !self.class_names.contains_key(&id))
                    {
                        issues.push(DescriptorIssue::new(video, format!("unknown class id {}", bad)));
                    }
                }
                DenseLabels::Multi(frames) => {
                    if !self.is_multilabel {
                        issues.push(DescriptorIssue::new(video, "multilabel frames in a single-label dataset"));
                    }
                    if let Some(pos) = frames.iter().position(|f| f.len() != class_count) {
                        issues.push(DescriptorIssue::new(
                            video,
                            format!(
                                "frame {} has {} flags, expected {}",
                                pos,
                                frames[pos].len(),
                                class_count
                            ),
                        ));
                    }
                }
            }
        }

        let inference: HashSet<&str> = self.splits.inference.iter().map(|s| s.as_str()).collect();
        if inference.len() != self.splits.inference.len() {
            issues.push(DescriptorIssue::new("inference", "duplicate video names"));
        }

        let mut assigned: HashSet<&str> = HashSet::new();
        for (name, videos) in [
            ("train", &self.splits.train),
            ("val", &self.splits.val),
            ("test", &self.splits.test),
        ] {
            for video in videos {
                if !assigned.insert(video.as_str()) {
                    issues.push(DescriptorIssue::new(video, format!("appears in more than one split ({})", name)));
                }
                if !inference.contains(video.as_str()) {
                    issues.push(DescriptorIssue::new(video, format!("in {} but not in inference", name)));
                }
                if !self.labels.contains_key(video) {
                    issues.push(DescriptorIssue::new(video, format!("in {} but has no labels", name)));
                }
            }
        }

        issues
    }
}

/// One invariant violation found in a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorIssue {
    /// Video (or split) the problem belongs to
    pub subject: String,
    pub message: String,
}

impl DescriptorIssue {
    fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for DescriptorIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}
