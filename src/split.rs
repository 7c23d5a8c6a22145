//! Train/val/test/inference partitioning
//!
//! Splits are contiguous slices of the deduplicated video list. The tabular
//! path slices in first-encounter order; the folder path shuffles first with
//! a caller-seeded generator so repeated runs produce the same partition.

use crate::config::ConversionConfig;
use crate::types::round_half_even;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The four named video sets of a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSplit {
    pub train: Vec<String>,
    pub val: Vec<String>,
    pub test: Vec<String>,
    /// Every distinct video, independent of the other three
    pub inference: Vec<String>,
}

impl DatasetSplit {
    /// A split used only for batch inference
    pub fn inference_only(videos: Vec<String>) -> Self {
        Self {
            inference: dedup_first_occurrence(&videos),
            ..Default::default()
        }
    }
}

/// Remove duplicates, keeping the first occurrence of each name
pub fn dedup_first_occurrence(videos: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    videos
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}

/// `(train, val, test)` sizes for `n` distinct videos.
///
/// Train gets at least one video when `n > 0`; val shrinks if train plus val
/// would exceed `n`; test receives the remainder.
pub fn split_sizes(n: usize, train_fraction: f64, val_fraction: f64) -> (usize, usize, usize) {
    if n == 0 {
        return (0, 0, 0);
    }
    let n_train = (round_half_even(n as f64 * train_fraction) as usize).clamp(1, n);
    let mut n_val = round_half_even(n as f64 * val_fraction) as usize;
    if n_train + n_val > n {
        n_val = n - n_train;
    }
    (n_train, n_val, n - n_train - n_val)
}

/// Deterministic video partitioner
#[derive(Debug, Clone, PartialEq)]
pub struct SplitAssigner {
    train_fraction: f64,
    val_fraction: f64,
    shuffle_seed: Option<u64>,
}

impl SplitAssigner {
    /// Assigner that slices videos in the order given
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            train_fraction: config.train_fraction,
            val_fraction: config.val_fraction,
            shuffle_seed: None,
        }
    }

    /// Shuffle with a seeded generator before slicing
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Partition `videos` (any order, duplicates allowed)
    pub fn assign(&self, videos: &[String]) -> DatasetSplit {
        let inference = dedup_first_occurrence(videos);

        let mut ordered = inference.clone();
        if let Some(seed) = self.shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            ordered.shuffle(&mut rng);
        }

        let (n_train, n_val, _) = split_sizes(ordered.len(), self.train_fraction, self.val_fraction);
        let test = ordered.split_off(n_train + n_val);
        let val = ordered.split_off(n_train);

        DatasetSplit {
            train: ordered,
            val,
            test,
            inference,
        }
    }
}
