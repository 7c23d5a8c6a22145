//! ethoframe - Dense per-frame behavior labels for video classifiers
//!
//! ethoframe turns human behavioral annotations into the canonical dataset
//! descriptor consumed by training and inference tooling, through a
//! deterministic pipeline: schema detection → event parsing → class
//! vocabulary → dense label construction → dataset splitting → descriptor.
//!
//! ## Ingestion paths
//!
//! - **Tabular**: timestamped START/STOP/POINT events exported by annotation
//!   tools as CSV/TSV files
//! - **Folder**: clips organized into one directory per behavior class
//! - **Inference-only**: a directory of unlabeled videos

pub mod config;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod labels;
pub mod pipeline;
pub mod probe;
pub mod schema;
pub mod split;
pub mod types;
pub mod vocabulary;

pub use config::ConversionConfig;
pub use descriptor::{DatasetDescriptor, DenseLabels};
pub use error::ConvertError;
pub use pipeline::{
    folder_to_descriptor, inference_descriptor, tabular_to_descriptor, write_descriptor,
    Conversion,
};
pub use types::{BehaviorEvent, EventStatus, LabelMode, VideoRecord};
pub use vocabulary::ClassVocabulary;

/// ethoframe version
pub const ETHOFRAME_VERSION: &str = env!("CARGO_PKG_VERSION");
