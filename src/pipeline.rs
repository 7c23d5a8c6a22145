//! Pipeline orchestration
//!
//! This module provides the public conversion entry points:
//!
//! - tabular: export files → schema detection → events → vocabulary →
//!   dense labels → splits → descriptor
//! - folder: class directories → vocabulary → uniform labels → seeded
//!   splits → descriptor
//! - inference-only: a video directory → descriptor with only an
//!   inference split

use crate::config::ConversionConfig;
use crate::descriptor::{DatasetDescriptor, DenseLabels};
use crate::error::ConvertError;
use crate::events::{EventStreamParser, ParsedFile};
use crate::labels::{uniform_labels, LabelSequenceBuilder};
use crate::probe::FrameCounter;
use crate::schema::SchemaKind;
use crate::split::SplitAssigner;
use crate::types::LabelMode;
use crate::vocabulary::ClassVocabulary;
use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Per-video outcome of a conversion run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSummary {
    pub name: String,
    /// Frame rate (0 when unknown, as for probed clips)
    pub fps: f64,
    pub frame_count: usize,
    /// Events read for this video (0 in folder mode)
    pub events: usize,
    /// START events left open at end of stream
    pub unmatched_starts: usize,
}

/// Descriptor plus what went into it
#[derive(Debug, Clone)]
pub struct Conversion {
    pub descriptor: DatasetDescriptor,
    pub videos: Vec<VideoSummary>,
}

/// Convert one export file, or every CSV/TSV file in a directory.
///
/// # Example
/// ```ignore
/// let conversion = tabular_to_descriptor(Path::new("exports/"), LabelMode::Single, &config)?;
/// write_descriptor(&conversion.descriptor, &default_output_path(input, &config), false)?;
/// ```
pub fn tabular_to_descriptor(
    input: &Path,
    mode: LabelMode,
    config: &ConversionConfig,
) -> Result<Conversion, ConvertError> {
    let files = discover_tabular_inputs(input)?;
    TabularConverter::new(config.clone(), mode).convert_files(&files)
}

/// Convert a directory of per-class clip folders
pub fn folder_to_descriptor<C: FrameCounter>(
    root: &Path,
    counter: &C,
    config: &ConversionConfig,
) -> Result<Conversion, ConvertError> {
    FolderConverter::new(config.clone(), counter).convert(root)
}

/// Build an inference-only descriptor listing the `.mp4` files in `video_dir`
pub fn inference_descriptor(video_dir: &Path) -> Result<DatasetDescriptor, ConvertError> {
    let mut videos: Vec<String> = list_dir(video_dir, false)?
        .into_iter()
        .filter(|p| has_extension(p, &["mp4"]))
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    videos.sort();
    info!("{} videos listed for inference", videos.len());
    Ok(DatasetDescriptor::inference_only(videos))
}

/// Write a descriptor as compact (default) or pretty JSON
pub fn write_descriptor(
    descriptor: &DatasetDescriptor,
    path: &Path,
    pretty: bool,
) -> Result<(), ConvertError> {
    let json = if pretty {
        descriptor.to_json_pretty()?
    } else {
        descriptor.to_json()?
    };
    fs::write(path, json)?;
    info!("Saved labels to {}", path.display());
    Ok(())
}

/// Export files for a tabular input: the file itself, or the directory's
/// `.csv`/`.tsv` files sorted by path
pub fn discover_tabular_inputs(input: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    if input.is_dir() {
        let mut files: Vec<PathBuf> = list_dir(input, false)?
            .into_iter()
            .filter(|p| p.is_file() && has_extension(p, &["csv", "tsv"]))
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(ConvertError::NoInputFiles(input.display().to_string()));
        }
        Ok(files)
    } else if input.is_file() {
        Ok(vec![input.to_path_buf()])
    } else {
        Err(ConvertError::InputRead(format!(
            "{} does not exist",
            input.display()
        )))
    }
}

/// Where the descriptor goes when no output path is given
pub fn default_output_path(input: &Path, config: &ConversionConfig) -> PathBuf {
    if input.is_dir() {
        input.join(&config.output_file_name)
    } else {
        input.with_file_name(&config.output_file_name)
    }
}

/// Stateless converter for tabular exports
#[derive(Debug, Clone)]
pub struct TabularConverter {
    config: ConversionConfig,
    mode: LabelMode,
    parser: EventStreamParser,
}

impl TabularConverter {
    pub fn new(config: ConversionConfig, mode: LabelMode) -> Self {
        let parser = EventStreamParser::new(&config);
        Self {
            config,
            mode,
            parser,
        }
    }

    /// Parse every file, then build vocabulary, labels and splits.
    ///
    /// Fails with [`ConvertError::NoBehaviors`] when no file yields a
    /// behavior name.
    pub fn convert_files(&self, files: &[PathBuf]) -> Result<Conversion, ConvertError> {
        if files.is_empty() {
            return Err(ConvertError::NoInputFiles("input list".to_string()));
        }

        let parsed = files
            .iter()
            .map(|f| self.parser.parse_file(f))
            .collect::<Result<Vec<_>, _>>()?;
        self.convert_parsed(&parsed)
    }

    /// Conversion over already-parsed files (file order matters only for splits)
    pub fn convert_parsed(&self, parsed: &[ParsedFile]) -> Result<Conversion, ConvertError> {
        let behaviors: BTreeSet<String> = parsed.iter().flat_map(|p| p.behavior_names()).collect();
        if behaviors.is_empty() {
            return Err(ConvertError::NoBehaviors(parsed.len()));
        }

        let vocab = match self.mode {
            LabelMode::Single => ClassVocabulary::single_label(behaviors),
            LabelMode::Multilabel => ClassVocabulary::multilabel(behaviors),
        };
        info!(
            "{} behaviors in vocabulary ({:?})",
            vocab.behavior_count(),
            self.mode
        );

        let builder = LabelSequenceBuilder::new(&vocab);
        let mut labels = BTreeMap::new();
        let mut order = Vec::with_capacity(parsed.len());
        let mut videos = Vec::with_capacity(parsed.len());

        for file in parsed {
            if file.schema.kind == SchemaKind::Positional {
                warn!(
                    "{}: no header recognized, using positional columns",
                    file.source.display()
                );
            }

            let video = &file.video;
            let (dense, unmatched) = match self.mode {
                LabelMode::Single => {
                    let out = builder.single(&file.events, video);
                    (DenseLabels::Single(out.labels), out.unmatched.len())
                }
                LabelMode::Multilabel => {
                    let out = builder.multilabel(&file.events, video);
                    (DenseLabels::Multi(out.labels), out.unmatched.len())
                }
            };

            info!("{} | frames={}", video.name, video.frame_count);
            if labels.insert(video.name.clone(), dense).is_some() {
                warn!("{}: labels replaced by {}", video.name, file.source.display());
            }
            order.push(video.name.clone());
            videos.push(VideoSummary {
                name: video.name.clone(),
                fps: video.fps,
                frame_count: video.frame_count,
                events: file.events.len(),
                unmatched_starts: unmatched,
            });
        }

        let splits = SplitAssigner::new(&self.config).assign(&order);
        let descriptor =
            DatasetDescriptor::assemble(&vocab, self.mode.is_multilabel(), labels, splits);
        Ok(Conversion { descriptor, videos })
    }
}

/// Converter for per-class clip folders
pub struct FolderConverter<'a, C: FrameCounter> {
    config: ConversionConfig,
    counter: &'a C,
}

impl<'a, C: FrameCounter> FolderConverter<'a, C> {
    pub fn new(config: ConversionConfig, counter: &'a C) -> Self {
        Self { config, counter }
    }

    /// Every readable clip in `root/<class>/` is labeled with its class on
    /// every frame; unreadable or empty clips are skipped.
    pub fn convert(&self, root: &Path) -> Result<Conversion, ConvertError> {
        if !root.is_dir() {
            return Err(ConvertError::NoClassDirectories(root.display().to_string()));
        }

        let classes: Vec<String> = list_dir(root, true)?
            .into_iter()
            .filter(|p| p.is_dir())
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .filter(|name| !name.starts_with('.'))
            .collect();
        if classes.is_empty() {
            return Err(ConvertError::NoClassDirectories(root.display().to_string()));
        }

        let vocab = ClassVocabulary::from_folders(classes);
        info!("Found {} behaviors", vocab.behavior_count());

        let mut labels = BTreeMap::new();
        let mut order = Vec::new();
        let mut videos = Vec::new();

        for (&class_id, class_name) in &vocab.class_names() {
            let mut clips: Vec<PathBuf> = list_dir(&root.join(class_name), true)?
                .into_iter()
                .filter(|p| p.is_file() && self.config.is_video_file(p))
                .collect();
            clips.sort();
            info!("Processing '{}': {} videos", class_name, clips.len());

            for clip in clips {
                let file_name = clip
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let frames = match self.counter.frame_count(&clip) {
                    Ok(0) => {
                        warn!("Skipping empty/unreadable video: {}", clip.display());
                        continue;
                    }
                    Ok(n) if n > self.config.max_frames_per_video as u64 => {
                        warn!("Skipping video with implausible frame count {}: {}", n, clip.display());
                        continue;
                    }
                    Ok(n) => n as usize,
                    Err(e) => {
                        warn!("Skipping unreadable video {}: {}", clip.display(), e);
                        continue;
                    }
                };

                let key = format!("{}/{}", class_name, file_name);
                labels.insert(key.clone(), DenseLabels::Single(uniform_labels(class_id, frames)));
                order.push(key.clone());
                videos.push(VideoSummary {
                    name: key,
                    fps: 0.0,
                    frame_count: frames,
                    events: 0,
                    unmatched_starts: 0,
                });
            }
        }

        if order.is_empty() {
            return Err(ConvertError::NoValidVideos(root.display().to_string()));
        }

        let mut assigner = SplitAssigner::new(&self.config);
        if self.config.shuffle_folder_videos {
            assigner = assigner.with_shuffle(self.config.shuffle_seed);
        }
        let splits = assigner.assign(&order);
        info!(
            "Videos per split: train={}, val={}, test={}",
            splits.train.len(),
            splits.val.len(),
            splits.test.len()
        );

        let descriptor = DatasetDescriptor::assemble(&vocab, false, labels, splits);
        Ok(Conversion { descriptor, videos })
    }
}

/// Immediate children of a directory
fn list_dir(dir: &Path, follow_links: bool) -> Result<Vec<PathBuf>, ConvertError> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(follow_links)
        .into_iter()
        .map(|entry| {
            entry
                .map(|e| e.into_path())
                .map_err(|e| ConvertError::InputRead(e.to_string()))
        })
        .collect()
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::StaticFrameCounter;
    use pretty_assertions::assert_eq;
    use std::fs;

    const HEADER: &str = "Time\tMedia file path\tTotal length\tFPS\tSubject\tBehavior\tStatus";

    fn write_export(dir: &Path, file: &str, media: &str, rows: &[(f64, &str, &str)]) -> PathBuf {
        let mut text = format!("Observation id\tobs\n\n{}\n", HEADER);
        for (t, behavior, status) in rows {
            text.push_str(&format!("{}\t{}\t4\t2\t\t{}\t{}\n", t, media, behavior, status));
        }
        let path = dir.join(file);
        fs::write(&path, text).unwrap();
        path
    }

    fn single_labels(descriptor: &DatasetDescriptor, video: &str) -> Vec<u32> {
        match &descriptor.labels[video] {
            DenseLabels::Single(frames) => frames.clone(),
            DenseLabels::Multi(_) => panic!("expected single-label frames"),
        }
    }

    #[test]
    fn test_scenario_single_file_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(
            dir.path(),
            "cage1.tsv",
            "/videos/cage1.mp4",
            &[(1.0, "rest", "START"), (3.0, "rest", "STOP")],
        );

        let conversion =
            tabular_to_descriptor(&path, LabelMode::Single, &ConversionConfig::default()).unwrap();
        let descriptor = &conversion.descriptor;

        assert!(!descriptor.is_multilabel);
        assert_eq!(descriptor.class_names[&0], "other");
        assert_eq!(descriptor.class_names[&1], "rest");
        assert_eq!(single_labels(descriptor, "cage1.mp4"), vec![0, 0, 1, 1, 1, 1, 1, 0]);
        assert_eq!(descriptor.splits.train, vec!["cage1.mp4"]);
        assert_eq!(descriptor.splits.inference, vec!["cage1.mp4"]);
        assert_eq!(conversion.videos[0].frame_count, 8);
        assert!(descriptor.validate().is_empty());
    }

    #[test]
    fn test_directory_vocabulary_spans_all_files() {
        let dir = tempfile::tempdir().unwrap();
        write_export(dir.path(), "b.tsv", "b.mp4", &[(0.5, "Walk", "POINT")]);
        write_export(
            dir.path(),
            "a.tsv",
            "a.mp4",
            &[(0.0, "Sniff", "START"), (1.0, "Sniff", "STOP")],
        );
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let conversion =
            tabular_to_descriptor(dir.path(), LabelMode::Single, &ConversionConfig::default())
                .unwrap();
        let names: Vec<&str> = conversion
            .descriptor
            .class_names
            .values()
            .map(|s| s.as_str())
            .collect();
        assert_eq!(names, vec!["other", "sniff", "walk"]);
        // files are processed sorted by path, so a.mp4 is first
        assert_eq!(conversion.descriptor.splits.inference, vec!["a.mp4", "b.mp4"]);
    }

    #[test]
    fn test_file_order_does_not_change_vocabulary_or_labels() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_export(dir.path(), "a.tsv", "a.mp4", &[(1.0, "zeta", "POINT")]);
        let b = write_export(
            dir.path(),
            "b.tsv",
            "b.mp4",
            &[(0.0, "alpha", "START"), (2.0, "alpha", "STOP")],
        );
        let converter = TabularConverter::new(ConversionConfig::default(), LabelMode::Single);

        let forward = converter.convert_files(&[a.clone(), b.clone()]).unwrap();
        let backward = converter.convert_files(&[b, a]).unwrap();
        assert_eq!(forward.descriptor.class_names, backward.descriptor.class_names);
        assert_eq!(forward.descriptor.labels, backward.descriptor.labels);
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write_export(
                dir.path(),
                &format!("obs{}.tsv", i),
                &format!("v{}.mp4", i),
                &[(0.5, "rest", "START"), (2.5, "rest", "STOP"), (3.0, "eat", "POINT")],
            );
        }
        let config = ConversionConfig::default();
        let first = tabular_to_descriptor(dir.path(), LabelMode::Multilabel, &config).unwrap();
        let second = tabular_to_descriptor(dir.path(), LabelMode::Multilabel, &config).unwrap();
        assert_eq!(
            first.descriptor.to_json().unwrap(),
            second.descriptor.to_json().unwrap()
        );
        assert_eq!(first.descriptor.splits.train.len(), 4);
        assert_eq!(first.descriptor.splits.val.len(), 1);
        assert!(first.descriptor.validate().is_empty());
    }

    #[test]
    fn test_multilabel_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(
            dir.path(),
            "m.tsv",
            "m.mp4",
            &[
                (1.0, "groom", "START"),
                (1.5, "vocalize", "START"),
                (2.5, "groom", "STOP"),
                (3.5, "vocalize", "STOP"),
            ],
        );
        let conversion =
            tabular_to_descriptor(&path, LabelMode::Multilabel, &ConversionConfig::default())
                .unwrap();
        let descriptor = &conversion.descriptor;
        assert!(descriptor.is_multilabel);
        let DenseLabels::Multi(frames) = &descriptor.labels["m.mp4"] else {
            panic!("expected multilabel frames");
        };
        let rows: Vec<Vec<bool>> = frames.clone();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[2], vec![true, false]);
        assert_eq!(rows[4], vec![true, true]);
        assert_eq!(rows[5], vec![true, true]);
        assert_eq!(rows[6], vec![false, true]);
        assert_eq!(rows[7], vec![false, true]);
        assert_eq!(rows[0], vec![false, false]);
    }

    #[test]
    fn test_unmatched_start_reported_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(
            dir.path(),
            "d.tsv",
            "d.mp4",
            &[(0.5, "dig", "START"), (2.0, "rest", "POINT")],
        );
        let conversion =
            tabular_to_descriptor(&path, LabelMode::Single, &ConversionConfig::default()).unwrap();
        let dig = conversion
            .descriptor
            .class_names
            .iter()
            .find(|(_, name)| name.as_str() == "dig")
            .map(|(id, _)| *id)
            .unwrap();
        assert!(single_labels(&conversion.descriptor, "d.mp4")
            .iter()
            .all(|&c| c != dig));
        assert_eq!(conversion.videos[0].unmatched_starts, 1);
    }

    #[test]
    fn test_no_behaviors_aborts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.csv"), "Time,Behavior,FPS\n").unwrap();
        let err = tabular_to_descriptor(dir.path(), LabelMode::Single, &ConversionConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::NoBehaviors(1)));
    }

    #[test]
    fn test_missing_inputs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover_tabular_inputs(dir.path()),
            Err(ConvertError::NoInputFiles(_))
        ));
        assert!(matches!(
            discover_tabular_inputs(&dir.path().join("missing.tsv")),
            Err(ConvertError::InputRead(_))
        ));
    }

    #[test]
    fn test_discovery_skips_directories_named_like_exports() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("archive.csv")).unwrap();
        let export = write_export(dir.path(), "a.tsv", "a.mp4", &[(0.5, "rest", "POINT")]);

        assert_eq!(discover_tabular_inputs(dir.path()).unwrap(), vec![export]);
        let conversion =
            tabular_to_descriptor(dir.path(), LabelMode::Single, &ConversionConfig::default())
                .unwrap();
        assert_eq!(conversion.descriptor.splits.inference, vec!["a.mp4"]);
    }

    #[test]
    fn test_corrupt_length_does_not_abort_run() {
        let dir = tempfile::tempdir().unwrap();
        write_export(dir.path(), "good.tsv", "good.mp4", &[(1.0, "rest", "POINT")]);
        fs::write(
            dir.path().join("bad.tsv"),
            "Time\tMedia file path\tTotal length\tFPS\tBehavior\tStatus\n\
             1.0\tbad.mp4\t1e300\t2\trest\tSTART\n\
             3.0\tbad.mp4\t1e300\t2\trest\tSTOP\n",
        )
        .unwrap();

        let conversion =
            tabular_to_descriptor(dir.path(), LabelMode::Single, &ConversionConfig::default())
                .unwrap();
        let descriptor = &conversion.descriptor;
        assert_eq!(single_labels(descriptor, "bad.mp4"), vec![0, 0, 1, 1, 1, 1]);
        assert_eq!(single_labels(descriptor, "good.mp4").len(), 8);
        assert!(descriptor.validate().is_empty());
    }

    #[test]
    fn test_default_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_export(dir.path(), "x.tsv", "x.mp4", &[(0.0, "a", "POINT")]);
        let config = ConversionConfig::default();
        assert_eq!(
            default_output_path(dir.path(), &config),
            dir.path().join("feral_behavioral_labels.json")
        );
        assert_eq!(
            default_output_path(&file, &config),
            dir.path().join("feral_behavioral_labels.json")
        );
    }

    fn make_folder_dataset(root: &Path) {
        for (class, clips) in [
            ("rest", vec!["r1.mp4", "r2.mov"]),
            ("walk", vec!["w1.mp4", "notes.txt"]),
            ("feed", vec!["f1.avi", "broken.mp4"]),
            (".cache", vec!["c.mp4"]),
        ] {
            let class_dir = root.join(class);
            fs::create_dir_all(&class_dir).unwrap();
            for clip in clips {
                fs::write(class_dir.join(clip), b"").unwrap();
            }
        }
    }

    fn folder_counter() -> StaticFrameCounter {
        StaticFrameCounter::new()
            .with("r1.mp4", 3)
            .with("r2.mov", 2)
            .with("w1.mp4", 4)
            .with("f1.avi", 1)
            .with("c.mp4", 9)
    }

    #[test]
    fn test_scenario_folder_ingestion() {
        let dir = tempfile::tempdir().unwrap();
        make_folder_dataset(dir.path());

        let conversion =
            folder_to_descriptor(dir.path(), &folder_counter(), &ConversionConfig::default())
                .unwrap();
        let descriptor = &conversion.descriptor;

        let expected_names = BTreeMap::from([
            (1, "feed".to_string()),
            (2, "rest".to_string()),
            (3, "walk".to_string()),
        ]);
        assert_eq!(descriptor.class_names, expected_names);
        assert_eq!(single_labels(descriptor, "walk/w1.mp4"), vec![3, 3, 3, 3]);
        assert_eq!(single_labels(descriptor, "rest/r1.mp4"), vec![2, 2, 2]);
        assert_eq!(single_labels(descriptor, "feed/f1.avi"), vec![1]);
        // broken.mp4 has no frames, notes.txt is not a video, .cache is hidden
        assert_eq!(descriptor.labels.len(), 4);
        assert_eq!(
            descriptor.splits.inference,
            vec!["feed/f1.avi", "rest/r1.mp4", "rest/r2.mov", "walk/w1.mp4"]
        );
        assert!(descriptor.validate().is_empty());
    }

    #[test]
    fn test_folder_split_reproducible_with_seed() {
        let dir = tempfile::tempdir().unwrap();
        make_folder_dataset(dir.path());
        let counter = folder_counter();
        let config = ConversionConfig {
            shuffle_seed: 1234,
            ..Default::default()
        };

        let a = folder_to_descriptor(dir.path(), &counter, &config).unwrap();
        let b = folder_to_descriptor(dir.path(), &counter, &config).unwrap();
        assert_eq!(a.descriptor.splits, b.descriptor.splits);

        let unshuffled = ConversionConfig {
            shuffle_folder_videos: false,
            ..Default::default()
        };
        let c = folder_to_descriptor(dir.path(), &counter, &unshuffled).unwrap();
        assert_eq!(c.descriptor.splits.train, vec!["feed/f1.avi", "rest/r1.mp4", "rest/r2.mov"]);
        assert_eq!(c.descriptor.splits.val, vec!["walk/w1.mp4"]);
    }

    #[test]
    fn test_folder_skips_implausible_frame_counts() {
        let dir = tempfile::tempdir().unwrap();
        make_folder_dataset(dir.path());
        let counter = folder_counter().with("broken.mp4", u64::MAX);
        let config = ConversionConfig {
            max_frames_per_video: 1000,
            ..Default::default()
        };
        let conversion = folder_to_descriptor(dir.path(), &counter, &config).unwrap();
        assert!(!conversion.descriptor.labels.contains_key("feed/broken.mp4"));
        assert_eq!(conversion.descriptor.labels.len(), 4);
    }

    #[test]
    fn test_folder_errors() {
        let dir = tempfile::tempdir().unwrap();
        let counter = StaticFrameCounter::new();
        let config = ConversionConfig::default();

        assert!(matches!(
            folder_to_descriptor(&dir.path().join("missing"), &counter, &config),
            Err(ConvertError::NoClassDirectories(_))
        ));
        assert!(matches!(
            folder_to_descriptor(dir.path(), &counter, &config),
            Err(ConvertError::NoClassDirectories(_))
        ));

        make_folder_dataset(dir.path());
        assert!(matches!(
            folder_to_descriptor(dir.path(), &counter, &config),
            Err(ConvertError::NoValidVideos(_))
        ));
    }

    #[test]
    fn test_inference_descriptor_and_write() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp4", "a.mp4", "c.mkv"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let descriptor = inference_descriptor(dir.path()).unwrap();
        assert_eq!(descriptor.splits.inference, vec!["a.mp4", "b.mp4"]);
        assert!(descriptor.labels.is_empty());

        let out = dir.path().join("inference.json");
        write_descriptor(&descriptor, &out, true).unwrap();
        let loaded = DatasetDescriptor::from_json(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(loaded, descriptor);
    }
}
