//! ethoframe CLI - Build dense behavior-label datasets
//!
//! Commands:
//! - tabular: Convert CSV/TSV behavioral exports into a dataset descriptor
//! - folder: Convert per-class clip folders into a dataset descriptor
//! - inference: Create an inference-only descriptor for a video directory
//! - inspect: Show how one export file is interpreted
//! - validate: Check an existing descriptor's invariants

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ethoframe::descriptor::DatasetDescriptor;
use ethoframe::events::EventStreamParser;
use ethoframe::pipeline::{default_output_path, VideoSummary};
use ethoframe::probe::{FfprobeFrameCounter, StaticFrameCounter};
use ethoframe::schema::{ResolvedColumns, SchemaKind};
use ethoframe::{
    folder_to_descriptor, inference_descriptor, tabular_to_descriptor, write_descriptor,
    ConversionConfig, ConvertError, EventStatus, LabelMode, ETHOFRAME_VERSION,
};

/// ethoframe - Dense per-frame behavior labels for video classifiers
#[derive(Parser)]
#[command(name = "ethoframe")]
#[command(version = ETHOFRAME_VERSION)]
#[command(about = "Convert behavioral annotations into per-frame training labels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert CSV/TSV behavioral exports (a file or a directory of files)
    Tabular {
        /// Export file, or directory containing .csv/.tsv exports
        input: PathBuf,

        /// Label layout
        #[arg(long, value_enum, default_value = "single")]
        mode: ModeArg,

        /// Output file (defaults to the configured file name next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Frame rate used when an export has no usable FPS column
        #[arg(long)]
        default_fps: Option<f64>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Convert a root directory whose subdirectories are behavior classes
    Folder {
        /// Root directory containing one folder per behavior
        root: PathBuf,

        /// Output file
        output: PathBuf,

        /// Seed for the split shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Keep directory order instead of shuffling before splitting
        #[arg(long)]
        no_shuffle: bool,

        /// JSON file mapping clip file names to frame counts (skips ffprobe)
        #[arg(long)]
        frame_counts: Option<PathBuf>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Create an inference-only descriptor listing the .mp4 files of a directory
    Inference {
        /// Directory of videos
        video_dir: PathBuf,

        /// Output file
        output: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Show the detected schema, columns and events of one export file
    Inspect {
        /// Export file
        input: PathBuf,

        /// Frame rate used when the export has no usable FPS column
        #[arg(long)]
        default_fps: Option<f64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate an existing dataset descriptor
    Validate {
        /// Descriptor JSON file
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// One class ID per frame, 0 = "other"
    Single,
    /// One 0/1 flag per class per frame
    Multilabel,
}

impl From<ModeArg> for LabelMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => LabelMode::Single,
            ModeArg::Multilabel => LabelMode::Multilabel,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

impl OutputFormat {
    fn is_pretty(&self) -> bool {
        matches!(self, OutputFormat::JsonPretty)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), EthoframeCliError> {
    match cli.command {
        Commands::Tabular {
            input,
            mode,
            output,
            config,
            default_fps,
            format,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(fps) = default_fps {
                config.default_fps = fps;
            }
            config.validate()?;
            cmd_tabular(&input, mode.into(), output, &config, format)
        }

        Commands::Folder {
            root,
            output,
            seed,
            no_shuffle,
            frame_counts,
            config,
            format,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(seed) = seed {
                config.shuffle_seed = seed;
            }
            if no_shuffle {
                config.shuffle_folder_videos = false;
            }
            config.validate()?;
            cmd_folder(&root, &output, frame_counts.as_deref(), &config, format)
        }

        Commands::Inference {
            video_dir,
            output,
            format,
        } => {
            let descriptor = inference_descriptor(&video_dir)?;
            write_descriptor(&descriptor, &output, format.is_pretty())?;
            println!(
                "Created {} with {} videos.",
                output.display(),
                descriptor.splits.inference.len()
            );
            Ok(())
        }

        Commands::Inspect {
            input,
            default_fps,
            json,
        } => {
            let mut config = ConversionConfig::default();
            if let Some(fps) = default_fps {
                config.default_fps = fps;
            }
            config.validate()?;
            cmd_inspect(&input, &config, json)
        }

        Commands::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn load_config(path: Option<&Path>) -> Result<ConversionConfig, EthoframeCliError> {
    match path {
        Some(path) => Ok(ConversionConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(ConversionConfig::default()),
    }
}

fn cmd_tabular(
    input: &Path,
    mode: LabelMode,
    output: Option<PathBuf>,
    config: &ConversionConfig,
    format: OutputFormat,
) -> Result<(), EthoframeCliError> {
    let conversion = tabular_to_descriptor(input, mode, config)?;
    let output = output.unwrap_or_else(|| default_output_path(input, config));
    write_descriptor(&conversion.descriptor, &output, format.is_pretty())?;
    print_summary(&conversion.videos, &conversion.descriptor);
    Ok(())
}

fn cmd_folder(
    root: &Path,
    output: &Path,
    frame_counts: Option<&Path>,
    config: &ConversionConfig,
    format: OutputFormat,
) -> Result<(), EthoframeCliError> {
    let conversion = match frame_counts {
        Some(path) => {
            let counter = StaticFrameCounter::from_json(&fs::read_to_string(path)?)?;
            folder_to_descriptor(root, &counter, config)?
        }
        None => {
            let counter = FfprobeFrameCounter::new(&config.ffprobe_path);
            if !counter.is_available() {
                return Err(EthoframeCliError::FfprobeMissing(config.ffprobe_path.clone()));
            }
            folder_to_descriptor(root, &counter, config)?
        }
    };
    write_descriptor(&conversion.descriptor, output, format.is_pretty())?;
    print_summary(&conversion.videos, &conversion.descriptor);
    Ok(())
}

fn print_summary(videos: &[VideoSummary], descriptor: &DatasetDescriptor) {
    let total_frames: usize = videos.iter().map(|v| v.frame_count).sum();
    let unmatched: usize = videos.iter().map(|v| v.unmatched_starts).sum();
    println!("Conversion Summary");
    println!("==================");
    println!("Videos:          {}", videos.len());
    println!("Classes:         {}", descriptor.class_names.len());
    println!("Total frames:    {}", total_frames);
    println!(
        "Splits:          train={}, val={}, test={}, inference={}",
        descriptor.splits.train.len(),
        descriptor.splits.val.len(),
        descriptor.splits.test.len(),
        descriptor.splits.inference.len()
    );
    if unmatched > 0 {
        println!("Unclosed STARTs: {} (no labels written for them)", unmatched);
    }
}

fn cmd_inspect(input: &Path, config: &ConversionConfig, json: bool) -> Result<(), EthoframeCliError> {
    let parsed = EventStreamParser::new(config).parse_file(input)?;

    let count = |status: EventStatus| parsed.events.iter().filter(|e| e.status == status).count();
    let report = InspectReport {
        file: input.display().to_string(),
        schema: parsed.schema.kind.clone(),
        header: parsed.schema.table.header.clone(),
        records: parsed.schema.table.rows.len(),
        columns: parsed.schema.columns,
        video: parsed.video.name.clone(),
        fps: parsed.video.fps,
        frame_count: parsed.video.frame_count,
        start_events: count(EventStatus::Start),
        stop_events: count(EventStatus::Stop),
        point_events: count(EventStatus::Point),
        behaviors: parsed.behavior_names().into_iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Inspect Report");
    println!("==============");
    println!("File:     {}", report.file);
    match &report.schema {
        SchemaKind::Header {
            strategy,
            record,
            score,
        } => println!(
            "Schema:   {} (header is record {}, score {})",
            strategy,
            record + 1,
            score
        ),
        SchemaKind::Positional => println!("Schema:   positional fallback (no header found)"),
    }
    println!("Records:  {}", report.records);
    println!("Video:    {}", report.video);
    println!("FPS:      {}", report.fps);
    println!("Frames:   {}", report.frame_count);
    println!(
        "Events:   start={}, stop={}, point={}",
        report.start_events, report.stop_events, report.point_events
    );
    println!("\nColumns:");
    for (name, idx) in column_rows(&report.columns) {
        let header = idx
            .and_then(|i| report.header.get(i))
            .map(|s| s.as_str())
            .unwrap_or("(none)");
        println!("  {:<10} {}", name, header);
    }
    println!("\nBehaviors: {}", report.behaviors.join(", "));
    Ok(())
}

fn column_rows(columns: &ResolvedColumns) -> [(&'static str, Option<usize>); 7] {
    [
        ("time", columns.time),
        ("behavior", columns.behavior),
        ("status", columns.status),
        ("fps", columns.fps),
        ("duration", columns.duration),
        ("media_path", columns.media_path),
        ("media_name", columns.media_name),
    ]
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), EthoframeCliError> {
    let descriptor = DatasetDescriptor::from_json(&fs::read_to_string(input)?)?;
    let issues = descriptor.validate();

    let report = ValidationReport {
        videos: descriptor.labels.len(),
        classes: descriptor.class_names.len(),
        is_multilabel: descriptor.is_multilabel,
        issues: issues.iter().map(|i| i.to_string()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Labeled videos: {}", report.videos);
        println!("Classes:        {}", report.classes);
        println!("Multilabel:     {}", report.is_multilabel);
        println!("Issues:         {}", report.issues.len());

        if !report.issues.is_empty() {
            println!("\nIssues:");
            for issue in &report.issues {
                println!("  - {}", issue);
            }
        }
    }

    if report.issues.is_empty() {
        Ok(())
    } else {
        Err(EthoframeCliError::ValidationFailed(report.issues.len()))
    }
}

// Error handling

#[derive(Debug)]
enum EthoframeCliError {
    Io(io::Error),
    Convert(ConvertError),
    Json(serde_json::Error),
    FfprobeMissing(String),
    ValidationFailed(usize),
}

impl From<io::Error> for EthoframeCliError {
    fn from(e: io::Error) -> Self {
        EthoframeCliError::Io(e)
    }
}

impl From<ConvertError> for EthoframeCliError {
    fn from(e: ConvertError) -> Self {
        EthoframeCliError::Convert(e)
    }
}

impl From<serde_json::Error> for EthoframeCliError {
    fn from(e: serde_json::Error) -> Self {
        EthoframeCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<EthoframeCliError> for CliError {
    fn from(e: EthoframeCliError) -> Self {
        match e {
            EthoframeCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            EthoframeCliError::Convert(e) => {
                let (code, hint) = match &e {
                    ConvertError::NoInputFiles(_) => {
                        ("NO_INPUT_FILES", "Pass a .csv/.tsv file or a directory containing them")
                    }
                    ConvertError::NoBehaviors(_) => {
                        ("NO_BEHAVIORS", "Check that the exports have a Behavior column with values")
                    }
                    ConvertError::NoClassDirectories(_) => (
                        "NO_CLASS_DIRECTORIES",
                        "Create one folder per behavior under the root directory",
                    ),
                    ConvertError::NoValidVideos(_) => {
                        ("NO_VALID_VIDEOS", "Check video extensions and that the clips decode")
                    }
                    ConvertError::InvalidConfig(_) => {
                        ("INVALID_CONFIG", "Fix the configuration values and retry")
                    }
                    ConvertError::InvalidDescriptor(_) => {
                        ("INVALID_DESCRIPTOR", "Ensure the file is a dataset descriptor")
                    }
                    _ => ("CONVERSION_ERROR", "Check input files"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            EthoframeCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            EthoframeCliError::FfprobeMissing(binary) => CliError {
                code: "FFPROBE_MISSING".to_string(),
                message: format!("Cannot run '{}'", binary),
                hint: Some("Install FFmpeg or pass --frame-counts".to_string()),
            },
            EthoframeCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} descriptor issues found", count),
                hint: Some("Regenerate the descriptor from its annotations".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct InspectReport {
    file: String,
    schema: SchemaKind,
    header: Vec<String>,
    records: usize,
    columns: ResolvedColumns,
    video: String,
    fps: f64,
    frame_count: usize,
    start_events: usize,
    stop_events: usize,
    point_events: usize,
    behaviors: Vec<String>,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    videos: usize,
    classes: usize,
    is_multilabel: bool,
    issues: Vec<String>,
}
