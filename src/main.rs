use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::{fs, path::Path};
use tracing_subscriber::EnvFilter;

use sceneflow::config::{load_partial_config, FixedTimingPolicy, TimingConfig};
use sceneflow::types::{SegmentBatch, SegmentInput, SegmentOutput};
use sceneflow::{compute_scene_timings_with_report, TimingReport};

/// Sceneflow - scene timing planner
///
/// Turns narration segments (optionally with measured audio times) into a
/// contiguous timeline of scene windows.
#[derive(Parser, Debug)]
#[command(name = "sceneflow")]
#[command(version = "0.1.0")]
#[command(about = "Scene timing planner for narrated video timelines", long_about = None)]
struct Args {
    /// JSON file with a segment array or an object holding `segments`
    #[arg(value_name = "INPUT", conflicts_with = "segments_json")]
    input_file: Option<PathBuf>,

    /// Segments as an inline JSON string
    #[arg(long, value_name = "JSON")]
    segments_json: Option<String>,

    /// Path to JSON timing overrides
    #[arg(long, value_name = "PATH", conflicts_with = "config_json")]
    config_file: Option<PathBuf>,

    /// Timing overrides as an inline JSON string
    #[arg(long, value_name = "JSON")]
    config_json: Option<String>,

    /// Speaking rate override (words per minute)
    #[arg(long)]
    wpm: Option<f64>,

    /// Split over-long unmeasured segments at sentence boundaries
    #[arg(long)]
    auto_split: bool,

    /// How measured windows that miss the running cursor are placed
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Log every rule firing
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Snap,
    Trust,
}

impl From<PolicyArg> for FixedTimingPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Snap => FixedTimingPolicy::SnapToCursor,
            PolicyArg::Trust => FixedTimingPolicy::TrustMeasured,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl Args {
    fn validate(&self) -> Result<()> {
        if self.input_file.is_none() && self.segments_json.is_none() {
            bail!("Provide segments via INPUT or --segments-json");
        }

        if let Some(path) = &self.input_file {
            if !path.is_file() {
                bail!("Input file does not exist: {:?}", path);
            }
        }

        if let Some(wpm) = self.wpm {
            if wpm <= 0.0 {
                bail!("Words per minute must be positive, got: {}", wpm);
            }
        }

        Ok(())
    }

    fn timing_config(&self) -> Result<TimingConfig> {
        let partial = load_partial_config(self.config_file.as_deref(), self.config_json.as_deref())
            .context("Failed to load timing config")?;
        let mut config = partial.resolve();
        if let Some(wpm) = self.wpm {
            config.words_per_minute = wpm;
        }
        if self.auto_split {
            config.auto_split_enabled = true;
        }
        if let Some(policy) = self.policy {
            config.fixed_timing_policy = policy.into();
        }
        config.validate().context("Timing config validation failed")?;
        Ok(config)
    }

    fn segments(&self) -> Result<Vec<SegmentInput>> {
        load_segments_from_sources(self.input_file.as_deref(), self.segments_json.as_deref())
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    segments: &'a [SegmentOutput],
    report: &'a TimingReport,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    args.validate()
        .context("Failed to validate command-line arguments")?;

    let config = args.timing_config()?;
    let segments = args.segments().context("Failed to load segments")?;
    let (output, report) = compute_scene_timings_with_report(&segments, &config);

    match args.format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&JsonOutput {
                segments: &output,
                report: &report,
            })
            .context("Failed to serialize timings")?;
            println!("{}", rendered);
        }
        OutputFormat::Table => print_table(&output, &report),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_table(output: &[SegmentOutput], report: &TimingReport) {
    println!("Sceneflow v0.1.0 - Scene Timing Planner");
    println!(
        "Segments: {} in, {} out ({} merged groups, {} splits)",
        report.input_segments, report.output_segments, report.merge_groups, report.splits
    );
    println!();
    println!(
        "{:<20} {:>8} {:>8} {:>7}  {:<9} TEXT",
        "ID", "START", "END", "DUR", "REASON"
    );
    for segment in output {
        println!(
            "{:<20} {:>8.2} {:>8.2} {:>7.2}  {:<9} {}",
            segment.id,
            segment.start_time,
            segment.end_time,
            segment.duration_sec,
            segment.reason,
            preview(&segment.text, 48)
        );
    }
    println!();
    println!("Total duration: {:.2} seconds", report.total_duration);
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", head)
}

fn load_segments_from_sources(path: Option<&Path>, json: Option<&str>) -> Result<Vec<SegmentInput>> {
    if let Some(p) = path {
        let data = fs::read_to_string(p)
            .with_context(|| format!("Failed to read segments file {:?}", p))?;
        return parse_segments(&data);
    }

    if let Some(raw) = json {
        return parse_segments(raw);
    }

    bail!("No segment source provided"); // Should not happen due to validation
}

fn parse_segments(raw: &str) -> Result<Vec<SegmentInput>> {
    let batch: SegmentBatch = serde_json::from_str(raw).context("Failed to parse segments JSON")?;
    Ok(batch.into_segments())
}
