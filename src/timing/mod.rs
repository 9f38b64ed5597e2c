//! Scene-timing engine: turns narration segments into a contiguous timeline.
//!
//! Stages run in a fixed order: optional auto-split, per-segment resolution
//! (measured override, estimation, clamping, dead-air cap), the anti-jitter
//! merge, and finally the single-pass sequencer.

mod merger;
mod normalizer;
mod report;
mod resolver;
mod sequencer;
mod split;


use crate::config::TimingConfig;
use crate::types::{SegmentInput, SegmentOutput};

use merger::merge_short_runs;
use resolver::resolve_segment;
use sequencer::TimelineSequencer;
use split::auto_split;

pub use normalizer::{estimate_speech, pause_padding, word_count, SpeechEstimate};
pub use report::TimingReport;

/// Pure function producing the scheduled segment list for `segments`
pub fn compute_scene_timings(segments: &[SegmentInput], config: &TimingConfig) -> Vec<SegmentOutput> {
    compute_scene_timings_with_report(segments, config).0
}

/// Same as [`compute_scene_timings`], also returning the diagnostic report.
/// The report is logged at info level either way.
pub fn compute_scene_timings_with_report(
    segments: &[SegmentInput],
    config: &TimingConfig,
) -> (Vec<SegmentOutput>, TimingReport) {
    let config = &config.sanitized();
    let planned = auto_split(segments, config);
    let splits = planned.len() - segments.len();

    let resolved = planned
        .iter()
        .map(|segment| resolve_segment(segment, config))
        .collect();
    let merged = merge_short_runs(resolved, config);

    let mut sequencer = TimelineSequencer::new(config.fixed_timing_policy);
    for segment in merged {
        sequencer.place(segment);
    }
    let adjustments = sequencer.adjustments();
    let output = sequencer.into_segments();

    let report = TimingReport::build(segments.len(), splits, adjustments, &output);
    report.log();
    (output, report)
}
