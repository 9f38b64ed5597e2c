//! Core value types for the scene-timing pipeline

use serde::{Deserialize, Serialize};

/// Editorial role of a segment; drives minimum-duration and dead-air policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    #[default]
    Narration,
    Title,
    Transition,
    #[serde(alias = "visual_only", alias = "visualOnly")]
    VisualOnly,
}

impl SegmentKind {
    /// Titles and transitions use the shorter title minimum
    pub fn uses_title_minimum(self) -> bool {
        matches!(self, SegmentKind::Title | SegmentKind::Transition)
    }
}

/// One planned narration/visual unit before timing resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentInput {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kind: SegmentKind,
    #[serde(default, alias = "measured_start")]
    pub measured_start: Option<f64>, // seconds
    #[serde(default, alias = "measured_end")]
    pub measured_end: Option<f64>, // seconds
}

impl SegmentInput {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: SegmentKind::Narration,
            measured_start: None,
            measured_end: None,
        }
    }

    pub fn with_kind(mut self, kind: SegmentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_measured(mut self, start: f64, end: f64) -> Self {
        self.measured_start = Some(start);
        self.measured_end = Some(end);
        self
    }

    /// Measured window, only when both ends are present
    pub fn measured_window(&self) -> Option<(f64, f64)> {
        match (self.measured_start, self.measured_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// Which rule determined a segment's final duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimingReason {
    Narration,
    Estimate,
    Min,
    Max,
    DeadAir,
    Merged,
}

impl TimingReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TimingReason::Narration => "narration",
            TimingReason::Estimate => "estimate",
            TimingReason::Min => "min",
            TimingReason::Max => "max",
            TimingReason::DeadAir => "dead-air",
            TimingReason::Merged => "merged",
        }
    }
}

impl std::fmt::Display for TimingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-segment diagnostics explaining how a duration was reached
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingDebug {
    pub word_count: usize,
    /// Speaking time before pause padding
    pub base_seconds: f64,
    pub pause_padding: f64,
    pub clamp_applied: bool,
    /// Pre-clamp duration, set whenever a clamp fired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_ids: Vec<String>,
    /// Seconds a measured window was moved to stay contiguous
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_shift: Option<f64>,
}

/// One scheduled segment on the shared timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentOutput {
    pub id: String,
    pub start_time: f64, // seconds
    pub end_time: f64,   // seconds
    pub duration_sec: f64,
    pub text: String,
    pub reason: TimingReason,
    pub debug: TimingDebug,
}

/// Segment list as read from JSON: either a bare array or `{ "segments": [...] }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SegmentBatch {
    List(Vec<SegmentInput>),
    Wrapped { segments: Vec<SegmentInput> },
}

impl SegmentBatch {
    pub fn into_segments(self) -> Vec<SegmentInput> {
        match self {
            SegmentBatch::List(segments) => segments,
            SegmentBatch::Wrapped { segments } => segments,
        }
    }
}

/// Round seconds to the two-decimal precision used on the timeline
pub fn round_centis(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
