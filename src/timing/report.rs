use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::types::{SegmentOutput, TimingReason};

/// Run summary for observability; never feeds back into the timeline
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingReport {
    pub input_segments: usize,
    pub output_segments: usize,
    pub total_words: usize,
    pub reason_counts: BTreeMap<TimingReason, usize>,
    pub merge_groups: usize,
    pub merged_segments: usize,
    pub splits: usize,
    pub timeline_adjustments: usize,
    pub total_duration: f64,
}

impl TimingReport {
    pub(super) fn build(
        input_segments: usize,
        splits: usize,
        timeline_adjustments: usize,
        output: &[SegmentOutput],
    ) -> Self {
        let mut reason_counts = BTreeMap::new();
        for segment in output {
            *reason_counts.entry(segment.reason).or_insert(0) += 1;
        }
        let merged: Vec<&SegmentOutput> = output
            .iter()
            .filter(|segment| segment.reason == TimingReason::Merged)
            .collect();
        Self {
            input_segments,
            output_segments: output.len(),
            total_words: output.iter().map(|segment| segment.debug.word_count).sum(),
            reason_counts,
            merge_groups: merged.len(),
            merged_segments: merged.iter().map(|segment| segment.debug.merged_ids.len()).sum(),
            splits,
            timeline_adjustments,
            total_duration: output.last().map_or(0.0, |segment| segment.end_time),
        }
    }

    pub fn count(&self, reason: TimingReason) -> usize {
        self.reason_counts.get(&reason).copied().unwrap_or(0)
    }

    pub(super) fn log(&self) {
        info!(
            input = self.input_segments,
            output = self.output_segments,
            words = self.total_words,
            narration = self.count(TimingReason::Narration),
            estimate = self.count(TimingReason::Estimate),
            min = self.count(TimingReason::Min),
            max = self.count(TimingReason::Max),
            dead_air = self.count(TimingReason::DeadAir),
            merged = self.count(TimingReason::Merged),
            splits = self.splits,
            adjustments = self.timeline_adjustments,
            total_duration = self.total_duration,
            "scene timings computed"
        );
    }
}
