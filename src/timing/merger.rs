use tracing::debug;

use crate::config::TimingConfig;
use crate::types::{round_centis, TimingDebug, TimingReason};

use super::normalizer::word_count;
use super::resolver::ResolvedSegment;

/// Collapse runs of at least `merge_min_consecutive` short segments into one block.
/// Merged blocks lose any measured window and are placed by the sequencer.
pub(super) fn merge_short_runs(
    segments: Vec<ResolvedSegment>,
    config: &TimingConfig,
) -> Vec<ResolvedSegment> {
    let mut result = Vec::with_capacity(segments.len());
    let mut i = 0;

    while i < segments.len() {
        let run_len = segments[i..]
            .iter()
            .take_while(|segment| segment.duration < config.short_scene_threshold)
            .count();
        if run_len >= config.merge_min_consecutive.max(1) {
            let end = i + run_len;
            result.push(merge_run(&segments[i..end], i, end - 1));
            i = end;
            continue;
        }
        result.push(segments[i].clone());
        i += 1;
    }

    result
}

fn merge_run(run: &[ResolvedSegment], first_idx: usize, last_idx: usize) -> ResolvedSegment {
    let text = run
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let duration = round_centis(run.iter().map(|segment| segment.duration).sum());
    let merged_ids: Vec<String> = run.iter().map(|segment| segment.id.clone()).collect();
    let group_id = format!("merge-{first_idx}-{last_idx}");

    debug!(
        group = %group_id,
        count = run.len(),
        duration,
        "merging run of short segments"
    );

    ResolvedSegment {
        id: format!("{}-merged", run[0].id),
        duration,
        reason: TimingReason::Merged,
        debug: TimingDebug {
            word_count: word_count(&text),
            base_seconds: run.iter().map(|segment| segment.debug.base_seconds).sum(),
            pause_padding: run.iter().map(|segment| segment.debug.pause_padding).sum(),
            merge_group_id: Some(group_id),
            merged_ids,
            ..TimingDebug::default()
        },
        text,
        fixed: None,
    }
}
