use tracing::{debug, warn};

use crate::config::TimingConfig;
use crate::types::{round_centis, SegmentInput, SegmentKind, TimingDebug, TimingReason};

use super::normalizer::{estimate_speech, word_count};

/// Shortest window the timeline can represent at centisecond precision
const MIN_WINDOW_SECONDS: f64 = 0.01;

/// A measured window carried through to the sequencer
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct FixedWindow {
    pub(super) start: f64,
    pub(super) end: f64,
}

/// A segment with its duration settled but not yet placed on the timeline
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ResolvedSegment {
    pub(super) id: String,
    pub(super) text: String,
    pub(super) duration: f64,
    pub(super) reason: TimingReason,
    pub(super) debug: TimingDebug,
    pub(super) fixed: Option<FixedWindow>,
}

pub(super) fn resolve_segment(segment: &SegmentInput, config: &TimingConfig) -> ResolvedSegment {
    if let Some(window) = usable_measured_window(segment) {
        return resolve_measured(segment, window);
    }

    let estimate = estimate_speech(&segment.text, config);
    let estimated = estimate.total();
    let (mut duration, mut reason) = clamp_duration(estimated, segment.kind, config);
    let mut debug_info = TimingDebug {
        word_count: estimate.word_count,
        base_seconds: estimate.base_seconds,
        pause_padding: estimate.pause_padding,
        clamp_applied: reason != TimingReason::Estimate,
        original_duration: (reason != TimingReason::Estimate).then_some(estimated),
        ..TimingDebug::default()
    };

    if segment.kind == SegmentKind::VisualOnly && duration > config.max_dead_air {
        debug!(id = %segment.id, from = duration, to = config.max_dead_air, "capping dead air");
        debug_info.clamp_applied = true;
        debug_info.original_duration = Some(duration);
        duration = config.max_dead_air;
        reason = TimingReason::DeadAir;
    }

    if reason != TimingReason::Estimate {
        debug!(id = %segment.id, %reason, duration, estimated, "duration clamped");
    }

    ResolvedSegment {
        id: segment.id.clone(),
        text: segment.text.clone(),
        duration: round_centis(duration).max(MIN_WINDOW_SECONDS),
        reason,
        debug: debug_info,
        fixed: None,
    }
}

fn resolve_measured(segment: &SegmentInput, (start, end): (f64, f64)) -> ResolvedSegment {
    let start = round_centis(start);
    let end = round_centis(end);
    ResolvedSegment {
        id: segment.id.clone(),
        text: segment.text.clone(),
        duration: round_centis(end - start),
        reason: TimingReason::Narration,
        debug: TimingDebug {
            word_count: word_count(&segment.text),
            ..TimingDebug::default()
        },
        fixed: Some(FixedWindow { start, end }),
    }
}

/// Measured windows that are incomplete, non-finite or not strictly forward
/// in time are ignored so the segment falls back to estimation.
fn usable_measured_window(segment: &SegmentInput) -> Option<(f64, f64)> {
    let (start, end) = segment.measured_window()?;
    let valid = start.is_finite()
        && end.is_finite()
        && start >= 0.0
        && round_centis(end) > round_centis(start);
    if !valid {
        warn!(
            id = %segment.id,
            start,
            end,
            "ignoring degenerate measured window; estimating instead"
        );
        return None;
    }
    Some((start, end))
}

fn clamp_duration(estimated: f64, kind: SegmentKind, config: &TimingConfig) -> (f64, TimingReason) {
    let minimum = if kind.uses_title_minimum() {
        config.min_title_duration
    } else {
        config.min_duration
    };
    if estimated < minimum {
        (minimum, TimingReason::Min)
    } else if estimated > config.max_duration {
        (config.max_duration, TimingReason::Max)
    } else {
        (estimated, TimingReason::Estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn resolve(segment: SegmentInput) -> ResolvedSegment {
        resolve_segment(&segment, &TimingConfig::default())
    }

    #[test]
    fn measured_window_is_authoritative() {
        let resolved = resolve(SegmentInput::new("a", "Spoken line here.").with_measured(0.0, 3.45));
        assert_eq!(resolved.duration, 3.45);
        assert_eq!(resolved.reason, TimingReason::Narration);
        assert_eq!(resolved.debug.word_count, 3);
        assert_eq!(resolved.debug.pause_padding, 0.0);
        assert_eq!(resolved.fixed, Some(FixedWindow { start: 0.0, end: 3.45 }));
    }

    #[test]
    fn half_measured_segment_is_estimated() {
        let mut segment = SegmentInput::new("a", "Hello.");
        segment.measured_end = Some(9.0);
        let resolved = resolve(segment);
        assert_eq!(resolved.reason, TimingReason::Min);
        assert!(resolved.fixed.is_none());
    }

    #[test]
    fn inverted_measured_window_falls_back_to_estimate() {
        let resolved = resolve(SegmentInput::new("a", "Backwards.").with_measured(5.0, 4.0));
        assert_eq!(resolved.reason, TimingReason::Min);
        assert_eq!(resolved.duration, 3.0);
        assert!(resolved.fixed.is_none());

        let resolved = resolve(SegmentInput::new("b", "Zero.").with_measured(2.0, 2.0));
        assert!(resolved.fixed.is_none());
    }

    #[test]
    fn non_finite_measured_window_falls_back_to_estimate() {
        let resolved = resolve(SegmentInput::new("a", "Lost sync.").with_measured(f64::NAN, 4.0));
        assert!(resolved.fixed.is_none());
        assert_eq!(resolved.reason, TimingReason::Min);
        assert_eq!(resolved.duration, 3.0);

        let resolved = resolve(SegmentInput::new("b", "Runaway.").with_measured(1.0, f64::INFINITY));
        assert!(resolved.fixed.is_none());
    }

    #[test]
    fn negative_measured_start_falls_back_to_estimate() {
        let resolved = resolve(SegmentInput::new("a", "Too early.").with_measured(-0.5, 2.0));
        assert!(resolved.fixed.is_none());
        assert_eq!(resolved.reason, TimingReason::Min);
        assert_eq!(resolved.duration, 3.0);
    }

    #[test]
    fn short_text_clamps_to_minimum() {
        let resolved = resolve(SegmentInput::new("a", "Hi."));
        assert_eq!(resolved.duration, 3.0);
        assert_eq!(resolved.reason, TimingReason::Min);
        assert!(resolved.debug.clamp_applied);
        let original = resolved.debug.original_duration.unwrap();
        assert_abs_diff_eq!(original, 60.0 / 155.0 + 0.3, epsilon = 1e-12);
    }

    #[test]
    fn empty_text_clamps_to_minimum() {
        let resolved = resolve(SegmentInput::new("a", ""));
        assert_eq!(resolved.debug.word_count, 0);
        assert_eq!(resolved.duration, 3.0);
        assert_eq!(resolved.reason, TimingReason::Min);
    }

    #[test]
    fn long_text_clamps_to_maximum() {
        let text = vec!["word"; 40].join(" ");
        let resolved = resolve(SegmentInput::new("a", text));
        assert_eq!(resolved.duration, 12.0);
        assert_eq!(resolved.reason, TimingReason::Max);
        assert!(resolved.debug.original_duration.unwrap() > 12.0);
    }

    #[test]
    fn mid_length_text_keeps_estimate() {
        let text = vec!["word"; 15].join(" ");
        let resolved = resolve(SegmentInput::new("a", text));
        assert_eq!(resolved.reason, TimingReason::Estimate);
        assert_eq!(resolved.duration, round_centis(15.0 * 60.0 / 155.0));
        assert!(!resolved.debug.clamp_applied);
        assert!(resolved.debug.original_duration.is_none());
    }

    #[test]
    fn titles_use_title_minimum() {
        let resolved = resolve(SegmentInput::new("a", "Intro").with_kind(SegmentKind::Title));
        assert_eq!(resolved.duration, 1.5);
        assert_eq!(resolved.reason, TimingReason::Min);

        let resolved = resolve(SegmentInput::new("b", "").with_kind(SegmentKind::Transition));
        assert_eq!(resolved.duration, 1.5);
    }

    #[test]
    fn visual_only_is_capped_to_dead_air() {
        let text = vec!["word"; 20].join(" ");
        let resolved = resolve(SegmentInput::new("a", text).with_kind(SegmentKind::VisualOnly));
        assert_eq!(resolved.duration, 2.0);
        assert_eq!(resolved.reason, TimingReason::DeadAir);
        assert!(resolved.debug.clamp_applied);
        assert_abs_diff_eq!(
            resolved.debug.original_duration.unwrap(),
            20.0 * 60.0 / 155.0,
            epsilon = 1e-9
        );
    }
}
