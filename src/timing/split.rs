use tracing::debug;

use crate::config::TimingConfig;
use crate::types::{SegmentInput, SegmentKind};

use super::normalizer::estimate_speech;

/// Break unmeasured segments whose estimate overshoots the maximum at the
/// sentence boundary nearest their midpoint. Identity unless enabled.
pub(super) fn auto_split(segments: &[SegmentInput], config: &TimingConfig) -> Vec<SegmentInput> {
    if !config.auto_split_enabled {
        return segments.to_vec();
    }
    let mut result = Vec::with_capacity(segments.len());
    for segment in segments {
        split_into(segment.clone(), config, &mut result);
    }
    result
}

fn split_into(segment: SegmentInput, config: &TimingConfig, out: &mut Vec<SegmentInput>) {
    if segment.measured_window().is_some() || segment.kind == SegmentKind::VisualOnly {
        out.push(segment);
        return;
    }
    let estimate = estimate_speech(&segment.text, config);
    if estimate.total() <= config.max_duration {
        out.push(segment);
        return;
    }
    let Some(cut) = midpoint_sentence_break(&segment.text) else {
        out.push(segment);
        return;
    };

    let (head, tail) = segment.text.split_at(cut);
    debug!(
        id = %segment.id,
        estimated = estimate.total(),
        "splitting over-long segment at sentence boundary"
    );
    let first = SegmentInput {
        id: format!("{}-1", segment.id),
        text: head.trim().to_string(),
        ..segment.clone()
    };
    let second = SegmentInput {
        id: format!("{}-2", segment.id),
        text: tail.trim().to_string(),
        ..segment
    };
    split_into(first, config, out);
    split_into(second, config, out);
}

/// Byte offset just past the sentence terminator closest to the middle of the text.
/// Only boundaries followed by whitespace and more text qualify.
fn midpoint_sentence_break(text: &str) -> Option<usize> {
    let trimmed_len = text.trim_end().len();
    let midpoint = trimmed_len / 2;
    let mut best: Option<usize> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = idx + c.len_utf8();
        let followed_by_space = chars.peek().is_some_and(|(_, next)| next.is_whitespace());
        if !followed_by_space || end >= trimmed_len {
            continue;
        }
        let closer = best.map_or(true, |current| end.abs_diff(midpoint) < current.abs_diff(midpoint));
        if closer {
            best = Some(end);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text() -> String {
        let first = "The first half of this story keeps going with many words about nothing much at all today.";
        let second = "The second half also rambles on with plenty of words to push the estimate past the limit.";
        format!("{first} {second}")
    }

    #[test]
    fn disabled_split_is_identity() {
        let segments = vec![SegmentInput::new("s1", long_text())];
        let config = TimingConfig::default();
        assert_eq!(auto_split(&segments, &config), segments);
    }

    #[test]
    fn enabled_split_breaks_at_middle_sentence() {
        let segments = vec![SegmentInput::new("s1", long_text())];
        let config = TimingConfig {
            max_duration: 8.0,
            auto_split_enabled: true,
            ..TimingConfig::default()
        };
        let split = auto_split(&segments, &config);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].id, "s1-1");
        assert_eq!(split[1].id, "s1-2");
        assert!(split[0].text.ends_with("today."));
        assert!(split[1].text.starts_with("The second half"));
    }

    #[test]
    fn measured_segments_are_never_split() {
        let segments = vec![SegmentInput::new("s1", long_text()).with_measured(0.0, 20.0)];
        let config = TimingConfig {
            max_duration: 8.0,
            auto_split_enabled: true,
            ..TimingConfig::default()
        };
        assert_eq!(auto_split(&segments, &config), segments);
    }

    #[test]
    fn visual_only_segments_are_never_split() {
        let segments = vec![SegmentInput::new("v", long_text()).with_kind(SegmentKind::VisualOnly)];
        let config = TimingConfig {
            max_duration: 8.0,
            auto_split_enabled: true,
            ..TimingConfig::default()
        };
        assert_eq!(auto_split(&segments, &config), segments);
    }

    #[test]
    fn text_without_boundary_stays_whole() {
        let words = vec!["word"; 60].join(" ");
        let segments = vec![SegmentInput::new("s1", words)];
        let config = TimingConfig {
            auto_split_enabled: true,
            ..TimingConfig::default()
        };
        assert_eq!(auto_split(&segments, &config).len(), 1);
    }

    #[test]
    fn picks_boundary_closest_to_midpoint() {
        let text = "A. Bbbbbbbbbb. Cccccccccccccccccccccc.";
        let cut = midpoint_sentence_break(text).unwrap();
        assert_eq!(&text[..cut], "A. Bbbbbbbbbb.");
    }
}
