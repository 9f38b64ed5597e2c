use tracing::warn;

use crate::config::FixedTimingPolicy;
use crate::types::{round_centis, SegmentOutput};

use super::resolver::{FixedWindow, ResolvedSegment};

const EPS: f64 = 1e-6;

/// Walks the resolved list once, placing each segment at a running cursor
pub(super) struct TimelineSequencer {
    policy: FixedTimingPolicy,
    cursor: f64,
    adjustments: usize,
    placed: Vec<SegmentOutput>,
}

impl TimelineSequencer {
    pub(super) fn new(policy: FixedTimingPolicy) -> Self {
        Self {
            policy,
            cursor: 0.0,
            adjustments: 0,
            placed: Vec::new(),
        }
    }

    pub(super) fn place(&mut self, segment: ResolvedSegment) {
        let (start, end, shift) = match segment.fixed {
            Some(window) => self.place_fixed(&segment.id, window),
            None => (self.cursor, round_centis(self.cursor + segment.duration), None),
        };
        self.cursor = end;
        let mut debug = segment.debug;
        debug.timeline_shift = shift;
        self.placed.push(SegmentOutput {
            id: segment.id,
            start_time: start,
            end_time: end,
            duration_sec: round_centis(end - start),
            text: segment.text,
            reason: segment.reason,
            debug,
        });
    }

    /// Number of measured windows that did not line up with the cursor
    pub(super) fn adjustments(&self) -> usize {
        self.adjustments
    }

    pub(super) fn into_segments(self) -> Vec<SegmentOutput> {
        self.placed
    }

    fn place_fixed(&mut self, id: &str, window: FixedWindow) -> (f64, f64, Option<f64>) {
        let drift = window.start - self.cursor;
        if drift.abs() <= EPS {
            return (self.cursor, window.end, None);
        }
        self.adjustments += 1;
        match self.policy {
            FixedTimingPolicy::SnapToCursor => {
                let shift = round_centis(-drift);
                warn!(
                    id,
                    measured_start = window.start,
                    cursor = self.cursor,
                    "measured window does not meet the timeline; snapping to cursor"
                );
                let end = round_centis(self.cursor + (window.end - window.start));
                (self.cursor, end, Some(shift))
            }
            FixedTimingPolicy::TrustMeasured => {
                if drift < 0.0 {
                    warn!(
                        id,
                        measured_start = window.start,
                        cursor = self.cursor,
                        overlap = -drift,
                        "measured window starts before the cursor; keeping measured times, timeline now overlaps"
                    );
                } else {
                    warn!(
                        id,
                        measured_start = window.start,
                        cursor = self.cursor,
                        gap = drift,
                        "measured window starts after the cursor; keeping measured times, timeline now has a gap"
                    );
                }
                (window.start, window.end, None)
            }
        }
    }
}
