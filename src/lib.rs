pub mod config;
pub mod timing;
pub mod types;

pub use config::{FixedTimingPolicy, PartialTimingConfig, TimingConfig};
pub use timing::{compute_scene_timings, compute_scene_timings_with_report, TimingReport};
pub use types::{SegmentInput, SegmentKind, SegmentOutput, TimingDebug, TimingReason};
