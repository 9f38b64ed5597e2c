use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// How the sequencer treats a measured window whose start disagrees with the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixedTimingPolicy {
    /// Keep the measured duration but start it at the cursor
    #[default]
    #[serde(alias = "snap")]
    SnapToCursor,
    /// Let the measured window stand and jump the cursor to its end
    #[serde(alias = "trust")]
    TrustMeasured,
}

/// Fully resolved tuning for the timing engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingConfig {
    pub words_per_minute: f64,
    pub min_duration: f64,       // seconds
    pub max_duration: f64,       // seconds
    pub min_title_duration: f64, // seconds
    /// Segments shorter than this are candidates for the anti-jitter merge
    pub short_scene_threshold: f64,
    pub merge_min_consecutive: usize,
    pub max_dead_air: f64, // seconds
    pub auto_split_enabled: bool,
    pub fixed_timing_policy: FixedTimingPolicy,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 155.0,
            min_duration: 3.0,
            max_duration: 12.0,
            min_title_duration: 1.5,
            short_scene_threshold: 2.2,
            merge_min_consecutive: 3,
            max_dead_air: 2.0,
            auto_split_enabled: false,
            fixed_timing_policy: FixedTimingPolicy::SnapToCursor,
        }
    }
}

impl TimingConfig {
    /// Seconds of speech per word at the configured rate
    pub fn seconds_per_word(&self) -> f64 {
        60.0 / self.words_per_minute
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.words_per_minute > 0.0,
            "wordsPerMinute must be positive, got {}",
            self.words_per_minute
        );
        ensure!(
            self.min_duration > 0.0,
            "minDuration must be positive, got {}",
            self.min_duration
        );
        ensure!(
            self.min_title_duration > 0.0,
            "minTitleDuration must be positive, got {}",
            self.min_title_duration
        );
        ensure!(
            self.max_duration >= self.min_duration,
            "maxDuration ({}) must be >= minDuration ({})",
            self.max_duration,
            self.min_duration
        );
        ensure!(
            self.max_duration >= self.min_title_duration,
            "maxDuration ({}) must be >= minTitleDuration ({})",
            self.max_duration,
            self.min_title_duration
        );
        ensure!(
            self.short_scene_threshold > 0.0,
            "shortSceneThreshold must be positive, got {}",
            self.short_scene_threshold
        );
        ensure!(
            self.merge_min_consecutive >= 2,
            "mergeMinConsecutive must be at least 2, got {}",
            self.merge_min_consecutive
        );
        ensure!(
            self.max_dead_air > 0.0,
            "maxDeadAir must be positive, got {}",
            self.max_dead_air
        );
        Ok(())
    }

    /// Copy with every non-finite or non-positive duration and rate replaced
    /// by its default, so the engine stays total on unvalidated input.
    pub fn sanitized(&self) -> TimingConfig {
        let defaults = TimingConfig::default();
        let positive = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        TimingConfig {
            words_per_minute: positive(self.words_per_minute, defaults.words_per_minute),
            min_duration: positive(self.min_duration, defaults.min_duration),
            max_duration: positive(self.max_duration, defaults.max_duration),
            min_title_duration: positive(self.min_title_duration, defaults.min_title_duration),
            short_scene_threshold: positive(
                self.short_scene_threshold,
                defaults.short_scene_threshold,
            ),
            merge_min_consecutive: self.merge_min_consecutive.max(1),
            max_dead_air: positive(self.max_dead_air, defaults.max_dead_air),
            ..self.clone()
        }
    }
}

/// Caller-supplied overrides; unset fields fall back to the defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialTimingConfig {
    #[serde(default, alias = "words_per_minute", alias = "wpm")]
    pub words_per_minute: Option<f64>,
    #[serde(default, alias = "min_duration")]
    pub min_duration: Option<f64>,
    #[serde(default, alias = "max_duration")]
    pub max_duration: Option<f64>,
    #[serde(default, alias = "min_title_duration")]
    pub min_title_duration: Option<f64>,
    #[serde(default, alias = "short_scene_threshold")]
    pub short_scene_threshold: Option<f64>,
    #[serde(default, alias = "merge_min_consecutive")]
    pub merge_min_consecutive: Option<usize>,
    #[serde(default, alias = "max_dead_air")]
    pub max_dead_air: Option<f64>,
    #[serde(default, alias = "auto_split_enabled")]
    pub auto_split_enabled: Option<bool>,
    #[serde(default, alias = "fixed_timing_policy")]
    pub fixed_timing_policy: Option<FixedTimingPolicy>,
}

impl PartialTimingConfig {
    pub fn resolve(&self) -> TimingConfig {
        self.apply_to(TimingConfig::default())
    }

    pub fn apply_to(&self, base: TimingConfig) -> TimingConfig {
        TimingConfig {
            words_per_minute: self.words_per_minute.unwrap_or(base.words_per_minute),
            min_duration: self.min_duration.unwrap_or(base.min_duration),
            max_duration: self.max_duration.unwrap_or(base.max_duration),
            min_title_duration: self.min_title_duration.unwrap_or(base.min_title_duration),
            short_scene_threshold: self
                .short_scene_threshold
                .unwrap_or(base.short_scene_threshold),
            merge_min_consecutive: self
                .merge_min_consecutive
                .unwrap_or(base.merge_min_consecutive),
            max_dead_air: self.max_dead_air.unwrap_or(base.max_dead_air),
            auto_split_enabled: self.auto_split_enabled.unwrap_or(base.auto_split_enabled),
            fixed_timing_policy: self.fixed_timing_policy.unwrap_or(base.fixed_timing_policy),
        }
    }
}

impl From<PartialTimingConfig> for TimingConfig {
    fn from(partial: PartialTimingConfig) -> Self {
        partial.resolve()
    }
}

/// Read overrides from a file or an inline JSON string; neither means defaults
pub fn load_partial_config(path: Option<&Path>, json: Option<&str>) -> Result<PartialTimingConfig> {
    match (path, json) {
        (Some(_), Some(_)) => bail!("Provide either a config file or inline config JSON, not both"),
        (Some(p), None) => {
            let data = fs::read_to_string(p)
                .with_context(|| format!("Failed to read config file {:?}", p))?;
            parse_partial_config(&data)
                .with_context(|| format!("Invalid config file {:?}", p))
        }
        (None, Some(raw)) => parse_partial_config(raw),
        (None, None) => Ok(PartialTimingConfig::default()),
    }
}

fn parse_partial_config(raw: &str) -> Result<PartialTimingConfig> {
    let partial: PartialTimingConfig =
        serde_json::from_str(raw).context("Failed to parse timing config JSON")?;
    Ok(partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_published_values() {
        let config = TimingConfig::default();
        assert_eq!(config.words_per_minute, 155.0);
        assert_eq!(config.min_duration, 3.0);
        assert_eq!(config.max_duration, 12.0);
        assert_eq!(config.min_title_duration, 1.5);
        assert_eq!(config.short_scene_threshold, 2.2);
        assert_eq!(config.merge_min_consecutive, 3);
        assert_eq!(config.max_dead_air, 2.0);
        assert!(!config.auto_split_enabled);
        assert_eq!(config.fixed_timing_policy, FixedTimingPolicy::SnapToCursor);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_overrides_only_named_fields() {
        let partial = parse_partial_config(
            r#"{"wordsPerMinute": 180, "max_duration": 9.5, "fixedTimingPolicy": "trust"}"#,
        )
        .unwrap();
        let config = partial.resolve();
        assert_eq!(config.words_per_minute, 180.0);
        assert_eq!(config.max_duration, 9.5);
        assert_eq!(config.min_duration, 3.0);
        assert_eq!(config.fixed_timing_policy, FixedTimingPolicy::TrustMeasured);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse_partial_config(r#"{"wordsPerMinit": 180}"#).is_err());
    }

    #[test]
    fn validation_catches_inverted_bounds() {
        let config = PartialTimingConfig {
            min_duration: Some(8.0),
            max_duration: Some(4.0),
            ..Default::default()
        }
        .resolve();
        assert!(config.validate().is_err());

        let config = PartialTimingConfig {
            merge_min_consecutive: Some(1),
            ..Default::default()
        }
        .resolve();
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"autoSplitEnabled": true, "maxDeadAir": 1.5}}"#).unwrap();
        let partial = load_partial_config(Some(file.path()), None).unwrap();
        let config = partial.resolve();
        assert!(config.auto_split_enabled);
        assert_eq!(config.max_dead_air, 1.5);
    }

    #[test]
    fn sanitized_replaces_unusable_values() {
        let config = TimingConfig {
            words_per_minute: 0.0,
            min_duration: f64::NAN,
            max_dead_air: -1.0,
            merge_min_consecutive: 0,
            max_duration: 9.0,
            ..TimingConfig::default()
        }
        .sanitized();
        assert_eq!(config.words_per_minute, 155.0);
        assert_eq!(config.min_duration, 3.0);
        assert_eq!(config.max_dead_air, 2.0);
        assert_eq!(config.merge_min_consecutive, 1);
        assert_eq!(config.max_duration, 9.0);
        assert!(config.seconds_per_word().is_finite());
    }

    #[test]
    fn rejects_two_config_sources() {
        let result = load_partial_config(Some(Path::new("config.json")), Some("{}"));
        assert!(result.is_err());
    }

    #[test]
    fn missing_sources_yield_defaults() {
        let partial = load_partial_config(None, None).unwrap();
        assert_eq!(partial.resolve(), TimingConfig::default());
    }
}
