//! Simplification settings
//!
//! Defaults match what a slide viewer wants out of the box: shapes under
//! 1000 points are never touched and nothing is simplified at or below a
//! downsample of 4. Settings can be overridden from a JSON document.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of points below which a shape is drawn as-is
pub const DEFAULT_MIN_POINTS: usize = 1000;

/// Default downsample at or below which no simplification happens
pub const DEFAULT_MIN_DOWNSAMPLE: f64 = 4.0;

/// Default upper bound on lazily generated threshold records
pub const DEFAULT_MAX_LEVELS: usize = 48;

/// How the downsample thresholds of a cache are produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdSchedule {
    /// Multiply from the minimum downsample by a step picked from the point
    /// count of the base shape (or by `step` when given)
    Geometric {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    /// Fixed list of thresholds
    Explicit { thresholds: Vec<f64> },
}

impl Default for ThresholdSchedule {
    fn default() -> Self {
        ThresholdSchedule::Geometric { step: None }
    }
}

/// Settings shared by every cache a registry creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    pub min_points: usize,
    pub min_downsample: f64,
    pub schedule: ThresholdSchedule,
    pub max_levels: usize,
    /// Snap/collapse passes per reduction; one more pass is rarely needed
    /// once spikes created by the first snap are removed
    pub precision_passes: usize,
    /// Union surviving polygons after snapping to resolve overlaps
    pub clean_topology: bool,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            min_points: DEFAULT_MIN_POINTS,
            min_downsample: DEFAULT_MIN_DOWNSAMPLE,
            schedule: ThresholdSchedule::default(),
            max_levels: DEFAULT_MAX_LEVELS,
            precision_passes: 2,
            clean_topology: true,
        }
    }
}

impl SimplifyConfig {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: SimplifyConfig = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Failed to parse simplification config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config '{}': {}", path.as_ref().display(), e)
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.min_downsample.is_finite() && self.min_downsample >= 1.0,
            "min_downsample must be a finite value >= 1, got {}",
            self.min_downsample
        );
        anyhow::ensure!(self.max_levels > 0, "max_levels must be at least 1");
        anyhow::ensure!(self.precision_passes > 0, "precision_passes must be at least 1");
        match &self.schedule {
            ThresholdSchedule::Geometric { step: Some(step) } => {
                anyhow::ensure!(
                    step.is_finite() && *step > 1.0,
                    "geometric step must be > 1, got {}",
                    step
                );
            }
            ThresholdSchedule::Geometric { step: None } => {}
            ThresholdSchedule::Explicit { thresholds } => {
                anyhow::ensure!(
                    thresholds.iter().any(|t| t.is_finite() && *t > self.min_downsample),
                    "explicit schedule needs at least one threshold above {}",
                    self.min_downsample
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimplifyConfig::from_json_str(r#"{ "min_points": 250 }"#).unwrap();
        assert_eq!(config.min_points, 250);
        assert_eq!(config.min_downsample, DEFAULT_MIN_DOWNSAMPLE);
        assert_eq!(config.schedule, ThresholdSchedule::Geometric { step: None });
    }

    #[test]
    fn test_explicit_schedule() {
        let json = r#"{ "schedule": { "kind": "explicit", "thresholds": [8, 16, 32] } }"#;
        let config = SimplifyConfig::from_json_str(json).unwrap();
        assert_eq!(
            config.schedule,
            ThresholdSchedule::Explicit { thresholds: vec![8.0, 16.0, 32.0] }
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(SimplifyConfig::from_json_str(r#"{ "min_downsample": 0.5 }"#).is_err());
        assert!(SimplifyConfig::from_json_str(
            r#"{ "schedule": { "kind": "geometric", "step": 1.0 } }"#
        )
        .is_err());
        assert!(SimplifyConfig::from_json_str(
            r#"{ "schedule": { "kind": "explicit", "thresholds": [1, 2] } }"#
        )
        .is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.json");
        std::fs::write(&path, r#"{ "clean_topology": false, "max_levels": 8 }"#).unwrap();

        let config = SimplifyConfig::from_file(&path).unwrap();
        assert!(!config.clean_topology);
        assert_eq!(config.max_levels, 8);

        assert!(SimplifyConfig::from_file(dir.path().join("missing.json")).is_err());
    }
}
