//! Threshold configuration and violation detection.
//!
//! Loads threshold policies from TOML and checks diff reports
//! for violations.
//!
//! ```toml
//! [calls]
//! max_increase_percent = 10.0
//!
//! [net_time]
//! max_increase_absolute = 5000
//!
//! [hot_paths]
//! warn_individual_increase_percent = 25.0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::schema::{DiffReport, DiffSummary, HotPathsDelta, MetricDelta, ThresholdViolation};
use super::DiffError;

/// Complete threshold configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ThresholdConfig {
    /// Inclusive call count thresholds
    #[serde(default)]
    pub calls: MetricThresholds,

    /// Inclusive net time thresholds
    #[serde(default)]
    pub net_time: MetricThresholds,

    /// Hot path thresholds (optional)
    #[serde(default)]
    pub hot_paths: Option<HotPathThresholds>,
}

/// Limits on the growth of one scalar metric
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricThresholds {
    pub max_increase_percent: Option<f64>,

    pub max_increase_absolute: Option<u64>,
}

/// Hot path thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HotPathThresholds {
    /// Warn if any single hot path's self time increases by more than this percentage
    pub warn_individual_increase_percent: Option<f64>,
}

impl ThresholdConfig {
    pub fn is_empty(&self) -> bool {
        self.calls.max_increase_percent.is_none()
            && self.calls.max_increase_absolute.is_none()
            && self.net_time.max_increase_percent.is_none()
            && self.net_time.max_increase_absolute.is_none()
            && self
                .hot_paths
                .as_ref()
                .map_or(true, |hp| hp.warn_individual_increase_percent.is_none())
    }
}

/// Load thresholds from a TOML file
///
/// # Errors
/// * `DiffError::IoError` - If file cannot be read
/// * `DiffError::ThresholdParseFailed` - If TOML is invalid
/// * `DiffError::InvalidThresholds` - If a limit is negative
pub fn load_thresholds(path: impl AsRef<Path>) -> Result<ThresholdConfig, DiffError> {
    let contents = fs::read_to_string(path)?;
    parse_thresholds(&contents)
}

/// Parse thresholds from TOML text
pub fn parse_thresholds(contents: &str) -> Result<ThresholdConfig, DiffError> {
    let config: ThresholdConfig = toml::from_str(contents)?;

    let percents = [
        ("calls.max_increase_percent", config.calls.max_increase_percent),
        ("net_time.max_increase_percent", config.net_time.max_increase_percent),
        (
            "hot_paths.warn_individual_increase_percent",
            config
                .hot_paths
                .as_ref()
                .and_then(|hp| hp.warn_individual_increase_percent),
        ),
    ];
    for (name, value) in percents {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(DiffError::InvalidThresholds(format!(
                    "{} must be a non-negative number, got {}",
                    name, v
                )));
            }
        }
    }

    Ok(config)
}

/// Check a diff report against thresholds and update violations
///
/// # Returns
/// Vector of violations (also updates diff.threshold_violations and diff.summary)
pub fn check_thresholds(diff: &mut DiffReport, config: &ThresholdConfig) -> Vec<ThresholdViolation> {
    let mut violations = Vec::new();

    check_metric("calls", &diff.deltas.calls, &config.calls, &mut violations);
    check_metric("net_time", &diff.deltas.net_time, &config.net_time, &mut violations);

    if let Some(hp_thresholds) = &config.hot_paths {
        check_hot_path_thresholds(&diff.deltas.hot_paths, hp_thresholds, &mut violations);
    }

    diff.threshold_violations = violations.clone();
    diff.summary = create_summary(&violations, diff.summary.warning.take());

    violations
}

fn check_metric(
    name: &str,
    delta: &MetricDelta,
    thresholds: &MetricThresholds,
    violations: &mut Vec<ThresholdViolation>,
) {
    if let Some(max_percent) = thresholds.max_increase_percent {
        if delta.percent_change > max_percent {
            violations.push(ThresholdViolation {
                metric: format!("{}.max_increase_percent", name),
                threshold: max_percent,
                actual: delta.percent_change,
                severity: "error".to_string(),
            });
        }
    }

    if let Some(max_absolute) = thresholds.max_increase_absolute {
        if delta.absolute_change > 0 && delta.absolute_change as u64 > max_absolute {
            violations.push(ThresholdViolation {
                metric: format!("{}.max_increase_absolute", name),
                threshold: max_absolute as f64,
                actual: delta.absolute_change as f64,
                severity: "error".to_string(),
            });
        }
    }
}

fn check_hot_path_thresholds(
    hot_paths_delta: &HotPathsDelta,
    thresholds: &HotPathThresholds,
    violations: &mut Vec<ThresholdViolation>,
) {
    if let Some(max_percent) = thresholds.warn_individual_increase_percent {
        for comparison in &hot_paths_delta.common_paths {
            if comparison.percent_change > max_percent {
                violations.push(ThresholdViolation {
                    metric: format!("hot_paths.{}", comparison.stack),
                    threshold: max_percent,
                    actual: comparison.percent_change,
                    severity: "warning".to_string(),
                });
            }
        }
    }
}

fn create_summary(violations: &[ThresholdViolation], warning: Option<String>) -> DiffSummary {
    let error_count = violations.iter().filter(|v| v.severity == "error").count();
    let warning_count = violations.iter().filter(|v| v.severity == "warning").count();

    let status = if error_count > 0 {
        "FAILED"
    } else if warning_count > 0 {
        "WARNING"
    } else {
        "PASSED"
    };

    DiffSummary {
        has_regressions: error_count > 0,
        violation_count: violations.len(),
        status: status.to_string(),
        warning,
    }
}
