//! Multi-day trend analysis
//!
//! The window is split at its midpoint; each tracked metric compares the mean
//! of its present values in the late half against the early half.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;
use tracing::debug;

use crate::composite::CompositeCalculator;
use crate::config::RecoveryWeights;
use crate::models::{MetricSnapshot, MINUTES_PER_DAY};

/// Metrics tracked across the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    Steps,
    SleepMinutes,
    Hrv,
    RestingHeartRate,
    Recovery,
}

impl TrendMetric {
    pub const ALL: [TrendMetric; 5] = [
        TrendMetric::Steps,
        TrendMetric::SleepMinutes,
        TrendMetric::Hrv,
        TrendMetric::RestingHeartRate,
        TrendMetric::Recovery,
    ];

    /// Whether an increase counts as improvement
    pub fn higher_is_better(&self) -> bool {
        !matches!(self, TrendMetric::RestingHeartRate)
    }
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrendMetric::Steps => "Steps",
            TrendMetric::SleepMinutes => "Sleep",
            TrendMetric::Hrv => "HRV",
            TrendMetric::RestingHeartRate => "Resting HR",
            TrendMetric::Recovery => "Recovery",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Improving => write!(f, "Improving"),
            TrendDirection::Declining => write!(f, "Declining"),
            TrendDirection::Stable => write!(f, "Stable"),
        }
    }
}

/// Trend of a single metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrend {
    pub metric: TrendMetric,
    pub direction: TrendDirection,
    /// Mean of present values in the early half
    pub early_mean: Option<f64>,
    /// Mean of present values in the late half
    pub late_mean: Option<f64>,
    /// Relative change of the late mean against the early mean
    pub change_percent: Option<f64>,
}

/// Trends for every tracked metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    /// Number of snapshots in the analysed window
    pub window_size: usize,
    pub trends: Vec<MetricTrend>,
}

impl TrendReport {
    pub fn get(&self, metric: TrendMetric) -> Option<&MetricTrend> {
        self.trends.iter().find(|t| t.metric == metric)
    }

    pub fn direction(&self, metric: TrendMetric) -> TrendDirection {
        self.get(metric)
            .map_or(TrendDirection::Stable, |t| t.direction)
    }
}

/// Build the trend window for `current`
///
/// Keeps history entries for the same subject dated strictly before the
/// current snapshot, orders them oldest first and appends the current snapshot.
pub fn trend_window<'a>(
    current: &'a MetricSnapshot,
    history: &'a [MetricSnapshot],
) -> Vec<&'a MetricSnapshot> {
    let mut window: Vec<&MetricSnapshot> = history
        .iter()
        .filter(|s| s.subject_id == current.subject_id && s.date < current.date)
        .collect();
    window.sort_by_key(|s| s.date);
    window.push(current);
    window
}

/// Trend analyzer
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    threshold_percent: f64,
    recovery_weights: RecoveryWeights,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(5.0, RecoveryWeights::default())
    }
}

impl TrendAnalyzer {
    pub fn new(threshold_percent: f64, recovery_weights: RecoveryWeights) -> Self {
        Self {
            threshold_percent,
            recovery_weights,
        }
    }

    /// Analyze an oldest-first window of snapshots for one subject
    pub fn analyze(&self, window: &[&MetricSnapshot]) -> TrendReport {
        let midpoint = window.len() / 2;
        let (early, late) = window.split_at(midpoint);

        let trends = TrendMetric::ALL
            .iter()
            .map(|&metric| {
                let early_values = self.values(metric, early);
                let late_values = self.values(metric, late);
                self.metric_trend(metric, &early_values, &late_values)
            })
            .collect();

        let report = TrendReport {
            window_size: window.len(),
            trends,
        };

        debug!(window = report.window_size, "Trends analyzed");
        report
    }

    fn values(&self, metric: TrendMetric, snapshots: &[&MetricSnapshot]) -> Vec<f64> {
        snapshots
            .iter()
            .filter_map(|s| self.metric_value(metric, s))
            .collect()
    }

    fn metric_value(&self, metric: TrendMetric, snapshot: &MetricSnapshot) -> Option<f64> {
        match metric {
            TrendMetric::Steps => snapshot.activity.steps.map(f64::from),
            TrendMetric::SleepMinutes => snapshot
                .sleep
                .total_minutes
                .filter(|m| *m <= MINUTES_PER_DAY)
                .map(f64::from),
            TrendMetric::Hrv => snapshot
                .cardiac
                .hrv_rmssd
                .filter(|v| v.is_finite() && *v >= 0.0),
            TrendMetric::RestingHeartRate => snapshot
                .cardiac
                .resting_heart_rate
                .filter(|v| v.is_finite() && *v > 0.0),
            TrendMetric::Recovery => {
                CompositeCalculator::recovery(snapshot, &self.recovery_weights)
                    .value()
                    .map(f64::from)
            }
        }
    }

    fn metric_trend(&self, metric: TrendMetric, early: &[f64], late: &[f64]) -> MetricTrend {
        if early.is_empty() || late.is_empty() {
            return MetricTrend {
                metric,
                direction: TrendDirection::Stable,
                early_mean: None,
                late_mean: None,
                change_percent: None,
            };
        }

        let early_mean = early.iter().mean();
        let late_mean = late.iter().mean();

        let change_percent = if early_mean.abs() > f64::EPSILON {
            Some((late_mean - early_mean) / early_mean.abs() * 100.0)
        } else {
            None
        };

        let rising = match change_percent {
            Some(change) if change > self.threshold_percent => Some(true),
            Some(change) if change < -self.threshold_percent => Some(false),
            Some(_) => None,
            // Flat zero baseline: any positive late mean is a rise
            None if late_mean > 0.0 => Some(true),
            None => None,
        };

        let direction = match rising {
            Some(up) if up == metric.higher_is_better() => TrendDirection::Improving,
            Some(_) => TrendDirection::Declining,
            None => TrendDirection::Stable,
        };

        MetricTrend {
            metric,
            direction,
            early_mean: Some(early_mean),
            late_mean: Some(late_mean),
            change_percent,
        }
    }
}
