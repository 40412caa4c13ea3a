//! Daily metric snapshot consumed by the intelligence engine
//!
//! A [`MetricSnapshot`] holds one calendar day of wearable measurements for one
//! subject from one provider. Every measurement is optional: an absent field
//! means "not computable", never zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

/// Upper bound for any per-day minute count
pub const MINUTES_PER_DAY: u32 = 1440;

/// One day of validated measurements for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Subject identifier
    pub subject_id: String,

    /// Provider tag (e.g. "fitbit", "garmin")
    pub source: String,

    /// Calendar day the measurements belong to
    pub date: NaiveDate,

    #[serde(default)]
    pub cardiac: CardiacMetrics,

    #[serde(default)]
    pub sleep: SleepMetrics,

    #[serde(default)]
    pub respiratory: RespiratoryMetrics,

    #[serde(default)]
    pub activity: ActivityMetrics,

    #[serde(default)]
    pub nutrition: NutritionMetrics,
}

/// Heart rate variability and resting heart rate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardiacMetrics {
    /// Overnight HRV as RMSSD in milliseconds
    pub hrv_rmssd: Option<f64>,

    /// Personal HRV baseline (RMSSD, ms), typically a rolling average
    pub hrv_baseline: Option<f64>,

    /// Resting heart rate in beats per minute
    pub resting_heart_rate: Option<f64>,
}

/// Sleep duration and architecture for the night ending on the snapshot date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepMetrics {
    /// Total sleep time in minutes (excludes awake time)
    pub total_minutes: Option<u32>,

    /// Deep sleep in minutes
    pub deep_minutes: Option<u32>,

    /// REM sleep in minutes
    pub rem_minutes: Option<u32>,

    /// Sleep efficiency percentage (time asleep / time in bed)
    pub efficiency: Option<f64>,
}

/// Breathing rate and blood oxygen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespiratoryMetrics {
    /// Average breathing rate during sleep (breaths/min)
    pub breathing_rate: Option<f64>,

    /// Average blood-oxygen saturation (%)
    pub spo2: Option<f64>,
}

/// Daily activity counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetrics {
    /// Step count
    pub steps: Option<u32>,

    /// Active Zone Minutes, total and per zone
    pub active_zone_minutes: Option<ActiveZoneMinutes>,

    /// Calories burned over the day (kcal)
    pub calories_burned: Option<f64>,

    /// Minutes spent in each named heart-rate zone
    #[serde(default)]
    pub heart_rate_zones: Vec<HeartRateZoneMinutes>,

    /// Estimated VO2max (ml/kg/min)
    pub vo2_max: Option<f64>,
}

impl ActivityMetrics {
    /// Total Active Zone Minutes, if recorded
    pub fn azm_total(&self) -> Option<u32> {
        self.active_zone_minutes.as_ref().map(|azm| azm.total)
    }
}

/// Active Zone Minutes breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveZoneMinutes {
    pub total: u32,
    #[serde(default)]
    pub fat_burn: u32,
    #[serde(default)]
    pub cardio: u32,
    #[serde(default)]
    pub peak: u32,
}

/// Minutes spent in one named heart-rate zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateZoneMinutes {
    /// Zone name as reported by the provider ("Out of Range", "Fat Burn", ...)
    pub name: String,
    pub minutes: u32,
}

impl HeartRateZoneMinutes {
    pub fn new(name: impl Into<String>, minutes: u32) -> Self {
        Self {
            name: name.into(),
            minutes,
        }
    }
}

/// Optional nutrition log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionMetrics {
    /// Calories consumed (kcal)
    pub calories_consumed: Option<f64>,
}

impl MetricSnapshot {
    /// Create an empty snapshot with identity only
    pub fn new(subject_id: impl Into<String>, source: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            subject_id: subject_id.into(),
            source: source.into(),
            date,
            cardiac: CardiacMetrics::default(),
            sleep: SleepMetrics::default(),
            respiratory: RespiratoryMetrics::default(),
            activity: ActivityMetrics::default(),
            nutrition: NutritionMetrics::default(),
        }
    }

    pub fn with_hrv(mut self, rmssd: f64, baseline: Option<f64>) -> Self {
        self.cardiac.hrv_rmssd = Some(rmssd);
        self.cardiac.hrv_baseline = baseline;
        self
    }

    pub fn with_resting_heart_rate(mut self, bpm: f64) -> Self {
        self.cardiac.resting_heart_rate = Some(bpm);
        self
    }

    /// Set sleep totals: total, deep and REM minutes plus efficiency
    pub fn with_sleep(mut self, total: u32, deep: u32, rem: u32, efficiency: Option<f64>) -> Self {
        self.sleep = SleepMetrics {
            total_minutes: Some(total),
            deep_minutes: Some(deep),
            rem_minutes: Some(rem),
            efficiency,
        };
        self
    }

    pub fn with_breathing_rate(mut self, breaths_per_min: f64) -> Self {
        self.respiratory.breathing_rate = Some(breaths_per_min);
        self
    }

    pub fn with_spo2(mut self, percent: f64) -> Self {
        self.respiratory.spo2 = Some(percent);
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.activity.steps = Some(steps);
        self
    }

    pub fn with_active_zone_minutes(mut self, azm: ActiveZoneMinutes) -> Self {
        self.activity.active_zone_minutes = Some(azm);
        self
    }

    pub fn with_calories_burned(mut self, kcal: f64) -> Self {
        self.activity.calories_burned = Some(kcal);
        self
    }

    pub fn with_heart_rate_zones(mut self, zones: Vec<HeartRateZoneMinutes>) -> Self {
        self.activity.heart_rate_zones = zones;
        self
    }

    pub fn with_vo2_max(mut self, vo2_max: f64) -> Self {
        self.activity.vo2_max = Some(vo2_max);
        self
    }

    pub fn with_calories_consumed(mut self, kcal: f64) -> Self {
        self.nutrition.calories_consumed = Some(kcal);
        self
    }

    /// Reject structurally unusable snapshots
    ///
    /// The date is enforced by the type system, so the subject id is the only
    /// identity field that needs checking here.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.subject_id.trim().is_empty() {
            return Err(SnapshotError::MissingSubjectId);
        }
        Ok(())
    }

    /// List every field the engine will ignore because it is out of range
    ///
    /// These are not errors: scoring proceeds and the affected factors are
    /// reported as missing.
    pub fn range_violations(&self) -> Vec<SnapshotError> {
        let mut issues = Vec::new();

        let non_negative = [
            ("hrv_rmssd", self.cardiac.hrv_rmssd),
            ("hrv_baseline", self.cardiac.hrv_baseline),
            ("resting_heart_rate", self.cardiac.resting_heart_rate),
            ("breathing_rate", self.respiratory.breathing_rate),
            ("calories_burned", self.activity.calories_burned),
            ("vo2_max", self.activity.vo2_max),
            ("calories_consumed", self.nutrition.calories_consumed),
        ];
        for (field, value) in non_negative {
            check_non_negative(field, value, &mut issues);
        }

        for (field, value) in [
            ("sleep_efficiency", self.sleep.efficiency),
            ("spo2", self.respiratory.spo2),
        ] {
            check_percent(field, value, &mut issues);
        }

        if let Some(total) = self.sleep.total_minutes {
            if total > MINUTES_PER_DAY {
                issues.push(SnapshotError::SleepExceedsDay { minutes: total });
            }

            for (stage, minutes) in [("deep", self.sleep.deep_minutes), ("REM", self.sleep.rem_minutes)] {
                if let Some(minutes) = minutes {
                    if minutes > total {
                        issues.push(SnapshotError::StageExceedsTotal {
                            stage,
                            minutes,
                            total,
                        });
                    }
                }
            }

            if let (Some(deep), Some(rem)) = (self.sleep.deep_minutes, self.sleep.rem_minutes) {
                if deep <= total && rem <= total && u64::from(deep) + u64::from(rem) > u64::from(total) {
                    issues.push(SnapshotError::StagesExceedTotal { deep, rem, total });
                }
            }
        }

        issues
    }
}

fn check_non_negative(field: &'static str, value: Option<f64>, issues: &mut Vec<SnapshotError>) {
    match value {
        Some(v) if !v.is_finite() => issues.push(SnapshotError::NonFinite { field }),
        Some(v) if v < 0.0 => issues.push(SnapshotError::NegativeValue { field, value: v }),
        _ => {}
    }
}

fn check_percent(field: &'static str, value: Option<f64>, issues: &mut Vec<SnapshotError>) {
    match value {
        Some(v) if !v.is_finite() => issues.push(SnapshotError::NonFinite { field }),
        Some(v) if !(0.0..=100.0).contains(&v) => {
            issues.push(SnapshotError::PercentOutOfRange { field, value: v })
        }
        _ => {}
    }
}
