//! Factor scorers
//!
//! Every scorer maps one raw metric (or one tightly related pair) to a 0-100
//! sub-score. Scorers are pure and independent of each other. When a required
//! input is absent, negative, non-finite or physically impossible the scorer
//! returns `None`, so callers can tell "not computable" from "computed low".

pub mod bands;

use serde::{Deserialize, Serialize};
use std::fmt;

use bands::*;

use crate::models::MINUTES_PER_DAY;

/// Identifies a factor within a composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    Hrv,
    RestingHeartRate,
    SleepDuration,
    SleepQuality,
    BreathingRate,
    Spo2,
    PriorRecovery,
    TrainingLoad,
    SleepDebt,
    MuscleReadiness,
    Activity,
    SleepHealth,
    HeartHealth,
    Stress,
    NutritionBalance,
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FactorKind::Hrv => "HRV",
            FactorKind::RestingHeartRate => "Resting HR",
            FactorKind::SleepDuration => "Sleep Duration",
            FactorKind::SleepQuality => "Sleep Quality",
            FactorKind::BreathingRate => "Breathing Rate",
            FactorKind::Spo2 => "SpO2",
            FactorKind::PriorRecovery => "Recovery",
            FactorKind::TrainingLoad => "Training Load",
            FactorKind::SleepDebt => "Sleep Debt",
            FactorKind::MuscleReadiness => "Muscle Readiness",
            FactorKind::Activity => "Activity",
            FactorKind::SleepHealth => "Sleep Health",
            FactorKind::HeartHealth => "Heart Health",
            FactorKind::Stress => "Stress",
            FactorKind::NutritionBalance => "Nutrition Balance",
        };
        write!(f, "{}", name)
    }
}

/// Annotation a scorer can attach to its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorFlag {
    /// Value is in a range that warrants medical attention (SpO2 < 90%)
    MedicalConcern,
    /// HRV was scored against a personal baseline rather than population bands
    BaselineRelative,
}

/// Output of a single scorer, before a composite assigns it a weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    /// Primary raw input the score was derived from
    pub raw_value: f64,
    /// Sub-score in [0, 100]
    pub score: f64,
    pub flag: Option<FactorFlag>,
}

impl FactorScore {
    fn new(raw_value: f64, score: f64) -> Self {
        Self {
            raw_value,
            score: score.clamp(0.0, 100.0),
            flag: None,
        }
    }

    fn flagged(mut self, flag: FactorFlag) -> Self {
        self.flag = Some(flag);
        self
    }

    /// Attach the composite weight this factor carries
    pub fn weighted(self, kind: FactorKind, weight: f64) -> FactorResult {
        FactorResult {
            kind,
            raw_value: self.raw_value,
            score: self.score,
            weight,
            effective_weight: weight,
            flag: self.flag,
        }
    }
}

/// A present factor as it contributed to a composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorResult {
    pub kind: FactorKind,
    pub raw_value: f64,
    /// Sub-score in [0, 100]
    pub score: f64,
    /// Declared weight within the composite
    pub weight: f64,
    /// Weight after renormalizing over the factors that were present
    pub effective_weight: f64,
    pub flag: Option<FactorFlag>,
}

/// Collection of factor scoring functions
pub struct FactorScorer;

impl FactorScorer {
    /// HRV recovery factor
    ///
    /// With a positive personal baseline the score is 50 plus the percent
    /// deviation from baseline, clamped to 0-100. Otherwise population bands
    /// apply: 80ms+ scores 100, falling linearly through 60/40/25ms.
    pub fn hrv(rmssd: Option<f64>, baseline: Option<f64>) -> Option<FactorScore> {
        let rmssd = usable(rmssd)?;

        if let Some(baseline) = usable(baseline).filter(|b| *b > 0.0) {
            let deviation_pct = (rmssd - baseline) / baseline * 100.0;
            return Some(
                FactorScore::new(rmssd, HRV_BASELINE_NEUTRAL + deviation_pct)
                    .flagged(FactorFlag::BaselineRelative),
            );
        }

        let score = if rmssd >= HRV_FULL_SCORE_MS {
            100.0
        } else {
            score_linear(rmssd, HRV_POPULATION_BANDS)?
        };
        Some(FactorScore::new(rmssd, score))
    }

    /// Resting heart rate, inverse relationship
    pub fn resting_heart_rate(bpm: Option<f64>) -> Option<FactorScore> {
        let bpm = positive(bpm)?;
        Some(FactorScore::new(
            bpm,
            score_ceiling(bpm, RESTING_HR_BANDS, RESTING_HR_FLOOR_SCORE),
        ))
    }

    /// Total sleep duration; raw value is hours
    pub fn sleep_duration(total_minutes: Option<u32>) -> Option<FactorScore> {
        let hours = f64::from(sleep_minutes(total_minutes)?) / 60.0;
        let score = if hours < SLEEP_SHORT_HOURS {
            SLEEP_SHORT_SCORE * hours / SLEEP_SHORT_HOURS
        } else {
            score_range(hours, SLEEP_DURATION_BANDS, SLEEP_SHORT_SCORE)
        };
        Some(FactorScore::new(hours, score))
    }

    /// Restorative share of sleep; raw value is (deep + REM) / total in percent
    ///
    /// Needs all three inputs, a non-zero total, and deep plus REM that fit inside it.
    pub fn sleep_quality(
        total_minutes: Option<u32>,
        deep_minutes: Option<u32>,
        rem_minutes: Option<u32>,
    ) -> Option<FactorScore> {
        let total = sleep_minutes(total_minutes).filter(|t| *t > 0)?;
        let restorative = u64::from(deep_minutes?) + u64::from(rem_minutes?);
        if restorative > u64::from(total) {
            return None;
        }

        let ratio = restorative as f64 / f64::from(total);
        let lowest = SLEEP_QUALITY_BANDS[SLEEP_QUALITY_BANDS.len() - 1];
        let score = score_floor(
            ratio,
            SLEEP_QUALITY_BANDS,
            lowest.score * ratio / lowest.lower,
        );
        Some(FactorScore::new(ratio * 100.0, score))
    }

    /// Sleep efficiency percentage
    pub fn sleep_efficiency(efficiency: Option<f64>) -> Option<FactorScore> {
        let efficiency = percent(efficiency)?;
        let lowest = SLEEP_EFFICIENCY_BANDS[SLEEP_EFFICIENCY_BANDS.len() - 1];
        let score = score_floor(
            efficiency,
            SLEEP_EFFICIENCY_BANDS,
            lowest.score * efficiency / lowest.lower,
        );
        Some(FactorScore::new(efficiency, score))
    }

    /// Breathing rate, best at 12-16 breaths/min
    pub fn breathing_rate(breaths_per_min: Option<f64>) -> Option<FactorScore> {
        let rate = positive(breaths_per_min)?;
        Some(FactorScore::new(
            rate,
            score_range(rate, BREATHING_RATE_BANDS, BREATHING_RATE_FLOOR_SCORE),
        ))
    }

    /// Blood oxygen saturation; below 90% is floored and flagged
    pub fn spo2(saturation: Option<f64>) -> Option<FactorScore> {
        let saturation = percent(saturation)?;
        let score = score_floor(saturation, SPO2_BANDS, SPO2_CONCERN_SCORE);
        let result = FactorScore::new(saturation, score);

        let concern_threshold = SPO2_BANDS[SPO2_BANDS.len() - 1].lower;
        if saturation < concern_threshold {
            Some(result.flagged(FactorFlag::MedicalConcern))
        } else {
            Some(result)
        }
    }

    /// Previously computed Recovery score used as an input to Performance
    pub fn prior_recovery(recovery_score: Option<u8>) -> Option<FactorScore> {
        let score = f64::from(recovery_score?);
        Some(FactorScore::new(score, score))
    }

    /// Active Zone Minutes as training load
    pub fn training_load(azm_total: Option<u32>) -> Option<FactorScore> {
        let azm = f64::from(azm_total?);
        Some(FactorScore::new(
            azm,
            score_range(azm, TRAINING_LOAD_BANDS, TRAINING_LOAD_FLOOR_SCORE),
        ))
    }

    /// Hours of sleep short of `baseline_hours`; raw value is the debt in hours
    pub fn sleep_debt(total_minutes: Option<u32>, baseline_hours: f64) -> Option<FactorScore> {
        let hours = f64::from(sleep_minutes(total_minutes)?) / 60.0;
        let debt = baseline_hours - hours;
        Some(FactorScore::new(
            debt,
            score_ceiling(debt, SLEEP_DEBT_BANDS, SLEEP_DEBT_FLOOR_SCORE),
        ))
    }

    /// Calories burned as a proxy for muscular fatigue
    pub fn muscle_readiness(calories_burned: Option<f64>) -> Option<FactorScore> {
        let kcal = usable(calories_burned)?;
        Some(FactorScore::new(
            kcal,
            score_floor(kcal, MUSCLE_READINESS_BANDS, MUSCLE_READINESS_FRESH_SCORE),
        ))
    }

    /// Steps and active minutes, each worth half
    ///
    /// When only one half is available it stands alone rather than being
    /// averaged with zero. Raw value is the step count when present.
    pub fn activity(steps: Option<u32>, active_minutes: Option<u32>) -> Option<FactorScore> {
        let steps_score = steps.map(|s| (f64::from(s) / STEPS_TARGET * 100.0).clamp(0.0, 100.0));
        let minutes_score = active_minutes
            .map(|m| (f64::from(m) / ACTIVE_MINUTES_TARGET * 100.0).clamp(0.0, 100.0));

        let score = mean_of_present(&[steps_score, minutes_score])?;
        let raw = steps.or(active_minutes).map(f64::from)?;
        Some(FactorScore::new(raw, score))
    }

    /// Sleep duration and efficiency averaged over whichever are present
    pub fn sleep_health(total_minutes: Option<u32>, efficiency: Option<f64>) -> Option<FactorScore> {
        let duration = Self::sleep_duration(total_minutes);
        let efficiency = Self::sleep_efficiency(efficiency);

        let score = mean_of_present(&[duration.map(|d| d.score), efficiency.map(|e| e.score)])?;
        let raw = duration.or(efficiency).map(|f| f.raw_value)?;
        Some(FactorScore::new(raw, score))
    }

    /// Resting HR and VO2max sub-bands averaged over whichever are present
    pub fn heart_health(resting_hr: Option<f64>, vo2_max: Option<f64>) -> Option<FactorScore> {
        let resting_hr = positive(resting_hr);
        let vo2_max = usable(vo2_max);

        let rhr_score = resting_hr
            .map(|bpm| score_ceiling(bpm, HEART_HEALTH_RHR_BANDS, HEART_HEALTH_RHR_FLOOR_SCORE));
        let vo2_score = vo2_max.map(|v| score_floor(v, VO2MAX_BANDS, VO2MAX_FLOOR_SCORE));

        let score = mean_of_present(&[rhr_score, vo2_score])?;
        let raw = resting_hr.or(vo2_max)?;
        Some(FactorScore::new(raw, score))
    }

    /// HRV framed as low physiological stress
    pub fn stress(rmssd: Option<f64>) -> Option<FactorScore> {
        let rmssd = usable(rmssd)?;
        Some(FactorScore::new(
            rmssd,
            score_floor(rmssd, STRESS_BANDS, STRESS_FLOOR_SCORE),
        ))
    }

    /// Energy balance; raw value is burned minus consumed (positive = deficit)
    pub fn nutrition_balance(
        calories_burned: Option<f64>,
        calories_consumed: Option<f64>,
    ) -> Option<FactorScore> {
        let balance = usable(calories_burned)? - usable(calories_consumed)?;
        Some(FactorScore::new(
            balance,
            score_range(balance, NUTRITION_BALANCE_BANDS, NUTRITION_SURPLUS_SCORE),
        ))
    }
}

/// Sleep longer than a day cannot be scored
fn sleep_minutes(total_minutes: Option<u32>) -> Option<u32> {
    total_minutes.filter(|m| *m <= MINUTES_PER_DAY)
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn percent(value: Option<f64>) -> Option<f64> {
    usable(value).filter(|v| *v <= 100.0)
}

fn mean_of_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(result: Option<FactorScore>) -> f64 {
        result.expect("factor should be computable").score
    }

    #[test]
    fn test_hrv_population_scoring() {
        assert_eq!(score(FactorScorer::hrv(Some(80.0), None)), 100.0);
        assert_eq!(score(FactorScorer::hrv(Some(120.0), None)), 100.0);
        assert!((score(FactorScorer::hrv(Some(70.0), None)) - 90.0).abs() < 1e-9);
        assert!((score(FactorScorer::hrv(Some(50.0), None)) - 70.0).abs() < 1e-9);
        assert!((score(FactorScorer::hrv(Some(10.0), None)) - 16.0).abs() < 1e-9);
        assert_eq!(FactorScorer::hrv(Some(70.0), None).unwrap().flag, None);
    }

    #[test]
    fn test_hrv_baseline_scoring() {
        let at_baseline = FactorScorer::hrv(Some(50.0), Some(50.0)).unwrap();
        assert_eq!(at_baseline.score, 50.0);
        assert_eq!(at_baseline.flag, Some(FactorFlag::BaselineRelative));

        assert!((score(FactorScorer::hrv(Some(60.0), Some(50.0))) - 70.0).abs() < 1e-9);
        assert!((score(FactorScorer::hrv(Some(40.0), Some(50.0))) - 30.0).abs() < 1e-9);
        assert_eq!(score(FactorScorer::hrv(Some(150.0), Some(50.0))), 100.0);
        assert_eq!(score(FactorScorer::hrv(Some(10.0), Some(50.0))), 0.0);

        // A zero baseline falls back to population bands
        let fallback = FactorScorer::hrv(Some(80.0), Some(0.0)).unwrap();
        assert_eq!(fallback.score, 100.0);
        assert_eq!(fallback.flag, None);
    }

    #[test]
    fn test_missing_inputs_are_not_computable() {
        assert!(FactorScorer::hrv(None, Some(50.0)).is_none());
        assert!(FactorScorer::hrv(Some(-5.0), None).is_none());
        assert!(FactorScorer::hrv(Some(f64::NAN), None).is_none());
        assert!(FactorScorer::resting_heart_rate(None).is_none());
        assert!(FactorScorer::resting_heart_rate(Some(0.0)).is_none());
        assert!(FactorScorer::sleep_duration(None).is_none());
        assert!(FactorScorer::sleep_quality(Some(0), Some(0), Some(0)).is_none());
        assert!(FactorScorer::sleep_quality(Some(400), None, Some(90)).is_none());
        assert!(FactorScorer::spo2(Some(104.0)).is_none());
        assert!(FactorScorer::sleep_efficiency(Some(-1.0)).is_none());
        assert!(FactorScorer::activity(None, None).is_none());
        assert!(FactorScorer::heart_health(None, None).is_none());
        assert!(FactorScorer::nutrition_balance(Some(2200.0), None).is_none());
        assert!(FactorScorer::prior_recovery(None).is_none());
    }

    #[test]
    fn test_low_score_is_distinct_from_missing() {
        let low = FactorScorer::resting_heart_rate(Some(95.0));
        assert_eq!(low.map(|f| f.score), Some(0.0));
        assert!(FactorScorer::resting_heart_rate(None).is_none());
    }

    #[test]
    fn test_sleep_duration_scoring() {
        assert_eq!(score(FactorScorer::sleep_duration(Some(480))), 100.0);
        assert_eq!(score(FactorScorer::sleep_duration(Some(390))), 80.0);
        assert_eq!(score(FactorScorer::sleep_duration(Some(570))), 90.0);
        assert_eq!(score(FactorScorer::sleep_duration(Some(330))), 60.0);
        assert_eq!(score(FactorScorer::sleep_duration(Some(660))), 70.0);
        assert!((score(FactorScorer::sleep_duration(Some(240))) - 48.0).abs() < 1e-9);
        assert_eq!(score(FactorScorer::sleep_duration(Some(0))), 0.0);
    }

    #[test]
    fn test_sleep_quality_scoring() {
        // 216/480 = 45%
        let optimal = FactorScorer::sleep_quality(Some(480), Some(96), Some(120)).unwrap();
        assert_eq!(optimal.score, 100.0);
        assert!((optimal.raw_value - 45.0).abs() < 1e-9);

        assert_eq!(score(FactorScorer::sleep_quality(Some(400), Some(60), Some(80))), 80.0);
        assert_eq!(score(FactorScorer::sleep_quality(Some(400), Some(50), Some(60))), 60.0);
        // 10% restorative: 60 * 0.10 / 0.25 = 24
        assert!((score(FactorScorer::sleep_quality(Some(400), Some(20), Some(20))) - 24.0).abs() < 1e-9);
        // Stages exceeding the total are rejected
        assert!(FactorScorer::sleep_quality(Some(400), Some(300), Some(200)).is_none());
    }

    #[test]
    fn test_sleep_quality_huge_stages() {
        // Each stage fits on its own but together they exceed the total
        assert!(FactorScorer::sleep_quality(Some(1000), Some(600), Some(600)).is_none());
        let max = Some(u32::MAX);
        assert!(FactorScorer::sleep_quality(max, Some(u32::MAX - 1), Some(u32::MAX - 1)).is_none());
        assert!(FactorScorer::sleep_quality(Some(1400), Some(u32::MAX), Some(u32::MAX)).is_none());
    }

    #[test]
    fn test_sleep_longer_than_a_day_is_not_computable() {
        assert!(FactorScorer::sleep_duration(Some(MINUTES_PER_DAY + 1)).is_none());
        assert!(FactorScorer::sleep_debt(Some(u32::MAX), 8.0).is_none());
        assert!(FactorScorer::sleep_health(Some(2000), None).is_none());
        assert_eq!(score(FactorScorer::sleep_duration(Some(MINUTES_PER_DAY))), 70.0);
    }

    #[test]
    fn test_spo2_medical_flag() {
        let normal = FactorScorer::spo2(Some(97.0)).unwrap();
        assert_eq!(normal.score, 100.0);
        assert_eq!(normal.flag, None);

        let low = FactorScorer::spo2(Some(88.0)).unwrap();
        assert_eq!(low.score, 20.0);
        assert_eq!(low.flag, Some(FactorFlag::MedicalConcern));

        let borderline = FactorScorer::spo2(Some(90.0)).unwrap();
        assert_eq!(borderline.score, 50.0);
        assert_eq!(borderline.flag, None);
    }

    #[test]
    fn test_activity_scoring() {
        assert_eq!(score(FactorScorer::activity(Some(10_000), Some(30))), 100.0);
        assert_eq!(score(FactorScorer::activity(Some(20_000), Some(90))), 100.0);
        assert_eq!(score(FactorScorer::activity(Some(5_000), Some(30))), 75.0);
        assert_eq!(score(FactorScorer::activity(Some(5_000), None)), 50.0);
        assert_eq!(score(FactorScorer::activity(None, Some(15))), 50.0);

        let result = FactorScorer::activity(Some(7_500), Some(10)).unwrap();
        assert_eq!(result.raw_value, 7_500.0);
    }

    #[test]
    fn test_performance_factors() {
        assert_eq!(score(FactorScorer::training_load(Some(30))), 100.0);
        assert_eq!(score(FactorScorer::training_load(Some(5))), 80.0);
        assert_eq!(score(FactorScorer::training_load(Some(200))), 40.0);

        assert_eq!(score(FactorScorer::sleep_debt(Some(510), 8.0)), 100.0);
        assert_eq!(score(FactorScorer::sleep_debt(Some(450), 8.0)), 90.0);
        assert_eq!(score(FactorScorer::sleep_debt(Some(420), 8.0)), 80.0);
        assert_eq!(score(FactorScorer::sleep_debt(Some(240), 8.0)), 25.0);
        let debt = FactorScorer::sleep_debt(Some(420), 8.0).unwrap();
        assert!((debt.raw_value - 1.0).abs() < 1e-9);

        assert_eq!(score(FactorScorer::muscle_readiness(Some(1800.0))), 100.0);
        assert_eq!(score(FactorScorer::muscle_readiness(Some(4200.0))), 40.0);

        assert_eq!(score(FactorScorer::prior_recovery(Some(72))), 72.0);
    }

    #[test]
    fn test_wellness_factors() {
        assert_eq!(score(FactorScorer::heart_health(Some(48.0), Some(52.0))), 100.0);
        assert_eq!(score(FactorScorer::heart_health(Some(65.0), None)), 70.0);
        assert_eq!(score(FactorScorer::heart_health(None, Some(42.0))), 80.0);
        assert_eq!(score(FactorScorer::heart_health(Some(75.0), Some(33.0))), 57.5);

        assert_eq!(score(FactorScorer::stress(Some(75.0))), 100.0);
        assert_eq!(score(FactorScorer::stress(Some(40.0))), 70.0);
        assert_eq!(score(FactorScorer::stress(Some(10.0))), 30.0);

        assert_eq!(score(FactorScorer::nutrition_balance(Some(2400.0), Some(2300.0))), 100.0);
        assert_eq!(score(FactorScorer::nutrition_balance(Some(2600.0), Some(2200.0))), 85.0);
        assert_eq!(score(FactorScorer::nutrition_balance(Some(2000.0), Some(3000.0))), 50.0);

        assert_eq!(score(FactorScorer::sleep_health(Some(480), Some(90.0))), 100.0);
        assert_eq!(score(FactorScorer::sleep_health(Some(390), Some(70.0))), 70.0);
        assert_eq!(score(FactorScorer::sleep_health(None, Some(80.0))), 80.0);
    }

    #[test]
    fn test_factor_kind_display() {
        assert_eq!(FactorKind::Hrv.to_string(), "HRV");
        assert_eq!(FactorKind::NutritionBalance.to_string(), "Nutrition Balance");
    }
}
