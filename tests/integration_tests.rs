use chrono::{Duration, NaiveDate};
use rust_decimal_macros::dec;
use vitalrs::models::{ActiveZoneMinutes, HeartRateZoneMinutes, MetricSnapshot};
use vitalrs::{
    ExerciseCategory, FactorKind, Grade, IntelligenceEngine, RecommendationKind, Status,
    StrainLevel, TrendDirection, TrendMetric,
};

/// Integration tests that exercise the engine end to end

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn base_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()
    }

    fn empty_snapshot() -> MetricSnapshot {
        MetricSnapshot::new("athlete-1", "fitbit", base_date())
    }

    fn ideal_snapshot() -> MetricSnapshot {
        empty_snapshot()
            .with_hrv(80.0, None)
            .with_resting_heart_rate(45.0)
            .with_sleep(480, 100, 120, Some(93.0))
            .with_breathing_rate(14.0)
            .with_spo2(97.0)
    }

    fn history_with_steps(steps: &[u32]) -> Vec<MetricSnapshot> {
        let days = steps.len() as i64;
        steps
            .iter()
            .enumerate()
            .map(|(i, s)| {
                MetricSnapshot::new("athlete-1", "fitbit", base_date() - Duration::days(days - i as i64))
                    .with_steps(*s)
            })
            .collect()
    }

    /// Ideal recovery inputs score 100 and grade A+
    #[test]
    fn test_ideal_recovery() {
        let report = IntelligenceEngine::new().generate_report(&ideal_snapshot(), &[]);

        assert_eq!(report.recovery.score, 100);
        assert_eq!(report.recovery.grade, Grade::APlus);
        assert_eq!(report.recovery.status, Status::Optimal);
        assert!(!report.recovery.insufficient_data);
    }

    /// A rest day with baseline calories has zero strain
    #[test]
    fn test_rest_day_strain() {
        let snapshot = empty_snapshot()
            .with_heart_rate_zones(vec![
                HeartRateZoneMinutes::new("Out of Range", 0),
                HeartRateZoneMinutes::new("Fat Burn", 0),
                HeartRateZoneMinutes::new("Cardio", 0),
                HeartRateZoneMinutes::new("Peak", 0),
            ])
            .with_active_zone_minutes(ActiveZoneMinutes::default())
            .with_calories_burned(2000.0);

        let report = IntelligenceEngine::new().generate_report(&snapshot, &[]);
        assert_eq!(report.strain.score, dec!(0.0));
        assert_eq!(report.strain.level, StrainLevel::Minimal);
    }

    /// An empty snapshot produces a report without panicking
    #[test]
    fn test_empty_snapshot_reports_insufficient_data() {
        let report = IntelligenceEngine::new().generate_report(&empty_snapshot(), &[]);

        for composite in [&report.recovery, &report.performance, &report.wellness] {
            assert!(composite.insufficient_data, "{} should lack data", composite.kind);
            assert_eq!(composite.status, Status::InsufficientData);
            assert_eq!(composite.value(), None);
        }
        assert_eq!(report.overall_score, None);
        assert!(!report.strain.has_data);
        assert!(report.recommendations.is_empty());
        assert!(report
            .training_clearance
            .should_avoid(ExerciseCategory::HeavyCompoundLifts));
    }

    /// Constant values across the window are stable
    #[test]
    fn test_constant_trend_is_stable() {
        let history = history_with_steps(&[9000; 6]);
        let current = empty_snapshot().with_steps(9000);

        let report = IntelligenceEngine::new().generate_report(&current, &history);
        assert_eq!(report.trends.window_size, 7);
        assert_eq!(
            report.trends.direction(TrendMetric::Steps),
            TrendDirection::Stable
        );
    }

    /// A 10% rise in the late half is improving
    #[test]
    fn test_rising_trend_is_improving() {
        let history = history_with_steps(&[8000, 8000, 8000, 8800, 8800]);
        let current = empty_snapshot().with_steps(8800);

        let report = IntelligenceEngine::new().generate_report(&current, &history);
        let steps = report.trends.get(TrendMetric::Steps).unwrap();
        assert_eq!(steps.direction, TrendDirection::Improving);
        assert!((steps.change_percent.unwrap() - 10.0).abs() < 1e-9);
    }

    /// Same inputs give the same report apart from timing fields
    #[test]
    fn test_idempotence() {
        let engine = IntelligenceEngine::new();
        let history = history_with_steps(&[7000, 7500, 8000, 8500, 9000, 9500]);
        let snapshot = ideal_snapshot().with_steps(10_000).with_calories_burned(2600.0);

        let first = engine.generate_report(&snapshot, &history);
        let mut second = engine.generate_report(&snapshot, &history);
        assert!(first.scores_equal(&second));

        second.generated_at = first.generated_at;
        second.computation_time = first.computation_time;
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    /// Heavy lifts are cleared on a great day and avoided on a poor one
    #[test]
    fn test_training_clearance_extremes() {
        let engine = IntelligenceEngine::new();

        let great = engine.generate_report(
            &ideal_snapshot()
                .with_active_zone_minutes(ActiveZoneMinutes {
                    total: 30,
                    ..Default::default()
                })
                .with_calories_burned(1900.0),
            &[],
        );
        assert!(great.recovery.score >= 85 && great.performance.score >= 85);
        assert!(great
            .training_clearance
            .is_cleared(ExerciseCategory::HeavyCompoundLifts));
        assert!(!great
            .training_clearance
            .should_avoid(ExerciseCategory::HeavyCompoundLifts));

        let poor = engine.generate_report(
            &empty_snapshot()
                .with_hrv(15.0, None)
                .with_resting_heart_rate(88.0)
                .with_sleep(240, 20, 20, None)
                .with_spo2(89.0),
            &[],
        );
        assert!(poor.recovery.score <= 30);
        assert!(poor
            .training_clearance
            .should_avoid(ExerciseCategory::HeavyCompoundLifts));
        assert!(!poor
            .training_clearance
            .is_cleared(ExerciseCategory::HeavyCompoundLifts));

        let kinds: Vec<RecommendationKind> = poor.recommendations.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&RecommendationKind::RecoveryDeficit));
        assert!(kinds.contains(&RecommendationKind::MedicalConcern));
    }

    /// Dropping one input leaves other factors unchanged
    #[test]
    fn test_renormalization_end_to_end() {
        let engine = IntelligenceEngine::new();
        let full = ideal_snapshot().with_hrv(45.0, None).with_resting_heart_rate(63.0);
        let mut partial = full.clone();
        partial.respiratory.breathing_rate = None;

        let with_all = engine.generate_report(&full, &[]).recovery;
        let without_one = engine.generate_report(&partial, &[]).recovery;

        assert!(without_one.missing_factors.contains(&FactorKind::BreathingRate));
        for factor in &without_one.factors {
            let original = with_all.factor(factor.kind).unwrap();
            assert_eq!(original.score, factor.score);
            assert_eq!(original.weight, factor.weight);
        }

        // Expected value from the remaining factors' effective weights
        let expected: f64 = without_one
            .factors
            .iter()
            .map(|f| f.score * f.weight)
            .sum::<f64>()
            / without_one.factors.iter().map(|f| f.weight).sum::<f64>();
        assert_eq!(without_one.score, expected.round() as u8);
    }

    /// Trend history for other subjects never leaks into a report
    #[test]
    fn test_history_for_other_subjects_is_ignored() {
        let mut history = history_with_steps(&[1000, 1000, 1000]);
        for entry in &mut history {
            entry.subject_id = "someone-else".to_string();
        }

        let report = IntelligenceEngine::new().generate_report(&empty_snapshot().with_steps(9000), &history);
        assert_eq!(report.trends.window_size, 1);
    }

    /// Declining HRV across the window raises a trend warning
    #[test]
    fn test_declining_hrv_warning() {
        let history: Vec<MetricSnapshot> = [75.0, 72.0, 70.0, 50.0, 45.0]
            .iter()
            .enumerate()
            .map(|(i, hrv)| {
                MetricSnapshot::new("athlete-1", "fitbit", base_date() - Duration::days(5 - i as i64))
                    .with_hrv(*hrv, None)
            })
            .collect();
        let current = empty_snapshot().with_hrv(42.0, None);

        let report = IntelligenceEngine::new().generate_report(&current, &history);
        assert_eq!(report.trends.direction(TrendMetric::Hrv), TrendDirection::Declining);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.kind == RecommendationKind::TrendWarning));
    }
}
