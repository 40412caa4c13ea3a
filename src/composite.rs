//! Composite aggregators
//!
//! Recovery, Performance Readiness and Wellness are each a weighted mean of a
//! fixed set of factors. Weights are renormalized over the factors that are
//! actually present, so a composite is never penalised merely because an
//! optional metric was not recorded. All three share [`weighted_composite`].
//!
//! Strain is deliberately not built on this primitive; see [`crate::strain`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{CompositeKind, Grade, Status, INSUFFICIENT_DATA_ADVISORY};
use crate::config::{OverallWeights, PerformanceWeights, RecoveryWeights, WellnessWeights};
use crate::factors::{FactorFlag, FactorKind, FactorResult, FactorScore, FactorScorer};
use crate::models::MetricSnapshot;

/// Result of the shared weighted-mean primitive
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedComposite {
    /// Renormalized weighted mean, `None` when no weight was present
    pub score: Option<f64>,
    /// Present factors in input order, with effective weights filled in
    pub factors: Vec<FactorResult>,
    /// Factors that could not be computed
    pub missing: Vec<FactorKind>,
}

/// Weighted mean over the present factors with weights renormalized to sum to 1
pub fn weighted_composite(inputs: &[(FactorKind, Option<FactorScore>, f64)]) -> WeightedComposite {
    let mut factors = Vec::with_capacity(inputs.len());
    let mut missing = Vec::new();

    for &(kind, score, weight) in inputs {
        match score {
            Some(score) => factors.push(score.weighted(kind, weight)),
            None => missing.push(kind),
        }
    }

    let present_weight: f64 = factors.iter().map(|f| f.weight).sum();
    if present_weight <= 0.0 {
        for factor in &mut factors {
            factor.effective_weight = 0.0;
        }
        return WeightedComposite {
            score: None,
            factors,
            missing,
        };
    }

    let mut total = 0.0;
    for factor in &mut factors {
        factor.effective_weight = factor.weight / present_weight;
        total += factor.score * factor.effective_weight;
    }

    WeightedComposite {
        score: Some(total.clamp(0.0, 100.0)),
        factors,
        missing,
    }
}

/// A classified composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub kind: CompositeKind,

    /// Rounded score in [0, 100]; 0 with `insufficient_data` set means "no data"
    pub score: u8,

    /// True when no factor could be computed
    pub insufficient_data: bool,

    pub grade: Grade,
    pub status: Status,

    /// Contributing factors in declaration order
    pub factors: Vec<FactorResult>,

    pub missing_factors: Vec<FactorKind>,

    /// Status advisory first, then factor-specific tips
    pub recommendations: Vec<String>,
}

impl CompositeScore {
    /// Score if it is backed by at least one factor
    pub fn value(&self) -> Option<u8> {
        if self.insufficient_data {
            None
        } else {
            Some(self.score)
        }
    }

    pub fn has_data(&self) -> bool {
        !self.insufficient_data
    }

    pub fn factor(&self, kind: FactorKind) -> Option<&FactorResult> {
        self.factors.iter().find(|f| f.kind == kind)
    }

    fn from_weighted(
        kind: CompositeKind,
        composite: WeightedComposite,
        tips: fn(&[FactorResult]) -> Vec<String>,
    ) -> Self {
        let result = match composite.score {
            Some(raw) => {
                let score = raw.round().clamp(0.0, 100.0) as u8;
                let band = kind.classify(score);
                let mut recommendations = vec![band.advisory.to_string()];
                recommendations.extend(tips(&composite.factors));

                CompositeScore {
                    kind,
                    score,
                    insufficient_data: false,
                    grade: Grade::from_score(score),
                    status: band.status,
                    factors: composite.factors,
                    missing_factors: composite.missing,
                    recommendations,
                }
            }
            None => CompositeScore {
                kind,
                score: 0,
                insufficient_data: true,
                grade: Grade::F,
                status: Status::InsufficientData,
                factors: composite.factors,
                missing_factors: composite.missing,
                recommendations: vec![INSUFFICIENT_DATA_ADVISORY.to_string()],
            },
        };

        debug!(
            composite = %kind,
            score = result.score,
            insufficient_data = result.insufficient_data,
            factors = result.factors.len(),
            missing = result.missing_factors.len(),
            "Composite computed"
        );

        result
    }
}

/// Aggregators for the three renormalized composites
pub struct CompositeCalculator;

impl CompositeCalculator {
    /// Recovery: HRV, resting HR, sleep duration and quality, breathing rate, SpO2
    pub fn recovery(snapshot: &MetricSnapshot, weights: &RecoveryWeights) -> CompositeScore {
        let cardiac = &snapshot.cardiac;
        let sleep = &snapshot.sleep;
        let respiratory = &snapshot.respiratory;

        let composite = weighted_composite(&[
            (
                FactorKind::Hrv,
                FactorScorer::hrv(cardiac.hrv_rmssd, cardiac.hrv_baseline),
                weights.hrv,
            ),
            (
                FactorKind::RestingHeartRate,
                FactorScorer::resting_heart_rate(cardiac.resting_heart_rate),
                weights.resting_heart_rate,
            ),
            (
                FactorKind::SleepDuration,
                FactorScorer::sleep_duration(sleep.total_minutes),
                weights.sleep_duration,
            ),
            (
                FactorKind::SleepQuality,
                FactorScorer::sleep_quality(sleep.total_minutes, sleep.deep_minutes, sleep.rem_minutes),
                weights.sleep_quality,
            ),
            (
                FactorKind::BreathingRate,
                FactorScorer::breathing_rate(respiratory.breathing_rate),
                weights.breathing_rate,
            ),
            (
                FactorKind::Spo2,
                FactorScorer::spo2(respiratory.spo2),
                weights.spo2,
            ),
        ]);

        CompositeScore::from_weighted(CompositeKind::Recovery, composite, recovery_tips)
    }

    /// Performance Readiness
    ///
    /// `recovery_score` is a previously computed Recovery value (same day or
    /// prior day, at the caller's choice). `None` drops that factor.
    pub fn performance(
        snapshot: &MetricSnapshot,
        recovery_score: Option<u8>,
        weights: &PerformanceWeights,
        sleep_baseline_hours: f64,
    ) -> CompositeScore {
        let composite = weighted_composite(&[
            (
                FactorKind::PriorRecovery,
                FactorScorer::prior_recovery(recovery_score),
                weights.recovery,
            ),
            (
                FactorKind::TrainingLoad,
                FactorScorer::training_load(snapshot.activity.azm_total()),
                weights.training_load,
            ),
            (
                FactorKind::SleepDebt,
                FactorScorer::sleep_debt(snapshot.sleep.total_minutes, sleep_baseline_hours),
                weights.sleep_debt,
            ),
            (
                FactorKind::MuscleReadiness,
                FactorScorer::muscle_readiness(snapshot.activity.calories_burned),
                weights.muscle_readiness,
            ),
        ]);

        CompositeScore::from_weighted(CompositeKind::Performance, composite, performance_tips)
    }

    /// Wellness: activity, sleep health, heart health, stress, nutrition balance
    pub fn wellness(snapshot: &MetricSnapshot, weights: &WellnessWeights) -> CompositeScore {
        let activity = &snapshot.activity;

        let composite = weighted_composite(&[
            (
                FactorKind::Activity,
                FactorScorer::activity(activity.steps, activity.azm_total()),
                weights.activity,
            ),
            (
                FactorKind::SleepHealth,
                FactorScorer::sleep_health(snapshot.sleep.total_minutes, snapshot.sleep.efficiency),
                weights.sleep,
            ),
            (
                FactorKind::HeartHealth,
                FactorScorer::heart_health(snapshot.cardiac.resting_heart_rate, activity.vo2_max),
                weights.heart_health,
            ),
            (
                FactorKind::Stress,
                FactorScorer::stress(snapshot.cardiac.hrv_rmssd),
                weights.stress,
            ),
            (
                FactorKind::NutritionBalance,
                FactorScorer::nutrition_balance(
                    activity.calories_burned,
                    snapshot.nutrition.calories_consumed,
                ),
                weights.nutrition,
            ),
        ]);

        CompositeScore::from_weighted(CompositeKind::Wellness, composite, wellness_tips)
    }

    /// Fixed blend of the three composites
    ///
    /// Not renormalized: returns `None` unless all three have data.
    pub fn overall(
        recovery: &CompositeScore,
        performance: &CompositeScore,
        wellness: &CompositeScore,
        weights: &OverallWeights,
    ) -> Option<u8> {
        let blended = f64::from(recovery.value()?) * weights.recovery
            + f64::from(performance.value()?) * weights.performance
            + f64::from(wellness.value()?) * weights.wellness;
        Some(blended.round().clamp(0.0, 100.0) as u8)
    }
}

fn below(factors: &[FactorResult], kind: FactorKind, threshold: f64) -> bool {
    factors
        .iter()
        .any(|f| f.kind == kind && f.score < threshold)
}

fn recovery_tips(factors: &[FactorResult]) -> Vec<String> {
    let mut tips = Vec::new();

    if below(factors, FactorKind::Hrv, 60.0) {
        tips.push(
            "HRV is suppressed. Try breathing exercises, meditation or a short walk to manage stress."
                .to_string(),
        );
    }
    if below(factors, FactorKind::SleepDuration, 70.0) {
        tips.push("Aim for 7-9 hours of sleep tonight; an earlier bedtime will help.".to_string());
    }
    if below(factors, FactorKind::SleepQuality, 60.0) {
        tips.push(
            "Deep and REM sleep were short. Keep the bedroom cool and dark and avoid late caffeine."
                .to_string(),
        );
    }
    if below(factors, FactorKind::RestingHeartRate, 60.0) {
        tips.push(
            "Resting heart rate is elevated. Stay hydrated and watch for signs of illness.".to_string(),
        );
    }
    if below(factors, FactorKind::BreathingRate, 70.0) {
        tips.push("Breathing rate was outside its usual range overnight.".to_string());
    }
    if factors
        .iter()
        .any(|f| f.kind == FactorKind::Spo2 && f.flag == Some(FactorFlag::MedicalConcern))
    {
        tips.push(
            "Blood oxygen fell below 90%. Consider discussing this with a healthcare provider."
                .to_string(),
        );
    }

    tips
}

fn performance_tips(factors: &[FactorResult]) -> Vec<String> {
    let mut tips = Vec::new();

    if let Some(load) = factors.iter().find(|f| f.kind == FactorKind::TrainingLoad) {
        if load.score < 80.0 && load.raw_value > 44.0 {
            tips.push("Training load is high. Balance hard days with easier sessions.".to_string());
        } else if load.score < 100.0 && load.raw_value < 22.0 {
            tips.push(
                "Training load is light. A 22-44 minute session in your active zones would build fitness."
                    .to_string(),
            );
        }
    }
    if below(factors, FactorKind::SleepDebt, 60.0) {
        tips.push("You are carrying sleep debt. Protect tonight's sleep before adding intensity.".to_string());
    }
    if below(factors, FactorKind::MuscleReadiness, 60.0) {
        tips.push("High energy expenditure yesterday. Allow muscles time to recover.".to_string());
    }

    tips
}

fn wellness_tips(factors: &[FactorResult]) -> Vec<String> {
    let mut tips = Vec::new();

    if below(factors, FactorKind::Activity, 60.0) {
        tips.push("Move more: work towards 10,000 steps and 30 active minutes.".to_string());
    }
    if below(factors, FactorKind::SleepHealth, 70.0) {
        tips.push("Improve sleep consistency with a regular bed and wake time.".to_string());
    }
    if below(factors, FactorKind::Stress, 60.0) {
        tips.push("Stress markers are elevated. Schedule some downtime today.".to_string());
    }
    if below(factors, FactorKind::NutritionBalance, 70.0) {
        tips.push(
            "Energy intake is far from expenditure. Adjust portions to stay within a controlled range."
                .to_string(),
        );
    }

    tips
}
