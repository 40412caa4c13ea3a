//! Global recommendations and training clearance

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::composite::CompositeScore;
use crate::factors::{FactorFlag, FactorKind};
use crate::strain::StrainScore;
use crate::trends::{TrendDirection, TrendMetric, TrendReport};

pub const RECOVERY_DEFICIT_THRESHOLD: u8 = 50;
pub const PEAK_PERFORMANCE_THRESHOLD: u8 = 80;
pub const PEAK_RECOVERY_THRESHOLD: u8 = 70;
pub const OVERTRAINING_STRAIN_THRESHOLD: f64 = 15.0;
pub const OVERTRAINING_RECOVERY_THRESHOLD: u8 = 60;
pub const LIFESTYLE_WELLNESS_THRESHOLD: u8 = 60;

/// Recommendation priority, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    RecoveryDeficit,
    PeakDay,
    OvertrainingRisk,
    Lifestyle,
    MedicalConcern,
    TrendWarning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub kind: RecommendationKind,
    pub title: String,
    pub message: String,
}

impl Recommendation {
    fn new(priority: Priority, kind: RecommendationKind, title: &str, message: &str) -> Self {
        Self {
            priority,
            kind,
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

/// Inputs the rules are evaluated against
pub struct RecommendationContext<'a> {
    pub recovery: &'a CompositeScore,
    pub performance: &'a CompositeScore,
    pub wellness: &'a CompositeScore,
    pub strain: &'a StrainScore,
    pub trends: &'a TrendReport,
}

/// Evaluate every rule in order and return the fired ones, highest priority first
///
/// Composites without data never trigger score-based rules.
pub fn synthesize(ctx: &RecommendationContext<'_>) -> Vec<Recommendation> {
    let recovery = ctx.recovery.value();
    let performance = ctx.performance.value();
    let wellness = ctx.wellness.value();

    let mut recommendations = Vec::new();

    if recovery.map_or(false, |r| r < RECOVERY_DEFICIT_THRESHOLD) {
        recommendations.push(Recommendation::new(
            Priority::High,
            RecommendationKind::RecoveryDeficit,
            "Recovery deficit",
            "Your body has not recovered. Keep today to rest or very light movement.",
        ));
    }

    if let (Some(p), Some(r)) = (performance, recovery) {
        if p >= PEAK_PERFORMANCE_THRESHOLD && r >= PEAK_RECOVERY_THRESHOLD {
            recommendations.push(Recommendation::new(
                Priority::High,
                RecommendationKind::PeakDay,
                "Peak day",
                "Recovery and readiness are both high. Schedule your hardest session today.",
            ));
        }
    }

    if ctx.strain.score_f64() > OVERTRAINING_STRAIN_THRESHOLD
        && recovery.map_or(false, |r| r < OVERTRAINING_RECOVERY_THRESHOLD)
    {
        recommendations.push(Recommendation::new(
            Priority::High,
            RecommendationKind::OvertrainingRisk,
            "High strain, low recovery",
            "Strain is high while recovery lags behind. Back off to avoid overtraining.",
        ));
    }

    if wellness.map_or(false, |w| w < LIFESTYLE_WELLNESS_THRESHOLD) {
        recommendations.push(Recommendation::new(
            Priority::Medium,
            RecommendationKind::Lifestyle,
            "Lifestyle factors need attention",
            "Activity, sleep or nutrition habits are holding back your wellness score.",
        ));
    }

    let spo2_concern = ctx
        .recovery
        .factor(FactorKind::Spo2)
        .map_or(false, |f| f.flag == Some(FactorFlag::MedicalConcern));
    if spo2_concern {
        recommendations.push(Recommendation::new(
            Priority::High,
            RecommendationKind::MedicalConcern,
            "Low blood oxygen",
            "Overnight SpO2 was below 90%. If this persists, consult a healthcare provider.",
        ));
    }

    let declining = [TrendMetric::Hrv, TrendMetric::Recovery]
        .iter()
        .any(|m| ctx.trends.direction(*m) == TrendDirection::Declining);
    if declining {
        recommendations.push(Recommendation::new(
            Priority::Low,
            RecommendationKind::TrendWarning,
            "Downward recovery trend",
            "HRV or recovery has been falling over recent days. Watch training load and sleep.",
        ));
    }

    // Stable: equal priorities keep rule order
    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

/// Exercise categories used by training clearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    HeavyCompoundLifts,
    HighIntensityIntervals,
    Plyometrics,
    TempoRuns,
    MaxEffortTesting,
    ModerateStrength,
    Zone2Cardio,
    TechniqueWork,
    Mobility,
    LightWalking,
    Breathwork,
}

impl ExerciseCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ExerciseCategory::HeavyCompoundLifts => "heavy compound lifts",
            ExerciseCategory::HighIntensityIntervals => "high-intensity intervals",
            ExerciseCategory::Plyometrics => "plyometrics",
            ExerciseCategory::TempoRuns => "tempo runs",
            ExerciseCategory::MaxEffortTesting => "max-effort testing",
            ExerciseCategory::ModerateStrength => "moderate strength",
            ExerciseCategory::Zone2Cardio => "zone 2 cardio",
            ExerciseCategory::TechniqueWork => "technique work",
            ExerciseCategory::Mobility => "mobility",
            ExerciseCategory::LightWalking => "light walking",
            ExerciseCategory::Breathwork => "breathwork",
        }
    }
}

impl fmt::Display for ExerciseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceTier {
    /// Recovery and Performance both at least 70
    Green,
    /// Either at least 50
    Amber,
    Red,
}

impl ClearanceTier {
    pub fn from_scores(recovery: u8, performance: u8) -> Self {
        if recovery >= 70 && performance >= 70 {
            ClearanceTier::Green
        } else if recovery >= 50 || performance >= 50 {
            ClearanceTier::Amber
        } else {
            ClearanceTier::Red
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ClearanceTier::Green => "Cleared for full training",
            ClearanceTier::Amber => "Cleared for moderate training",
            ClearanceTier::Red => "Recovery only",
        }
    }
}

const GREEN_CLEARED: &[ExerciseCategory] = &[
    ExerciseCategory::HeavyCompoundLifts,
    ExerciseCategory::HighIntensityIntervals,
    ExerciseCategory::Plyometrics,
    ExerciseCategory::TempoRuns,
    ExerciseCategory::TechniqueWork,
    ExerciseCategory::Mobility,
];
const GREEN_CAUTION: &[ExerciseCategory] = &[ExerciseCategory::MaxEffortTesting];
const GREEN_AVOID: &[ExerciseCategory] = &[];

const AMBER_CLEARED: &[ExerciseCategory] = &[
    ExerciseCategory::TechniqueWork,
    ExerciseCategory::Mobility,
    ExerciseCategory::Zone2Cardio,
    ExerciseCategory::ModerateStrength,
];
const AMBER_CAUTION: &[ExerciseCategory] = &[
    ExerciseCategory::TempoRuns,
    ExerciseCategory::HighIntensityIntervals,
];
const AMBER_AVOID: &[ExerciseCategory] = &[
    ExerciseCategory::HeavyCompoundLifts,
    ExerciseCategory::Plyometrics,
    ExerciseCategory::MaxEffortTesting,
];

const RED_CLEARED: &[ExerciseCategory] = &[
    ExerciseCategory::Mobility,
    ExerciseCategory::LightWalking,
    ExerciseCategory::Breathwork,
];
const RED_CAUTION: &[ExerciseCategory] = &[
    ExerciseCategory::TechniqueWork,
    ExerciseCategory::Zone2Cardio,
];
const RED_AVOID: &[ExerciseCategory] = &[
    ExerciseCategory::HeavyCompoundLifts,
    ExerciseCategory::HighIntensityIntervals,
    ExerciseCategory::Plyometrics,
    ExerciseCategory::MaxEffortTesting,
    ExerciseCategory::TempoRuns,
];

/// Exercise categories bucketed by readiness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingClearance {
    pub tier: ClearanceTier,
    pub cleared: Vec<ExerciseCategory>,
    pub caution: Vec<ExerciseCategory>,
    pub avoid: Vec<ExerciseCategory>,
}

impl TrainingClearance {
    /// Look up the clearance table; absent scores count as 0
    pub fn assess(recovery: Option<u8>, performance: Option<u8>) -> Self {
        let tier = ClearanceTier::from_scores(recovery.unwrap_or(0), performance.unwrap_or(0));
        let (cleared, caution, avoid) = match tier {
            ClearanceTier::Green => (GREEN_CLEARED, GREEN_CAUTION, GREEN_AVOID),
            ClearanceTier::Amber => (AMBER_CLEARED, AMBER_CAUTION, AMBER_AVOID),
            ClearanceTier::Red => (RED_CLEARED, RED_CAUTION, RED_AVOID),
        };

        Self {
            tier,
            cleared: cleared.to_vec(),
            caution: caution.to_vec(),
            avoid: avoid.to_vec(),
        }
    }

    pub fn is_cleared(&self, category: ExerciseCategory) -> bool {
        self.cleared.contains(&category)
    }

    pub fn should_avoid(&self, category: ExerciseCategory) -> bool {
        self.avoid.contains(&category)
    }
}
