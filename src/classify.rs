//! Letter grades and qualitative status bands for composite scores

use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade for a 0-100 composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

/// Minimum score for each grade, highest first
const GRADE_BANDS: &[(u8, Grade)] = &[
    (90, Grade::APlus),
    (85, Grade::A),
    (80, Grade::AMinus),
    (75, Grade::BPlus),
    (70, Grade::B),
    (65, Grade::BMinus),
    (60, Grade::CPlus),
    (55, Grade::C),
    (50, Grade::CMinus),
    (45, Grade::DPlus),
    (40, Grade::D),
];

impl Grade {
    pub fn from_score(score: u8) -> Self {
        GRADE_BANDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map_or(Grade::F, |(_, grade)| *grade)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three renormalized composites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    Recovery,
    Performance,
    Wellness,
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeKind::Recovery => write!(f, "Recovery"),
            CompositeKind::Performance => write!(f, "Performance Readiness"),
            CompositeKind::Wellness => write!(f, "Wellness"),
        }
    }
}

/// Qualitative status of a composite
///
/// Each composite uses its own subset of labels; see the band tables below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Optimal,
    Peak,
    Excellent,
    High,
    Good,
    Moderate,
    Fair,
    Low,
    NeedsAttention,
    Poor,
    Rest,
    Critical,
    /// No usable factors; the numeric score is meaningless
    InsufficientData,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Optimal => "Optimal",
            Status::Peak => "Peak",
            Status::Excellent => "Excellent",
            Status::High => "High",
            Status::Good => "Good",
            Status::Moderate => "Moderate",
            Status::Fair => "Fair",
            Status::Low => "Low",
            Status::NeedsAttention => "Needs Attention",
            Status::Poor => "Poor",
            Status::Rest => "Rest",
            Status::Critical => "Critical",
            Status::InsufficientData => "Insufficient Data",
        };
        write!(f, "{}", label)
    }
}

/// One status band: scores at or above `min_score` fall into `status`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusBand {
    pub min_score: u8,
    pub status: Status,
    pub advisory: &'static str,
}

const fn band(min_score: u8, status: Status, advisory: &'static str) -> StatusBand {
    StatusBand {
        min_score,
        status,
        advisory,
    }
}

pub const RECOVERY_STATUS_BANDS: &[StatusBand] = &[
    band(80, Status::Optimal, "Fully recovered. Your body is ready for demanding training."),
    band(60, Status::Good, "Well recovered. Normal training is appropriate."),
    band(40, Status::Moderate, "Partially recovered. Keep intensity moderate today."),
    band(20, Status::Low, "Recovery is low. Favour light activity and extra rest."),
    band(0, Status::Critical, "Recovery is critically low. Take a full rest day."),
];

pub const PERFORMANCE_STATUS_BANDS: &[StatusBand] = &[
    band(80, Status::Peak, "Primed for peak performance. A good day for a key session or race."),
    band(65, Status::High, "High readiness. Quality training sessions are well supported."),
    band(50, Status::Moderate, "Moderate readiness. Stick to planned volume without adding intensity."),
    band(35, Status::Low, "Low readiness. Swap hard efforts for technique or easy aerobic work."),
    band(0, Status::Rest, "Not ready to perform. Prioritise rest and recovery."),
];

pub const WELLNESS_STATUS_BANDS: &[StatusBand] = &[
    band(80, Status::Excellent, "Excellent overall wellness. Keep up your current habits."),
    band(65, Status::Good, "Good wellness with room for small improvements."),
    band(50, Status::Fair, "Fair wellness. Look at sleep, activity and nutrition consistency."),
    band(35, Status::NeedsAttention, "Several lifestyle areas need attention."),
    band(0, Status::Poor, "Wellness is poor. Focus on the basics: sleep, movement and diet."),
];

pub const INSUFFICIENT_DATA_ADVISORY: &str =
    "Not enough data to compute this score. Sync your device to include more metrics.";

impl CompositeKind {
    pub fn status_bands(&self) -> &'static [StatusBand] {
        match self {
            CompositeKind::Recovery => RECOVERY_STATUS_BANDS,
            CompositeKind::Performance => PERFORMANCE_STATUS_BANDS,
            CompositeKind::Wellness => WELLNESS_STATUS_BANDS,
        }
    }

    /// Classify a score into this composite's status band
    pub fn classify(&self, score: u8) -> &'static StatusBand {
        let bands = self.status_bands();
        bands
            .iter()
            .find(|band| score >= band.min_score)
            .unwrap_or(&bands[bands.len() - 1])
    }
}
