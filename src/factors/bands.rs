//! Band tables for the factor scorers
//!
//! Each table maps a metric value to a 0-100 sub-score. Tables are evaluated
//! first-match in declaration order, so every band can be checked in isolation
//! without going through a composite.

/// Value at or below `upper` scores `score`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CeilingBand {
    pub upper: f64,
    pub score: f64,
}

/// Value at or above `lower` scores `score`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorBand {
    pub lower: f64,
    pub score: f64,
}

/// Value in `[low, high]` (both inclusive) scores `score`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBand {
    pub low: f64,
    pub high: f64,
    pub score: f64,
}

/// Value in `[lower, upper)` is interpolated between the two end scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearBand {
    pub lower: f64,
    pub upper: f64,
    pub score_at_lower: f64,
    pub score_at_upper: f64,
}

const fn ceiling(upper: f64, score: f64) -> CeilingBand {
    CeilingBand { upper, score }
}

const fn floor(lower: f64, score: f64) -> FloorBand {
    FloorBand { lower, score }
}

const fn range(low: f64, high: f64, score: f64) -> RangeBand {
    RangeBand { low, high, score }
}

const fn linear(lower: f64, upper: f64, score_at_lower: f64, score_at_upper: f64) -> LinearBand {
    LinearBand {
        lower,
        upper,
        score_at_lower,
        score_at_upper,
    }
}

// ---------------------------------------------------------------------------
// Recovery factors
// ---------------------------------------------------------------------------

/// Neutral score for an HRV reading exactly at the personal baseline
pub const HRV_BASELINE_NEUTRAL: f64 = 50.0;

/// RMSSD (ms) at or above which population-banded HRV scores 100
pub const HRV_FULL_SCORE_MS: f64 = 80.0;

/// Population HRV bands (RMSSD, ms) used when no personal baseline exists
pub const HRV_POPULATION_BANDS: &[LinearBand] = &[
    linear(60.0, 80.0, 80.0, 100.0),
    linear(40.0, 60.0, 60.0, 80.0),
    linear(25.0, 40.0, 40.0, 60.0),
    linear(0.0, 25.0, 0.0, 40.0),
];

/// Resting heart rate (bpm), lower is better
pub const RESTING_HR_BANDS: &[CeilingBand] = &[
    ceiling(45.0, 100.0),
    ceiling(50.0, 95.0),
    ceiling(55.0, 90.0),
    ceiling(60.0, 80.0),
    ceiling(65.0, 70.0),
    ceiling(70.0, 60.0),
    ceiling(75.0, 45.0),
    ceiling(80.0, 30.0),
    ceiling(85.0, 15.0),
];
pub const RESTING_HR_FLOOR_SCORE: f64 = 0.0;

/// Sleep duration (hours); 7-9h is optimal
pub const SLEEP_DURATION_BANDS: &[RangeBand] = &[
    range(7.0, 9.0, 100.0),
    range(9.0, 10.0, 90.0),
    range(6.0, 7.0, 80.0),
    range(5.0, 6.0, 60.0),
    range(10.0, f64::INFINITY, 70.0),
];
/// Below this many hours the score falls proportionally towards 0
pub const SLEEP_SHORT_HOURS: f64 = 5.0;
pub const SLEEP_SHORT_SCORE: f64 = 60.0;

/// Restorative fraction of sleep: (deep + REM) / total
pub const SLEEP_QUALITY_BANDS: &[FloorBand] = &[
    floor(0.45, 100.0),
    floor(0.35, 80.0),
    floor(0.25, 60.0),
];

/// Sleep efficiency (%)
pub const SLEEP_EFFICIENCY_BANDS: &[FloorBand] = &[
    floor(85.0, 100.0),
    floor(75.0, 80.0),
    floor(65.0, 60.0),
];

/// Breathing rate (breaths/min), centred on 12-16
pub const BREATHING_RATE_BANDS: &[RangeBand] = &[
    range(12.0, 16.0, 100.0),
    range(10.0, 18.0, 85.0),
    range(8.0, 20.0, 70.0),
    range(6.0, 24.0, 50.0),
];
pub const BREATHING_RATE_FLOOR_SCORE: f64 = 30.0;

/// Blood oxygen saturation (%)
pub const SPO2_BANDS: &[FloorBand] = &[
    floor(96.0, 100.0),
    floor(94.0, 85.0),
    floor(92.0, 70.0),
    floor(90.0, 50.0),
];
/// Score below 90% SpO2, which also raises a medical-concern flag
pub const SPO2_CONCERN_SCORE: f64 = 20.0;

// ---------------------------------------------------------------------------
// Performance factors
// ---------------------------------------------------------------------------

/// Active Zone Minutes as training load; 22-44 is the sweet spot
pub const TRAINING_LOAD_BANDS: &[RangeBand] = &[
    range(22.0, 44.0, 100.0),
    range(0.0, 22.0, 80.0),
    range(44.0, 60.0, 85.0),
    range(60.0, 90.0, 70.0),
    range(90.0, 120.0, 55.0),
];
pub const TRAINING_LOAD_FLOOR_SCORE: f64 = 40.0;

/// Default nightly sleep need used for sleep debt (hours)
pub const SLEEP_BASELINE_HOURS: f64 = 8.0;

/// Sleep debt (hours short of baseline)
pub const SLEEP_DEBT_BANDS: &[CeilingBand] = &[
    ceiling(0.0, 100.0),
    ceiling(0.5, 90.0),
    ceiling(1.0, 80.0),
    ceiling(2.0, 60.0),
    ceiling(3.0, 40.0),
];
pub const SLEEP_DEBT_FLOOR_SCORE: f64 = 25.0;

/// Calories burned as a muscular-fatigue proxy (kcal), in 500 kcal steps
pub const MUSCLE_READINESS_BANDS: &[FloorBand] = &[
    floor(4000.0, 40.0),
    floor(3500.0, 52.0),
    floor(3000.0, 64.0),
    floor(2500.0, 76.0),
    floor(2000.0, 88.0),
];
pub const MUSCLE_READINESS_FRESH_SCORE: f64 = 100.0;

// ---------------------------------------------------------------------------
// Wellness factors
// ---------------------------------------------------------------------------

pub const STEPS_TARGET: f64 = 10_000.0;
pub const ACTIVE_MINUTES_TARGET: f64 = 30.0;

/// Resting heart rate component of heart health (bpm)
pub const HEART_HEALTH_RHR_BANDS: &[CeilingBand] = &[
    ceiling(50.0, 100.0),
    ceiling(60.0, 85.0),
    ceiling(70.0, 70.0),
    ceiling(80.0, 55.0),
];
pub const HEART_HEALTH_RHR_FLOOR_SCORE: f64 = 40.0;

/// VO2max component of heart health (ml/kg/min)
pub const VO2MAX_BANDS: &[FloorBand] = &[
    floor(50.0, 100.0),
    floor(45.0, 90.0),
    floor(40.0, 80.0),
    floor(35.0, 70.0),
    floor(30.0, 60.0),
];
pub const VO2MAX_FLOOR_SCORE: f64 = 45.0;

/// HRV (RMSSD, ms) framed as low stress
pub const STRESS_BANDS: &[FloorBand] = &[
    floor(70.0, 100.0),
    floor(50.0, 85.0),
    floor(35.0, 70.0),
    floor(20.0, 50.0),
];
pub const STRESS_FLOOR_SCORE: f64 = 30.0;

/// Energy balance: calories burned minus consumed (positive = deficit)
pub const NUTRITION_BALANCE_BANDS: &[RangeBand] = &[
    range(-200.0, 200.0, 100.0),
    range(200.0, 500.0, 85.0),
    range(500.0, 1000.0, 80.0),
    range(1000.0, f64::INFINITY, 60.0),
    range(-500.0, -200.0, 70.0),
];
pub const NUTRITION_SURPLUS_SCORE: f64 = 50.0;

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// First ceiling band containing `value`, else `otherwise`
pub fn score_ceiling(value: f64, bands: &[CeilingBand], otherwise: f64) -> f64 {
    bands
        .iter()
        .find(|band| value <= band.upper)
        .map_or(otherwise, |band| band.score)
}

/// First floor band containing `value`, else `otherwise`
pub fn score_floor(value: f64, bands: &[FloorBand], otherwise: f64) -> f64 {
    bands
        .iter()
        .find(|band| value >= band.lower)
        .map_or(otherwise, |band| band.score)
}

/// First range band containing `value`, else `otherwise`
pub fn score_range(value: f64, bands: &[RangeBand], otherwise: f64) -> f64 {
    bands
        .iter()
        .find(|band| value >= band.low && value <= band.high)
        .map_or(otherwise, |band| band.score)
}

/// Interpolated score from the first linear band containing `value`
pub fn score_linear(value: f64, bands: &[LinearBand]) -> Option<f64> {
    bands
        .iter()
        .find(|band| value >= band.lower && value < band.upper)
        .map(|band| {
            let fraction = (value - band.lower) / (band.upper - band.lower);
            band.score_at_lower + fraction * (band.score_at_upper - band.score_at_lower)
        })
}
