//! Daily strain on a bounded 0-21 scale
//!
//! Strain accumulates load from heart-rate zone minutes, Active Zone Minutes and
//! excess calorie burn. Unlike the other composites it is additive: nothing is
//! averaged or renormalized, and an absent input simply contributes nothing.

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{ActivityMetrics, HeartRateZoneMinutes};

/// Upper bound of the strain scale
pub const MAX_STRAIN: Decimal = dec!(21);

/// Load per minute in each heart-rate zone
pub const OUT_OF_RANGE_MULTIPLIER: Decimal = dec!(0.01);
pub const FAT_BURN_MULTIPLIER: Decimal = dec!(0.05);
pub const CARDIO_MULTIPLIER: Decimal = dec!(0.15);
pub const PEAK_MULTIPLIER: Decimal = dec!(0.30);

/// Load per Active Zone Minute
pub const AZM_MULTIPLIER: Decimal = dec!(0.1);

/// Calories above this daily burn add strain
pub const CALORIE_THRESHOLD: Decimal = dec!(2000);
/// Strain added per 1000 kcal above the threshold
pub const CALORIE_LOAD_PER_1000: Decimal = dec!(2);
/// Burns above this already saturate the scale
pub const CALORIE_SATURATION_KCAL: f64 = 1e6;

/// Strain level bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrainLevel {
    AllOut,
    Strenuous,
    Moderate,
    Light,
    Minimal,
}

impl StrainLevel {
    pub fn from_score(score: Decimal) -> Self {
        if score >= dec!(18) {
            StrainLevel::AllOut
        } else if score >= dec!(14) {
            StrainLevel::Strenuous
        } else if score >= dec!(10) {
            StrainLevel::Moderate
        } else if score >= dec!(6) {
            StrainLevel::Light
        } else {
            StrainLevel::Minimal
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrainLevel::AllOut => "All Out",
            StrainLevel::Strenuous => "Strenuous",
            StrainLevel::Moderate => "Moderate",
            StrainLevel::Light => "Light",
            StrainLevel::Minimal => "Minimal",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            StrainLevel::AllOut => {
                "Extremely high strain. Plan a recovery day and prioritise sleep tonight."
            }
            StrainLevel::Strenuous => {
                "Strenuous day. Refuel well and keep tomorrow's session easy."
            }
            StrainLevel::Moderate => "Moderate strain. A solid training stimulus for most days.",
            StrainLevel::Light => "Light strain. There is room for more activity if you feel good.",
            StrainLevel::Minimal => "Minimal strain. A good day for active recovery or a light workout.",
        }
    }
}

impl fmt::Display for StrainLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Heart-rate zone recognised by the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartRateZone {
    OutOfRange,
    FatBurn,
    Cardio,
    Peak,
}

impl HeartRateZone {
    /// Match a provider zone name, ignoring case, spaces, hyphens and underscores
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "outofrange" => Some(HeartRateZone::OutOfRange),
            "fatburn" => Some(HeartRateZone::FatBurn),
            "cardio" => Some(HeartRateZone::Cardio),
            "peak" => Some(HeartRateZone::Peak),
            _ => None,
        }
    }

    pub fn multiplier(&self) -> Decimal {
        match self {
            HeartRateZone::OutOfRange => OUT_OF_RANGE_MULTIPLIER,
            HeartRateZone::FatBurn => FAT_BURN_MULTIPLIER,
            HeartRateZone::Cardio => CARDIO_MULTIPLIER,
            HeartRateZone::Peak => PEAK_MULTIPLIER,
        }
    }
}

/// Strain result with its additive breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrainScore {
    /// Total strain in [0, 21], one decimal place
    pub score: Decimal,
    pub level: StrainLevel,
    pub recommendation: String,

    /// Load from heart-rate zone minutes
    pub zone_load: Decimal,
    /// Load from Active Zone Minutes
    pub azm_load: Decimal,
    /// Load from calories above the threshold
    pub calorie_load: Decimal,

    /// False when no zone minutes, AZM or calories were supplied
    pub has_data: bool,
}

impl StrainScore {
    pub fn score_f64(&self) -> f64 {
        self.score.to_f64().unwrap_or(0.0)
    }
}

/// Strain accumulator
pub struct StrainCalculator;

impl StrainCalculator {
    pub fn calculate(activity: &ActivityMetrics) -> StrainScore {
        let zone_load = Self::zone_load(&activity.heart_rate_zones);
        let azm_load = activity
            .azm_total()
            .map_or(Decimal::ZERO, |azm| Decimal::from(azm) * AZM_MULTIPLIER);
        let calorie_load = activity
            .calories_burned
            .map_or(Decimal::ZERO, Self::calorie_load);

        let has_data = !activity.heart_rate_zones.is_empty()
            || activity.active_zone_minutes.is_some()
            || activity
                .calories_burned
                .map_or(false, |kcal| kcal.is_finite() && kcal >= 0.0);

        let score = (zone_load + azm_load + calorie_load)
            .max(Decimal::ZERO)
            .min(MAX_STRAIN)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        let level = StrainLevel::from_score(score);

        StrainScore {
            score,
            level,
            recommendation: level.recommendation().to_string(),
            zone_load,
            azm_load,
            calorie_load,
            has_data,
        }
    }

    fn zone_load(zones: &[HeartRateZoneMinutes]) -> Decimal {
        zones
            .iter()
            .filter_map(|zone| {
                HeartRateZone::from_name(&zone.name)
                    .map(|kind| Decimal::from(zone.minutes) * kind.multiplier())
            })
            .sum()
    }

    fn calorie_load(kcal: f64) -> Decimal {
        if !kcal.is_finite() {
            return Decimal::ZERO;
        }

        match Decimal::from_f64(kcal.min(CALORIE_SATURATION_KCAL)) {
            Some(kcal) if kcal > CALORIE_THRESHOLD => {
                (kcal - CALORIE_THRESHOLD) / dec!(1000) * CALORIE_LOAD_PER_1000
            }
            _ => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActiveZoneMinutes;

    fn activity(zones: &[(&str, u32)], azm: Option<u32>, calories: Option<f64>) -> ActivityMetrics {
        ActivityMetrics {
            heart_rate_zones: zones
                .iter()
                .map(|(name, minutes)| HeartRateZoneMinutes::new(*name, *minutes))
                .collect(),
            active_zone_minutes: azm.map(|total| ActiveZoneMinutes {
                total,
                ..Default::default()
            }),
            calories_burned: calories,
            ..Default::default()
        }
    }

    #[test]
    fn test_resting_day_has_zero_strain() {
        let strain = StrainCalculator::calculate(&activity(&[], Some(0), Some(2000.0)));

        assert_eq!(strain.score, dec!(0.0));
        assert_eq!(strain.level, StrainLevel::Minimal);
        assert!(strain.has_data);
    }

    #[test]
    fn test_no_inputs() {
        let strain = StrainCalculator::calculate(&ActivityMetrics::default());
        assert_eq!(strain.score, Decimal::ZERO);
        assert!(!strain.has_data);
    }

    #[test]
    fn test_additive_terms() {
        let strain = StrainCalculator::calculate(&activity(
            &[("Out of Range", 600), ("Fat Burn", 40), ("Cardio", 20), ("Peak", 5)],
            Some(45),
            Some(2800.0),
        ));

        // 6.0 + 2.0 + 3.0 + 1.5
        assert_eq!(strain.zone_load, dec!(12.5));
        assert_eq!(strain.azm_load, dec!(4.5));
        assert_eq!(strain.calorie_load, dec!(1.6));
        assert_eq!(strain.score, dec!(18.6));
        assert_eq!(strain.level, StrainLevel::AllOut);
    }

    #[test]
    fn test_strain_is_clamped() {
        let strain = StrainCalculator::calculate(&activity(&[("peak", 200)], Some(120), Some(6000.0)));
        assert_eq!(strain.score, MAX_STRAIN);
        assert_eq!(strain.level, StrainLevel::AllOut);
    }

    #[test]
    fn test_strain_never_drops_as_calories_rise() {
        let burns = [0.0, 2500.0, 12_500.0, 1e6, 1e9, 1e30, f64::MAX];
        let scores: Vec<Decimal> = burns
            .iter()
            .map(|kcal| StrainCalculator::calculate(&activity(&[], None, Some(*kcal))).score)
            .collect();

        assert!(scores.windows(2).all(|w| w[0] <= w[1]), "{:?}", scores);
        assert_eq!(scores[scores.len() - 1], MAX_STRAIN);
    }

    #[test]
    fn test_non_finite_calories_add_nothing() {
        for kcal in [f64::NAN, f64::INFINITY] {
            let strain = StrainCalculator::calculate(&activity(&[], None, Some(kcal)));
            assert_eq!(strain.score, Decimal::ZERO);
            assert!(!strain.has_data);
        }
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        let strain = StrainCalculator::calculate(&activity(&[("fat_burn", 13)], None, None));
        assert_eq!(strain.zone_load, dec!(0.65));
        assert_eq!(strain.score, dec!(0.7));
    }

    #[test]
    fn test_zone_name_matching() {
        assert_eq!(HeartRateZone::from_name("Out of Range"), Some(HeartRateZone::OutOfRange));
        assert_eq!(HeartRateZone::from_name("out-of-range"), Some(HeartRateZone::OutOfRange));
        assert_eq!(HeartRateZone::from_name("FAT_BURN"), Some(HeartRateZone::FatBurn));
        assert_eq!(HeartRateZone::from_name("Cardio"), Some(HeartRateZone::Cardio));
        assert_eq!(HeartRateZone::from_name("Zone 5"), None);

        let strain = StrainCalculator::calculate(&activity(&[("Zone 5", 100)], None, None));
        assert_eq!(strain.score, Decimal::ZERO);
        assert!(strain.has_data);
    }

    #[test]
    fn test_strain_levels() {
        assert_eq!(StrainLevel::from_score(dec!(18.0)), StrainLevel::AllOut);
        assert_eq!(StrainLevel::from_score(dec!(17.9)), StrainLevel::Strenuous);
        assert_eq!(StrainLevel::from_score(dec!(14.0)), StrainLevel::Strenuous);
        assert_eq!(StrainLevel::from_score(dec!(10.0)), StrainLevel::Moderate);
        assert_eq!(StrainLevel::from_score(dec!(6.0)), StrainLevel::Light);
        assert_eq!(StrainLevel::from_score(dec!(5.9)), StrainLevel::Minimal);
    }
}
