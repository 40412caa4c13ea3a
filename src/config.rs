use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::factors::bands::SLEEP_BASELINE_HOURS;
use crate::logging::LogConfig;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scoring engine parameters
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging preferences
    #[serde(default)]
    pub logging: LogConfig,
}

/// Parameters of the intelligence engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Relative change (percent) a trend must exceed to leave "stable"
    pub trend_threshold_percent: f64,

    /// Nightly sleep need used by the sleep-debt factor (hours)
    pub sleep_baseline_hours: f64,

    /// Which day's Recovery feeds Performance Readiness
    pub performance_recovery: RecoverySource,

    /// Factor weights per composite and the overall blend
    pub weights: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            trend_threshold_percent: 5.0,
            sleep_baseline_hours: SLEEP_BASELINE_HOURS,
            performance_recovery: RecoverySource::SameDay,
            weights: ScoringWeights::default(),
        }
    }
}

/// Source of the Recovery score consumed by Performance Readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoverySource {
    /// Recovery computed from the same snapshot
    SameDay,
    /// Recovery computed from the history entry dated one day earlier
    PriorDay,
}

/// All composite weight sets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub recovery: RecoveryWeights,
    pub performance: PerformanceWeights,
    pub wellness: WellnessWeights,
    pub overall: OverallWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryWeights {
    pub hrv: f64,
    pub resting_heart_rate: f64,
    pub sleep_duration: f64,
    pub sleep_quality: f64,
    pub breathing_rate: f64,
    pub spo2: f64,
}

impl Default for RecoveryWeights {
    fn default() -> Self {
        RecoveryWeights {
            hrv: 0.30,
            resting_heart_rate: 0.20,
            sleep_duration: 0.20,
            sleep_quality: 0.15,
            breathing_rate: 0.10,
            spo2: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceWeights {
    pub recovery: f64,
    pub training_load: f64,
    pub sleep_debt: f64,
    pub muscle_readiness: f64,
}

impl Default for PerformanceWeights {
    fn default() -> Self {
        PerformanceWeights {
            recovery: 0.40,
            training_load: 0.25,
            sleep_debt: 0.20,
            muscle_readiness: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessWeights {
    pub activity: f64,
    pub sleep: f64,
    pub heart_health: f64,
    pub stress: f64,
    pub nutrition: f64,
}

impl Default for WellnessWeights {
    fn default() -> Self {
        WellnessWeights {
            activity: 0.25,
            sleep: 0.25,
            heart_health: 0.20,
            stress: 0.15,
            nutrition: 0.15,
        }
    }
}

/// Blend of the three composites into the overall score (not renormalized)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallWeights {
    pub recovery: f64,
    pub performance: f64,
    pub wellness: f64,
}

impl Default for OverallWeights {
    fn default() -> Self {
        OverallWeights {
            recovery: 0.35,
            performance: 0.30,
            wellness: 0.35,
        }
    }
}

impl EngineConfig {
    /// Check weight sets and thresholds for consistency
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let w = &self.weights;
        check_weight_set(
            "recovery",
            &[
                ("hrv", w.recovery.hrv),
                ("resting_heart_rate", w.recovery.resting_heart_rate),
                ("sleep_duration", w.recovery.sleep_duration),
                ("sleep_quality", w.recovery.sleep_quality),
                ("breathing_rate", w.recovery.breathing_rate),
                ("spo2", w.recovery.spo2),
            ],
        )?;
        check_weight_set(
            "performance",
            &[
                ("recovery", w.performance.recovery),
                ("training_load", w.performance.training_load),
                ("sleep_debt", w.performance.sleep_debt),
                ("muscle_readiness", w.performance.muscle_readiness),
            ],
        )?;
        check_weight_set(
            "wellness",
            &[
                ("activity", w.wellness.activity),
                ("sleep", w.wellness.sleep),
                ("heart_health", w.wellness.heart_health),
                ("stress", w.wellness.stress),
                ("nutrition", w.wellness.nutrition),
            ],
        )?;
        check_weight_set(
            "overall",
            &[
                ("recovery", w.overall.recovery),
                ("performance", w.overall.performance),
                ("wellness", w.overall.wellness),
            ],
        )?;

        if !(self.trend_threshold_percent.is_finite() && self.trend_threshold_percent > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "trend_threshold_percent",
                value: self.trend_threshold_percent,
            });
        }
        if !(self.sleep_baseline_hours.is_finite()
            && self.sleep_baseline_hours > 0.0
            && self.sleep_baseline_hours <= 24.0)
        {
            return Err(ConfigError::InvalidParameter {
                parameter: "sleep_baseline_hours",
                value: self.sleep_baseline_hours,
            });
        }

        Ok(())
    }
}

fn check_weight_set(
    set: &'static str,
    weights: &[(&'static str, f64)],
) -> std::result::Result<(), ConfigError> {
    for &(factor, value) in weights {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidWeight { set, factor, value });
        }
    }

    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::WeightSum { set, sum });
    }
    Ok(())
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config
            .engine
            .validate()
            .with_context(|| format!("Invalid engine configuration in {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vitalrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(
                    path = %config_path.display(),
                    error = %e,
                    "Using default configuration"
                );
                Self::default()
            }
        }
    }
}
