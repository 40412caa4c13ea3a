//! Intelligence engine and report
//!
//! [`IntelligenceEngine::generate_report`] is total: for any well-typed
//! snapshot it returns a report, flagging composites that lack data instead of
//! failing. Only the report's own timestamp and duration depend on the clock.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use crate::composite::{CompositeCalculator, CompositeScore};
use crate::config::{EngineConfig, RecoverySource};
use crate::error::Result;
use crate::models::MetricSnapshot;
use crate::recommendations::{self, Recommendation, RecommendationContext, TrainingClearance};
use crate::strain::{StrainCalculator, StrainScore};
use crate::trends::{trend_window, TrendAnalyzer, TrendReport};

/// Everything the engine derives from one snapshot and its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceReport {
    pub subject_id: String,
    pub source: String,
    pub date: NaiveDate,

    pub generated_at: DateTime<Utc>,

    /// Time spent generating the report
    #[serde(with = "duration_serde")]
    pub computation_time: Duration,

    /// Blend of the three composites, present only when all three have data
    pub overall_score: Option<u8>,

    pub recovery: CompositeScore,
    pub performance: CompositeScore,
    pub wellness: CompositeScore,
    pub strain: StrainScore,
    pub trends: TrendReport,

    /// Global advisories, highest priority first
    pub recommendations: Vec<Recommendation>,

    pub training_clearance: TrainingClearance,
}

impl IntelligenceReport {
    /// Compare everything except generation timestamp and duration
    pub fn scores_equal(&self, other: &IntelligenceReport) -> bool {
        self.subject_id == other.subject_id
            && self.source == other.source
            && self.date == other.date
            && self.overall_score == other.overall_score
            && self.recovery == other.recovery
            && self.performance == other.performance
            && self.wellness == other.wellness
            && self.strain == other.strain
            && self.trends == other.trends
            && self.recommendations == other.recommendations
            && self.training_clearance == other.training_clearance
    }

    /// Composites that could not be computed
    pub fn composites_without_data(&self) -> Vec<&CompositeScore> {
        [&self.recovery, &self.performance, &self.wellness]
            .into_iter()
            .filter(|c| c.insufficient_data)
            .collect()
    }
}

/// Scoring engine
#[derive(Debug, Clone)]
pub struct IntelligenceEngine {
    config: EngineConfig,
    trend_analyzer: TrendAnalyzer,
}

impl Default for IntelligenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl IntelligenceEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let trend_analyzer = TrendAnalyzer::new(
            config.trend_threshold_percent,
            config.weights.recovery.clone(),
        );
        Self {
            config,
            trend_analyzer,
        }
    }

    /// Like [`with_config`](Self::with_config), rejecting inconsistent weights
    pub fn try_with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate the snapshot, then generate its report
    pub fn try_generate_report(
        &self,
        snapshot: &MetricSnapshot,
        history: &[MetricSnapshot],
    ) -> Result<IntelligenceReport> {
        snapshot.validate()?;
        Ok(self.generate_report(snapshot, history))
    }

    /// Generate a report for `snapshot`
    ///
    /// `history` may hold earlier snapshots in any order; entries for other
    /// subjects or dated on/after the snapshot are ignored.
    #[instrument(
        name = "generate_report",
        skip_all,
        fields(subject = %snapshot.subject_id, date = %snapshot.date)
    )]
    pub fn generate_report(
        &self,
        snapshot: &MetricSnapshot,
        history: &[MetricSnapshot],
    ) -> IntelligenceReport {
        let start_time = Instant::now();

        for issue in snapshot.range_violations() {
            warn!(issue = %issue, "Ignoring out-of-range value");
        }

        let weights = &self.config.weights;

        let recovery = CompositeCalculator::recovery(snapshot, &weights.recovery);
        let performance = CompositeCalculator::performance(
            snapshot,
            self.performance_recovery_input(snapshot, history, &recovery),
            &weights.performance,
            self.config.sleep_baseline_hours,
        );
        let wellness = CompositeCalculator::wellness(snapshot, &weights.wellness);
        let overall_score =
            CompositeCalculator::overall(&recovery, &performance, &wellness, &weights.overall);

        let strain = StrainCalculator::calculate(&snapshot.activity);

        let window = trend_window(snapshot, history);
        let trends = self.trend_analyzer.analyze(&window);

        let recommendations = recommendations::synthesize(&RecommendationContext {
            recovery: &recovery,
            performance: &performance,
            wellness: &wellness,
            strain: &strain,
            trends: &trends,
        });

        let training_clearance = TrainingClearance::assess(recovery.value(), performance.value());

        let computation_time = start_time.elapsed();

        info!(
            overall = ?overall_score,
            recovery = recovery.score,
            performance = performance.score,
            wellness = wellness.score,
            strain = %strain.score,
            tier = ?training_clearance.tier,
            elapsed_us = computation_time.as_micros() as u64,
            "Report generated"
        );

        IntelligenceReport {
            subject_id: snapshot.subject_id.clone(),
            source: snapshot.source.clone(),
            date: snapshot.date,
            generated_at: Utc::now(),
            computation_time,
            overall_score,
            recovery,
            performance,
            wellness,
            strain,
            trends,
            recommendations,
            training_clearance,
        }
    }

    fn performance_recovery_input(
        &self,
        snapshot: &MetricSnapshot,
        history: &[MetricSnapshot],
        same_day: &CompositeScore,
    ) -> Option<u8> {
        match self.config.performance_recovery {
            RecoverySource::SameDay => same_day.value(),
            RecoverySource::PriorDay => {
                let yesterday = snapshot.date.pred_opt()?;
                history
                    .iter()
                    .find(|s| s.subject_id == snapshot.subject_id && s.date == yesterday)
                    .and_then(|prior| {
                        CompositeCalculator::recovery(prior, &self.config.weights.recovery).value()
                    })
            }
        }
    }
}

// Durations are serialized as whole milliseconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
