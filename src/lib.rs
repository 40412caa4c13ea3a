// Library interface for VitalRS modules
// This allows integration tests and the CLI to access the scoring engine

pub mod batch;
pub mod classify;
pub mod composite;
pub mod config;
pub mod display;
pub mod error;
pub mod factors;
pub mod logging;
pub mod models;
pub mod recommendations;
pub mod report;
pub mod strain;
pub mod trends;

// Re-export commonly used types for convenience
pub use models::*;
pub use batch::{BatchConfig, BatchScorer, BatchSummary, SubjectDay};
pub use classify::{CompositeKind, Grade, Status};
pub use composite::{weighted_composite, CompositeCalculator, CompositeScore};
pub use config::{AppConfig, EngineConfig, RecoverySource, ScoringWeights};
pub use error::{ConfigError, Result, SnapshotError, VitalRsError};
pub use factors::{FactorKind, FactorResult, FactorScore, FactorScorer};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use recommendations::{
    ClearanceTier, ExerciseCategory, Priority, Recommendation, RecommendationKind,
    TrainingClearance,
};
pub use report::{IntelligenceEngine, IntelligenceReport};
pub use strain::{StrainCalculator, StrainLevel, StrainScore};
pub use trends::{MetricTrend, TrendAnalyzer, TrendDirection, TrendMetric, TrendReport};
