//! Parallel batch scoring using rayon
//!
//! Reports for different subjects are independent, so a batch is scored with a
//! plain parallel map. Results come back in input order.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, warn, Level};

use crate::error::{Result, VitalRsError};
use crate::models::MetricSnapshot;
use crate::report::{IntelligenceEngine, IntelligenceReport};

/// One scoring request: a snapshot and the history used for its trends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDay {
    pub snapshot: MetricSnapshot,
    #[serde(default)]
    pub history: Vec<MetricSnapshot>,
}

impl SubjectDay {
    pub fn new(snapshot: MetricSnapshot) -> Self {
        Self {
            snapshot,
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<MetricSnapshot>) -> Self {
        self.history = history;
        self
    }
}

/// Configuration for batch scoring
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Worker threads; `None` uses the global rayon pool
    pub num_threads: Option<usize>,
    /// Show a progress bar on stderr
    pub show_progress: bool,
}

/// Outcome of scoring one request
#[derive(Debug)]
pub struct BatchItem {
    pub subject_id: String,
    pub result: Result<IntelligenceReport>,
}

/// Summary of a batch run
#[derive(Debug)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_duration_ms: u128,
    /// Per-request outcomes in input order
    pub items: Vec<BatchItem>,
}

impl BatchSummary {
    pub fn is_fully_successful(&self) -> bool {
        self.failed == 0
    }

    pub fn reports(&self) -> impl Iterator<Item = &IntelligenceReport> {
        self.items.iter().filter_map(|item| item.result.as_ref().ok())
    }

    /// Reports per second
    pub fn throughput(&self) -> f64 {
        if self.total_duration_ms == 0 {
            return 0.0;
        }
        self.successful as f64 / self.total_duration_ms as f64 * 1000.0
    }

    pub fn to_string_pretty(&self) -> String {
        format!(
            "Batch Scoring Summary\n  \
             Total: {}\n  \
             Successful: {}\n  \
             Failed: {}\n  \
             Total Time: {:.2}s\n  \
             Throughput: {:.1} reports/sec",
            self.total,
            self.successful,
            self.failed,
            self.total_duration_ms as f64 / 1000.0,
            self.throughput()
        )
    }
}

/// Scores many subject-days in parallel
pub struct BatchScorer {
    pub config: BatchConfig,
    engine: IntelligenceEngine,
}

impl BatchScorer {
    pub fn new(engine: IntelligenceEngine) -> Self {
        Self::with_config(engine, BatchConfig::default())
    }

    pub fn with_config(engine: IntelligenceEngine, config: BatchConfig) -> Self {
        Self { config, engine }
    }

    pub fn score(&self, requests: &[SubjectDay]) -> Result<BatchSummary> {
        let start_time = Instant::now();
        info!("Scoring {} subject-days", requests.len());

        let progress = if self.config.show_progress {
            let pb = ProgressBar::new(requests.len() as u64);
            if let Ok(style) =
                ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        let items = match self.config.num_threads {
            Some(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|e| VitalRsError::Internal(format!("Failed to create thread pool: {}", e)))?;
                pool.install(|| self.score_parallel(requests, progress.as_ref()))
            }
            None => self.score_parallel(requests, progress.as_ref()),
        };

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let successful = items.iter().filter(|item| item.result.is_ok()).count();
        let summary = BatchSummary {
            total: items.len(),
            successful,
            failed: items.len() - successful,
            total_duration_ms: start_time.elapsed().as_millis(),
            items,
        };

        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            duration_ms = summary.total_duration_ms as u64,
            "Batch scoring complete"
        );

        Ok(summary)
    }

    fn score_parallel(&self, requests: &[SubjectDay], progress: Option<&ProgressBar>) -> Vec<BatchItem> {
        requests
            .par_iter()
            .map(|request| {
                let result = self
                    .engine
                    .try_generate_report(&request.snapshot, &request.history);

                match &result {
                    Ok(_) => debug!(subject = %request.snapshot.subject_id, "Scored"),
                    Err(e) if e.severity().to_tracing_level() == Level::WARN => {
                        warn!(subject = %request.snapshot.subject_id, error = %e, "Rejected")
                    }
                    Err(e) => error!(subject = %request.snapshot.subject_id, error = %e, "Scoring failed"),
                }
                if let Some(pb) = progress {
                    pb.inc(1);
                }

                BatchItem {
                    subject_id: request.snapshot.subject_id.clone(),
                    result,
                }
            })
            .collect()
    }
}
