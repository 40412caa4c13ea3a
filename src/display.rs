//! Terminal rendering for reports and batch summaries

use colored::*;
use tabled::{settings::Style, Table, Tabled};

use crate::batch::BatchSummary;
use crate::composite::CompositeScore;
use crate::recommendations::{ClearanceTier, ExerciseCategory, Priority};
use crate::report::IntelligenceReport;
use crate::trends::TrendDirection;

#[derive(Tabled)]
struct CompositeRow {
    #[tabled(rename = "Score")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Grade")]
    grade: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Factors")]
    factors: String,
}

impl CompositeRow {
    fn from_composite(composite: &CompositeScore) -> Self {
        let total = composite.factors.len() + composite.missing_factors.len();
        if composite.insufficient_data {
            return Self {
                name: composite.kind.to_string(),
                value: "-".to_string(),
                grade: "-".to_string(),
                status: composite.status.to_string(),
                factors: format!("0/{}", total),
            };
        }

        Self {
            name: composite.kind.to_string(),
            value: composite.score.to_string(),
            grade: composite.grade.to_string(),
            status: composite.status.to_string(),
            factors: format!("{}/{}", composite.factors.len(), total),
        }
    }
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Trend")]
    direction: String,
    #[tabled(rename = "Early")]
    early: String,
    #[tabled(rename = "Late")]
    late: String,
    #[tabled(rename = "Change")]
    change: String,
}

#[derive(Tabled)]
struct BatchRow {
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Overall")]
    overall: String,
    #[tabled(rename = "Recovery")]
    recovery: String,
    #[tabled(rename = "Readiness")]
    performance: String,
    #[tabled(rename = "Wellness")]
    wellness: String,
    #[tabled(rename = "Strain")]
    strain: String,
    #[tabled(rename = "Result")]
    result: String,
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}

fn score_color(score: u8) -> Color {
    match score {
        80..=100 => Color::Green,
        60..=79 => Color::Cyan,
        40..=59 => Color::Yellow,
        _ => Color::Red,
    }
}

fn join(categories: &[ExerciseCategory]) -> String {
    if categories.is_empty() {
        return "-".to_string();
    }
    categories
        .iter()
        .map(ExerciseCategory::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a report as human-readable text
pub fn render_report(report: &IntelligenceReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} {} ({}, {})\n\n",
        "Intelligence Report:".bold(),
        report.subject_id.bold(),
        report.date,
        report.source
    ));

    match report.overall_score {
        Some(score) => out.push_str(&format!(
            "Overall Score: {}\n\n",
            score.to_string().color(score_color(score)).bold()
        )),
        None => out.push_str(&format!(
            "Overall Score: {}\n\n",
            "insufficient data".dimmed()
        )),
    }

    let rows: Vec<CompositeRow> = [&report.recovery, &report.performance, &report.wellness]
        .into_iter()
        .map(CompositeRow::from_composite)
        .collect();
    out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    out.push('\n');

    out.push_str(&format!(
        "\n{} {} ({})\n",
        "Strain:".bold(),
        report.strain.score,
        report.strain.level
    ));
    out.push_str(&format!("  {}\n", report.strain.recommendation));

    let trend_rows: Vec<TrendRow> = report
        .trends
        .trends
        .iter()
        .map(|t| TrendRow {
            metric: t.metric.to_string(),
            direction: t.direction.to_string(),
            early: optional(t.early_mean, 1),
            late: optional(t.late_mean, 1),
            change: optional(t.change_percent, 1),
        })
        .collect();
    out.push_str(&format!(
        "\n{} ({} days)\n",
        "Trends".bold(),
        report.trends.window_size
    ));
    out.push_str(&Table::new(trend_rows).with(Style::rounded()).to_string());
    out.push('\n');

    let declining = report
        .trends
        .trends
        .iter()
        .filter(|t| t.direction == TrendDirection::Declining)
        .count();
    if declining > 0 {
        out.push_str(&format!(
            "{}\n",
            format!("{} metric(s) declining", declining).yellow()
        ));
    }

    if !report.recommendations.is_empty() {
        out.push_str(&format!("\n{}\n", "Recommendations".bold()));
        for rec in &report.recommendations {
            let tag = match rec.priority {
                Priority::High => "[HIGH]".red().bold(),
                Priority::Medium => "[MEDIUM]".yellow(),
                Priority::Low => "[LOW]".normal(),
            };
            out.push_str(&format!("  {} {}: {}\n", tag, rec.title, rec.message));
        }
    }

    for composite in [&report.recovery, &report.performance, &report.wellness] {
        if let Some((advisory, tips)) = composite.recommendations.split_first() {
            out.push_str(&format!("\n{}: {}\n", composite.kind.to_string().bold(), advisory));
            for tip in tips {
                out.push_str(&format!("  - {}\n", tip));
            }
        }
    }

    let clearance = &report.training_clearance;
    let tier = match clearance.tier {
        ClearanceTier::Green => clearance.tier.description().green(),
        ClearanceTier::Amber => clearance.tier.description().yellow(),
        ClearanceTier::Red => clearance.tier.description().red(),
    };
    out.push_str(&format!("\n{} {}\n", "Training Clearance:".bold(), tier.bold()));
    out.push_str(&format!("  Cleared: {}\n", join(&clearance.cleared)));
    out.push_str(&format!("  Caution: {}\n", join(&clearance.caution)));
    out.push_str(&format!("  Avoid:   {}\n", join(&clearance.avoid)));

    out
}

/// Render a batch summary table
pub fn render_batch_summary(summary: &BatchSummary) -> String {
    let rows: Vec<BatchRow> = summary
        .items
        .iter()
        .map(|item| match &item.result {
            Ok(report) => {
                let value = |c: &CompositeScore| c.value().map_or("-".to_string(), |v| v.to_string());
                BatchRow {
                    subject: item.subject_id.clone(),
                    overall: report
                        .overall_score
                        .map_or("-".to_string(), |v| v.to_string()),
                    recovery: value(&report.recovery),
                    performance: value(&report.performance),
                    wellness: value(&report.wellness),
                    strain: report.strain.score.to_string(),
                    result: "ok".to_string(),
                }
            }
            Err(e) => BatchRow {
                subject: item.subject_id.clone(),
                overall: "-".to_string(),
                recovery: "-".to_string(),
                performance: "-".to_string(),
                wellness: "-".to_string(),
                strain: "-".to_string(),
                result: e.user_message(),
            },
        })
        .collect();

    format!(
        "{}\n{}\n",
        Table::new(rows).with(Style::rounded()),
        summary.to_string_pretty()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchScorer, SubjectDay};
    use crate::models::MetricSnapshot;
    use crate::report::IntelligenceEngine;
    use chrono::NaiveDate;

    fn snapshot(subject: &str) -> MetricSnapshot {
        MetricSnapshot::new(subject, "fitbit", NaiveDate::from_ymd_opt(2024, 4, 2).unwrap())
            .with_hrv(72.0, None)
            .with_resting_heart_rate(50.0)
            .with_sleep(470, 95, 110, Some(91.0))
            .with_steps(11_000)
    }

    #[test]
    fn test_render_report_sections() {
        colored::control::set_override(false);
        let report = IntelligenceEngine::new().generate_report(&snapshot("athlete-1"), &[]);
        let text = render_report(&report);

        assert!(text.contains("Intelligence Report: athlete-1"));
        assert!(text.contains("Recovery"));
        assert!(text.contains("Performance Readiness"));
        assert!(text.contains("Wellness"));
        assert!(text.contains("Strain:"));
        assert!(text.contains("Training Clearance:"));
    }

    #[test]
    fn test_render_insufficient_data() {
        colored::control::set_override(false);
        let empty = MetricSnapshot::new("athlete-2", "fitbit", NaiveDate::from_ymd_opt(2024, 4, 2).unwrap());
        let report = IntelligenceEngine::new().generate_report(&empty, &[]);
        let text = render_report(&report);

        assert!(text.contains("Overall Score: insufficient data"));
        assert!(text.contains("Insufficient Data"));
    }

    #[test]
    fn test_render_batch_summary() {
        colored::control::set_override(false);
        let requests = vec![SubjectDay::new(snapshot("a")), SubjectDay::new(snapshot(""))];
        let summary = BatchScorer::new(IntelligenceEngine::new()).score(&requests).unwrap();
        let text = render_batch_summary(&summary);

        assert!(text.contains("Subject"));
        assert!(text.contains("ok"));
        assert!(text.contains("Failed: 1"));
    }
}
