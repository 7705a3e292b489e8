use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::metrics::{RunMetrics, TrendStats};
use crate::runner::WorkloadPlan;
use crate::thresholds::{SCALE, ThresholdOutcome, format_fixed};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendSummary {
    pub count: u64,
    /// Mean in milliseconds with two decimals.
    pub avg: String,
    pub min: u64,
    pub med: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
    pub max: u64,
}

impl TrendSummary {
    #[must_use]
    pub fn from_stats(stats: &TrendStats) -> Self {
        Self {
            count: stats.count(),
            avg: format_x100(stats.avg_scaled(100)),
            min: stats.min_ms(),
            med: stats.percentile_ms(50.0),
            p90: stats.percentile_ms(90.0),
            p95: stats.percentile_ms(95.0),
            p99: stats.percentile_ms(99.0),
            max: stats.max_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateSummary {
    pub passes: u64,
    pub fails: u64,
    pub rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkloadRow {
    pub name: String,
    pub value: String,
}

/// What the run looked like from the outside: profile names and plan.
#[derive(Debug, Clone)]
pub struct ReportContext<'run> {
    pub title: &'run str,
    pub workload_profile: &'run str,
    pub threshold_profile: &'run str,
    pub plan: &'run WorkloadPlan,
    pub vus_max: u64,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

/// Serializable end-of-run summary, the contents of `summary.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub title: String,
    pub generated_at: String,
    pub started_at: String,
    pub duration_ms: u64,
    pub workload_profile: String,
    pub threshold_profile: String,
    pub vus_max: u64,
    pub workload: Vec<WorkloadRow>,
    pub trends: BTreeMap<String, TrendSummary>,
    pub rates: BTreeMap<String, RateSummary>,
    pub counters: BTreeMap<String, u64>,
    pub thresholds: Vec<ThresholdOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted_by: Option<ThresholdOutcome>,
    pub passed: bool,
}

impl RunReport {
    #[must_use]
    pub fn failed_thresholds(&self) -> usize {
        self.thresholds
            .iter()
            .filter(|outcome| !outcome.passed)
            .count()
    }

    #[must_use]
    pub fn trend(&self, name: &str) -> Option<&TrendSummary> {
        self.trends.get(name)
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }
}

#[must_use]
pub fn build_report(
    context: &ReportContext<'_>,
    metrics: &RunMetrics,
    thresholds: Vec<ThresholdOutcome>,
    aborted_by: Option<ThresholdOutcome>,
) -> RunReport {
    let passed = aborted_by.is_none() && thresholds.iter().all(|outcome| outcome.passed);
    RunReport {
        title: context.title.to_owned(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        started_at: context
            .started_at
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        duration_ms: u64::try_from(context.duration.as_millis()).unwrap_or(u64::MAX),
        workload_profile: context.workload_profile.to_owned(),
        threshold_profile: context.threshold_profile.to_owned(),
        vus_max: context.vus_max,
        workload: context
            .plan
            .describe()
            .into_iter()
            .map(|(name, value)| WorkloadRow { name, value })
            .collect(),
        trends: metrics
            .trends()
            .map(|(name, stats)| (name.to_owned(), TrendSummary::from_stats(stats)))
            .collect(),
        rates: metrics
            .rates()
            .map(|(name, rate)| {
                (
                    name.to_owned(),
                    RateSummary {
                        passes: rate.hits,
                        fails: rate.misses(),
                        rate: format_fixed(rate.rate_scaled(SCALE)),
                    },
                )
            })
            .collect(),
        counters: metrics
            .counters()
            .map(|(name, value)| (name.to_owned(), value))
            .collect(),
        thresholds,
        aborted_by,
        passed,
    }
}

/// `1234` hundredths render as `12.34`.
#[must_use]
pub fn format_x100(value: u64) -> String {
    format!("{}.{:02}", value / 100, value % 100)
}
