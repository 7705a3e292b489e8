//! k6-style threshold expressions evaluated against collected run metrics.
mod parse;
mod profiles;


use serde::Serialize;

use crate::metrics::{RunMetrics, TrendStats};

pub use parse::parse_fixed;
pub use profiles::{
    AUTH_FAILURE_LIMIT, ManualThresholds, ThresholdProfile, manual_thresholds, profile_thresholds,
};

/// Fixed-point scale for threshold values: `0.01` is stored as `100`.
pub const SCALE: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    Percentile(f64),
    Avg,
    Min,
    Max,
    Med,
    Rate,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparison {
    #[must_use]
    pub const fn holds(self, observed: u64, limit: u64) -> bool {
        match self {
            Comparison::Lt => observed < limit,
            Comparison::Le => observed <= limit,
            Comparison::Gt => observed > limit,
            Comparison::Ge => observed >= limit,
            Comparison::Eq => observed == limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdRule {
    metric: String,
    expression: String,
    aggregation: Aggregation,
    comparison: Comparison,
    limit: u64,
    abort_on_fail: bool,
}

impl ThresholdRule {
    /// Parse `expression` (e.g. `p(95)<800`) for `metric`.
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregation, operator or value is malformed.
    pub fn parse(
        metric: &str,
        expression: &str,
        abort_on_fail: bool,
    ) -> Result<Self, crate::error::ValidationError> {
        let (aggregation, comparison, limit) = parse::parse_expression(metric, expression)?;
        Ok(Self {
            metric: metric.to_owned(),
            expression: expression.trim().to_owned(),
            aggregation,
            comparison,
            limit,
            abort_on_fail,
        })
    }

    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[must_use]
    pub const fn abort_on_fail(&self) -> bool {
        self.abort_on_fail
    }

    /// Observed value in fixed point, or `None` when the metric has no samples.
    #[must_use]
    pub fn observe(&self, metrics: &RunMetrics) -> Option<u64> {
        let metric = self.metric.as_str();
        match self.aggregation {
            Aggregation::Count => {
                let count = metrics
                    .trend(metric)
                    .map(|trend| trend.count())
                    .or_else(|| metrics.rate(metric).map(|rate| rate.total))
                    .unwrap_or_else(|| metrics.counter(metric));
                Some(count.saturating_mul(SCALE))
            }
            Aggregation::Rate => metrics
                .rate(metric)
                .filter(|rate| rate.total > 0)
                .map(|rate| rate.rate_scaled(SCALE)),
            Aggregation::Percentile(percentile) => {
                trend_value(metrics, metric, |trend| trend.percentile_ms(percentile))
            }
            Aggregation::Med => trend_value(metrics, metric, |trend| trend.percentile_ms(50.0)),
            Aggregation::Min => trend_value(metrics, metric, TrendStats::min_ms),
            Aggregation::Max => trend_value(metrics, metric, TrendStats::max_ms),
            Aggregation::Avg => metrics
                .trend(metric)
                .filter(|trend| trend.count() > 0)
                .map(|trend| trend.avg_scaled(SCALE)),
        }
    }

    /// Metrics without samples pass, matching how unreached counters read as zero.
    #[must_use]
    pub fn evaluate(&self, metrics: &RunMetrics) -> ThresholdOutcome {
        let observed = self.observe(metrics);
        let passed = observed.is_none_or(|value| self.comparison.holds(value, self.limit));
        ThresholdOutcome {
            metric: self.metric.clone(),
            expression: self.expression.clone(),
            observed: observed.map(format_fixed),
            passed,
            abort_on_fail: self.abort_on_fail,
        }
    }
}

fn trend_value<F>(metrics: &RunMetrics, metric: &str, read: F) -> Option<u64>
where
    F: Fn(&TrendStats) -> u64,
{
    metrics
        .trend(metric)
        .filter(|trend| trend.count() > 0)
        .map(|trend| read(trend).saturating_mul(SCALE))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThresholdOutcome {
    pub metric: String,
    pub expression: String,
    pub observed: Option<String>,
    pub passed: bool,
    pub abort_on_fail: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ThresholdSet {
    rules: Vec<ThresholdRule>,
}

impl ThresholdSet {
    /// Parse and append a rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is malformed.
    pub fn add(
        &mut self,
        metric: &str,
        expression: &str,
        abort_on_fail: bool,
    ) -> Result<(), crate::error::ValidationError> {
        self.rules
            .push(ThresholdRule::parse(metric, expression, abort_on_fail)?);
        Ok(())
    }

    #[must_use]
    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Replace every rule on `metric` with `rules` (later definitions win).
    pub fn replace_metric(&mut self, metric: &str, rules: Vec<ThresholdRule>) {
        self.rules.retain(|rule| rule.metric != metric);
        self.rules.extend(rules);
    }

    /// Only the rules that stop the run when crossed.
    #[must_use]
    pub fn abort_rules(&self) -> ThresholdSet {
        ThresholdSet {
            rules: self
                .rules
                .iter()
                .filter(|rule| rule.abort_on_fail)
                .cloned()
                .collect(),
        }
    }

    #[must_use]
    pub fn evaluate(&self, metrics: &RunMetrics) -> Vec<ThresholdOutcome> {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(metrics))
            .collect()
    }

    #[must_use]
    pub fn first_abort_breach(&self, metrics: &RunMetrics) -> Option<ThresholdOutcome> {
        self.rules
            .iter()
            .filter(|rule| rule.abort_on_fail)
            .map(|rule| rule.evaluate(metrics))
            .find(|outcome| !outcome.passed)
    }
}

/// Render a fixed-point value as a trimmed decimal (`25_000` -> `2.5`).
#[must_use]
pub fn format_fixed(value: u64) -> String {
    let whole = value.checked_div(SCALE).unwrap_or(0);
    let fraction = value.checked_rem(SCALE).unwrap_or(0);
    let mut out = whole.to_string();
    if fraction > 0 {
        let digits = format!("{:04}", fraction);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}
