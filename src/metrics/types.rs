use std::collections::BTreeMap;

use crate::error::MetricsError;

use super::LatencyHistogram;

pub const HTTP_REQS: &str = "http_reqs";
pub const HTTP_REQ_DURATION: &str = "http_req_duration";
pub const HTTP_REQ_FAILED: &str = "http_req_failed";
pub const CHECKS: &str = "checks";
pub const ITERATIONS: &str = "iterations";
pub const ITERATION_DURATION: &str = "iteration_duration";
pub const DROPPED_ITERATIONS: &str = "dropped_iterations";

/// One sample emitted by a virtual user. Names are static so events stay `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricEvent {
    Trend {
        name: &'static str,
        value_ms: u64,
    },
    Counter {
        name: &'static str,
        value: u64,
    },
    Request {
        tag: &'static str,
        latency_ms: u64,
        failed: bool,
    },
    Check {
        name: &'static str,
        passed: bool,
    },
    Iteration {
        duration_ms: u64,
    },
    DroppedIteration,
}

/// Name of the per-tag request duration trend, e.g. `http_req_duration{name:GetHomePage}`.
#[must_use]
pub fn tagged_duration_name(tag: &str) -> String {
    format!("{}{{name:{}}}", HTTP_REQ_DURATION, tag)
}

#[must_use]
pub fn check_rate_name(check: &str) -> String {
    format!("{}{{check:{}}}", CHECKS, check)
}

#[derive(Debug, Clone)]
pub struct TrendStats {
    histogram: LatencyHistogram,
    sum_ms: u128,
    min_ms: u64,
    max_ms: u64,
}

impl TrendStats {
    /// Create an empty trend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            histogram: LatencyHistogram::new()?,
            sum_ms: 0,
            min_ms: u64::MAX,
            max_ms: 0,
        })
    }

    /// Record one sample in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram rejects the value.
    pub fn record(&mut self, value_ms: u64) -> Result<(), MetricsError> {
        self.histogram.record(value_ms)?;
        self.sum_ms = self.sum_ms.saturating_add(u128::from(value_ms));
        self.min_ms = self.min_ms.min(value_ms);
        self.max_ms = self.max_ms.max(value_ms);
        Ok(())
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.histogram.count()
    }

    #[must_use]
    pub fn min_ms(&self) -> u64 {
        if self.count() == 0 { 0 } else { self.min_ms }
    }

    #[must_use]
    pub const fn max_ms(&self) -> u64 {
        self.max_ms
    }

    /// Mean in milliseconds scaled by `scale` (integer fixed point).
    #[must_use]
    pub fn avg_scaled(&self, scale: u64) -> u64 {
        let count = u128::from(self.count());
        let scaled = self.sum_ms.saturating_mul(u128::from(scale));
        let avg = scaled.checked_div(count).unwrap_or(0);
        u64::try_from(avg).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn avg_ms(&self) -> u64 {
        self.avg_scaled(1)
    }

    #[must_use]
    pub fn percentile_ms(&self, percentile: f64) -> u64 {
        self.histogram.value_at_percentile(percentile)
    }
}

/// Fraction of boolean samples that were `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateStats {
    pub hits: u64,
    pub total: u64,
}

impl RateStats {
    pub fn add(&mut self, hit: bool) {
        self.total = self.total.saturating_add(1);
        if hit {
            self.hits = self.hits.saturating_add(1);
        }
    }

    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.total.saturating_sub(self.hits)
    }

    /// Rate scaled by `scale`, e.g. `rate_scaled(10_000)` of 1 in 4 is 2_500.
    #[must_use]
    pub fn rate_scaled(&self, scale: u64) -> u64 {
        let hits = u128::from(self.hits).saturating_mul(u128::from(scale));
        let rate = hits.checked_div(u128::from(self.total)).unwrap_or(0);
        u64::try_from(rate).unwrap_or(u64::MAX)
    }
}

/// Everything the collector aggregated for one run.
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    trends: BTreeMap<String, TrendStats>,
    rates: BTreeMap<String, RateStats>,
    counters: BTreeMap<String, u64>,
}

impl RunMetrics {
    /// Fold one event into the aggregate.
    ///
    /// # Errors
    ///
    /// Returns an error if a histogram cannot be created or updated.
    pub fn apply(&mut self, event: MetricEvent) -> Result<(), MetricsError> {
        match event {
            MetricEvent::Trend { name, value_ms } => self.record_trend(name, value_ms)?,
            MetricEvent::Counter { name, value } => self.increment(name, value),
            MetricEvent::Request {
                tag,
                latency_ms,
                failed,
            } => {
                self.increment(HTTP_REQS, 1);
                self.record_trend(HTTP_REQ_DURATION, latency_ms)?;
                self.record_trend(&tagged_duration_name(tag), latency_ms)?;
                self.add_rate(HTTP_REQ_FAILED, failed);
            }
            MetricEvent::Check { name, passed } => {
                self.add_rate(CHECKS, passed);
                self.add_rate(&check_rate_name(name), passed);
            }
            MetricEvent::Iteration { duration_ms } => {
                self.increment(ITERATIONS, 1);
                self.record_trend(ITERATION_DURATION, duration_ms)?;
            }
            MetricEvent::DroppedIteration => self.increment(DROPPED_ITERATIONS, 1),
        }
        Ok(())
    }

    fn record_trend(&mut self, name: &str, value_ms: u64) -> Result<(), MetricsError> {
        if let Some(trend) = self.trends.get_mut(name) {
            return trend.record(value_ms);
        }
        let mut trend = TrendStats::new()?;
        trend.record(value_ms)?;
        self.trends.insert(name.to_owned(), trend);
        Ok(())
    }

    fn increment(&mut self, name: &str, value: u64) {
        let entry = self.counters.entry(name.to_owned()).or_insert(0);
        *entry = entry.saturating_add(value);
    }

    fn add_rate(&mut self, name: &str, hit: bool) {
        self.rates.entry(name.to_owned()).or_default().add(hit);
    }

    #[must_use]
    pub fn trend(&self, name: &str) -> Option<&TrendStats> {
        self.trends.get(name)
    }

    #[must_use]
    pub fn rate(&self, name: &str) -> Option<&RateStats> {
        self.rates.get(name)
    }

    /// Counter value; counters that never fired read as zero.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn trends(&self) -> impl Iterator<Item = (&str, &TrendStats)> {
        self.trends.iter().map(|(name, trend)| (name.as_str(), trend))
    }

    pub fn rates(&self) -> impl Iterator<Item = (&str, &RateStats)> {
        self.rates.iter().map(|(name, rate)| (name.as_str(), rate))
    }

    pub fn counters(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }
}
