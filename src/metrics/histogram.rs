use hdrhistogram::Histogram;

use crate::error::MetricsError;

/// Millisecond latency distribution backing every trend metric.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new(3).map_err(|err| MetricsError::Histogram {
            context: "create",
            message: err.to_string(),
        })?;
        Ok(Self { hist })
    }

    /// Record a latency value in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency_ms: u64) -> Result<(), MetricsError> {
        let value = latency_ms.max(1);
        self.hist
            .record(value)
            .map_err(|err| MetricsError::Histogram {
                context: "record",
                message: err.to_string(),
            })
    }

    /// Value at `percentile` (0.0..=100.0), or 0 when nothing was recorded.
    #[must_use]
    pub fn value_at_percentile(&self, percentile: f64) -> u64 {
        if self.count() == 0 {
            return 0;
        }
        self.hist.value_at_percentile(percentile)
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}
