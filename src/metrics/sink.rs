use tokio::sync::mpsc;

use super::MetricEvent;

/// Append-only destination for journey samples. Safe to share across VUs.
pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricEvent);

    fn add_trend(&self, name: &'static str, value_ms: u64) {
        self.record(MetricEvent::Trend { name, value_ms });
    }

    fn add_counter(&self, name: &'static str, value: u64) {
        self.record(MetricEvent::Counter { name, value });
    }

    fn record_request(&self, tag: &'static str, latency_ms: u64, failed: bool) {
        self.record(MetricEvent::Request {
            tag,
            latency_ms,
            failed,
        });
    }

    fn record_check(&self, name: &'static str, passed: bool) {
        self.record(MetricEvent::Check { name, passed });
    }
}

/// Forwards events to the collector task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<MetricEvent>,
}

impl ChannelSink {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MetricEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MetricsSink for ChannelSink {
    fn record(&self, event: MetricEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Metrics collector closed; dropping {:?}.", event);
        }
    }
}

#[cfg(test)]
pub use memory::MemorySink;

#[cfg(test)]
mod memory {
    use std::sync::Mutex;

    use super::{MetricEvent, MetricsSink};
    use crate::metrics::{RunMetrics, types::check_rate_name};

    /// Keeps every event in memory so tests can assert on exact counts.
    #[derive(Debug, Default)]
    pub struct MemorySink {
        events: Mutex<Vec<MetricEvent>>,
    }

    impl MemorySink {
        #[must_use]
        pub fn events(&self) -> Vec<MetricEvent> {
            self.events
                .lock()
                .map(|events| events.clone())
                .unwrap_or_default()
        }

        #[must_use]
        pub fn counter(&self, name: &str) -> u64 {
            self.events()
                .iter()
                .filter_map(|event| {
                    if let MetricEvent::Counter { name: n, value } = event
                        && *n == name
                    {
                        Some(*value)
                    } else {
                        None
                    }
                })
                .sum()
        }

        #[must_use]
        pub fn trend_samples(&self, name: &str) -> usize {
            self.events()
                .iter()
                .filter(|event| matches!(event, MetricEvent::Trend { name: n, .. } if *n == name))
                .count()
        }

        #[must_use]
        pub fn request_tags(&self) -> Vec<&'static str> {
            self.events()
                .iter()
                .filter_map(|event| {
                    if let MetricEvent::Request { tag, .. } = event {
                        Some(*tag)
                    } else {
                        None
                    }
                })
                .collect()
        }

        #[must_use]
        pub fn failed_checks(&self) -> Vec<&'static str> {
            self.events()
                .iter()
                .filter_map(|event| {
                    if let MetricEvent::Check {
                        name,
                        passed: false,
                    } = event
                    {
                        Some(*name)
                    } else {
                        None
                    }
                })
                .collect()
        }

        /// Aggregate the recorded events the same way the collector would.
        ///
        /// # Errors
        ///
        /// Returns an error if a histogram update fails.
        pub fn aggregate(&self) -> Result<RunMetrics, crate::error::MetricsError> {
            let mut metrics = RunMetrics::default();
            for event in self.events() {
                metrics.apply(event)?;
            }
            Ok(metrics)
        }

        #[must_use]
        pub fn check_passes(&self, check: &str) -> u64 {
            self.aggregate()
                .ok()
                .and_then(|metrics| metrics.rate(&check_rate_name(check)).map(|rate| rate.hits))
                .unwrap_or(0)
        }
    }

    impl MetricsSink for MemorySink {
        fn record(&self, event: MetricEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }
    }
}
