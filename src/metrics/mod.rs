//! Metric events, the sink journeys write to, and the collector that aggregates them.
mod collector;
mod histogram;
mod sink;
mod types;


pub use collector::{ABORT_EVAL_INTERVAL, CollectedMetrics, setup_metrics_collector};
pub use histogram::LatencyHistogram;
#[cfg(test)]
pub use sink::MemorySink;
pub use sink::{ChannelSink, MetricsSink};
pub use types::{
    CHECKS, DROPPED_ITERATIONS, HTTP_REQ_DURATION, HTTP_REQ_FAILED, HTTP_REQS, ITERATION_DURATION,
    ITERATIONS, MetricEvent, RateStats, RunMetrics, TrendStats, check_rate_name,
    tagged_duration_name,
};
