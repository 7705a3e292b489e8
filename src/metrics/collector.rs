use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, error};

use crate::error::MetricsError;
use crate::shutdown::ShutdownSender;
use crate::thresholds::{ThresholdOutcome, ThresholdSet};

use super::{MetricEvent, RunMetrics};

/// How often abort-on-fail thresholds are checked while the run is live.
pub const ABORT_EVAL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct CollectedMetrics {
    pub metrics: RunMetrics,
    /// The abort-on-fail rule that stopped the run, if any.
    pub aborted_by: Option<ThresholdOutcome>,
}

/// Spawn the task that folds every sample into [`RunMetrics`].
///
/// The task ends once `finish_rx` fires (or its sender is dropped), after
/// draining whatever is still queued, or when every sink has been dropped.
#[must_use]
pub fn setup_metrics_collector(
    mut metrics_rx: mpsc::UnboundedReceiver<MetricEvent>,
    abort_rules: ThresholdSet,
    shutdown_tx: &ShutdownSender,
    mut finish_rx: oneshot::Receiver<()>,
    eval_interval: Duration,
) -> JoinHandle<Result<CollectedMetrics, MetricsError>> {
    let shutdown_tx = shutdown_tx.clone();

    tokio::spawn(async move {
        let mut metrics = RunMetrics::default();
        let mut aborted_by: Option<ThresholdOutcome> = None;
        let mut abort_interval = tokio::time::interval(eval_interval);
        abort_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let watch_aborts = !abort_rules.is_empty();

        loop {
            tokio::select! {
                maybe_event = metrics_rx.recv() => {
                    let Some(event) = maybe_event else {
                        debug!("All metric sinks closed.");
                        break;
                    };
                    metrics.apply(event)?;
                },
                _ = &mut finish_rx => {
                    while let Ok(event) = metrics_rx.try_recv() {
                        metrics.apply(event)?;
                    }
                    break;
                },
                _ = abort_interval.tick(), if watch_aborts && aborted_by.is_none() => {
                    if let Some(breach) = abort_rules.first_abort_breach(&metrics) {
                        error!(
                            "Threshold {} '{}' crossed (observed {}); aborting run.",
                            breach.metric,
                            breach.expression,
                            breach.observed.as_deref().unwrap_or("n/a")
                        );
                        drop(shutdown_tx.send(()));
                        aborted_by = Some(breach);
                    }
                },
            }
        }

        Ok(CollectedMetrics {
            metrics,
            aborted_by,
        })
    })
}
