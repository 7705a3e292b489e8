use std::time::Duration;

use super::VuStage;

/// Active-VU target over time for a ramping plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VuRamp {
    start_vus: u64,
    stages: Vec<VuStage>,
}

impl VuRamp {
    #[must_use]
    pub const fn new(start_vus: u64, stages: Vec<VuStage>) -> Self {
        Self { start_vus, stages }
    }

    #[must_use]
    pub fn total(&self) -> Duration {
        self.stages
            .iter()
            .fold(Duration::ZERO, |total, stage| total.saturating_add(stage.duration))
    }

    /// Target VU count `elapsed` into the run, or `None` once every stage
    /// has finished. Each stage moves linearly from the previous stage's
    /// target (or `start_vus`) to its own.
    #[must_use]
    pub fn target_at(&self, elapsed: Duration) -> Option<u64> {
        let mut stage_start = Duration::ZERO;
        let mut from = self.start_vus;
        for stage in &self.stages {
            let stage_end = stage_start.saturating_add(stage.duration);
            if elapsed < stage_end {
                let into = elapsed.saturating_sub(stage_start);
                return Some(interpolate(from, stage.target, into, stage.duration));
            }
            from = stage.target;
            stage_start = stage_end;
        }
        None
    }
}

fn interpolate(from: u64, to: u64, into: Duration, over: Duration) -> u64 {
    let span_ms = i128::try_from(over.as_millis()).unwrap_or(i128::MAX).max(1);
    let into_ms = i128::try_from(into.as_millis()).unwrap_or(i128::MAX).min(span_ms);

    let start = i128::from(from);
    let delta = i128::from(to).saturating_sub(start);
    let step = delta
        .saturating_mul(into_ms)
        .checked_div(span_ms)
        .unwrap_or(0);
    let value = start.saturating_add(step);
    if value < 0 {
        0
    } else {
        u64::try_from(value).unwrap_or(u64::MAX)
    }
}
