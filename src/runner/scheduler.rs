use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::{AbortHandle, JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::JourneyDefect;
use crate::identity::{UserDirectory, VirtualUser};
use crate::journey::{JourneyOrchestrator, JourneyOutcome};
use crate::metrics::{MetricEvent, MetricsSink};
use crate::shutdown::{ShutdownReceiver, ShutdownSender};

use super::{Executor, GRACEFUL_STOP, VuRamp, VuStage, WorkloadPlan};

const RAMP_TICK: Duration = Duration::from_secs(1);

/// One journey pass for one VU.
#[async_trait]
pub trait IterationRunner: Send + Sync {
    async fn run(&self, user: &VirtualUser) -> Result<JourneyOutcome, JourneyDefect>;
}

#[async_trait]
impl IterationRunner for JourneyOrchestrator {
    async fn run(&self, user: &VirtualUser) -> Result<JourneyOutcome, JourneyDefect> {
        self.run_iteration(user).await
    }
}

/// Iteration counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub iterations: u64,
    pub successful: u64,
    pub failed: u64,
    pub auth_failures: u64,
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Tally {
    iterations: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
    auth_failures: AtomicU64,
    dropped: AtomicU64,
}

impl Tally {
    fn record(&self, outcome: &JourneyOutcome) {
        self.iterations.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            JourneyOutcome::Success { .. } => &self.successful,
            JourneyOutcome::ValidationFailure { .. } => &self.failed,
            JourneyOutcome::AuthenticationFailure { .. } => &self.auth_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> RunTally {
        RunTally {
            iterations: self.iterations.load(Ordering::Relaxed),
            successful: self.successful.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

struct Shared {
    runner: Arc<dyn IterationRunner>,
    directory: UserDirectory,
    sink: Arc<dyn MetricsSink>,
    shutdown_tx: ShutdownSender,
    stopping: AtomicBool,
    defect: Mutex<Option<JourneyDefect>>,
    tally: Tally,
}

impl Shared {
    fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.stopping.store(true, Ordering::SeqCst);
    }

    async fn iterate(&self, vu: u64) {
        let user = self.directory.user(vu);
        let start = Instant::now();
        let result = self.runner.run(&user).await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.sink.record(MetricEvent::Iteration { duration_ms });

        match result {
            Ok(outcome) => self.tally.record(&outcome),
            Err(defect) => {
                error!("{}; stopping the run.", defect);
                self.stop();
                if let Ok(mut slot) = self.defect.lock()
                    && slot.is_none()
                {
                    *slot = Some(defect);
                }
                drop(self.shutdown_tx.send(()));
            }
        }
    }

    fn drop_iteration(&self) {
        self.tally.dropped.fetch_add(1, Ordering::Relaxed);
        self.sink.record(MetricEvent::DroppedIteration);
    }
}

/// A VU started by the ramping executor.
struct RampVu {
    vu: u64,
    stop: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
    abort: AbortHandle,
}

/// Drives virtual users through a [`WorkloadPlan`].
pub struct Scheduler {
    shared: Arc<Shared>,
    ramp_tick: Duration,
    graceful_stop: Duration,
}

impl Scheduler {
    #[must_use]
    pub fn new(
        runner: Arc<dyn IterationRunner>,
        directory: UserDirectory,
        sink: Arc<dyn MetricsSink>,
        shutdown_tx: &ShutdownSender,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                runner,
                directory,
                sink,
                shutdown_tx: shutdown_tx.clone(),
                stopping: AtomicBool::new(false),
                defect: Mutex::new(None),
                tally: Tally::default(),
            }),
            ramp_tick: RAMP_TICK,
            graceful_stop: GRACEFUL_STOP,
        }
    }

    /// How often the ramping executor re-reads its VU target.
    #[must_use]
    pub const fn with_ramp_tick(mut self, tick: Duration) -> Self {
        self.ramp_tick = tick;
        self
    }

    #[must_use]
    pub const fn with_graceful_stop(mut self, grace: Duration) -> Self {
        self.graceful_stop = grace;
        self
    }

    /// Run the plan to completion, or until shutdown is signalled.
    ///
    /// # Errors
    ///
    /// Returns the first harness defect any VU hit; the run stops as soon
    /// as one is seen.
    pub async fn run(&self, plan: &WorkloadPlan) -> Result<RunTally, JourneyDefect> {
        let shutdown_rx = self.shared.shutdown_tx.subscribe();
        info!(
            "Starting scenario '{}' ({}), up to {} VUs",
            plan.name,
            plan.executor.name(),
            plan.executor.vus_max()
        );
        match &plan.executor {
            Executor::PerVuIterations {
                vus,
                iterations,
                max_duration,
            } => {
                self.per_vu_iterations(*vus, *iterations, *max_duration, shutdown_rx)
                    .await;
            }
            Executor::ConstantArrivalRate {
                rate,
                time_unit,
                duration,
                pre_allocated_vus,
            } => {
                self.constant_arrival_rate(
                    *rate,
                    *time_unit,
                    *duration,
                    *pre_allocated_vus,
                    shutdown_rx,
                )
                .await;
            }
            Executor::RampingVus {
                start_vus,
                stages,
                graceful_ramp_down,
            } => {
                self.ramping_vus(*start_vus, stages, *graceful_ramp_down, shutdown_rx)
                    .await;
            }
        }

        let defect = self
            .shared
            .defect
            .lock()
            .map(|mut slot| slot.take())
            .unwrap_or_default();
        if let Some(defect) = defect {
            return Err(defect);
        }
        let tally = self.shared.tally.snapshot();
        info!(
            "Scenario '{}' finished: {} iterations, {} dropped",
            plan.name, tally.iterations, tally.dropped
        );
        Ok(tally)
    }

    async fn per_vu_iterations(
        &self,
        vus: u64,
        iterations: u64,
        max_duration: Duration,
        mut shutdown_rx: ShutdownReceiver,
    ) {
        let mut tasks = JoinSet::new();
        for vu in 1..=vus {
            let shared = Arc::clone(&self.shared);
            tasks.spawn(async move {
                for iteration in 1..=iterations {
                    if shared.is_stopping() {
                        break;
                    }
                    debug!("VU {}: iteration {}/{}", vu, iteration, iterations);
                    shared.iterate(vu).await;
                }
            });
        }

        tokio::select! {
            () = join_all(&mut tasks) => return,
            () = tokio::time::sleep(max_duration) => {
                warn!("Max duration reached before every VU finished its iterations.");
            },
            result = shutdown_rx.recv() => log_stop(result),
        }
        self.shared.stop();
        drain(&mut tasks, self.graceful_stop).await;
    }

    async fn constant_arrival_rate(
        &self,
        rate: u64,
        time_unit: Duration,
        duration: Duration,
        pre_allocated_vus: u64,
        mut shutdown_rx: ShutdownReceiver,
    ) {
        let spacing = u32::try_from(rate.max(1))
            .ok()
            .and_then(|rate| time_unit.checked_div(rate))
            .unwrap_or(time_unit)
            .max(Duration::from_millis(1));
        let (idle_tx, mut idle_rx) = mpsc::unbounded_channel::<u64>();
        for vu in 1..=pre_allocated_vus.max(1) {
            drop(idle_tx.send(vu));
        }

        let mut tasks = JoinSet::new();
        let mut ticker = tokio::time::interval(spacing);
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = ticker.tick() => {},
                () = &mut deadline => break,
                result = shutdown_rx.recv() => {
                    log_stop(result);
                    break;
                },
            }
            if self.shared.is_stopping() {
                break;
            }
            reap_finished(&mut tasks);
            match idle_rx.try_recv() {
                Ok(vu) => {
                    let shared = Arc::clone(&self.shared);
                    let idle_tx = idle_tx.clone();
                    tasks.spawn(async move {
                        shared.iterate(vu).await;
                        drop(idle_tx.send(vu));
                    });
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                    warn!("No idle VU for a scheduled iteration; dropping it.");
                    self.shared.drop_iteration();
                }
            }
        }

        self.shared.stop();
        drain(&mut tasks, self.graceful_stop).await;
    }

    async fn ramping_vus(
        &self,
        start_vus: u64,
        stages: &[VuStage],
        graceful_ramp_down: Duration,
        mut shutdown_rx: ShutdownReceiver,
    ) {
        let ramp = VuRamp::new(start_vus, stages.to_vec());
        let started = Instant::now();
        let mut tasks = JoinSet::new();
        let mut active: Vec<RampVu> = Vec::new();
        let mut retiring: Vec<RampVu> = Vec::new();
        let mut reapers: Vec<JoinHandle<()>> = Vec::new();
        let mut ticker = tokio::time::interval(self.ramp_tick);

        loop {
            tokio::select! {
                _ = ticker.tick() => {},
                result = shutdown_rx.recv() => {
                    log_stop(result);
                    break;
                },
            }
            if self.shared.is_stopping() {
                break;
            }
            let Some(target) = ramp.target_at(started.elapsed()) else {
                break;
            };
            retiring.retain(|vu| !vu.done.load(Ordering::SeqCst));
            let current = u64::try_from(active.len()).unwrap_or(u64::MAX);
            if target > current {
                debug!("Ramping up to {} VUs", target);
                for _ in current..target {
                    let vu = lowest_free_id(&active, &retiring);
                    active.push(self.spawn_looping_vu(&mut tasks, vu));
                }
            } else if target < current {
                debug!("Ramping down to {} VUs", target);
                while u64::try_from(active.len()).unwrap_or(u64::MAX) > target {
                    let Some(vu) = active.pop() else {
                        break;
                    };
                    vu.stop.store(true, Ordering::SeqCst);
                    reapers.push(reap_after(&vu, graceful_ramp_down));
                    retiring.push(vu);
                }
            }
        }

        self.shared.stop();
        drain(&mut tasks, self.graceful_stop).await;
        for reaper in reapers {
            reaper.abort();
        }
    }

    fn spawn_looping_vu(&self, tasks: &mut JoinSet<()>, vu: u64) -> RampVu {
        let stop = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicBool::new(false));
        let shared = Arc::clone(&self.shared);
        let (task_stop, task_done) = (Arc::clone(&stop), Arc::clone(&done));
        let abort = tasks.spawn(async move {
            while !shared.is_stopping() && !task_stop.load(Ordering::SeqCst) {
                shared.iterate(vu).await;
            }
            task_done.store(true, Ordering::SeqCst);
        });
        RampVu {
            vu,
            stop,
            done,
            abort,
        }
    }
}

/// Interrupt a retired VU that is still mid-iteration after `grace`.
fn reap_after(vu: &RampVu, grace: Duration) -> JoinHandle<()> {
    let abort = vu.abort.clone();
    let done = Arc::clone(&vu.done);
    let id = vu.vu;
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        if !done.load(Ordering::SeqCst) {
            warn!("VU {} still running after graceful ramp-down; interrupting.", id);
            abort.abort();
            done.store(true, Ordering::SeqCst);
        }
    })
}

/// Smallest VU number not held by a running or retiring VU, so pool
/// identities are never shared by two live sessions.
fn lowest_free_id(active: &[RampVu], retiring: &[RampVu]) -> u64 {
    let mut candidate: u64 = 1;
    while active
        .iter()
        .chain(retiring.iter())
        .any(|vu| vu.vu == candidate)
    {
        candidate = candidate.saturating_add(1);
    }
    candidate
}

fn log_stop(result: Result<(), RecvError>) {
    match result {
        Ok(()) | Err(RecvError::Lagged(_)) => {
            info!("Stop requested; letting in-flight iterations finish.");
        }
        Err(RecvError::Closed) => debug!("Shutdown channel closed."),
    }
}

/// Drop handles of iterations that already finished; returns how many.
pub(super) fn reap_finished(tasks: &mut JoinSet<()>) -> usize {
    let mut reaped: usize = 0;
    while tasks.try_join_next().is_some() {
        reaped = reaped.saturating_add(1);
    }
    reaped
}

async fn join_all(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.join_next().await {
        if let Err(err) = result
            && err.is_panic()
        {
            error!("VU task panicked: {}", err);
        }
    }
}

/// Wait up to `grace` for in-flight iterations, then interrupt the rest.
async fn drain(tasks: &mut JoinSet<()>, grace: Duration) {
    if tokio::time::timeout(grace, join_all(tasks)).await.is_err() {
        warn!(
            "{} VU(s) still running after the graceful stop; interrupting.",
            tasks.len()
        );
        tasks.abort_all();
        join_all(tasks).await;
    }
}
