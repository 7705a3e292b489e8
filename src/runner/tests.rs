use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::error::{JourneyDefect, ValidationError};
use crate::identity::{UserDirectory, UserPoolSettings, VirtualUser};
use crate::journey::{JourneyOutcome, Stage};
use crate::metrics::{DROPPED_ITERATIONS, ITERATIONS, MemorySink, MetricsSink};
use crate::shutdown::shutdown_channel;
use crate::test_support::run_async_test;

/// Records which VUs ran and answers with a fixed outcome after `pause`.
struct StubRunner {
    pause: Duration,
    fail_vu: Option<u64>,
    defect_vu: Option<u64>,
    seen: Mutex<Vec<u64>>,
}

impl StubRunner {
    fn new(pause: Duration) -> Self {
        Self {
            pause,
            fail_vu: None,
            defect_vu: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<u64> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IterationRunner for StubRunner {
    async fn run(&self, user: &VirtualUser) -> Result<JourneyOutcome, JourneyDefect> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(user.id);
        }
        tokio::time::sleep(self.pause).await;
        if self.defect_vu == Some(user.id) {
            return Err(JourneyDefect {
                vu: user.id,
                stage: "origin",
                message: "bad URL".to_owned(),
            });
        }
        if self.fail_vu == Some(user.id) {
            return Ok(JourneyOutcome::ValidationFailure {
                stage: Stage::Origin,
                message: "Submitting the Origin page failed".to_owned(),
            });
        }
        Ok(JourneyOutcome::Success { reference: None })
    }
}

fn scheduler(runner: &Arc<StubRunner>, sink: &Arc<MemorySink>) -> Scheduler {
    let (shutdown_tx, _) = shutdown_channel();
    let runner: Arc<dyn IterationRunner> = runner.clone();
    let sink: Arc<dyn MetricsSink> = sink.clone();
    Scheduler::new(
        runner,
        UserDirectory::new(UserPoolSettings::default(), None),
        sink,
        &shutdown_tx,
    )
    .with_ramp_tick(Duration::from_millis(5))
    .with_graceful_stop(Duration::from_millis(200))
}

fn plan(executor: Executor) -> WorkloadPlan {
    WorkloadPlan {
        name: "test".to_owned(),
        executor,
    }
}

#[test]
fn profiles_match_published_workloads() -> Result<(), ValidationError> {
    let smoke = WorkloadProfile::Smoke.plan();
    if smoke.executor
        != (Executor::PerVuIterations {
            vus: 1,
            iterations: 5,
            max_duration: Duration::from_secs(600),
        })
    {
        return Err(ValidationError::from(format!("{:?}", smoke)));
    }
    let load = WorkloadProfile::Load.plan();
    if load.executor.name() != "constant-arrival-rate" || load.executor.vus_max() != 1 {
        return Err(ValidationError::from(format!("{:?}", load)));
    }
    let stress = WorkloadProfile::Stress.plan();
    if stress.executor.vus_max() != 200 || stress.executor.duration() != Duration::from_secs(32 * 60)
    {
        return Err(ValidationError::from(format!("{:?}", stress)));
    }
    let spike = WorkloadProfile::Spike.plan();
    if spike.executor.duration() != Duration::from_secs(120) {
        return Err(ValidationError::from(format!("{:?}", spike)));
    }
    Ok(())
}

#[test]
fn workload_names_parse_case_insensitively() -> Result<(), ValidationError> {
    let parsed: WorkloadProfile = " Stress ".parse()?;
    if parsed != WorkloadProfile::Stress {
        return Err(ValidationError::from(parsed.to_string()));
    }
    match "soak".parse::<WorkloadProfile>() {
        Err(ValidationError::UnknownWorkload { value }) if value == "soak" => Ok(()),
        other => Err(ValidationError::from(format!("{:?}", other))),
    }
}

#[test]
fn manual_overrides_build_a_ramp_from_one_vu() -> Result<(), ValidationError> {
    let overrides = ManualOverrides {
        vus_max: Some(20),
        hold: Some(Duration::from_secs(60)),
        ..ManualOverrides::default()
    };
    let plan = WorkloadPlan::resolve(WorkloadProfile::Load, &overrides);
    let Executor::RampingVus {
        start_vus, stages, ..
    } = &plan.executor
    else {
        return Err(ValidationError::from(format!("{:?}", plan)));
    };
    let expected = vec![
        VuStage::new(Duration::from_secs(300), 20),
        VuStage::new(Duration::from_secs(60), 20),
        VuStage::new(Duration::from_secs(120), 0),
    ];
    if *start_vus != 1 || *stages != expected || plan.name != "ramp_up_load" {
        return Err(ValidationError::from(format!("{:?}", plan)));
    }

    let untouched = WorkloadPlan::resolve(WorkloadProfile::Spike, &ManualOverrides::default());
    if untouched != WorkloadProfile::Spike.plan() {
        return Err(ValidationError::from("Profile replaced without overrides"));
    }
    Ok(())
}

#[test]
fn ramp_duration_override_keeps_profile_vus() -> Result<(), ValidationError> {
    let overrides = ManualOverrides {
        ramp_up: Some(Duration::from_secs(30)),
        ..ManualOverrides::default()
    };
    let plan = WorkloadPlan::resolve(WorkloadProfile::Stress, &overrides);
    if plan.executor.vus_max() != 200 {
        return Err(ValidationError::from(format!("{:?}", plan)));
    }
    Ok(())
}

#[test]
fn vus_max_prefers_explicit_value() -> Result<(), ValidationError> {
    let smoke = WorkloadProfile::Smoke.plan();
    let idle = plan(Executor::RampingVus {
        start_vus: 0,
        stages: Vec::new(),
        graceful_ramp_down: GRACEFUL_STOP,
    });
    let resolved = (smoke.vus_max(None), smoke.vus_max(Some(12)), idle.vus_max(None));
    if resolved != (1, 12, DEFAULT_VUS_MAX) {
        return Err(ValidationError::from(format!("{:?}", resolved)));
    }
    Ok(())
}

#[test]
fn ramp_interpolates_each_stage_linearly() -> Result<(), ValidationError> {
    let ramp = VuRamp::new(
        0,
        vec![
            VuStage::new(Duration::from_secs(60), 200),
            VuStage::new(Duration::from_secs(60), 200),
            VuStage::new(Duration::from_secs(30), 0),
        ],
    );
    let samples: Vec<Option<u64>> = [0, 30, 59, 60, 119, 135, 150]
        .iter()
        .map(|secs| ramp.target_at(Duration::from_secs(*secs)))
        .collect();
    let expected = vec![
        Some(0),
        Some(100),
        Some(196),
        Some(200),
        Some(200),
        Some(100),
        None,
    ];
    if samples != expected {
        return Err(ValidationError::from(format!("{:?}", samples)));
    }
    if ramp.total() != Duration::from_secs(150) {
        return Err(ValidationError::from("Wrong ramp length"));
    }
    Ok(())
}

#[test]
fn durations_render_compactly() -> Result<(), ValidationError> {
    let rendered: Vec<String> = [
        Duration::from_secs(90),
        Duration::from_secs(600),
        Duration::from_millis(250),
        Duration::from_secs(3600),
    ]
    .into_iter()
    .map(format_duration)
    .collect();
    if rendered != vec!["1m30s", "10m", "250ms", "1h"] {
        return Err(ValidationError::from(format!("{:?}", rendered)));
    }
    Ok(())
}

#[test]
fn per_vu_iterations_runs_each_vu_exactly() -> Result<(), ValidationError> {
    run_async_test(async {
        let runner = Arc::new(StubRunner::new(Duration::from_millis(1)));
        let sink = Arc::new(MemorySink::default());
        let tally = scheduler(&runner, &sink)
            .run(&plan(Executor::PerVuIterations {
                vus: 2,
                iterations: 3,
                max_duration: Duration::from_secs(10),
            }))
            .await
            .map_err(|err| ValidationError::from(err.to_string()))?;

        if tally.iterations != 6 || tally.successful != 6 {
            return Err(ValidationError::from(format!("{:?}", tally)));
        }
        let mut seen = runner.seen();
        seen.sort_unstable();
        if seen != vec![1, 1, 1, 2, 2, 2] {
            return Err(ValidationError::from(format!("{:?}", seen)));
        }
        let metrics = sink
            .aggregate()
            .map_err(|err| ValidationError::from(err.to_string()))?;
        if metrics.counter(ITERATIONS) != 6 {
            return Err(ValidationError::from("Iterations not recorded as events"));
        }
        Ok(())
    })
}

#[test]
fn outcomes_are_tallied_per_kind() -> Result<(), ValidationError> {
    run_async_test(async {
        let mut stub = StubRunner::new(Duration::ZERO);
        stub.fail_vu = Some(2);
        let runner = Arc::new(stub);
        let sink = Arc::new(MemorySink::default());
        let tally = scheduler(&runner, &sink)
            .run(&plan(Executor::PerVuIterations {
                vus: 2,
                iterations: 2,
                max_duration: Duration::from_secs(10),
            }))
            .await
            .map_err(|err| ValidationError::from(err.to_string()))?;
        if (tally.successful, tally.failed, tally.auth_failures) != (2, 2, 0) {
            return Err(ValidationError::from(format!("{:?}", tally)));
        }
        Ok(())
    })
}

#[test]
fn arrival_rate_drops_starts_with_no_idle_vu() -> Result<(), ValidationError> {
    run_async_test(async {
        // One VU busy for 35ms while starts are due every 10ms.
        let runner = Arc::new(StubRunner::new(Duration::from_millis(35)));
        let sink = Arc::new(MemorySink::default());
        let tally = scheduler(&runner, &sink)
            .run(&plan(Executor::ConstantArrivalRate {
                rate: 10,
                time_unit: Duration::from_millis(100),
                duration: Duration::from_millis(95),
                pre_allocated_vus: 1,
            }))
            .await
            .map_err(|err| ValidationError::from(err.to_string()))?;

        if tally.dropped == 0 || tally.iterations == 0 {
            return Err(ValidationError::from(format!("{:?}", tally)));
        }
        let metrics = sink
            .aggregate()
            .map_err(|err| ValidationError::from(err.to_string()))?;
        if metrics.counter(DROPPED_ITERATIONS) != tally.dropped {
            return Err(ValidationError::from("Dropped iterations not recorded"));
        }
        if runner.seen().iter().any(|vu| *vu != 1) {
            return Err(ValidationError::from("Only the pre-allocated VU may run"));
        }
        Ok(())
    })
}

#[test]
fn ramping_vus_follow_the_target() -> Result<(), ValidationError> {
    run_async_test(async {
        let runner = Arc::new(StubRunner::new(Duration::from_millis(2)));
        let sink = Arc::new(MemorySink::default());
        let tally = scheduler(&runner, &sink)
            .run(&plan(Executor::RampingVus {
                start_vus: 3,
                stages: vec![VuStage::new(Duration::from_millis(60), 3)],
                graceful_ramp_down: Duration::from_millis(50),
            }))
            .await
            .map_err(|err| ValidationError::from(err.to_string()))?;

        let mut vus = runner.seen();
        vus.sort_unstable();
        vus.dedup();
        if vus != vec![1, 2, 3] {
            return Err(ValidationError::from(format!("{:?}", vus)));
        }
        if tally.iterations < 3 {
            return Err(ValidationError::from(format!("{:?}", tally)));
        }
        Ok(())
    })
}

#[test]
fn defect_stops_the_run_and_is_returned() -> Result<(), ValidationError> {
    run_async_test(async {
        let mut stub = StubRunner::new(Duration::ZERO);
        stub.defect_vu = Some(1);
        let runner = Arc::new(stub);
        let sink = Arc::new(MemorySink::default());
        let result = scheduler(&runner, &sink)
            .run(&plan(Executor::PerVuIterations {
                vus: 1,
                iterations: 5,
                max_duration: Duration::from_secs(10),
            }))
            .await;
        match result {
            Err(defect) if defect.vu == 1 && defect.stage == "origin" => {}
            other => return Err(ValidationError::from(format!("{:?}", other))),
        }
        if runner.seen().len() != 1 {
            return Err(ValidationError::from("VU kept iterating after a defect"));
        }
        Ok(())
    })
}

#[test]
fn shutdown_stops_new_iterations() -> Result<(), ValidationError> {
    run_async_test(async {
        let runner = Arc::new(StubRunner::new(Duration::from_millis(5)));
        let sink = Arc::new(MemorySink::default());
        let (shutdown_tx, _) = shutdown_channel();
        let dyn_runner: Arc<dyn IterationRunner> = runner.clone();
        let dyn_sink: Arc<dyn MetricsSink> = sink.clone();
        let scheduler = Scheduler::new(
            dyn_runner,
            UserDirectory::new(UserPoolSettings::default(), None),
            dyn_sink,
            &shutdown_tx,
        )
        .with_graceful_stop(Duration::from_millis(100));

        let trigger = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            drop(trigger.send(()));
        });
        let tally = scheduler
            .run(&plan(Executor::PerVuIterations {
                vus: 1,
                iterations: 10_000,
                max_duration: Duration::from_secs(10),
            }))
            .await
            .map_err(|err| ValidationError::from(err.to_string()))?;
        if tally.iterations == 0 || tally.iterations >= 10_000 {
            return Err(ValidationError::from(format!("{:?}", tally)));
        }
        Ok(())
    })
}

#[test]
fn finished_arrivals_are_reaped_between_ticks() -> Result<(), ValidationError> {
    run_async_test(async {
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..3 {
            tasks.spawn(async {});
        }
        tasks.spawn(tokio::time::sleep(Duration::from_secs(5)));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let reaped = super::scheduler::reap_finished(&mut tasks);
        if reaped != 3 || tasks.len() != 1 {
            return Err(ValidationError::from(format!(
                "reaped {}, {} left",
                reaped,
                tasks.len()
            )));
        }
        tasks.abort_all();
        Ok(())
    })
}
