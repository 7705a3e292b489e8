use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;

/// VU count used when nothing else names one.
pub const DEFAULT_VUS_MAX: u64 = 50;
/// How long in-flight iterations may finish after the run is told to stop.
pub const GRACEFUL_STOP: Duration = Duration::from_secs(30);

const DEFAULT_RAMP_UP: Duration = Duration::from_secs(5 * 60);
const DEFAULT_HOLD: Duration = Duration::from_secs(10 * 60);
const DEFAULT_RAMP_DOWN: Duration = Duration::from_secs(2 * 60);
const PER_VU_MAX_DURATION: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadProfile {
    #[default]
    Smoke,
    Load,
    Stress,
    Spike,
}

impl WorkloadProfile {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WorkloadProfile::Smoke => "smoke",
            WorkloadProfile::Load => "load",
            WorkloadProfile::Stress => "stress",
            WorkloadProfile::Spike => "spike",
        }
    }

    #[must_use]
    pub fn plan(self) -> WorkloadPlan {
        let executor = match self {
            // Five passes by one user to validate the journey end to end.
            WorkloadProfile::Smoke => Executor::PerVuIterations {
                vus: 1,
                iterations: 5,
                max_duration: PER_VU_MAX_DURATION,
            },
            // Twelve journeys every ten minutes, the average traffic volume.
            WorkloadProfile::Load => Executor::ConstantArrivalRate {
                rate: 12,
                time_unit: Duration::from_secs(10 * 60),
                duration: Duration::from_secs(10 * 60),
                pre_allocated_vus: 1,
            },
            WorkloadProfile::Stress => Executor::RampingVus {
                start_vus: 0,
                stages: vec![
                    VuStage::new(Duration::from_secs(60), 200),
                    VuStage::new(Duration::from_secs(30 * 60), 200),
                    VuStage::new(Duration::from_secs(60), 0),
                ],
                graceful_ramp_down: GRACEFUL_STOP,
            },
            WorkloadProfile::Spike => Executor::RampingVus {
                start_vus: 0,
                stages: vec![
                    VuStage::new(Duration::from_secs(30), 200),
                    VuStage::new(Duration::from_secs(60), 200),
                    VuStage::new(Duration::from_secs(30), 0),
                ],
                graceful_ramp_down: GRACEFUL_STOP,
            },
        };
        WorkloadPlan {
            name: self.as_str().to_owned(),
            executor,
        }
    }
}

impl FromStr for WorkloadProfile {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "smoke" => Ok(WorkloadProfile::Smoke),
            "load" => Ok(WorkloadProfile::Load),
            "stress" => Ok(WorkloadProfile::Stress),
            "spike" => Ok(WorkloadProfile::Spike),
            _ => Err(ValidationError::UnknownWorkload {
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for WorkloadProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Move the active VU count linearly to `target` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VuStage {
    pub duration: Duration,
    pub target: u64,
}

impl VuStage {
    #[must_use]
    pub const fn new(duration: Duration, target: u64) -> Self {
        Self { duration, target }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Executor {
    /// Each of `vus` users runs exactly `iterations` journeys.
    PerVuIterations {
        vus: u64,
        iterations: u64,
        max_duration: Duration,
    },
    /// Start `rate` journeys per `time_unit`; a start with no idle VU is dropped.
    ConstantArrivalRate {
        rate: u64,
        time_unit: Duration,
        duration: Duration,
        pre_allocated_vus: u64,
    },
    /// VUs loop journeys while the active count follows `stages`.
    RampingVus {
        start_vus: u64,
        stages: Vec<VuStage>,
        graceful_ramp_down: Duration,
    },
}

impl Executor {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Executor::PerVuIterations { .. } => "per-vu-iterations",
            Executor::ConstantArrivalRate { .. } => "constant-arrival-rate",
            Executor::RampingVus { .. } => "ramping-vus",
        }
    }

    /// Largest number of VUs the executor can have active at once.
    #[must_use]
    pub fn vus_max(&self) -> u64 {
        match self {
            Executor::PerVuIterations { vus, .. } => *vus,
            Executor::ConstantArrivalRate {
                pre_allocated_vus, ..
            } => *pre_allocated_vus,
            Executor::RampingVus {
                start_vus, stages, ..
            } => stages
                .iter()
                .map(|stage| stage.target)
                .max()
                .map_or(*start_vus, |max| max.max(*start_vus)),
        }
    }

    /// Scheduled run time, excluding the graceful stop.
    #[must_use]
    pub fn duration(&self) -> Duration {
        match self {
            Executor::PerVuIterations { max_duration, .. } => *max_duration,
            Executor::ConstantArrivalRate { duration, .. } => *duration,
            Executor::RampingVus { stages, .. } => stages
                .iter()
                .fold(Duration::ZERO, |total, stage| {
                    total.saturating_add(stage.duration)
                }),
        }
    }
}

/// Environment-style overrides that replace the profile with a ramp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualOverrides {
    pub vus_max: Option<u64>,
    pub ramp_up: Option<Duration>,
    pub hold: Option<Duration>,
    pub ramp_down: Option<Duration>,
}

impl ManualOverrides {
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.vus_max.is_some()
            || self.ramp_up.is_some()
            || self.hold.is_some()
            || self.ramp_down.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadPlan {
    pub name: String,
    pub executor: Executor,
}

impl WorkloadPlan {
    /// The profile's plan, or a manual ramp when any override is set.
    ///
    /// Manual mode ramps from one VU to `vus_max` (5m), holds (10m) and
    /// ramps down to zero (2m) unless the durations are overridden.
    #[must_use]
    pub fn resolve(profile: WorkloadProfile, overrides: &ManualOverrides) -> Self {
        let profile_plan = profile.plan();
        if !overrides.is_set() {
            return profile_plan;
        }
        let vus_max = overrides
            .vus_max
            .unwrap_or_else(|| profile_plan.executor.vus_max());
        WorkloadPlan {
            name: "ramp_up_load".to_owned(),
            executor: Executor::RampingVus {
                start_vus: 1,
                stages: vec![
                    VuStage::new(overrides.ramp_up.unwrap_or(DEFAULT_RAMP_UP), vus_max),
                    VuStage::new(overrides.hold.unwrap_or(DEFAULT_HOLD), vus_max),
                    VuStage::new(overrides.ramp_down.unwrap_or(DEFAULT_RAMP_DOWN), 0),
                ],
                graceful_ramp_down: GRACEFUL_STOP,
            },
        }
    }

    /// VU count the user pool and failure budget are sized for: an explicit
    /// `VUS_MAX` wins over the executor's own maximum.
    #[must_use]
    pub fn vus_max(&self, explicit: Option<u64>) -> u64 {
        match explicit {
            Some(vus) => vus,
            None => match self.executor.vus_max() {
                0 => DEFAULT_VUS_MAX,
                vus => vus,
            },
        }
    }

    /// Human-readable rows for reports and the start banner.
    #[must_use]
    pub fn describe(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("Scenario".to_owned(), self.name.clone()),
            ("Executor".to_owned(), self.executor.name().to_owned()),
        ];
        match &self.executor {
            Executor::PerVuIterations {
                vus,
                iterations,
                max_duration,
            } => {
                rows.push(("VUs".to_owned(), vus.to_string()));
                rows.push(("Iterations per VU".to_owned(), iterations.to_string()));
                rows.push(("Max duration".to_owned(), format_duration(*max_duration)));
            }
            Executor::ConstantArrivalRate {
                rate,
                time_unit,
                duration,
                pre_allocated_vus,
            } => {
                rows.push((
                    "Rate".to_owned(),
                    format!("{} per {}", rate, format_duration(*time_unit)),
                ));
                rows.push(("Duration".to_owned(), format_duration(*duration)));
                rows.push(("Pre-allocated VUs".to_owned(), pre_allocated_vus.to_string()));
            }
            Executor::RampingVus {
                start_vus,
                stages,
                graceful_ramp_down,
            } => {
                rows.push(("Start VUs".to_owned(), start_vus.to_string()));
                let stages = stages
                    .iter()
                    .map(|stage| format!("{} -> {}", format_duration(stage.duration), stage.target))
                    .collect::<Vec<_>>()
                    .join(", ");
                rows.push(("Stages".to_owned(), stages));
                rows.push((
                    "Graceful ramp-down".to_owned(),
                    format_duration(*graceful_ramp_down),
                ));
            }
        }
        rows
    }
}

/// Compact duration: `90s` renders as `1m30s`, `500ms` stays in millis.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms == 0 {
        return "0s".to_owned();
    }
    if total_ms % 1000 != 0 {
        return format!("{}ms", total_ms);
    }
    let secs = duration.as_secs();
    let (hours, rest) = (secs / 3600, secs % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    let mut out = String::new();
    for (value, unit) in [(hours, "h"), (minutes, "m"), (seconds, "s")] {
        if value > 0 {
            out.push_str(&value.to_string());
            out.push_str(unit);
        }
    }
    out
}
