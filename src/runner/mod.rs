//! Virtual-user scheduling: workload profiles and the executors that run them.
mod ramp;
mod scheduler;
mod workload;

#[cfg(test)]
mod tests;

pub use ramp::VuRamp;
pub use scheduler::{IterationRunner, RunTally, Scheduler};
pub use workload::{
    DEFAULT_VUS_MAX, Executor, GRACEFUL_STOP, ManualOverrides, VuStage, WorkloadPlan,
    WorkloadProfile, format_duration,
};
