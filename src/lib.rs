//! Core library for the `trade-perf` CLI.
//!
//! Virtual users sign in through the identity stub, walk the multi-page
//! import notification journey of the trade frontend and submit it, while
//! the runner drives them through a workload profile and the collector
//! checks latency and error thresholds. The binary is a thin wrapper around
//! [`run`]; library APIs may evolve with the harness.
pub mod args;
pub mod config;
pub mod data;
pub mod error;
pub mod http;
pub mod identity;
pub mod journey;
pub mod metrics;
pub mod pages;
pub mod report;
pub mod runner;
pub mod shutdown;
pub mod thresholds;

mod app;
mod entry;
mod system;

#[cfg(test)]
mod test_support;

/// Parses the command line, resolves configuration and runs the selected
/// command.
///
/// # Errors
///
/// Returns an error when configuration is invalid, the run hits a harness
/// defect, or any threshold was crossed.
pub fn run() -> error::AppResult<()> {
    entry::run()
}
