use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tempfile::tempdir;

use super::build_plan;
use super::types::RunPlan;
use crate::args::TradePerfArgs;
use crate::error::{AppError, AppResult, ValidationError};
use crate::runner::WorkloadProfile;

fn fail(message: &'static str) -> AppError {
    AppError::validation(ValidationError::from(message))
}

fn parse(argv: &[&str]) -> AppResult<(TradePerfArgs, ArgMatches)> {
    let matches = TradePerfArgs::command().try_get_matches_from(argv.iter().copied())?;
    let args = TradePerfArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

#[test]
fn ched_reference_skips_config_loading() -> AppResult<()> {
    let (args, matches) = parse(&[
        "trade-perf",
        "--config",
        "does-not-exist.toml",
        "ched-reference",
        "CDP.2025.12.05.6",
    ])?;
    match build_plan(args, &matches)? {
        RunPlan::ChedReference(id) if id == "CDP.2025.12.05.6" => Ok(()),
        RunPlan::ChedReference(_)
        | RunPlan::LoadTest(_)
        | RunPlan::PoolCreate(_)
        | RunPlan::PoolCleanup(_) => Err(fail("Expected a ched-reference plan")),
    }
}

#[test]
fn missing_explicit_config_is_an_error() -> AppResult<()> {
    let (args, matches) = parse(&["trade-perf", "--config", "does-not-exist.toml"])?;
    if build_plan(args, &matches).is_ok() {
        return Err(fail("Expected a missing config file to fail"));
    }
    Ok(())
}

#[test]
fn run_is_the_default_and_reads_the_config_file() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("trade-perf.toml");
    std::fs::write(&path, "workload = \"spike\"\nvus_max = 7\n")?;
    let config = path.to_string_lossy().into_owned();
    let (args, matches) = parse(&["trade-perf", "--config", config.as_str()])?;

    let RunPlan::LoadTest(settings) = build_plan(args, &matches)? else {
        return Err(fail("Expected a load test plan"));
    };
    if settings.workload_profile != WorkloadProfile::Spike || settings.vus_max != 7 {
        return Err(fail("Config file should shape the run"));
    }
    Ok(())
}

#[test]
fn pool_subcommands_map_to_pool_plans() -> AppResult<()> {
    let dir = tempdir()?;
    let config = dir.path().join("trade-perf.json");
    std::fs::write(&config, "{}")?;
    let config = config.to_string_lossy().into_owned();

    let (args, matches) = parse(&["trade-perf", "-c", config.as_str(), "pool", "create"])?;
    if !matches!(build_plan(args, &matches)?, RunPlan::PoolCreate(_)) {
        return Err(fail("Expected pool create"));
    }
    let (args, matches) = parse(&["trade-perf", "-c", config.as_str(), "pool", "cleanup"])?;
    if !matches!(build_plan(args, &matches)?, RunPlan::PoolCleanup(_)) {
        return Err(fail("Expected pool cleanup"));
    }
    Ok(())
}
