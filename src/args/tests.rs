use super::*;
use crate::error::{AppError, AppResult, ValidationError};
use crate::runner::WorkloadProfile;
use crate::thresholds::ThresholdProfile;
use clap::Parser;
use std::time::Duration;

fn parse_test_args<I, T>(args: I) -> AppResult<TradePerfArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    TradePerfArgs::try_parse_from(args).map_err(AppError::from)
}

fn env_absent(name: &str) -> bool {
    std::env::var_os(name).is_none()
}

fn check_all(checks: &[(bool, &'static str)]) -> AppResult<()> {
    for (ok, message) in checks {
        if !ok {
            return Err(AppError::validation(ValidationError::from(*message)));
        }
    }
    Ok(())
}

#[test]
fn parse_args_defaults() -> AppResult<()> {
    let args = parse_test_args(["trade-perf"])?;

    let checks = [
        (args.command.is_none(), "Expected no subcommand"),
        (
            !env_absent("TARGET_URL") || args.target_url.as_str() == "http://localhost:3000/",
            "Unexpected target_url",
        ),
        (
            !env_absent("DEFRA_ID_STUB_URL") || args.stub_url.as_str() == "http://localhost:3200/",
            "Unexpected stub_url",
        ),
        (
            !env_absent("USER_POOL_PREFIX") || args.user_prefix == "k6-perf-user",
            "Unexpected user_prefix",
        ),
        (
            !env_absent("USER_POOL_DOMAIN") || args.user_domain == "example.com",
            "Unexpected user_domain",
        ),
        (
            !env_absent("K6_WORKLOAD") || args.workload == WorkloadProfile::Smoke,
            "Expected smoke workload",
        ),
        (
            !env_absent("K6_THRESHOLD") || args.threshold == ThresholdProfile::Low,
            "Expected low threshold profile",
        ),
        (
            !env_absent("VUS_MAX") || args.vus_max.is_none(),
            "Expected vus_max to be None",
        ),
        (args.think_time.is_none(), "Expected think_time to be None"),
        (
            args.request_timeout == Duration::from_secs(60),
            "Unexpected request_timeout",
        ),
        (args.report_dir == "reports", "Unexpected report_dir"),
        (args.pool_file == "users-pool.json", "Unexpected pool_file"),
        (!args.weighted_countries, "Expected weighted_countries off"),
        (!args.no_report, "Expected reports enabled"),
        (!args.verbose, "Expected verbose off"),
    ];
    check_all(&checks)
}

#[test]
fn parse_args_manual_workload_and_thresholds() -> AppResult<()> {
    let args = parse_test_args([
        "trade-perf",
        "--workload",
        "stress",
        "--threshold",
        "HIGH",
        "--vus-max",
        "25",
        "--ramp-up",
        "2m",
        "--hold",
        "90s",
        "--threshold-p95-ms",
        "1500",
        "--threshold-error-rate",
        "0.05",
        "--think-time",
        "1s..3s",
        "--commodity",
        "0103",
        "--weighted-countries",
    ])?;

    let think = args
        .think_time
        .ok_or_else(|| AppError::validation(ValidationError::from("Missing think time")))?;
    let checks = [
        (args.workload == WorkloadProfile::Stress, "Expected stress"),
        (args.threshold == ThresholdProfile::High, "Expected high"),
        (args.vus_max == Some(25), "Unexpected vus_max"),
        (
            args.ramp_up == Some(Duration::from_secs(120)),
            "Unexpected ramp_up",
        ),
        (args.hold == Some(Duration::from_secs(90)), "Unexpected hold"),
        (args.threshold_p95_ms == Some(1500), "Unexpected p95"),
        (args.threshold_error_rate == Some(500), "Unexpected error rate"),
        (think.min() == Duration::from_secs(1), "Unexpected think min"),
        (think.max() == Duration::from_secs(3), "Unexpected think max"),
        (args.commodity.as_deref() == Some("0103"), "Unexpected commodity"),
        (args.weighted_countries, "Expected weighted countries"),
    ];
    check_all(&checks)
}

#[test]
fn parse_args_rejects_bad_values() -> AppResult<()> {
    let cases: [&[&str]; 6] = [
        &["trade-perf", "--workload", "soak"],
        &["trade-perf", "--threshold", "extreme"],
        &["trade-perf", "--vus-max", "0"],
        &["trade-perf", "--hold", "10x"],
        &["trade-perf", "--think-time", "3s..1s"],
        &["trade-perf", "--target-url", "not a url"],
    ];
    for case in cases {
        if parse_test_args(case.iter().copied()).is_ok() {
            return Err(AppError::validation(ValidationError::from(format!(
                "Expected {:?} to be rejected",
                case
            ))));
        }
    }
    Ok(())
}

#[test]
fn parse_args_subcommands() -> AppResult<()> {
    let create = parse_test_args(["trade-perf", "--vus-max", "3", "pool", "create"])?;
    if !matches!(create.command, Some(Command::Pool(PoolCommand::Create))) {
        return Err(AppError::validation(ValidationError::from(
            "Expected pool create",
        )));
    }

    let cleanup = parse_test_args(["trade-perf", "pool", "cleanup"])?;
    if !matches!(cleanup.command, Some(Command::Pool(PoolCommand::Cleanup))) {
        return Err(AppError::validation(ValidationError::from(
            "Expected pool cleanup",
        )));
    }

    let ched = parse_test_args(["trade-perf", "ched-reference", "CDP.2025.12.05.6"])?;
    if let Some(Command::ChedReference(args)) = ched.command
        && args.notification_id == "CDP.2025.12.05.6"
    {
        return Ok(());
    }
    Err(AppError::validation(ValidationError::from(
        "Expected ched-reference with id",
    )))
}

#[test]
fn parse_duration_units() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("30", Duration::from_secs(30)),
        ("30s", Duration::from_secs(30)),
        ("5m", Duration::from_secs(300)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration(input)?;
        if parsed != expected {
            return Err(AppError::validation(ValidationError::from(format!(
                "{} parsed as {:?}",
                input, parsed
            ))));
        }
    }
    for input in ["", "m", "0s", "5d", "-1s"] {
        if parse_duration(input).is_ok() {
            return Err(AppError::validation(ValidationError::from(format!(
                "{} should be rejected",
                input
            ))));
        }
    }
    Ok(())
}

#[test]
fn parse_think_time_requires_ordered_range() -> AppResult<()> {
    let think = parse_think_time("500ms..2s")?;
    if think.min() != Duration::from_millis(500) || think.max() != Duration::from_secs(2) {
        return Err(AppError::validation(ValidationError::from(
            "Unexpected think time bounds",
        )));
    }
    for input in ["1s", "1s..", "2s..1s", "a..b"] {
        if parse_think_time(input).is_ok() {
            return Err(AppError::validation(ValidationError::from(format!(
                "{} should be rejected",
                input
            ))));
        }
    }
    Ok(())
}

#[test]
fn parse_base_url_requires_host() -> AppResult<()> {
    let url = parse_base_url(" https://trade.example/ ")?;
    if url.host_str() != Some("trade.example") {
        return Err(AppError::validation(ValidationError::from("Unexpected host")));
    }
    if parse_base_url("mailto:someone").is_ok() {
        return Err(AppError::validation(ValidationError::from(
            "URL without host should be rejected",
        )));
    }
    Ok(())
}
