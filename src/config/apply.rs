use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{TradePerfArgs, parse_base_url, parse_think_time};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::ConfigFile;

/// Fills every argument the user did not set on the command line or through
/// its environment variable from the config file.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut TradePerfArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_explicit(matches, "target_url")
        && let Some(url) = config.target_url.as_deref()
    {
        args.target_url = parse_base_url(url).map_err(|err| invalid("target_url", err))?;
    }

    if !is_explicit(matches, "stub_url")
        && let Some(url) = config.stub_url.as_deref()
    {
        args.stub_url = parse_base_url(url).map_err(|err| invalid("stub_url", err))?;
    }

    if let Some(pool) = config.user_pool.as_ref() {
        if !is_explicit(matches, "user_prefix")
            && let Some(prefix) = pool.prefix.clone()
        {
            args.user_prefix = prefix;
        }
        if !is_explicit(matches, "user_domain")
            && let Some(domain) = pool.domain.clone()
        {
            args.user_domain = domain;
        }
        if !is_explicit(matches, "pool_file")
            && let Some(file) = pool.file.clone()
        {
            args.pool_file = file;
        }
    }

    if !is_explicit(matches, "workload")
        && let Some(workload) = config.workload
    {
        args.workload = workload;
    }

    if !is_explicit(matches, "threshold")
        && let Some(threshold) = config.threshold
    {
        args.threshold = threshold;
    }

    if !is_explicit(matches, "vus_max")
        && let Some(vus_max) = config.vus_max
    {
        if vus_max == 0 {
            return Err(invalid("vus_max", ValidationError::ValueTooSmall { min: 1 }));
        }
        args.vus_max = Some(vus_max);
    }

    if !is_explicit(matches, "ramp_up")
        && let Some(value) = config.ramp_up.as_ref()
    {
        args.ramp_up = Some(value.to_duration().map_err(|err| invalid("ramp_up", err))?);
    }

    if !is_explicit(matches, "hold")
        && let Some(value) = config.hold.as_ref()
    {
        args.hold = Some(value.to_duration().map_err(|err| invalid("hold", err))?);
    }

    if !is_explicit(matches, "ramp_down")
        && let Some(value) = config.ramp_down.as_ref()
    {
        args.ramp_down = Some(value.to_duration().map_err(|err| invalid("ramp_down", err))?);
    }

    if !is_explicit(matches, "threshold_p95_ms")
        && let Some(limit) = config.threshold_p95_ms
    {
        args.threshold_p95_ms = Some(limit);
    }

    if !is_explicit(matches, "threshold_p99_ms")
        && let Some(limit) = config.threshold_p99_ms
    {
        args.threshold_p99_ms = Some(limit);
    }

    if !is_explicit(matches, "threshold_error_rate")
        && let Some(rate) = config.threshold_error_rate.as_ref()
    {
        args.threshold_error_rate = Some(
            rate.to_fixed()
                .map_err(|err| invalid("threshold_error_rate", err))?,
        );
    }

    if !is_explicit(matches, "think_time")
        && let Some(think_time) = config.think_time.as_deref()
    {
        args.think_time =
            Some(parse_think_time(think_time).map_err(|err| invalid("think_time", err))?);
    }

    if !is_explicit(matches, "request_timeout")
        && let Some(timeout) = config.request_timeout.as_ref()
    {
        args.request_timeout = timeout
            .to_duration()
            .map_err(|err| invalid("request_timeout", err))?;
    }

    if !is_explicit(matches, "weighted_countries")
        && let Some(weighted) = config.weighted_countries
    {
        args.weighted_countries = weighted;
    }

    if !is_explicit(matches, "commodity")
        && let Some(commodity) = config.commodity.clone()
    {
        args.commodity = Some(commodity);
    }

    if !is_explicit(matches, "report_dir")
        && let Some(dir) = config.report_dir.clone()
    {
        args.report_dir = dir;
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    let source = matches.value_source(name);
    source == Some(ValueSource::CommandLine) || source == Some(ValueSource::EnvVariable)
}

fn invalid(field: &'static str, source: ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidField { field, source })
}
