use std::time::Duration;

use reqwest::Url;

use crate::error::ValidationError;
use crate::journey::ThinkTime;
use crate::runner::WorkloadProfile;
use crate::thresholds::{ThresholdProfile, parse_fixed};

/// Parses `250ms`, `30s`, `5m` or `1h`; a bare number is seconds.
///
/// # Errors
///
/// Returns an error for empty input, unknown units, overflow or zero.
pub fn parse_duration(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let mut digits_len = 0usize;
    for ch in value.chars() {
        if ch.is_ascii_digit() {
            digits_len = digits_len.saturating_add(1);
        } else {
            break;
        }
    }
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 =
        num_part
            .parse()
            .map_err(|err| ValidationError::InvalidDurationNumber {
                value: value.to_owned(),
                source: err,
            })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.as_millis() == 0 {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}

/// Parses a think-time range such as `1s..3s`.
///
/// # Errors
///
/// Returns an error if either bound is not a duration or `min > max`.
pub fn parse_think_time(s: &str) -> Result<ThinkTime, ValidationError> {
    let invalid = || ValidationError::InvalidThinkTime {
        value: s.to_owned(),
    };
    let (min, max) = s.trim().split_once("..").ok_or_else(invalid)?;
    let min = parse_duration(min).map_err(|_err| invalid())?;
    let max = parse_duration(max).map_err(|_err| invalid())?;
    ThinkTime::new(min, max)
}

/// Parses an absolute `http(s)` base URL.
///
/// # Errors
///
/// Returns an error if the URL does not parse or has no host.
pub fn parse_base_url(s: &str) -> Result<Url, ValidationError> {
    let value = s.trim();
    let url = Url::parse(value).map_err(|err| ValidationError::InvalidUrl {
        url: value.to_owned(),
        source: err,
    })?;
    if url.host_str().is_none() {
        return Err(ValidationError::UrlMissingHost {
            url: value.to_owned(),
        });
    }
    Ok(url)
}

/// # Errors
///
/// Returns an error if the value is not a number or is zero.
pub fn parse_positive_u64(s: &str) -> Result<u64, ValidationError> {
    let value: u64 = s
        .trim()
        .parse()
        .map_err(|err| ValidationError::InvalidNumber { source: err })?;
    if value == 0 {
        return Err(ValidationError::ValueTooSmall { min: 1 });
    }
    Ok(value)
}

/// Decimal rate such as `0.01`, held as fixed point.
///
/// # Errors
///
/// Returns an error if the value is not a plain decimal.
pub fn parse_rate(s: &str) -> Result<u64, ValidationError> {
    parse_fixed(s.trim())
}

/// # Errors
///
/// Returns an error for names other than smoke, load, stress or spike.
pub fn parse_workload(s: &str) -> Result<WorkloadProfile, ValidationError> {
    s.parse()
}

/// # Errors
///
/// Returns an error for names other than low, medium or high.
pub fn parse_threshold_profile(s: &str) -> Result<ThresholdProfile, ValidationError> {
    s.parse()
}
