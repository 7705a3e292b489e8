use std::str::FromStr;

use serde::Deserialize;

use crate::error::ValidationError;
use crate::journey::{AUTH_FAILURE, FAILED_JOURNEY};
use crate::metrics::{CHECKS, HTTP_REQ_DURATION, HTTP_REQ_FAILED, tagged_duration_name};
use crate::pages::tags;

use super::{ThresholdRule, ThresholdSet, format_fixed};

/// Authentication failures tolerated before the run is marked failed.
pub const AUTH_FAILURE_LIMIT: u64 = 5;

/// Failed journeys tolerated per virtual user, as fixed point (0.05).
const FAILED_JOURNEY_SHARE: u64 = 500;

const ENDPOINT_P95_MS: [(&str, u64); 12] = [
    (tags::GET_HOME_PAGE, 200),
    (tags::GET_DASHBOARD_PAGE, 400),
    (tags::GET_ORIGIN_PAGE, 400),
    (tags::SUBMIT_ORIGIN_PAGE, 600),
    (tags::COMMODITY_CODE_SELECTION, 600),
    (tags::SELECT_COMMODITY_SPECIES, 600),
    (tags::SAVE_COMMODITY_QUANTITIES, 600),
    (tags::SUBMIT_PURPOSE, 600),
    (tags::SUBMIT_TRANSPORT_PAGE, 600),
    (tags::GET_REVIEW_PAGE, 500),
    (tags::SAVE_DRAFT, 800),
    (tags::SUBMIT_NOTIFICATION, 1000),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdProfile {
    #[default]
    Low,
    Medium,
    High,
}

impl ThresholdProfile {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ThresholdProfile::Low => "low",
            ThresholdProfile::Medium => "medium",
            ThresholdProfile::High => "high",
        }
    }
}

impl FromStr for ThresholdProfile {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ThresholdProfile::Low),
            "medium" => Ok(ThresholdProfile::Medium),
            "high" => Ok(ThresholdProfile::High),
            _ => Err(ValidationError::UnknownThresholdProfile {
                value: value.to_owned(),
            }),
        }
    }
}

/// Operator-supplied limits that replace the profile tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualThresholds {
    pub p95_ms: u64,
    pub p99_ms: u64,
    /// Fixed point, see [`super::SCALE`].
    pub error_rate: u64,
}

impl Default for ManualThresholds {
    fn default() -> Self {
        Self {
            p95_ms: 3000,
            p99_ms: 5000,
            error_rate: 100,
        }
    }
}

/// Rule set for a named profile, including the journey and per-endpoint rules.
///
/// # Errors
///
/// Returns an error if a generated expression fails to parse.
pub fn profile_thresholds(
    profile: ThresholdProfile,
    vus_max: u64,
) -> Result<ThresholdSet, ValidationError> {
    let mut set = ThresholdSet::default();
    match profile {
        ThresholdProfile::Low => {
            set.add(HTTP_REQ_DURATION, "p(90)<2500", false)?;
            set.add(HTTP_REQ_DURATION, "p(95)<5000", true)?;
            set.add(HTTP_REQ_FAILED, "rate<0.01", false)?;
            set.add(HTTP_REQ_FAILED, "rate<0.10", true)?;
            set.add(CHECKS, "rate>0.95", false)?;
        }
        ThresholdProfile::Medium => {
            set.add(HTTP_REQ_DURATION, "p(90)<400", false)?;
            set.add(HTTP_REQ_DURATION, "p(95)<800", false)?;
            set.add(HTTP_REQ_DURATION, "p(99.9)<2000", false)?;
            set.add(HTTP_REQ_DURATION, "p(95)<3000", true)?;
            set.add(HTTP_REQ_FAILED, "rate<0.01", false)?;
            set.add(HTTP_REQ_FAILED, "rate<0.10", true)?;
            set.add(CHECKS, "rate>0.95", false)?;
        }
        ThresholdProfile::High => {
            set.add(HTTP_REQ_DURATION, "p(90)<250", false)?;
            set.add(HTTP_REQ_DURATION, "p(95)<500", false)?;
            set.add(HTTP_REQ_DURATION, "p(99.9)<1500", false)?;
            set.add(HTTP_REQ_DURATION, "p(95)<2000", true)?;
            set.add(HTTP_REQ_FAILED, "rate<0.01", false)?;
            set.add(HTTP_REQ_FAILED, "rate<0.05", true)?;
            set.add(CHECKS, "rate>0.99", false)?;
        }
    }

    // The shared journey rules are layered over the profile table, so the
    // common checks rule also replaces the stricter one from `high`.
    set.replace_metric(CHECKS, vec![ThresholdRule::parse(CHECKS, "rate>0.95", false)?]);
    add_journey_rules(&mut set, vus_max)?;

    for (tag, p95_ms) in ENDPOINT_P95_MS {
        set.add(
            &tagged_duration_name(tag),
            &format!("p(95)<{}", p95_ms),
            false,
        )?;
    }
    Ok(set)
}

/// Rule set built from explicit latency and error-rate limits.
///
/// # Errors
///
/// Returns an error if a generated expression fails to parse.
pub fn manual_thresholds(
    limits: &ManualThresholds,
    vus_max: u64,
) -> Result<ThresholdSet, ValidationError> {
    let mut set = ThresholdSet::default();
    set.add(HTTP_REQ_DURATION, &format!("p(95)<{}", limits.p95_ms), false)?;
    set.add(HTTP_REQ_DURATION, &format!("p(99)<{}", limits.p99_ms), false)?;
    set.add(
        HTTP_REQ_FAILED,
        &format!("rate<{}", format_fixed(limits.error_rate)),
        false,
    )?;
    set.add(CHECKS, "rate>0.95", false)?;
    add_journey_rules(&mut set, vus_max)?;
    Ok(set)
}

fn add_journey_rules(set: &mut ThresholdSet, vus_max: u64) -> Result<(), ValidationError> {
    set.add(AUTH_FAILURE, &format!("count<{}", AUTH_FAILURE_LIMIT), false)?;
    let failed_limit = vus_max.saturating_mul(FAILED_JOURNEY_SHARE);
    set.add(
        FAILED_JOURNEY,
        &format!("count<{}", format_fixed(failed_limit)),
        false,
    )
}
