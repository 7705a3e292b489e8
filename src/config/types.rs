use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::parse_duration;
use crate::error::ValidationError;
use crate::runner::WorkloadProfile;
use crate::thresholds::{ThresholdProfile, parse_fixed};

/// Contents of `trade-perf.toml` / `trade-perf.json`. Every field is optional;
/// CLI flags and environment variables take precedence.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub target_url: Option<String>,
    #[serde(alias = "defra_id_stub_url")]
    pub stub_url: Option<String>,
    pub user_pool: Option<UserPoolConfig>,
    pub workload: Option<WorkloadProfile>,
    pub threshold: Option<ThresholdProfile>,
    pub vus_max: Option<u64>,
    pub ramp_up: Option<DurationValue>,
    pub hold: Option<DurationValue>,
    pub ramp_down: Option<DurationValue>,
    pub threshold_p95_ms: Option<u64>,
    pub threshold_p99_ms: Option<u64>,
    pub threshold_error_rate: Option<DecimalValue>,
    pub think_time: Option<String>,
    pub request_timeout: Option<DurationValue>,
    pub weighted_countries: Option<bool>,
    pub commodity: Option<String>,
    pub report_dir: Option<String>,
    /// Extra rules by metric name; they replace any built-in rules on the
    /// same metric.
    pub thresholds: Option<BTreeMap<String, Vec<ThresholdEntry>>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserPoolConfig {
    pub prefix: Option<String>,
    pub domain: Option<String>,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    /// # Errors
    ///
    /// Returns an error when the value is zero or not a valid duration string.
    pub fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration(text),
        }
    }
}

/// A rate written either as a number (`0.01`) or a string (`"0.01"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DecimalValue {
    Number(f64),
    Text(String),
}

impl DecimalValue {
    /// Fixed-point value, see [`crate::thresholds::SCALE`].
    ///
    /// # Errors
    ///
    /// Returns an error when the value is negative or has more than four
    /// fractional digits.
    pub fn to_fixed(&self) -> Result<u64, ValidationError> {
        match self {
            DecimalValue::Number(number) => parse_fixed(&number.to_string()),
            DecimalValue::Text(text) => parse_fixed(text.trim()),
        }
    }
}

/// One threshold rule: `"p(95)<800"` or
/// `{ threshold = "rate<0.1", abort_on_fail = true }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThresholdEntry {
    Expression(String),
    Rule {
        threshold: String,
        #[serde(default, alias = "abortOnFail")]
        abort_on_fail: bool,
    },
}

impl ThresholdEntry {
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            ThresholdEntry::Expression(expression) => expression,
            ThresholdEntry::Rule { threshold, .. } => threshold,
        }
    }

    #[must_use]
    pub const fn abort_on_fail(&self) -> bool {
        match self {
            ThresholdEntry::Expression(_) => false,
            ThresholdEntry::Rule { abort_on_fail, .. } => *abort_on_fail,
        }
    }
}
