use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Invalid think time '{value}'. Expected 'min..max' durations (e.g. 1s..3s).")]
    InvalidThinkTime { value: String },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid decimal '{value}'. Expected up to 4 fractional digits.")]
    InvalidDecimal { value: String },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL '{url}' is missing a host.")]
    UrlMissingHost { url: String },
    #[error("Unknown workload profile '{value}'. Use smoke, load, stress or spike.")]
    UnknownWorkload { value: String },
    #[error("Unknown threshold profile '{value}'. Use low, medium or high.")]
    UnknownThresholdProfile { value: String },
    #[error("Unknown commodity code '{code}'.")]
    UnknownCommodity { code: String },
    #[error("Invalid threshold '{expression}' for '{metric}': {reason}")]
    InvalidThreshold {
        metric: String,
        expression: String,
        reason: &'static str,
    },
    #[error("{failed} threshold(s) crossed.")]
    ThresholdsCrossed { failed: usize },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
