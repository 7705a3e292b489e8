use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Histogram error during {context}: {message}")]
    Histogram {
        context: &'static str,
        message: String,
    },
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
