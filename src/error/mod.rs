mod app;
mod config;
mod journey;
mod metrics;
mod pool;
mod reference;
mod report;
mod transport;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use journey::{
    AuthenticationFailure, JourneyDefect, JourneyError, JourneyResult, ValidationFailure,
};
pub use metrics::MetricsError;
pub use pool::PoolError;
pub use reference::ReferenceError;
pub use report::ReportError;
pub use transport::TransportError;
pub use validation::ValidationError;
