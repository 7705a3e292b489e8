use thiserror::Error;

use super::{
    ConfigError, JourneyDefect, MetricsError, PoolError, ReferenceError, ReportError,
    ValidationError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("Join error: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),
    #[error("User pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),
    #[error("Journey defect: {0}")]
    Journey(#[from] JourneyDefect),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn metrics<E>(error: E) -> Self
    where
        E: Into<MetricsError>,
    {
        error.into().into()
    }

    pub fn pool<E>(error: E) -> Self
    where
        E: Into<PoolError>,
    {
        error.into().into()
    }

    pub fn report<E>(error: E) -> Self
    where
        E: Into<ReportError>,
    {
        error.into().into()
    }
}
