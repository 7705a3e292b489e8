use std::path::PathBuf;
use thiserror::Error;

use super::TransportError;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Failed to read user pool '{path}': {source}")]
    ReadPoolFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse user pool '{path}': {source}")]
    ParsePoolFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize user pool: {source}")]
    SerializePool {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write user pool '{path}': {source}")]
    WritePoolFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to build identity stub client: {source}")]
    BuildClient {
        #[source]
        source: TransportError,
    },
    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: TransportError,
    },
    #[error("Unexpected response from '{url}': {source}")]
    ParseResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("HTTP {status} from '{url}'{body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Invalid identity stub URL '{url}': {source}")]
    InvalidStubUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to create {count} user(s).")]
    RegistrationsFailed { count: usize },
}
