use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Invalid notification ID format. Expected: CDP.YYYY.MM.DD.S, got: {value}")]
    InvalidFormat { value: String },
    #[error("Invalid notification sequence in '{value}': {source}")]
    InvalidSequence {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Notification sequence in '{value}' is too large.")]
    SequenceOverflow { value: String },
}
