use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ReferenceError;

static REFERENCE_IN_BODY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"CDP\.\d{4}\.\d{2}\.\d{2}\.\d+").ok());

/// Dated notification id issued on submission, e.g. `CDP.2025.12.05.6`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReference {
    raw: String,
    year: String,
    month: String,
    day: String,
    sequence: u64,
}

impl NotificationReference {
    /// Parse a `CDP.YYYY.MM.DD.S` id.
    ///
    /// # Errors
    ///
    /// Returns an error when the id does not have exactly five dot-separated
    /// parts or the sequence is not a number.
    pub fn parse(value: &str) -> Result<Self, ReferenceError> {
        let parts: Vec<&str> = value.split('.').collect();
        let [_, year, month, day, sequence] = parts.as_slice() else {
            return Err(ReferenceError::InvalidFormat {
                value: value.to_owned(),
            });
        };
        let sequence = sequence
            .parse::<u64>()
            .map_err(|source| ReferenceError::InvalidSequence {
                value: value.to_owned(),
                source,
            })?;
        Ok(Self {
            raw: value.to_owned(),
            year: (*year).to_owned(),
            month: (*month).to_owned(),
            day: (*day).to_owned(),
            sequence,
        })
    }

    /// First notification id found in a confirmation page body.
    #[must_use]
    pub fn find_in(body: &str) -> Option<Self> {
        let found = REFERENCE_IN_BODY.as_ref()?.find(body)?;
        Self::parse(found.as_str()).ok()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// External CHED reference: `CDP.2025.12.05.6` becomes `CHEDA.2025.12050600`.
    ///
    /// # Errors
    ///
    /// Returns an error when the scaled sequence overflows.
    pub fn to_ched_reference(&self) -> Result<String, ReferenceError> {
        let scaled =
            self.sequence
                .checked_mul(100)
                .ok_or_else(|| ReferenceError::SequenceOverflow {
                    value: self.raw.clone(),
                })?;
        Ok(format!(
            "CHEDA.{}.{}{}{:04}",
            self.year, self.month, self.day, scaled
        ))
    }
}

impl fmt::Display for NotificationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse `notification_id` and return its CHED reference.
///
/// # Errors
///
/// Returns an error for malformed ids.
pub fn ched_reference(notification_id: &str) -> Result<String, ReferenceError> {
    NotificationReference::parse(notification_id)?.to_ched_reference()
}
