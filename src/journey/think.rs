use std::time::Duration;

use rand::Rng;

use crate::error::ValidationError;

/// Randomised pause between stages, drawn uniformly from `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkTime {
    min: Duration,
    max: Duration,
}

impl ThinkTime {
    /// # Errors
    ///
    /// Returns an error when `min` is greater than `max`.
    pub fn new(min: Duration, max: Duration) -> Result<Self, ValidationError> {
        if min > max {
            return Err(ValidationError::InvalidThinkTime {
                value: format!("{}ms..{}ms", min.as_millis(), max.as_millis()),
            });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub const fn min(&self) -> Duration {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> Duration {
        self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rng.gen_range(min..=max))
    }
}
