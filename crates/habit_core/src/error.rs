use thiserror::Error;

use crate::habit::HabitId;

pub type HabitResult<T> = Result<T, HabitError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HabitError {
    /// A date argument is not a real calendar day in `YYYY-MM-DD` form.
    #[error("invalid date `{0}`: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("habit `{0}` not found")]
    NotFound(HabitId),

    /// The backing store could not persist or load habits.
    #[error("habit store unavailable: {0}")]
    StoreUnavailable(String),

    /// Form data rejected before it reached the store.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl HabitError {
    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDate(input.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Failures a caller may retry once the backing store recovers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
