//! Error types.
//!
//! User-correctable schedule problems are reported through
//! [`crate::validation::ValidationResult`], not through these types.
//! These cover configuration mistakes, structural requests the schedule
//! cannot honor, and malformed encoded input.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("row limit reached: at most {max} rows may be displayed")]
    RowLimitReached { max: usize },
    #[error("cannot remove the last displayed row")]
    LastRow,
    #[error("failed to decode frequency string: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty segment at position {0}")]
    EmptySegment(usize),
    #[error("missing visit count in segment '{0}'")]
    MissingOccurrence(String),
    #[error("invalid visit range in segment '{0}'")]
    InvalidRange(String),
    #[error("unknown interval token '{token}' in segment '{segment}'")]
    UnknownToken { token: String, segment: String },
    #[error("missing duration in segment '{0}'")]
    MissingDuration(String),
    #[error("invalid number in segment '{0}'")]
    InvalidNumber(String),
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;
