use thiserror::Error;

/// A malformed or out-of-range boundary record. Rejected records are never
/// partially applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Identifier must not be empty")]
    EmptyId,

    #[error("Unknown day name: {0:?}")]
    UnknownDay(String),

    #[error("Hour {0} out of range, expected 0..=23")]
    HourOutOfRange(i64),

    #[error("Negative {field} count for {post_id}: {value}")]
    NegativeCount {
        post_id: String,
        field: &'static str,
        value: i64,
    },

    #[error("Embedding for {id} is empty")]
    EmptyEmbedding { id: String },

    #[error("Embedding for {id} has a non-finite component at position {position}")]
    NonFiniteEmbedding { id: String, position: usize },

    #[error("Embedding for {id} has length {actual}, index expects {expected}")]
    InconsistentDimensions {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate content id: {0}")]
    DuplicateId(String),

    #[error("Invalid week {value:?}: {reason}")]
    InvalidWeek { value: String, reason: &'static str },

    #[error("Window {window} appears more than once in week {week}")]
    DuplicateWindow { week: String, window: String },

    #[error("{post_id} is placed in more than one window in week {week}")]
    DuplicateItem { week: String, post_id: String },

    #[error("Malformed record: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for InputError {
    fn from(err: serde_json::Error) -> Self {
        InputError::Malformed(err.to_string())
    }
}
