use thiserror::Error;

/// failures of the durable key-value layer and the alarm repository on top
#[derive(Debug, Error)]
pub enum StoreError {
    /// an operation targeted an id that is not in the collection
    #[error("Alarm not found")]
    NotFound,

    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt alarm data: {0}")]
    Serde(#[from] serde_json::Error),
}

/// uniform failure type produced at the use case boundary
///
/// the `Display` output of each variant is the exact single-line message the
/// orchestration layer publishes to the user, so nothing downstream rewrites
/// error text.
#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("Invalid hour. Must be between 0-23.")]
    InvalidHour,

    #[error("Invalid minute. Must be between 0-59.")]
    InvalidMinute,

    #[error("Alarm not found")]
    NotFound,

    /// the durable store failed, message passed through verbatim
    #[error("{0}")]
    Persistence(String),

    /// a failure that carries no message of its own, normalized to a generic
    /// per-operation message by the caller
    #[error("{0}")]
    Unknown(String),
}

impl From<StoreError> for AlarmError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            other => Self::Persistence(other.to_string()),
        }
    }
}

/// failure reported by a notification backend
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct NotifyError(pub String);

impl NotifyError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't locate a config directory for this platform")]
    NoProjectDirs,

    #[error("couldn't read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("couldn't parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("couldn't serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Error)]
#[error("unknown weekday: {0}")]
pub struct ParseRepeatDayError(pub String);
