use thiserror::Error;

/// Engine failure taxonomy. Every variant is a synchronous, non-retryable
/// validation failure except [`EngineError::Store`], which wraps opaque
/// failures from the persistence adapter.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not enough words available: found {available}, need {requested}")]
    InsufficientWords { requested: usize, available: usize },

    #[error("game session is not active")]
    SessionNotActive,

    #[error("invalid question index {0}")]
    InvalidQuestionIndex(usize),

    #[error("question {0} already has an answer")]
    AnswerAlreadySubmitted(usize),

    #[error("hints are only available for the hints game")]
    HintsNotAvailable,

    #[error("unauthorized")]
    Unauthorized,

    #[error("student is not assigned to this task")]
    StudentNotAssigned,

    #[error("task already completed")]
    TaskAlreadyCompleted,

    #[error("word not found: {0}")]
    WordNotFound(String),

    #[error("game session not found: {0}")]
    SessionNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
