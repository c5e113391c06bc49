//! Shared error types for the services crate.

use thiserror::Error;

use lingo_core::model::{CompletionResultError, ExerciseError, LessonError};

/// Errors surfaced by the HTTP API client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("session is no longer authorized")]
    Unauthorized,
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors surfaced by token persistence adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenStoreError {
    #[error("token store error: {0}")]
    Backend(String),
}

/// Errors emitted by `AuthSession` and `AuthClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

/// Errors emitted by `WizardClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WizardError {
    #[error("wizard draft needs a name before it can be submitted")]
    EmptyName,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by the `LessonAttempt` state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("lesson has no exercises")]
    NoExercises,
    #[error("attempt is already finished")]
    Finished,
    #[error("no option is selected")]
    NoSelection,
    #[error("current exercise is not awaiting a selection")]
    NotSelecting,
    #[error("no grading is in flight for the current exercise")]
    NotGrading,
    #[error("current exercise has not been revealed yet")]
    NotRevealed,
    #[error("attempt is not at the final exercise")]
    NotAtEnd,
}

/// Fatal content-load failures: without exercises the session cannot start.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentLoadError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Exercise(#[from] ExerciseError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}

/// Recoverable grading failures: the attempt reverts to selecting and the
/// user may reselect and retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GradingError {
    #[error("grading request was rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}

/// Recoverable completion failures: the attempt stays on the revealed final
/// exercise and completion may be retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Result(#[from] CompletionResultError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}
