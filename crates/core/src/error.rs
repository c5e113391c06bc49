use thiserror::Error;

use crate::model::completion::CompletionResultError;
use crate::model::exercise::ExerciseError;
use crate::model::lesson::LessonError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Exercise(#[from] ExerciseError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Completion(#[from] CompletionResultError),
}
