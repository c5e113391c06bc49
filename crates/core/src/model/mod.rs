mod answer;
pub mod completion;
pub mod exercise;
mod ids;
pub mod lesson;

pub use answer::GradedAnswer;
pub use completion::{CompletionResultError, LessonCompletionResult, NextLesson, XpBreakdown};
pub use exercise::{Exercise, ExerciseDraft, ExerciseError, ExerciseKind};
pub use ids::{AttemptId, ExerciseId, LessonId};
pub use lesson::{ChapterSummary, Lesson, LessonCatalog, LessonError, LessonLevel, PriorProgress};
