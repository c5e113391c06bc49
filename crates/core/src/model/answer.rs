use chrono::{DateTime, Utc};

/// Record of a single graded answer within a lesson attempt.
///
/// Written once per exercise index, in strictly increasing index order.
/// `correct_answer` comes from the grading service, which is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub exercise_index: usize,
    pub selected_answer: String,
    pub is_correct: bool,
    pub correct_answer: String,
    pub graded_at: DateTime<Utc>,
}

impl GradedAnswer {
    #[must_use]
    pub fn new(
        exercise_index: usize,
        selected_answer: impl Into<String>,
        is_correct: bool,
        correct_answer: impl Into<String>,
        graded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            exercise_index,
            selected_answer: selected_answer.into(),
            is_correct,
            correct_answer: correct_answer.into(),
            graded_at,
        }
    }
}
