use thiserror::Error;

use crate::model::ids::LessonId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompletionResultError {
    #[error("score must be 0..=100, got {0}")]
    ScoreOutOfRange(u32),

    #[error("correct count ({correct}) exceeds total count ({total})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("xp total ({total}) does not match breakdown sum ({sum})")]
    XpMismatch { total: u32, sum: u32 },
}

/// How the XP award for a completion breaks down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XpBreakdown {
    pub base: u32,
    pub bonus: u32,
    pub streak_bonus: u32,
    pub total: u32,
}

impl XpBreakdown {
    /// Sum of the component awards, saturating on overflow.
    #[must_use]
    pub fn sum(&self) -> u32 {
        self.base
            .saturating_add(self.bonus)
            .saturating_add(self.streak_bonus)
    }
}

/// Pointer to the lesson the user should take next, when the course has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextLesson {
    pub id: LessonId,
    pub lesson_number: String,
    pub title: String,
}

/// Aggregate outcome of a completed lesson attempt.
///
/// The backend is authoritative for every field here; in particular
/// `correct_count` is never re-derived from client-side grading records,
/// so the UI can never drift from the server's scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCompletionResult {
    score: u32,
    correct_count: u32,
    total_count: u32,
    xp_gained: XpBreakdown,
    is_first_completion: bool,
    updated_streak: u32,
    next_lesson: Option<NextLesson>,
}

impl LessonCompletionResult {
    /// Builds a completion result from service-reported parts.
    ///
    /// # Errors
    ///
    /// Returns `CompletionResultError::ScoreOutOfRange` if `score` exceeds 100,
    /// `CompletionResultError::CountMismatch` if more answers are correct than
    /// exist, or `CompletionResultError::XpMismatch` if the XP breakdown does
    /// not add up to its own total.
    pub fn from_parts(
        score: u32,
        correct_count: u32,
        total_count: u32,
        xp_gained: XpBreakdown,
        is_first_completion: bool,
        updated_streak: u32,
        next_lesson: Option<NextLesson>,
    ) -> Result<Self, CompletionResultError> {
        if score > 100 {
            return Err(CompletionResultError::ScoreOutOfRange(score));
        }
        if correct_count > total_count {
            return Err(CompletionResultError::CountMismatch {
                correct: correct_count,
                total: total_count,
            });
        }
        let sum = xp_gained.sum();
        if sum != xp_gained.total {
            return Err(CompletionResultError::XpMismatch {
                total: xp_gained.total,
                sum,
            });
        }

        Ok(Self {
            score,
            correct_count,
            total_count,
            xp_gained,
            is_first_completion,
            updated_streak,
            next_lesson,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    #[must_use]
    pub fn xp_gained(&self) -> XpBreakdown {
        self.xp_gained
    }

    #[must_use]
    pub fn is_first_completion(&self) -> bool {
        self.is_first_completion
    }

    #[must_use]
    pub fn updated_streak(&self) -> u32 {
        self.updated_streak
    }

    #[must_use]
    pub fn next_lesson(&self) -> Option<&NextLesson> {
        self.next_lesson.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xp(base: u32, bonus: u32, streak_bonus: u32) -> XpBreakdown {
        XpBreakdown {
            base,
            bonus,
            streak_bonus,
            total: base + bonus + streak_bonus,
        }
    }

    #[test]
    fn from_parts_accepts_consistent_values() {
        let result = LessonCompletionResult::from_parts(
            67,
            2,
            3,
            xp(10, 5, 3),
            true,
            4,
            Some(NextLesson {
                id: LessonId::new("l2"),
                lesson_number: "1.2".into(),
                title: "Numbers".into(),
            }),
        )
        .unwrap();

        assert_eq!(result.score(), 67);
        assert_eq!(result.correct_count(), 2);
        assert_eq!(result.total_count(), 3);
        assert_eq!(result.xp_gained().total, 18);
        assert!(result.is_first_completion());
        assert_eq!(result.updated_streak(), 4);
        assert_eq!(result.next_lesson().unwrap().id.as_str(), "l2");
    }

    #[test]
    fn from_parts_rejects_score_over_100() {
        let err = LessonCompletionResult::from_parts(101, 3, 3, xp(10, 0, 0), false, 1, None)
            .unwrap_err();
        assert_eq!(err, CompletionResultError::ScoreOutOfRange(101));
    }

    #[test]
    fn from_parts_rejects_correct_count_over_total() {
        let err = LessonCompletionResult::from_parts(100, 4, 3, xp(10, 0, 0), false, 1, None)
            .unwrap_err();
        assert_eq!(
            err,
            CompletionResultError::CountMismatch {
                correct: 4,
                total: 3
            }
        );
    }

    #[test]
    fn from_parts_rejects_inconsistent_xp() {
        let bad = XpBreakdown {
            base: 10,
            bonus: 5,
            streak_bonus: 0,
            total: 20,
        };
        let err =
            LessonCompletionResult::from_parts(100, 3, 3, bad, false, 1, None).unwrap_err();
        assert_eq!(err, CompletionResultError::XpMismatch { total: 20, sum: 15 });
    }
}
