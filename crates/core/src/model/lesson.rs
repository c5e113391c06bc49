use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::exercise::Exercise;
use crate::model::ids::LessonId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("unknown lesson level: {0}")]
    UnknownLevel(String),

    #[error("prior progress score must be 0..=100, got {0}")]
    ScoreOutOfRange(u32),
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// CEFR proficiency level a lesson is pitched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LessonLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl LessonLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }
}

impl fmt::Display for LessonLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonLevel {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A1" => Ok(Self::A1),
            "A2" => Ok(Self::A2),
            "B1" => Ok(Self::B1),
            "B2" => Ok(Self::B2),
            "C1" => Ok(Self::C1),
            "C2" => Ok(Self::C2),
            other => Err(LessonError::UnknownLevel(other.to_string())),
        }
    }
}

//
// ─── PRIOR PROGRESS ────────────────────────────────────────────────────────────
//

/// Progress from an earlier attempt, as reported by the backend alongside
/// lesson content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorProgress {
    completed: bool,
    score: u32,
    attempts: u32,
}

impl PriorProgress {
    /// # Errors
    ///
    /// Returns `LessonError::ScoreOutOfRange` if `score` exceeds 100.
    pub fn new(completed: bool, score: u32, attempts: u32) -> Result<Self, LessonError> {
        if score > 100 {
            return Err(LessonError::ScoreOutOfRange(score));
        }
        Ok(Self {
            completed,
            score,
            attempts,
        })
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A lesson: ordered exercises plus catalog metadata. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    chapter: String,
    lesson_number: String,
    title: String,
    description: Option<String>,
    level: LessonLevel,
    exercises: Vec<Exercise>,
    order: u32,
    is_premium: bool,
    topics: Vec<String>,
}

impl Lesson {
    /// Builds a lesson from validated parts.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is blank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: LessonId,
        chapter: impl Into<String>,
        lesson_number: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
        level: LessonLevel,
        exercises: Vec<Exercise>,
        order: u32,
        is_premium: bool,
        topics: Vec<String>,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }

        Ok(Self {
            id,
            chapter: chapter.into(),
            lesson_number: lesson_number.into(),
            title,
            description: description.filter(|d| !d.trim().is_empty()),
            level,
            exercises,
            order,
            is_premium,
            topics,
        })
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    #[must_use]
    pub fn lesson_number(&self) -> &str {
        &self.lesson_number
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn level(&self) -> LessonLevel {
        self.level
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn exercise_at(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    #[must_use]
    pub fn total_exercises(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Lessons grouped under one chapter heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSummary {
    pub chapter: String,
    pub lessons: Vec<Lesson>,
    pub completed_count: u32,
    pub total_lessons: u32,
}

/// The lesson list for a level, grouped by chapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LessonCatalog {
    pub chapters: Vec<ChapterSummary>,
    pub total_lessons: u32,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::exercise::{ExerciseDraft, ExerciseKind};
    use crate::model::ids::ExerciseId;

    fn build_exercise(id: &str) -> Exercise {
        ExerciseDraft {
            kind: ExerciseKind::FillBlank,
            prompt: "La casa es ___".into(),
            options: vec!["grande".into(), "verde".into()],
            correct_answer: Some("grande".into()),
            ..ExerciseDraft::default()
        }
        .validate(ExerciseId::new(id))
        .unwrap()
    }

    #[test]
    fn lesson_rejects_blank_title() {
        let err = Lesson::new(
            LessonId::new("l1"),
            "Basics",
            "1.1",
            "  ",
            None,
            LessonLevel::A1,
            vec![build_exercise("e1")],
            1,
            false,
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, LessonError::EmptyTitle);
    }

    #[test]
    fn lesson_exposes_exercises_in_order() {
        let lesson = Lesson::new(
            LessonId::new("l1"),
            "Basics",
            "1.1",
            "Greetings",
            Some("First words".into()),
            LessonLevel::A1,
            vec![build_exercise("e1"), build_exercise("e2")],
            1,
            false,
            vec!["greetings".into()],
        )
        .unwrap();

        assert_eq!(lesson.total_exercises(), 2);
        assert_eq!(lesson.exercise_at(0).unwrap().id().as_str(), "e1");
        assert_eq!(lesson.exercise_at(1).unwrap().id().as_str(), "e2");
        assert!(lesson.exercise_at(2).is_none());
    }

    #[test]
    fn level_parses_and_displays() {
        let level: LessonLevel = "B2".parse().unwrap();
        assert_eq!(level, LessonLevel::B2);
        assert_eq!(level.to_string(), "B2");
        assert!(matches!(
            "Z9".parse::<LessonLevel>(),
            Err(LessonError::UnknownLevel(_))
        ));
    }

    #[test]
    fn prior_progress_validates_score() {
        assert!(PriorProgress::new(true, 80, 2).is_ok());
        assert!(matches!(
            PriorProgress::new(false, 130, 1),
            Err(LessonError::ScoreOutOfRange(130))
        ));
    }
}
