use chrono::{DateTime, Utc};
use std::fmt;

use lingo_core::model::{
    AttemptId, Exercise, GradedAnswer, Lesson, LessonCompletionResult, LessonId,
};

use super::progress::LessonProgress;
use crate::error::AttemptError;
use crate::lesson_api::GradedVerdict;

//
// ─── PHASES & STATES ───────────────────────────────────────────────────────────
//

/// Per-exercise sub-state within a lesson attempt.
///
/// Transitions are monotonic for each exercise — `Selecting → Grading →
/// Revealed` — with one exception: a failed grading request reverts
/// `Grading → Selecting` so the user can reselect and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExercisePhase {
    Selecting,
    Grading,
    Revealed,
}

/// Session-level state of a lesson attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Active,
    Completed,
    Abandoned,
}

/// Outcome of advancing past a revealed exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the next exercise with fresh `Selecting` state.
    NextExercise,
    /// The final exercise is revealed; the attempt is ready for completion.
    /// Nothing was mutated, so a failed completion can simply advance again.
    AwaitingCompletion,
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One user's pass through a lesson's ordered exercise list.
///
/// Owns the loaded lesson content for the attempt's duration and steps
/// through it strictly forward: the current index never skips and never
/// revisits, so grading records land in increasing index order with at most
/// one per exercise. Every mutating operation guards on the attempt still
/// being `Active`, which also keeps a late network response from touching a
/// torn-down session.
pub struct LessonAttempt {
    attempt_id: AttemptId,
    lesson: Lesson,
    current: usize,
    selected_option: Option<String>,
    phase: ExercisePhase,
    state: AttemptState,
    results: Vec<GradedAnswer>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    completion: Option<LessonCompletionResult>,
}

impl LessonAttempt {
    /// Open a fresh attempt on loaded lesson content.
    ///
    /// `started_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NoExercises` if the lesson is empty; a session
    /// without content is unrenderable and never starts.
    pub fn new(lesson: Lesson, started_at: DateTime<Utc>) -> Result<Self, AttemptError> {
        if lesson.total_exercises() == 0 {
            return Err(AttemptError::NoExercises);
        }

        Ok(Self {
            attempt_id: AttemptId::generate(),
            lesson,
            current: 0,
            selected_option: None,
            phase: ExercisePhase::Selecting,
            state: AttemptState::Active,
            results: Vec::new(),
            started_at,
            completed_at: None,
            completion: None,
        })
    }

    //
    // ─── Operations ────────────────────────────────────────────────────────
    //

    /// Select an option, or toggle the current one off.
    ///
    /// Re-selecting the already selected option clears the selection; any
    /// other option replaces it. Only valid while the current exercise is
    /// `Selecting` and the attempt is active; otherwise nothing changes.
    /// Returns whether the selection changed.
    pub fn select_option(&mut self, option: &str) -> bool {
        if self.state != AttemptState::Active || self.phase != ExercisePhase::Selecting {
            return false;
        }

        match self.selected_option.as_deref() {
            Some(current) if current == option => self.selected_option = None,
            _ => self.selected_option = Some(option.to_string()),
        }
        true
    }

    /// Lock in the current selection and hand it out for grading.
    ///
    /// Transitions `Selecting → Grading`. While `Grading` or `Revealed` the
    /// guards reject re-entry, which caps in-flight grading requests at one
    /// per exercise no matter how fast the confirm control is tapped.
    ///
    /// # Errors
    ///
    /// `Finished` if the attempt is over, `NotSelecting` outside the
    /// selection phase, `NoSelection` when nothing is picked.
    pub fn begin_grading(&mut self) -> Result<String, AttemptError> {
        if self.state != AttemptState::Active {
            return Err(AttemptError::Finished);
        }
        if self.phase != ExercisePhase::Selecting {
            return Err(AttemptError::NotSelecting);
        }
        let Some(answer) = self.selected_option.clone() else {
            return Err(AttemptError::NoSelection);
        };

        self.phase = ExercisePhase::Grading;
        Ok(answer)
    }

    /// Record the grading verdict for the current exercise and reveal it.
    ///
    /// The selection is kept so the UI can still highlight the user's pick
    /// next to the canonical answer.
    ///
    /// # Errors
    ///
    /// `Finished` if the attempt is over, `NotGrading` when no grading
    /// request is in flight.
    pub fn resolve_grading(
        &mut self,
        verdict: &GradedVerdict,
        graded_at: DateTime<Utc>,
    ) -> Result<&GradedAnswer, AttemptError> {
        if self.state != AttemptState::Active {
            return Err(AttemptError::Finished);
        }
        if self.phase != ExercisePhase::Grading {
            return Err(AttemptError::NotGrading);
        }
        let selected = self.selected_option.clone().ok_or(AttemptError::NoSelection)?;

        self.results.push(GradedAnswer::new(
            self.current,
            selected,
            verdict.is_correct,
            verdict.correct_answer.clone(),
            graded_at,
        ));
        self.phase = ExercisePhase::Revealed;

        self.results.last().ok_or(AttemptError::NotGrading)
    }

    /// Roll back a failed grading request.
    ///
    /// Reverts `Grading → Selecting` and clears the selection; the user must
    /// reselect and reconfirm. No-op outside the `Grading` phase, so a late
    /// failure cannot disturb an already revealed exercise.
    pub fn cancel_grading(&mut self) {
        if self.state == AttemptState::Active && self.phase == ExercisePhase::Grading {
            self.phase = ExercisePhase::Selecting;
            self.selected_option = None;
        }
    }

    /// Move past a revealed exercise.
    ///
    /// # Errors
    ///
    /// `Finished` if the attempt is over, `NotRevealed` before the current
    /// exercise has been graded.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, AttemptError> {
        if self.state != AttemptState::Active {
            return Err(AttemptError::Finished);
        }
        if self.phase != ExercisePhase::Revealed {
            return Err(AttemptError::NotRevealed);
        }
        if self.is_last_exercise() {
            return Ok(AdvanceOutcome::AwaitingCompletion);
        }

        self.current += 1;
        self.phase = ExercisePhase::Selecting;
        self.selected_option = None;
        Ok(AdvanceOutcome::NextExercise)
    }

    /// Close the attempt with the service-reported completion result.
    ///
    /// # Errors
    ///
    /// `Finished` if the attempt is over, `NotRevealed`/`NotAtEnd` unless
    /// every exercise has been revealed.
    pub fn complete(
        &mut self,
        result: LessonCompletionResult,
        completed_at: DateTime<Utc>,
    ) -> Result<(), AttemptError> {
        if self.state != AttemptState::Active {
            return Err(AttemptError::Finished);
        }
        if self.phase != ExercisePhase::Revealed {
            return Err(AttemptError::NotRevealed);
        }
        if !self.is_last_exercise() {
            return Err(AttemptError::NotAtEnd);
        }

        self.state = AttemptState::Completed;
        self.completed_at = Some(completed_at);
        self.completion = Some(result);
        Ok(())
    }

    /// Abandon the attempt. Idempotent; no network side effects — answers
    /// graded so far are already recorded server-side.
    ///
    /// # Errors
    ///
    /// `Finished` if the attempt already completed.
    pub fn abandon(&mut self) -> Result<(), AttemptError> {
        match self.state {
            AttemptState::Completed => Err(AttemptError::Finished),
            AttemptState::Abandoned => Ok(()),
            AttemptState::Active => {
                self.state = AttemptState::Abandoned;
                Ok(())
            }
        }
    }

    //
    // ─── Accessors ─────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        self.lesson.id()
    }

    #[must_use]
    pub fn phase(&self) -> ExercisePhase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> AttemptState {
        self.state
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.lesson.exercise_at(self.current)
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    #[must_use]
    pub fn results(&self) -> &[GradedAnswer] {
        &self.results
    }

    /// Grading record for an exercise index, once graded.
    ///
    /// Records are stored in index order, so position equals index.
    #[must_use]
    pub fn result_for(&self, index: usize) -> Option<&GradedAnswer> {
        self.results.get(index)
    }

    /// Grading record for the current exercise, once revealed.
    #[must_use]
    pub fn current_result(&self) -> Option<&GradedAnswer> {
        self.result_for(self.current)
    }

    #[must_use]
    pub fn total_exercises(&self) -> usize {
        self.lesson.total_exercises()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total_exercises().saturating_sub(self.results.len())
    }

    #[must_use]
    pub fn is_last_exercise(&self) -> bool {
        self.current + 1 == self.total_exercises()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == AttemptState::Completed
    }

    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.state == AttemptState::Abandoned
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Completion result, once the attempt closed successfully.
    #[must_use]
    pub fn completion(&self) -> Option<&LessonCompletionResult> {
        self.completion.as_ref()
    }

    /// Returns a summary of the attempt's progress.
    #[must_use]
    pub fn progress(&self) -> LessonProgress {
        LessonProgress {
            total: self.total_exercises(),
            answered: self.answered_count(),
            remaining: self.remaining(),
            is_complete: self.is_completed(),
        }
    }
}

impl fmt::Debug for LessonAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LessonAttempt")
            .field("attempt_id", &self.attempt_id)
            .field("lesson_id", &self.lesson.id())
            .field("current", &self.current)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("results_len", &self.results.len())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
