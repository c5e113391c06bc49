use std::sync::Arc;

use lingo_core::Clock;
use lingo_core::model::{GradedAnswer, LessonCompletionResult, LessonId, PriorProgress};

use super::attempt::{AdvanceOutcome, LessonAttempt};
use crate::error::{AttemptError, CompletionError, ContentLoadError, GradingError};
use crate::lesson_api::{CompletionService, GradingService, LessonRepository};

/// Outcome of routing a confirm intent through the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// The guards rejected the intent (wrong phase or nothing selected);
    /// no grading request was made.
    Ignored,
    Graded(GradedAnswer),
}

/// Outcome of routing an advance intent through the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceResult {
    Ignored,
    NextExercise,
    Completed(LessonCompletionResult),
}

/// Drives a lesson attempt against the remote lesson services.
///
/// The attempt itself stays a pure state machine; this service owns the
/// clock and the network edges. Single-flight per operation kind falls out
/// of the phase guards, and `&mut LessonAttempt` keeps one logical thread
/// of control per attempt.
#[derive(Clone)]
pub struct LessonFlowService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    grading: Arc<dyn GradingService>,
    completion: Arc<dyn CompletionService>,
}

impl LessonFlowService {
    #[must_use]
    pub fn new(
        clock: Clock,
        lessons: Arc<dyn LessonRepository>,
        grading: Arc<dyn GradingService>,
        completion: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            clock,
            lessons,
            grading,
            completion,
        }
    }

    /// Load lesson content and open a fresh attempt on it.
    ///
    /// # Errors
    ///
    /// Returns `ContentLoadError` when the lesson cannot be fetched, fails
    /// validation, or has no exercises. All of these are fatal for the
    /// session: there is nothing to present.
    pub async fn start_attempt(
        &self,
        lesson_id: &LessonId,
    ) -> Result<(LessonAttempt, Option<PriorProgress>), ContentLoadError> {
        let loaded = self.lessons.get_lesson(lesson_id).await?;
        let attempt = LessonAttempt::new(loaded.lesson, self.clock.now())?;
        tracing::info!(
            lesson_id = %lesson_id,
            exercises = attempt.total_exercises(),
            "lesson attempt started"
        );
        Ok((attempt, loaded.prior_progress))
    }

    /// Submit the current selection for grading.
    ///
    /// Returns `ConfirmOutcome::Ignored` when the machine's guards reject
    /// the intent, so rapid repeated confirms trigger at most one grading
    /// request. On service failure the attempt reverts to `Selecting` with
    /// the selection cleared.
    ///
    /// # Errors
    ///
    /// Returns `GradingError` when the grading service fails; the attempt
    /// is already rolled back and the user may reselect and retry.
    pub async fn confirm_answer(
        &self,
        attempt: &mut LessonAttempt,
    ) -> Result<ConfirmOutcome, GradingError> {
        let answer = match attempt.begin_grading() {
            Ok(answer) => answer,
            Err(
                AttemptError::NotSelecting | AttemptError::NoSelection | AttemptError::Finished,
            ) => return Ok(ConfirmOutcome::Ignored),
            Err(err) => return Err(GradingError::Attempt(err)),
        };

        let index = attempt.current_index();
        match self
            .grading
            .submit_answer(attempt.lesson_id(), index, &answer)
            .await
        {
            Ok(verdict) => {
                let graded = attempt.resolve_grading(&verdict, self.clock.now())?.clone();
                tracing::debug!(exercise = index, correct = graded.is_correct, "answer graded");
                Ok(ConfirmOutcome::Graded(graded))
            }
            Err(err) => {
                attempt.cancel_grading();
                tracing::warn!(exercise = index, error = %err, "grading failed, selection reverted");
                Err(err)
            }
        }
    }

    /// Move past a revealed exercise, finalizing the lesson from the last
    /// one.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` when finalization fails; the attempt stays
    /// on the revealed final exercise and advancing again retries the
    /// completion without re-grading anything.
    pub async fn advance(
        &self,
        attempt: &mut LessonAttempt,
    ) -> Result<AdvanceResult, CompletionError> {
        match attempt.advance() {
            Ok(AdvanceOutcome::NextExercise) => Ok(AdvanceResult::NextExercise),
            Ok(AdvanceOutcome::AwaitingCompletion) => {
                let result = self.complete_attempt(attempt).await?;
                Ok(AdvanceResult::Completed(result))
            }
            Err(_) => Ok(AdvanceResult::Ignored),
        }
    }

    /// Finalize the attempt with the completion service.
    ///
    /// The aggregate outcome — score, correct count, XP, streak — comes
    /// from the service verbatim; nothing is re-derived from local grading
    /// records.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` on service failure; the attempt remains
    /// resumable.
    pub async fn complete_attempt(
        &self,
        attempt: &mut LessonAttempt,
    ) -> Result<LessonCompletionResult, CompletionError> {
        let result = match self.completion.complete_lesson(attempt.lesson_id()).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    lesson_id = %attempt.lesson_id(),
                    error = %err,
                    "completion failed, attempt stays resumable"
                );
                return Err(err);
            }
        };

        attempt.complete(result.clone(), self.clock.now())?;
        tracing::info!(
            lesson_id = %attempt.lesson_id(),
            score = result.score(),
            correct = result.correct_count(),
            "lesson completed"
        );
        Ok(result)
    }

    /// Abandon the attempt. No network call: every graded answer is already
    /// recorded server-side.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Finished` if the attempt already completed.
    pub fn exit(&self, attempt: &mut LessonAttempt) -> Result<(), AttemptError> {
        attempt.abandon()?;
        tracing::info!(
            lesson_id = %attempt.lesson_id(),
            answered = attempt.answered_count(),
            "lesson attempt abandoned"
        );
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::lesson_api::{GradedVerdict, LoadedLesson};
    use crate::sessions::attempt::ExercisePhase;
    use async_trait::async_trait;
    use lingo_core::model::{
        ExerciseDraft, ExerciseId, ExerciseKind, Lesson, LessonCatalog, LessonLevel, XpBreakdown,
    };
    use lingo_core::time::fixed_clock;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn build_lesson(exercise_count: usize) -> Lesson {
        let exercises = (0..exercise_count)
            .map(|i| {
                ExerciseDraft {
                    kind: ExerciseKind::FillBlank,
                    prompt: format!("Prompt {i}"),
                    options: vec!["sí".into(), "no".into()],
                    correct_answer: Some("sí".into()),
                    ..ExerciseDraft::default()
                }
                .validate(ExerciseId::new(format!("e{i}")))
                .unwrap()
            })
            .collect();
        Lesson::new(
            LessonId::new("l1"),
            "Basics",
            "1.1",
            "Yes and no",
            None,
            LessonLevel::A1,
            exercises,
            1,
            false,
            Vec::new(),
        )
        .unwrap()
    }

    struct FakeRepository {
        lesson: Lesson,
    }

    #[async_trait]
    impl LessonRepository for FakeRepository {
        async fn get_lesson(&self, _id: &LessonId) -> Result<LoadedLesson, ContentLoadError> {
            Ok(LoadedLesson {
                lesson: self.lesson.clone(),
                prior_progress: None,
            })
        }

        async fn list_lessons(
            &self,
            _level: Option<LessonLevel>,
            _chapter: Option<&str>,
        ) -> Result<LessonCatalog, ContentLoadError> {
            Ok(LessonCatalog::default())
        }
    }

    #[derive(Default)]
    struct FakeGrading {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl GradingService for FakeGrading {
        async fn submit_answer(
            &self,
            _lesson_id: &LessonId,
            _exercise_index: usize,
            answer: &str,
        ) -> Result<GradedVerdict, GradingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(GradingError::Rejected("exercise not found".into()));
            }
            Ok(GradedVerdict {
                is_correct: answer == "sí",
                correct_answer: "sí".into(),
                explanation: Some("'sí' means yes.".into()),
            })
        }
    }

    #[derive(Default)]
    struct FakeCompletion {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl CompletionService for FakeCompletion {
        async fn complete_lesson(
            &self,
            _lesson_id: &LessonId,
        ) -> Result<LessonCompletionResult, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(CompletionError::Api(ApiError::HttpStatus(
                    reqwest::StatusCode::BAD_GATEWAY,
                )));
            }
            Ok(LessonCompletionResult::from_parts(
                67,
                2,
                3,
                XpBreakdown {
                    base: 10,
                    bonus: 0,
                    streak_bonus: 2,
                    total: 12,
                },
                true,
                3,
                None,
            )
            .unwrap())
        }
    }

    struct Harness {
        flow: LessonFlowService,
        grading: Arc<FakeGrading>,
        completion: Arc<FakeCompletion>,
    }

    fn harness(exercise_count: usize) -> Harness {
        let grading = Arc::new(FakeGrading::default());
        let completion = Arc::new(FakeCompletion::default());
        let flow = LessonFlowService::new(
            fixed_clock(),
            Arc::new(FakeRepository {
                lesson: build_lesson(exercise_count),
            }),
            Arc::clone(&grading) as Arc<dyn GradingService>,
            Arc::clone(&completion) as Arc<dyn CompletionService>,
        );
        Harness {
            flow,
            grading,
            completion,
        }
    }

    #[tokio::test]
    async fn confirm_without_selection_is_ignored() {
        let h = harness(1);
        let (mut attempt, _) = h.flow.start_attempt(&LessonId::new("l1")).await.unwrap();

        let outcome = h.flow.confirm_answer(&mut attempt).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Ignored);
        assert_eq!(h.grading.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repeated_confirms_grade_exactly_once() {
        let h = harness(1);
        let (mut attempt, _) = h.flow.start_attempt(&LessonId::new("l1")).await.unwrap();
        attempt.select_option("sí");

        let first = h.flow.confirm_answer(&mut attempt).await.unwrap();
        assert!(matches!(first, ConfirmOutcome::Graded(_)));

        // The exercise is already revealed; another confirm is a no-op.
        let second = h.flow.confirm_answer(&mut attempt).await.unwrap();
        assert_eq!(second, ConfirmOutcome::Ignored);
        assert_eq!(h.grading.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn grading_success_reveals_with_canonical_answer() {
        let h = harness(2);
        let (mut attempt, _) = h.flow.start_attempt(&LessonId::new("l1")).await.unwrap();
        attempt.select_option("no");

        let outcome = h.flow.confirm_answer(&mut attempt).await.unwrap();
        let ConfirmOutcome::Graded(graded) = outcome else {
            panic!("expected a graded outcome");
        };
        assert!(!graded.is_correct);
        assert_eq!(graded.correct_answer, "sí");
        assert_eq!(attempt.phase(), ExercisePhase::Revealed);
        assert_eq!(attempt.result_for(0).unwrap().correct_answer, "sí");
    }

    #[tokio::test]
    async fn grading_failure_reverts_to_selecting() {
        let h = harness(1);
        let (mut attempt, _) = h.flow.start_attempt(&LessonId::new("l1")).await.unwrap();
        attempt.select_option("sí");
        h.grading.fail.store(true, Ordering::SeqCst);

        let err = h.flow.confirm_answer(&mut attempt).await.unwrap_err();
        assert!(matches!(err, GradingError::Rejected(_)));
        assert_eq!(attempt.phase(), ExercisePhase::Selecting);
        assert_eq!(attempt.selected_option(), None);
        assert_eq!(attempt.answered_count(), 0);

        // The user reselects and retries; this time it goes through.
        h.grading.fail.store(false, Ordering::SeqCst);
        attempt.select_option("sí");
        let outcome = h.flow.confirm_answer(&mut attempt).await.unwrap();
        assert!(matches!(outcome, ConfirmOutcome::Graded(_)));
        assert_eq!(h.grading.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn advance_before_reveal_is_ignored() {
        let h = harness(2);
        let (mut attempt, _) = h.flow.start_attempt(&LessonId::new("l1")).await.unwrap();

        let result = h.flow.advance(&mut attempt).await.unwrap();
        assert_eq!(result, AdvanceResult::Ignored);
        assert_eq!(h.completion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn completion_failure_keeps_attempt_resumable() {
        let h = harness(1);
        let (mut attempt, _) = h.flow.start_attempt(&LessonId::new("l1")).await.unwrap();
        attempt.select_option("sí");
        h.flow.confirm_answer(&mut attempt).await.unwrap();

        h.completion.fail.store(true, Ordering::SeqCst);
        let err = h.flow.advance(&mut attempt).await.unwrap_err();
        assert!(matches!(err, CompletionError::Api(_)));
        assert_eq!(attempt.phase(), ExercisePhase::Revealed);
        assert!(!attempt.is_completed());

        // Advancing again retries completion without touching grading.
        h.completion.fail.store(false, Ordering::SeqCst);
        let result = h.flow.advance(&mut attempt).await.unwrap();
        assert!(matches!(result, AdvanceResult::Completed(_)));
        assert_eq!(h.completion.calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.grading.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exit_mid_session_makes_no_completion_call() {
        let h = harness(3);
        let (mut attempt, _) = h.flow.start_attempt(&LessonId::new("l1")).await.unwrap();
        attempt.select_option("sí");
        h.flow.confirm_answer(&mut attempt).await.unwrap();
        h.flow.advance(&mut attempt).await.unwrap();

        h.flow.exit(&mut attempt).unwrap();
        assert!(attempt.is_abandoned());
        assert_eq!(h.completion.calls.load(Ordering::SeqCst), 0);

        // Late verdicts cannot land on the abandoned attempt.
        let outcome = h.flow.confirm_answer(&mut attempt).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Ignored);
    }
}
