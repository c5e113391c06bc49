use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lingo_core::model::{
    ChapterSummary, CompletionResultError, Exercise, ExerciseDraft, ExerciseError, ExerciseId,
    ExerciseKind, Lesson, LessonCatalog, LessonCompletionResult, LessonError, LessonId,
    LessonLevel, NextLesson, PriorProgress, XpBreakdown,
};

use crate::api::ApiClient;
use crate::error::{ApiError, CompletionError, ContentLoadError, GradingError};

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Lesson content plus any prior progress, fetched together.
#[derive(Debug, Clone)]
pub struct LoadedLesson {
    pub lesson: Lesson,
    pub prior_progress: Option<PriorProgress>,
}

/// Verdict from the grading service for one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedVerdict {
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: Option<String>,
}

/// Read side of the lesson backend.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Fetch one lesson with its ordered exercises.
    ///
    /// # Errors
    ///
    /// Returns `ContentLoadError`; failures here are fatal for the session,
    /// since nothing can be rendered without content.
    async fn get_lesson(&self, id: &LessonId) -> Result<LoadedLesson, ContentLoadError>;

    /// List the lesson catalog, optionally filtered by level and chapter.
    ///
    /// # Errors
    ///
    /// Returns `ContentLoadError` on fetch or mapping failures.
    async fn list_lessons(
        &self,
        level: Option<LessonLevel>,
        chapter: Option<&str>,
    ) -> Result<LessonCatalog, ContentLoadError>;
}

/// Server-side grading of a single answer.
#[async_trait]
pub trait GradingService: Send + Sync {
    /// # Errors
    ///
    /// Returns `GradingError::Rejected` when the backend refuses the
    /// submission (unknown lesson or index) and `GradingError::Api` on
    /// transport failures. Both are retryable after reselecting.
    async fn submit_answer(
        &self,
        lesson_id: &LessonId,
        exercise_index: usize,
        answer: &str,
    ) -> Result<GradedVerdict, GradingError>;
}

/// Finalizes a lesson attempt and reports the aggregate outcome.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// # Errors
    ///
    /// Returns `CompletionError` on transport failures or an inconsistent
    /// payload; the caller may retry.
    async fn complete_lesson(
        &self,
        lesson_id: &LessonId,
    ) -> Result<LessonCompletionResult, CompletionError>;
}

//
// ─── HTTP IMPLEMENTATION ───────────────────────────────────────────────────────
//

/// `/lessons/*` client implementing all three lesson-backend contracts.
#[derive(Clone)]
pub struct HttpLessonApi {
    api: ApiClient,
}

impl HttpLessonApi {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl LessonRepository for HttpLessonApi {
    async fn get_lesson(&self, id: &LessonId) -> Result<LoadedLesson, ContentLoadError> {
        let payload: GetLessonPayload = self.api.get(&format!("/lessons/{id}")).await?;
        let lesson = payload.lesson.into_lesson()?;
        let prior_progress = payload
            .progress
            .map(PriorProgressDto::into_progress)
            .transpose()?;
        Ok(LoadedLesson {
            lesson,
            prior_progress,
        })
    }

    async fn list_lessons(
        &self,
        level: Option<LessonLevel>,
        chapter: Option<&str>,
    ) -> Result<LessonCatalog, ContentLoadError> {
        let mut query = Vec::new();
        if let Some(level) = level {
            query.push(format!("level={level}"));
        }
        if let Some(chapter) = chapter {
            query.push(format!("chapter={chapter}"));
        }
        let path = if query.is_empty() {
            "/lessons".to_string()
        } else {
            format!("/lessons?{}", query.join("&"))
        };

        let payload: GetLessonsPayload = self.api.get(&path).await?;
        let chapters = payload
            .chapters
            .into_iter()
            .map(ChapterDto::into_summary)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LessonCatalog {
            chapters,
            total_lessons: payload.total_lessons,
        })
    }
}

#[async_trait]
impl GradingService for HttpLessonApi {
    async fn submit_answer(
        &self,
        lesson_id: &LessonId,
        exercise_index: usize,
        answer: &str,
    ) -> Result<GradedVerdict, GradingError> {
        let response: SubmitAnswerResponse = self
            .api
            .post(
                &format!("/lessons/{lesson_id}/answer"),
                &SubmitAnswerRequest {
                    exercise_index,
                    answer,
                },
            )
            .await
            .map_err(into_grading_error)?;

        Ok(GradedVerdict {
            is_correct: response.is_correct,
            correct_answer: response.correct_answer,
            explanation: response.explanation,
        })
    }
}

fn into_grading_error(err: ApiError) -> GradingError {
    match err {
        ApiError::Rejected(message) => GradingError::Rejected(message),
        other => GradingError::Api(other),
    }
}

#[async_trait]
impl CompletionService for HttpLessonApi {
    async fn complete_lesson(
        &self,
        lesson_id: &LessonId,
    ) -> Result<LessonCompletionResult, CompletionError> {
        let response: CompleteLessonResponse = self
            .api
            .post(&format!("/lessons/{lesson_id}/complete"), &serde_json::json!({}))
            .await?;
        Ok(response.into_result()?)
    }
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExerciseDto {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "type")]
    kind: String,
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    translation: Option<String>,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

impl ExerciseDto {
    fn into_exercise(self) -> Result<Exercise, ExerciseError> {
        ExerciseDraft {
            kind: ExerciseKind::parse(&self.kind),
            prompt: self.question,
            options: self.options,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
            translation: self.translation,
            audio_url: self.audio_url,
            image_url: self.image_url,
        }
        .validate(ExerciseId::new(self.id))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonDto {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    chapter: String,
    #[serde(default)]
    lesson_number: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    level: String,
    #[serde(default)]
    exercises: Vec<ExerciseDto>,
    #[serde(default)]
    order: u32,
    #[serde(default)]
    is_premium: bool,
    #[serde(default)]
    topics: Vec<String>,
}

impl LessonDto {
    fn into_lesson(self) -> Result<Lesson, ContentLoadError> {
        let level: LessonLevel = self.level.parse()?;
        let exercises = self
            .exercises
            .into_iter()
            .map(ExerciseDto::into_exercise)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Lesson::new(
            LessonId::new(self.id),
            self.chapter,
            self.lesson_number,
            self.title,
            self.description,
            level,
            exercises,
            self.order,
            self.is_premium,
            self.topics,
        )?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriorProgressDto {
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    attempts: u32,
}

impl PriorProgressDto {
    fn into_progress(self) -> Result<PriorProgress, LessonError> {
        PriorProgress::new(self.completed, self.score, self.attempts)
    }
}

#[derive(Debug, Deserialize)]
struct GetLessonPayload {
    lesson: LessonDto,
    #[serde(default)]
    progress: Option<PriorProgressDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterDto {
    chapter: String,
    #[serde(default)]
    lessons: Vec<LessonDto>,
    #[serde(default)]
    completed_count: u32,
    #[serde(default)]
    total_lessons: u32,
}

impl ChapterDto {
    fn into_summary(self) -> Result<ChapterSummary, ContentLoadError> {
        let lessons = self
            .lessons
            .into_iter()
            .map(LessonDto::into_lesson)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ChapterSummary {
            chapter: self.chapter,
            lessons,
            completed_count: self.completed_count,
            total_lessons: self.total_lessons,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetLessonsPayload {
    #[serde(default)]
    chapters: Vec<ChapterDto>,
    #[serde(default)]
    total_lessons: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitAnswerRequest<'a> {
    exercise_index: usize,
    answer: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitAnswerResponse {
    is_correct: bool,
    correct_answer: String,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionProgressDto {
    score: u32,
    correct_answers: u32,
    total_questions: u32,
    #[serde(default)]
    is_first_completion: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct XpGainedDto {
    #[serde(default)]
    base: u32,
    #[serde(default)]
    bonus: u32,
    #[serde(default)]
    streak_bonus: u32,
    #[serde(default)]
    total: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextLessonDto {
    id: String,
    #[serde(default)]
    lesson_number: String,
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserStatsDto {
    #[serde(default)]
    streak: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteLessonResponse {
    progress: CompletionProgressDto,
    #[serde(default)]
    next_lesson: Option<NextLessonDto>,
    user_stats: UserStatsDto,
    #[serde(default)]
    xp_gained: XpGainedDto,
}

impl CompleteLessonResponse {
    fn into_result(self) -> Result<LessonCompletionResult, CompletionResultError> {
        LessonCompletionResult::from_parts(
            self.progress.score,
            self.progress.correct_answers,
            self.progress.total_questions,
            XpBreakdown {
                base: self.xp_gained.base,
                bonus: self.xp_gained.bonus,
                streak_bonus: self.xp_gained.streak_bonus,
                total: self.xp_gained.total,
            },
            self.progress.is_first_completion,
            self.user_stats.streak,
            self.next_lesson.map(|next| NextLesson {
                id: LessonId::new(next.id),
                lesson_number: next.lesson_number,
                title: next.title,
            }),
        )
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
