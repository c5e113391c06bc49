#![forbid(unsafe_code)]

pub mod api;
pub mod auth;
pub mod error;
pub mod lesson_api;
pub mod sessions;
pub mod wizard;

pub use lingo_core::Clock;
pub use sessions as session;

pub use api::{ApiClient, ApiConfig};
pub use auth::{
    AuthClient, AuthSession, InMemoryTokenStore, Plan, ProfileUpdate, TokenStore, UserProfile,
};
pub use error::{
    ApiError, AttemptError, AuthError, CompletionError, ContentLoadError, GradingError,
    TokenStoreError, WizardError,
};
pub use lesson_api::{
    CompletionService, GradedVerdict, GradingService, HttpLessonApi, LessonRepository,
    LoadedLesson,
};
pub use sessions::{
    AdvanceOutcome, AdvanceResult, AttemptState, ButtonVariant, ConfirmOutcome, ExercisePhase,
    LessonAttempt, LessonFlowService, LessonProgress, PrimaryAction, PrimaryButton,
};
pub use wizard::{AppLanguage, WizardClient, WizardDraft, WizardStatus};
