mod attempt;
mod progress;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::AttemptError;
pub use attempt::{AdvanceOutcome, AttemptState, ExercisePhase, LessonAttempt};
pub use progress::LessonProgress;
pub use view::{
    ButtonVariant, PrimaryAction, PrimaryButton, exit_needs_confirmation, resolve_primary_button,
};
pub use workflow::{AdvanceResult, ConfirmOutcome, LessonFlowService};
