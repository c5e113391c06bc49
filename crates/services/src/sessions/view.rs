use super::attempt::{AttemptState, ExercisePhase, LessonAttempt};

/// What pressing the single primary control does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    None,
    Check,
    Continue,
}

/// Closed set of visual variants for the primary control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    Disabled,
    Primary,
    Loading,
    Success,
    Danger,
}

/// Resolved state of the primary control.
///
/// This is intentionally **not** a UI view-model:
/// - no labels or colors
/// - no localization assumptions
///
/// The UI maps variants to its own styling and strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryButton {
    pub action: PrimaryAction,
    pub variant: ButtonVariant,
    pub enabled: bool,
}

impl PrimaryButton {
    const DISABLED: Self = Self {
        action: PrimaryAction::None,
        variant: ButtonVariant::Disabled,
        enabled: false,
    };

    /// Resolve the control for an attempt's current state. Finished
    /// attempts always map to the disabled control.
    #[must_use]
    pub fn for_attempt(attempt: &LessonAttempt) -> Self {
        if attempt.state() != AttemptState::Active {
            return Self::DISABLED;
        }
        resolve_primary_button(
            attempt.phase(),
            attempt.selected_option().is_some(),
            attempt.current_result().map(|r| r.is_correct),
        )
    }
}

/// Maps `(phase, has_selection, graded)` to the primary control state.
///
/// `graded` carries the current exercise's verdict once revealed. One
/// exhaustive table instead of a chain of conditionals, so every
/// combination can be asserted.
#[must_use]
pub fn resolve_primary_button(
    phase: ExercisePhase,
    has_selection: bool,
    graded: Option<bool>,
) -> PrimaryButton {
    use ButtonVariant as V;
    use ExercisePhase as P;
    use PrimaryAction as A;

    let (action, variant, enabled) = match (phase, has_selection, graded) {
        (P::Selecting, false, _) => (A::None, V::Disabled, false),
        (P::Selecting, true, _) => (A::Check, V::Primary, true),
        (P::Grading, _, _) => (A::None, V::Loading, false),
        (P::Revealed, _, Some(true)) => (A::Continue, V::Success, true),
        // A revealed exercise always carries a verdict; a missing one falls
        // back to the incorrect styling.
        (P::Revealed, _, _) => (A::Continue, V::Danger, true),
    };

    PrimaryButton {
        action,
        variant,
        enabled,
    }
}

/// True while a user-initiated exit gesture must be confirmed before the
/// attempt is abandoned. Finished attempts need no prompt.
#[must_use]
pub fn exit_needs_confirmation(attempt: &LessonAttempt) -> bool {
    attempt.state() == AttemptState::Active
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
