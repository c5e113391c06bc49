use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::ExerciseId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("exercise prompt cannot be empty")]
    EmptyPrompt,

    #[error("invalid media url: {0}")]
    InvalidMediaUrl(String),
}

//
// ─── EXERCISE KIND ─────────────────────────────────────────────────────────────
//

/// The interaction style of an exercise.
///
/// Unknown kinds coming from the backend are preserved verbatim in
/// `Unsupported` rather than rejected: the exercise still occupies its slot
/// in the lesson sequence and is presented as a non-interactive placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExerciseKind {
    FillBlank,
    ImageMatch,
    MultipleChoice,
    Translation,
    Unsupported(String),
}

impl ExerciseKind {
    /// Parses the wire tag used by the backend (`fill-blank`, `image-match`, ...).
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "fill-blank" => Self::FillBlank,
            "image-match" => Self::ImageMatch,
            "multiple-choice" => Self::MultipleChoice,
            "translation" => Self::Translation,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Returns the wire tag for this kind.
    #[must_use]
    pub fn as_tag(&self) -> &str {
        match self {
            Self::FillBlank => "fill-blank",
            Self::ImageMatch => "image-match",
            Self::MultipleChoice => "multiple-choice",
            Self::Translation => "translation",
            Self::Unsupported(tag) => tag,
        }
    }

    /// Returns true when this client knows how to present the exercise.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl From<String> for ExerciseKind {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<ExerciseKind> for String {
    fn from(kind: ExerciseKind) -> Self {
        kind.as_tag().to_string()
    }
}

impl Default for ExerciseKind {
    fn default() -> Self {
        Self::Unsupported(String::new())
    }
}

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// Unvalidated exercise content as received from the backend.
#[derive(Debug, Clone, Default)]
pub struct ExerciseDraft {
    pub kind: ExerciseKind,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub translation: Option<String>,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
}

impl ExerciseDraft {
    /// Validates the draft into an immutable `Exercise`.
    ///
    /// Empty optional strings are normalized to `None` so "no explanation"
    /// is never conflated with an empty one. An `Unsupported` kind keeps its
    /// slot but has its options cleared: a degenerate exercise exposes zero
    /// valid options and can never be answered.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::EmptyPrompt` if the prompt is blank, or
    /// `ExerciseError::InvalidMediaUrl` if a media url fails to parse.
    pub fn validate(self, id: ExerciseId) -> Result<Exercise, ExerciseError> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(ExerciseError::EmptyPrompt);
        }

        let options = if self.kind.is_supported() {
            self.options
        } else {
            Vec::new()
        };

        Ok(Exercise {
            id,
            kind: self.kind,
            prompt,
            options,
            correct_answer: normalize_optional(self.correct_answer),
            explanation: normalize_optional(self.explanation),
            translation: normalize_optional(self.translation),
            audio_url: parse_media_url(self.audio_url)?,
            image_url: parse_media_url(self.image_url)?,
        })
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_media_url(value: Option<String>) -> Result<Option<Url>, ExerciseError> {
    match normalize_optional(value) {
        None => Ok(None),
        Some(raw) => Url::parse(&raw)
            .map(Some)
            .map_err(|_| ExerciseError::InvalidMediaUrl(raw)),
    }
}

/// A single exercise within a lesson. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    id: ExerciseId,
    kind: ExerciseKind,
    prompt: String,
    options: Vec<String>,
    correct_answer: Option<String>,
    explanation: Option<String>,
    translation: Option<String>,
    audio_url: Option<Url>,
    image_url: Option<Url>,
}

impl Exercise {
    #[must_use]
    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> &ExerciseKind {
        &self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Ordered answer options. Empty for unsupported kinds.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Canonical answer, when the backend includes it in lesson content.
    #[must_use]
    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_answer.as_deref()
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }

    #[must_use]
    pub fn audio_url(&self) -> Option<&Url> {
        self.audio_url.as_ref()
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    /// Returns true when the user can actually pick an answer: the kind is
    /// supported and at least one option exists.
    #[must_use]
    pub fn is_answerable(&self) -> bool {
        self.kind.is_supported() && !self.options.is_empty()
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: &str) -> ExerciseDraft {
        ExerciseDraft {
            kind: ExerciseKind::parse(kind),
            prompt: "El gato bebe ___".into(),
            options: vec!["leche".into(), "pan".into()],
            correct_answer: Some("leche".into()),
            explanation: Some("Cats drink milk.".into()),
            ..ExerciseDraft::default()
        }
    }

    #[test]
    fn kind_parses_known_tags() {
        assert_eq!(ExerciseKind::parse("fill-blank"), ExerciseKind::FillBlank);
        assert_eq!(ExerciseKind::parse("image-match"), ExerciseKind::ImageMatch);
        assert_eq!(
            ExerciseKind::parse("multiple-choice"),
            ExerciseKind::MultipleChoice
        );
        assert_eq!(ExerciseKind::parse("translation"), ExerciseKind::Translation);
    }

    #[test]
    fn kind_preserves_unknown_tags() {
        let kind = ExerciseKind::parse("listening-v2");
        assert_eq!(kind, ExerciseKind::Unsupported("listening-v2".into()));
        assert_eq!(kind.as_tag(), "listening-v2");
        assert!(!kind.is_supported());
    }

    #[test]
    fn validate_rejects_blank_prompt() {
        let mut d = draft("fill-blank");
        d.prompt = "   ".into();
        let err = d.validate(ExerciseId::new("e1")).unwrap_err();
        assert_eq!(err, ExerciseError::EmptyPrompt);
    }

    #[test]
    fn validate_normalizes_empty_optionals() {
        let mut d = draft("fill-blank");
        d.explanation = Some("  ".into());
        d.correct_answer = Some(String::new());
        let exercise = d.validate(ExerciseId::new("e1")).unwrap();
        assert_eq!(exercise.explanation(), None);
        assert_eq!(exercise.correct_answer(), None);
    }

    #[test]
    fn validate_rejects_bad_media_url() {
        let mut d = draft("image-match");
        d.image_url = Some("not a url".into());
        let err = d.validate(ExerciseId::new("e1")).unwrap_err();
        assert!(matches!(err, ExerciseError::InvalidMediaUrl(_)));
    }

    #[test]
    fn unsupported_kind_degrades_to_zero_options() {
        let d = draft("listening-v2");
        let exercise = d.validate(ExerciseId::new("e1")).unwrap();
        assert!(exercise.options().is_empty());
        assert!(!exercise.is_answerable());
        assert!(!exercise.has_option("leche"));
    }

    #[test]
    fn supported_exercise_is_answerable() {
        let exercise = draft("fill-blank").validate(ExerciseId::new("e1")).unwrap();
        assert!(exercise.is_answerable());
        assert!(exercise.has_option("leche"));
        assert!(!exercise.has_option("agua"));
    }
}
