use serde::{Deserialize, Serialize};

use lingo_core::model::LessonLevel;

use crate::api::ApiClient;
use crate::auth::UserProfile;
use crate::error::WizardError;

/// Interface language choices offered during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLanguage {
    Es,
    En,
    Pt,
}

/// Onboarding answers accumulated across wizard steps and submitted once at
/// the end. Owned by the caller and passed explicitly, not held in an
/// ambient store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardDraft {
    pub name: String,
    pub app_language: AppLanguage,
    pub level: LessonLevel,
    pub goals: Vec<String>,
    pub daily_practice_goal: u32,
    pub wants_notifications: bool,
    pub wants_daily_reminder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
}

impl Default for WizardDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            app_language: AppLanguage::En,
            level: LessonLevel::A1,
            goals: Vec::new(),
            daily_practice_goal: 15,
            wants_notifications: true,
            wants_daily_reminder: true,
            reminder_time: Some("20:00".into()),
        }
    }
}

/// Whether the signed-in user still has onboarding to finish.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardStatus {
    pub needs_wizard: bool,
    pub has_name: bool,
    #[serde(default)]
    pub current_name: String,
}

/// Client for the `/wizard/*` endpoints.
#[derive(Clone)]
pub struct WizardClient {
    api: ApiClient,
}

impl WizardClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns `WizardError::Api` when the request fails.
    pub async fn check_status(&self) -> Result<WizardStatus, WizardError> {
        Ok(self.api.get("/wizard/status").await?)
    }

    /// Submit the finished draft and receive the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::EmptyName` before any request is made if the
    /// draft has no name, or `WizardError::Api` when the request fails.
    pub async fn complete(&self, draft: &WizardDraft) -> Result<UserProfile, WizardError> {
        if draft.name.trim().is_empty() {
            return Err(WizardError::EmptyName);
        }
        let payload: WizardCompletePayload = self.api.post("/wizard/complete", draft).await?;
        Ok(payload.user)
    }
}

#[derive(Deserialize)]
struct WizardCompletePayload {
    user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_defaults_match_onboarding() {
        let draft = WizardDraft::default();
        assert_eq!(draft.app_language, AppLanguage::En);
        assert_eq!(draft.level, LessonLevel::A1);
        assert_eq!(draft.daily_practice_goal, 15);
        assert!(draft.wants_notifications);
        assert_eq!(draft.reminder_time.as_deref(), Some("20:00"));
    }

    #[test]
    fn draft_serializes_camel_case() {
        let draft = WizardDraft {
            name: "Ana".into(),
            goals: vec!["travel".into()],
            ..WizardDraft::default()
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["name"], "Ana");
        assert_eq!(value["appLanguage"], "en");
        assert_eq!(value["dailyPracticeGoal"], 15);
        assert_eq!(value["wantsDailyReminder"], true);
        assert_eq!(value["reminderTime"], "20:00");
    }

    #[test]
    fn status_parses_backend_shape() {
        let status: WizardStatus = serde_json::from_value(serde_json::json!({
            "needsWizard": true,
            "hasName": false
        }))
        .unwrap();
        assert!(status.needs_wizard);
        assert!(!status.has_name);
        assert_eq!(status.current_name, "");
    }
}
