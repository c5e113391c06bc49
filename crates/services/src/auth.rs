use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lingo_core::model::LessonLevel;

use crate::api::ApiClient;
use crate::error::{AuthError, TokenStoreError};

//
// ─── TOKEN STORE ───────────────────────────────────────────────────────────────
//

/// Persistence seam for the auth token.
///
/// The platform shell provides a durable implementation (keychain, secure
/// prefs); `InMemoryTokenStore` serves tests and prototyping.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns `TokenStoreError` if the backing store cannot be read.
    async fn load(&self) -> Result<Option<String>, TokenStoreError>;

    /// Persist the token.
    ///
    /// # Errors
    ///
    /// Returns `TokenStoreError` if the token cannot be written.
    async fn save(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Remove any persisted token.
    ///
    /// # Errors
    ///
    /// Returns `TokenStoreError` if the token cannot be removed.
    async fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Simple in-memory token store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    token: Arc<Mutex<Option<String>>>,
}

impl InMemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, TokenStoreError> {
        let guard = self
            .token
            .lock()
            .map_err(|e| TokenStoreError::Backend(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| TokenStoreError::Backend(e.to_string()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| TokenStoreError::Backend(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

//
// ─── AUTH SESSION ──────────────────────────────────────────────────────────────
//

/// Explicitly constructed session context holding the auth token.
///
/// Passed to the API client and screens instead of living in an ambient
/// global, so everything downstream stays testable without process-wide
/// state. Lifecycle: `hydrate` once at startup, `sign_in` after login,
/// `sign_out` on logout.
#[derive(Clone)]
pub struct AuthSession {
    token: Arc<Mutex<Option<String>>>,
    store: Arc<dyn TokenStore>,
}

impl AuthSession {
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            token: Arc::new(Mutex::new(None)),
            store,
        }
    }

    /// Session backed by an in-memory store, for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryTokenStore::new()))
    }

    /// Restore a persisted token at process start.
    ///
    /// Returns whether a session was restored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the backing store cannot be read.
    pub async fn hydrate(&self) -> Result<bool, AuthError> {
        let persisted = self.store.load().await?;
        let restored = persisted.is_some();
        self.set_local(persisted);
        Ok(restored)
    }

    /// Store a fresh token, in memory and in the backing store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the token cannot be persisted.
    pub async fn sign_in(&self, token: impl Into<String>) -> Result<(), AuthError> {
        let token = token.into();
        self.store.save(&token).await?;
        self.set_local(Some(token));
        Ok(())
    }

    /// Drop the token everywhere.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the persisted token cannot be removed.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.store.clear().await?;
        self.set_local(None);
        Ok(())
    }

    /// Current token, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Drop the in-memory token without touching the store. Used when the
    /// backend reports the token is no longer valid.
    pub(crate) fn clear_local(&self) {
        self.set_local(None);
    }

    fn set_local(&self, value: Option<String>) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = value;
        }
    }
}

//
// ─── PROFILE & AUTH CLIENT ─────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Premium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub plan: Plan,
    pub level: LessonLevel,
    #[serde(default)]
    pub streak: u32,
}

/// Fields the user may change on their profile.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LessonLevel>,
}

/// Client for the `/auth/*` endpoints. Stores returned tokens through the
/// injected `AuthSession`.
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns `AuthError::Api` when the request fails and `AuthError::Store`
    /// when the returned token cannot be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let payload: AuthPayload = self
            .api
            .post("/auth/login", &Credentials { email, password })
            .await?;
        self.api.auth().sign_in(payload.token).await?;
        Ok(payload.user)
    }

    /// # Errors
    ///
    /// Returns `AuthError::Api` when the request fails and `AuthError::Store`
    /// when the returned token cannot be persisted.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserProfile, AuthError> {
        let payload: AuthPayload = self
            .api
            .post(
                "/auth/register",
                &Registration {
                    email,
                    password,
                    name,
                },
            )
            .await?;
        self.api.auth().sign_in(payload.token).await?;
        Ok(payload.user)
    }

    /// # Errors
    ///
    /// Returns `AuthError::Api` when the request fails. An `Unauthorized`
    /// failure means the hydrated token was stale.
    pub async fn profile(&self) -> Result<UserProfile, AuthError> {
        let payload: ProfilePayload = self.api.get("/auth/profile").await?;
        Ok(payload.user)
    }

    /// # Errors
    ///
    /// Returns `AuthError::Api` when the request fails.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, AuthError> {
        let payload: ProfilePayload = self.api.put("/auth/profile", update).await?;
        Ok(payload.user)
    }

    /// Drop the session. JWT auth needs no server endpoint for this.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the persisted token cannot be removed.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.api.auth().sign_out().await
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct Registration<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Deserialize)]
struct AuthPayload {
    user: UserProfile,
    token: String,
}

#[derive(Deserialize)]
struct ProfilePayload {
    user: UserProfile,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
