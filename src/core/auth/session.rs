//! Auth session controller
//!
//! [`AuthSession`] is the single owner of "who is signed in". It combines the
//! [`AuthApi`] with the [`TokenStore`] and keeps the in-memory state views
//! read:
//!
//! ```text
//! Loading ──initialize──▶ Authenticated(user)
//!    │                        │  logout / expiry detected
//!    └──────────────────▶ Unauthenticated
//! ```
//!
//! Expiry is detected lazily: [`AuthSession::is_authenticated`] consults the
//! token store, so an expired session flips to `Unauthenticated` without any
//! network call.

use std::sync::{Arc, Mutex, MutexGuard};

use super::api::AuthApi;
use super::models::{AuthResponse, AuthUser, LOGIN_PATH, LoginRequest, RegisterRequest, Role, SessionUser};
use super::token_store::TokenStore;
use crate::core::api::{ApiClient, ClientError, HttpTransport};
use crate::core::clock::Clock;
use crate::core::config::ClientConfig;
use crate::core::storage::{KeyValueStore, StorageError};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";

/// Authentication state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Session not restored yet
    #[default]
    Loading,
    Unauthenticated,
    Authenticated(SessionUser),
}

/// What a protected page should do right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Session is still loading; render a spinner
    Wait,
    Redirect(&'static str),
    Render,
}

/// Errors from session operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Banner text, preferring field validation messages
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            SessionError::Api(err) => err.display_message(fallback),
            SessionError::Storage(err) => err.to_string(),
        }
    }
}

/// Read-only projection handed to views
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub state: AuthState,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct Inner {
    state: AuthState,
    loading: bool,
    error: Option<String>,
    profile: Option<AuthUser>,
}

pub struct AuthSession<T> {
    api: AuthApi<T>,
    tokens: TokenStore,
    inner: Mutex<Inner>,
}

impl<T: HttpTransport> AuthSession<T> {
    /// `api` should share `tokens` so requests carry the bearer token
    pub fn new(api: AuthApi<T>, tokens: TokenStore) -> Self {
        Self {
            api,
            tokens,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Wire a session from its parts
    pub fn from_parts(
        config: &ClientConfig,
        transport: T,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = TokenStore::new(storage, clock);
        let client = ApiClient::new(config, transport).with_token_store(tokens.clone());
        Self::new(AuthApi::new(client), tokens)
    }

    pub fn api(&self) -> &AuthApi<T> {
        &self.api
    }

    pub fn client(&self) -> &ApiClient<T> {
        self.api.client()
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_authenticated(&self, user: SessionUser, profile: Option<AuthUser>) {
        let mut inner = self.inner();
        inner.state = AuthState::Authenticated(user);
        inner.profile = profile;
    }

    fn set_unauthenticated(&self) {
        let mut inner = self.inner();
        inner.state = AuthState::Unauthenticated;
        inner.profile = None;
    }

    fn clear_local(&self) {
        if let Err(e) = self.tokens.clear_auth() {
            tracing::warn!(error = %e, "failed to clear stored session");
        }
        self.set_unauthenticated();
    }

    /// A failed sign-in with nothing stored settles a pending `Loading`
    fn settle_failed_attempt(&self) {
        if self.tokens.load().is_some() {
            return;
        }
        let mut inner = self.inner();
        if matches!(inner.state, AuthState::Loading) {
            inner.state = AuthState::Unauthenticated;
        }
    }

    fn begin(&self) {
        let mut inner = self.inner();
        inner.loading = true;
        inner.error = None;
    }

    fn finish(&self, error: Option<String>) {
        let mut inner = self.inner();
        inner.loading = false;
        inner.error = error;
    }

    // ========================================================================
    // Restore
    // ========================================================================

    /// Restore the session on page load
    ///
    /// A live access token is verified with `me`; an expired one is
    /// refreshed when a refresh token is stored; anything else clears.
    pub async fn initialize(&self) {
        self.inner().state = AuthState::Loading;

        let Some(stored) = self.tokens.load() else {
            self.set_unauthenticated();
            return;
        };

        if self.tokens.is_authenticated() {
            match self.api.me().await {
                Ok(profile) => {
                    self.adopt_profile(profile);
                    tracing::info!(role = %stored.user.role, "session restored");
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored session rejected");
                }
            }
        }

        if stored.refresh_token.is_empty() || !self.refresh_auth().await {
            self.clear_local();
        }
    }

    // ========================================================================
    // Login / Register / Logout
    // ========================================================================

    /// Sign in; on failure the display message is kept in [`Self::error`]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, SessionError> {
        self.begin();
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let result = match self.api.login(&request).await {
            Ok(response) => self.accept(&response).map(|()| response.user),
            Err(e) => Err(e.into()),
        };

        match &result {
            Ok(user) => {
                tracing::info!(role = %user.role, "logged in");
                self.finish(None);
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                self.settle_failed_attempt();
                self.finish(Some(e.display_message(LOGIN_FAILED)));
            }
        }
        result
    }

    /// Create an account and sign in, then load the full profile
    pub async fn register(&self, data: &RegisterRequest) -> Result<SessionUser, SessionError> {
        self.begin();

        let result = match self.api.register(data).await {
            Ok(response) => self.accept(&response).map(|()| response.user),
            Err(e) => Err(e.into()),
        };

        let user = match result {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                self.settle_failed_attempt();
                self.finish(Some(e.display_message(REGISTRATION_FAILED)));
                return Err(e);
            }
        };

        let user = match self.api.me().await {
            Ok(profile) => self.adopt_profile(profile),
            Err(e) => {
                tracing::warn!(error = %e, "profile fetch after registration failed");
                user
            }
        };
        self.finish(None);

        tracing::info!(role = %user.role, "registered");
        Ok(user)
    }

    fn accept(&self, response: &AuthResponse) -> Result<(), SessionError> {
        self.tokens.save_auth(response)?;
        self.set_authenticated(response.user.clone(), None);
        Ok(())
    }

    /// Sign out
    ///
    /// Local state is always cleared; the server call is best effort.
    pub async fn logout(&self) {
        self.inner().loading = true;

        let refresh_token = self.tokens.get_refresh_token();
        if let Err(e) = self.api.logout(refresh_token.as_deref()).await {
            tracing::warn!(error = %e, "server logout failed");
        }

        self.clear_local();
        self.finish(None);
        tracing::info!("logged out");
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Refresh the token pair and reload the profile
    ///
    /// Returns `false` and signs out when either call fails.
    pub async fn refresh_auth(&self) -> bool {
        let refresh_token = self.tokens.get_refresh_token();

        let result = async {
            let response = self.api.refresh(refresh_token.as_deref()).await?;
            self.accept(&response)?;
            let profile = self.api.me().await?;
            self.adopt_profile(profile);
            Ok::<(), SessionError>(())
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!("session refreshed");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                self.clear_local();
                false
            }
        }
    }

    /// Reload the full profile and update the stored user snapshot
    pub async fn refresh_user(&self) -> Result<AuthUser, ClientError> {
        let profile = self.api.me().await?;
        self.adopt_profile(profile.clone());
        Ok(profile)
    }

    fn adopt_profile(&self, profile: AuthUser) -> SessionUser {
        let mut user = SessionUser::from(&profile);
        if let Some(stored) = self.tokens.get_user() {
            user.avatar_url = user.avatar_url.or(stored.avatar_url);
        }
        if let Err(e) = self.tokens.update_user(&user) {
            tracing::warn!(error = %e, "failed to persist user snapshot");
        }
        self.set_authenticated(user.clone(), Some(profile));
        user
    }

    // ========================================================================
    // Projections
    // ========================================================================

    pub fn clear_error(&self) {
        self.inner().error = None;
    }

    pub fn error(&self) -> Option<String> {
        self.inner().error.clone()
    }

    /// True while restoring or while an auth operation is in flight
    pub fn is_loading(&self) -> bool {
        let inner = self.inner();
        inner.loading || inner.state == AuthState::Loading
    }

    /// True when signed in with an unexpired access token
    ///
    /// Detects expiry and moves to `Unauthenticated` on the spot.
    pub fn is_authenticated(&self) -> bool {
        let mut inner = self.inner();
        if !matches!(inner.state, AuthState::Authenticated(_)) {
            return false;
        }
        if self.tokens.is_authenticated() {
            return true;
        }
        tracing::info!("session expired");
        inner.state = AuthState::Unauthenticated;
        inner.profile = None;
        false
    }

    pub fn state(&self) -> AuthState {
        self.is_authenticated();
        self.inner().state.clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        match self.state() {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Full profile from the last successful `me` call
    pub fn profile(&self) -> Option<AuthUser> {
        if !self.is_authenticated() {
            return None;
        }
        self.inner().profile.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        let inner = self.inner();
        SessionSnapshot {
            state,
            loading: inner.loading,
            error: inner.error.clone(),
        }
    }

    /// Dashboard for the current user, `/student` when signed out
    pub fn dashboard_path(&self) -> &'static str {
        self.user()
            .map(|u| u.role)
            .unwrap_or(Role::Student)
            .dashboard_path()
    }

    /// Decide how a dashboard page guarded by `required` should render
    pub fn gate(&self, required: Option<Role>) -> Gate {
        if self.is_loading() {
            return Gate::Wait;
        }
        match (self.user(), required) {
            (None, _) => Gate::Redirect(LOGIN_PATH),
            (Some(user), Some(role)) if user.role != role => {
                Gate::Redirect(user.role.dashboard_path())
            }
            (Some(_), _) => Gate::Render,
        }
    }
}
