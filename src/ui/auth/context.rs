//! Auth context for the component tree
//!
//! This module provides a reactive view of the [`AuthSession`]:
//! - `state`, `loading` and `error` signals views subscribe to
//! - login, register, logout and refresh actions that resync the signals
//! - route gating for dashboard pages
//!
//! The session itself is the only owner of the persisted tokens; signals are
//! read-only projections refreshed after every action.

use std::sync::Arc;

use leptos::prelude::*;

use crate::core::api::{ClientError, HttpTransport};
use crate::core::auth::{
    AuthSession, AuthState, AuthUser, Gate, RegisterRequest, Role, SessionError, SessionSnapshot,
    SessionUser,
};

/// Auth context providing authentication state and actions
pub struct AuthContext<T: 'static> {
    /// Current authentication state
    pub state: RwSignal<AuthState>,
    /// Loading state for auth operations
    pub loading: RwSignal<bool>,
    /// Error message from last operation
    pub error: RwSignal<Option<String>>,
    session: StoredValue<Arc<AuthSession<T>>>,
}

impl<T: 'static> Clone for AuthContext<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for AuthContext<T> {}

impl<T> AuthContext<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    /// Wrap an existing session; signals start from its current snapshot
    pub fn new(session: Arc<AuthSession<T>>) -> Self {
        let snapshot = session.snapshot();
        Self {
            state: RwSignal::new(snapshot.state),
            loading: RwSignal::new(snapshot.loading),
            error: RwSignal::new(snapshot.error),
            session: StoredValue::new(session),
        }
    }

    fn session(&self) -> Arc<AuthSession<T>> {
        self.session.get_value()
    }

    /// Copy the session snapshot into the signals, skipping unchanged values
    fn sync(&self) {
        let SessionSnapshot {
            state,
            loading,
            error,
        } = self.session().snapshot();

        if self.state.get_untracked() != state {
            self.state.set(state);
        }
        if self.loading.get_untracked() != loading {
            self.loading.set(loading);
        }
        if self.error.get_untracked() != error {
            self.error.set(error);
        }
    }

    /// Check if user is authenticated
    ///
    /// Expired tokens are noticed here, without a network call.
    pub fn is_authenticated(&self) -> bool {
        self.state.track();
        let authenticated = self.session().is_authenticated();
        self.sync();
        authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get() || matches!(self.state.get(), AuthState::Loading)
    }

    /// Get current user (if authenticated)
    pub fn user(&self) -> Option<SessionUser> {
        match self.state.get() {
            AuthState::Authenticated(user) if self.is_authenticated() => Some(user),
            _ => None,
        }
    }

    /// Full profile from the last `me` call
    pub fn profile(&self) -> Option<AuthUser> {
        self.state.track();
        self.session().profile()
    }

    pub fn dashboard_path(&self) -> &'static str {
        self.state.track();
        self.session().dashboard_path()
    }

    /// What a page requiring `required` should do
    pub fn gate(&self, required: Option<Role>) -> Gate {
        self.state.track();
        self.loading.track();
        let gate = self.session().gate(required);
        self.sync();
        gate
    }

    /// Clear error message
    pub fn clear_error(&self) {
        self.session().clear_error();
        self.error.set(None);
    }

    /// Restore the persisted session
    pub async fn initialize(&self) {
        self.state.set(AuthState::Loading);
        self.session().initialize().await;
        self.sync();
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, SessionError> {
        let session = self.session();
        self.loading.set(true);
        self.error.set(None);
        let result = session.login(email, password).await;
        self.sync();
        result
    }

    pub async fn register(&self, data: &RegisterRequest) -> Result<SessionUser, SessionError> {
        let session = self.session();
        self.loading.set(true);
        self.error.set(None);
        let result = session.register(data).await;
        self.sync();
        result
    }

    /// Logout the current user; local state is cleared regardless
    pub async fn logout(&self) {
        let session = self.session();
        self.loading.set(true);
        session.logout().await;
        self.sync();
    }

    pub async fn refresh_auth(&self) -> bool {
        let refreshed = self.session().refresh_auth().await;
        self.sync();
        refreshed
    }

    pub async fn refresh_user(&self) -> Result<AuthUser, ClientError> {
        let result = self.session().refresh_user().await;
        self.sync();
        result
    }
}

/// Provide a context around an already built session
pub fn provide_auth_context_with<T>(session: Arc<AuthSession<T>>) -> AuthContext<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    let ctx = AuthContext::new(session);
    provide_context(ctx);
    ctx
}

/// Get auth context from the component tree
pub fn use_auth_context<T>() -> AuthContext<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    expect_context::<AuthContext<T>>()
}

#[cfg(any(feature = "ssr", feature = "hydrate"))]
mod app {
    use super::*;
    use crate::core::api::DefaultTransport;
    use crate::core::config::ClientConfig;
    use crate::core::{BrowserStorage, SystemClock};

    /// Context type used by the application
    pub type AppAuthContext = AuthContext<DefaultTransport>;

    /// Provide auth context to the component tree
    ///
    /// Server and client both start `Loading`, so gated pages render the
    /// same placeholder until the browser restores the stored session.
    pub fn provide_auth_context() -> AppAuthContext {
        let session = AuthSession::from_parts(
            &ClientConfig::from_env(),
            DefaultTransport::default(),
            Arc::new(BrowserStorage),
            Arc::new(SystemClock),
        );
        let ctx = provide_auth_context_with(Arc::new(session));

        #[cfg(feature = "hydrate")]
        Effect::new(move |_| {
            leptos::task::spawn_local(async move {
                ctx.initialize().await;
            });
        });

        ctx
    }
}

#[cfg(any(feature = "ssr", feature = "hydrate"))]
pub use app::{AppAuthContext, provide_auth_context};
