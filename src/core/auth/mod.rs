//! Authentication for the Luméra client
//!
//! This module provides:
//! - Request/response shapes and roles for the `/v1/auth` endpoints
//! - The persisted session record ([`TokenStore`])
//! - The session controller views read from ([`AuthSession`])

pub mod api;
pub mod models;
pub mod session;
pub mod token_store;

pub use api::AuthApi;
pub use models::{
    AuthResponse, AuthUser, LOGIN_PATH, LoginRequest, RefreshRequest, RegisterRequest, Role,
    SessionUser, dashboard_path,
};
pub use session::{AuthSession, AuthState, Gate, SessionError, SessionSnapshot};
pub use token_store::{AUTH_RECORD_KEY, StoredAuth, TokenStore};
