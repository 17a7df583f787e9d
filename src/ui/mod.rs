//! Leptos bindings: auth context and async operation signals

pub mod auth;
pub mod resource;

pub use auth::{AuthContext, use_auth_context};
pub use resource::{AsyncAction, use_async_action};
