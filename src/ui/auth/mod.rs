//! Authentication context for the Luméra frontend

mod context;

pub use context::{AuthContext, provide_auth_context_with, use_auth_context};
#[cfg(any(feature = "ssr", feature = "hydrate"))]
pub use context::{AppAuthContext, provide_auth_context};
