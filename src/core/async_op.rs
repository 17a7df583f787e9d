//! Loading / error / result tracking for one async operation
//!
//! Pages that fetch data all follow the same shape: flag loading, await the
//! call, keep the error text for a banner, clear loading. [`run_tracked`]
//! does that once; the Leptos layer wraps it in signals.

use std::future::Future;

use crate::core::api::ClientError;

/// State of an operation whose result a view renders
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AsyncState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    /// Display text for an inline banner
    Failed(String),
}

impl<T> AsyncState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, AsyncState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            AsyncState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AsyncState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AsyncState<U> {
        match self {
            AsyncState::Idle => AsyncState::Idle,
            AsyncState::Loading => AsyncState::Loading,
            AsyncState::Ready(value) => AsyncState::Ready(f(value)),
            AsyncState::Failed(message) => AsyncState::Failed(message),
        }
    }
}

/// Run `operation`, reporting each transition through `set`
///
/// `fallback` is shown when the error carries no server message.
pub async fn run_tracked<T, F>(
    mut set: impl FnMut(AsyncState<T>),
    fallback: &str,
    operation: F,
) -> Result<T, ClientError>
where
    T: Clone,
    F: Future<Output = Result<T, ClientError>>,
{
    set(AsyncState::Loading);
    let result = operation.await;
    match &result {
        Ok(value) => set(AsyncState::Ready(value.clone())),
        Err(e) => set(AsyncState::Failed(e.display_message(fallback))),
    }
    result
}

/// Await an auxiliary call whose failure must not fail the caller
pub async fn optional<T>(operation: impl Future<Output = Result<T, ClientError>>) -> Option<T> {
    match operation.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "optional request failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::{ApiError, TransportError};

    #[tokio::test]
    async fn test_run_tracked_success_transitions() {
        let mut seen = Vec::new();

        let result = run_tracked(|s| seen.push(s), "Failed to load", async { Ok(7) }).await;

        assert_eq!(result, Ok(7));
        assert_eq!(seen, vec![AsyncState::Loading, AsyncState::Ready(7)]);
    }

    #[tokio::test]
    async fn test_run_tracked_failure_keeps_server_message() {
        let mut last = AsyncState::Idle;
        let error = ApiError {
            status: 404,
            error: "Not Found".to_string(),
            message: "Class not found".to_string(),
            validation_errors: None,
        };

        let result: Result<u8, _> =
            run_tracked(|s| last = s, "Failed to load", async { Err(error.into()) }).await;

        assert!(result.is_err());
        assert_eq!(last.error(), Some("Class not found"));
    }

    #[tokio::test]
    async fn test_run_tracked_transport_failure_uses_fallback() {
        let mut last = AsyncState::Idle;

        let _ = run_tracked(|s| last = s, "Failed to load classes", async {
            Err::<u8, _>(ClientError::Transport(TransportError("offline".to_string())))
        })
        .await;

        assert_eq!(last, AsyncState::Failed("Failed to load classes".to_string()));
        assert!(!last.is_loading());
    }

    #[tokio::test]
    async fn test_optional_swallows_errors() {
        let ok = optional(async { Ok::<_, ClientError>(3) }).await;
        let failed = optional(async {
            Err::<u8, _>(ClientError::Transport(TransportError("offline".to_string())))
        })
        .await;

        assert_eq!(ok, Some(3));
        assert_eq!(failed, None);
    }

    #[test]
    fn test_map_preserves_variant() {
        assert_eq!(AsyncState::Ready(2).map(|v| v * 10), AsyncState::Ready(20));
        assert_eq!(
            AsyncState::<u8>::Failed("x".to_string()).map(|v| v + 1),
            AsyncState::Failed("x".to_string())
        );
        assert_eq!(AsyncState::<u8>::Loading.map(|v| v + 1), AsyncState::Loading);
    }
}
