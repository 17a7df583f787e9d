//! Signal-backed async operation state for pages
//!
//! Wraps [`run_tracked`] so a page gets one `RwSignal<AsyncState<T>>` for
//! its loading spinner, error banner and data.

use std::future::Future;

use leptos::prelude::*;

use crate::core::api::ClientError;
use crate::core::async_op::{AsyncState, run_tracked};

pub struct AsyncAction<T: Send + Sync + 'static> {
    pub state: RwSignal<AsyncState<T>>,
}

impl<T: Send + Sync + 'static> Clone for AsyncAction<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for AsyncAction<T> {}

impl<T> AsyncAction<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(AsyncState::Idle),
        }
    }

    /// Run `operation`, mirroring its progress into `state`
    pub async fn run<F>(&self, fallback: &str, operation: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let state = self.state;
        run_tracked(move |s| state.set(s), fallback, operation).await
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(AsyncState::is_loading)
    }

    pub fn value(&self) -> Option<T> {
        self.state.with(|s| s.value().cloned())
    }

    pub fn error(&self) -> Option<String> {
        self.state.with(|s| s.error().map(str::to_string))
    }

    pub fn reset(&self) {
        self.state.set(AsyncState::Idle);
    }
}

impl<T> Default for AsyncAction<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Create an [`AsyncAction`] owned by the current reactive scope
pub fn use_async_action<T>() -> AsyncAction<T>
where
    T: Clone + Send + Sync + 'static,
{
    AsyncAction::new()
}
