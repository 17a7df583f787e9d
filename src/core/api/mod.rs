//! REST clients for the Luméra backend
//!
//! [`ApiClient`] owns the uniform request/response contract; the domain
//! clients ([`ClassesApi`], [`SettingsApi`] and the auth client in
//! `core::auth`) only build paths, queries and bodies.

pub mod classes;
pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod mock;
pub mod models;
pub mod settings;
pub mod transport;

pub use classes::ClassesApi;
pub use client::{ApiClient, QueryParams, RequestOptions};
pub use error::{ApiError, ClientError, TransportError};
pub use models::*;
pub use settings::SettingsApi;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};

#[cfg(feature = "hydrate")]
pub use transport::FetchTransport;
#[cfg(feature = "ssr")]
pub use transport::ReqwestTransport;
#[cfg(any(feature = "ssr", feature = "hydrate"))]
pub use transport::DefaultTransport;
