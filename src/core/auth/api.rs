//! Auth endpoints
//!
//! - POST /v1/auth/login
//! - POST /v1/auth/register
//! - POST /v1/auth/refresh
//! - POST /v1/auth/logout
//! - GET  /v1/auth/me

use super::models::{AuthResponse, AuthUser, LoginRequest, RefreshRequest, RegisterRequest};
use crate::core::api::{ApiClient, ClientError, HttpTransport, Method, RequestOptions};

#[derive(Clone)]
pub struct AuthApi<T> {
    client: ApiClient<T>,
}

impl<T: HttpTransport> AuthApi<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub async fn login(&self, data: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.client
            .send_json(Method::Post, "/v1/auth/login", data)
            .await
    }

    pub async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.client
            .send_json(Method::Post, "/v1/auth/register", data)
            .await
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// Without a token the body is omitted and the server falls back to its
    /// own session.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthResponse, ClientError> {
        let options = refresh_body(refresh_token)?;
        self.client
            .request(Method::Post, "/v1/auth/refresh", options)
            .await
    }

    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), ClientError> {
        let options = refresh_body(refresh_token)?;
        self.client
            .request_empty(Method::Post, "/v1/auth/logout", options)
            .await
    }

    pub async fn me(&self) -> Result<AuthUser, ClientError> {
        self.client.get("/v1/auth/me").await
    }
}

fn refresh_body(refresh_token: Option<&str>) -> Result<RequestOptions, ClientError> {
    match refresh_token.filter(|t| !t.is_empty()) {
        Some(token) => RequestOptions::new().json(&RefreshRequest {
            refresh_token: token.to_string(),
        }),
        None => Ok(RequestOptions::new()),
    }
}
