//! Generic JSON request path shared by the domain clients
//!
//! Every backend call goes through [`ApiClient::request`] (or one of its
//! thin helpers):
//! - a JSON content type header is always sent, caller headers win
//! - the stored access token, if any, is attached as a bearer token
//! - non-2xx responses become [`ClientError::Api`], decoded from the body or
//!   synthesized when the body is not an error document
//! - 2xx bodies are decoded into the caller's type; a shape mismatch is
//!   [`ClientError::Decode`]
//! - transport failures pass through untouched as [`ClientError::Transport`]
//!
//! Binary downloads take the separate [`ApiClient::request_bytes`] path.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, ClientError};
use super::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::core::auth::TokenStore;
use crate::core::config::ClientConfig;

/// Ordered query parameters
///
/// Optional parameters that are unset or empty are never added, so absent
/// filters do not show up as `key=` in the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard `page`/`size` pair
    pub fn paged(page: u32, size: u32) -> Self {
        Self::new().set("page", page).set("size", size)
    }

    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.0.retain(|(k, _)| k != key);
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    /// Add `key` only when `value` is present and not blank
    pub fn set_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value.map(|v| v.to_string()) {
            Some(v) if !v.trim().is_empty() => self.set(key, v),
            _ => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.0
    }
}

/// Per-call options for [`ApiClient::request`]
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    query: QueryParams,
    body: Option<String>,
    headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Serialize `body` as the JSON request body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        let json = serde_json::to_string(body).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.body = Some(json);
        Ok(self)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

/// Low-level REST client
#[derive(Clone)]
pub struct ApiClient<T> {
    base_url: String,
    transport: T,
    tokens: Option<TokenStore>,
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            base_url: config.api_url.clone(),
            transport,
            tokens: None,
        }
    }

    /// Attach the stored access token to every request
    pub fn with_token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn token_store(&self) -> Option<&TokenStore> {
        self.tokens.as_ref()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn attach_bearer(&self, request: &mut HttpRequest) {
        if let Some(token) = self.tokens.as_ref().and_then(TokenStore::get_access_token) {
            request.set_header("Authorization", format!("Bearer {}", token));
        }
    }

    /// Send and reject non-2xx responses with a structured error
    async fn send_checked(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, ClientError> {
        let mut request = HttpRequest::new(method, self.url(endpoint));
        request.query = options.query.into_pairs();
        request.set_header("Content-Type", "application/json");
        self.attach_bearer(&mut request);
        for (name, value) in options.headers {
            request.set_header(&name, value);
        }
        request.body = options.body;

        tracing::debug!(%method, endpoint, "api request");
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let error = ApiError::from_body(response.status, &response.body);
            tracing::warn!(
                %method,
                endpoint,
                status = error.status,
                error = %error.error,
                "api request failed"
            );
            return Err(ClientError::Api(error));
        }

        Ok(response)
    }

    /// Send a request and decode the JSON response body as `R`
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let response = self.send_checked(method, endpoint, options).await?;
        serde_json::from_slice(&response.body).map_err(|e| ClientError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    /// Send a request whose response body is irrelevant
    pub async fn request_empty(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<(), ClientError> {
        self.send_checked(method, endpoint, options).await.map(|_| ())
    }

    pub async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ClientError> {
        self.request(Method::Get, endpoint, RequestOptions::new()).await
    }

    pub async fn get_with_query<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: QueryParams,
    ) -> Result<R, ClientError> {
        self.request(Method::Get, endpoint, RequestOptions::new().query(query))
            .await
    }

    /// Send `body` as JSON with the given method and decode the response
    pub async fn send_json<B, R>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(method, endpoint, RequestOptions::new().json(body)?)
            .await
    }

    /// Raw binary download
    ///
    /// Does not use the JSON error contract: any non-2xx status is
    /// [`ClientError::Download`] and the body is discarded.
    pub async fn request_bytes(&self, endpoint: &str) -> Result<Vec<u8>, ClientError> {
        let mut request = HttpRequest::new(Method::Get, self.url(endpoint));
        self.attach_bearer(&mut request);

        tracing::debug!(endpoint, "download request");
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            tracing::warn!(endpoint, status = response.status, "download failed");
            return Err(ClientError::Download {
                status: response.status,
            });
        }

        Ok(response.body)
    }
}
