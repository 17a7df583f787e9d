//! Scripted transport for tests
//!
//! Responses are served from per-route stubs first (matched on method and
//! URL suffix, reusable), then from a FIFO queue. Every request is recorded.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use super::error::TransportError;
use super::transport::{HttpRequest, HttpResponse, HttpTransport, Method};

type Scripted = Result<HttpResponse, TransportError>;

#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<(Method, String, Scripted)>>,
    queue: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(Ok(HttpResponse::new(status, body.to_string().into_bytes())));
    }

    pub fn push_raw(&self, status: u16, body: &[u8]) {
        self.push(Ok(HttpResponse::new(status, body.to_vec())));
    }

    pub fn push_transport_error(&self, message: &str) {
        self.push(Err(TransportError(message.to_string())));
    }

    fn push(&self, response: Scripted) {
        self.queue.lock().unwrap().push_back(response);
    }

    /// Answer every `method` request whose URL ends with `path`
    pub fn route_json(&self, method: Method, path: &str, status: u16, body: Value) {
        self.routes.lock().unwrap().push((
            method,
            path.to_string(),
            Ok(HttpResponse::new(status, body.to_string().into_bytes())),
        ));
    }

    pub fn route_transport_error(&self, method: Method, path: &str, message: &str) {
        self.routes.lock().unwrap().push((
            method,
            path.to_string(),
            Err(TransportError(message.to_string())),
        ));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let routed = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(method, path, _)| *method == request.method && request.url.ends_with(path))
            .map(|(_, _, response)| response.clone());
        if let Some(response) = routed {
            return response;
        }

        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError(format!(
                    "no scripted response for {} {}",
                    request.method, request.url
                )))
            })
    }
}
