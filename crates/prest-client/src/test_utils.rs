use std::sync::{Arc, Mutex};

use crate::{
    error::{PrestError, Result},
    transport::{HttpRequest, HttpResponse, Transport},
};

/// Transport that records every request and replays one canned outcome.
pub struct StubTransport {
    outcome: std::result::Result<HttpResponse, String>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn status(status: u16, status_text: &str, body: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(HttpResponse {
                status,
                status_text: status_text.to_string(),
                body: body.to_string(),
            }),
            requests: Mutex::new(vec![]),
        })
    }

    pub fn ok(body: &str) -> Arc<Self> {
        Self::status(200, "OK", body)
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.to_string()),
            requests: Mutex::new(vec![]),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcome.clone().map_err(PrestError::request_failed)
    }
}
