use async_trait::async_trait;
use image_analyzer::{BoxError, HttpRequest, HttpResponse, Transport};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const API_KEY: &str = "test-api-key";

/// A transport that replays scripted responses and records every request it sees.
#[derive(Clone, Default)]
pub struct StubTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, String>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

#[allow(dead_code)]
impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: HttpResponse) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn respond_json(self, status: u16, body: Value) -> Self {
        self.respond(HttpResponse::new(status, body.to_string()))
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Body of the nth recorded request, decoded as JSON.
    pub fn request_json(&self, index: usize) -> Value {
        let requests = self.requests();
        let body = requests[index]
            .body
            .as_ref()
            .expect("request should have a body");
        serde_json::from_slice(body).expect("request body should be JSON")
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        self.requests.lock().unwrap().push(request);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(message.into()),
            None => Err("no scripted response left".into()),
        }
    }
}

/// A successful Gemini envelope whose first candidate carries `text`.
#[allow(dead_code)]
pub fn candidate_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[allow(dead_code)]
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0x0d];
