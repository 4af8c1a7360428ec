//! Scripted `Transport` for exercising the client without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cipherguard_core::{ApiError, Client, ClientConfig, HttpRequest, HttpResponse, Transport};

pub const BASE_URL: &str = "http://localhost:3000";

/// Records every request and answers from a queue of canned replies.
/// With an empty queue the call never completes.
#[derive(Default)]
pub struct ScriptedTransport {
    requests: Mutex<Vec<HttpRequest>>,
    replies: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
}

impl ScriptedTransport {
    pub fn reply(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
    }

    pub fn reply_ok(&self, body: serde_json::Value) {
        let envelope = serde_json::json!({
            "header": {"status": "success", "code": 200, "message": "The operation was successful."},
            "body": body,
        });
        self.reply(200, &envelope.to_string());
    }

    pub fn fail(&self, err: ApiError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests()
            .pop()
            .expect("expected at least one request")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply,
            None => std::future::pending().await,
        }
    }
}

pub fn scripted_client() -> (Client<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::default());
    let config = ClientConfig::new(BASE_URL).unwrap();
    (Client::with_transport(config, transport.clone()), transport)
}
