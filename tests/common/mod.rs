//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use relay_gateway::{ApiState, Config};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, ResponseTemplate};

pub const PHONE_NUMBER_ID: &str = "1234567890";
pub const VERIFY_TOKEN: &str = "verify-me";
pub const SENDER: &str = "15551234567";

/// Router wired to mock Graph and completion servers
pub struct Harness {
    pub graph: MockServer,
    pub llm: MockServer,
    pub app: Router,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    pub async fn with_app_secret(secret: &str) -> Self {
        Self::with_env(&[("WHATSAPP_APP_SECRET", secret)]).await
    }

    pub async fn with_env(extra: &[(&str, &str)]) -> Self {
        let graph = MockServer::start().await;
        let llm = MockServer::start().await;

        let mut env: HashMap<String, String> = HashMap::from([
            ("WHATSAPP_TOKEN".to_string(), "wa-token".to_string()),
            ("PHONE_NUMBER_ID".to_string(), PHONE_NUMBER_ID.to_string()),
            ("WHATSAPP_VERIFY_TOKEN".to_string(), VERIFY_TOKEN.to_string()),
            ("GROQ_API_KEY".to_string(), "groq-key".to_string()),
            ("GROQ_MODEL".to_string(), "test-model".to_string()),
            ("WHATSAPP_API_URL".to_string(), graph.uri()),
            ("GROQ_API_URL".to_string(), llm.uri()),
            ("RELAY_HTTP_TIMEOUT_SECS".to_string(), "5".to_string()),
        ]);
        for (key, value) in extra {
            env.insert((*key).to_string(), (*value).to_string());
        }

        let config = Config::from_lookup(|key| env.get(key).cloned()).expect("test config");
        let state = ApiState::from_config(config).expect("test state");
        let app = relay_gateway::api::build_router(Arc::new(state));

        Self { graph, llm, app }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.expect("router call")
    }

    pub async fn post_webhook(&self, body: &serde_json::Value) -> Response<Body> {
        self.send(webhook_request(serde_json::to_vec(body).expect("json"), None))
            .await
    }

    /// Completion mock answering `reply` for a request whose user turn equals `prompt`
    pub async fn expect_completion(&self, prompt: &str, reply: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(UserPrompt(prompt.to_string()))
            .respond_with(completion_reply(reply))
            .expect(1)
            .mount(&self.llm)
            .await;
    }

    /// Completion mock answering `reply` when the user turn contains `fragment`
    pub async fn expect_completion_containing(&self, fragment: &str, reply: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(UserPromptContains(fragment.to_string()))
            .respond_with(completion_reply(reply))
            .expect(1)
            .mount(&self.llm)
            .await;
    }

    /// Send-message mock expecting exactly one reply with `text` to the sender
    pub async fn expect_reply(&self, text: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/{PHONE_NUMBER_ID}/messages")))
            .and(ReplyText {
                to: SENDER.to_string(),
                text: text.to_string(),
            })
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messaging_product": "whatsapp",
                "messages": [{ "id": "wamid.out" }]
            })))
            .expect(1)
            .mount(&self.graph)
            .await;
    }

    /// Media lookup and content mocks serving `content` for `media_id`
    pub async fn serve_media(&self, media_id: &str, content: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(format!("/{media_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": format!("{}/files/{media_id}", self.graph.uri()),
                "mime_type": "application/octet-stream",
                "file_size": content.len(),
                "id": media_id
            })))
            .expect(1)
            .mount(&self.graph)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/files/{media_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
            .expect(1)
            .mount(&self.graph)
            .await;
    }

    pub async fn graph_request_count(&self) -> usize {
        self.graph.received_requests().await.map_or(0, |r| r.len())
    }

    pub async fn llm_request_count(&self) -> usize {
        self.llm.received_requests().await.map_or(0, |r| r.len())
    }
}

/// Build a `POST /webhook` request with an optional signature header
pub fn webhook_request(body: Vec<u8>, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("x-hub-signature-256", signature);
    }
    builder.body(Body::from(body)).expect("request")
}

pub fn completion_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }]
    }))
}

/// Webhook envelope carrying a single message
pub fn envelope(message: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA_ID",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": { "phone_number_id": PHONE_NUMBER_ID },
                    "contacts": [{ "wa_id": SENDER, "profile": { "name": "Test" } }],
                    "messages": [message]
                }
            }]
        }]
    })
}

pub fn text_event(body: &str) -> serde_json::Value {
    envelope(serde_json::json!({
        "from": SENDER,
        "id": "wamid.in",
        "timestamp": "1700000000",
        "type": "text",
        "text": { "body": body }
    }))
}

pub fn document_event(media_id: &str, filename: &str) -> serde_json::Value {
    envelope(serde_json::json!({
        "from": SENDER,
        "id": "wamid.in",
        "timestamp": "1700000000",
        "type": "document",
        "document": {
            "id": media_id,
            "filename": filename,
            "mime_type": "application/octet-stream"
        }
    }))
}

fn json_body(request: &wiremock::Request) -> Option<serde_json::Value> {
    serde_json::from_slice(&request.body).ok()
}

/// Matches a completion request whose user turn is exactly the given prompt
pub struct UserPrompt(pub String);

impl Match for UserPrompt {
    fn matches(&self, request: &wiremock::Request) -> bool {
        json_body(request).is_some_and(|body| {
            body["messages"][1]["role"] == "user"
                && body["messages"][1]["content"] == self.0.as_str()
        })
    }
}

/// Matches a completion request whose user turn contains the given text
pub struct UserPromptContains(pub String);

impl Match for UserPromptContains {
    fn matches(&self, request: &wiremock::Request) -> bool {
        json_body(request).is_some_and(|body| {
            body["messages"][1]["content"]
                .as_str()
                .is_some_and(|content| content.contains(self.0.as_str()))
        })
    }
}

/// Matches a text send to `to` with body `text`
pub struct ReplyText {
    pub to: String,
    pub text: String,
}

impl Match for ReplyText {
    fn matches(&self, request: &wiremock::Request) -> bool {
        json_body(request).is_some_and(|body| {
            body["messaging_product"] == "whatsapp"
                && body["type"] == "text"
                && body["to"] == self.to.as_str()
                && body["text"]["body"] == self.text.as_str()
        })
    }
}
