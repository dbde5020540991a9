// src/services/backend.rs
use std::sync::LazyLock;

use async_trait::async_trait;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::message::{ChatRequest, ChatResponse, DeleteSessionResponse, ReactRequest};
use crate::services::reaction::Reaction;

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// The chatbot server, seen from the client.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `POST /chat`
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// `POST /react`. Callers treat this as best effort.
    async fn react(&self, reaction: Reaction) -> Result<()>;

    /// `POST /delete_session/<id>`
    async fn delete_session(&self, session_id: &str) -> Result<DeleteSessionResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    csrf_token: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, csrf_token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(client, base_url, csrf_token))
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            csrf_token: csrf_token.into(),
        }
    }

    /// Build a backend from config. Without a configured token, the chat page
    /// is fetched once and its `csrf_token` field is used; the cookie store
    /// keeps the server session the token belongs to.
    pub async fn bootstrap(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        if let Some(token) = &config.csrf_token {
            return Ok(Self::with_client(client, &config.base_url, token.clone()));
        }

        let page = client
            .get(format!("{}/", config.base_url.trim_end_matches('/')))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let token = match extract_csrf_token(&page) {
            Some(token) => token,
            None => {
                warn!("chat page has no csrf_token field; sending requests without a token");
                String::new()
            }
        };
        Ok(Self::with_client(client, &config.base_url, token))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        debug!(session_id = %request.session_id, "POST /chat");
        let response = self
            .client
            .post(self.url("/chat"))
            .header(CSRF_HEADER, &self.csrf_token)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        parse_chat_body(status, &body)
    }

    async fn react(&self, reaction: Reaction) -> Result<()> {
        debug!(reaction = reaction.as_str(), "POST /react");
        self.client
            .post(self.url("/react"))
            .header(CSRF_HEADER, &self.csrf_token)
            .json(&ReactRequest { reaction })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> Result<DeleteSessionResponse> {
        debug!(%session_id, "POST /delete_session");
        let response = self
            .client
            .post(self.url(&format!("/delete_session/{session_id}")))
            .header(CSRF_HEADER, &self.csrf_token)
            .send()
            .await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// The body is read whatever the status: a 401 still carries a `reply`,
/// while a 500 carries `{"error": ...}`.
pub(crate) fn parse_chat_body(status: StatusCode, body: &str) -> Result<ChatResponse> {
    let value: Value = serde_json::from_str(body)?;
    if value.get("reply").is_some() {
        return Ok(serde_json::from_value(value)?);
    }
    match value.get("error").and_then(Value::as_str) {
        Some(error) => Err(ClientError::Backend(error.to_string())),
        None => Err(ClientError::Backend(format!("response without reply (HTTP {status})"))),
    }
}

static CSRF_INPUT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("input#csrf_token, input[name=csrf_token]").expect("valid selector")
});

/// Find the hidden `csrf_token` input in a rendered page.
pub fn extract_csrf_token(page: &str) -> Option<String> {
    Html::parse_document(page)
        .select(&CSRF_INPUT)
        .find_map(|input| input.value().attr("value"))
        .map(str::to_string)
}
