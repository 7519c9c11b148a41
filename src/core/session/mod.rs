//! Remote chat sessions.
//!
//! A [`ChatSession`] is the opaque handle the conversation talks to. It owns
//! whatever turn history the remote side needs, so callers only ever hand it
//! the newest user utterance. [`GeminiSessionFactory`] is the production
//! factory; tests substitute their own implementations of both traits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::{
    summarize_error_body, Content, GenerateContentRequest, GenerateContentResponse, Tool,
    ROLE_MODEL,
};
use crate::core::constants::{DEFAULT_BASE_URL, DEFAULT_MODEL, SYSTEM_INSTRUCTION};
use crate::core::error::{ConfigurationError, ExchangeError};
use crate::utils::auth::add_auth_headers;
use crate::utils::url::generate_content_url;

#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Send one user turn and wait for the complete reply.
    async fn send_message(&self, message: &str) -> Result<GenerateContentResponse, ExchangeError>;
}

pub trait SessionFactory {
    fn create_session(&self) -> Result<Arc<dyn ChatSession>, ConfigurationError>;
}

/// Everything needed to open a session. `api_key` stays optional here so the
/// missing-credential case is reported by the factory, once, at mount.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

pub struct GeminiSessionFactory {
    settings: SessionSettings,
}

impl GeminiSessionFactory {
    pub fn new(settings: SessionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }
}

impl SessionFactory for GeminiSessionFactory {
    fn create_session(&self) -> Result<Arc<dyn ChatSession>, ConfigurationError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigurationError::MissingCredential)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ConfigurationError::Transport)?;

        let endpoint = generate_content_url(&self.settings.base_url, &self.settings.model);
        info!(model = %self.settings.model, "chat session created");

        Ok(Arc::new(GeminiChat::new(
            client,
            endpoint,
            api_key.to_string(),
            SYSTEM_INSTRUCTION,
        )))
    }
}

/// Session backed by the Gemini `generateContent` endpoint.
///
/// The REST API is stateless, so the handle keeps the transcript itself and
/// replays it on every call. A turn pair is recorded only after the model
/// answered with content; failed calls leave the history untouched.
pub struct GeminiChat {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    system_instruction: Content,
    tools: Vec<Tool>,
    history: Mutex<Vec<Content>>,
}

impl GeminiChat {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        system_instruction: &str,
    ) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            system_instruction: Content::system(system_instruction),
            tools: vec![Tool::google_search()],
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }
}

#[async_trait]
impl ChatSession for GeminiChat {
    async fn send_message(&self, message: &str) -> Result<GenerateContentResponse, ExchangeError> {
        // Held across the request; callers never overlap exchanges.
        let mut history = self.history.lock().await;

        let user_turn = Content::user(message);
        let mut contents = history.clone();
        contents.push(user_turn.clone());

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
            tools: self.tools.clone(),
        };

        debug!(
            endpoint = %self.endpoint,
            turns = request.contents.len(),
            "sending generateContent request"
        );

        let http_request = add_auth_headers(
            self.client.post(&self.endpoint).json(&request),
            &self.api_key,
        );
        let response = http_request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ExchangeError::api(
                Some(status.as_u16()),
                summarize_error_body(&body),
            ));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| ExchangeError::malformed(format!("invalid JSON body: {err}")))?;

        // Only a reply with text completes a turn.
        if let Some(content) = parsed
            .first_candidate()
            .and_then(|candidate| candidate.content.clone())
            .filter(|content| content.joined_text().is_some())
        {
            history.push(user_turn);
            history.push(Content {
                role: Some(ROLE_MODEL.to_string()),
                ..content
            });
        }

        debug!(status = status.as_u16(), "generateContent request completed");
        Ok(parsed)
    }
}
