use async_trait::async_trait;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };

use super::{ ChatClient, ChatError, CompletionResponse };
use crate::llm::LlmConfig;
use crate::models::chat::ChatMessage;

const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_BASE_URL: &str = "https://api.groq.com";
const CHAT_COMPLETIONS_ROUTE: &str = "/openai/v1/chat/completions";

pub struct GroqChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize, Deserialize)]
struct GroqMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct GroqRequest {
    messages: Vec<GroqMessage>,
    model: String,
}

#[derive(Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
}

#[derive(Deserialize)]
struct GroqChoice {
    message: GroqMessage,
}

impl GroqChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ChatError> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| ChatError::Configuration(format!("Invalid API key format: {}", e)))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ChatError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
        })
    }

    /// Credential resolution is eager: an explicit key from the config wins,
    /// otherwise the `GROQ_API_KEY` environment variable; with neither set
    /// construction fails instead of deferring the error to the first call.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ChatError> {
        let api_key = config.api_key
            .clone()
            .or_else(|| std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()))
            .ok_or_else(|| ChatError::Configuration("Groq API key is required".to_string()))?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
        )
    }
}

#[async_trait]
impl ChatClient for GroqChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionResponse, ChatError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), CHAT_COMPLETIONS_ROUTE);

        let req = GroqRequest {
            messages: messages
                .iter()
                .map(|m| GroqMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                })
                .collect(),
            model: self.model.clone(),
        };

        let resp = self.http.post(&url)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<GroqResponse>()
            .await?;

        let content = resp.choices.first()
            .ok_or_else(|| ChatError::Provider("no completion choices returned".to_string()))?
            .message.content.clone();

        Ok(CompletionResponse { response: content })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
