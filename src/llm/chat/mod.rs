pub mod groq;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::LlmConfig;
use crate::models::chat::ChatMessage;
use self::groq::GroqChatClient;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The client could not be constructed from the given configuration.
    #[error("chat provider configuration error: {0}")]
    Configuration(String),

    /// The completion call itself failed (network, auth, non-2xx, decode).
    #[error("chat completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered, but with nothing usable.
    #[error("chat provider returned an unusable response: {0}")]
    Provider(String),
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

/// Completion provider seam. The provider is stateless between calls, so
/// `messages` carries the full ordered transcript each time.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionResponse, ChatError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ChatError> {
    let client = GroqChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
