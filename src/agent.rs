use crate::cli::Args;
use crate::history::{
    build_message_context,
    format_history_summary,
    initialize_history_store,
    HistoryStore,
};
use crate::llm::LlmConfig;
use crate::llm::chat::{ new_client as new_chat_client, ChatClient };
use crate::models::chat::Exchange;

use log::info;
use std::error::Error;
use std::sync::Arc;

/// Result of one completed chat turn. `history_count` is the post-append
/// exchange count, which the HTTP layer reports under two field names.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub response: String,
    pub history_count: usize,
}

/// Composition root for the chat flow: owns the completion client and the
/// history store, and sequences context building, completion, and recording.
pub struct ChatAgent {
    chat_client: Arc<dyn ChatClient>,
    history_store: Arc<dyn HistoryStore>,
}

impl ChatAgent {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let chat_api_key = if !args.chat_api_key.is_empty() {
            Some(args.chat_api_key.clone())
        } else {
            None
        };
        let chat_config = LlmConfig {
            api_key: chat_api_key,
            completion_model: Some(args.chat_model.clone()),
            base_url: args.chat_base_url.clone(),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Model={}, BaseURL={:?}",
            chat_client.get_model(),
            chat_client.get_base_url().as_deref().unwrap_or("adapter default")
        );

        let history_store = initialize_history_store(args)?;

        Ok(Self {
            chat_client,
            history_store,
        })
    }

    pub fn with_parts(
        chat_client: Arc<dyn ChatClient>,
        history_store: Arc<dyn HistoryStore>
    ) -> Self {
        Self {
            chat_client,
            history_store,
        }
    }

    pub fn model(&self) -> String {
        self.chat_client.get_model()
    }

    /// One chat turn: replay the stored transcript plus the new message to
    /// the provider, then record the exchange. A failed completion leaves
    /// the history untouched.
    pub async fn chat(&self, message: &str) -> Result<ChatTurn, Box<dyn Error + Send + Sync>> {
        let history = self.history_store.all_exchanges().await?;
        let messages = build_message_context(&history, message);

        let completion = self.chat_client.complete(&messages).await?;

        self.history_store.add_exchange(message, &completion.response).await?;
        let history_count = self.history_store.total_exchanges().await?;

        Ok(ChatTurn {
            response: completion.response,
            history_count,
        })
    }

    pub async fn history(&self) -> Result<Vec<Exchange>, Box<dyn Error + Send + Sync>> {
        self.history_store.all_exchanges().await
    }

    pub async fn clear_history(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.history_store.clear().await
    }

    pub async fn total_exchanges(&self) -> Result<usize, Box<dyn Error + Send + Sync>> {
        self.history_store.total_exchanges().await
    }

    pub async fn summary(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        let history = self.history_store.all_exchanges().await?;
        Ok(format_history_summary(&history))
    }
}
