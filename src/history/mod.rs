mod memory;
use async_trait::async_trait;
use log::info;
use std::error::Error;
use crate::cli::Args;
use std::sync::Arc;
use crate::models::chat::{ ChatMessage, Exchange };

pub use memory::InMemoryHistory;

/// Source of truth for the conversation's exchange history. An exchange is
/// recorded only once its assistant reply is known, so the stored length
/// always equals the number of completed chat turns.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn add_exchange(
        &self,
        user_message: &str,
        assistant_response: &str
    ) -> Result<Exchange, Box<dyn Error + Send + Sync>>;

    /// Full history in insertion order, as an owned snapshot.
    async fn all_exchanges(&self) -> Result<Vec<Exchange>, Box<dyn Error + Send + Sync>>;

    /// Idempotent reset to an empty history.
    async fn clear(&self) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn total_exchanges(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;
}

pub fn create_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn Error + Send + Sync>> {
    match args.history_type.to_lowercase().as_str() {
        "memory" => Ok(Arc::new(InMemoryHistory::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported history store type: {}", args.history_type)
                    )
                )
            ),
    }
}

pub fn initialize_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn Error + Send + Sync>> {
    info!("Chat history will be stored in: {}", args.history_type);
    create_history_store(args)
}

/// Replay the whole transcript for a stateless completion provider: every
/// stored exchange becomes a user/assistant message pair, in order, followed
/// by the current user message.
pub fn build_message_context(history: &[Exchange], current_message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 1);

    for exchange in history {
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: exchange.user.clone(),
        });
        messages.push(ChatMessage {
            role: "assistant".to_string(),
            content: exchange.assistant.clone(),
        });
    }

    messages.push(ChatMessage {
        role: "user".to_string(),
        content: current_message.to_string(),
    });
    messages
}

/// Human-readable rendering of the history, 1-indexed in insertion order.
pub fn format_history_summary(history: &[Exchange]) -> String {
    let mut summary = String::from("Previous conversations:\n");
    for (i, exchange) in history.iter().enumerate() {
        summary.push_str(
            &format!("\n{}. User: {}\n   Bot: {}", i + 1, exchange.user, exchange.assistant)
        );
    }

    summary
}
