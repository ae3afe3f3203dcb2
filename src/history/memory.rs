use async_trait::async_trait;
use crate::models::chat::Exchange;
use crate::history::HistoryStore;
use std::error::Error;
use std::sync::RwLock;
use chrono::Utc;

/// Process-local exchange log. History lives only as long as the process;
/// reads and appends are serialized through an interior lock.
pub struct InMemoryHistory {
    exchanges: RwLock<Vec<Exchange>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            exchanges: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    async fn add_exchange(
        &self,
        user_message: &str,
        assistant_response: &str
    ) -> Result<Exchange, Box<dyn Error + Send + Sync>> {
        let mut exchanges = self.exchanges
            .write()
            .map_err(|_| "history lock poisoned".to_string())?;

        // Timestamps must never decrease along the sequence, even if the
        // system clock steps backwards between appends.
        let mut timestamp = Utc::now();
        if let Some(last) = exchanges.last() {
            if last.timestamp > timestamp {
                timestamp = last.timestamp;
            }
        }

        let exchange = Exchange {
            user: user_message.to_string(),
            assistant: assistant_response.to_string(),
            timestamp,
        };
        exchanges.push(exchange.clone());
        Ok(exchange)
    }

    async fn all_exchanges(&self) -> Result<Vec<Exchange>, Box<dyn Error + Send + Sync>> {
        let exchanges = self.exchanges
            .read()
            .map_err(|_| "history lock poisoned".to_string())?;
        Ok(exchanges.clone())
    }

    async fn clear(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut exchanges = self.exchanges
            .write()
            .map_err(|_| "history lock poisoned".to_string())?;
        exchanges.clear();
        Ok(())
    }

    async fn total_exchanges(&self) -> Result<usize, Box<dyn Error + Send + Sync>> {
        let exchanges = self.exchanges
            .read()
            .map_err(|_| "history lock poisoned".to_string())?;
        Ok(exchanges.len())
    }
}
