use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };

/// One completed conversation turn: the user input paired with the
/// assistant reply and the moment it was recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}
