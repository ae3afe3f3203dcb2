use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- History Store Args ---
    /// History chat store type (memory)
    #[arg(long, env = "HISTORY_TYPE", default_value = "memory")]
    pub history_type: String,

    // --- Chat LLM Provider Args ---
    /// API Key for the Groq chat completion API
    #[arg(long, env = "GROQ_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Model name for chat completion
    #[arg(long, env = "CHAT_MODEL", default_value = "llama-3.1-8b-instant")]
    pub chat_model: String,

    /// Base URL for the chat completion API (e.g., https://api.groq.com)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let the adapter handle it if None
    pub chat_base_url: Option<String>,

    // --- General App Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:5000")]
    pub server_addr: String,
}
