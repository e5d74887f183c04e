// src/provider/mod.rs
// Provider trait and request types for the two upstream backends

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::history::{Attachment, ChatMessage};

pub mod gemini;
pub mod groq;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;

/// Sampling parameters for one completion. Selected per pedagogical mode
/// by the orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// Everything a provider needs for a single completion attempt.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub system: String,
    pub history: Vec<ChatMessage>,
    pub user_text: String,
    pub attachment: Option<Attachment>,
    pub params: GenerationParams,
}

/// Unified interface over the upstream chat-completion backends.
///
/// One network call per invoke, no internal retries: failover policy
/// lives entirely in the orchestrator.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Provider name for logging/debugging
    fn name(&self) -> &'static str;

    /// Whether this backend accepts inline image input
    fn supports_vision(&self) -> bool;

    /// Issue one completion request and extract the text of the first
    /// choice, or fail typed.
    async fn invoke(&self, request: ProviderRequest) -> Result<String, ProviderError>;
}
