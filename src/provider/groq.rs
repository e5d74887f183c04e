// src/provider/groq.rs
// Groq chat-completions provider (OpenAI-compatible), the primary text model

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{ProviderClient, ProviderRequest};
use crate::config::SageConfig;
use crate::error::{OrchestratorError, ProviderError};
use crate::history::{append_file_suffix, AttachmentKind};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

pub struct GroqProvider {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GroqProvider {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            timeout,
        }
    }

    pub fn from_config(config: &SageConfig) -> Result<Self, OrchestratorError> {
        let api_key = config
            .groq_api_key
            .clone()
            .ok_or(OrchestratorError::Configuration("GROQ_API_KEY"))?;
        Ok(Self::new(
            api_key,
            config.groq_model.clone(),
            config.provider_timeout_duration(),
        ))
    }
}

#[async_trait]
impl ProviderClient for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    fn supports_vision(&self) -> bool {
        false
    }

    async fn invoke(&self, request: ProviderRequest) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredentials);
        }

        // The orchestrator never routes image requests here; reject rather
        // than silently dropping the attachment if one slips through.
        if matches!(&request.attachment, Some(a) if a.kind == AttachmentKind::Image) {
            return Err(ProviderError::ImageUnsupported);
        }

        let mut api_messages = vec![json!({
            "role": "system",
            "content": request.system
        })];

        for msg in &request.history {
            api_messages.push(json!({
                "role": msg.role,
                "content": msg.content
            }));
        }

        let user_content = match &request.attachment {
            Some(att) if att.kind == AttachmentKind::Text => {
                append_file_suffix(&request.user_text, att)
            }
            _ => request.user_text.clone(),
        };
        api_messages.push(json!({
            "role": "user",
            "content": user_content
        }));

        let body = json!({
            "model": self.model,
            "messages": api_messages,
            "max_tokens": request.params.max_tokens,
            "temperature": request.params.temperature,
        });

        debug!("Groq request: model={}", self.model);

        let response = self
            .client
            .post(GROQ_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let raw_response = response.json::<Value>().await?;

        let content = raw_response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(ProviderError::EmptyCompletion)?;

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Attachment;
    use crate::provider::GenerationParams;

    fn provider() -> GroqProvider {
        GroqProvider::new("test_key".into(), "llama-3.3-70b-versatile".into(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_rejects_image_attachments() {
        let request = ProviderRequest {
            system: "You are an expert tutor.".into(),
            history: vec![],
            user_text: "what is in this image?".into(),
            attachment: Some(Attachment {
                kind: AttachmentKind::Image,
                content: "aGVsbG8=".into(),
                mime_type: Some("image/png".into()),
                file_name: None,
            }),
            params: GenerationParams::default(),
        };

        let err = provider().invoke(request).await.unwrap_err();
        assert!(matches!(err, ProviderError::ImageUnsupported));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let provider = GroqProvider::new(String::new(), "m".into(), Duration::from_secs(5));
        let request = ProviderRequest {
            system: String::new(),
            history: vec![],
            user_text: "hi".into(),
            attachment: None,
            params: GenerationParams::default(),
        };
        let err = provider.invoke(request).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredentials));
    }
}
