// src/provider/gemini.rs
// Gemini generateContent provider: the only vision-capable backend, and the
// fallback for text requests when Groq fails

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{ProviderClient, ProviderRequest};
use crate::config::SageConfig;
use crate::error::{OrchestratorError, ProviderError};
use crate::history::{append_file_suffix, Attachment, AttachmentKind};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiProvider {
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
            .gemini_api_key
            .clone()
            .ok_or(OrchestratorError::Configuration("GEMINI_API_KEY"))?;
        Ok(Self::new(
            api_key,
            config.gemini_model.clone(),
            config.provider_timeout_duration(),
        ))
    }

    /// Build Gemini contents from the neutral request shape. History is
    /// text-only; an image rides only on the current turn.
    fn build_contents(request: &ProviderRequest) -> Result<Vec<GeminiContent>, ProviderError> {
        let mut contents = Vec::new();

        for msg in &request.history {
            let role = match msg.role.as_str() {
                "user" => "user",
                "assistant" => "model",
                _ => continue, // System content travels separately
            };
            contents.push(GeminiContent {
                role: role.to_string(),
                parts: vec![GeminiPart::Text {
                    text: msg.content.clone(),
                }],
            });
        }

        let mut parts = Vec::new();
        match &request.attachment {
            Some(att) if att.kind == AttachmentKind::Image => {
                parts.push(GeminiPart::Text {
                    text: request.user_text.clone(),
                });
                parts.push(Self::build_image_part(att)?);
            }
            Some(att) if att.kind == AttachmentKind::Text => {
                parts.push(GeminiPart::Text {
                    text: append_file_suffix(&request.user_text, att),
                });
            }
            _ => {
                parts.push(GeminiPart::Text {
                    text: request.user_text.clone(),
                });
            }
        }
        contents.push(GeminiContent {
            role: "user".to_string(),
            parts,
        });

        Ok(contents)
    }

    fn build_image_part(attachment: &Attachment) -> Result<GeminiPart, ProviderError> {
        let mime_type = attachment
            .mime_type
            .clone()
            .ok_or(ProviderError::MalformedImage)?;
        let data = attachment.content.trim();
        if data.is_empty() || !is_base64(data) {
            return Err(ProviderError::MalformedImage);
        }
        Ok(GeminiPart::InlineData {
            inline_data: GeminiInlineData {
                mime_type,
                data: data.to_string(),
            },
        })
    }
}

fn is_base64(data: &str) -> bool {
    data.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'\n' | b'\r'))
}

#[async_trait]
impl ProviderClient for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn supports_vision(&self) -> bool {
        true
    }

    async fn invoke(&self, request: ProviderRequest) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredentials);
        }

        let contents = Self::build_contents(&request)?;
        let api_request = GeminiRequest {
            contents,
            system_instruction: Some(GeminiSystemInstruction {
                parts: vec![GeminiTextPart {
                    text: request.system.clone(),
                }],
            }),
            generation_config: Some(GeminiGenerationConfig {
                temperature: request.params.temperature,
                max_output_tokens: request.params.max_tokens,
            }),
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        );

        debug!("Gemini request: model={}", self.model);

        let response = self
            .client
            .post(&url)
            .json(&api_request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let api_response: GeminiResponse = response.json().await?;

        if let Some(error) = api_response.error {
            return Err(ProviderError::Api {
                status: error.code.unwrap_or(200),
                body: error.message,
            });
        }

        let text: String = api_response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        Ok(text)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Debug, Serialize, Clone)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize, Clone)]
struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    code: Option<u16>,
    message: String,
}
