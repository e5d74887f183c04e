// src/orchestrator/mod.rs
// The response router: provider selection, the Groq→Gemini failover hop,
// and the single-shot helpers built on the same call contract.

mod title;

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::SageConfig;
use crate::error::OrchestratorError;
use crate::history::{self, Attachment, AttachmentKind, ConversationTurn};
use crate::prompt::{self, PedagogicalMode};
use crate::provider::{GenerationParams, ProviderClient, ProviderRequest};
use crate::structured::{self, StudySet, StudyToolKind};

/// Which backend produced the final text. Exactly one provider's output
/// ever becomes the response; outputs are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderUsed {
    Primary,
    Fallback,
    Vision,
}

/// Display-only labels emitted while a call is in flight. Scoped to one
/// call; irrelevant for correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientStatus {
    Thinking,
    AnalyzingImage,
    UsingBackupModel,
}

impl TransientStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TransientStatus::Thinking => "thinking",
            TransientStatus::AnalyzingImage => "analyzing image",
            TransientStatus::UsingBackupModel => "using backup model",
        }
    }
}

impl std::fmt::Display for TransientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Optional progress channel. The caller owns the receiver and decides how
/// to render the labels; the orchestrator never blocks on it.
pub type StatusSender = mpsc::UnboundedSender<TransientStatus>;

#[derive(Debug, Clone)]
pub struct OrchestrationRequest {
    pub user_text: String,
    pub subject: String,
    pub prior_turns: Vec<ConversationTurn>,
    pub attachment: Option<Attachment>,
    pub mode: PedagogicalMode,
    pub language_code: Option<String>,
}

impl OrchestrationRequest {
    /// Stateless single-shot request: empty history, direct mode, default
    /// language. Titling and study tools go through here so no prior
    /// context can leak in.
    pub fn single_shot(user_text: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            subject: subject.into(),
            prior_turns: Vec::new(),
            attachment: None,
            mode: PedagogicalMode::Direct,
            language_code: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestrationResult {
    pub text: String,
    pub provider_used: ProviderUsed,
}

/// Sampling parameters per pedagogical mode. Reasoning derivations get a
/// larger output budget and run colder than conversational answers.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    pub chat: GenerationParams,
    pub reasoning: GenerationParams,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            chat: GenerationParams {
                max_tokens: 1024,
                temperature: 0.7,
            },
            reasoning: GenerationParams {
                max_tokens: 4096,
                temperature: 0.2,
            },
        }
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &SageConfig) -> Self {
        Self {
            chat: GenerationParams {
                max_tokens: config.chat_max_tokens,
                temperature: config.chat_temperature,
            },
            reasoning: GenerationParams {
                max_tokens: config.reasoning_max_tokens,
                temperature: config.reasoning_temperature,
            },
        }
    }
}

/// Routes each request to the cheap text backend or the vision backend and
/// applies the single allowed fallback hop.
///
/// Clients are injected so tests can substitute fakes; the orchestrator
/// holds no other state and calls never share anything mutable.
pub struct ResponseOrchestrator {
    primary: Arc<dyn ProviderClient>,
    vision: Arc<dyn ProviderClient>,
    settings: OrchestratorSettings,
}

impl ResponseOrchestrator {
    pub fn new(
        primary: Arc<dyn ProviderClient>,
        vision: Arc<dyn ProviderClient>,
        settings: OrchestratorSettings,
    ) -> Self {
        if !vision.supports_vision() {
            warn!(
                provider = vision.name(),
                "secondary provider does not support vision; image requests will fail"
            );
        }
        Self {
            primary,
            vision,
            settings,
        }
    }

    fn params_for(&self, mode: PedagogicalMode) -> GenerationParams {
        match mode {
            PedagogicalMode::Reasoning => self.settings.reasoning,
            _ => self.settings.chat,
        }
    }

    /// Produce one response for one user submission.
    ///
    /// Routing, evaluated once per call:
    /// 1. image attachment → vision backend only, no fallback leg;
    /// 2. otherwise → primary backend; on any failure, exactly one hop to
    ///    the vision backend in text-only mode.
    /// Both legs failing collapses into a single `Unavailable` error;
    /// provider details stay in the logs.
    pub async fn orchestrate(
        &self,
        request: OrchestrationRequest,
        status: Option<StatusSender>,
    ) -> Result<OrchestrationResult, OrchestratorError> {
        let call_id = Uuid::new_v4();

        let provider_request = ProviderRequest {
            system: prompt::build_system_prompt(
                &request.subject,
                request.mode,
                request.language_code.as_deref(),
            ),
            history: history::to_chat_messages(&request.prior_turns),
            user_text: request.user_text,
            attachment: request.attachment,
            params: self.params_for(request.mode),
        };

        let has_image = matches!(
            provider_request.attachment.as_ref(),
            Some(att) if att.kind == AttachmentKind::Image
        );

        if has_image {
            emit(&status, TransientStatus::AnalyzingImage);
            info!(%call_id, provider = self.vision.name(), "routing image request to vision backend");
            return match self.vision.invoke(provider_request).await {
                Ok(text) => Ok(OrchestrationResult {
                    text,
                    provider_used: ProviderUsed::Vision,
                }),
                Err(err) => {
                    error!(%call_id, provider = self.vision.name(), error = %err, "vision request failed");
                    Err(OrchestratorError::Unavailable)
                }
            };
        }

        emit(&status, TransientStatus::Thinking);
        let primary_err = match self.primary.invoke(provider_request.clone()).await {
            Ok(text) => {
                return Ok(OrchestrationResult {
                    text,
                    provider_used: ProviderUsed::Primary,
                });
            }
            Err(err) => err,
        };

        warn!(%call_id, provider = self.primary.name(), error = %primary_err, "primary provider failed, trying backup");
        emit(&status, TransientStatus::UsingBackupModel);

        match self.vision.invoke(provider_request).await {
            Ok(text) => Ok(OrchestrationResult {
                text,
                provider_used: ProviderUsed::Fallback,
            }),
            Err(fallback_err) => {
                error!(
                    %call_id,
                    primary_error = %primary_err,
                    fallback_error = %fallback_err,
                    "both providers failed"
                );
                Err(OrchestratorError::Unavailable)
            }
        }
    }

    /// Generate a quiz or flashcard set about a topic. Same call contract
    /// as chat, with an empty history and the raw-JSON prompt.
    pub async fn generate_study_set(
        &self,
        kind: StudyToolKind,
        topic: &str,
        subject: &str,
        count: usize,
    ) -> Result<StudySet, OrchestratorError> {
        let prompt_text = structured::build_study_prompt(kind, topic, count);
        let result = self
            .orchestrate(OrchestrationRequest::single_shot(prompt_text, subject), None)
            .await?;
        structured::parse_study_set(&result.text)
    }
}

fn emit(status: &Option<StatusSender>, value: TransientStatus) {
    if let Some(sender) = status {
        // Receiver may already be gone; status is display-only
        let _ = sender.send(value);
    }
}
