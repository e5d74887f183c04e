// src/error.rs
// Error taxonomy for the response router

use thiserror::Error;

/// Failure of a single upstream provider attempt.
///
/// These never reach callers of the orchestrator; they are converted to
/// `OrchestratorError` at that boundary and the details go to the logs.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API credential not configured")]
    MissingCredentials,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("response contained no completion")]
    EmptyCompletion,

    #[error("attachment is not valid image data")]
    MalformedImage,

    #[error("provider does not accept image input")]
    ImageUnsupported,
}

/// The only failure kinds callers of the orchestration core ever observe.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A required credential is missing. Fatal at startup, nothing to fall
    /// back to.
    #[error("{0} is not configured")]
    Configuration(&'static str),

    /// Every eligible provider attempt failed. Rendered to end users as a
    /// generic "having trouble connecting" message.
    #[error("unable to process the request")]
    Unavailable,

    /// A structured-generation response did not contain a parseable JSON
    /// object. Affects only the study-tool action that requested it.
    #[error("response did not contain the expected JSON object")]
    MalformedStructuredOutput,
}
