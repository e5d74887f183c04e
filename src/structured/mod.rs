// src/structured/mod.rs
// Prompt builders and extraction for the quiz/flashcard study tools.
// The JSON contract is enforced by prompt instruction only; this module
// pulls the first balanced object out of whatever the model returned.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OrchestratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyToolKind {
    Quiz,
    Flashcards,
}

impl StudyToolKind {
    pub fn label(&self) -> &'static str {
        match self {
            StudyToolKind::Quiz => "quiz",
            StudyToolKind::Flashcards => "flashcard set",
        }
    }
}

/// The agreed shape for both study tools: a title plus question/answer
/// pairs. For flashcards the pair is front/back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySet {
    pub title: String,
    pub questions: Vec<StudyItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyItem {
    pub question: String,
    pub answer: String,
}

/// Prompt instructing the model to emit raw JSON only, matching the
/// documented shape. Used with an empty history so nothing leaks in.
pub fn build_study_prompt(kind: StudyToolKind, topic: &str, count: usize) -> String {
    format!(
        "Create a {} with exactly {} items about: {}.\n\
         Respond with ONLY a raw JSON object, no markdown fences, no commentary, \
         matching this shape exactly:\n\
         {{\"title\": \"...\", \"questions\": [{{\"question\": \"...\", \"answer\": \"...\"}}]}}",
        kind.label(),
        count,
        topic.trim()
    )
}

/// Extract the first balanced `{...}` substring, tracking string literals
/// and escapes so braces inside quoted text do not count.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a study set out of a raw model response.
pub fn parse_study_set(raw: &str) -> Result<StudySet, OrchestratorError> {
    let object = extract_json_object(raw).ok_or(OrchestratorError::MalformedStructuredOutput)?;
    let set: StudySet = serde_json::from_str(object).map_err(|err| {
        debug!(error = %err, "study set JSON did not match the expected shape");
        OrchestratorError::MalformedStructuredOutput
    })?;
    if set.questions.is_empty() {
        return Err(OrchestratorError::MalformedStructuredOutput);
    }
    Ok(set)
}
