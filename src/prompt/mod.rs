// src/prompt/mod.rs
// System-instruction assembly for tutoring requests

mod builder;

pub use builder::{
    build_system_prompt, SystemPromptBuilder, REASONING_CLOSE_TAG, REASONING_OPEN_TAG,
};

use serde::{Deserialize, Serialize};

/// How the tutor should teach for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PedagogicalMode {
    /// Answer immediately, steps shown, concise, example-driven.
    #[default]
    Direct,
    /// Withhold the answer and guide with leading questions.
    Socratic,
    /// Show a delimited step-by-step derivation before the final answer.
    Reasoning,
}

/// Formatting capabilities a subject opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubjectProfile {
    pub uses_math_notation: bool,
    pub uses_code_formatting: bool,
}

/// Capability lookup replacing ad hoc string comparisons. Unknown subjects
/// get the generic profile.
pub fn subject_profile(subject: &str) -> SubjectProfile {
    match subject.trim().to_lowercase().as_str() {
        "math" | "mathematics" | "algebra" | "geometry" | "calculus" | "trigonometry"
        | "statistics" => SubjectProfile {
            uses_math_notation: true,
            uses_code_formatting: false,
        },
        "coding" | "programming" | "computer science" => SubjectProfile {
            uses_math_notation: false,
            uses_code_formatting: true,
        },
        _ => SubjectProfile::default(),
    }
}

/// Instruction appended when the stored language preference is not the
/// default. Identity (None) for English or an absent preference.
pub fn language_directive(language_code: Option<&str>) -> Option<String> {
    let code = language_code?.trim().to_lowercase();
    if code.is_empty() || code == "en" {
        return None;
    }
    let language = match code.as_str() {
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "pt" => "Portuguese",
        "it" => "Italian",
        "hi" => "Hindi",
        "zh" => "Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "ar" => "Arabic",
        "ru" => "Russian",
        other => return Some(format!("Always respond in the language with code '{}'.", other)),
    };
    Some(format!("Always respond in {}.", language))
}
