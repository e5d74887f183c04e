// src/prompt/builder.rs

use super::{language_directive, subject_profile, PedagogicalMode};

/// Opening delimiter of a shown derivation in `Reasoning` mode. The parser
/// in `crate::reasoning` looks for the same pair.
pub const REASONING_OPEN_TAG: &str = "<think>";
pub const REASONING_CLOSE_TAG: &str = "</think>";

pub struct SystemPromptBuilder;

impl SystemPromptBuilder {
    /// Assemble the system instruction in a fixed order: base sentence,
    /// mode block, subject formatting directive, language directive.
    /// Pure and deterministic: same inputs, same string.
    pub fn build(subject: &str, mode: PedagogicalMode, language_code: Option<&str>) -> String {
        let mut prompt = String::new();

        let subject_label = subject.trim();
        if subject_label.is_empty() || subject_label.eq_ignore_ascii_case("general") {
            prompt.push_str("You are an expert tutor. ");
        } else {
            prompt.push_str(&format!(
                "You are an expert tutor specialized in {}. ",
                subject_label
            ));
        }
        prompt.push_str("Always use correct grammar and formatting.\n\n");

        Self::add_mode_block(&mut prompt, mode);
        Self::add_subject_directives(&mut prompt, subject_label);

        if let Some(directive) = language_directive(language_code) {
            prompt.push_str(&directive);
            prompt.push('\n');
        }

        prompt
    }

    fn add_mode_block(prompt: &mut String, mode: PedagogicalMode) {
        match mode {
            PedagogicalMode::Direct => {
                prompt.push_str(
                    "Answer the student's question directly and immediately. \
                     Show the steps of your reasoning, keep explanations concise, \
                     and illustrate with a worked example where it helps.\n\n",
                );
            }
            PedagogicalMode::Socratic => {
                prompt.push_str(
                    "Do not give the student the direct answer unless they explicitly \
                     ask for it. Guide them toward it with leading questions, identify \
                     the concept they are struggling with, and offer a practice problem \
                     once they demonstrate understanding. Start by asking what they \
                     already know about the topic.\n\n",
                );
            }
            PedagogicalMode::Reasoning => {
                prompt.push_str(&format!(
                    "Before giving your final answer, work through the problem step by \
                     step inside a {}...{} block. Consider edge cases and alternative \
                     approaches as you go. After the block, give a clear, structured \
                     final answer.\n\n",
                    REASONING_OPEN_TAG, REASONING_CLOSE_TAG
                ));
            }
        }
    }

    fn add_subject_directives(prompt: &mut String, subject: &str) {
        let profile = subject_profile(subject);
        if profile.uses_math_notation {
            prompt.push_str("Use delimited math notation ($...$) for all equations.\n\n");
        }
        if profile.uses_code_formatting {
            prompt.push_str("Provide clean, commented code snippets for all examples.\n\n");
        }
    }
}

/// Convenience wrapper used by the orchestrator.
pub fn build_system_prompt(
    subject: &str,
    mode: PedagogicalMode,
    language_code: Option<&str>,
) -> String {
    SystemPromptBuilder::build(subject, mode, language_code)
}
