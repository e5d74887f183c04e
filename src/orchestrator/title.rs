// src/orchestrator/title.rs
// Auto-titling: a fire-and-forget summary of the first message of a new
// conversation. Cosmetic, so every failure is swallowed and logged.

use tracing::warn;

use super::{OrchestrationRequest, ResponseOrchestrator};

impl ResponseOrchestrator {
    /// Ask for a 3-5 word title for a conversation that opened with
    /// `user_text`. Returns None on any failure; callers must treat that
    /// as "keep the placeholder title", never as an error.
    pub async fn generate_title(&self, user_text: &str) -> Option<String> {
        let prompt = format!(
            "Summarize the following message in 3 to 5 words to use as a \
             conversation title. Respond with the title only.\n\n{}",
            user_text
        );

        match self
            .orchestrate(OrchestrationRequest::single_shot(prompt, "General"), None)
            .await
        {
            Ok(result) => {
                let title = strip_surrounding_quotes(result.text.trim());
                if title.is_empty() {
                    None
                } else {
                    Some(title.to_string())
                }
            }
            Err(err) => {
                warn!(error = %err, "title generation failed, keeping placeholder");
                None
            }
        }
    }
}

/// Models love to quote their own titles.
fn strip_surrounding_quotes(title: &str) -> &str {
    title
        .trim_matches(|c| matches!(c, '"' | '\'' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}'))
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_surrounding_quotes() {
        assert_eq!(strip_surrounding_quotes("\"Linear Equations Help\""), "Linear Equations Help");
        assert_eq!(strip_surrounding_quotes("'Photosynthesis Basics'"), "Photosynthesis Basics");
        assert_eq!(strip_surrounding_quotes("\u{201c}French Verbs\u{201d}"), "French Verbs");
        assert_eq!(strip_surrounding_quotes("No Quotes Here"), "No Quotes Here");
    }

    #[test]
    fn test_inner_quotes_preserved() {
        assert_eq!(
            strip_surrounding_quotes("\"The \"Quadratic\" Formula\""),
            "The \"Quadratic\" Formula"
        );
    }
}
