// src/history/mod.rs
// Conversation turns and their adaptation into provider message shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Text,
}

/// A user-selected file accompanying a turn. `content` is raw decoded text
/// for `Text`, base64-encoded bytes for `Image`. At most one per turn,
/// never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub content: String,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
}

/// One message within a conversation's ordered history. Owned by the
/// external persistence layer; passed in by value for each call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub attachment: Option<Attachment>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Neutral role/content message, the shape the primary provider consumes
/// directly. The Gemini client reshapes these into its own contents array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Append a text attachment's content to a message as a delimited suffix.
/// The same convention is used for history turns and the current turn.
pub fn append_file_suffix(text: &str, attachment: &Attachment) -> String {
    match &attachment.file_name {
        Some(name) => format!("{}\n\n[File: {}]: {}", text, name, attachment.content),
        None => format!("{}\n\n[File]: {}", text, attachment.content),
    }
}

/// Adapt prior turns into the chat-style message list.
///
/// Text attachments are inlined as a `[File]: …` suffix. Image attachments
/// are dropped from history; providers only see the current turn's image.
/// An empty history is valid and yields an empty list, which the stateless
/// single-shot calls (titling, study tools) rely on.
pub fn to_chat_messages(turns: &[ConversationTurn]) -> Vec<ChatMessage> {
    turns
        .iter()
        .map(|turn| {
            let content = match &turn.attachment {
                Some(att) if att.kind == AttachmentKind::Text => {
                    append_file_suffix(&turn.text, att)
                }
                _ => turn.text.clone(),
            };
            ChatMessage {
                role: turn.role.as_str().to_string(),
                content,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: Role, text: &str, attachment: Option<Attachment>) -> ConversationTurn {
        ConversationTurn {
            role,
            text: text.into(),
            attachment,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_history_yields_empty_list() {
        assert!(to_chat_messages(&[]).is_empty());
    }

    #[test]
    fn test_role_mapping() {
        let messages = to_chat_messages(&[
            turn(Role::User, "hi", None),
            turn(Role::Assistant, "hello", None),
        ]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
    }

    #[test]
    fn test_text_attachment_inlined_as_suffix() {
        let att = Attachment {
            kind: AttachmentKind::Text,
            content: "fn main() {}".into(),
            mime_type: Some("text/plain".into()),
            file_name: Some("main.rs".into()),
        };
        let messages = to_chat_messages(&[turn(Role::User, "review this", Some(att))]);
        assert_eq!(messages[0].content, "review this\n\n[File: main.rs]: fn main() {}");
    }

    #[test]
    fn test_image_attachment_never_inlined_into_history() {
        let att = Attachment {
            kind: AttachmentKind::Image,
            content: "aGVsbG8=".into(),
            mime_type: Some("image/png".into()),
            file_name: None,
        };
        let messages = to_chat_messages(&[turn(Role::User, "what is this?", Some(att))]);
        assert_eq!(messages[0].content, "what is this?");
    }
}
