use db::models::message::{MessagePart, MessageRole};

use crate::services::chat::{DEFAULT_CHAT_TITLE, IncomingMessage, message_parts};

const MAX_TITLE_CHARS: usize = 50;

/// Derives a chat title from the first text part of the first user message.
/// Every degenerate input (no user message, no text part, empty text)
/// collapses to the same placeholder.
pub fn generate_title(messages: &[IncomingMessage]) -> String {
    let Some(first_user) = messages
        .iter()
        .find(|message| message.role == MessageRole::User)
    else {
        return DEFAULT_CHAT_TITLE.to_string();
    };

    let parts = message_parts(first_user);
    let Some(text) = parts.iter().find_map(|part| match part {
        MessagePart::Text { text } => Some(text.as_str()),
        _ => None,
    }) else {
        return DEFAULT_CHAT_TITLE.to_string();
    };

    if text.is_empty() {
        return DEFAULT_CHAT_TITLE.to_string();
    }

    truncate_title(text)
}

fn truncate_title(text: &str) -> String {
    let truncated: String = text.chars().take(MAX_TITLE_CHARS).collect();
    if text.chars().count() > MAX_TITLE_CHARS {
        format!("{truncated}...")
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn message(role: MessageRole, parts: Vec<MessagePart>) -> IncomingMessage {
        IncomingMessage {
            id: None,
            role,
            content: None,
            parts: Some(parts),
        }
    }

    fn text_part(text: &str) -> MessagePart {
        MessagePart::Text {
            text: text.to_string(),
        }
    }

    #[test]
    fn uses_first_text_part_of_first_user_message() {
        let messages = vec![
            message(MessageRole::System, vec![text_part("you are helpful")]),
            message(MessageRole::User, vec![text_part("short question")]),
            message(MessageRole::User, vec![text_part("later question")]),
        ];
        assert_eq!(generate_title(&messages), "short question");
    }

    #[test]
    fn falls_back_without_user_message() {
        let messages = vec![message(
            MessageRole::Assistant,
            vec![text_part("hello there")],
        )];
        assert_eq!(generate_title(&messages), DEFAULT_CHAT_TITLE);
    }

    #[test]
    fn falls_back_without_text_parts() {
        let messages = vec![message(
            MessageRole::User,
            vec![MessagePart::Image {
                image_url: "https://example.com/a.png".to_string(),
            }],
        )];
        assert_eq!(generate_title(&messages), DEFAULT_CHAT_TITLE);
    }

    #[test]
    fn falls_back_on_empty_text() {
        let messages = vec![message(MessageRole::User, vec![text_part("")])];
        assert_eq!(generate_title(&messages), DEFAULT_CHAT_TITLE);
    }

    #[test]
    fn long_titles_are_truncated_with_ellipsis() {
        let long = "a".repeat(60);
        let messages = vec![message(MessageRole::User, vec![text_part(&long)])];
        let title = generate_title(&messages);
        assert_eq!(title, format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn exact_limit_is_not_truncated() {
        let exact = "b".repeat(50);
        let messages = vec![message(MessageRole::User, vec![text_part(&exact)])];
        assert_eq!(generate_title(&messages), exact);
    }

    #[test]
    fn truncation_never_splits_a_multibyte_character() {
        let long = "ねこ".repeat(40);
        let messages = vec![message(MessageRole::User, vec![text_part(&long)])];
        let title = generate_title(&messages);
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), 53);
    }

    #[test]
    fn string_content_is_coerced_before_titling() {
        let messages = vec![IncomingMessage {
            id: None,
            role: MessageRole::User,
            content: Some(Value::String("from raw content".to_string())),
            parts: None,
        }];
        assert_eq!(generate_title(&messages), "from raw content");
    }
}
