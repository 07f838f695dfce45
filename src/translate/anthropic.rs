//! Encode a [`MessageRecord`] as an Anthropic Messages API message.
//!
//! Assistant prose and tool calls always become sibling content blocks; tool
//! results travel as `user` messages holding a single `tool_result` block.

use super::anthropic_types::{ContentBlock, Message, MessageContent, Role as WireRole};
use crate::config::AnthropicOptions;
use crate::error::{BridgeError, Result};
use crate::message::{MessageRecord, Role};

/// # Errors
/// Returns `BridgeError::UnsupportedOperation` for system turns, which belong in
/// the request's top-level `system` field, and `BridgeError::ArgumentParse` when
/// a tool call's arguments are not a JSON object.
pub fn record_to_anthropic(record: &MessageRecord, opts: &AnthropicOptions) -> Result<Message> {
    match record.role() {
        Role::System => Err(BridgeError::unsupported(
            "Anthropic messages have no 'system' role; pass system text separately",
        )),
        Role::User => Ok(Message {
            role: WireRole::User,
            content: MessageContent::Text(record.text().unwrap_or_default().to_string()),
            name: record.name().map(str::to_string),
        }),
        Role::Assistant => {
            let mut blocks = Vec::with_capacity(record.tool_calls().len() + 1);

            if let Some(text) = record.text() {
                blocks.push(ContentBlock::Text {
                    text: wrap_in_tag(text, &opts.inner_thoughts_tag),
                });
            }

            for call in record.tool_calls() {
                blocks.push(ContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.function.name.clone(),
                    input: serde_json::Value::Object(call.parsed_arguments()?),
                });
            }

            Ok(Message {
                role: WireRole::Assistant,
                content: MessageContent::Blocks(blocks),
                name: record.name().map(str::to_string),
            })
        }
        Role::Tool => {
            let tool_use_id = record
                .tool_call_id()
                .ok_or_else(|| BridgeError::validation("tool turn without tool_call_id"))?;
            Ok(Message {
                role: WireRole::User,
                content: MessageContent::Blocks(vec![ContentBlock::ToolResult {
                    tool_use_id: tool_use_id.to_string(),
                    content: record.text().unwrap_or_default().to_string(),
                }]),
                name: None,
            })
        }
    }
}

fn wrap_in_tag(text: &str, tag: &str) -> String {
    if tag.is_empty() {
        text.to_string()
    } else {
        format!("<{tag}>{text}</{tag}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{NewMessage, ToolCall};
    use serde_json::json;

    fn content_blocks(content: MessageContent) -> Vec<ContentBlock> {
        match content {
            MessageContent::Text(text) => vec![ContentBlock::Text { text }],
            MessageContent::Blocks(blocks) => blocks,
        }
    }

    #[test]
    fn test_system_is_rejected() {
        let rec = MessageRecord::new(NewMessage::new(Role::System).with_text("be nice")).unwrap();
        let err = record_to_anthropic(&rec, &AnthropicOptions::default()).unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_user_message_is_plain_text() {
        let rec = MessageRecord::new(NewMessage::new(Role::User).with_text("hi")).unwrap();
        let msg = record_to_anthropic(&rec, &AnthropicOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "user", "content": "hi"})
        );
    }

    #[test]
    fn test_assistant_text_and_calls_are_siblings() {
        let rec = MessageRecord::new(
            NewMessage::new(Role::Assistant)
                .with_text("check the weather")
                .with_tool_calls(vec![ToolCall::function(
                    "toolu_1",
                    "get_weather",
                    r#"{"city":"London"}"#,
                )]),
        )
        .unwrap();
        let msg = record_to_anthropic(&rec, &AnthropicOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "<thinking>check the weather</thinking>"},
                    {"type": "tool_use", "id": "toolu_1", "name": "get_weather", "input": {"city": "London"}}
                ]
            })
        );
    }

    #[test]
    fn test_empty_tag_disables_wrapping() {
        let rec = MessageRecord::new(NewMessage::new(Role::Assistant).with_text("plain")).unwrap();
        let opts = AnthropicOptions {
            inner_thoughts_tag: String::new(),
        };
        let msg = record_to_anthropic(&rec, &opts).unwrap();
        assert_eq!(
            content_blocks(msg.content),
            vec![ContentBlock::Text {
                text: "plain".to_string()
            }]
        );
    }

    #[test]
    fn test_assistant_calls_only() {
        let rec = MessageRecord::new(
            NewMessage::new(Role::Assistant).with_tool_calls(vec![ToolCall::function(
                "toolu_1", "noop", "{}",
            )]),
        )
        .unwrap();
        let msg = record_to_anthropic(&rec, &AnthropicOptions::default()).unwrap();
        let blocks = content_blocks(msg.content);
        assert_eq!(blocks.len(), 1);
        assert!(matches!(blocks[0], ContentBlock::ToolUse { .. }));
    }

    #[test]
    fn test_bad_arguments_fail() {
        let rec = MessageRecord::new(
            NewMessage::new(Role::Assistant).with_tool_calls(vec![ToolCall::function(
                "toolu_1", "noop", "{oops",
            )]),
        )
        .unwrap();
        let err = record_to_anthropic(&rec, &AnthropicOptions::default()).unwrap_err();
        assert!(matches!(err, BridgeError::ArgumentParse { .. }));
    }

    #[test]
    fn test_tool_result_becomes_user_block() {
        let rec = MessageRecord::new(
            NewMessage::new(Role::Tool)
                .with_text(r#"{"status":"OK"}"#)
                .with_tool_call_id("toolu_1")
                .with_name("get_weather"),
        )
        .unwrap();
        let msg = record_to_anthropic(&rec, &AnthropicOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "role": "user",
                "content": [
                    {"type": "tool_result", "tool_use_id": "toolu_1", "content": "{\"status\":\"OK\"}"}
                ]
            })
        );
    }
}
