//! Encode a [`MessageRecord`] as an OpenAI-compatible chat message.

use chrono::SecondsFormat;

use super::openai_types::{ChatContent, ChatMessage, ChatToolCall, SearchResult, SearchResultMessage};
use crate::config::OpenAiOptions;
use crate::error::Result;
use crate::message::{merge_thoughts_into_call, MessageRecord, Role};

/// Translate one record into an OpenAI chat message.
///
/// With `put_inner_thoughts_in_kwargs`, assistant text is moved into every tool
/// call's arguments and `content` becomes `null`. Tool call ids are cut to
/// `max_tool_id_length` characters; the record keeps its full ids.
///
/// # Errors
/// Returns `BridgeError::ArgumentParse` if packing meets arguments that are not a
/// JSON object.
pub fn record_to_openai(record: &MessageRecord, opts: &OpenAiOptions) -> Result<ChatMessage> {
    let role = record.role().as_str().to_string();
    let name = record.name().map(str::to_string);

    let message = match record.role() {
        Role::System => ChatMessage {
            role,
            content: record.text().map(|t| ChatContent::Text(t.to_string())),
            name,
            tool_calls: None,
            tool_call_id: None,
        },
        Role::User => {
            let content = match record.multimodal_content() {
                Some(parts) => Some(ChatContent::Parts(parts.to_vec())),
                None => record.text().map(|t| ChatContent::Text(t.to_string())),
            };
            ChatMessage {
                role,
                content,
                name,
                tool_calls: None,
                tool_call_id: None,
            }
        }
        Role::Assistant => encode_assistant(record, role, name, opts)?,
        Role::Tool => ChatMessage {
            role,
            content: record.text().map(|t| ChatContent::Text(t.to_string())),
            name: None,
            tool_calls: None,
            tool_call_id: record
                .tool_call_id()
                .map(|id| truncate_id(id, opts.max_tool_id_length)),
        },
    };

    Ok(message)
}

fn encode_assistant(
    record: &MessageRecord,
    role: String,
    name: Option<String>,
    opts: &OpenAiOptions,
) -> Result<ChatMessage> {
    let pack = opts.put_inner_thoughts_in_kwargs && record.has_tool_calls();

    let tool_calls = if record.has_tool_calls() {
        let calls = record
            .tool_calls()
            .iter()
            .map(|call| -> Result<ChatToolCall> {
                let mut wire = match (pack, record.text()) {
                    (true, Some(thoughts)) => ChatToolCall::from(&merge_thoughts_into_call(
                        call,
                        thoughts,
                        &opts.inner_thoughts_key,
                    )?),
                    _ => ChatToolCall::from(call),
                };
                wire.id = truncate_id(&wire.id, opts.max_tool_id_length);
                Ok(wire)
            })
            .collect::<Result<Vec<_>>>()?;
        Some(calls)
    } else {
        None
    };

    let content = if pack {
        None
    } else {
        record.text().map(|t| ChatContent::Text(t.to_string()))
    };

    Ok(ChatMessage {
        role,
        content,
        name,
        tool_calls,
        tool_call_id: None,
    })
}

/// First `max_len` characters of `id`; 0 means no limit.
fn truncate_id(id: &str, max_len: usize) -> String {
    if max_len == 0 {
        return id.to_string();
    }
    id.chars().take(max_len).collect()
}

/// `{timestamp, message: {content, role}}` view used when returning search hits.
///
/// # Errors
/// Same as [`record_to_openai`].
pub fn record_to_search_result(
    record: &MessageRecord,
    opts: &OpenAiOptions,
) -> Result<SearchResult> {
    let encoded = record_to_openai(record, opts)?;
    Ok(SearchResult {
        timestamp: record
            .created_at()
            .to_rfc3339_opts(SecondsFormat::AutoSi, false),
        message: SearchResultMessage {
            content: encoded.content,
            role: encoded.role,
        },
    })
}
