//! Turn provider-shaped (OpenAI chat) message payloads into [`MessageRecord`]s.
//!
//! Three shapes are accepted:
//! - the deprecated `function` role, stored as a `tool` turn;
//! - the deprecated `function_call` field on an assistant turn, stored as one tool call;
//! - the current `tool_calls` array.
//!
//! The deprecated shapes carry no correlation id of their own. The caller puts
//! one in the payload's `tool_call_id` or in [`IngestOptions::tool_call_id`].

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::diagnostics::Diagnostics;
use crate::error::{BridgeError, Result};
use crate::message::record::{
    check_tool_call_id, MessageRecord, NewMessage, Role, ToolCall,
};
use crate::translate::openai_types::{ChatContent, ChatToolCall, LegacyFunctionCall};

const COMPONENT: &str = "ingest";
const FUNCTION_ROLE: &str = "function";

/// Caller-supplied context for one ingest call.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub user_ref: String,
    pub agent_ref: String,
    /// Model that produced the payload.
    pub model: Option<String>,
    pub allow_functions_style: bool,
    pub created_at: Option<DateTime<Utc>>,
    /// Correlation id for deprecated shapes whose payload lacks `tool_call_id`.
    pub tool_call_id: Option<String>,
}

impl IngestOptions {
    pub fn new(user_ref: impl Into<String>, agent_ref: impl Into<String>) -> Self {
        Self {
            user_ref: user_ref.into(),
            agent_ref: agent_ref.into(),
            model: None,
            allow_functions_style: false,
            created_at: None,
            tool_call_id: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn allow_functions_style(mut self, allow: bool) -> Self {
        self.allow_functions_style = allow;
        self
    }

    #[must_use]
    pub fn with_created_at<Tz: TimeZone>(mut self, created_at: DateTime<Tz>) -> Self {
        self.created_at = Some(created_at.with_timezone(&Utc));
        self
    }

    #[must_use]
    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    role: String,
    content: Option<ChatContent>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(default)]
    tool_call_id: Option<String>,
    #[serde(default)]
    function_call: Option<LegacyFunctionCall>,
}

/// Build a record from a raw chat-completion message object.
///
/// # Errors
/// - `BridgeError::Validation` when `role` or `content` is missing, the role is
///   unknown, a required correlation id is absent, or the result breaks a record rule.
/// - `BridgeError::DeprecatedFormat` when a deprecated shape arrives while
///   `allow_functions_style` is off.
pub fn ingest_message(
    payload: &serde_json::Value,
    opts: &IngestOptions,
    diagnostics: &mut Diagnostics,
) -> Result<MessageRecord> {
    let fields = payload
        .as_object()
        .ok_or_else(|| BridgeError::validation("message payload must be a JSON object"))?;
    for key in ["role", "content"] {
        if !fields.contains_key(key) {
            return Err(BridgeError::validation(format!(
                "message payload is missing '{key}'"
            )));
        }
    }

    let raw: RawMessage = serde_json::from_value(payload.clone())
        .map_err(|e| BridgeError::validation(format!("malformed message payload: {e}")))?;

    if raw.role == FUNCTION_ROLE {
        return ingest_function_role(raw, opts, diagnostics);
    }
    if raw.function_call.is_some() {
        return ingest_function_call(raw, opts, diagnostics);
    }
    ingest_tool_calls(raw, opts)
}

fn ingest_function_role(
    raw: RawMessage,
    opts: &IngestOptions,
    diagnostics: &mut Diagnostics,
) -> Result<MessageRecord> {
    if !opts.allow_functions_style {
        return Err(BridgeError::deprecated(
            "'function' role messages are disabled (allow_functions_style = false)",
        ));
    }
    let tool_call_id = correlation_id(&raw, opts)?;

    let mut draft = base_draft(Role::Tool, opts).with_tool_call_id(tool_call_id.as_str());
    draft.text = raw.content.as_ref().map(ChatContent::as_text);
    draft.name = raw.name;
    draft.tool_calls = raw.tool_calls.map(convert_tool_calls).transpose()?;
    let record = MessageRecord::new(draft)?;

    diagnostics.warn_with_context(
        COMPONENT,
        "converted deprecated 'function' role to 'tool'",
        json!({ "tool_call_id": tool_call_id }),
    );
    Ok(record)
}

fn ingest_function_call(
    raw: RawMessage,
    opts: &IngestOptions,
    diagnostics: &mut Diagnostics,
) -> Result<MessageRecord> {
    if !opts.allow_functions_style {
        return Err(BridgeError::deprecated(
            "'function_call' messages are disabled (allow_functions_style = false)",
        ));
    }
    if raw.role != Role::Assistant.as_str() {
        return Err(BridgeError::validation(format!(
            "'function_call' is only valid on assistant messages (role={})",
            raw.role
        )));
    }
    let call_id = correlation_id(&raw, opts)?;

    let RawMessage {
        content,
        name,
        function_call,
        ..
    } = raw;
    let function_call = function_call
        .ok_or_else(|| BridgeError::validation("'function_call' is null"))?;

    let mut draft = base_draft(Role::Assistant, opts).with_tool_calls(vec![ToolCall::function(
        call_id.as_str(),
        function_call.name,
        function_call.arguments,
    )]);
    draft.text = content.as_ref().map(ChatContent::as_text);
    draft.name = name;
    let record = MessageRecord::new(draft)?;

    diagnostics.warn_with_context(
        COMPONENT,
        "converted deprecated 'function_call' to a tool call",
        json!({ "tool_call_id": call_id }),
    );
    Ok(record)
}

fn ingest_tool_calls(raw: RawMessage, opts: &IngestOptions) -> Result<MessageRecord> {
    let role: Role = raw.role.parse()?;
    check_tool_call_id(role, raw.tool_call_id.as_deref())?;

    let tool_calls = raw
        .tool_calls
        .filter(|calls| !calls.is_empty())
        .map(convert_tool_calls)
        .transpose()?;
    if tool_calls.is_some() && role != Role::Assistant {
        return Err(BridgeError::validation(format!(
            "'tool_calls' is only valid on assistant messages (role={role})"
        )));
    }

    let mut draft = base_draft(role, opts);
    match raw.content {
        Some(ChatContent::Parts(parts)) if role == Role::User => {
            draft.text = Some(ChatContent::Parts(parts.clone()).as_text());
            draft.multimodal_content = Some(parts);
        }
        content => draft.text = content.as_ref().map(ChatContent::as_text),
    }
    draft.name = raw.name;
    draft.tool_calls = tool_calls;
    draft.tool_call_id = raw.tool_call_id;
    MessageRecord::new(draft)
}

fn base_draft(role: Role, opts: &IngestOptions) -> NewMessage {
    let mut draft = NewMessage::new(role)
        .with_user_ref(opts.user_ref.as_str())
        .with_agent_ref(opts.agent_ref.as_str());
    draft.model = opts.model.clone();
    draft.created_at = Some(opts.created_at.unwrap_or_else(Utc::now));
    draft
}

fn correlation_id(raw: &RawMessage, opts: &IngestOptions) -> Result<String> {
    raw.tool_call_id
        .clone()
        .or_else(|| opts.tool_call_id.clone())
        .ok_or_else(|| {
            BridgeError::validation(format!(
                "deprecated '{}' message needs a caller-supplied tool_call_id",
                raw.role
            ))
        })
}

fn convert_tool_calls(calls: Vec<ChatToolCall>) -> Result<Vec<ToolCall>> {
    calls
        .into_iter()
        .map(|call| {
            if call.call_type != "function" {
                return Err(BridgeError::validation(format!(
                    "unsupported tool call type '{}' on call '{}'",
                    call.call_type, call.id
                )));
            }
            Ok(ToolCall::function(
                call.id,
                call.function.name,
                call.function.arguments,
            ))
        })
        .collect()
}
