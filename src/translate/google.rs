//! Encode a [`MessageRecord`] as a Google `generateContent` content entry.
//!
//! Google has no system turn and no participant names, wants tool arguments as
//! native JSON objects, and rejects prose next to a function call. Reasoning text
//! therefore rides inside the single call's `args` when packing is enabled.

use serde_json::json;

use super::google_types::{
    GoogleContent, GoogleFunctionCall, GoogleFunctionResponse, GooglePart, GoogleResponseBody,
};
use crate::config::GoogleOptions;
use crate::diagnostics::Diagnostics;
use crate::error::{BridgeError, Result};
use crate::message::{merge_thoughts_into_call, MessageRecord, Role, ToolCall};

const COMPONENT: &str = "google";

/// # Errors
/// - `BridgeError::UnsupportedOperation` when an assistant turn has text and tool
///   calls but packing is off, or packing would target more than one call.
/// - `BridgeError::ArgumentParse` when tool call arguments are not a JSON object.
/// - `BridgeError::Validation` when the arguments already use the reserved key.
pub fn record_to_google(
    record: &MessageRecord,
    opts: &GoogleOptions,
    diagnostics: &mut Diagnostics,
) -> Result<GoogleContent> {
    let content = match record.role() {
        Role::System | Role::User => GoogleContent {
            role: "user".to_string(),
            parts: vec![GooglePart::Text {
                text: record.text().unwrap_or_default().to_string(),
            }],
        },
        Role::Assistant => GoogleContent {
            role: "model".to_string(),
            parts: assistant_parts(record, opts)?,
        },
        Role::Tool => return tool_response(record, diagnostics),
    };

    // only reported once the turn has encoded
    if let Some(name) = record.name() {
        diagnostics.warn_with_context(
            COMPONENT,
            "participant name is not representable and was dropped",
            json!({ "message_id": record.id(), "name": name }),
        );
    }
    Ok(content)
}

fn assistant_parts(record: &MessageRecord, opts: &GoogleOptions) -> Result<Vec<GooglePart>> {
    let calls = record.tool_calls();

    match (record.text(), calls.is_empty()) {
        (Some(text), true) => Ok(vec![GooglePart::Text {
            text: text.to_string(),
        }]),
        (None, true) => Err(BridgeError::validation(
            "assistant turn has neither text nor tool calls",
        )),
        (None, false) => calls.iter().map(function_call_part).collect(),
        (Some(_), false) if !opts.put_inner_thoughts_in_kwargs => {
            Err(BridgeError::unsupported(
                "Google cannot carry text alongside function calls; enable put_inner_thoughts_in_kwargs",
            ))
        }
        (Some(thoughts), false) => {
            let [call] = calls else {
                return Err(BridgeError::unsupported(format!(
                    "packing reasoning text needs exactly one tool call, got {}",
                    calls.len()
                )));
            };
            if call.parsed_arguments()?.contains_key(&opts.inner_thoughts_key) {
                return Err(BridgeError::validation(format!(
                    "call '{}' arguments already contain reserved key '{}'",
                    call.id, opts.inner_thoughts_key
                )));
            }
            let packed = merge_thoughts_into_call(call, thoughts, &opts.inner_thoughts_key)?;
            Ok(vec![function_call_part(&packed)?])
        }
    }
}

fn function_call_part(call: &ToolCall) -> Result<GooglePart> {
    Ok(GooglePart::FunctionCall {
        function_call: GoogleFunctionCall {
            name: call.function.name.clone(),
            args: call.parsed_arguments()?,
        },
    })
}

fn tool_response(record: &MessageRecord, diagnostics: &mut Diagnostics) -> Result<GoogleContent> {
    let tool_call_id = record
        .tool_call_id()
        .ok_or_else(|| BridgeError::validation("tool turn without tool_call_id"))?;

    let function_name = match record.name() {
        Some(name) => name.to_string(),
        None => {
            diagnostics.warn_with_context(
                COMPONENT,
                "function name missing on tool result, using tool_call_id instead",
                json!({ "message_id": record.id(), "tool_call_id": tool_call_id }),
            );
            tool_call_id.to_string()
        }
    };

    let text = record.text().unwrap_or_default();
    let content = serde_json::from_str::<serde_json::Value>(text)
        .unwrap_or_else(|_| json!({ "function_response": text }));

    Ok(GoogleContent {
        role: "function".to_string(),
        parts: vec![GooglePart::FunctionResponse {
            function_response: GoogleFunctionResponse {
                name: function_name.clone(),
                response: GoogleResponseBody {
                    name: function_name,
                    content,
                },
            },
        }],
    })
}
