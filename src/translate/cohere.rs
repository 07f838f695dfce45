//! Encode a [`MessageRecord`] as Cohere `chat_history` turns.
//!
//! Cohere turns only carry `role` and `message`, so one record can fan out:
//!
//! ```text
//! assistant "I'll send a message" + send_message("hi")
//!   -> CHATBOT: I'll send a message
//!   -> SYSTEM:  [CHATBOT called function] send_message(message=hi)
//! tool {"status": "OK"}
//!   -> SYSTEM:  [CHATBOT function returned] {"status": "OK"}
//! ```

use super::cohere_types::{CohereTurn, CHATBOT_ROLE, USER_ROLE};
use super::openai_types::ChatToolCall;
use crate::config::CohereOptions;
use crate::error::{BridgeError, Result};
use crate::message::{MessageRecord, Role, ToolCall};

/// # Errors
/// Returns `BridgeError::UnsupportedOperation` for system turns (Cohere takes
/// those through `preamble`), and `BridgeError::ArgumentParse` when a call must be
/// rendered but its arguments are not a JSON object.
pub fn record_to_cohere(record: &MessageRecord, opts: &CohereOptions) -> Result<Vec<CohereTurn>> {
    match record.role() {
        Role::System => Err(BridgeError::unsupported(
            "Cohere system content goes in the 'preamble' field, not chat_history",
        )),
        Role::User => Ok(vec![CohereTurn::new(
            USER_ROLE,
            record.text().unwrap_or_default(),
        )]),
        Role::Assistant => assistant_turns(record, opts),
        Role::Tool => {
            if record.tool_call_id().is_none() {
                return Err(BridgeError::validation("tool turn without tool_call_id"));
            }
            Ok(vec![CohereTurn::new(
                opts.function_response_role.as_str(),
                format!(
                    "{} {}",
                    opts.function_response_prefix,
                    record.text().unwrap_or_default()
                ),
            )])
        }
    }
}

fn assistant_turns(record: &MessageRecord, opts: &CohereOptions) -> Result<Vec<CohereTurn>> {
    let calls = record.tool_calls();
    let text = record.text().filter(|t| !t.is_empty());

    match (text, calls.is_empty()) {
        (Some(text), false) => {
            let mut turns = Vec::with_capacity(calls.len() + 1);
            turns.push(CohereTurn::new(CHATBOT_ROLE, text));
            for call in calls {
                turns.push(call_turn(opts, &render_call(call)?));
            }
            Ok(turns)
        }
        (None, false) => calls
            .iter()
            .map(|call| -> Result<CohereTurn> {
                let canonical = serde_json::to_string(&ChatToolCall::from(call))?;
                Ok(call_turn(opts, &canonical))
            })
            .collect(),
        (Some(text), true) => Ok(vec![CohereTurn::new(CHATBOT_ROLE, text)]),
        (None, true) => Err(BridgeError::validation(
            "assistant turn has neither text nor tool calls",
        )),
    }
}

fn call_turn(opts: &CohereOptions, body: &str) -> CohereTurn {
    CohereTurn::new(
        opts.function_call_role.as_str(),
        format!("{} {}", opts.function_call_prefix, body),
    )
}

/// `name(k=v,k2=v2)`; strings render bare, everything else as compact JSON.
fn render_call(call: &ToolCall) -> Result<String> {
    let args = call
        .parsed_arguments()?
        .into_iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => format!("{k}={s}"),
            other => format!("{k}={other}"),
        })
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!("{}({args})", call.function.name))
}
