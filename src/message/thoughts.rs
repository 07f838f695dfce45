//! Packing of free-text reasoning into a tool call's arguments.
//!
//! Most chat protocols refuse an assistant turn that carries both prose and a
//! function call, so the prose travels inside the call under a reserved key.

use crate::error::Result;
use crate::message::record::ToolCall;

/// Default argument key that carries packed reasoning text.
pub const INNER_THOUGHTS_KEY: &str = "inner_thoughts";

/// Return a copy of `call` whose arguments also map `reserved_key` to `thoughts`.
///
/// `call` is left untouched. An existing value under `reserved_key` is replaced.
///
/// # Errors
/// Returns `BridgeError::ArgumentParse` when the arguments are not a JSON object.
pub fn merge_thoughts_into_call(
    call: &ToolCall,
    thoughts: &str,
    reserved_key: &str,
) -> Result<ToolCall> {
    let mut args = call.parsed_arguments()?;
    args.insert(
        reserved_key.to_string(),
        serde_json::Value::String(thoughts.to_string()),
    );

    let mut merged = call.clone();
    merged.function.arguments = serde_json::Value::Object(args).to_string();
    Ok(merged)
}
