use message_bridge::config::{BridgeConfig, CohereOptions, GoogleOptions, OpenAiOptions};
use message_bridge::diagnostics::Diagnostics;
use message_bridge::message::{
    ingest_message, IngestOptions, MessageRecord, NewMessage, Role, ToolCall, INNER_THOUGHTS_KEY,
};
use message_bridge::translate::{
    record_to_anthropic, record_to_cohere, record_to_google, record_to_openai,
};
use message_bridge::{encode_for, BridgeError, Provider};
use serde_json::json;

fn ingest_opts() -> IngestOptions {
    IngestOptions::new("user-00000001", "agent-00000001")
}

fn assistant(text: Option<&str>, calls: Vec<ToolCall>) -> MessageRecord {
    let mut draft = NewMessage::new(Role::Assistant).with_tool_calls(calls);
    draft.text = text.map(str::to_string);
    MessageRecord::new(draft).unwrap()
}

// ────────────────────────────────────────────────────────────────
// Record invariants
// ────────────────────────────────────────────────────────────────

#[test]
fn test_tool_call_id_present_iff_tool_role() {
    for role in Role::ALL {
        let with_id = MessageRecord::new(
            NewMessage::new(role)
                .with_text("x")
                .with_tool_call_id("call_1"),
        );
        let without_id = MessageRecord::new(NewMessage::new(role).with_text("x"));

        if role == Role::Tool {
            assert_eq!(with_id.unwrap().tool_call_id(), Some("call_1"));
            assert!(matches!(without_id, Err(BridgeError::Validation { .. })));
        } else {
            assert!(matches!(with_id, Err(BridgeError::Validation { .. })));
            assert!(without_id.unwrap().tool_call_id().is_none());
        }
    }
}

// ────────────────────────────────────────────────────────────────
// Ingest → OpenAI round trip
// ────────────────────────────────────────────────────────────────

#[test]
fn test_openai_round_trip_for_plain_roles() {
    let payloads = [
        json!({"role": "system", "content": "You are MemGPT."}),
        json!({"role": "user", "content": "hello there"}),
        json!({"role": "tool", "content": "{\"status\": \"OK\"}", "tool_call_id": "call_abc"}),
    ];

    for payload in payloads {
        let record = ingest_message(&payload, &ingest_opts(), &mut Diagnostics::new()).unwrap();
        let encoded =
            serde_json::to_value(record_to_openai(&record, &OpenAiOptions::default()).unwrap())
                .unwrap();

        assert_eq!(encoded["role"], payload["role"]);
        assert_eq!(encoded["content"], payload["content"]);
        assert_eq!(encoded.get("tool_call_id"), payload.get("tool_call_id"));
    }
}

// ────────────────────────────────────────────────────────────────
// Packing
// ────────────────────────────────────────────────────────────────

#[test]
fn test_openai_packing_law() {
    let rec = assistant(
        Some("the user wants cats"),
        vec![ToolCall::function("call_1", "search", r#"{"q":"cats"}"#)],
    );
    let msg = record_to_openai(&rec, &OpenAiOptions::default()).unwrap();
    let args: serde_json::Value =
        serde_json::from_str(&msg.tool_calls.unwrap()[0].function.arguments).unwrap();
    assert_eq!(args[INNER_THOUGHTS_KEY], "the user wants cats");
    assert!(msg.content.is_none());
}

#[test]
fn test_google_packing_law() {
    let rec = assistant(
        Some("the user wants cats"),
        vec![ToolCall::function("call_1", "search", r#"{"q":"cats"}"#)],
    );
    let opts = GoogleOptions {
        inner_thoughts_key: "reasoning".to_string(),
        ..GoogleOptions::default()
    };
    let content = record_to_google(&rec, &opts, &mut Diagnostics::new()).unwrap();
    let value = serde_json::to_value(content).unwrap();
    assert_eq!(
        value["parts"][0]["functionCall"]["args"]["reasoning"],
        "the user wants cats"
    );
}

#[test]
fn test_google_single_call_packing_shape() {
    let rec = assistant(
        Some("searching"),
        vec![ToolCall::function("call_1", "search", r#"{"q":"cats"}"#)],
    );
    let content = record_to_google(&rec, &GoogleOptions::default(), &mut Diagnostics::new())
        .unwrap();
    assert_eq!(
        serde_json::to_value(content).unwrap(),
        json!({
            "role": "model",
            "parts": [{"functionCall": {"name": "search", "args": {"q": "cats", "inner_thoughts": "searching"}}}]
        })
    );
}

// ────────────────────────────────────────────────────────────────
// Truncation
// ────────────────────────────────────────────────────────────────

#[test]
fn test_openai_truncates_forty_char_ids_to_eight() {
    let long_id = "abcdefghij".repeat(4);
    assert_eq!(long_id.len(), 40);
    let opts = OpenAiOptions {
        max_tool_id_length: 8,
        ..OpenAiOptions::default()
    };

    let rec = assistant(Some("t"), vec![ToolCall::function(long_id.as_str(), "f", "{}")]);
    let call_id = record_to_openai(&rec, &opts).unwrap().tool_calls.unwrap()[0]
        .id
        .clone();
    assert_eq!(call_id.len(), 8);
    assert!(long_id.starts_with(&call_id));

    let tool = MessageRecord::new(
        NewMessage::new(Role::Tool)
            .with_text("ok")
            .with_tool_call_id(long_id.as_str()),
    )
    .unwrap();
    let result_id = record_to_openai(&tool, &opts).unwrap().tool_call_id.unwrap();
    assert_eq!(result_id, &long_id[..8]);
    assert_eq!(tool.tool_call_id(), Some(long_id.as_str()));
}

// ────────────────────────────────────────────────────────────────
// Legacy ingest
// ────────────────────────────────────────────────────────────────

#[test]
fn test_legacy_function_role_ingest() {
    let record = ingest_message(
        &json!({"role": "function", "content": "ok", "name": "foo", "tool_call_id": "tc1"}),
        &ingest_opts().allow_functions_style(true),
        &mut Diagnostics::new(),
    )
    .unwrap();
    assert_eq!(record.role(), Role::Tool);
    assert_eq!(record.text(), Some("ok"));
    assert_eq!(record.name(), Some("foo"));
    assert_eq!(record.tool_call_id(), Some("tc1"));
}

// ────────────────────────────────────────────────────────────────
// Cohere fan-out, Anthropic rejection
// ────────────────────────────────────────────────────────────────

#[test]
fn test_cohere_fan_out() {
    let rec = assistant(
        Some("ok"),
        vec![ToolCall::function("call_1", "send_message", r#"{"message":"hi"}"#)],
    );
    let opts = CohereOptions::default();
    let turns = record_to_cohere(&rec, &opts).unwrap();

    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, "CHATBOT");
    assert_eq!(turns[0].message, "ok");
    assert_eq!(turns[1].role, opts.function_call_role);
    assert_eq!(
        turns[1].message,
        format!("{} send_message(message=hi)", opts.function_call_prefix)
    );
}

#[test]
fn test_anthropic_system_always_rejected() {
    let rec = MessageRecord::new(
        NewMessage::new(Role::System)
            .with_text("persona")
            .with_name("core"),
    )
    .unwrap();
    let err = record_to_anthropic(&rec, &Default::default()).unwrap_err();
    assert!(matches!(err, BridgeError::UnsupportedOperation { .. }));
}

// ────────────────────────────────────────────────────────────────
// Concurrency
// ────────────────────────────────────────────────────────────────

#[test]
fn test_parallel_encodes_share_one_record() {
    let rec = assistant(
        Some("thinking"),
        vec![ToolCall::function("call_1", "search", r#"{"q":"cats"}"#)],
    );
    let config = BridgeConfig::default();

    let results: Vec<serde_json::Value> = std::thread::scope(|s| {
        let handles: Vec<_> = [Provider::OpenAi, Provider::Anthropic, Provider::Google, Provider::Cohere]
            .into_iter()
            .map(|provider| {
                let rec = &rec;
                let config = &config;
                s.spawn(move || {
                    encode_for(provider, rec, config, &mut Diagnostics::new()).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.len(), 4);
    assert_eq!(rec.tool_calls()[0].function.arguments, r#"{"q":"cats"}"#);
}

// ────────────────────────────────────────────────────────────────
// Full conversation through every provider
// ────────────────────────────────────────────────────────────────

#[test]
fn test_conversation_through_every_provider() {
    let conversation = json!([
        {"role": "user", "content": "send a greeting"},
        {
            "role": "assistant",
            "content": "I will greet them",
            "tool_calls": [{"id": "call_1", "type": "function", "function": {"name": "send_message", "arguments": "{\"message\":\"hi\"}"}}]
        },
        {"role": "tool", "content": "{\"status\":\"OK\"}", "tool_call_id": "call_1", "name": "send_message"}
    ]);
    let config = BridgeConfig::default();

    let records: Vec<MessageRecord> = conversation
        .as_array()
        .unwrap()
        .iter()
        .map(|p| ingest_message(p, &ingest_opts(), &mut Diagnostics::new()).unwrap())
        .collect();

    for provider in Provider::all() {
        let mut diags = Diagnostics::new();
        for record in &records {
            encode_for(provider, record, &config, &mut diags).unwrap();
        }
        assert!(diags.is_empty(), "{provider} produced diagnostics");
    }

    let anthropic_tool = encode_for(Provider::Anthropic, &records[2], &config, &mut Diagnostics::new())
        .unwrap();
    assert_eq!(anthropic_tool["role"], "user");
    assert_eq!(anthropic_tool["content"][0]["tool_use_id"], "call_1");

    let google_tool = encode_for(Provider::Google, &records[2], &config, &mut Diagnostics::new())
        .unwrap();
    assert_eq!(
        google_tool["parts"][0]["functionResponse"]["response"]["content"]["status"],
        "OK"
    );
}
