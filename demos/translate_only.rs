//! Ingest a short conversation and print it in every supported wire format.
//!
//! Usage:
//!   `cargo run --example translate_only`

use message_bridge::{encode_for, ingest_message, BridgeConfig, Diagnostics, IngestOptions, Provider};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // OpenAI-shaped payloads, as a provider would return them
    let conversation = [
        json!({"role": "user", "content": "What's the weather in London?"}),
        json!({
            "role": "assistant",
            "content": "The user wants the weather, I should call the tool.",
            "tool_calls": [{
                "id": "call_8f2a1c9e4b7d4e0fa6c3d2b1e0f9a8c7",
                "type": "function",
                "function": {"name": "get_weather", "arguments": "{\"city\":\"London\"}"}
            }]
        }),
        json!({
            "role": "tool",
            "name": "get_weather",
            "content": "{\"temp_c\": 14, \"sky\": \"overcast\"}",
            "tool_call_id": "call_8f2a1c9e4b7d4e0fa6c3d2b1e0f9a8c7"
        }),
    ];

    let opts = IngestOptions::new("user-demo", "agent-demo").with_model("gpt-4o");
    let config = BridgeConfig::default();
    let mut diagnostics = Diagnostics::new();

    let records = conversation
        .iter()
        .map(|payload| ingest_message(payload, &opts, &mut diagnostics))
        .collect::<Result<Vec<_>, _>>()?;

    println!("=== Canonical records ===");
    for record in &records {
        println!("{}", serde_json::to_string_pretty(&record.to_json())?);
    }

    for provider in Provider::all() {
        println!("\n=== {provider} ===");
        for record in &records {
            let wire = encode_for(provider, record, &config, &mut diagnostics)?;
            println!("{}", serde_json::to_string_pretty(&wire)?);
        }
    }

    for d in diagnostics.entries() {
        println!("[{:?}] {}: {}", d.level, d.component, d.message);
    }

    Ok(())
}
