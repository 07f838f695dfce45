//! Encoding of canonical records into provider wire formats.
//!
//! One encoder per protocol; all of them are pure functions of the record and
//! an explicit options struct. [`encode_for`] picks the encoder by [`Provider`].

pub mod anthropic;
pub mod anthropic_types;
pub mod cohere;
pub mod cohere_types;
pub mod google;
pub mod google_types;
pub mod openai;
pub mod openai_types;

pub use anthropic::record_to_anthropic;
pub use cohere::record_to_cohere;
pub use google::record_to_google;
pub use openai::{record_to_openai, record_to_search_result};

use crate::config::BridgeConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::message::MessageRecord;
use crate::providers::Provider;

/// Encode `record` for `provider` with the options held in `config`.
///
/// Cohere output is a JSON array because one record may become several turns.
///
/// # Errors
/// Whatever the selected encoder returns.
pub fn encode_for(
    provider: Provider,
    record: &MessageRecord,
    config: &BridgeConfig,
    diagnostics: &mut Diagnostics,
) -> Result<serde_json::Value> {
    let value = match provider {
        Provider::OpenAi => serde_json::to_value(record_to_openai(record, &config.openai)?)?,
        Provider::Anthropic => {
            serde_json::to_value(record_to_anthropic(record, &config.anthropic)?)?
        }
        Provider::Google => {
            serde_json::to_value(record_to_google(record, &config.google, diagnostics)?)?
        }
        Provider::Cohere => serde_json::to_value(record_to_cohere(record, &config.cohere)?)?,
    };
    Ok(value)
}
