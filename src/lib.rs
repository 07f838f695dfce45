pub mod config;
pub mod diagnostics;
pub mod error;
pub mod message;
pub mod providers;
pub mod translate;

pub use config::BridgeConfig;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{BridgeError, Result};
pub use message::{ingest_message, IngestOptions, MessageRecord, NewMessage, Role, ToolCall};
pub use providers::Provider;
pub use translate::encode_for;
