//! The canonical message record and the transformations that stay inside it:
//! validation, reasoning-text packing, and ingestion of raw provider payloads.

pub mod ingest;
mod record;
pub mod thoughts;

pub use ingest::{ingest_message, IngestOptions};
pub use record::{
    ContentPart, FunctionCall, ImageUrl, MessageCreate, MessageJson, MessageRecord, NewMessage,
    Role, ToolCall, ToolCallKind,
};
pub use thoughts::{merge_thoughts_into_call, INNER_THOUGHTS_KEY};
