use serde::{Deserialize, Serialize};

pub const USER_ROLE: &str = "USER";
pub const CHATBOT_ROLE: &str = "CHATBOT";

/// One entry of Cohere's `chat_history`. Only `role` and `message` exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohereTurn {
    pub role: String,
    pub message: String,
}

impl CohereTurn {
    pub fn new(role: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            message: message.into(),
        }
    }
}
