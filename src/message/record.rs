//! The canonical conversation turn and its construction rules.
//!
//! A [`MessageRecord`] can only be obtained through [`MessageRecord::new`], which
//! enforces the role-gated field rules. Once built, a record exposes read-only
//! accessors; every transformation produces fresh values.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BridgeError, Result};

const ID_PREFIX: &str = "message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::System, Role::User, Role::Assistant, Role::Tool];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                BridgeError::validation(format!(
                    "Role must be one of system, user, assistant, tool (got '{s}')"
                ))
            })
    }
}

/// Discriminator for [`ToolCall`]. Only function calls exist today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallKind {
    #[default]
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, kept as a string.
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ToolCallKind,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ToolCallKind::Function,
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Parse the argument string into a JSON object.
    ///
    /// # Errors
    /// Returns `BridgeError::ArgumentParse` if the arguments are not valid JSON
    /// or do not encode an object.
    pub fn parsed_arguments(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        let value: serde_json::Value =
            serde_json::from_str(&self.function.arguments).map_err(|e| {
                BridgeError::argument_parse(format!(
                    "call '{}' ({}) has invalid JSON arguments: {e}",
                    self.id, self.function.name
                ))
            })?;
        match value {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(BridgeError::argument_parse(format!(
                "call '{}' ({}) arguments must be a JSON object, got {other}",
                self.id, self.function.name
            ))),
        }
    }
}

/// One block of multimodal user content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Draft of a record. Nothing is checked until it is passed to [`MessageRecord::new`].
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub role: Role,
    pub id: Option<String>,
    pub text: Option<String>,
    pub multimodal_content: Option<Vec<ContentPart>>,
    pub user_ref: Option<String>,
    pub agent_ref: Option<String>,
    pub model: Option<String>,
    pub name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub tool_call_id: Option<String>,
}

impl NewMessage {
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            id: None,
            text: None,
            multimodal_content: None,
            user_ref: None,
            agent_ref: None,
            model: None,
            name: None,
            created_at: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Reuse an identifier assigned elsewhere instead of generating one.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_multimodal_content(mut self, parts: Vec<ContentPart>) -> Self {
        self.multimodal_content = Some(parts);
        self
    }

    #[must_use]
    pub fn with_user_ref(mut self, user_ref: impl Into<String>) -> Self {
        self.user_ref = Some(user_ref.into());
        self
    }

    #[must_use]
    pub fn with_agent_ref(mut self, agent_ref: impl Into<String>) -> Self {
        self.agent_ref = Some(agent_ref.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Any zone is accepted; the instant is stored in UTC.
    #[must_use]
    pub fn with_created_at<Tz: TimeZone>(mut self, created_at: DateTime<Tz>) -> Self {
        self.created_at = Some(created_at.with_timezone(&Utc));
        self
    }

    /// A timestamp without an offset is read as UTC.
    #[must_use]
    pub fn with_naive_created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(Utc.from_utc_datetime(&created_at));
        self
    }

    #[must_use]
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }

    #[must_use]
    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }
}

/// A single validated conversational turn.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    id: String,
    role: Role,
    text: Option<String>,
    multimodal_content: Option<Vec<ContentPart>>,
    user_ref: Option<String>,
    agent_ref: Option<String>,
    model: Option<String>,
    name: Option<String>,
    created_at: DateTime<Utc>,
    tool_calls: Option<Vec<ToolCall>>,
    tool_call_id: Option<String>,
}

impl MessageRecord {
    /// Validate a draft and freeze it into a record.
    ///
    /// # Errors
    /// Returns `BridgeError::Validation` when `tool_call_id` is present on a
    /// non-tool turn or missing on a tool turn, when tool calls are attached to a
    /// non-assistant turn, or when text is missing and no tool calls stand in for it.
    pub fn new(draft: NewMessage) -> Result<Self> {
        let NewMessage {
            role,
            id,
            text,
            multimodal_content,
            user_ref,
            agent_ref,
            model,
            name,
            created_at,
            tool_calls,
            tool_call_id,
        } = draft;

        check_tool_call_id(role, tool_call_id.as_deref())?;

        let tool_calls = tool_calls.filter(|calls| !calls.is_empty());
        if tool_calls.is_some() && role != Role::Assistant {
            return Err(BridgeError::validation(format!(
                "tool_calls are only valid on assistant turns (role={role})"
            )));
        }

        if text.is_none() && tool_calls.is_none() {
            return Err(BridgeError::validation(match role {
                Role::Assistant => "assistant turn needs text or tool_calls".to_string(),
                _ => format!("text is required for role={role}"),
            }));
        }

        Ok(Self {
            id: id.unwrap_or_else(|| format!("{ID_PREFIX}-{}", Uuid::new_v4())),
            role,
            text,
            multimodal_content,
            user_ref,
            agent_ref,
            model,
            name,
            created_at: created_at.unwrap_or_else(Utc::now),
            tool_calls,
            tool_call_id,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Multimodal blocks; always `None` unless this is a user turn.
    #[must_use]
    pub fn multimodal_content(&self) -> Option<&[ContentPart]> {
        match self.role {
            Role::User => self.multimodal_content.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn user_ref(&self) -> Option<&str> {
        self.user_ref.as_deref()
    }

    #[must_use]
    pub fn agent_ref(&self) -> Option<&str> {
        self.agent_ref.as_deref()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Tool calls; always empty unless this is an assistant turn.
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self.role {
            Role::Assistant => self.tool_calls.as_deref().unwrap_or(&[]),
            _ => &[],
        }
    }

    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }

    #[must_use]
    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }

    /// JSON-safe projection of the record.
    #[must_use]
    pub fn to_json(&self) -> MessageJson {
        MessageJson {
            id: self.id.clone(),
            role: self.role,
            text: self.text.clone(),
            multimodal_content: self.multimodal_content().map(<[ContentPart]>::to_vec),
            user_ref: self.user_ref.clone(),
            agent_ref: self.agent_ref.clone(),
            model: self.model.clone(),
            name: self.name.clone(),
            created_at: self
                .created_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, false),
            tool_calls: self.tool_calls.clone(),
            tool_call_id: self.tool_call_id.clone(),
        }
    }
}

/// Both directions of the `tool_call_id` rule: present on tool turns, absent elsewhere.
pub(crate) fn check_tool_call_id(role: Role, tool_call_id: Option<&str>) -> Result<()> {
    match (role, tool_call_id) {
        (Role::Tool, None) => Err(BridgeError::validation(
            "tool_call_id is required for role=tool",
        )),
        (Role::Tool, Some(_)) | (_, None) => Ok(()),
        (other, Some(id)) => Err(BridgeError::validation(format!(
            "tool_call_id must be null for role={other} (got '{id}')"
        ))),
    }
}

/// Flattened, serializable view of a [`MessageRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageJson {
    pub id: String,
    pub role: Role,
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multimodal_content: Option<Vec<ContentPart>>,
    pub user_ref: Option<String>,
    pub agent_ref: Option<String>,
    pub model: Option<String>,
    pub name: Option<String>,
    /// ISO-8601, always with a `+00:00` offset.
    pub created_at: String,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub tool_call_id: Option<String>,
}

/// Minimal outbound draft as accepted from API callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreate {
    pub role: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MessageCreate {
    /// # Errors
    /// Returns `BridgeError::Validation` for an unknown role, or for `tool`,
    /// which cannot be drafted without a correlation id.
    pub fn into_record(
        self,
        user_ref: impl Into<String>,
        agent_ref: impl Into<String>,
    ) -> Result<MessageRecord> {
        let role: Role = self.role.parse()?;
        let mut draft = NewMessage::new(role)
            .with_text(self.text)
            .with_user_ref(user_ref)
            .with_agent_ref(agent_ref);
        draft.name = self.name;
        MessageRecord::new(draft)
    }
}
