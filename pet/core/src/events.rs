//! Hook Events
//!
//! Lifecycle and tool-usage events delivered by the coding assistant's hooks.
//!
//! # Design Philosophy
//!
//! The wire payload is loose: any field may be missing, null, or of the wrong
//! JSON type. [`HookEvent`] absorbs all of that at decode time (a wrongly-typed
//! field is simply absent), and [`HookEvent::into_envelope`] turns it into a
//! tagged [`EventKind`] so nothing downstream has to sniff shapes.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Session id used when the event does not name one
pub const UNKNOWN_SESSION_ID: &str = "unknown";

/// Hook name for "a tool is about to run"
pub const PRE_TOOL_USE: &str = "PreToolUse";
/// Hook name for "a tool finished"
pub const POST_TOOL_USE: &str = "PostToolUse";
/// Hook name for "the assistant wants attention"
pub const NOTIFICATION: &str = "Notification";
/// Hook name for "the assistant stopped"
pub const STOP: &str = "Stop";

/// Hook names the companion subscribes to
pub const SUBSCRIBED_HOOKS: &[&str] = &[PRE_TOOL_USE, POST_TOOL_USE, NOTIFICATION, STOP];

/// Errors decoding an inbound payload
#[derive(Debug, Error)]
pub enum EventError {
    /// Payload is not a JSON object
    #[error("Malformed hook payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Raw hook payload as delivered by the transport
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HookEvent {
    /// Session that produced the event
    #[serde(
        default,
        alias = "sessionId",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<String>,

    /// Hook kind (`PreToolUse`, `PostToolUse`, ...)
    #[serde(
        default,
        alias = "hookEventName",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub hook_event_name: Option<String>,

    /// Tool name for tool hooks
    #[serde(
        default,
        alias = "toolName",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_name: Option<String>,

    /// Tool result for `PostToolUse`, any JSON shape
    #[serde(
        default,
        alias = "toolResponse",
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_response: Option<serde_json::Value>,

    /// Notification body
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
}

/// Treat null, empty strings and non-string values as absent
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

impl HookEvent {
    /// Decode a payload received from the transport
    pub fn parse(bytes: &[u8]) -> Result<Self, EventError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Build a `PreToolUse` event
    pub fn pre_tool_use(session_id: &str, tool: &str) -> Self {
        Self {
            session_id: Some(session_id.to_string()),
            hook_event_name: Some(PRE_TOOL_USE.to_string()),
            tool_name: Some(tool.to_string()),
            ..Self::default()
        }
    }

    /// Build a `PostToolUse` event with an optional response payload
    pub fn post_tool_use(session_id: &str, response: Option<serde_json::Value>) -> Self {
        Self {
            session_id: Some(session_id.to_string()),
            hook_event_name: Some(POST_TOOL_USE.to_string()),
            tool_response: response,
            ..Self::default()
        }
    }

    /// Build a `Notification` event
    pub fn notification(session_id: &str, message: Option<&str>) -> Self {
        Self {
            session_id: Some(session_id.to_string()),
            hook_event_name: Some(NOTIFICATION.to_string()),
            message: message.map(str::to_string),
            ..Self::default()
        }
    }

    /// Build a `Stop` event
    pub fn stop(session_id: &str) -> Self {
        Self {
            session_id: Some(session_id.to_string()),
            hook_event_name: Some(STOP.to_string()),
            ..Self::default()
        }
    }

    /// Session id, defaulting to [`UNKNOWN_SESSION_ID`]
    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or(UNKNOWN_SESSION_ID)
    }

    /// Validate into a tagged envelope
    pub fn into_envelope(self) -> Envelope {
        let session_id = self
            .session_id
            .unwrap_or_else(|| UNKNOWN_SESSION_ID.to_string());

        let kind = match self.hook_event_name.as_deref() {
            Some(PRE_TOOL_USE) => EventKind::PreToolUse {
                tool: self.tool_name.unwrap_or_default(),
            },
            Some(POST_TOOL_USE) => EventKind::PostToolUse {
                outcome: ToolOutcome::from_response(self.tool_response.as_ref()),
            },
            Some(NOTIFICATION) => EventKind::Notification {
                message: self.message,
            },
            Some(STOP) => EventKind::Stop,
            _ => EventKind::Other {
                name: self.hook_event_name,
            },
        };

        Envelope { session_id, kind }
    }
}

/// Outcome of a finished tool call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Tool succeeded (or reported nothing)
    Success,
    /// Tool reported `success: false`
    Failure,
}

impl ToolOutcome {
    /// Failure iff the response is an object whose `success` is exactly `false`
    pub fn from_response(response: Option<&serde_json::Value>) -> Self {
        let failed = response
            .and_then(serde_json::Value::as_object)
            .and_then(|obj| obj.get("success"))
            .and_then(serde_json::Value::as_bool)
            == Some(false);

        if failed {
            Self::Failure
        } else {
            Self::Success
        }
    }
}

/// Decoded event kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// A tool is about to run
    PreToolUse {
        /// Tool name (empty when the payload omitted it)
        tool: String,
    },
    /// A tool finished
    PostToolUse {
        /// How it went
        outcome: ToolOutcome,
    },
    /// The assistant wants attention
    Notification {
        /// Body, if any
        message: Option<String>,
    },
    /// The assistant stopped
    Stop,
    /// Anything else, including a missing hook name
    Other {
        /// Raw hook name, if any
        name: Option<String>,
    },
}

/// A validated event bound to its session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Session id (never empty)
    pub session_id: String,
    /// What happened
    pub kind: EventKind,
}
