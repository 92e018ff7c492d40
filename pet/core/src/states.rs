//! Pet State Catalog
//!
//! Every visual/emotional state the pet can show. A [`State`] is a plain value:
//! it is never mutated, only replaced when a new event arrives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical state identifier (also the key themes map assets by)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateId {
    /// Nothing happening
    Idle,
    /// Reading files
    Read,
    /// Editing or writing files
    Write,
    /// Running a shell command
    Bash,
    /// Searching the codebase
    Search,
    /// Delegating to a sub-agent
    Task,
    /// Fetching or searching the web
    Web,
    /// Editing a notebook
    Notebook,
    /// Last tool call succeeded
    Success,
    /// Last tool call failed
    Error,
    /// Assistant wants attention
    Notification,
    /// Assistant stopped
    Stop,
    /// A tool the catalog does not know
    Unknown,
}

impl StateId {
    /// Every state id, in catalog order
    pub const ALL: [StateId; 13] = [
        StateId::Idle,
        StateId::Read,
        StateId::Write,
        StateId::Bash,
        StateId::Search,
        StateId::Task,
        StateId::Web,
        StateId::Notebook,
        StateId::Success,
        StateId::Error,
        StateId::Notification,
        StateId::Stop,
        StateId::Unknown,
    ];

    /// Stable string form, as used in theme configs
    pub fn as_str(&self) -> &'static str {
        match self {
            StateId::Idle => "idle",
            StateId::Read => "read",
            StateId::Write => "write",
            StateId::Bash => "bash",
            StateId::Search => "search",
            StateId::Task => "task",
            StateId::Web => "web",
            StateId::Notebook => "notebook",
            StateId::Success => "success",
            StateId::Error => "error",
            StateId::Notification => "notification",
            StateId::Stop => "stop",
            StateId::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the speech bubble says for a state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bubble {
    /// No bubble
    Hidden,
    /// Localization key plus substitution variables
    Key {
        /// Message key
        key: &'static str,
        /// `{name}` → value substitutions
        vars: Vec<(&'static str, String)>,
    },
    /// Literal text, shown as-is
    Text(String),
}

impl Bubble {
    fn key(key: &'static str) -> Self {
        Bubble::Key {
            key,
            vars: Vec::new(),
        }
    }
}

/// Immutable state descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// Logical id
    pub id: StateId,
    /// Built-in glyph, used when the theme has nothing better
    pub glyph: &'static str,
    /// Animation class for the renderer
    pub animation: &'static str,
    /// Localization key for the status line
    pub status_key: &'static str,
    /// Bubble content
    pub bubble: Bubble,
}

/// One row of the tool → state table
struct ToolEntry {
    tool: &'static str,
    id: StateId,
    glyph: &'static str,
    animation: &'static str,
    bubble_key: &'static str,
    status_key: &'static str,
}

const TOOL_TABLE: &[ToolEntry] = &[
    ToolEntry { tool: "Read", id: StateId::Read, glyph: "📖", animation: "state-read", bubble_key: "reading", status_key: "statusReading" },
    ToolEntry { tool: "Edit", id: StateId::Write, glyph: "✍️", animation: "state-write", bubble_key: "editing", status_key: "statusEditing" },
    ToolEntry { tool: "Write", id: StateId::Write, glyph: "✍️", animation: "state-write", bubble_key: "writing", status_key: "statusWriting" },
    ToolEntry { tool: "Bash", id: StateId::Bash, glyph: "⚡", animation: "state-bash", bubble_key: "running", status_key: "statusRunning" },
    ToolEntry { tool: "Grep", id: StateId::Search, glyph: "🔍", animation: "state-search", bubble_key: "searching", status_key: "statusSearching" },
    ToolEntry { tool: "Glob", id: StateId::Search, glyph: "🔍", animation: "state-search", bubble_key: "finding", status_key: "statusSearching" },
    ToolEntry { tool: "Task", id: StateId::Task, glyph: "🤖", animation: "state-task", bubble_key: "agent", status_key: "statusAgent" },
    ToolEntry { tool: "WebFetch", id: StateId::Web, glyph: "🌐", animation: "state-web", bubble_key: "webFetch", status_key: "statusWeb" },
    ToolEntry { tool: "WebSearch", id: StateId::Web, glyph: "🌐", animation: "state-web", bubble_key: "webSearch", status_key: "statusWeb" },
    ToolEntry { tool: "NotebookEdit", id: StateId::Notebook, glyph: "📓", animation: "state-write", bubble_key: "notebook", status_key: "statusNotebook" },
];

impl State {
    /// Default resting state
    pub fn idle() -> Self {
        Self {
            id: StateId::Idle,
            glyph: "🤖",
            animation: "state-idle",
            status_key: "statusIdle",
            bubble: Bubble::key("idle"),
        }
    }

    /// Tool finished successfully
    pub fn success() -> Self {
        Self {
            id: StateId::Success,
            glyph: "✅",
            animation: "state-success",
            status_key: "statusDone",
            bubble: Bubble::key("success"),
        }
    }

    /// Tool failed
    pub fn error() -> Self {
        Self {
            id: StateId::Error,
            glyph: "😰",
            animation: "state-error",
            status_key: "statusError",
            bubble: Bubble::key("error"),
        }
    }

    /// Assistant wants attention; `text` is shown literally
    pub fn notification(text: String) -> Self {
        Self {
            id: StateId::Notification,
            glyph: "🙋",
            animation: "state-notification",
            status_key: "statusNotification",
            bubble: Bubble::Text(text),
        }
    }

    /// Assistant stopped
    pub fn stop() -> Self {
        Self {
            id: StateId::Stop,
            glyph: "😴",
            animation: "state-stop",
            status_key: "statusStopped",
            bubble: Bubble::key("stopped"),
        }
    }

    /// State for a tool missing from the table, carrying its name
    pub fn unknown_tool(tool: &str) -> Self {
        Self {
            id: StateId::Unknown,
            glyph: "🔧",
            animation: "state-write",
            status_key: "statusWorking",
            bubble: Bubble::Key {
                key: "toolDefault",
                vars: vec![("tool", tool.to_string())],
            },
        }
    }

    /// State for a known tool
    pub fn for_tool(tool: &str) -> Option<Self> {
        TOOL_TABLE.iter().find(|e| e.tool == tool).map(|e| Self {
            id: e.id,
            glyph: e.glyph,
            animation: e.animation,
            status_key: e.status_key,
            bubble: Bubble::key(e.bubble_key),
        })
    }

    /// Whether this state auto-reverts to idle
    pub fn is_transient(&self) -> bool {
        matches!(self.id, StateId::Success | StateId::Error | StateId::Stop)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::idle()
    }
}
