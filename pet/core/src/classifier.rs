//! Event Classifier
//!
//! Maps a decoded event to the [`State`] the pet should show. Total: every
//! input produces a state, unknown input degrades to idle or the unknown-tool
//! state.

use crate::events::{EventKind, ToolOutcome};
use crate::i18n::Localizer;
use crate::states::State;

/// Longest notification text shown before truncating
pub const NOTIFICATION_MAX_CHARS: usize = 25;

/// Classify an event kind into a state
pub fn classify(kind: &EventKind, i18n: &Localizer) -> State {
    match kind {
        EventKind::PreToolUse { tool } => {
            State::for_tool(tool).unwrap_or_else(|| State::unknown_tool(tool))
        }
        EventKind::PostToolUse { outcome } => match outcome {
            ToolOutcome::Success => State::success(),
            ToolOutcome::Failure => State::error(),
        },
        EventKind::Notification { message } => {
            let text = message
                .as_deref()
                .filter(|m| !m.is_empty())
                .map_or_else(|| i18n.t("notification"), str::to_string);
            State::notification(truncate(&text))
        }
        EventKind::Stop => State::stop(),
        EventKind::Other { .. } => State::idle(),
    }
}

/// Shorten to [`NOTIFICATION_MAX_CHARS`] characters plus `...`
fn truncate(text: &str) -> String {
    match text.char_indices().nth(NOTIFICATION_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::HookEvent;
    use crate::states::{Bubble, StateId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn classify_hook(event: HookEvent) -> State {
        classify(&event.into_envelope().kind, &Localizer::new())
    }

    #[test]
    fn test_pre_tool_use_known_tool() {
        let state = classify_hook(HookEvent::pre_tool_use("s1", "Bash"));
        assert_eq!(state.id, StateId::Bash);
    }

    #[test]
    fn test_pre_tool_use_unknown_tool() {
        for tool in ["mcp__github__create_issue", "TodoWrite", "bash"] {
            let state = classify_hook(HookEvent::pre_tool_use("s1", tool));
            assert_eq!(state.id, StateId::Unknown);
            assert_eq!(
                state.bubble,
                Bubble::Key {
                    key: "toolDefault",
                    vars: vec![("tool", tool.to_string())],
                }
            );
        }
    }

    #[test]
    fn test_pre_tool_use_without_tool_name() {
        let state = classify(
            &EventKind::PreToolUse {
                tool: String::new(),
            },
            &Localizer::new(),
        );
        assert_eq!(state.id, StateId::Unknown);
    }

    #[test]
    fn test_post_tool_use_outcomes() {
        let ok = classify_hook(HookEvent::post_tool_use("s1", Some(json!({"success": true}))));
        assert_eq!(ok.id, StateId::Success);

        let missing = classify_hook(HookEvent::post_tool_use("s1", None));
        assert_eq!(missing.id, StateId::Success);

        let failed =
            classify_hook(HookEvent::post_tool_use("s1", Some(json!({"success": false}))));
        assert_eq!(failed.id, StateId::Error);

        let outcome = EventKind::PostToolUse {
            outcome: ToolOutcome::Failure,
        };
        assert_eq!(classify(&outcome, &Localizer::new()).id, StateId::Error);
    }

    #[test]
    fn test_notification_short_message_is_literal() {
        let state = classify_hook(HookEvent::notification("s1", Some("Approve edit?")));
        assert_eq!(state.id, StateId::Notification);
        assert_eq!(state.bubble, Bubble::Text("Approve edit?".to_string()));
    }

    #[test]
    fn test_notification_long_message_is_truncated() {
        let state = classify_hook(HookEvent::notification(
            "s1",
            Some("Claude needs your permission to use Bash"),
        ));
        assert_eq!(
            state.bubble,
            Bubble::Text("Claude needs your permiss...".to_string())
        );
    }

    #[test]
    fn test_notification_exactly_max_is_not_truncated() {
        let text = "a".repeat(NOTIFICATION_MAX_CHARS);
        let state = classify_hook(HookEvent::notification("s1", Some(&text)));
        assert_eq!(state.bubble, Bubble::Text(text));
    }

    #[test]
    fn test_notification_truncation_counts_characters() {
        let text = "가".repeat(30);
        let state = classify_hook(HookEvent::notification("s1", Some(&text)));
        assert_eq!(state.bubble, Bubble::Text(format!("{}...", "가".repeat(25))));
    }

    #[test]
    fn test_notification_without_message_is_localized() {
        let state = classify_hook(HookEvent::notification("s1", None));
        assert_eq!(state.bubble, Bubble::Text("Need your input!".to_string()));
    }

    #[test]
    fn test_stop_and_other() {
        assert_eq!(classify_hook(HookEvent::stop("s1")).id, StateId::Stop);
        assert_eq!(classify_hook(HookEvent::default()).id, StateId::Idle);

        let other = HookEvent::parse(br#"{"hook_event_name":"UserPromptSubmit"}"#).unwrap();
        assert_eq!(classify_hook(other).id, StateId::Idle);
    }
}
