//! Integration Test: Layering
//!
//! `pet-core` is the headless engine. It must build without any terminal UI
//! crate so other surfaces can embed it.

use std::fs;

use architectural_enforcement::{find_violations, workspace_root};

const UI_CRATES: &[&str] = &["ratatui", "crossterm"];

#[test]
fn test_core_manifest_has_no_ui_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("pet/core/Cargo.toml"))
        .expect("pet/core/Cargo.toml should exist");

    for krate in UI_CRATES {
        assert!(
            !manifest.lines().any(|l| l.trim_start().starts_with(krate)),
            "pet-core must not depend on {krate}"
        );
    }
}

#[test]
fn test_core_sources_do_not_use_ui_crates() {
    let violations = find_violations(&["pet/core/src"], &["use ratatui", "use crossterm"]);
    assert!(
        violations.is_empty(),
        "UI imports in the engine:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_hook_sender_does_not_depend_on_tui() {
    let manifest = fs::read_to_string(workspace_root().join("pet/hook/Cargo.toml"))
        .expect("pet/hook/Cargo.toml should exist");

    assert!(!manifest.contains("pet-tui"));
    for krate in UI_CRATES {
        assert!(!manifest.contains(krate), "pet-hook must not depend on {krate}");
    }
}
