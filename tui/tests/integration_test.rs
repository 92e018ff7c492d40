//! Integration tests for the terminal widget
//!
//! Drives [`App`] with a manual clock and draws into ratatui's `TestBackend`,
//! using the themes and locales shipped in the repository.

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use pet_core::{
    DirLocaleSource, DirThemeSource, HookEvent, ManualClock, MemoryPreferences, Pet, PetConfig,
};
use pet_tui::{App, DisplayState};
use pretty_assertions::assert_eq;

const T0: u64 = 1_000_000;

fn repo_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join(name)
}

async fn app() -> (App<ManualClock>, ManualClock, mpsc::Sender<HookEvent>) {
    let clock = ManualClock::new(T0);
    let mut pet = Pet::new(
        &PetConfig::default(),
        clock.clone(),
        DisplayState::new(),
        Box::new(MemoryPreferences::new()),
        Box::new(DirThemeSource::new(Some(repo_dir("themes")), None)),
    );
    pet.initialize(&DirLocaleSource::new(repo_dir("locales"))).await;

    let (tx, rx) = mpsc::channel(8);
    (App::new(pet, rx), clock, tx)
}

fn terminal() -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(64, 14)).unwrap()
}

fn screen(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

#[tokio::test]
async fn test_first_frame_is_idle() {
    let (mut app, _, _tx) = app().await;
    let mut term = terminal();
    app.draw(&mut term).unwrap();

    let text = screen(&term);
    assert!(text.contains("claude-pet"));
    assert!(text.contains("Idle"));
    assert!(text.contains("q Quit"));
    assert!(!app.pet().renderer().is_dirty());
}

#[tokio::test]
async fn test_tool_use_shows_bubble_and_status() {
    let (mut app, _, _tx) = app().await;
    let mut term = terminal();

    app.handle_hook_event(HookEvent::pre_tool_use("s1", "Read"));
    assert!(app.pet().renderer().is_dirty());
    app.draw(&mut term).unwrap();

    let text = screen(&term);
    assert!(text.contains("Reading files..."));
    assert!(text.contains("Reading"));
    assert!(!text.contains("[A]"));
}

#[tokio::test]
async fn test_several_sessions_are_labeled() {
    let (mut app, clock, _tx) = app().await;
    let mut term = terminal();

    app.handle_hook_event(HookEvent::pre_tool_use("s1", "Read"));
    clock.advance(Duration::from_millis(10));
    app.handle_hook_event(HookEvent::stop("s2"));
    app.draw(&mut term).unwrap();

    let text = screen(&term);
    assert!(text.contains("[A]"));
    assert!(text.contains("[B]"));
    assert!(text.contains("[B] All done, napping"));
    assert!(text.contains("Stopped"));
}

#[tokio::test]
async fn test_success_reverts_after_deadline() {
    let (mut app, clock, _tx) = app().await;
    let mut term = terminal();

    app.handle_hook_event(HookEvent::pre_tool_use("s1", "Bash"));
    app.handle_hook_event(HookEvent::post_tool_use("s1", None));
    app.draw(&mut term).unwrap();
    assert!(screen(&term).contains("Done!"));

    // Not due yet
    clock.advance(Duration::from_millis(1_000));
    app.on_deadline();
    assert!(!app.pet().renderer().is_dirty());

    clock.advance(Duration::from_millis(500));
    app.on_deadline();
    app.draw(&mut term).unwrap();
    let text = screen(&term);
    assert!(!text.contains("Done!"));
    assert!(text.contains("Idle"));
}

#[tokio::test]
async fn test_theme_key_switches_glyphs() {
    let (mut app, _, _tx) = app().await;
    let mut term = terminal();
    assert_eq!(app.pet().themes().current_theme_id(), "default");

    app.handle_key(key('t')).await;
    assert_eq!(app.pet().themes().current_theme_id(), "terminal");
    app.draw(&mut term).unwrap();
    assert!(screen(&term).contains(">_"));

    // Wraps around
    app.handle_key(key('t')).await;
    assert_eq!(app.pet().themes().current_theme_id(), "default");
}

#[tokio::test]
async fn test_language_key_cycles() {
    let (mut app, _, _tx) = app().await;
    app.handle_key(key('l')).await;
    assert_eq!(app.pet().i18n().language(), "ko");
    assert!(app.pet().renderer().is_dirty());

    app.handle_key(key('l')).await;
    assert_eq!(app.pet().i18n().language(), "en");
}

#[tokio::test]
async fn test_focus_mode_hides_sessions_and_ignores_events() {
    let (mut app, _, _tx) = app().await;
    let mut term = terminal();

    app.handle_hook_event(HookEvent::pre_tool_use("s1", "Read"));
    app.handle_key(key('f')).await;
    assert!(app.pet().is_quiet());
    assert!(app.pet().sessions().is_empty());

    app.handle_hook_event(HookEvent::pre_tool_use("s2", "Edit"));
    assert!(app.pet().sessions().is_empty());

    app.draw(&mut term).unwrap();
    let text = screen(&term);
    let title = text.lines().next().unwrap();
    assert!(title.contains("Focus mode"));
    assert!(!text.contains("Editing code..."));

    app.handle_key(key('f')).await;
    assert!(!app.pet().is_quiet());
    app.handle_hook_event(HookEvent::pre_tool_use("s2", "Edit"));
    assert_eq!(app.pet().sessions().len(), 1);
}

#[tokio::test]
async fn test_reset_key_drops_sessions() {
    let (mut app, _, _tx) = app().await;
    app.handle_hook_event(HookEvent::pre_tool_use("s1", "Read"));
    app.handle_hook_event(HookEvent::pre_tool_use("s2", "Grep"));

    app.handle_key(key('r')).await;
    assert!(app.pet().sessions().is_empty());
    assert!(app.is_running());
}

#[tokio::test]
async fn test_quit_keys() {
    for quit in [
        key('q'),
        KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
    ] {
        let (mut app, _, _tx) = app().await;
        app.handle_key(quit).await;
        assert!(!app.is_running());
    }
}
