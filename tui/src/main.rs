//! Pet TUI Entry Point
//!
//! Starts the hook listener and the terminal widget.
//!
//! Usage:
//!   pet-tui [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>     Configuration file (env: PET_CONFIG)
//!   -p, --port <PORT>       Listen port
//!   --themes-dir <DIR>      Built-in themes directory
//!   --locales-dir <DIR>     Locale files directory
//!   --log-file <FILE>       Log file (default: <cache dir>/claude-pet/pet-tui.log)

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use pet_core::config::{load_config_from_path, ConfigSource, PetConfig};
use pet_core::{
    DirLocaleSource, DirThemeSource, EventListener, FilePreferences, MemoryPreferences, Pet,
    Preferences, SystemClock,
};
use pet_tui::{App, DisplayState};

/// Buffered hook events between listener and UI
const EVENT_CHANNEL_SIZE: usize = 256;

/// Pet TUI - a desk pet for your coding assistant
#[derive(Parser, Debug)]
#[command(name = "pet-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "PET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen port (overrides config)
    #[arg(short = 'p', long, value_name = "PORT")]
    port: Option<u16>,

    /// Built-in themes directory (overrides config)
    #[arg(long, value_name = "DIR")]
    themes_dir: Option<PathBuf>,

    /// Locale files directory (overrides config)
    #[arg(long, value_name = "DIR")]
    locales_dir: Option<PathBuf>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Log to a file; stderr would corrupt the alternate screen
fn init_logging(path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    let Some(path) = path.or_else(|| {
        dirs::cache_dir().map(|d| d.join("claude-pet").join("pet-tui.log"))
    }) else {
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pet_tui=info,pet_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(Some(path))
}

fn load_config(args: &Args) -> Result<PetConfig> {
    let path = args
        .config
        .clone()
        .or_else(pet_core::config::default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    if let Some(port) = args.port {
        config.port = port;
        config.set_source(ConfigSource::Cli);
    }
    if let Some(dir) = &args.themes_dir {
        config.paths.themes_dir = Some(dir.clone());
        config.set_source(ConfigSource::Cli);
    }
    if let Some(dir) = &args.locales_dir {
        config.paths.locales_dir = Some(dir.clone());
        config.set_source(ConfigSource::Cli);
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: pet-tui requires a terminal (TTY)");
        std::process::exit(1);
    }

    let log_path = init_logging(args.log_file.clone())?;
    let config = load_config(&args)?;
    tracing::info!(
        source = %config.source(),
        config_file = ?config.config_file_path,
        log_file = ?log_path,
        "Starting pet-tui"
    );

    // Bind before touching the terminal so a busy port is a plain error
    let addr = config.listen_addr()?;
    let listener = EventListener::bind(addr)
        .await
        .with_context(|| format!("Cannot listen on {addr}; is another pet already running?"))?;
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
    tokio::spawn(listener.run(tx));

    let prefs: Box<dyn Preferences> = match &config.paths.preferences_path {
        Some(path) => Box::new(FilePreferences::open(path)),
        None => {
            tracing::warn!("No preferences location, choices will not be saved");
            Box::new(MemoryPreferences::new())
        }
    };
    let themes = DirThemeSource::new(
        config.paths.themes_dir.clone(),
        config.paths.user_themes_dir.clone(),
    );
    let locales = DirLocaleSource::new(config.paths.locales_dir.clone().unwrap_or_default());

    let mut pet = Pet::new(
        &config,
        SystemClock::default(),
        DisplayState::new(),
        prefs,
        Box::new(themes),
    );
    pet.initialize(&locales).await;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(pet, rx);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("pet-tui stopped");
    result
}
