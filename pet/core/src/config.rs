//! TOML Configuration File Support
//!
//! Centralized configuration for the pet, loaded from
//! `$XDG_CONFIG_HOME/claude-pet/pet.toml`.
//!
//! # Configuration Priority
//!
//! Values are applied in this order (later wins):
//! 1. Default values
//! 2. TOML configuration file
//! 3. Environment variables
//! 4. CLI arguments (applied by the binaries)
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 19876
//!
//! [timing]
//! session_timeout_ms = 60000
//! cleanup_interval_ms = 10000
//! success_ms = 1500
//! error_ms = 3000
//! stop_ms = 5000
//! reversion_guard_ms = 1000
//!
//! [paths]
//! themes_dir = "/usr/share/claude-pet/themes"
//! user_themes_dir = "~/.claude-pet/themes"
//! locales_dir = "/usr/share/claude-pet/locales"
//! preferences_path = "~/.config/claude-pet/preferences.json"
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default listen host for hook events
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port for hook events
pub const DEFAULT_PORT: u16 = 19876;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the effective configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[server]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerToml {
    /// Listen host
    pub host: Option<String>,
    /// Listen port
    pub port: Option<u16>,
}

/// `[timing]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingToml {
    /// Inactivity after which a session expires
    pub session_timeout_ms: Option<u64>,
    /// How often expired sessions are swept
    pub cleanup_interval_ms: Option<u64>,
    /// Success → idle delay
    pub success_ms: Option<u64>,
    /// Error → idle delay
    pub error_ms: Option<u64>,
    /// Stop → idle delay
    pub stop_ms: Option<u64>,
    /// Minimum quiet period before a reversion may apply
    pub reversion_guard_ms: Option<u64>,
}

/// `[paths]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsToml {
    /// Built-in themes directory
    pub themes_dir: Option<PathBuf>,
    /// User themes directory
    pub user_themes_dir: Option<PathBuf>,
    /// Locale files directory
    pub locales_dir: Option<PathBuf>,
    /// Preference file
    pub preferences_path: Option<PathBuf>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PetToml {
    /// Server section
    pub server: ServerToml,
    /// Timing section
    pub timing: TimingToml,
    /// Paths section
    pub paths: PathsToml,
}

// =============================================================================
// Main Configuration Structs
// =============================================================================

/// Reconciler timing constants
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    /// A session with no events for longer than this is expired
    pub session_timeout: Duration,
    /// Cadence of the expiry sweep (owned by the driver)
    pub cleanup_interval: Duration,
    /// Success → idle
    pub success_revert: Duration,
    /// Error → idle
    pub error_revert: Duration,
    /// Stop → idle
    pub stop_revert: Duration,
    /// A reversion only applies if the session has been quiet this long
    pub reversion_guard: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_millis(60_000),
            cleanup_interval: Duration::from_millis(10_000),
            success_revert: Duration::from_millis(1_500),
            error_revert: Duration::from_millis(3_000),
            stop_revert: Duration::from_millis(5_000),
            reversion_guard: Duration::from_millis(1_000),
        }
    }
}

impl Timings {
    /// Session timeout in milliseconds
    pub fn session_timeout_ms(&self) -> u64 {
        duration_ms(self.session_timeout)
    }
}

pub(crate) fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Filesystem locations
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PetPaths {
    /// Built-in themes directory
    pub themes_dir: Option<PathBuf>,
    /// User themes directory
    pub user_themes_dir: Option<PathBuf>,
    /// Locale files directory
    pub locales_dir: Option<PathBuf>,
    /// Preference file
    pub preferences_path: Option<PathBuf>,
}

/// Centralized configuration for the pet
#[derive(Clone, Debug)]
pub struct PetConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Reconciler timings
    pub timings: Timings,
    /// Filesystem locations
    pub paths: PetPaths,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    /// Source of configuration values
    source: ConfigSource,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timings: Timings::default(),
            paths: PetPaths {
                themes_dir: default_builtin_dir("themes"),
                user_themes_dir: dirs::home_dir().map(|h| h.join(".claude-pet").join("themes")),
                locales_dir: default_builtin_dir("locales"),
                preferences_path: dirs::config_dir()
                    .map(|p| p.join("claude-pet").join("preferences.json")),
            },
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl PetConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Address hook events are delivered to
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if host/port do not form an address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("bad listen address: {e}")))
    }

    /// Check values that would make the engine misbehave
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timings.session_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "session_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.timings.cleanup_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "cleanup_interval_ms must be greater than zero".to_string(),
            ));
        }
        self.listen_addr().map(|_| ())
    }
}

/// Directory named `name` shipped next to the executable, if any
///
/// Checks `<exe dir>/<name>`, `<exe dir>/../<name>` and, for development
/// builds under `target/<profile>`, the workspace root.
fn default_builtin_dir(name: &str) -> Option<PathBuf> {
    let exe_dir = std::env::current_exe().ok()?.parent()?.to_path_buf();
    [
        exe_dir.join(name),
        exe_dir.join("..").join(name),
        exe_dir.join("..").join("..").join(name),
    ]
    .into_iter()
    .find(|p| p.is_dir())
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/claude-pet/pet.toml` or
/// `~/.config/claude-pet/pet.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("claude-pet").join("pet.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<PetConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PetConfig, ConfigError> {
    let mut config = PetConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: PetToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut PetConfig, toml: &PetToml) {
    if let Some(ref host) = toml.server.host {
        config.host = host.clone();
    }
    if let Some(port) = toml.server.port {
        config.port = port;
    }

    let timing = &toml.timing;
    let t = &mut config.timings;
    if let Some(ms) = timing.session_timeout_ms {
        t.session_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = timing.cleanup_interval_ms {
        t.cleanup_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = timing.success_ms {
        t.success_revert = Duration::from_millis(ms);
    }
    if let Some(ms) = timing.error_ms {
        t.error_revert = Duration::from_millis(ms);
    }
    if let Some(ms) = timing.stop_ms {
        t.stop_revert = Duration::from_millis(ms);
    }
    if let Some(ms) = timing.reversion_guard_ms {
        t.reversion_guard = Duration::from_millis(ms);
    }

    if toml.paths.themes_dir.is_some() {
        config.paths.themes_dir = toml.paths.themes_dir.clone();
    }
    if toml.paths.user_themes_dir.is_some() {
        config.paths.user_themes_dir = toml.paths.user_themes_dir.clone();
    }
    if toml.paths.locales_dir.is_some() {
        config.paths.locales_dir = toml.paths.locales_dir.clone();
    }
    if toml.paths.preferences_path.is_some() {
        config.paths.preferences_path = toml.paths.preferences_path.clone();
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut PetConfig) {
    if let Ok(host) = std::env::var("PET_HOST") {
        config.host = host;
        config.source = ConfigSource::Env;
    }
    if let Ok(port) = std::env::var("PET_PORT") {
        if let Ok(p) = port.parse::<u16>() {
            config.port = p;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(timeout) = std::env::var("PET_SESSION_TIMEOUT_MS") {
        if let Ok(ms) = timeout.parse::<u64>() {
            config.timings.session_timeout = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(interval) = std::env::var("PET_CLEANUP_INTERVAL_MS") {
        if let Ok(ms) = interval.parse::<u64>() {
            config.timings.cleanup_interval = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(dir) = std::env::var("PET_THEMES_DIR") {
        config.paths.themes_dir = Some(PathBuf::from(dir));
        config.source = ConfigSource::Env;
    }
    if let Ok(dir) = std::env::var("PET_LOCALES_DIR") {
        config.paths.locales_dir = Some(PathBuf::from(dir));
        config.source = ConfigSource::Env;
    }
    if let Ok(path) = std::env::var("PET_PREFERENCES") {
        config.paths.preferences_path = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_reconciler_constants() {
        let config = PetConfig::default();
        assert_eq!(config.port, 19876);
        assert_eq!(config.timings.session_timeout_ms(), 60_000);
        assert_eq!(config.timings.cleanup_interval, Duration::from_secs(10));
        assert_eq!(config.timings.success_revert, Duration::from_millis(1_500));
        assert_eq!(config.timings.error_revert, Duration::from_millis(3_000));
        assert_eq!(config.timings.stop_revert, Duration::from_millis(5_000));
        assert_eq!(config.timings.reversion_guard, Duration::from_millis(1_000));
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from_path(Some(dir.path().join("missing.toml"))).unwrap();
        assert!(config.config_file_path.is_none());
        assert_eq!(config.timings, Timings::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pet.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 20000

[timing]
success_ms = 500
reversion_guard_ms = 250

[paths]
locales_dir = "/opt/pet/locales"
"#,
        )
        .unwrap();

        let config = load_config_from_path(Some(path.clone())).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.timings.success_revert, Duration::from_millis(500));
        assert_eq!(config.timings.reversion_guard, Duration::from_millis(250));
        assert_eq!(config.timings.error_revert, Duration::from_millis(3_000));
        assert_eq!(
            config.paths.locales_dir,
            Some(PathBuf::from("/opt/pet/locales"))
        );
        assert_eq!(config.config_file_path, Some(path));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pet.toml");
        std::fs::write(&path, "[timing\nsuccess_ms = ").unwrap();

        assert!(matches!(
            load_config_from_path(Some(path)),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = PetConfig::default();
        config.timings.session_timeout = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_listen_addr() {
        let config = PetConfig::default();
        assert_eq!(
            config.listen_addr().unwrap(),
            "127.0.0.1:19876".parse::<SocketAddr>().unwrap()
        );
    }
}
