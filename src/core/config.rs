//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.termbridge/config.toml`. A missing file means defaults.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use simplelog::LevelFilter;

use crate::AppKind;
use crate::core::policy::InterruptPolicy;
use crate::terminal::writer::Buffering;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TermbridgeConfig {
    #[serde(default)]
    pub bridge: BridgeSection,
    #[serde(default)]
    pub input: InputSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BridgeSection {
    pub app: Option<AppKind>,
    pub interrupts: Option<InterruptPolicy>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct InputSection {
    pub decode_keys: Option<bool>,
    pub escape_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OutputSection {
    pub buffering: Option<Buffering>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LogSection {
    pub file: Option<PathBuf>,
    pub level: Option<String>,
}

/// Values given on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub app: Option<AppKind>,
    pub interrupts: Option<InterruptPolicy>,
    pub decode_keys: Option<bool>,
    pub buffering: Option<Buffering>,
    pub escape_timeout_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<LevelFilter>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ESCAPE_TIMEOUT_MS: u64 = 25;
pub const DEFAULT_LOG_FILE: &str = "termbridge.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub app: AppKind,
    pub interrupts: InterruptPolicy,
    pub decode_keys: bool,
    pub escape_timeout: Duration,
    pub buffering: Buffering,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with(&TermbridgeConfig::default(), &CliOverrides::default(), |_| None)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Where the file layer of the config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file at this path; defaults apply.
    Missing(PathBuf),
    /// No path given and no home directory to look in.
    NoHome,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(p) => write!(f, "loaded from {}", p.display()),
            ConfigSource::Missing(p) => write!(f, "no config file at {}, using defaults", p.display()),
            ConfigSource::NoHome => f.write_str("no home directory, using defaults"),
        }
    }
}

/// The file layer plus where it came from. Loading happens before the
/// logger exists, so the caller logs `source` once logging is up.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: TermbridgeConfig,
    pub source: ConfigSource,
}

/// Returns the path to `~/.termbridge/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".termbridge").join("config.toml"))
}

/// Load config from `path`, or from `~/.termbridge/config.toml` if None.
///
/// A missing file yields `TermbridgeConfig::default()`. A malformed one
/// returns `ConfigError::Parse`.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        return Ok(LoadedConfig {
            config: TermbridgeConfig::default(),
            source: ConfigSource::NoHome,
        });
    };

    if !path.exists() {
        return Ok(LoadedConfig {
            config: TermbridgeConfig::default(),
            source: ConfigSource::Missing(path),
        });
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    Ok(LoadedConfig {
        config: parse_config(&contents)?,
        source: ConfigSource::File(path),
    })
}

pub fn parse_config(contents: &str) -> Result<TermbridgeConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &TermbridgeConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an explicit environment lookup.
pub fn resolve_with(
    config: &TermbridgeConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let app = cli.app.or(config.bridge.app).unwrap_or_default();

    // Interrupt policy: CLI → env → config → per-app default
    let interrupts = cli
        .interrupts
        .or_else(|| {
            env_parsed(&env, "TERMBRIDGE_INTERRUPTS", |s| {
                <InterruptPolicy as ValueEnum>::from_str(s, true).ok()
            })
        })
        .or(config.bridge.interrupts)
        .unwrap_or_else(|| app.default_interrupts());

    // Key decoding: CLI → env → config → on
    let decode_keys = cli
        .decode_keys
        .or_else(|| env_parsed(&env, "TERMBRIDGE_DECODE_KEYS", |s| s.parse().ok()))
        .or(config.input.decode_keys)
        .unwrap_or(true);

    // Log level: CLI → env → config → info
    let log_level = cli
        .log_level
        .or_else(|| env_parsed(&env, "TERMBRIDGE_LOG_LEVEL", |s| LevelFilter::from_str(s).ok()))
        .or_else(|| {
            config.log.level.as_deref().and_then(|s| {
                LevelFilter::from_str(s)
                    .inspect_err(|_| warn!("Ignoring unknown log level in config: {}", s))
                    .ok()
            })
        })
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let escape_timeout_ms = cli
        .escape_timeout_ms
        .or(config.input.escape_timeout_ms)
        .unwrap_or(DEFAULT_ESCAPE_TIMEOUT_MS);

    ResolvedConfig {
        app,
        interrupts,
        decode_keys,
        escape_timeout: Duration::from_millis(escape_timeout_ms),
        buffering: cli.buffering.or(config.output.buffering).unwrap_or_default(),
        log_file: cli
            .log_file
            .clone()
            .or_else(|| config.log.file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        log_level,
    }
}

fn env_parsed<T>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = env(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        warn!("Ignoring invalid {}={:?}", key, raw);
    }
    parsed
}
