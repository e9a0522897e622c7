//! Configuration system for strata
//!
//! Provides:
//! - TOML configuration files
//! - Environment variable overrides
//! - Engine profiles (default, strict, debug, plus user-defined ones)
//! - Multiple config file locations
//!
//! # Configuration File Locations
//!
//! Configuration files are searched in order (first found wins):
//! 1. `./strata.toml` - Project-local configuration
//! 2. `~/.config/strata/config.toml` - User configuration (XDG)
//! 3. `~/.strata/config.toml` - User configuration (legacy)
//! 4. `/etc/strata/config.toml` - System-wide configuration
//!
//! # Environment Variables
//!
//! - `STRATA_PROFILE` - Engine profile, applied before the variables below
//! - `STRATA_LOG_LEVEL` - Logging verbosity (quiet, normal, verbose, debug)
//! - `STRATA_TRACE` - Report per-round triple counts (true/false)
//! - `STRATA_MAX_ROUNDS` - Round limit per stratum (0 = unlimited)
//!
//! # Example Configuration
//!
//! ```toml
//! # strata.toml
//!
//! [general]
//! log_level = "normal"
//! profile = "default"
//!
//! [engine]
//! trace = false
//! max_rounds_per_stratum = 0
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;

// ============================================================================
// Configuration Schema
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StrataConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Rule engine settings
    pub engine: EngineSettings,
    /// User-defined profiles
    pub profiles: HashMap<String, ProfileConfig>,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Logging level
    pub log_level: LogLevel,
    /// Profile the engine settings were taken from
    pub profile: EngineProfile,
}

/// Rule engine options
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineSettings {
    /// Log triple counts after every round and stratum
    pub trace: bool,
    /// Maximum rounds a single stratum may take (0 = unlimited)
    pub max_rounds_per_stratum: usize,
}

/// User-defined profile overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProfileConfig {
    pub trace: Option<bool>,
    pub max_rounds_per_stratum: Option<usize>,
    pub log_level: Option<LogLevel>,
    /// Description of the profile
    pub description: Option<String>,
}

// ============================================================================
// Enums
// ============================================================================

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "q" | "0" => Some(LogLevel::Quiet),
            "normal" | "n" | "1" => Some(LogLevel::Normal),
            "verbose" | "v" | "2" => Some(LogLevel::Verbose),
            "debug" | "d" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// The `tracing` level this maps to
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "error",
            LogLevel::Normal => "info",
            LogLevel::Verbose => "debug",
            LogLevel::Debug => "trace",
        }
    }
}

/// Built-in engine profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineProfile {
    /// No round limit, no tracing
    #[default]
    Default,
    /// Bounded rounds per stratum
    Strict,
    /// Tracing on, verbose logging
    Debug,
    /// Settings came from a `[profiles.*]` section
    Custom,
}

impl EngineProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineProfile::Default => "default",
            EngineProfile::Strict => "strict",
            EngineProfile::Debug => "debug",
            EngineProfile::Custom => "custom",
        }
    }

    /// Parse a built-in profile name; `custom` is not a name users select
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" | "" => Some(EngineProfile::Default),
            "strict" | "bounded" => Some(EngineProfile::Strict),
            "debug" | "trace" => Some(EngineProfile::Debug),
            _ => None,
        }
    }

    /// The round limit this profile imposes
    pub fn default_max_rounds(&self) -> usize {
        match self {
            EngineProfile::Strict => 10_000,
            _ => 0, // unlimited
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EngineProfile::Default => "Run every stratum to its fixpoint",
            EngineProfile::Strict => "Fail a stratum that needs more than 10000 rounds",
            EngineProfile::Debug => "Trace every round and log at debug level",
            EngineProfile::Custom => "User-defined profile",
        }
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

impl StrataConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from default locations
    ///
    /// Searches for config files in order:
    /// 1. ./strata.toml
    /// 2. ~/.config/strata/config.toml
    /// 3. ~/.strata/config.toml
    /// 4. /etc/strata/config.toml
    ///
    /// Then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for path in Self::config_paths() {
            if path.exists() {
                config = Self::load_from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::IoError(path.to_path_buf(), e.to_string()),
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Load configuration from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(PathBuf::from("<string>"), e.to_string()))
    }

    /// Get the list of config file search paths
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./strata.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("strata").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".strata").join("config.toml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/strata/config.toml"));

        paths
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup, using the `STRATA_*` names
    ///
    /// The profile is applied first so that the individual settings win over it.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("STRATA_PROFILE") {
            self.apply_profile(&val)?;
        }

        if let Some(val) = lookup("STRATA_LOG_LEVEL") {
            self.general.log_level = LogLevel::from_str(&val).ok_or_else(|| ConfigError::InvalidValue {
                key: "STRATA_LOG_LEVEL".to_string(),
                value: val.clone(),
            })?;
        }

        if let Some(val) = lookup("STRATA_TRACE") {
            self.engine.trace = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        if let Some(val) = lookup("STRATA_MAX_ROUNDS") {
            self.engine.max_rounds_per_stratum = val.parse().map_err(|_| ConfigError::InvalidValue {
                key: "STRATA_MAX_ROUNDS".to_string(),
                value: val.clone(),
            })?;
        }

        Ok(())
    }

    /// Apply a named profile's settings
    pub fn apply_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        if let Some(profile) = EngineProfile::from_str(name) {
            self.general.profile = profile;
            self.engine.max_rounds_per_stratum = profile.default_max_rounds();
            self.engine.trace = profile == EngineProfile::Debug;
            if profile == EngineProfile::Debug {
                self.general.log_level = LogLevel::Debug;
            }
            return Ok(());
        }

        if let Some(custom) = self.profiles.get(name).cloned() {
            self.general.profile = EngineProfile::Custom;
            if let Some(trace) = custom.trace {
                self.engine.trace = trace;
            }
            if let Some(max_rounds) = custom.max_rounds_per_stratum {
                self.engine.max_rounds_per_stratum = max_rounds;
            }
            if let Some(level) = custom.log_level {
                self.general.log_level = level;
            }
            return Ok(());
        }

        Err(ConfigError::UnknownProfile(name.to_string()))
    }

    /// The runtime settings a `RuleEngine` takes from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            trace: self.engine.trace,
            max_rounds_per_stratum: self.engine.max_rounds_per_stratum,
        }
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Write configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))
    }

    /// Generate a default configuration file content
    pub fn default_config_content() -> &'static str {
        r#"# strata configuration file

[general]
# Logging level: quiet, normal, verbose, debug
log_level = "normal"
# Engine profile: default, strict, debug
profile = "default"

[engine]
# Log triple counts after every round and stratum
trace = false
# Maximum rounds a single stratum may take (0 = unlimited)
max_rounds_per_stratum = 0

# Custom profiles can be defined like this:
# [profiles.ci]
# max_rounds_per_stratum = 500
# trace = true
# log_level = "verbose"
# description = "Bounded runs for CI"
"#
    }

    /// List all available profiles
    pub fn available_profiles(&self) -> Vec<(&str, &str)> {
        let mut profiles = vec![
            ("default", EngineProfile::Default.description()),
            ("strict", EngineProfile::Strict.description()),
            ("debug", EngineProfile::Debug.description()),
        ];

        for (name, config) in &self.profiles {
            let desc = config.description.as_deref().unwrap_or("Custom profile");
            profiles.push((name.as_str(), desc));
        }

        profiles
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Config file does not exist
    NotFound(PathBuf),
    /// IO error reading/writing config file
    IoError(PathBuf, String),
    /// Parse error in config file
    ParseError(PathBuf, String),
    /// Serialization error
    SerializeError(String),
    /// Unknown profile name
    UnknownProfile(String),
    /// An override carried a value that cannot be used
    InvalidValue { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            ConfigError::IoError(path, msg) => {
                write!(f, "IO error reading {}: {}", path.display(), msg)
            }
            ConfigError::ParseError(path, msg) => {
                write!(f, "Parse error in {}: {}", path.display(), msg)
            }
            ConfigError::SerializeError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            ConfigError::UnknownProfile(name) => {
                write!(f, "Unknown profile: {}", name)
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Tests
// ============================================================================
