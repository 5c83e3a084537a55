//! Configuration loading and types for sckrec
//!
//! Configuration is loaded in layers:
//! 1. Built-in defaults
//! 2. Config file (~/.config/sckrec/config.toml)
//! 3. Environment variables (SCKREC_*)
//! 4. CLI arguments (highest priority)

use crate::error::SckrecError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = r#"# sckrec Configuration
#
# Location: ~/.config/sckrec/config.toml
# All settings can be overridden via CLI flags

# Language for user-facing messages ("en", "zh", or "auto" to follow $LANG)
language = "auto"

[build]
# Compiler used for the native capture source (invoked as: compiler <source> -o <binary>)
compiler = "swiftc"

# Single source file of the native capture recorder
source = "core.swift"

# Where the compiled recorder binary lives; reused across runs while it is
# newer than the source
binary = "recorder"

[capture]
# Directory where recordings are written (created if missing)
output_dir = "recordings"
"#;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    /// Message language: "en", "zh", or "auto" (follow the environment)
    #[serde(default = "default_language")]
    pub language: String,
}

/// Native recorder build settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Compiler command, invoked as `compiler <source> -o <binary>`
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Path to the single capture source file
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Path of the compiled capture binary
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
}

/// Capture output settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// Directory recordings are written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_compiler() -> String {
    "swiftc".to_string()
}

fn default_source() -> PathBuf {
    PathBuf::from("core.swift")
}

fn default_binary() -> PathBuf {
    PathBuf::from("recorder")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("recordings")
}

fn default_language() -> String {
    "auto".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            source: default_source(),
            binary: default_binary(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            capture: CaptureConfig::default(),
            language: default_language(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sckrec")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the runtime directory for ephemeral files (lock file)
    pub fn runtime_dir() -> PathBuf {
        std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir())
            .join("sckrec")
    }

    /// Path of the single-instance lock file. One orchestrator at a time:
    /// concurrent instances would race on the build cache for the same
    /// source/binary pair.
    pub fn lock_path() -> PathBuf {
        Self::runtime_dir().join("sckrec.pid")
    }

    /// Resolve the effective message language ("auto" follows the environment)
    pub fn resolve_language(&self) -> String {
        if self.language == "auto" {
            crate::i18n::detect_language()
        } else {
            self.language.clone()
        }
    }
}

/// Load configuration from file, with defaults for missing values
pub fn load_config(path: Option<&Path>) -> Result<Config, SckrecError> {
    let mut config = Config::default();

    let config_path = path.map(PathBuf::from).or_else(Config::default_path);

    if let Some(ref path) = config_path {
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            let contents = std::fs::read_to_string(path)
                .map_err(|e| SckrecError::Config(format!("Failed to read config: {}", e)))?;

            config = toml::from_str(&contents)
                .map_err(|e| SckrecError::Config(format!("Invalid config: {}", e)))?;
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
        }
    }

    // Override from environment variables
    if let Ok(compiler) = std::env::var("SCKREC_COMPILER") {
        config.build.compiler = compiler;
    }
    if let Ok(output_dir) = std::env::var("SCKREC_OUTPUT_DIR") {
        config.capture.output_dir = PathBuf::from(output_dir);
    }
    if let Ok(lang) = std::env::var("SCKREC_LANG") {
        config.language = lang;
    }

    Ok(config)
}
