//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.comicdex/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::paging::{DEFAULT_SECTION_CHUNK_SIZE, MAX_CHARACTER_PAGE_SIZE};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ComicdexConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub paging: PagingSettings,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PagingSettings {
    pub page_size: Option<usize>,
    pub section_chunk_size: Option<usize>,
}

// ============================================================================
// Resolved Config (concrete values, credentials checked later)
// ============================================================================

#[derive(Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
    pub timeout: Duration,
    pub page_size: usize,
    pub section_chunk_size: usize,
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("base_url", &self.base_url)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .field("section_chunk_size", &self.section_chunk_size)
            .finish()
    }
}

impl ResolvedConfig {
    /// `(public, private)` key pair, or which one is missing.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        match (self.public_key.as_deref(), self.private_key.as_deref()) {
            (Some(public), Some(private)) if !public.is_empty() && !private.is_empty() => {
                Ok((public, private))
            }
            (public, _) => Err(ConfigError::MissingCredentials(
                if public.is_none_or(str::is_empty) {
                    "MARVEL_PUBLIC_KEY"
                } else {
                    "MARVEL_PRIVATE_KEY"
                },
            )),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing API credentials: set {0} or the [api] section of the config file")]
    MissingCredentials(&'static str),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.comicdex/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".comicdex").join("config.toml"))
}

/// Load config from `~/.comicdex/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ComicdexConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ComicdexConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ComicdexConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<ComicdexConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(ComicdexConfig::default());
    }

    let contents = fs::read_to_string(path)?;
    let config: ComicdexConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!(
        "Config: base_url={:?} page_size={:?} chunk={:?}",
        config.api.base_url, config.paging.page_size, config.paging.section_chunk_size
    );
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# Comicdex Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [api]
# base_url = "https://gateway.marvel.com"   # Or MARVEL_BASE_URL / --base-url
# public_key = "..."                        # Or MARVEL_PUBLIC_KEY
# private_key = "..."                       # Or MARVEL_PRIVATE_KEY
# timeout_secs = 20

# [paging]
# page_size = 20             # Characters per page, at most 20
# section_chunk_size = 5     # Items fetched per section page
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` is from the `--base-url` flag (None = not specified).
pub fn resolve(config: &ComicdexConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    resolve_with(config, cli_base_url, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an explicit environment lookup.
pub fn resolve_with(
    config: &ComicdexConfig,
    cli_base_url: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| env("MARVEL_BASE_URL"))
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Keys: env → config
    let public_key = env("MARVEL_PUBLIC_KEY").or_else(|| config.api.public_key.clone());
    let private_key = env("MARVEL_PRIVATE_KEY").or_else(|| config.api.private_key.clone());

    let timeout = config
        .api
        .timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let page_size = config
        .paging
        .page_size
        .unwrap_or(MAX_CHARACTER_PAGE_SIZE);
    if page_size == 0 || page_size > MAX_CHARACTER_PAGE_SIZE {
        warn!("page_size {page_size} out of range, clamping to 1..={MAX_CHARACTER_PAGE_SIZE}");
    }

    ResolvedConfig {
        base_url,
        public_key,
        private_key,
        timeout,
        page_size: page_size.clamp(1, MAX_CHARACTER_PAGE_SIZE),
        section_chunk_size: config
            .paging
            .section_chunk_size
            .unwrap_or(DEFAULT_SECTION_CHUNK_SIZE)
            .max(1),
    }
}
