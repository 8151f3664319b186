use crate::error::{Result, TrackerError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.pivotaltracker.com/services/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const CONFIG_FILE: &str = ".pivotal.yaml";

pub const TOKEN_ENV: &str = "PIVOTAL_TOKEN";
pub const BASE_URL_ENV: &str = "PIVOTAL_BASE_URL";
pub const TIMEOUT_ENV: &str = "PIVOTAL_TIMEOUT_SECS";

// ---------------------------------------------------------------------------
// FileConfig
// ---------------------------------------------------------------------------

/// Optional on-disk settings, read from `~/.pivotal.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Returns the default when `path` does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn default_path() -> Option<PathBuf> {
        home::home_dir().map(|home| home.join(CONFIG_FILE))
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Resolve from `~/.pivotal.yaml` and the process environment.
    pub fn from_env() -> Result<Self> {
        let file = match FileConfig::default_path() {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        };
        let env: HashMap<String, String> = [TOKEN_ENV, BASE_URL_ENV, TIMEOUT_ENV]
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self::resolve(file, &env)
    }

    /// Layer defaults, then the file, then environment values.
    pub fn resolve(file: FileConfig, env: &HashMap<String, String>) -> Result<Self> {
        let non_empty = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let token = non_empty(TOKEN_ENV)
            .map(str::to_string)
            .or(file.token.filter(|t| !t.trim().is_empty()))
            .ok_or(TrackerError::MissingToken)?;

        let base_url = non_empty(BASE_URL_ENV)
            .map(str::to_string)
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match non_empty(TIMEOUT_ENV) {
            Some(raw) => raw.parse::<u64>().map_err(|_| TrackerError::MalformedField {
                field: TIMEOUT_ENV.to_string(),
                value: raw.to_string(),
            })?,
            None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self::new(token)
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
