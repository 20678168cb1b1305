//! Application configuration.
//!
//! Resolved once at startup and passed to every component that needs it.
//! A local override file takes precedence over environment variables, which
//! take precedence over built-in defaults:
//!
//! - override file: `--config <path>`, else `config.json` in the platform config dir
//! - `GEMINI_API_KEY` - generative service API key
//! - `FIREBASE_PROJECT_ID` - document store project; without it the vault is disabled
//! - `FIREBASE_API_KEY` - document store API key (optional)
//! - `INSIGHT_VAULT_MODEL`, `INSIGHT_VAULT_COLLECTION`, `INSIGHT_VAULT_STORE` (`firestore` | `sqlite`)
//! - `INSIGHT_VAULT_CORS_ORIGINS` - comma-separated allowed origins for the API

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GENAI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_COLLECTION: &str = "mastered_principles";

const OVERRIDE_FILE: &str = "config.json";

/// Which document store implementation backs the vault.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Firestore,
    /// Local SQLite file named after the project identifier.
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "sqlite" => Ok(Self::Sqlite),
            other => bail!("Unknown store backend: {}", other),
        }
    }
}

/// The locally stored override object. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverride {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub store_api_key: Option<String>,
    pub model: Option<String>,
    pub collection: Option<String>,
    pub store_backend: Option<StoreBackend>,
    pub genai_base_url: Option<String>,
    pub store_base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub cors_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenAiConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreConfig {
    /// `None` disables all store operations.
    pub project_id: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub collection: String,
    pub backend: StoreBackend,
    pub base_url: String,
    /// Where the SQLite backend keeps its database files.
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub genai: GenAiConfig,
    pub store: StoreConfig,
    pub cors_origins: Option<Vec<String>>,
}

impl AppConfig {
    /// Load the override file (if any) and layer it over the process environment.
    ///
    /// An explicit `path` must exist; the default override file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let overrides = match path {
            Some(path) => read_override(path)?,
            None => match default_override_path() {
                Some(path) if path.exists() => read_override(&path)?,
                _ => ConfigOverride::default(),
            },
        };
        Ok(Self::resolve(overrides, |key| std::env::var(key).ok()))
    }

    /// Layer `overrides` over the values `env` yields. Blank values count as absent.
    pub fn resolve(overrides: ConfigOverride, env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| non_blank(env(key));

        let genai = GenAiConfig {
            api_key: non_blank(overrides.api_key).or_else(|| env("GEMINI_API_KEY")),
            model: non_blank(overrides.model)
                .or_else(|| env("INSIGHT_VAULT_MODEL"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_blank(overrides.genai_base_url)
                .unwrap_or_else(|| DEFAULT_GENAI_URL.to_string()),
        };

        let backend = overrides
            .store_backend
            .or_else(|| {
                env("INSIGHT_VAULT_STORE").and_then(|s| match s.parse() {
                    Ok(backend) => Some(backend),
                    Err(e) => {
                        tracing::warn!("Ignoring INSIGHT_VAULT_STORE: {}", e);
                        None
                    }
                })
            })
            .unwrap_or_default();

        let store = StoreConfig {
            project_id: non_blank(overrides.project_id).or_else(|| env("FIREBASE_PROJECT_ID")),
            api_key: non_blank(overrides.store_api_key).or_else(|| env("FIREBASE_API_KEY")),
            collection: non_blank(overrides.collection)
                .or_else(|| env("INSIGHT_VAULT_COLLECTION"))
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            backend,
            base_url: non_blank(overrides.store_base_url)
                .unwrap_or_else(|| DEFAULT_FIRESTORE_URL.to_string()),
            data_dir: overrides.data_dir.unwrap_or_else(default_data_dir),
        };

        let cors_origins = overrides.cors_origins.or_else(|| {
            env("INSIGHT_VAULT_CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
        });

        Self {
            genai,
            store,
            cors_origins,
        }
    }
}

/// `config.json` in the platform config directory.
pub fn default_override_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "insight-vault")
        .map(|dirs| dirs.config_dir().join(OVERRIDE_FILE))
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "insight-vault")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".insight-vault"))
}

pub fn read_override(path: &Path) -> Result<ConfigOverride> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config override {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid config override {}", path.display()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
