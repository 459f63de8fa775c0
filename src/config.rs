//! Runtime configuration: credentials and tunable settings.
//!
//! Credentials come only from the environment (or the matching CLI flags) and
//! are validated before any network activity. Everything else has a default
//! and can be overridden from an optional YAML settings file:
//!
//! ```yaml
//! news:
//!   keywords: ["Sukuk", "Takaful", "Islamic finance"]
//!   max_results: 20
//! model:
//!   name: gemini-2.0-flash
//!   temperature: 0.0
//! ```

use crate::error::AppError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::{info, instrument};

pub const NEWS_API_KEY_ENV: &str = "NEWS_API_KEY";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Topic query used when the settings file does not override it.
const DEFAULT_KEYWORDS: &[&str] = &[
    "AAOIFI",
    "IFSB",
    "Islamic finance",
    "Shariah compliance",
    "Shariah board",
    "Islamic banking standards",
    "fatwa finance",
    "Islamic financial regulation",
    "Islamic accounting",
    "Sukuk",
    "Takaful",
    "Murabaha",
    "Musharaka",
    "Mudaraba",
];

/// The two API keys the application needs.
///
/// `Debug` is implemented by hand so keys never end up in logs.
#[derive(Clone)]
pub struct Credentials {
    pub news_api_key: String,
    pub google_api_key: String,
}

impl Credentials {
    /// Validate raw credential values; absent or blank values are rejected.
    pub fn new(
        news_api_key: Option<String>,
        google_api_key: Option<String>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            news_api_key: require(news_api_key, NEWS_API_KEY_ENV)?,
            google_api_key: require(google_api_key, GOOGLE_API_KEY_ENV)?,
        })
    }
}

fn require(value: Option<String>, name: &'static str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::MissingCredential(name)),
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("news_api_key", &"<redacted>")
            .field("google_api_key", &"<redacted>")
            .finish()
    }
}

/// Top-level settings file layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub news: NewsSettings,
    pub model: ModelSettings,
}

/// Settings for the news search API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    pub endpoint: String,
    pub keywords: Vec<String>,
    pub language: String,
    pub sort_by: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://newsapi.org/v2/everything".to_string(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            max_results: 10,
            timeout_secs: 30,
        }
    }
}

/// Settings for the generative-text API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub endpoint: String,
    pub name: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            name: "gemini-2.0-flash".to_string(),
            temperature: 0.0,
            max_output_tokens: 512,
            timeout_secs: 60,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file, or use defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let settings = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                let settings = Self::from_yaml(&text)?;
                info!(path = %path.display(), "Loaded settings file");
                settings
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml(text: &str) -> Result<Self, AppError> {
        serde_yaml::from_str(text).map_err(|e| AppError::Config(format!("invalid YAML: {e}")))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.news.max_results == 0 {
            return Err(AppError::Config("news.max_results must be at least 1".into()));
        }
        if self.news.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(AppError::Config("news.keywords must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(AppError::Config(format!(
                "model.temperature must be within 0.0..=2.0, got {}",
                self.model.temperature
            )));
        }
        if self.news.timeout_secs == 0 || self.model.timeout_secs == 0 {
            return Err(AppError::Config("timeouts must be at least 1 second".into()));
        }
        Ok(())
    }
}
