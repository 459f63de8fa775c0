//! Error taxonomy shared by the article source, the model client and the
//! export layer.
//!
//! Only two variants ever cross a component boundary at runtime:
//! [`AppError::SourceUnavailable`] aborts a fetch, while
//! [`AppError::ModelUnavailable`] is caught per article and turned into an
//! `Error`-labelled assessment by [`crate::assessor::assess_batch`].

use thiserror::Error;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required credential was absent or blank at startup.
    #[error("Missing required credential: {0} is not set or is empty")]
    MissingCredential(&'static str),

    /// Settings file could not be read or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// News search API transport, auth or quota failure.
    #[error("News source unavailable{}: {body}", status_suffix(.status))]
    SourceUnavailable { status: Option<u16>, body: String },

    /// Generative model transport, auth or quota failure for one article.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl AppError {
    pub fn source_transport(e: reqwest::Error) -> Self {
        AppError::SourceUnavailable {
            status: e.status().map(|s| s.as_u16()),
            body: e.to_string(),
        }
    }

    pub fn model_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::ModelUnavailable(format!("request timed out: {e}"))
        } else {
            AppError::ModelUnavailable(e.to_string())
        }
    }
}
