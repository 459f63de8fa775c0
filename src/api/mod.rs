//! Generative-model interaction.
//!
//! # Architecture
//!
//! - [`GenerativeModel`]: core trait; one prompt in, one text completion out
//! - [`gemini::GeminiClient`]: the Gemini `generateContent` implementation
//! - [`retry::RetryModel`]: opt-in decorator adding exponential backoff
//!
//! The core assessment path calls [`invoke_model`] exactly once per article.
//! Any retry policy lives in [`retry::RetryModel`] and is layered on by the
//! caller.

use crate::error::AppError;
use std::future::Future;
use std::time::Instant;
use tracing::{info, instrument, warn};

pub mod gemini;
pub mod retry;

/// Something that turns a prompt into a single text completion.
///
/// Implementations report transport, auth, quota and empty-candidate failures
/// as [`AppError::ModelUnavailable`].
pub trait GenerativeModel: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Send one prompt to the model and return its reply.
#[instrument(level = "info", skip_all, fields(prompt_bytes = prompt.len()))]
pub async fn invoke_model<M: GenerativeModel>(model: &M, prompt: &str) -> Result<String, AppError> {
    let t0 = Instant::now();
    let res = model.generate(prompt).await;
    let dt = t0.elapsed();

    match &res {
        Ok(text) => info!(
            elapsed_ms = dt.as_millis() as u64,
            reply_bytes = text.len(),
            "Model call succeeded"
        ),
        Err(e) => warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "Model call failed"),
    }
    res
}
