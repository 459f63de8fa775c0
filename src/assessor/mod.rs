//! Credibility assessment: prompt, one model call, parse.
//!
//! ```text
//! RawArticle ──build_prompt──▶ prompt ──invoke_model──▶ reply ──parse_response──▶ Assessment
//! ```
//!
//! [`assess`] fails outward only when the model cannot be reached.
//! [`assess_batch`] absorbs even that, so N articles in always means N
//! assessed articles out, in input order.

use crate::api::{GenerativeModel, invoke_model};
use crate::error::AppError;
use crate::models::{AssessedArticle, Assessment, Label, RawArticle};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

pub mod parse;
pub mod prompt;

pub use parse::parse_response;
pub use prompt::build_prompt;

/// Assess one article.
///
/// # Arguments
///
/// * `model` - Any [`GenerativeModel`]; wrap it in `RetryModel` for retries
/// * `article` - The article to judge
///
/// # Returns
///
/// The parsed label, reasoning and full reply. Parse problems never surface
/// as errors; they become `Error`-labelled assessments. Only
/// [`AppError::ModelUnavailable`] is returned.
#[instrument(level = "info", skip_all, fields(url = %article.url))]
pub async fn assess<M: GenerativeModel>(model: &M, article: &RawArticle) -> Result<Assessment, AppError> {
    let prompt = build_prompt(article);
    let raw_response = invoke_model(model, &prompt).await?;
    let (label, reasoning) = parse_response(&raw_response);

    if label.is_error() {
        warn!(
            response_preview = %truncate_for_log(&raw_response, 300),
            "Model reply did not follow the expected format"
        );
    } else {
        debug!(%label, "Parsed model reply");
    }

    Ok(Assessment {
        label,
        reasoning,
        raw_response,
    })
}

/// Assess every article, never aborting on a single failure.
///
/// # Arguments
///
/// * `model` - The model shared by every call
/// * `articles` - Articles to assess
/// * `concurrency` - Model calls in flight at once (treated as 1 when 0)
///
/// # Returns
///
/// Exactly one [`AssessedArticle`] per input, in input order. A model
/// failure becomes an `Error` label whose reasoning is the error text.
#[instrument(level = "info", skip_all, fields(total = articles.len(), concurrency = concurrency))]
pub async fn assess_batch<M: GenerativeModel>(
    model: &M,
    articles: &[RawArticle],
    concurrency: usize,
) -> Vec<AssessedArticle> {
    let assessed: Vec<AssessedArticle> = stream::iter(articles.iter().cloned().enumerate())
        .map(move |(index, article)| async move {
            let assessment = match assess(model, &article).await {
                Ok(assessment) => assessment,
                Err(e) => {
                    warn!(index, url = %article.url, error = %e, "Assessment failed; recording error label");
                    Assessment::failed(e.to_string())
                }
            };
            info!(index, label = %assessment.label, "Assessed article");
            AssessedArticle {
                article,
                assessment,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let errors = assessed
        .iter()
        .filter(|a| a.assessment.label == Label::Error)
        .count();
    info!(
        total = assessed.len(),
        errors,
        "Completed article assessment"
    );
    assessed
}
