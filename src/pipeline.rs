//! Fetch-then-assess for the non-interactive run.

use crate::api::GenerativeModel;
use crate::assessor::assess_batch;
use crate::error::AppError;
use crate::models::{AssessedArticle, RawArticle};
use crate::sources::{ArticleQuery, ArticleSource};
use std::time::Instant;
use tracing::{error, info, instrument};

/// Fetched articles and their assessments, index-aligned.
#[derive(Debug)]
pub struct PipelineOutput {
    pub fetched: Vec<RawArticle>,
    pub assessed: Vec<AssessedArticle>,
}

/// Fetch once, then assess every fetched article.
///
/// A failed fetch is returned as-is. Assessment failures are already folded
/// into `Error` labels by [`assess_batch`] and never abort the run.
///
/// # Arguments
///
/// * `source` - The news backend to query
/// * `model` - The model that judges each article
/// * `query` - Keywords and result limit
/// * `concurrency` - Model calls in flight at once
///
/// # Returns
///
/// The fetched articles and one assessed record per article, in fetch order.
#[instrument(level = "info", skip_all, fields(query = %query.query_string()))]
pub async fn run_pipeline<S, M>(
    source: &S,
    model: &M,
    query: &ArticleQuery,
    concurrency: usize,
) -> Result<PipelineOutput, AppError>
where
    S: ArticleSource,
    M: GenerativeModel,
{
    let t0 = Instant::now();
    let fetched = match source.fetch(query).await {
        Ok(articles) => articles,
        Err(e) => {
            error!(error = %e, "Fetching articles failed");
            return Err(e);
        }
    };
    info!(count = fetched.len(), "Articles to assess");

    let assessed = assess_batch(model, &fetched, concurrency).await;
    info!(
        elapsed_ms = t0.elapsed().as_millis() as u64,
        assessed = assessed.len(),
        "Pipeline complete"
    );
    Ok(PipelineOutput { fetched, assessed })
}
