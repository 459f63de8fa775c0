//! # credible_news
//!
//! Fetches news articles on a fixed topic from a news search API, asks a
//! generative model whether each article's claims are "Credible" or
//! "Not Credible", and exports the structured results as JSON.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... GOOGLE_API_KEY=... credible_news -o ./assessed_articles.json
//! credible_news interactive
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: one query against the news API ([`sources`])
//! 2. **Assessing**: one prompt and one model call per article, reply parsed
//!    into a label and reasoning ([`assessor`], [`api`])
//! 3. **Output**: Markdown report on stdout, JSON export ([`outputs`])
//!
//! A failed fetch ends the run with a non-zero status. A failed or garbled
//! model reply only ever marks that one article as `Error`.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod assessor;
mod cli;
mod config;
mod error;
mod interactive;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;

use api::GenerativeModel;
use api::gemini::GeminiClient;
use api::retry::RetryModel;
use cli::{Cli, Command};
use config::{Credentials, Settings};
use interactive::{Session, run_session};
use outputs::{json, markdown};
use sources::{ArticleQuery, ArticleSource};
use sources::newsapi::NewsApiSource;
use utils::ensure_writable_parent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.config, ?args.output, command = ?args.command(), "Parsed CLI arguments");

    // ---- Configuration: fatal before any network activity ----
    let settings = Settings::load(args.config.as_deref()).inspect_err(|e| {
        error!(error = %e, "Invalid settings");
    })?;
    let credentials = Credentials::new(args.news_api_key.clone(), args.google_api_key.clone())
        .inspect_err(|e| error!(error = %e, "Cannot start without credentials"))?;

    let query = ArticleQuery::from_settings(&settings.news);
    let source = NewsApiSource::new(&settings.news, credentials.news_api_key.clone())?;
    let model = RetryModel::new(
        GeminiClient::new(&settings.model, credentials.google_api_key.clone())?,
        args.max_retries,
        Duration::from_secs(1),
    );
    info!(query = %query.query_string(), max_results = query.max_results, model = %settings.model.name, "Configured");

    match args.command() {
        Command::Run => run(&args, &source, &model, &query).await?,
        Command::Interactive => {
            let session = Session::new(source, model, query, args.concurrency, args.output.clone());
            run_session(session, BufReader::new(tokio::io::stdin()), std::io::stdout()).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}

/// Non-interactive fetch → assess → report → export.
///
/// # Arguments
///
/// * `args` - Parsed CLI arguments (output paths and concurrency)
/// * `source` - Where articles come from
/// * `model` - The model that judges each article
/// * `query` - Keywords and result limit for the fetch
///
/// # Returns
///
/// `Ok(())` once the export is written. A failed fetch, or a failure to
/// write any file the user asked for, is returned as an error.
async fn run<S, M>(
    args: &Cli,
    source: &S,
    model: &M,
    query: &ArticleQuery,
) -> Result<(), Box<dyn Error>>
where
    S: ArticleSource,
    M: GenerativeModel,
{
    // Early check: a bad output path should fail before spending model calls
    if let Err(e) = ensure_writable_parent(&args.output).await {
        error!(
            path = %args.output.display(),
            error = %e,
            "Output location is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let output = pipeline::run_pipeline(source, model, query, args.concurrency).await?;

    if let Some(raw_path) = &args.raw_output {
        json::write_raw_articles(&output.fetched, raw_path)
            .await
            .inspect_err(|e| error!(path = %raw_path.display(), error = %e, "Failed to save fetched articles"))?;
    }

    let report = markdown::render_report(&output.assessed);
    println!("{report}");

    if let Some(md_path) = &args.markdown_output {
        tokio::fs::write(md_path, &report)
            .await
            .inspect_err(|e| error!(path = %md_path.display(), error = %e, "Failed writing Markdown"))?;
        info!(path = %md_path.display(), "Wrote Markdown report");
    }

    json::write_export(&output.assessed, &args.output)
        .await
        .inspect_err(|e| error!(path = %args.output.display(), error = %e, "Failed to write export"))?;
    info!(
        summary = %markdown::summary_line(&output.assessed),
        path = %args.output.display(),
        "Run complete"
    );
    Ok(())
}
