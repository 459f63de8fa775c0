//! Line-oriented interactive session.
//!
//! ```text
//! credible_news> fetch
//! Fetched 10 articles.
//! credible_news> assess
//! Assessing 10 articles in the background. Use `status` or `wait`.
//! credible_news> download ./assessed_articles.json
//! ```
//!
//! Assessment runs on a spawned task over a snapshot of the fetched
//! articles, so the prompt stays responsive and a new `fetch` can run while
//! the model calls are in flight. Results of an assessment started before the
//! latest fetch are discarded when they arrive.

use crate::api::GenerativeModel;
use crate::assessor::assess_batch;
use crate::error::AppError;
use crate::models::{AssessedArticle, RawArticle};
use crate::outputs::{json, markdown};
use crate::sources::{ArticleQuery, ArticleSource};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const HELP: &str = "\
Commands:
  fetch            fetch articles for the configured keywords
  assess           assess the fetched articles in the background
  status           show progress of the current session
  wait             block until the running assessment finishes
  show             print the fetched articles and their assessments
  download [path]  save the assessed articles as JSON
  help             show this message
  quit             leave the session";

/// A user action in the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch,
    Assess,
    Status,
    Wait,
    Show,
    Download(Option<PathBuf>),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Err("empty command".to_string());
        };
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(format!("too many arguments for `{verb}`"));
        }
        let cmd = match (verb.to_lowercase().as_str(), arg) {
            ("fetch", None) => Command::Fetch,
            ("assess", None) => Command::Assess,
            ("status", None) => Command::Status,
            ("wait", None) => Command::Wait,
            ("show", None) => Command::Show,
            ("download", path) => Command::Download(path.map(PathBuf::from)),
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit", None) => Command::Quit,
            (v, Some(_)) if ["fetch", "assess", "status", "wait", "show", "help", "quit"].contains(&v) => {
                return Err(format!("`{v}` takes no arguments"));
            }
            _ => return Err(format!("unknown command `{verb}`; type `help`")),
        };
        Ok(cmd)
    }
}

/// What a command produced: text for the user, and whether to stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub message: String,
    pub quit: bool,
}

impl Outcome {
    fn say(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            quit: false,
        }
    }
}

/// State of one interactive session.
pub struct Session<S, M> {
    source: Arc<S>,
    model: Arc<M>,
    query: ArticleQuery,
    concurrency: usize,
    default_export: PathBuf,
    /// Bumped on every successful fetch; tags background assessments.
    generation: u64,
    articles: Vec<RawArticle>,
    assessed: Vec<AssessedArticle>,
    pending: Option<(u64, JoinHandle<Vec<AssessedArticle>>)>,
}

impl<S, M> Session<S, M>
where
    S: ArticleSource,
    M: GenerativeModel + 'static,
{
    pub fn new(
        source: S,
        model: M,
        query: ArticleQuery,
        concurrency: usize,
        default_export: PathBuf,
    ) -> Self {
        Self {
            source: Arc::new(source),
            model: Arc::new(model),
            query,
            concurrency,
            default_export,
            generation: 0,
            articles: Vec::new(),
            assessed: Vec::new(),
            pending: None,
        }
    }

    /// Store the result of a background assessment that has finished.
    async fn collect_finished(&mut self) -> Option<String> {
        if self.pending.as_ref().is_some_and(|(_, h)| h.is_finished()) {
            self.finish_pending().await
        } else {
            None
        }
    }

    /// Await the background assessment, if any, and store its result.
    async fn finish_pending(&mut self) -> Option<String> {
        let (generation, handle) = self.pending.take()?;
        match handle.await {
            Ok(results) if generation == self.generation => {
                let note = format!(
                    "Assessment complete: {}",
                    markdown::summary_line(&results)
                );
                self.assessed = results;
                Some(note)
            }
            Ok(results) => {
                warn!(stale = results.len(), "Discarding assessment of an earlier fetch");
                Some("Discarded results of an assessment started before the latest fetch.".to_string())
            }
            Err(e) => {
                error!(error = %e, "Assessment task failed");
                Some(format!("Assessment task failed: {e}"))
            }
        }
    }

    pub async fn handle(&mut self, cmd: Command) -> Outcome {
        let note = self.collect_finished().await;
        let mut outcome = self.dispatch(cmd).await;
        if let Some(note) = note {
            outcome.message = format!("{note}\n{}", outcome.message);
        }
        outcome
    }

    async fn dispatch(&mut self, cmd: Command) -> Outcome {
        match cmd {
            Command::Fetch => match self.source.fetch(&self.query).await {
                Ok(articles) => {
                    self.generation += 1;
                    self.articles = articles;
                    self.assessed.clear();
                    info!(count = self.articles.len(), "Session fetched articles");
                    if self.articles.is_empty() {
                        Outcome::say("No articles found for the query.")
                    } else {
                        Outcome::say(format!("Fetched {} articles.", self.articles.len()))
                    }
                }
                Err(e) => {
                    error!(error = %e, "Session fetch failed");
                    Outcome::say(format!("Fetch failed: {e}"))
                }
            },
            Command::Assess => {
                if self.articles.is_empty() {
                    return Outcome::say("No articles fetched yet. Use `fetch` first.");
                }
                if self.pending.is_some() {
                    return Outcome::say("An assessment is already running. Use `status` or `wait`.");
                }
                self.assessed.clear();
                let model = Arc::clone(&self.model);
                let snapshot = self.articles.clone();
                let concurrency = self.concurrency;
                let handle = tokio::spawn(async move {
                    assess_batch(model.as_ref(), &snapshot, concurrency).await
                });
                self.pending = Some((self.generation, handle));
                Outcome::say(format!(
                    "Assessing {} articles in the background. Use `status` or `wait`.",
                    self.articles.len()
                ))
            }
            Command::Status => {
                let running = if self.pending.is_some() { "running" } else { "idle" };
                let mut msg = format!(
                    "{} fetched, {} assessed, assessment {running}.",
                    self.articles.len(),
                    self.assessed.len()
                );
                if !self.assessed.is_empty() {
                    msg.push(' ');
                    msg.push_str(&markdown::summary_line(&self.assessed));
                }
                Outcome::say(msg)
            }
            Command::Wait => match self.finish_pending().await {
                Some(note) => Outcome::say(note),
                None => Outcome::say("No assessment is running."),
            },
            Command::Show => {
                if !self.assessed.is_empty() {
                    Outcome::say(markdown::render_report(&self.assessed))
                } else if self.articles.is_empty() {
                    Outcome::say("No articles fetched yet. Use `fetch`.")
                } else {
                    let mut msg = String::new();
                    for (i, a) in self.articles.iter().enumerate() {
                        msg.push_str(&format!(
                            "{}. {} - {} (awaiting assessment)\n",
                            i + 1,
                            a.title,
                            a.source_name.as_deref().unwrap_or("N/A")
                        ));
                    }
                    Outcome::say(msg.trim_end().to_string())
                }
            }
            Command::Download(path) => {
                if self.assessed.is_empty() {
                    return Outcome::say("Nothing assessed yet. Use `assess` first.");
                }
                let path = path.unwrap_or_else(|| self.default_export.clone());
                match json::write_export(&self.assessed, &path).await {
                    Ok(()) => Outcome::say(format!(
                        "Saved {} assessed articles to {}",
                        self.assessed.len(),
                        path.display()
                    )),
                    Err(e) => Outcome::say(format!("Download failed: {e}")),
                }
            }
            Command::Help => Outcome::say(HELP),
            Command::Quit => {
                if let Some((_, handle)) = self.pending.take() {
                    handle.abort();
                }
                Outcome {
                    message: "Bye.".to_string(),
                    quit: true,
                }
            }
        }
    }
}

/// Drive a session from `input`, writing replies to `output`.
pub async fn run_session<S, M, R, W>(
    mut session: Session<S, M>,
    input: R,
    mut output: W,
) -> Result<(), AppError>
where
    S: ArticleSource,
    M: GenerativeModel + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(output, "{HELP}")?;
    loop {
        write!(output, "credible_news> ")?;
        output.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let outcome = match line.parse::<Command>() {
            Ok(cmd) => session.handle(cmd).await,
            Err(msg) => Outcome::say(msg),
        };
        writeln!(output, "{}", outcome.message)?;
        if outcome.quit {
            break;
        }
    }
    Ok(())
}
