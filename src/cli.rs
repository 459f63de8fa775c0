//! Command-line interface definitions.
//!
//! Credentials are read from the environment (a `.env` file is honoured) and
//! can be overridden with flags; everything else has a default.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fetch news articles and ask a generative model whether each one's claims
/// look credible.
///
/// # Examples
///
/// ```sh
/// # Fetch, assess and export in one go
/// credible_news --output ./assessed_articles.json
///
/// # Settings file, four concurrent model calls, up to two retries each
/// credible_news --config news.yaml --concurrency 4 --max-retries 2 run
///
/// # Interactive session
/// credible_news interactive
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// News search API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Generative-language API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where to write the assessed articles
    #[arg(short, long, default_value = "assessed_articles.json")]
    pub output: PathBuf,

    /// Also write the report as Markdown to this path
    #[arg(short, long)]
    pub markdown_output: Option<PathBuf>,

    /// Also save the fetched, unassessed articles to this path
    #[arg(long)]
    pub raw_output: Option<PathBuf>,

    /// Number of model calls in flight at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Retries per model call on failure (0 disables retrying)
    #[arg(long, default_value_t = 0)]
    pub max_retries: usize,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch, assess, print the report and export (the default)
    Run,
    /// Start an interactive session with fetch / assess / download commands
    Interactive,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_run() {
        let cli = Cli::parse_from(["credible_news"]);
        assert_eq!(cli.command(), Command::Run);
        assert_eq!(cli.output, PathBuf::from("assessed_articles.json"));
        assert_eq!(cli.concurrency, 1);
        assert_eq!(cli.max_retries, 0);
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "credible_news",
            "--news-api-key",
            "n",
            "--google-api-key",
            "g",
            "--output",
            "/tmp/out.json",
            "--markdown-output",
            "/tmp/out.md",
            "--concurrency",
            "4",
            "interactive",
        ]);

        assert_eq!(cli.command(), Command::Interactive);
        assert_eq!(cli.news_api_key.as_deref(), Some("n"));
        assert_eq!(cli.google_api_key.as_deref(), Some("g"));
        assert_eq!(cli.output, PathBuf::from("/tmp/out.json"));
        assert_eq!(cli.markdown_output, Some(PathBuf::from("/tmp/out.md")));
        assert_eq!(cli.concurrency, 4);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["credible_news", "-c", "news.yaml", "-o", "a.json", "-m", "a.md", "run"]);
        assert_eq!(cli.config, Some(PathBuf::from("news.yaml")));
        assert_eq!(cli.output, PathBuf::from("a.json"));
        assert_eq!(cli.markdown_output, Some(PathBuf::from("a.md")));
        assert_eq!(cli.command(), Command::Run);
    }
}
