//! Article sources: where raw articles come from.
//!
//! An [`ArticleSource`] answers a single [`ArticleQuery`] with an ordered list
//! of [`RawArticle`]s. There is exactly one network implementation,
//! [`newsapi::NewsApiSource`]; tests substitute in-memory fakes.
//!
//! Sources never retry, cache, deduplicate or filter. A failed request is
//! surfaced as [`AppError::SourceUnavailable`] and the caller decides what to
//! do with it. An empty result is `Ok(vec![])`, not an error.

use crate::config::NewsSettings;
use crate::error::AppError;
use crate::models::RawArticle;
use itertools::Itertools;
use std::future::Future;

pub mod newsapi;

/// What to ask the news search API for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub keywords: Vec<String>,
    pub max_results: usize,
    pub language: String,
    pub sort_by: String,
}

impl ArticleQuery {
    /// Build a query from a keyword set, keeping the first occurrence of each
    /// keyword and dropping blanks.
    pub fn new<I, S>(keywords: I, max_results: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .unique()
            .collect();
        Self {
            keywords,
            max_results,
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
        }
    }

    pub fn from_settings(settings: &NewsSettings) -> Self {
        let mut query = Self::new(&settings.keywords, settings.max_results);
        query.language = settings.language.clone();
        query.sort_by = settings.sort_by.clone();
        query
    }

    /// Single search expression with OR semantics.
    ///
    /// Multi-word keywords are quoted so the API matches them as phrases.
    pub fn query_string(&self) -> String {
        self.keywords
            .iter()
            .map(|k| {
                if k.contains(char::is_whitespace) {
                    format!("\"{}\"", k.replace('"', ""))
                } else {
                    k.clone()
                }
            })
            .join(" OR ")
    }
}

/// Something that can turn a query into articles.
pub trait ArticleSource: Send + Sync {
    fn fetch(
        &self,
        query: &ArticleQuery,
    ) -> impl Future<Output = Result<Vec<RawArticle>, AppError>> + Send;
}
