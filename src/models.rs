//! Data models for fetched articles and their credibility assessments.
//!
//! - [`RawArticle`]: an article as returned by the news search API
//! - [`Label`]: the binary (or error) classification
//! - [`Assessment`]: label, reasoning and the unparsed model reply
//! - [`AssessedArticle`]: the pair of the two, which is what gets exported
//!
//! The serialized field names of [`AssessedArticle`] form the export format,
//! so renaming a field here is a breaking change for previously saved files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A news article as returned by the article source.
///
/// Nothing identifies an article except its URL, and duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawArticle {
    pub title: String,
    /// Name of the outlet that published the article.
    #[serde(rename = "source", default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Content snippet; the news API truncates this to a couple hundred chars.
    #[serde(default)]
    pub content: Option<String>,
    pub url: String,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Outcome of a credibility assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Label {
    #[serde(rename = "Credible")]
    Credible,
    #[serde(rename = "Not Credible")]
    NotCredible,
    /// The model was unreachable or its reply could not be parsed.
    #[serde(rename = "Error")]
    Error,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Credible => "Credible",
            Label::NotCredible => "Not Credible",
            Label::Error => "Error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Label::Error)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured result of assessing one article.
///
/// Built once and never mutated. `raw_response` keeps the model reply exactly
/// as received (empty when the model could not be reached at all).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Assessment {
    #[serde(rename = "credibility_label")]
    pub label: Label,
    #[serde(rename = "credibility_reasoning")]
    pub reasoning: String,
    #[serde(default)]
    pub raw_response: String,
}

impl Assessment {
    /// Assessment for an article whose model call failed before any reply.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            label: Label::Error,
            reasoning: reason.into(),
            raw_response: String::new(),
        }
    }
}

/// An article together with its assessment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssessedArticle {
    #[serde(flatten)]
    pub article: RawArticle,
    #[serde(flatten)]
    pub assessment: Assessment,
}
