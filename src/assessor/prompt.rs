//! Prompt construction and the reply-format constants it shares with the
//! parser.

use crate::models::RawArticle;

/// Prefix of the line carrying the label.
pub const CREDIBILITY_MARKER: &str = "Estimated Credibility:";
/// Prefix of the line carrying the free-text justification.
pub const REASONING_MARKER: &str = "Reasoning:";
pub const CREDIBLE_TOKEN: &str = "Credible";
pub const NOT_CREDIBLE_TOKEN: &str = "Not Credible";
/// Substituted for any missing or blank article field.
pub const MISSING_FIELD: &str = "N/A";

fn field(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim(),
        _ => MISSING_FIELD,
    }
}

/// Build the fact-checking prompt for one article.
///
/// Pure: the same article always yields the same bytes.
pub fn build_prompt(article: &RawArticle) -> String {
    let title = field(Some(article.title.as_str()));
    let source_name = field(article.source_name.as_deref());
    let author = field(article.author.as_deref());
    let description = field(article.description.as_deref());
    let content = field(article.content.as_deref());
    let published_at = article
        .published_at
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| MISSING_FIELD.to_string());

    format!(
        r#"You are a Fact-Checking Analyst AI. Your task is to evaluate the provided news article details and determine if its main factual claims are "{CREDIBLE_TOKEN}" or "{NOT_CREDIBLE_TOKEN}", along with a brief justification.

Article Information:
- Title: "{title}"
- Source Name (News Outlet): "{source_name}"
- Author/Publisher of Report (cited in article, or journalist): "{author}"
- Publication Date of News Item: "{published_at}"
- Description Snippet: "{description}"
- Content Snippet: "{content}"

Instructions for your analysis (consider these points before giving the assessment):
1. Key Claims: Identify the main factual claims (e.g., market size "$X Trillion by YYYY", "Z% CAGR", specific events, attributions).
2. News Outlet ({source_name}): Assess its nature. Is it a primary news source (e.g., Reuters, Associated Press), a press release distributor (e.g., GlobeNewswire, PR Newswire), an aggregator, a blog? This affects how the information should be viewed.
3. Author/Original Source ({author}): Assess its likely standing. Is it a known market research firm, an established journalist, a company making an announcement, an academic body, an individual?
4. Nature of Claims: Are these established facts, company announcements, or projections/forecasts? A claim being a projection does not automatically make it "{NOT_CREDIBLE_TOKEN}" but its basis should be considered.
5. Red Flags/Context:
   - Is the news outlet primarily a distributor of press releases? Then the content is likely paid for by the author and not independently vetted, which leans towards "{NOT_CREDIBLE_TOKEN}" unless the original source is highly reputable.
   - Is the language overly promotional or biased?
   - Are there obvious contradictions or unsourced significant claims?

Output Requirement:
Based on your internal analysis of the above, provide your response strictly in the following format, as exactly two lines in this order:

{CREDIBILITY_MARKER} [{CREDIBLE_TOKEN}/{NOT_CREDIBLE_TOKEN}]
{REASONING_MARKER} [Your brief explanation, typically 2-4 sentences, justifying the assessment based on your analysis of source, author, and claim nature.]

Example 1:
{CREDIBILITY_MARKER} {CREDIBLE_TOKEN}
{REASONING_MARKER} The article reports on an official announcement from a regulatory body (IFSB), published by a reputable news agency (Reuters). The claims are factual statements about new standards being released.

Example 2:
{CREDIBILITY_MARKER} {NOT_CREDIBLE_TOKEN}
{REASONING_MARKER} The claims are bold market projections from an unknown research firm, distributed via a press release service (GlobeNewswire). The language is highly promotional, and no independent verification is provided by the news outlet.

Do not add any other text before "{CREDIBILITY_MARKER}" or after the reasoning.
Only use "{CREDIBLE_TOKEN}" or "{NOT_CREDIBLE_TOKEN}" as the assessment.
"#
    )
}
