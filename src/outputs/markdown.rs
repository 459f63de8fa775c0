//! Markdown report of assessed articles.
//!
//! Used for the batch run's stdout report, the optional `--markdown-output`
//! file, and the interactive `show` command.

use crate::models::{AssessedArticle, Label};
use itertools::Itertools;
use std::fmt::Write;

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "N/A",
    }
}

fn label_display(label: Label) -> &'static str {
    match label {
        Label::Credible => "Credible",
        Label::NotCredible => "Not Credible",
        Label::Error => "Assessment Error",
    }
}

/// One-line per-label tally, e.g. `Credible: 3 · Not Credible: 1 · Error: 1`.
pub fn summary_line(records: &[AssessedArticle]) -> String {
    let counts = records.iter().counts_by(|r| r.assessment.label);
    [Label::Credible, Label::NotCredible, Label::Error]
        .iter()
        .map(|l| format!("{}: {}", l, counts.get(l).copied().unwrap_or(0)))
        .join(" · ")
}

/// Render the full report.
pub fn render_report(records: &[AssessedArticle]) -> String {
    let mut md = String::new();
    // writeln! into a String cannot fail
    let _ = writeln!(md, "# Assessed Articles\n");
    let _ = writeln!(
        md,
        "Displaying **{}** articles. {}\n",
        records.len(),
        summary_line(records)
    );

    for (i, record) in records.iter().enumerate() {
        let article = &record.article;
        let assessment = &record.assessment;
        let title = if article.title.trim().is_empty() {
            format!("Untitled Article {}", i + 1)
        } else {
            article.title.clone()
        };

        let mut heading = format!("## {}. {title}", i + 1);
        if !assessment.label.is_error() {
            let _ = write!(heading, " (Assessment: {})", assessment.label);
        }
        let _ = writeln!(md, "{heading}\n");

        let published = article
            .published_at
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(md, "- **Source:** {}", or_na(article.source_name.as_deref()));
        let _ = writeln!(md, "- **Published At:** {published}");
        let _ = writeln!(md, "- **Author:** {}", or_na(article.author.as_deref()));
        if let Some(description) = article.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = writeln!(md, "- **Description:** {description}");
        }
        if let Some(content) = article.content.as_deref().filter(|c| !c.trim().is_empty()) {
            let _ = writeln!(md, "- **Content Snippet:** {content}");
        }
        if !article.url.is_empty() {
            let _ = writeln!(md, "- [Read full article]({})", article.url);
        }

        let _ = writeln!(md, "\n**AI Credibility Assessment:** {}\n", label_display(assessment.label));
        let _ = writeln!(md, "**Reasoning:** {}\n", assessment.reasoning);
    }
    md
}
