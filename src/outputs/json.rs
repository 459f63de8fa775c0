//! JSON export and re-import of assessed articles.
//!
//! The export is a pretty-printed JSON array, one object per article:
//!
//! ```text
//! [
//!   {
//!     "title": "...", "source": "Reuters", "author": null,
//!     "description": "...", "content": "...", "url": "...",
//!     "publishedAt": "2025-05-06T14:30:00Z",
//!     "credibility_label": "Not Credible",
//!     "credibility_reasoning": "...",
//!     "raw_response": "..."
//!   }
//! ]
//! ```
//!
//! [`load_export`] reads the same file back into identical records.

use crate::error::AppError;
use crate::models::{AssessedArticle, RawArticle};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize assessed articles in export format.
pub fn to_export_string(records: &[AssessedArticle]) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parse export-format text back into assessed articles.
pub fn from_export_str(text: &str) -> Result<Vec<AssessedArticle>, AppError> {
    Ok(serde_json::from_str(text)?)
}

async fn write_text(text: &str, path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }
    fs::write(path, text).await?;
    Ok(())
}

/// Write the assessed articles to `path`, replacing any existing file.
///
/// # Arguments
///
/// * `records` - Assessed articles in the order they should appear
/// * `path` - Destination file; missing parent directories are created
///
/// # Returns
///
/// `Ok(())` on success, or an [`AppError::Io`] / [`AppError::Json`] error.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_export(records: &[AssessedArticle], path: &Path) -> Result<(), AppError> {
    write_text(&to_export_string(records)?, path).await?;
    info!(count = records.len(), "Wrote assessed articles");
    Ok(())
}

/// Read a file written by [`write_export`].
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_export(path: &Path) -> Result<Vec<AssessedArticle>, AppError> {
    let text = fs::read_to_string(path).await?;
    let records = from_export_str(&text)?;
    info!(count = records.len(), "Loaded assessed articles");
    Ok(records)
}

/// Save the fetched articles before assessment.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_raw_articles(articles: &[RawArticle], path: &Path) -> Result<(), AppError> {
    write_text(&serde_json::to_string_pretty(articles)?, path).await?;
    info!(count = articles.len(), "Wrote fetched articles");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assessment, Label};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn records() -> Vec<AssessedArticle> {
        vec![
            AssessedArticle {
                article: RawArticle {
                    title: "IFSB issues standard".to_string(),
                    source_name: Some("Reuters".to_string()),
                    author: Some("Jane \"JD\" Doe".to_string()),
                    description: Some("Guidance published".to_string()),
                    content: Some("Body… [+1200 chars]".to_string()),
                    url: "https://example.com/a".to_string(),
                    published_at: Some(Utc.with_ymd_and_hms(2025, 5, 6, 14, 30, 0).unwrap()),
                },
                assessment: Assessment {
                    label: Label::Credible,
                    reasoning: "Regulator announcement\nreported by a wire service.".to_string(),
                    raw_response: "Estimated Credibility: Credible\nReasoning: Regulator announcement\nreported by a wire service.".to_string(),
                },
            },
            AssessedArticle {
                article: RawArticle {
                    title: "Sukuk market to hit $1T".to_string(),
                    source_name: Some("GlobeNewswire".to_string()),
                    author: None,
                    description: None,
                    content: None,
                    url: "https://example.com/b".to_string(),
                    published_at: None,
                },
                assessment: Assessment {
                    label: Label::NotCredible,
                    reasoning: "Promotional press release.".to_string(),
                    raw_response: "Estimated Credibility: Not Credible\nReasoning: Promotional press release.".to_string(),
                },
            },
            AssessedArticle {
                article: RawArticle {
                    title: "Takaful growth in الخليج".to_string(),
                    source_name: None,
                    author: None,
                    description: Some("".to_string()),
                    content: None,
                    url: "https://example.com/c".to_string(),
                    published_at: Some(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()),
                },
                assessment: Assessment::failed("Model unavailable: HTTP 429: quota"),
            },
        ]
    }

    #[tokio::test]
    async fn test_export_round_trip_preserves_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/assessed_articles.json");
        let original = records();

        write_export(&original, &path).await.unwrap();
        let reloaded = load_export(&path).await.unwrap();

        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_export_uses_literal_label_strings() {
        let text = to_export_string(&records()).unwrap();
        assert!(text.contains("\"credibility_label\": \"Credible\""));
        assert!(text.contains("\"credibility_label\": \"Not Credible\""));
        assert!(text.contains("\"credibility_label\": \"Error\""));
        assert!(text.contains("\"publishedAt\": null"));
    }

    #[test]
    fn test_empty_export_round_trips() {
        let text = to_export_string(&[]).unwrap();
        assert_eq!(text, "[]");
        assert!(from_export_str(&text).unwrap().is_empty());
    }

    #[test]
    fn test_import_rejects_unknown_label() {
        let text = r#"[{"title":"t","source":null,"author":null,"description":null,"content":null,
            "url":"u","publishedAt":null,"credibility_label":"Maybe","credibility_reasoning":"r"}]"#;
        assert!(matches!(from_export_str(text), Err(AppError::Json(_))));
    }

    #[test]
    fn test_import_tolerates_missing_raw_response() {
        let text = r#"[{"title":"t","source":null,"author":null,"description":null,"content":null,
            "url":"u","publishedAt":null,"credibility_label":"Error","credibility_reasoning":"r"}]"#;
        let records = from_export_str(text).unwrap();
        assert_eq!(records[0].assessment.raw_response, "");
        assert_eq!(records[0].assessment.label, Label::Error);
    }

    #[tokio::test]
    async fn test_raw_articles_written_as_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles_fetched.json");
        let raw: Vec<RawArticle> = records().into_iter().map(|r| r.article).collect();
        write_raw_articles(&raw, &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: Vec<RawArticle> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, raw);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let err = load_export(Path::new("/no/such/export.json")).await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
