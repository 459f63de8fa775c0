//! Turning a free-text model reply into a label and a reasoning string.
//!
//! The model's reply is untrusted: it may ignore the requested format, wrap
//! markers in Markdown emphasis, change case, or say nothing useful at all.
//! [`parse_response`] never fails. Anything it cannot make sense of becomes a
//! [`Label::Error`] with one of the fixed messages below.

use super::prompt::{CREDIBILITY_MARKER, CREDIBLE_TOKEN, NOT_CREDIBLE_TOKEN, REASONING_MARKER};
use crate::models::Label;
use once_cell::sync::Lazy;
use regex::Regex;

pub const UNPARSEABLE_RESPONSE: &str =
    "Unparseable response: the model reply did not contain a recognizable credibility label.";
pub const REASONING_NOT_FOUND: &str = "Reasoning not found in the model response.";
pub const EMPTY_RESPONSE: &str = "Empty response: the model returned no text.";

/// Case-insensitive pattern for a `Word Word:` marker. Whitespace and
/// Markdown emphasis (`**Estimated Credibility**:`) may sit between the words
/// and before the colon.
fn marker_regex(marker: &str) -> Regex {
    let words = marker
        .trim_end_matches(':')
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[\s*`#]+");
    Regex::new(&format!(r"(?i)\b{words}[\s*`#]*:")).expect("marker constants form a valid pattern")
}

static CREDIBILITY_RE: Lazy<Regex> = Lazy::new(|| marker_regex(CREDIBILITY_MARKER));
static REASONING_RE: Lazy<Regex> = Lazy::new(|| marker_regex(REASONING_MARKER));

/// Normalised word sequences for the two tokens, e.g. `["not", "credible"]`.
static CREDIBLE_WORDS: Lazy<Vec<String>> = Lazy::new(|| words_of(CREDIBLE_TOKEN));
static NOT_CREDIBLE_WORDS: Lazy<Vec<String>> = Lazy::new(|| words_of(NOT_CREDIBLE_TOKEN));

/// Lowercase, replace punctuation with spaces, split into words.
fn words_of(text: &str) -> Vec<String> {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Drop whitespace and the emphasis characters left behind by a marker such
/// as `**Reasoning:**`.
fn trim_emphasis(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '#' | '`'))
}

/// Map the text after the credibility marker to a label.
///
/// Returns `None` when neither token is present, or when both are offered as
/// alternatives (an echoed `[Credible/Not Credible]` template line).
pub fn match_label(value: &str) -> Option<Label> {
    let words = words_of(value);
    let credible = CREDIBLE_WORDS.as_slice();
    let not_credible = NOT_CREDIBLE_WORDS.as_slice();
    let compact_negative = not_credible.concat();
    let last = credible.last().map(String::as_str).unwrap_or_default();

    let mut negative = 0usize;
    let mut positive = 0usize;
    let mut i = 0;
    while i < words.len() {
        let rest = &words[i..];
        if rest.starts_with(not_credible) {
            negative += 1;
            i += not_credible.len();
        } else if rest.len() >= 2 && rest[0] == "non" && rest[1] == last {
            negative += 1;
            i += 2;
        } else if rest[0] == compact_negative || rest[0] == format!("non{last}") {
            negative += 1;
            i += 1;
        } else if rest.starts_with(credible) {
            positive += 1;
            i += credible.len();
        } else {
            i += 1;
        }
    }

    match (positive, negative) {
        (0, 0) => None,
        (p, 0) if p > 0 => Some(Label::Credible),
        (0, n) if n > 0 => Some(Label::NotCredible),
        _ => None,
    }
}

/// Parse a model reply into `(label, reasoning)`.
///
/// # Arguments
///
/// * `raw` - The model reply exactly as received
///
/// # Returns
///
/// The label and reasoning to store next to the untouched reply:
///
/// - Lines containing [`CREDIBILITY_MARKER`] are tried in order and the first
///   one that names a label wins. If nothing follows the marker on its line,
///   the next non-blank line is tried, unless that line is itself a marker.
/// - The first line containing [`REASONING_MARKER`] supplies the reasoning:
///   the rest of that line plus every following line, verbatim apart from
///   surrounding whitespace and the emphasis next to the marker.
/// - No recognisable label gives `(Error, UNPARSEABLE_RESPONSE)`. A missing
///   reasoning line alone only substitutes [`REASONING_NOT_FOUND`].
pub fn parse_response(raw: &str) -> (Label, String) {
    if raw.trim().is_empty() {
        return (Label::Error, EMPTY_RESPONSE.to_string());
    }

    let lines: Vec<&str> = raw.lines().collect();

    let label = lines.iter().enumerate().find_map(|(idx, line)| {
        let m = CREDIBILITY_RE.find(line)?;
        let value = trim_emphasis(&line[m.end()..]);
        if !value.is_empty() {
            return match_label(value);
        }
        let next = lines[idx + 1..]
            .iter()
            .map(|l| trim_emphasis(l))
            .find(|l| !l.is_empty())?;
        if CREDIBILITY_RE.is_match(next) || REASONING_RE.is_match(next) {
            return None;
        }
        match_label(next)
    });

    let Some(label) = label else {
        return (Label::Error, UNPARSEABLE_RESPONSE.to_string());
    };

    let reasoning = lines
        .iter()
        .enumerate()
        .find_map(|(idx, line)| {
            let m = REASONING_RE.find(line)?;
            let first = line[m.end()..].trim_start_matches(|c: char| c.is_whitespace() || c == '*');
            let mut text = first.to_string();
            for continuation in &lines[idx + 1..] {
                text.push('\n');
                text.push_str(continuation);
            }
            Some(text.trim().to_string())
        })
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| REASONING_NOT_FOUND.to_string());

    (label, reasoning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_credible_with_reasoning() {
        assert_eq!(
            parse_response("Estimated Credibility: Credible\nReasoning: Because X"),
            (Label::Credible, "Because X".to_string())
        );
    }

    #[test]
    fn test_parses_not_credible_tolerating_case_and_whitespace() {
        assert_eq!(
            parse_response("Estimated Credibility:   not   CREDIBLE \nReasoning: Because Y"),
            (Label::NotCredible, "Because Y".to_string())
        );
    }

    #[test]
    fn test_no_marker_is_unparseable() {
        assert_eq!(
            parse_response("I cannot assess this."),
            (Label::Error, UNPARSEABLE_RESPONSE.to_string())
        );
    }

    #[test]
    fn test_missing_reasoning_is_placeholder_not_failure() {
        assert_eq!(
            parse_response("Estimated Credibility: Credible"),
            (Label::Credible, REASONING_NOT_FOUND.to_string())
        );
    }

    #[test]
    fn test_empty_reply_is_error() {
        assert_eq!(parse_response(""), (Label::Error, EMPTY_RESPONSE.to_string()));
        assert_eq!(parse_response(" \n\t "), (Label::Error, EMPTY_RESPONSE.to_string()));
    }

    #[test]
    fn test_markdown_emphasis_and_trailing_punctuation() {
        let reply = "**Estimated Credibility:** **Not Credible.**\n**Reasoning:** Press release via GlobeNewswire.";
        assert_eq!(
            parse_response(reply),
            (Label::NotCredible, "Press release via GlobeNewswire.".to_string())
        );
    }

    #[test]
    fn test_marker_case_and_spacing() {
        let reply = "ESTIMATED  CREDIBILITY : credible\nreasoning:official source";
        assert_eq!(
            parse_response(reply),
            (Label::Credible, "official source".to_string())
        );
    }

    #[test]
    fn test_leading_chatter_is_ignored() {
        let reply = "Sure, here is my analysis.\n\nEstimated Credibility: Credible\nReasoning: Reuters reported it.";
        assert_eq!(
            parse_response(reply),
            (Label::Credible, "Reuters reported it.".to_string())
        );
    }

    #[test]
    fn test_reasoning_keeps_continuation_lines() {
        let reply = "Estimated Credibility: Not Credible\nReasoning: First sentence.\nSecond line.\n\nThird paragraph.";
        let (label, reasoning) = parse_response(reply);
        assert_eq!(label, Label::NotCredible);
        assert_eq!(reasoning, "First sentence.\nSecond line.\n\nThird paragraph.");
    }

    #[test]
    fn test_label_on_following_line() {
        let reply = "Estimated Credibility:\n\n  Credible\nReasoning: ok";
        assert_eq!(parse_response(reply), (Label::Credible, "ok".to_string()));
    }

    #[test]
    fn test_empty_marker_does_not_borrow_label_from_reasoning() {
        let reply = "Estimated Credibility:\nReasoning: I cannot tell whether this is credible.";
        assert_eq!(
            parse_response(reply),
            (Label::Error, UNPARSEABLE_RESPONSE.to_string())
        );
    }

    #[test]
    fn test_reasoning_keeps_markdown_characters() {
        let reply = "Estimated Credibility: Credible\nReasoning: Filing #42 shows a 5*3 multiple via `ticker`.\n# Note: *see* `sec.gov`";
        assert_eq!(
            parse_response(reply),
            (
                Label::Credible,
                "Filing #42 shows a 5*3 multiple via `ticker`.\n# Note: *see* `sec.gov`".to_string()
            )
        );
    }

    #[test]
    fn test_emphasis_inside_markers() {
        let reply = "**Estimated Credibility**: *Credible*\n**Reasoning**: Wire report.";
        assert_eq!(
            parse_response(reply),
            (Label::Credible, "Wire report.".to_string())
        );
    }

    #[test]
    fn test_echoed_template_then_real_answer() {
        let reply = "Estimated Credibility: [Credible/Not Credible]\n\nEstimated Credibility: Credible\nReasoning: ok";
        assert_eq!(parse_response(reply), (Label::Credible, "ok".to_string()));
    }

    #[test]
    fn test_echoed_template_is_unparseable() {
        let reply = "Estimated Credibility: [Credible/Not Credible]\nReasoning: [Your brief explanation]";
        assert_eq!(
            parse_response(reply),
            (Label::Error, UNPARSEABLE_RESPONSE.to_string())
        );
    }

    #[test]
    fn test_unknown_label_value_is_unparseable() {
        let reply = "Estimated Credibility: Unclear\nReasoning: Not enough information.";
        assert_eq!(
            parse_response(reply),
            (Label::Error, UNPARSEABLE_RESPONSE.to_string())
        );
    }

    #[test]
    fn test_empty_reasoning_value_uses_placeholder() {
        let reply = "Estimated Credibility: Credible\nReasoning:   ";
        assert_eq!(
            parse_response(reply),
            (Label::Credible, REASONING_NOT_FOUND.to_string())
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let reply = "Estimated Credibility: Not Credible\r\nReasoning: Promotional tone.\r\n";
        assert_eq!(
            parse_response(reply),
            (Label::NotCredible, "Promotional tone.".to_string())
        );
    }

    #[test]
    fn test_match_label_variants() {
        assert_eq!(match_label("Credible"), Some(Label::Credible));
        assert_eq!(match_label("credible!"), Some(Label::Credible));
        assert_eq!(match_label("Not-Credible"), Some(Label::NotCredible));
        assert_eq!(match_label("NotCredible"), Some(Label::NotCredible));
        assert_eq!(match_label("non-credible"), Some(Label::NotCredible));
        assert_eq!(match_label("Credible / Not Credible"), None);
        assert_eq!(match_label("maybe"), None);
        assert_eq!(match_label(""), None);
    }

    #[test]
    fn test_hostile_inputs_do_not_panic() {
        let long = "Estimated Credibility: ".repeat(10_000);
        let inputs = [
            "\u{0}\u{0}\u{0}",
            "Reasoning: only reasoning",
            "Estimated Credibility: é́́́ credible ✓",
            "Estimated Credibility:",
            "::::",
            long.as_str(),
        ];
        for input in inputs {
            let (label, reasoning) = parse_response(input);
            assert!(!reasoning.is_empty(), "input {input:?}");
            let _ = label;
        }
    }
}
