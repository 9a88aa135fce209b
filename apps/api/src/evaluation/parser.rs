//! Turns raw model text into a validated evaluation.

use serde_json::Value;
use thiserror::Error;

use crate::evaluation::types::{KeywordMatch, KeywordSource};

const FENCE: &str = "```";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Empty response returned by the model.")]
    EmptyResponse,

    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("No valid score found in the model response.")]
    MissingScore,

    #[error("No summary found in the model response.")]
    MissingSummary,
}

/// A model answer that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvaluation {
    pub score: u8,
    pub summary: String,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub keyword_matches: Option<Vec<KeywordMatch>>,
}

/// Locates the JSON object inside raw model output.
///
/// Fenced blocks (```` ``` ```` or ```` ```json ````) are unwrapped recursively; otherwise the
/// slice from the first `{` to the last `}` is returned, or the trimmed text when there is none.
pub fn extract_json_payload(raw: &str) -> Result<&str, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    if let Some(inner) = fenced_content(trimmed) {
        return extract_json_payload(inner);
    }

    if let (Some(first), Some(last)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if last >= first {
            return Ok(&trimmed[first..=last]);
        }
    }

    Ok(trimmed)
}

/// Content of the first fenced block when `text` opens with a fence. Empty blocks count as none.
fn fenced_content(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let end = rest.find(FENCE)?;
    let inner = &rest[..end];
    (!inner.is_empty()).then_some(inner)
}

/// Parses and validates an extracted payload.
pub fn parse_evaluation(payload: &str) -> Result<ParsedEvaluation, ParseError> {
    let value: Value = serde_json::from_str(payload)?;

    let score = value
        .get("score")
        .and_then(coerce_score)
        .ok_or(ParseError::MissingScore)?;

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingSummary)?
        .to_string();

    Ok(ParsedEvaluation {
        score,
        summary,
        strengths: to_string_list(value.get("strengths")),
        risks: to_string_list(value.get("risks")),
        keyword_matches: normalize_keyword_matches(value.get("keywordMatches")),
    })
}

/// Accepts JSON numbers and numeric strings; rounds and clamps into 0–100.
///
/// Null, booleans and blank strings are rejected rather than read as 0 or 1, so a
/// malformed answer moves on to the next model instead of producing a fake score.
fn coerce_score(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, 100.0) as u8)
}

fn to_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn normalize_keyword_matches(value: Option<&Value>) -> Option<Vec<KeywordMatch>> {
    let entries = value?.as_array()?;
    let matches: Vec<KeywordMatch> = entries
        .iter()
        .filter_map(|entry| {
            let keyword = entry.get("keyword")?.as_str()?.trim();
            if keyword.is_empty() {
                return None;
            }
            let source = match entry.get("source").and_then(Value::as_str) {
                Some("resume") => KeywordSource::Resume,
                Some("both") => KeywordSource::Both,
                _ => KeywordSource::Answers,
            };
            let matched = match entry.get("matched") {
                Some(Value::Bool(b)) => *b,
                Some(Value::String(s)) => s.to_lowercase() == "true",
                _ => false,
            };
            Some(KeywordMatch {
                keyword: keyword.to_string(),
                matched,
                source,
            })
        })
        .collect();

    (!matches.is_empty()).then_some(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fenced_json_block() {
        let raw = "```json\n{\"score\":80,\"summary\":\"ok\"}\n```";
        assert_eq!(
            extract_json_payload(raw).unwrap(),
            "{\"score\":80,\"summary\":\"ok\"}"
        );
    }

    #[test]
    fn test_extract_fenced_block_without_tag() {
        let raw = "```\n{\"score\": 10}\n```";
        assert_eq!(extract_json_payload(raw).unwrap(), "{\"score\": 10}");
    }

    #[test]
    fn test_extract_fence_tag_is_case_insensitive() {
        let raw = "```JSON\n{\"score\": 10}\n```";
        assert_eq!(extract_json_payload(raw).unwrap(), "{\"score\": 10}");
    }

    #[test]
    fn test_extract_slices_outermost_braces() {
        let raw = "Here you go: {\"a\": {\"b\": 1}} hope that helps";
        assert_eq!(extract_json_payload(raw).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn test_extract_without_braces_returns_trimmed_text() {
        assert_eq!(extract_json_payload("  no json here \n").unwrap(), "no json here");
    }

    #[test]
    fn test_extract_reversed_braces_returns_trimmed_text() {
        assert_eq!(extract_json_payload("} oops {").unwrap(), "} oops {");
    }

    #[test]
    fn test_extract_empty_is_error() {
        assert!(matches!(
            extract_json_payload("   \n\t"),
            Err(ParseError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_is_idempotent() {
        let samples = [
            "{\"score\": 1}",
            "```json\n{\"score\":80}\n```",
            "```json\n{\"x\":1}\n```\ntrailing note",
            "prefix {\"score\": 2} suffix",
            "no braces at all",
            "```json```",
            "```abc```",
            "} {",
            "``` unterminated {\"score\": 3}",
        ];
        for sample in samples {
            let once = extract_json_payload(sample).unwrap();
            let twice = extract_json_payload(once).unwrap();
            assert_eq!(once, twice, "sample: {sample:?}");
        }
    }

    #[test]
    fn test_parse_valid_payload() {
        let parsed = parse_evaluation(
            r#"{
                "score": 82.6,
                "summary": "  Strong backend profile  ",
                "strengths": ["Rust", "  ", 7, "Postgres "],
                "risks": "No leadership experience",
                "keywordMatches": [
                    {"keyword": "rust", "matched": true, "source": "both"},
                    {"keyword": "kafka", "matched": "TRUE", "source": "resume"},
                    {"keyword": "sql", "matched": "no", "source": "elsewhere"},
                    {"keyword": "   ", "matched": true},
                    "not an object"
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(parsed.score, 83);
        assert_eq!(parsed.summary, "Strong backend profile");
        assert_eq!(parsed.strengths, vec!["Rust", "Postgres"]);
        assert_eq!(parsed.risks, vec!["No leadership experience"]);

        let matches = parsed.keyword_matches.unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].source, KeywordSource::Both);
        assert!(matches[1].matched);
        assert_eq!(matches[1].source, KeywordSource::Resume);
        assert!(!matches[2].matched);
        assert_eq!(matches[2].source, KeywordSource::Answers);
    }

    #[test]
    fn test_parse_numeric_string_score() {
        let parsed = parse_evaluation(r#"{"score": " 64 ", "summary": "fine"}"#).unwrap();
        assert_eq!(parsed.score, 64);
        assert!(parsed.strengths.is_empty());
        assert!(parsed.keyword_matches.is_none());
    }

    #[test]
    fn test_parse_score_clamped_into_range() {
        let high = parse_evaluation(r#"{"score": 140, "summary": "x"}"#).unwrap();
        assert_eq!(high.score, 100);
        let low = parse_evaluation(r#"{"score": -3, "summary": "x"}"#).unwrap();
        assert_eq!(low.score, 0);
    }

    #[test]
    fn test_parse_rejects_missing_or_non_numeric_score() {
        for payload in [
            r#"{"summary": "x"}"#,
            r#"{"score": "eighty", "summary": "x"}"#,
            r#"{"score": "", "summary": "x"}"#,
            r#"{"score": "NaN", "summary": "x"}"#,
            r#"{"score": null, "summary": "x"}"#,
            r#"{"score": true, "summary": "x"}"#,
            r#"[1, 2]"#,
        ] {
            assert!(
                matches!(parse_evaluation(payload), Err(ParseError::MissingScore)),
                "payload: {payload}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_blank_summary() {
        assert!(matches!(
            parse_evaluation(r#"{"score": 70, "summary": "   "}"#),
            Err(ParseError::MissingSummary)
        ));
        assert!(matches!(
            parse_evaluation(r#"{"score": 70, "summary": 5}"#),
            Err(ParseError::MissingSummary)
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse_evaluation("{\"score\": 70,"),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_empty_keyword_list_is_absent() {
        let parsed =
            parse_evaluation(r#"{"score": 50, "summary": "x", "keywordMatches": []}"#).unwrap();
        assert!(parsed.keyword_matches.is_none());
    }
}
