// Prompt text for submission evaluation.
// The builder is pure: identical inputs always yield an identical prompt.

use serde_json::{Map, Value};

use crate::evaluation::types::EvaluationSettings;

/// Résumé text beyond this many characters is cut before prompting.
pub const RESUME_PROMPT_CHARS: usize = 6000;

const UNSPECIFIED_KEYWORDS: &str = "Unspecified";
const UNSPECIFIED_OVERVIEW: &str = "No overview provided.";
const NO_RESUME: &str = "The applicant did not upload a résumé, or its content could not be read.";

const RESPONSE_SCHEMA: &str = r#"Response format:
{
  "score": number (0-100),
  "summary": string,
  "strengths": string[],
  "risks": string[],
  "keywordMatches": [{ "keyword": string, "matched": boolean, "source": "answers"|"resume"|"both" }]
}

The score field is required and must be an integer between 0 and 100. Keep the summary short and clear."#;

/// Builds the evaluation instruction for one submission.
pub fn build_prompt(
    form_title: &str,
    settings: Option<&EvaluationSettings>,
    answers: &Map<String, Value>,
    resume_text: Option<&str>,
) -> String {
    let must_have = join_keywords(settings.and_then(|s| s.must_have_keywords.as_deref()));
    let nice_to_have = join_keywords(settings.and_then(|s| s.nice_to_have_keywords.as_deref()));
    let overview = settings
        .and_then(|s| s.overview.as_deref())
        .unwrap_or(UNSPECIFIED_OVERVIEW);
    let custom_prompt = settings
        .and_then(|s| s.custom_prompt.as_deref())
        .filter(|p| !p.is_empty())
        .map(|p| format!("The form owner also gave this instruction: {p}"))
        .unwrap_or_default();

    // A map of JSON values always serializes.
    let answers_text = serde_json::to_string_pretty(answers).unwrap_or_else(|_| "{}".to_string());

    let resume_section = match resume_text.filter(|t| !t.is_empty()) {
        Some(text) => {
            let truncated: String = text.chars().take(RESUME_PROMPT_CHARS).collect();
            format!(
                "Text extracted from the applicant's résumé:\n{truncated}\n(Summarize if the résumé is longer)"
            )
        }
        None => NO_RESUME.to_string(),
    };

    let schema = RESPONSE_SCHEMA;
    format!(
        "You are a technical hiring evaluator. Review the information below and respond in JSON only.

Position: {form_title}
General expectations: {overview}
Must-have keywords: {must_have}
Nice-to-have keywords: {nice_to_have}
{custom_prompt}

Applicant's form answers:
{answers_text}

{resume_section}

{schema}"
    )
}

/// A missing list renders as `Unspecified`; an empty one renders as nothing.
fn join_keywords(keywords: Option<&[String]>) -> String {
    keywords
        .map(|k| k.join(", "))
        .unwrap_or_else(|| UNSPECIFIED_KEYWORDS.to_string())
}
