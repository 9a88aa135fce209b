use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-form evaluation configuration authored by the form owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_have_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice_to_have_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

const MAX_OVERVIEW_CHARS: usize = 1500;
const MAX_KEYWORDS: usize = 30;
const MAX_CUSTOM_PROMPT_CHARS: usize = 2000;

impl EvaluationSettings {
    /// Checks the limits the form builder enforces on stored settings.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(overview) = &self.overview {
            if overview.chars().count() > MAX_OVERVIEW_CHARS {
                return Err(format!("overview must be at most {MAX_OVERVIEW_CHARS} characters"));
            }
        }
        for (name, list) in [
            ("mustHaveKeywords", &self.must_have_keywords),
            ("niceToHaveKeywords", &self.nice_to_have_keywords),
        ] {
            let Some(list) = list else { continue };
            if list.len() > MAX_KEYWORDS {
                return Err(format!("{name} must contain at most {MAX_KEYWORDS} entries"));
            }
            if list.iter().any(|k| k.is_empty()) {
                return Err(format!("{name} must not contain empty keywords"));
            }
        }
        if let Some(prompt) = &self.custom_prompt {
            if prompt.chars().count() > MAX_CUSTOM_PROMPT_CHARS {
                return Err(format!(
                    "customPrompt must be at most {MAX_CUSTOM_PROMPT_CHARS} characters"
                ));
            }
        }
        Ok(())
    }
}

/// Coarse hiring recommendation derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Yes,
    Maybe,
    No,
}

impl Decision {
    /// ≥75 → YES, ≥55 → MAYBE, otherwise NO. Shared by every evaluation path.
    pub fn from_score(score: u8) -> Self {
        if score >= 75 {
            Decision::Yes
        } else if score >= 55 {
            Decision::Maybe
        } else {
            Decision::No
        }
    }
}

/// Where a keyword from the evaluation settings was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordSource {
    Answers,
    Resume,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub matched: bool,
    pub source: KeywordSource,
}

/// Diagnostic trail attached to every evaluation, whichever path produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_matches: Option<Vec<KeywordMatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model_attempts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_analyzed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_text_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response_preview: Option<String>,
    /// Recognized technologies; heuristic path only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
    /// Whether a résumé URL or text was supplied; heuristic path only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_included: Option<bool>,
}

/// Which branch of the pipeline produced an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationSource {
    Ai,
    Unconfigured,
    Heuristic,
}

/// The uniform evaluation result. Always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutput {
    pub score: u8,
    pub decision: Decision,
    pub summary: String,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub metadata: EvaluationMetadata,
    pub source: EvaluationSource,
}

/// Everything needed to evaluate one submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    pub applicant_name: String,
    #[serde(default)]
    pub answers: Map<String, Value>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub resume_text: Option<String>,
    pub form_title: String,
    #[serde(default)]
    pub evaluation_settings: Option<EvaluationSettings>,
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
