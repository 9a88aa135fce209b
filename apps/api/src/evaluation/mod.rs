// Submission evaluation: résumé extraction, prompt building, model fallback, heuristic fallback.
// All model calls go through llm_client::TextGenerator; nothing here talks to Gemini directly.

pub mod handlers;
pub mod heuristic;
pub mod invoker;
pub mod parser;
pub mod prompts;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::evaluation::invoker::{model_candidates, ModelInvoker};
use crate::evaluation::prompts::build_prompt;
use crate::evaluation::types::{
    preview, Decision, EvaluationMetadata, EvaluationOutput, EvaluationSource, SubmissionInput,
};
use crate::llm_client::{GeminiClient, TextGenerator};
use crate::resume::ResumeExtractor;

const UNCONFIGURED_SCORE: u8 = 60;
const RESUME_PREVIEW_CHARS: usize = 500;
pub const AI_UNAVAILABLE_RISK: &str = "AI evaluation could not be performed.";
pub const AI_FAILED_RISK: &str = "Submission could not be AI-evaluated";

/// Result of the model path. `Failed` is a designed branch: the caller falls back to heuristics.
#[derive(Debug)]
pub enum AiOutcome {
    Evaluated(EvaluationOutput),
    Failed {
        metadata: EvaluationMetadata,
        reason: String,
    },
}

/// Single entry point for scoring submissions. Holds no per-evaluation state.
#[derive(Clone)]
pub struct Evaluator {
    /// `None` when no API key is configured.
    generator: Option<Arc<dyn TextGenerator>>,
    models: Vec<String>,
    resumes: ResumeExtractor,
}

impl Evaluator {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        models: Vec<String>,
        resumes: ResumeExtractor,
    ) -> Self {
        Self {
            generator,
            models,
            resumes,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let generator = match &config.gemini_api_key {
            Some(key) => {
                let client = GeminiClient::new(
                    key.clone(),
                    config.gemini_api_base.clone(),
                    config.llm_timeout,
                )?;
                Some(Arc::new(client) as Arc<dyn TextGenerator>)
            }
            None => None,
        };
        let resumes = ResumeExtractor::new(config.resume_fetch_timeout, config.resume_max_bytes)?;
        Ok(Self::new(
            generator,
            model_candidates(config.gemini_model.as_deref()),
            resumes,
        ))
    }

    pub fn resumes(&self) -> &ResumeExtractor {
        &self.resumes
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn is_model_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Evaluates a submission. Never fails: the worst case is a heuristic score.
    pub async fn evaluate(&self, input: &SubmissionInput) -> EvaluationOutput {
        match self.evaluate_with_model(input).await {
            AiOutcome::Evaluated(output) => output,
            AiOutcome::Failed { metadata, reason } => {
                warn!(
                    applicant = %input.applicant_name,
                    error = %reason,
                    "Model evaluation unavailable, using fallback heuristics"
                );
                let mut output = heuristic::evaluate_heuristically(input);
                merge_failure_metadata(&mut output.metadata, metadata);
                output.risks.push(AI_FAILED_RISK.to_string());
                output
            }
        }
    }

    /// The model path on its own. A missing API key is a soft success with a placeholder score.
    pub async fn evaluate_with_model(&self, input: &SubmissionInput) -> AiOutcome {
        let mut metadata = EvaluationMetadata {
            resume_url: input.resume_url.clone(),
            ..Default::default()
        };

        let Some(generator) = self.generator.as_deref() else {
            info!(applicant = %input.applicant_name, "Model API key missing; applying placeholder evaluation");
            metadata.notes = Some("Model API key is missing.".to_string());
            return AiOutcome::Evaluated(EvaluationOutput {
                score: UNCONFIGURED_SCORE,
                decision: Decision::from_score(UNCONFIGURED_SCORE),
                summary: "No model API key is configured; a default evaluation was applied."
                    .to_string(),
                strengths: vec![],
                risks: vec![AI_UNAVAILABLE_RISK.to_string()],
                metadata,
                source: EvaluationSource::Unconfigured,
            });
        };

        let mut resume_text = input
            .resume_text
            .clone()
            .filter(|t| !t.trim().is_empty());
        if resume_text.is_none() {
            if let Some(url) = input.resume_url.as_deref() {
                let extracted = self.resumes.extract_from_url(url).await;
                info!(
                    resume_url = url,
                    success = extracted.success,
                    text_length = extracted.text.len(),
                    "Résumé fetched for evaluation"
                );
                metadata.resume_analyzed = Some(extracted.success);
                resume_text = extracted.usable_text();
            }
        }

        let prompt = build_prompt(
            &input.form_title,
            input.evaluation_settings.as_ref(),
            &input.answers,
            resume_text.as_deref(),
        );
        let answer_keys: Vec<&String> = input.answers.keys().collect();
        info!(
            has_resume_text = resume_text.is_some(),
            resume_text_length = resume_text.as_ref().map_or(0, String::len),
            answer_keys = ?answer_keys,
            "Invoking model evaluation"
        );

        let invoker = ModelInvoker::new(generator, &self.models);
        match invoker.invoke(&prompt, &mut metadata).await {
            Ok(parsed) => {
                metadata.keyword_matches = parsed.keyword_matches;
                metadata.resume_analyzed = metadata.resume_analyzed.or(Some(resume_text.is_some()));
                metadata.resume_text_preview =
                    resume_text.as_deref().map(|t| preview(t, RESUME_PREVIEW_CHARS));
                metadata.resume_text = resume_text;

                AiOutcome::Evaluated(EvaluationOutput {
                    score: parsed.score,
                    decision: Decision::from_score(parsed.score),
                    summary: parsed.summary,
                    strengths: parsed.strengths,
                    risks: parsed.risks,
                    metadata,
                    source: EvaluationSource::Ai,
                })
            }
            Err(exhausted) => {
                let reason = exhausted.to_string();
                // Keep a fetched résumé so the fallback and later re-evaluations can use it.
                metadata.resume_text_preview =
                    resume_text.as_deref().map(|t| preview(t, RESUME_PREVIEW_CHARS));
                metadata.resume_text = resume_text;
                metadata.notes = Some(match metadata.notes.take() {
                    Some(notes) => format!("{notes} | General error: {reason}"),
                    None => format!("Model request failed: {reason}"),
                });
                AiOutcome::Failed { metadata, reason }
            }
        }
    }
}

/// Carries the model-path diagnostics onto a heuristic result.
fn merge_failure_metadata(target: &mut EvaluationMetadata, failure: EvaluationMetadata) {
    target.model_used = failure.model_used;
    target.ai_model_attempts = failure.ai_model_attempts;
    target.raw_response_preview = failure.raw_response_preview;
    target.resume_url = failure.resume_url;
    if target.resume_text.is_none() {
        target.resume_text_preview = failure.resume_text_preview;
        target.resume_text = failure.resume_text;
    }
    if let Some(notes) = failure.notes {
        target.notes = Some(match target.notes.take() {
            Some(existing) => format!("{existing} | {notes}"),
            None => notes,
        });
    }
    if target.resume_analyzed != Some(true) {
        target.resume_analyzed = failure.resume_analyzed.or(target.resume_analyzed);
    }
}
