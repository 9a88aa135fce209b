//! Tries each candidate model in order until one returns a valid evaluation.
//!
//! Per attempt: invoke → raw text → extract JSON → parse → validate.
//! A failing attempt is logged as `model=<name> -> <message>` and the next candidate runs;
//! the first success ends the loop. Attempts are strictly sequential.

use thiserror::Error;
use tracing::{error, info};

use crate::evaluation::parser::{extract_json_payload, parse_evaluation, ParseError, ParsedEvaluation};
use crate::evaluation::types::{preview, EvaluationMetadata};
use crate::llm_client::{LlmError, TextGenerator, DEFAULT_MODELS};

const RAW_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Every candidate failed. Carries the failure notes joined by `" | "`.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ModelsExhausted(pub String);

/// The configured model when one is set, otherwise the default pair.
pub fn model_candidates(configured: Option<&str>) -> Vec<String> {
    match configured.map(str::trim).filter(|m| !m.is_empty()) {
        Some(model) => vec![model.to_string()],
        None => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
    }
}

pub struct ModelInvoker<'a> {
    generator: &'a dyn TextGenerator,
    candidates: &'a [String],
}

impl<'a> ModelInvoker<'a> {
    pub fn new(generator: &'a dyn TextGenerator, candidates: &'a [String]) -> Self {
        Self {
            generator,
            candidates,
        }
    }

    /// Runs the candidate loop, recording bookkeeping in `metadata` whatever the outcome.
    pub async fn invoke(
        &self,
        prompt: &str,
        metadata: &mut EvaluationMetadata,
    ) -> Result<ParsedEvaluation, ModelsExhausted> {
        metadata.ai_model_attempts = Some(self.candidates.to_vec());
        let mut failure_notes: Vec<String> = Vec::new();

        for model in self.candidates {
            let mut raw_response: Option<String> = None;

            match self.attempt(model, prompt, &mut raw_response).await {
                Ok(parsed) => {
                    info!(
                        model = %model,
                        score = parsed.score,
                        strengths = parsed.strengths.len(),
                        risks = parsed.risks.len(),
                        "Model evaluation succeeded"
                    );
                    metadata.model_used = Some(model.clone());
                    metadata.notes = (!failure_notes.is_empty())
                        .then(|| format!("Previous attempts: {}", failure_notes.join(" | ")));
                    metadata.raw_response_preview = None;
                    return Ok(parsed);
                }
                Err(e) => {
                    let message = e.to_string();
                    error!(model = %model, error = %message, "Model attempt failed");
                    failure_notes.push(format!("model={model} -> {message}"));
                    metadata.model_used = Some(model.clone());
                    metadata.notes = Some(format!("Model {model} failed: {message}"));
                    if let Some(raw) = raw_response.as_deref() {
                        metadata.raw_response_preview = Some(preview(raw, RAW_PREVIEW_CHARS));
                    }
                }
            }
        }

        let message = if failure_notes.is_empty() {
            "No model candidates were available.".to_string()
        } else {
            failure_notes.join(" | ")
        };
        Err(ModelsExhausted(message))
    }

    async fn attempt(
        &self,
        model: &str,
        prompt: &str,
        raw_response: &mut Option<String>,
    ) -> Result<ParsedEvaluation, AttemptError> {
        let raw = self.generator.generate_json(model, prompt).await?;
        let raw = raw_response.insert(raw);
        let payload = extract_json_payload(raw)?;
        Ok(parse_evaluation(payload)?)
    }
}
